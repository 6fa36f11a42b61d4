use crate::domain::aggregation::Tally;
use crate::domain::value_objects::{OptionId, ReactionType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: OptionId,
    pub text: String,
    /// Server-reported baseline; superseded by the local tally once any
    /// local vote has been recorded.
    pub vote_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    pub question: String,
    pub options: Vec<PollOption>,
    pub multiple_choice: bool,
    /// Selection cap for multiple-choice polls. `None` means uncapped.
    pub max_selections: Option<u32>,
    pub is_active: bool,
    pub anonymous_voting: bool,
    pub total_votes: u32,
    /// The viewer's selections as reported by the backend; the local cache
    /// record overrides this when present.
    #[serde(default)]
    pub user_votes: Vec<OptionId>,
}

impl Poll {
    pub fn has_option(&self, id: OptionId) -> bool {
        self.options.iter().any(|option| option.id == id)
    }

    /// Baseline tally seeded from the server-reported per-option counts.
    pub fn baseline_tally(&self) -> Tally<OptionId> {
        let mut tally = Tally::new();
        for option in &self.options {
            tally.set(option.id, option.vote_count);
        }
        tally
    }

    pub fn apply_tally(&mut self, tally: &Tally<OptionId>) {
        for option in &mut self.options {
            option.vote_count = tally.count(&option.id);
        }
    }
}

/// Per-post reaction summary entry as rendered in the feed, ordered by the
/// aggregator (descending count).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionSummaryEntry {
    pub reaction: ReactionType,
    pub count: u32,
}

impl ReactionSummaryEntry {
    pub fn emoji(&self) -> &'static str {
        self.reaction.emoji()
    }
}
