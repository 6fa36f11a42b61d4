use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The reaction palette the platform offers on posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    Like,
    Love,
    Insightful,
    Celebrate,
    Support,
    Curious,
}

impl ReactionType {
    pub const ALL: [ReactionType; 6] = [
        ReactionType::Like,
        ReactionType::Love,
        ReactionType::Insightful,
        ReactionType::Celebrate,
        ReactionType::Support,
        ReactionType::Curious,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionType::Like => "like",
            ReactionType::Love => "love",
            ReactionType::Insightful => "insightful",
            ReactionType::Celebrate => "celebrate",
            ReactionType::Support => "support",
            ReactionType::Curious => "curious",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ReactionType::Like => "👍",
            ReactionType::Love => "❤️",
            ReactionType::Insightful => "💡",
            ReactionType::Celebrate => "🎉",
            ReactionType::Support => "🤝",
            ReactionType::Curious => "🤔",
        }
    }
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(ReactionType::Like),
            "love" => Ok(ReactionType::Love),
            "insightful" => Ok(ReactionType::Insightful),
            "celebrate" => Ok(ReactionType::Celebrate),
            "support" => Ok(ReactionType::Support),
            "curious" => Ok(ReactionType::Curious),
            other => Err(format!("Unknown reaction type: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for reaction in ReactionType::ALL {
            let parsed: ReactionType = reaction.as_str().parse().expect("known type");
            assert_eq!(parsed, reaction);
        }
    }

    #[test]
    fn rejects_unknown_type() {
        assert!("applause".parse::<ReactionType>().is_err());
    }

    #[test]
    fn every_reaction_has_an_emoji() {
        for reaction in ReactionType::ALL {
            assert!(!reaction.emoji().is_empty());
        }
    }
}
