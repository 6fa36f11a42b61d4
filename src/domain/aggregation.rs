//! Pure tally arithmetic shared by reaction summaries and poll results.
//!
//! Everything here is synchronous and side-effect free. The controller layers
//! call `recompute` around each optimistic mutation; display code asks for
//! `summary`, `leading`, and `percentage`.

use std::collections::BTreeMap;

/// Ordered per-key counters. Keys with a zero count remain in the map (the
/// authoritative view needs them, poll options in particular); only the
/// display summary drops them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tally<K: Ord + Clone> {
    counts: BTreeMap<K, u32>,
}

/// A single optimistic mutation against a tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TallyDelta<K> {
    Add(K),
    Remove(K),
    Swap { from: K, to: K },
}

impl<K: Ord + Clone> Tally<K> {
    pub fn new() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, key: K, count: u32) {
        self.counts.insert(key, count);
    }

    pub fn count(&self, key: &K) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of every count in the map.
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    fn increment(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    fn decrement(&mut self, key: K) {
        let entry = self.counts.entry(key).or_insert(0);
        if *entry > 0 {
            *entry -= 1;
        }
    }

    /// Display view: zero-count keys dropped, sorted descending by count.
    /// Equal counts keep key order, so the result is deterministic.
    pub fn summary(&self) -> Vec<(K, u32)> {
        let mut entries: Vec<(K, u32)> = self
            .counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(key, count)| (key.clone(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }

    /// The key holding the strict maximum count. `None` when fewer than two
    /// keys exist, when no vote has been cast, or when the maximum is tied;
    /// two tied options are not "winning".
    pub fn leading(&self) -> Option<&K> {
        if self.counts.len() < 2 {
            return None;
        }
        let max = self.counts.values().copied().max().unwrap_or(0);
        if max == 0 {
            return None;
        }
        let mut at_max = self.counts.iter().filter(|(_, count)| **count == max);
        let candidate = at_max.next()?;
        if at_max.next().is_some() {
            return None;
        }
        Some(candidate.0)
    }
}

/// Applies one delta to a baseline snapshot and returns the new tally.
/// Counts clamp at zero; a `Swap` never resends the old key, it just moves
/// one unit of count.
pub fn recompute<K: Ord + Clone>(baseline: &Tally<K>, delta: TallyDelta<K>) -> Tally<K> {
    let mut next = baseline.clone();
    match delta {
        TallyDelta::Add(key) => next.increment(key),
        TallyDelta::Remove(key) => next.decrement(key),
        TallyDelta::Swap { from, to } => {
            next.decrement(from);
            next.increment(to);
        }
    }
    next
}

/// Display percentage for one entry. The local sum wins when any local count
/// exists; otherwise the server-reported total covers the
/// baseline-counts-only case. A zero total renders as 0.
pub fn percentage(count: u32, local_total: u32, server_total: u32) -> u32 {
    let total = if local_total > 0 {
        local_total
    } else {
        server_total
    };
    if total == 0 {
        return 0;
    }
    ((f64::from(count) * 100.0) / f64::from(total)).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(pairs: &[(&'static str, u32)]) -> Tally<&'static str> {
        let mut t = Tally::new();
        for (key, count) in pairs {
            t.set(*key, *count);
        }
        t
    }

    #[test]
    fn add_then_remove_restores_original_count() {
        let baseline = tally(&[("like", 10)]);
        let added = recompute(&baseline, TallyDelta::Add("like"));
        assert_eq!(added.count(&"like"), 11);
        let removed = recompute(&added, TallyDelta::Remove("like"));
        assert_eq!(removed.count(&"like"), 10);
    }

    #[test]
    fn remove_clamps_at_zero() {
        let baseline = tally(&[("love", 0)]);
        let next = recompute(&baseline, TallyDelta::Remove("love"));
        assert_eq!(next.count(&"love"), 0);

        let absent = recompute(&Tally::new(), TallyDelta::Remove("love"));
        assert_eq!(absent.count(&"love"), 0);
    }

    #[test]
    fn swap_moves_exactly_one_unit() {
        let baseline = tally(&[("like", 4), ("love", 2)]);
        let next = recompute(
            &baseline,
            TallyDelta::Swap {
                from: "like",
                to: "love",
            },
        );
        assert_eq!(next.count(&"like"), 3);
        assert_eq!(next.count(&"love"), 3);
        assert_eq!(next.total(), baseline.total());
    }

    #[test]
    fn zero_keys_stay_in_map_but_leave_summary() {
        let baseline = tally(&[("like", 1), ("love", 2)]);
        let next = recompute(&baseline, TallyDelta::Remove("like"));
        assert_eq!(next.len(), 2);
        let summary = next.summary();
        assert_eq!(summary, vec![("love", 2)]);
    }

    #[test]
    fn summary_sorts_descending_by_count() {
        let t = tally(&[("celebrate", 1), ("like", 5), ("love", 3)]);
        let summary = t.summary();
        assert_eq!(summary, vec![("like", 5), ("love", 3), ("celebrate", 1)]);
    }

    #[test]
    fn leading_requires_a_strict_maximum() {
        let tied = tally(&[("a", 3), ("b", 3)]);
        assert_eq!(tied.leading(), None);

        let clear = tally(&[("a", 3), ("b", 2)]);
        assert_eq!(clear.leading(), Some(&"a"));
    }

    #[test]
    fn leading_requires_multiple_keys_and_votes() {
        let single = tally(&[("a", 5)]);
        assert_eq!(single.leading(), None);

        let unvoted = tally(&[("a", 0), ("b", 0)]);
        assert_eq!(unvoted.leading(), None);
    }

    #[test]
    fn percentage_rounds_and_falls_back_to_server_total() {
        assert_eq!(percentage(1, 3, 0), 33);
        assert_eq!(percentage(2, 3, 0), 67);
        // Only baseline counts exist locally; the server total applies.
        assert_eq!(percentage(5, 0, 10), 50);
        assert_eq!(percentage(0, 0, 0), 0);
    }
}
