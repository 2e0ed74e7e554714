//! Dense competition ranking with skips
//!
//! Entities with an identical (points, tiebreak) pair share a rank,
//! and a tied group consumes its rank slots: after a three-way tie for
//! 2nd the next distinct entry is 5th.

use std::collections::HashMap;
use std::hash::Hash;

use crate::tiebreak::TiebreakKey;

/// One entity in a ranking group (a league+week or a league+season).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RankEntry<K> {
    pub id: K,
    pub points: i64,
    pub tiebreak: TiebreakKey,
}

/// Assign 1-based competition ranks to a group.
///
/// Sorts descending by (points, tiebreak) and walks the order,
/// re-assigning the current 1-based position whenever the pair
/// changes. Empty input yields an empty map.
pub fn assign_ranks<K: Copy + Eq + Hash>(entries: &[RankEntry<K>]) -> HashMap<K, u32> {
    let mut sorted: Vec<&RankEntry<K>> = entries.iter().collect();
    sorted.sort_by(|a, b| (b.points, b.tiebreak).cmp(&(a.points, a.tiebreak)));

    let mut ranks = HashMap::with_capacity(sorted.len());
    let mut current_rank = 1u32;
    let mut previous: Option<(i64, TiebreakKey)> = None;

    for (index, entry) in sorted.iter().enumerate() {
        let key = (entry.points, entry.tiebreak);
        if previous.is_some_and(|prev| prev != key) {
            current_rank = index as u32 + 1;
        }
        ranks.insert(entry.id, current_rank);
        previous = Some(key);
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, points: i64, tiebreak: (i64, i64)) -> RankEntry<u64> {
        RankEntry { id, points, tiebreak: TiebreakKey(tiebreak.0, tiebreak.1) }
    }

    #[test]
    fn test_empty_group_yields_empty_map() {
        let ranks = assign_ranks::<u64>(&[]);
        assert!(ranks.is_empty());
    }

    #[test]
    fn test_three_way_tie_skips_to_fourth() {
        let entries = vec![
            entry(1, 10, (10, 5)),
            entry(2, 10, (10, 5)),
            entry(3, 10, (10, 5)),
            entry(4, 7, (7, 4)),
        ];
        let ranks = assign_ranks(&entries);
        assert_eq!(ranks[&1], 1);
        assert_eq!(ranks[&2], 1);
        assert_eq!(ranks[&3], 1);
        assert_eq!(ranks[&4], 4);
    }

    #[test]
    fn test_tiebreak_separates_equal_points() {
        let entries = vec![
            entry(1, 10, (3, 0)),
            entry(2, 10, (5, 0)),
            entry(3, 8, (8, 0)),
        ];
        let ranks = assign_ranks(&entries);
        assert_eq!(ranks[&2], 1);
        assert_eq!(ranks[&1], 2);
        assert_eq!(ranks[&3], 3);
    }

    #[test]
    fn test_tie_in_middle_of_group() {
        let entries = vec![
            entry(1, 12, (12, 0)),
            entry(2, 9, (9, 0)),
            entry(3, 9, (9, 0)),
            entry(4, 5, (5, 0)),
        ];
        let ranks = assign_ranks(&entries);
        assert_eq!(ranks[&1], 1);
        assert_eq!(ranks[&2], 2);
        assert_eq!(ranks[&3], 2);
        assert_eq!(ranks[&4], 4);
    }

    #[test]
    fn test_ranks_stay_within_group_size() {
        let entries: Vec<_> =
            (0..10u64).map(|i| entry(i, (i % 4) as i64, ((i % 4) as i64, 0))).collect();
        let ranks = assign_ranks(&entries);
        assert_eq!(ranks.len(), entries.len());
        for rank in ranks.values() {
            assert!((1..=entries.len() as u32).contains(rank));
        }
    }
}
