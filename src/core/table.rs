use std::collections::{BTreeMap, HashMap, HashSet};

use crate::core::error::MatchingError;

/// Sentinel for "no position" in the linked preference lists
const NIL: usize = usize::MAX;

/// One participant's preference list
///
/// Entries never move: the original ranking is kept in `order` and removal
/// unlinks a position from a doubly linked list threaded through it, so
/// first/second/last lookups and removals are all O(1).
#[derive(Debug, Clone, PartialEq, Eq)]
struct PreferenceList {
    order: Vec<usize>,
    position: Vec<usize>,
    present: Vec<bool>,
    next: Vec<usize>,
    prev: Vec<usize>,
    head: usize,
    tail: usize,
    len: usize,
}

impl PreferenceList {
    fn new(order: Vec<usize>, participant_count: usize) -> Self {
        let len = order.len();
        let mut position = vec![NIL; participant_count];
        for (pos, &other) in order.iter().enumerate() {
            position[other] = pos;
        }

        let next = (0..len).map(|p| if p + 1 < len { p + 1 } else { NIL }).collect();
        let prev = (0..len).map(|p| if p == 0 { NIL } else { p - 1 }).collect();

        Self {
            order,
            position,
            present: vec![true; len],
            next,
            prev,
            head: if len == 0 { NIL } else { 0 },
            tail: if len == 0 { NIL } else { len - 1 },
            len,
        }
    }

    #[inline]
    fn at(&self, pos: usize) -> Option<usize> {
        (pos != NIL).then(|| self.order[pos])
    }

    #[inline]
    fn contains(&self, other: usize) -> bool {
        let pos = self.position[other];
        pos != NIL && self.present[pos]
    }

    #[inline]
    fn first(&self) -> Option<usize> {
        self.at(self.head)
    }

    #[inline]
    fn second(&self) -> Option<usize> {
        if self.head == NIL {
            return None;
        }
        self.at(self.next[self.head])
    }

    #[inline]
    fn last(&self) -> Option<usize> {
        self.at(self.tail)
    }

    fn remove(&mut self, other: usize) -> bool {
        if !self.contains(other) {
            return false;
        }

        let pos = self.position[other];
        let (before, after) = (self.prev[pos], self.next[pos]);

        if before == NIL {
            self.head = after;
        } else {
            self.next[before] = after;
        }
        if after == NIL {
            self.tail = before;
        } else {
            self.prev[after] = before;
        }

        self.present[pos] = false;
        self.len -= 1;
        true
    }

    fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.first().map(|_| self.head), move |&pos| {
            let next = self.next[pos];
            (next != NIL).then_some(next)
        })
        .map(move |pos| self.order[pos])
    }
}

/// Mutable table of every participant's ranked preferences
///
/// Participants live in an arena addressed by index; keys are only used at
/// the boundary. Removal is always symmetric, so if X no longer lists Y then
/// Y no longer lists X.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceTable {
    keys: Vec<String>,
    index: HashMap<String, usize>,
    lists: Vec<PreferenceList>,
}

impl PreferenceTable {
    /// Build a table from complete, strictly ranked preference lists
    ///
    /// Every participant must rank every other participant exactly once.
    /// Participants are indexed in input order.
    pub fn from_lists<K: AsRef<str>>(lists: &[(K, Vec<K>)]) -> Result<Self, MatchingError> {
        let participant_count = lists.len();
        let mut keys = Vec::with_capacity(participant_count);
        let mut index = HashMap::with_capacity(participant_count);

        for (key, _) in lists {
            let key = key.as_ref();
            if index.insert(key.to_string(), keys.len()).is_some() {
                return Err(MatchingError::malformed(format!("duplicate participant key {}", key)));
            }
            keys.push(key.to_string());
        }

        let mut built = Vec::with_capacity(participant_count);
        for (owner, (key, ranked)) in lists.iter().enumerate() {
            let key = key.as_ref();
            if ranked.len() + 1 != participant_count {
                return Err(MatchingError::malformed(format!(
                    "{} ranks {} participants, expected {}",
                    key,
                    ranked.len(),
                    participant_count.saturating_sub(1)
                )));
            }

            let mut seen = HashSet::with_capacity(ranked.len());
            let mut order = Vec::with_capacity(ranked.len());
            for other in ranked {
                let other = other.as_ref();
                let other_idx = *index.get(other).ok_or_else(|| {
                    MatchingError::malformed(format!("{} ranks unknown participant {}", key, other))
                })?;
                if other_idx == owner {
                    return Err(MatchingError::malformed(format!("{} ranks itself", key)));
                }
                if !seen.insert(other_idx) {
                    return Err(MatchingError::malformed(format!("{} ranks {} more than once", key, other)));
                }
                order.push(other_idx);
            }

            built.push(PreferenceList::new(order, participant_count));
        }

        Ok(Self { keys, index, lists: built })
    }

    pub fn participant_count(&self) -> usize {
        self.keys.len()
    }

    /// Participant keys in index order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Rank of `y` in `x`'s list (0 = most preferred)
    ///
    /// Ranks are fixed at construction and keep their meaning as the list
    /// shrinks; relative order among remaining entries is unchanged.
    pub fn rank_of(&self, x: &str, y: &str) -> Result<usize, MatchingError> {
        let (xi, yi) = (self.require(x)?, self.require(y)?);
        if !self.lists[xi].contains(yi) {
            return Err(self.not_in_list(xi, yi));
        }
        Ok(self.rank(xi, yi))
    }

    /// Remove `y` from `x`'s list and `x` from `y`'s list
    pub fn remove(&mut self, x: &str, y: &str) -> Result<(), MatchingError> {
        let (xi, yi) = (self.require(x)?, self.require(y)?);
        if !self.remove_pair(xi, yi) {
            return Err(self.not_in_list(xi, yi));
        }
        Ok(())
    }

    pub fn first(&self, x: &str) -> Option<&str> {
        self.lookup(x).and_then(|xi| self.first_of(xi)).map(|i| self.key(i))
    }

    pub fn second(&self, x: &str) -> Option<&str> {
        self.lookup(x).and_then(|xi| self.second_of(xi)).map(|i| self.key(i))
    }

    pub fn worst(&self, x: &str) -> Option<&str> {
        self.lookup(x).and_then(|xi| self.last_of(xi)).map(|i| self.key(i))
    }

    pub fn is_singleton(&self, x: &str) -> bool {
        self.lookup(x).is_some_and(|xi| self.len_of(xi) == 1)
    }

    pub fn is_empty(&self, x: &str) -> bool {
        self.lookup(x).is_some_and(|xi| self.len_of(xi) == 0)
    }

    /// True when every list holds exactly one entry
    pub fn is_resolved(&self) -> bool {
        self.lists.iter().all(|list| list.len == 1)
    }

    /// Current list of `x`, most preferred first
    pub fn current_list(&self, x: &str) -> Option<Vec<&str>> {
        let xi = self.lookup(x)?;
        Some(self.lists[xi].iter().map(|i| self.key(i)).collect())
    }

    /// Every participant's current list, keyed by participant
    pub fn snapshot(&self) -> BTreeMap<String, Vec<String>> {
        self.keys
            .iter()
            .enumerate()
            .map(|(xi, key)| {
                let list = self.lists[xi].iter().map(|i| self.keys[i].clone()).collect();
                (key.clone(), list)
            })
            .collect()
    }

    pub(crate) fn key(&self, idx: usize) -> &str {
        &self.keys[idx]
    }

    pub(crate) fn rank(&self, x: usize, y: usize) -> usize {
        self.lists[x].position[y]
    }

    pub(crate) fn first_of(&self, x: usize) -> Option<usize> {
        self.lists[x].first()
    }

    pub(crate) fn second_of(&self, x: usize) -> Option<usize> {
        self.lists[x].second()
    }

    pub(crate) fn last_of(&self, x: usize) -> Option<usize> {
        self.lists[x].last()
    }

    pub(crate) fn len_of(&self, x: usize) -> usize {
        self.lists[x].len
    }

    /// Symmetric removal by index; false if the pair was already gone
    pub(crate) fn remove_pair(&mut self, x: usize, y: usize) -> bool {
        let removed = self.lists[x].remove(y);
        if removed {
            self.lists[y].remove(x);
        }
        removed
    }

    /// Drop every entry `x` ranks worse than `keep`, symmetrically
    ///
    /// Returns the participants that lost `x` from their own lists.
    pub(crate) fn truncate_after(&mut self, x: usize, keep: usize) -> Result<Vec<usize>, MatchingError> {
        if !self.lists[x].contains(keep) {
            return Err(self.not_in_list(x, keep));
        }

        let mut dropped = Vec::new();
        while let Some(worst) = self.lists[x].last() {
            if worst == keep {
                break;
            }
            self.remove_pair(x, worst);
            dropped.push(worst);
        }
        Ok(dropped)
    }

    pub(crate) fn not_in_list(&self, x: usize, y: usize) -> MatchingError {
        MatchingError::NotInList {
            participant: self.keys[x].clone(),
            other: self.keys[y].clone(),
        }
    }

    fn lookup(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    fn require(&self, key: &str) -> Result<usize, MatchingError> {
        self.lookup(key)
            .ok_or_else(|| MatchingError::malformed(format!("unknown participant {}", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four() -> PreferenceTable {
        PreferenceTable::from_lists(&[
            ("a", vec!["b", "c", "d"]),
            ("b", vec!["c", "a", "d"]),
            ("c", vec!["a", "b", "d"]),
            ("d", vec!["a", "b", "c"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_accessors_on_fresh_table() {
        let table = four();
        assert_eq!(table.participant_count(), 4);
        assert_eq!(table.first("a"), Some("b"));
        assert_eq!(table.second("a"), Some("c"));
        assert_eq!(table.worst("a"), Some("d"));
        assert_eq!(table.rank_of("b", "d"), Ok(2));
        assert!(!table.is_singleton("a"));
        assert!(!table.is_resolved());
    }

    #[test]
    fn test_remove_is_symmetric() {
        let mut table = four();
        table.remove("a", "c").unwrap();

        assert_eq!(table.current_list("a"), Some(vec!["b", "d"]));
        assert_eq!(table.current_list("c"), Some(vec!["b", "d"]));
        assert_eq!(
            table.rank_of("c", "a"),
            Err(MatchingError::NotInList { participant: "c".to_string(), other: "a".to_string() })
        );
        assert!(table.remove("c", "a").is_err());
    }

    #[test]
    fn test_ranks_keep_meaning_after_removal() {
        let mut table = four();
        table.remove("b", "c").unwrap();
        assert_eq!(table.rank_of("b", "a"), Ok(1));
        assert_eq!(table.first("b"), Some("a"));
    }

    #[test]
    fn test_truncate_after_drops_tail_symmetrically() {
        let mut table = four();
        let dropped = table.truncate_after(0, 1).unwrap();

        assert_eq!(dropped, vec![3, 2]);
        assert!(table.is_singleton("a"));
        assert_eq!(table.current_list("d"), Some(vec!["b", "c"]));
        assert_eq!(table.current_list("c"), Some(vec!["b", "d"]));
    }

    #[test]
    fn test_emptying_a_list() {
        let mut table = PreferenceTable::from_lists(&[("a", vec!["b"]), ("b", vec!["a"])]).unwrap();
        assert!(table.is_resolved());
        table.remove("b", "a").unwrap();
        assert!(table.is_empty("a"));
        assert!(table.is_empty("b"));
        assert_eq!(table.first("a"), None);
        assert_eq!(table.second("a"), None);
    }

    #[test]
    fn test_rejects_incomplete_list() {
        let err = PreferenceTable::from_lists(&[
            ("a", vec!["b"]),
            ("b", vec!["a", "c"]),
            ("c", vec!["a", "b"]),
        ])
        .unwrap_err();
        assert!(matches!(err, MatchingError::MalformedPreferences(_)));
    }

    #[test]
    fn test_rejects_self_reference_and_duplicates() {
        let self_ref = PreferenceTable::from_lists(&[("a", vec!["a"]), ("b", vec!["a"])]);
        assert!(matches!(self_ref, Err(MatchingError::MalformedPreferences(_))));

        let repeated = PreferenceTable::from_lists(&[
            ("a", vec!["b", "b"]),
            ("b", vec!["a", "c"]),
            ("c", vec!["a", "b"]),
        ]);
        assert!(matches!(repeated, Err(MatchingError::MalformedPreferences(_))));

        let duplicate_key = PreferenceTable::from_lists(&[("a", vec!["b"]), ("a", vec!["b"])]);
        assert!(matches!(duplicate_key, Err(MatchingError::MalformedPreferences(_))));
    }

    #[test]
    fn test_rejects_unknown_participant() {
        let err = PreferenceTable::from_lists(&[("a", vec!["z"]), ("b", vec!["a"])]).unwrap_err();
        assert_eq!(err, MatchingError::MalformedPreferences("a ranks unknown participant z".to_string()));
    }

    #[test]
    fn test_snapshot_reflects_current_lists() {
        let mut table = four();
        table.remove("d", "c").unwrap();
        let snapshot = table.snapshot();
        assert_eq!(snapshot["d"], vec!["a", "b"]);
        assert_eq!(snapshot["c"], vec!["a", "b"]);
        assert_eq!(snapshot.len(), 4);
    }
}
