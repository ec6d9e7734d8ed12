use crate::core::error::MatchingError;
use crate::core::reducer::exhausted;
use crate::core::table::PreferenceTable;

/// A rotation in a reduced table
///
/// Cyclic sequence of participants `x0..x(r-1)` where each `x(i+1)` is the
/// worst entry of `second(x(i))`. Only lives for the duration of one
/// elimination step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    members: Vec<usize>,
    seconds: Vec<usize>,
}

impl Rotation {
    fn from_members(table: &PreferenceTable, members: Vec<usize>) -> Result<Self, MatchingError> {
        let seconds = members
            .iter()
            .map(|&member| second_or_invariant(table, member))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { members, seconds })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// `(x(i), second(x(i)))` pairs as keys, in cycle order
    pub fn pairs<'a>(&self, table: &'a PreferenceTable) -> Vec<(&'a str, &'a str)> {
        self.members
            .iter()
            .zip(&self.seconds)
            .map(|(&member, &second)| (table.key(member), table.key(second)))
            .collect()
    }
}

/// Phase 2 of the stable roommates algorithm: rotation elimination
///
/// Expects a table produced by `ProposalReducer`. The search path is kept
/// between eliminations; only its tail is re-walked, which keeps the whole
/// phase within O(N²).
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationEliminator;

impl RotationEliminator {
    pub fn new() -> Self {
        Self
    }

    /// Eliminate rotations until every list is a singleton
    pub fn eliminate(&self, mut table: PreferenceTable) -> Result<PreferenceTable, MatchingError> {
        let participant_count = table.participant_count();
        let mut path: Vec<usize> = Vec::new();
        let mut on_path: Vec<Option<usize>> = vec![None; participant_count];
        let mut cursor = 0;
        let mut eliminated = 0usize;

        loop {
            while let Some(&top) = path.last() {
                if table.len_of(top) > 1 {
                    break;
                }
                path.pop();
                on_path[top] = None;
            }

            if path.is_empty() {
                // Lists never grow, so participants behind the cursor stay settled
                while cursor < participant_count && table.len_of(cursor) <= 1 {
                    if table.len_of(cursor) == 0 {
                        return Err(exhausted(&table, cursor));
                    }
                    cursor += 1;
                }
                if cursor == participant_count {
                    break;
                }
                on_path[cursor] = Some(0);
                path.push(cursor);
            }

            let top = path[path.len() - 1];
            let next = successor(&table, top)?;

            match on_path[next] {
                Some(start) => {
                    let members: Vec<usize> = path.drain(start..).collect();
                    for &member in &members {
                        on_path[member] = None;
                    }
                    let rotation = Rotation::from_members(&table, members)?;
                    tracing::trace!("Eliminating rotation {:?}", rotation.pairs(&table));
                    apply(&mut table, &rotation)?;
                    eliminated += 1;
                }
                None => {
                    on_path[next] = Some(path.len());
                    path.push(next);
                }
            }
        }

        tracing::debug!("Rotation phase eliminated {} rotations", eliminated);

        Ok(table)
    }

    /// Find one rotation without modifying the table
    ///
    /// Starts from the first participant whose list has more than one entry.
    /// Returns `None` when the table is already resolved.
    pub fn find_rotation(&self, table: &PreferenceTable) -> Option<Rotation> {
        let start = (0..table.participant_count()).find(|&x| table.len_of(x) > 1)?;
        let mut path = vec![start];
        let mut on_path = vec![None; table.participant_count()];
        on_path[start] = Some(0);

        loop {
            let next = successor(table, path[path.len() - 1]).ok()?;
            if let Some(at) = on_path[next] {
                return Rotation::from_members(table, path.split_off(at)).ok();
            }
            on_path[next] = Some(path.len());
            path.push(next);
        }
    }
}

/// Next participant on the search path: worst entry of `second(x)`
fn successor(table: &PreferenceTable, x: usize) -> Result<usize, MatchingError> {
    let second = second_or_invariant(table, x)?;
    table.last_of(second).ok_or_else(|| {
        MatchingError::InternalInvariant(format!("{} has an empty list while still listed", table.key(second)))
    })
}

fn second_or_invariant(table: &PreferenceTable, x: usize) -> Result<usize, MatchingError> {
    table.second_of(x).ok_or_else(|| {
        MatchingError::InternalInvariant(format!("rotation path reached {} with fewer than two entries", table.key(x)))
    })
}

/// Each `second(x(i))` drops everyone it ranks below `x(i)`
fn apply(table: &mut PreferenceTable, rotation: &Rotation) -> Result<(), MatchingError> {
    for (&member, &second) in rotation.members.iter().zip(&rotation.seconds) {
        let dropped = table
            .truncate_after(second, member)
            .map_err(|e| MatchingError::InternalInvariant(e.to_string()))?;
        for participant in dropped {
            if table.len_of(participant) == 0 {
                return Err(exhausted(table, participant));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reducer::ProposalReducer;

    fn reduced(lists: &[(&str, Vec<&str>)]) -> PreferenceTable {
        ProposalReducer::new()
            .reduce(PreferenceTable::from_lists(lists).unwrap())
            .unwrap()
    }

    fn six() -> PreferenceTable {
        reduced(&[
            ("1", vec!["4", "6", "2", "5", "3"]),
            ("2", vec!["6", "3", "5", "1", "4"]),
            ("3", vec!["4", "5", "1", "6", "2"]),
            ("4", vec!["2", "6", "5", "1", "3"]),
            ("5", vec!["4", "2", "3", "6", "1"]),
            ("6", vec!["5", "1", "4", "2", "3"]),
        ])
    }

    #[test]
    fn test_find_rotation_in_reduced_table() {
        let table = six();
        let rotation = RotationEliminator::new().find_rotation(&table).unwrap();

        assert_eq!(rotation.len(), 2);
        assert_eq!(rotation.pairs(&table), vec![("3", "2"), ("4", "5")]);
    }

    #[test]
    fn test_eliminate_resolves_table() {
        let table = RotationEliminator::new().eliminate(six()).unwrap();

        assert!(table.is_resolved());
        assert_eq!(table.first("1"), Some("6"));
        assert_eq!(table.first("2"), Some("3"));
        assert_eq!(table.first("4"), Some("5"));
    }

    #[test]
    fn test_cycle_of_four_eliminates_one_rotation() {
        let table = reduced(&[
            ("a", vec!["b", "c", "d"]),
            ("b", vec!["c", "d", "a"]),
            ("c", vec!["d", "a", "b"]),
            ("d", vec!["a", "b", "c"]),
        ]);
        let rotation = RotationEliminator::new().find_rotation(&table).unwrap();
        assert_eq!(rotation.len(), 4);

        let table = RotationEliminator::new().eliminate(table).unwrap();
        assert_eq!(table.first("a"), Some("c"));
        assert_eq!(table.first("b"), Some("d"));
    }

    #[test]
    fn test_resolved_table_has_no_rotation() {
        let table = reduced(&[
            ("a", vec!["b", "c", "d"]),
            ("b", vec!["a", "c", "d"]),
            ("c", vec!["d", "a", "b"]),
            ("d", vec!["c", "a", "b"]),
        ]);
        assert!(table.is_resolved());
        assert!(RotationEliminator::new().find_rotation(&table).is_none());

        let after = RotationEliminator::new().eliminate(table.clone()).unwrap();
        assert_eq!(after, table);
    }

    #[test]
    fn test_odd_instance_is_infeasible() {
        let table = reduced(&[
            ("a", vec!["b", "c"]),
            ("b", vec!["c", "a"]),
            ("c", vec!["a", "b"]),
        ]);
        let result = RotationEliminator::new().eliminate(table);
        assert!(matches!(result, Err(MatchingError::NoStableMatching { .. })));
    }
}
