use std::collections::BTreeMap;

use crate::core::error::MatchingError;
use crate::core::reducer::ProposalReducer;
use crate::core::rotation::RotationEliminator;
use crate::core::table::PreferenceTable;
use crate::models::Matching;

/// Stable roommates solver (Irving's algorithm)
///
/// # Pipeline Stages
/// 1. Build and validate the preference table
/// 2. Proposal phase (`ProposalReducer`)
/// 3. Rotation elimination (`RotationEliminator`), skipped when phase 1
///    already left every list with a single entry
/// 4. Read off partners and check symmetry
///
/// The engine holds no state between calls; every call owns its own table.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchingEngine {
    reducer: ProposalReducer,
    eliminator: RotationEliminator,
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Solve a stable roommates instance
    ///
    /// # Arguments
    /// * `preferences` - Each participant with its complete ranking of all
    ///   others, most preferred first
    ///
    /// # Returns
    /// The stable matching, or `NoStableMatching` when none exists
    pub fn solve<K: AsRef<str>>(&self, preferences: &[(K, Vec<K>)]) -> Result<Matching, MatchingError> {
        if preferences.is_empty() {
            return Ok(Matching::empty());
        }
        if preferences.len() == 1 {
            return Err(MatchingError::malformed("a single participant cannot be paired"));
        }

        tracing::info!("Solving stable roommates for {} participants", preferences.len());

        let table = PreferenceTable::from_lists(preferences)?;
        let table = self.reducer.reduce(table)?;

        let table = if table.is_resolved() {
            tracing::debug!("Proposal phase resolved every list, skipping rotation phase");
            table
        } else {
            self.eliminator.eliminate(table)?
        };

        let matching = extract(&table)?;

        tracing::info!("Stable matching found with {} pairs", matching.len() / 2);

        Ok(matching)
    }
}

/// Read each participant's sole remaining entry as its partner
fn extract(table: &PreferenceTable) -> Result<Matching, MatchingError> {
    let mut partners = BTreeMap::new();

    for key in table.keys() {
        if !table.is_singleton(key) {
            let reason = format!("{} does not hold exactly one entry after solving", key);
            tracing::error!("{}", reason);
            return Err(MatchingError::InternalInvariant(reason));
        }

        let partner = table.first(key).unwrap_or_default();
        if table.first(partner) != Some(key.as_str()) {
            let reason = format!("{} is matched to {} but not the other way round", key, partner);
            tracing::error!("{}", reason);
            return Err(MatchingError::InternalInvariant(reason));
        }

        partners.insert(key.clone(), partner.to_string());
    }

    Ok(Matching::from_partners(partners))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_gives_empty_matching() {
        let empty: [(&str, Vec<&str>); 0] = [];
        let matching = MatchingEngine::new().solve(&empty).unwrap();
        assert!(matching.is_empty());
    }

    #[test]
    fn test_single_participant_is_malformed() {
        let result = MatchingEngine::new().solve(&[("solo", vec![])]);
        assert!(matches!(result, Err(MatchingError::MalformedPreferences(_))));
    }

    #[test]
    fn test_two_participants_pair_up() {
        let matching = MatchingEngine::new()
            .solve(&[("a", vec!["b"]), ("b", vec!["a"])])
            .unwrap();
        assert_eq!(matching.partner_of("a"), Some("b"));
        assert_eq!(matching.partner_of("b"), Some("a"));
    }

    #[test]
    fn test_malformed_input_is_reported_before_solving() {
        let result = MatchingEngine::new().solve(&[
            ("a", vec!["b", "c"]),
            ("b", vec!["a", "c"]),
            ("c", vec!["a"]),
        ]);
        assert!(matches!(result, Err(MatchingError::MalformedPreferences(_))));
    }

    #[test]
    fn test_extract_rejects_unresolved_table() {
        let table = PreferenceTable::from_lists(&[
            ("a", vec!["b", "c", "d"]),
            ("b", vec!["a", "c", "d"]),
            ("c", vec!["a", "b", "d"]),
            ("d", vec!["a", "b", "c"]),
        ])
        .unwrap();
        assert!(matches!(extract(&table), Err(MatchingError::InternalInvariant(_))));
    }
}
