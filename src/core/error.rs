use thiserror::Error;

/// Errors produced while building or solving a preference table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchingError {
    /// Input lists are incomplete, inconsistent, or too small to pair
    #[error("Malformed preferences: {0}")]
    MalformedPreferences(String),

    /// The instance has no stable matching; not a bug
    #[error("No stable matching exists: preference list of {participant} was exhausted")]
    NoStableMatching { participant: String },

    /// Symmetry or table consistency broke after solving
    #[error("Internal invariant violated: {0}")]
    InternalInvariant(String),

    #[error("{other} is not in the current preference list of {participant}")]
    NotInList { participant: String, other: String },
}

impl MatchingError {
    /// True when the error is a legitimate outcome of the instance rather
    /// than bad input or a defect
    pub fn is_domain_outcome(&self) -> bool {
        matches!(self, MatchingError::NoStableMatching { .. })
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        MatchingError::MalformedPreferences(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_no_stable_matching_is_domain_outcome() {
        let infeasible = MatchingError::NoStableMatching { participant: "a".to_string() };
        assert!(infeasible.is_domain_outcome());
        assert!(!MatchingError::malformed("bad").is_domain_outcome());
        assert!(!MatchingError::InternalInvariant("asym".to_string()).is_domain_outcome());
    }

    #[test]
    fn test_error_messages_name_participants() {
        let err = MatchingError::NotInList {
            participant: "a".to_string(),
            other: "b".to_string(),
        };
        assert_eq!(err.to_string(), "b is not in the current preference list of a");
    }
}
