use std::cmp::Ordering;
use std::collections::HashSet;

use crate::core::error::MatchingError;
use crate::models::{Attributes, Participant};

/// Ranked preference lists in participant input order
pub type PreferenceInput = Vec<(String, Vec<String>)>;

/// Index of agreeableness in `Attributes::as_array`
const AGREEABLENESS: usize = 3;

/// Parameters of the similarity measure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarityParams {
    /// Negate the *compared* participant's agreeableness before measuring.
    ///
    /// Pairs agreeable people with less agreeable ones. The measure stays
    /// symmetric since the agreeableness term becomes `(a + b)²`.
    pub invert_agreeableness: bool,
}

impl Default for SimilarityParams {
    fn default() -> Self {
        Self {
            invert_agreeableness: true,
        }
    }
}

/// Calculate how similar `other` is to `own` (lower = more similar)
///
/// # Arguments
/// * `own` - Scores of the participant doing the ranking
/// * `other` - Scores of the participant being ranked
/// * `params` - Similarity parameters
///
/// # Returns
/// Euclidean distance between the two score vectors
#[inline]
pub fn similarity(own: &Attributes, other: &Attributes, params: &SimilarityParams) -> f64 {
    let mut theirs = other.as_array();
    if params.invert_agreeableness {
        theirs[AGREEABLENESS] = -theirs[AGREEABLENESS];
    }

    own.as_array()
        .iter()
        .zip(theirs)
        .map(|(mine, theirs)| (mine - theirs).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Derive every participant's full ranked preference list
///
/// Others are ordered by ascending similarity. Ties keep input order and
/// NaN distances rank last, so each list is a strict total order.
pub fn derive_preferences(
    participants: &[Participant],
    params: &SimilarityParams,
) -> Result<PreferenceInput, MatchingError> {
    let mut seen = HashSet::with_capacity(participants.len());
    for participant in participants {
        if !seen.insert(participant.key.as_str()) {
            return Err(MatchingError::malformed(format!(
                "duplicate participant key {}",
                participant.key
            )));
        }
    }

    let preferences = participants
        .iter()
        .map(|participant| {
            let mut scored: Vec<(f64, &Participant)> = participants
                .iter()
                .filter(|other| other.key != participant.key)
                .map(|other| (similarity(&participant.attributes, &other.attributes, params), other))
                .collect();

            scored.sort_by(|a, b| by_distance(a.0, b.0));

            let ranking = scored.into_iter().map(|(_, other)| other.key.clone()).collect();
            (participant.key.clone(), ranking)
        })
        .collect();

    Ok(preferences)
}

/// Ascending distance with every NaN after every number, whatever its sign
fn by_distance(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}
