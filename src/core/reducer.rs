use std::collections::VecDeque;

use crate::core::error::MatchingError;
use crate::core::table::PreferenceTable;

/// Phase 1 of the stable roommates algorithm: propose and reject
///
/// Every participant without an accepted proposal proposes to the head of
/// its list. The receiver keeps the proposal and drops everyone it ranks
/// below the proposer, which frees any previously held proposer. The loop
/// ends when every participant is held, or fails as soon as a list empties.
///
/// On success the table satisfies: `first(x) == y` iff `worst(y) == x`.
/// Feeding a reduced table back in leaves it unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProposalReducer;

impl ProposalReducer {
    pub fn new() -> Self {
        Self
    }

    pub fn reduce(&self, mut table: PreferenceTable) -> Result<PreferenceTable, MatchingError> {
        let participant_count = table.participant_count();
        let mut proposed_to: Vec<Option<usize>> = vec![None; participant_count];
        let mut free: VecDeque<usize> = (0..participant_count).collect();
        let mut proposals = 0usize;

        while let Some(proposer) = free.pop_front() {
            let receiver = table.first_of(proposer).ok_or_else(|| exhausted(&table, proposer))?;
            proposed_to[proposer] = Some(receiver);
            proposals += 1;

            // The proposer is still listed, so it beats whoever the receiver held
            for rejected in table.truncate_after(receiver, proposer)? {
                if table.len_of(rejected) == 0 {
                    return Err(exhausted(&table, rejected));
                }
                if proposed_to[rejected] == Some(receiver) {
                    proposed_to[rejected] = None;
                    free.push_back(rejected);
                }
            }
        }

        tracing::debug!(
            "Proposal phase finished after {} proposals over {} participants",
            proposals,
            participant_count
        );

        Ok(table)
    }
}

pub(crate) fn exhausted(table: &PreferenceTable, participant: usize) -> MatchingError {
    tracing::warn!("Preference list of {} exhausted", table.key(participant));
    MatchingError::NoStableMatching {
        participant: table.key(participant).to_string(),
    }
}
