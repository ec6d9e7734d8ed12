use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{Attributes, Participant};

/// One participant as submitted by a client
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ParticipantInput {
    #[validate(length(min = 1))]
    pub key: String,
    #[serde(default)]
    pub name: String,
    pub attributes: Attributes,
}

impl From<ParticipantInput> for Participant {
    fn from(input: ParticipantInput) -> Self {
        Participant::new(input.key, input.name, input.attributes)
    }
}

/// Request to rank or pair a set of participants
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SolveRequest {
    #[validate(nested)]
    pub participants: Vec<ParticipantInput>,
    /// Overrides the configured agreeableness inversion for this request
    #[serde(alias = "invert_agreeableness", rename = "invertAgreeableness", default)]
    pub invert_agreeableness: Option<bool>,
}

impl SolveRequest {
    pub fn into_participants(self) -> Vec<Participant> {
        self.participants.into_iter().map(Participant::from).collect()
    }
}
