// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Attributes, Participant, MatchedPair, Matching};
pub use requests::{ParticipantInput, SolveRequest};
pub use responses::{SolveResponse, RankedList, PreferencesResponse, RosterResponse, HealthResponse, ErrorResponse};
