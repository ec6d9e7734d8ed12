// Core algorithm exports
pub mod engine;
pub mod error;
pub mod reducer;
pub mod rotation;
pub mod similarity;
pub mod table;

pub use engine::MatchingEngine;
pub use error::MatchingError;
pub use reducer::ProposalReducer;
pub use rotation::{Rotation, RotationEliminator};
pub use similarity::{derive_preferences, similarity, PreferenceInput, SimilarityParams};
pub use table::PreferenceTable;
