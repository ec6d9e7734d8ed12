//! Roommate Match - stable roommate pairing from personality survey scores
//!
//! This library provides the stable roommates engine (Irving's algorithm)
//! together with the glue around it: similarity-based preference derivation,
//! a CSV roster loader, notification composition and an HTTP surface.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{derive_preferences, MatchingEngine, MatchingError, PreferenceTable, SimilarityParams};
pub use crate::models::{Attributes, Matching, MatchedPair, Participant};
