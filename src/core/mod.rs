//! # Core Module
//!
//! The UI-agnostic matching engine.
//!
//! ## Modules
//! - `scanner` - Expands input paths into image references
//! - `tools` - Contracts for the external image collaborators
//! - `fingerprint` - Cheap perceptual fingerprint per image
//! - `comparator` - Buckets fingerprints and generates candidate pairs
//! - `verifier` - Precise structural similarity per candidate pair
//! - `cache` - Persists fingerprints and scores across runs
//! - `pipeline` - Runs the two pooled stages
//! - `reporter` - Filters, confirms and formats duplicates

pub mod cache;
pub mod comparator;
pub mod fingerprint;
pub mod pipeline;
pub mod reporter;
pub mod scanner;
pub mod tools;
pub mod verifier;

// Re-export commonly used types
pub use comparator::{CandidateCluster, CandidatePair, ScoredPair, SimilarityThreshold};
pub use fingerprint::Fingerprint;
pub use reporter::DuplicateReport;
