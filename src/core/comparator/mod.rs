//! # Comparator Module
//!
//! Narrows the collection down to pairs worth verifying.
//!
//! ## How It Works
//! 1. Group images by exact fingerprint equality; singletons are dropped
//! 2. Expand each cluster into all unordered pairs of distinct members
//! 3. After verification, a threshold promotes pairs to duplicates
//!
//! Only images inside one cluster are ever compared, so a cluster of
//! size k costs k(k-1)/2 verifications instead of one per image pair in
//! the whole collection.

mod bucket;
mod pairs;
mod threshold;

pub use bucket::bucket_by_fingerprint;
pub use pairs::generate_pairs;
pub use threshold::SimilarityThreshold;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Images sharing one fingerprint; always at least two members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCluster {
    members: Vec<PathBuf>,
}

impl CandidateCluster {
    /// Members in path order
    pub fn members(&self) -> &[PathBuf] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of pairs this cluster expands to
    pub fn pair_count(&self) -> usize {
        self.len() * self.len().saturating_sub(1) / 2
    }
}

/// Unordered pair of distinct images drawn from one cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePair {
    pub first: PathBuf,
    pub second: PathBuf,
}

impl CandidatePair {
    pub fn new(first: impl Into<PathBuf>, second: impl Into<PathBuf>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Same pair with the members swapped
    pub fn reversed(&self) -> Self {
        Self {
            first: self.second.clone(),
            second: self.first.clone(),
        }
    }
}

/// A verified pair with its structural similarity in [0, 1]
///
/// `first` is the narrower image when the verifier computed the score;
/// cached scores keep the order of the candidate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPair {
    pub first: PathBuf,
    pub second: PathBuf,
    pub score: f64,
}

impl ScoredPair {
    pub fn new(first: impl Into<PathBuf>, second: impl Into<PathBuf>, score: f64) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            score,
        }
    }
}
