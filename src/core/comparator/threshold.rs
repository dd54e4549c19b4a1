//! Similarity threshold that promotes verified pairs to duplicates.

use crate::error::DuplicateFinderError;

/// Minimum SSIM for a pair to be reported (inclusive)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityThreshold {
    minimum: f64,
}

impl SimilarityThreshold {
    /// Create a threshold; must lie in [0, 1]
    pub fn new(minimum: f64) -> Result<Self, DuplicateFinderError> {
        if !(0.0..=1.0).contains(&minimum) {
            return Err(DuplicateFinderError::Config(format!(
                "similarity threshold {minimum} must be between 0 and 1"
            )));
        }
        Ok(Self { minimum })
    }

    /// Fewer reports, only near-identical images (0.9)
    pub fn strict() -> Self {
        Self { minimum: 0.9 }
    }

    /// Tolerates recompression and light edits (0.8, default)
    pub fn balanced() -> Self {
        Self { minimum: 0.8 }
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    pub fn is_duplicate(&self, score: f64) -> bool {
        score >= self.minimum
    }
}

impl Default for SimilarityThreshold {
    fn default() -> Self {
        Self::balanced()
    }
}
