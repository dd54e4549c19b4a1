//! # Reporter Module
//!
//! Turns scored pairs into the final duplicate listing.
//!
//! Only pairs at or above the threshold are reported, highest score
//! first. Each entry carries both images' dimensions so the user can
//! sanity-check the match before acting on it.
//!
//! ## Manual confirmation
//! With a [`Confirmer`], every above-threshold pair is shown to the user
//! and a "no" drops it from the report. Answers are never cached, so a
//! rejected pair is asked about again on the next run.

mod confirm;

pub use confirm::{Confirmer, TerminalConfirmer};

use crate::core::comparator::{ScoredPair, SimilarityThreshold};
use crate::core::tools::{Dimensions, ImageInspector};
use crate::error::DuplicateFinderError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Width of the dimension column in text output
const DIMENSION_COLUMN: usize = 13;

/// One image of a reported pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub path: PathBuf,
    /// Stored pixel dimensions
    pub dimensions: Dimensions,
}

/// A pair that cleared the threshold (and the user, in manual mode)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateEntry {
    pub score: f64,
    /// True when the user answered "yes" in manual mode
    pub confirmed: bool,
    pub first: ImageInfo,
    pub second: ImageInfo,
}

/// The final listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub threshold: f64,
    pub entries: Vec<DuplicateEntry>,
}

impl DuplicateReport {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Line-oriented text rendering; empty when nothing was found
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let _ = writeln!(out);
            let _ = writeln!(out, "Images are potentially the same (SSIM = {}):", entry.score);
            if entry.confirmed {
                let _ = writeln!(out, "You confirmed that images ARE the same:");
            }
            for image in [&entry.first, &entry.second] {
                let _ = writeln!(
                    out,
                    "    {:<width$}  {}",
                    image.dimensions.to_string(),
                    image.path.display(),
                    width = DIMENSION_COLUMN
                );
            }
        }
        out
    }
}

/// Filters, confirms and describes scored pairs
pub struct ReportBuilder {
    threshold: SimilarityThreshold,
    inspector: Arc<dyn ImageInspector>,
}

impl ReportBuilder {
    pub fn new(threshold: SimilarityThreshold, inspector: Arc<dyn ImageInspector>) -> Self {
        Self {
            threshold,
            inspector,
        }
    }

    /// Build the report from every scored pair of a run.
    ///
    /// Confirmation runs sequentially, one pair at a time, in report order.
    pub fn build(
        &self,
        scored: &[ScoredPair],
        mut confirmer: Option<&mut dyn Confirmer>,
    ) -> Result<DuplicateReport, DuplicateFinderError> {
        let mut candidates: Vec<&ScoredPair> = scored
            .iter()
            .filter(|pair| self.threshold.is_duplicate(pair.score))
            .collect();
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.first.cmp(&b.first))
                .then_with(|| a.second.cmp(&b.second))
        });

        let mut entries = Vec::with_capacity(candidates.len());
        for pair in candidates {
            let confirmed = match confirmer.as_deref_mut() {
                Some(confirmer) => {
                    if !confirmer.confirm(pair)? {
                        debug!(
                            first = %pair.first.display(),
                            second = %pair.second.display(),
                            "pair rejected by user"
                        );
                        continue;
                    }
                    true
                }
                None => false,
            };

            entries.push(DuplicateEntry {
                score: pair.score,
                confirmed,
                first: self.describe(&pair.first)?,
                second: self.describe(&pair.second)?,
            });
        }

        Ok(DuplicateReport {
            threshold: self.threshold.minimum(),
            entries,
        })
    }

    fn describe(&self, path: &Path) -> Result<ImageInfo, DuplicateFinderError> {
        let geometry = self.inspector.inspect(path)?;
        Ok(ImageInfo {
            path: path.to_path_buf(),
            dimensions: geometry.stored,
        })
    }
}
