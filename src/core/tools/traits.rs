//! Collaborator trait definitions.

use super::{ImageGeometry, TransformRequest};
use crate::error::ToolError;
use std::path::Path;

/// Writes a transformed rendition of an image
pub trait ImageTransform: Send + Sync {
    /// Transform `source` according to `request` and write it to `dest`
    fn transform(
        &self,
        source: &Path,
        request: &TransformRequest,
        dest: &Path,
    ) -> Result<(), ToolError>;
}

/// Reads dimensions and orientation of an image
pub trait ImageInspector: Send + Sync {
    fn inspect(&self, path: &Path) -> Result<ImageGeometry, ToolError>;
}

/// Computes a similarity report for two equally sized images
pub trait SimilarityMetric: Send + Sync {
    /// Returns the tool's textual report.
    ///
    /// The report must contain exactly one summary line carrying the
    /// global score; parsing is the verifier's job.
    fn compare(&self, first: &Path, second: &Path) -> Result<String, ToolError>;
}

/// Builds and shows a side-by-side preview for manual confirmation
pub trait PreviewComposer: Send + Sync {
    /// Compose both images side by side into `dest`
    fn compose(&self, first: &Path, second: &Path, dest: &Path) -> Result<(), ToolError>;

    /// Open the composed preview for the user
    fn show(&self, preview: &Path) -> Result<(), ToolError>;
}
