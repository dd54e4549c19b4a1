//! Collaborator double returning canned thumbnails, geometries and scores.
//!
//! Lets the whole pipeline run without ImageMagick or ffmpeg installed.

use super::traits::{ImageInspector, ImageTransform, SimilarityMetric};
use super::{ImageGeometry, TransformRequest};
use crate::error::ToolError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

const TOOL_NAME: &str = "canned";

/// Canned answers for all three collaborator roles
///
/// - thumbnails: bytes written for a fingerprint transform of a path
/// - geometries: what inspection reports (default 640×480, upright)
/// - scores: the SSIM reported when a path is the reference (first) image
/// - reports: raw metric output replacing the scored report for a path
pub struct CannedToolkit {
    thumbnails: HashMap<PathBuf, Vec<u8>>,
    geometries: HashMap<PathBuf, ImageGeometry>,
    scores: HashMap<PathBuf, f64>,
    reports: HashMap<PathBuf, String>,
    default_geometry: ImageGeometry,
    default_score: f64,
    transform_calls: AtomicUsize,
    metric_calls: AtomicUsize,
}

impl CannedToolkit {
    pub fn new() -> Self {
        Self {
            thumbnails: HashMap::new(),
            geometries: HashMap::new(),
            scores: HashMap::new(),
            reports: HashMap::new(),
            default_geometry: ImageGeometry::new(640, 480),
            default_score: 0.0,
            transform_calls: AtomicUsize::new(0),
            metric_calls: AtomicUsize::new(0),
        }
    }

    /// Thumbnail bytes produced when fingerprinting `path`
    pub fn with_thumbnail(mut self, path: impl Into<PathBuf>, bytes: &[u8]) -> Self {
        self.thumbnails.insert(path.into(), bytes.to_vec());
        self
    }

    /// Geometry reported for `path`
    pub fn with_geometry(mut self, path: impl Into<PathBuf>, geometry: ImageGeometry) -> Self {
        self.geometries.insert(path.into(), geometry);
        self
    }

    /// Score reported whenever `first` is the reference image
    pub fn with_score(mut self, first: impl Into<PathBuf>, score: f64) -> Self {
        self.scores.insert(first.into(), score);
        self
    }

    /// Raw metric output returned whenever `first` is the reference image
    pub fn with_report(mut self, first: impl Into<PathBuf>, report: &str) -> Self {
        self.reports.insert(first.into(), report.to_string());
        self
    }

    /// Number of transforms requested so far
    pub fn transform_calls(&self) -> usize {
        self.transform_calls.load(Ordering::SeqCst)
    }

    /// Number of metric comparisons requested so far
    pub fn metric_calls(&self) -> usize {
        self.metric_calls.load(Ordering::SeqCst)
    }

    fn write(dest: &Path, bytes: &[u8]) -> Result<(), ToolError> {
        fs::write(dest, bytes).map_err(|source| ToolError::Io {
            path: dest.to_path_buf(),
            source,
        })
    }
}

impl Default for CannedToolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageTransform for CannedToolkit {
    fn transform(
        &self,
        source: &Path,
        request: &TransformRequest,
        dest: &Path,
    ) -> Result<(), ToolError> {
        self.transform_calls.fetch_add(1, Ordering::SeqCst);

        if request.bilevel {
            let bytes = self.thumbnails.get(source).ok_or_else(|| ToolError::Failed {
                tool: TOOL_NAME.to_string(),
                path: source.to_path_buf(),
                status: "exit status: 1".to_string(),
                stderr: "no canned thumbnail".to_string(),
            })?;
            Self::write(dest, bytes)
        } else {
            Self::write(dest, source.to_string_lossy().as_bytes())
        }
    }
}

impl ImageInspector for CannedToolkit {
    fn inspect(&self, path: &Path) -> Result<ImageGeometry, ToolError> {
        Ok(self
            .geometries
            .get(path)
            .copied()
            .unwrap_or(self.default_geometry))
    }
}

impl SimilarityMetric for CannedToolkit {
    fn compare(&self, first: &Path, _second: &Path) -> Result<String, ToolError> {
        self.metric_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(report) = self.reports.get(first) {
            return Ok(report.clone());
        }

        let score = self.scores.get(first).copied().unwrap_or(self.default_score);
        Ok(format!(
            "Input #0, image2, from '{first}':\n\
             [Parsed_ssim_0 @ 0x55d0c0] SSIM Y:{score:.6} (inf) U:{score:.6} (inf) \
             V:{score:.6} (inf) All:{score:.6} (inf)\n",
            first = first.display(),
        ))
    }
}
