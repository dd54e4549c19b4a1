//! # Fingerprint Module
//!
//! Computes the cheap perceptual fingerprint used for bucketing.
//!
//! ## How It Works
//! 1. Ask the transform collaborator for an auto-oriented thumbnail that
//!    fills a small square, quantized to two tones, metadata stripped
//! 2. Hash the thumbnail file's bytes with xxh3
//!
//! Collisions are expected: a fingerprint only says "worth comparing".
//! 8 pixels collides too much, 16 is the calibrated default.

use crate::core::tools::{ImageTransform, TransformRequest};
use crate::error::ToolError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::Builder;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

/// Default thumbnail side in pixels
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 16;

/// Opaque bucketing value derived from a two-tone thumbnail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Checksum of a rendered thumbnail
    pub fn of_thumbnail(bytes: &[u8]) -> Self {
        Self(xxh3_64(bytes))
    }

    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Produces fingerprints through an [`ImageTransform`]
#[derive(Clone)]
pub struct FingerprintExtractor {
    transform: Arc<dyn ImageTransform>,
    thumbnail_size: u32,
}

impl FingerprintExtractor {
    pub fn new(transform: Arc<dyn ImageTransform>) -> Self {
        Self {
            transform,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
        }
    }

    /// Set the thumbnail side
    ///
    /// Smaller sizes over-collide, larger sizes miss recompressed copies.
    pub fn thumbnail_size(mut self, size: u32) -> Self {
        self.thumbnail_size = size;
        self
    }

    /// Fingerprint one image. Any collaborator failure is returned as is.
    pub fn extract(&self, path: &Path) -> Result<(PathBuf, Fingerprint), ToolError> {
        let thumbnail = Builder::new()
            .prefix("fingerprint-")
            .suffix(".png")
            .tempfile()
            .map_err(|source| ToolError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        self.transform.transform(
            path,
            &TransformRequest::thumbnail(self.thumbnail_size),
            thumbnail.path(),
        )?;

        let bytes = fs::read(thumbnail.path()).map_err(|source| ToolError::Io {
            path: thumbnail.path().to_path_buf(),
            source,
        })?;
        let fingerprint = Fingerprint::of_thumbnail(&bytes);
        debug!(path = %path.display(), %fingerprint, "fingerprinted");

        Ok((path.to_path_buf(), fingerprint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tools::CannedToolkit;

    fn extractor(tools: CannedToolkit) -> FingerprintExtractor {
        FingerprintExtractor::new(Arc::new(tools))
    }

    #[test]
    fn same_image_twice_gives_same_fingerprint() {
        let extractor = extractor(CannedToolkit::new().with_thumbnail("/a.jpg", b"\x01\x02\x03"));

        let (_, first) = extractor.extract(Path::new("/a.jpg")).unwrap();
        let (_, second) = extractor.extract(Path::new("/a.jpg")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn identical_thumbnails_collide() {
        let extractor = extractor(
            CannedToolkit::new()
                .with_thumbnail("/a.jpg", b"same")
                .with_thumbnail("/b.jpg", b"same")
                .with_thumbnail("/c.jpg", b"different"),
        );

        let (_, a) = extractor.extract(Path::new("/a.jpg")).unwrap();
        let (_, b) = extractor.extract(Path::new("/b.jpg")).unwrap();
        let (_, c) = extractor.extract(Path::new("/c.jpg")).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn fingerprint_matches_direct_checksum() {
        let extractor = extractor(CannedToolkit::new().with_thumbnail("/a.jpg", b"pixels"));

        let (path, fingerprint) = extractor.extract(Path::new("/a.jpg")).unwrap();

        assert_eq!(path, PathBuf::from("/a.jpg"));
        assert_eq!(fingerprint, Fingerprint::of_thumbnail(b"pixels"));
    }

    #[test]
    fn transform_failure_is_returned() {
        let extractor = extractor(CannedToolkit::new());
        assert!(extractor.extract(Path::new("/missing.jpg")).is_err());
    }

    #[test]
    fn fingerprint_serializes_as_plain_integer() {
        let json = serde_json::to_string(&Fingerprint::from_raw(42)).unwrap();
        assert_eq!(json, "42");
    }
}
