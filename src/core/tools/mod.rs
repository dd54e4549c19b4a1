//! # Tools Module
//!
//! Narrow contracts for the external image collaborators.
//!
//! The engine never touches pixels itself. It asks for:
//! - a **transform** (thumbnail, forced resize) written to a file
//! - an **inspection** (width, height, EXIF orientation)
//! - a **similarity metric** report for two equally sized images
//!
//! ## Implementations
//! - `MagickTransform` / `MagickPreview` - ImageMagick `convert`
//! - `ExifInspector` - image header + kamadak-exif, in process
//! - `FfmpegSsim` - `ffmpeg -lavfi ssim`
//! - `CannedToolkit` - canned answers for tests and dry runs

mod canned;
mod ffmpeg;
mod inspect;
mod magick;
mod process;
mod traits;

pub use canned::CannedToolkit;
pub use ffmpeg::FfmpegSsim;
pub use inspect::ExifInspector;
pub use magick::{MagickPreview, MagickTransform};
pub use traits::{ImageInspector, ImageTransform, PreviewComposer, SimilarityMetric};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Target geometry of a transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    /// Resize to cover at least `width`×`height`, then crop to exactly that
    Fill { width: u32, height: u32 },
    /// Force exactly `width`×`height`, ignoring aspect ratio
    Exact { width: u32, height: u32 },
}

/// A transform request handed to an [`ImageTransform`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformRequest {
    pub geometry: Geometry,
    /// Apply the EXIF orientation before resizing
    pub auto_orient: bool,
    /// Quantize to two tone levels
    pub bilevel: bool,
    /// Drop all metadata from the output
    pub strip: bool,
}

impl TransformRequest {
    /// Two-tone square thumbnail used for fingerprinting
    pub fn thumbnail(size: u32) -> Self {
        Self {
            geometry: Geometry::Fill {
                width: size,
                height: size,
            },
            auto_orient: true,
            bilevel: true,
            strip: true,
        }
    }

    /// Non-aspect-preserving resize used before the similarity metric
    pub fn resize_exact(dimensions: Dimensions) -> Self {
        Self {
            geometry: Geometry::Exact {
                width: dimensions.width,
                height: dimensions.height,
            },
            auto_orient: true,
            bilevel: false,
            strip: true,
        }
    }
}

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// What an [`ImageInspector`] reports about a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageGeometry {
    /// Stored (not displayed) dimensions
    pub stored: Dimensions,
    /// EXIF orientation code, 1 when absent
    pub orientation: u16,
}

impl ImageGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            stored: Dimensions::new(width, height),
            orientation: 1,
        }
    }

    pub fn with_orientation(mut self, orientation: u16) -> Self {
        self.orientation = orientation;
        self
    }

    /// Orientation codes 5-8 rotate by 90° or 270°
    pub fn is_quarter_turn(&self) -> bool {
        matches!(self.orientation, 5..=8)
    }

    /// Dimensions as displayed after applying the orientation
    pub fn displayed(&self) -> Dimensions {
        if self.is_quarter_turn() {
            Dimensions::new(self.stored.height, self.stored.width)
        } else {
            self.stored
        }
    }
}

/// The set of collaborators the engine depends on
#[derive(Clone)]
pub struct Toolkit {
    pub transform: Arc<dyn ImageTransform>,
    pub inspector: Arc<dyn ImageInspector>,
    pub metric: Arc<dyn SimilarityMetric>,
}

impl Toolkit {
    /// ImageMagick transforms, in-process inspection, ffmpeg SSIM
    pub fn system(magick_bin: &str, ffmpeg_bin: &str) -> Self {
        Self {
            transform: Arc::new(MagickTransform::new(magick_bin)),
            inspector: Arc::new(ExifInspector::new()),
            metric: Arc::new(FfmpegSsim::new(ffmpeg_bin)),
        }
    }

    /// Use one canned toolkit for all three roles
    pub fn canned(tools: Arc<CannedToolkit>) -> Self {
        Self {
            transform: tools.clone(),
            inspector: tools.clone(),
            metric: tools,
        }
    }
}

impl Default for Toolkit {
    fn default() -> Self {
        Self::system(MagickTransform::DEFAULT_BIN, FfmpegSsim::DEFAULT_BIN)
    }
}
