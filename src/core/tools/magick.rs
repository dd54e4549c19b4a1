//! ImageMagick-backed transform and preview composer.

use super::process::run;
use super::traits::{ImageTransform, PreviewComposer};
use super::{Geometry, TransformRequest};
use crate::error::ToolError;
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::Builder;
use tracing::debug;

/// Thumbnail side for each half of the preview
const PREVIEW_FIT: u32 = 360;
/// Canvas side each thumbnail is centred on
const PREVIEW_CANVAS: u32 = 400;

/// Runs ImageMagick's `convert` for every transform
#[derive(Debug, Clone)]
pub struct MagickTransform {
    bin: String,
}

impl MagickTransform {
    pub const DEFAULT_BIN: &'static str = "convert";

    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    /// Build the argument list for a request
    fn arguments(source: &Path, request: &TransformRequest, dest: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        if request.auto_orient {
            args.push("-auto-orient".into());
        }
        args.push(source.into());
        args.push("-resize".into());
        match request.geometry {
            Geometry::Fill { width, height } => {
                args.push(format!("{width}x{height}^").into());
                args.extend(["-gravity", "center", "-extent"].map(OsString::from));
                args.push(format!("{width}x{height}").into());
            }
            Geometry::Exact { width, height } => {
                args.push(format!("{width}x{height}!").into());
            }
        }
        if request.bilevel {
            args.extend(["-type", "bilevel"].map(OsString::from));
        }
        if request.strip {
            args.push("-strip".into());
        }
        args.push(dest.into());
        args
    }
}

impl Default for MagickTransform {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BIN)
    }
}

impl ImageTransform for MagickTransform {
    fn transform(
        &self,
        source: &Path,
        request: &TransformRequest,
        dest: &Path,
    ) -> Result<(), ToolError> {
        run(&self.bin, Self::arguments(source, request, dest), source)?;
        Ok(())
    }
}

/// Side-by-side preview built with `convert` and shown with the desktop opener
#[derive(Debug, Clone)]
pub struct MagickPreview {
    bin: String,
    opener: String,
}

impl MagickPreview {
    pub fn new(bin: impl Into<String>) -> Self {
        let opener = if cfg!(target_os = "macos") {
            "open"
        } else if cfg!(target_os = "windows") {
            "explorer"
        } else {
            "xdg-open"
        };
        Self {
            bin: bin.into(),
            opener: opener.to_string(),
        }
    }

    fn framed(&self, source: &Path, dest: &Path) -> Result<(), ToolError> {
        let fit = format!("{PREVIEW_FIT}x{PREVIEW_FIT}");
        let canvas = format!("{PREVIEW_CANVAS}x{PREVIEW_CANVAS}");
        let args: Vec<OsString> = vec![
            "-auto-orient".into(),
            source.into(),
            "-resize".into(),
            fit.into(),
            "-background".into(),
            "white".into(),
            "-gravity".into(),
            "center".into(),
            "-extent".into(),
            canvas.into(),
            dest.into(),
        ];
        run(&self.bin, args, source)?;
        Ok(())
    }
}

impl PreviewComposer for MagickPreview {
    fn compose(&self, first: &Path, second: &Path, dest: &Path) -> Result<(), ToolError> {
        let io_error = |source| ToolError::Io {
            path: dest.to_path_buf(),
            source,
        };
        let left = Builder::new().suffix(".jpg").tempfile().map_err(io_error)?;
        let right = Builder::new().suffix(".jpg").tempfile().map_err(io_error)?;

        self.framed(first, left.path())?;
        self.framed(second, right.path())?;

        let args: Vec<OsString> = vec![
            "+append".into(),
            left.path().into(),
            right.path().into(),
            dest.into(),
        ];
        run(&self.bin, args, first)?;
        Ok(())
    }

    fn show(&self, preview: &Path) -> Result<(), ToolError> {
        debug!(opener = %self.opener, preview = %preview.display(), "opening preview");
        // The opener returns immediately; the viewer keeps running detached.
        Command::new(&self.opener)
            .arg(preview)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ToolError::Spawn {
                tool: self.opener.clone(),
                source,
            })?;
        Ok(())
    }
}
