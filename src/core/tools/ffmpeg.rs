//! SSIM via ffmpeg's `ssim` filter.

use super::process::run;
use super::traits::SimilarityMetric;
use crate::error::ToolError;
use std::ffi::OsString;
use std::path::Path;

/// Runs `ffmpeg -lavfi ssim` and returns its log output
#[derive(Debug, Clone)]
pub struct FfmpegSsim {
    bin: String,
}

impl FfmpegSsim {
    pub const DEFAULT_BIN: &'static str = "ffmpeg";

    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

impl Default for FfmpegSsim {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BIN)
    }
}

impl SimilarityMetric for FfmpegSsim {
    fn compare(&self, first: &Path, second: &Path) -> Result<String, ToolError> {
        let args: Vec<OsString> = vec![
            "-nostdin".into(),
            "-i".into(),
            first.into(),
            "-i".into(),
            second.into(),
            "-lavfi".into(),
            "ssim".into(),
            "-f".into(),
            "null".into(),
            "-".into(),
        ];
        let output = run(&self.bin, args, first)?;

        // ffmpeg logs the filter summary on stderr
        Ok(String::from_utf8_lossy(&output.stderr).into_owned())
    }
}
