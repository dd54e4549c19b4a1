//! # Verifier Module
//!
//! Precise structural similarity for one candidate pair.
//!
//! ## Steps
//! 1. Inspect both images; quarter-turn orientations swap width/height
//! 2. Put the narrower image first
//! 3. Force-resize the second image to the first one's dimensions unless
//!    they already match
//! 4. Run the similarity metric and parse its single summary line

use crate::core::comparator::{CandidatePair, ScoredPair};
use crate::core::tools::{
    Dimensions, ImageInspector, ImageTransform, SimilarityMetric, Toolkit, TransformRequest,
};
use crate::error::{DuplicateFinderError, ToolError, VerifyError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use tempfile::Builder;
use tracing::debug;

static SCORE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" All:([01]\.[0-9]+) ").expect("valid SSIM regex"));

/// Extract the global score from a metric report.
///
/// Exactly one line may contain both ` SSIM ` and `All:`; anything else
/// is a contract violation.
pub fn parse_metric_report(report: &str) -> Result<f64, VerifyError> {
    let summary: Vec<&str> = report
        .lines()
        .filter(|line| line.contains(" SSIM ") && line.contains("All:"))
        .collect();

    if summary.len() != 1 {
        return Err(VerifyError::SummaryLines {
            found: summary.len(),
            report: report.to_string(),
        });
    }

    let line = summary[0];
    let score: f64 = SCORE_PATTERN
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| VerifyError::UnparsableScore {
            line: line.to_string(),
        })?;

    if !(0.0..=1.0).contains(&score) {
        return Err(VerifyError::ScoreOutOfRange { score });
    }
    Ok(score)
}

/// Scores candidate pairs through the inspection, transform and metric
/// collaborators
#[derive(Clone)]
pub struct SimilarityVerifier {
    inspector: Arc<dyn ImageInspector>,
    transform: Arc<dyn ImageTransform>,
    metric: Arc<dyn SimilarityMetric>,
}

impl SimilarityVerifier {
    pub fn new(tools: &Toolkit) -> Self {
        Self {
            inspector: tools.inspector.clone(),
            transform: tools.transform.clone(),
            metric: tools.metric.clone(),
        }
    }

    fn displayed(&self, path: &Path) -> Result<(PathBuf, Dimensions), ToolError> {
        let geometry = self.inspector.inspect(path)?;
        Ok((path.to_path_buf(), geometry.displayed()))
    }

    /// Score one pair; the returned pair starts with the narrower image.
    pub fn verify(&self, pair: &CandidatePair) -> Result<ScoredPair, DuplicateFinderError> {
        let mut reference = self.displayed(&pair.first)?;
        let mut other = self.displayed(&pair.second)?;

        if reference.1.width > other.1.width {
            std::mem::swap(&mut reference, &mut other);
        }
        let (first, first_dims) = reference;
        let (second, second_dims) = other;

        // Held until the metric has run
        let resized;
        let compared: &Path = if first_dims == second_dims {
            &second
        } else {
            resized = Builder::new()
                .prefix("resized-")
                .suffix(".jpg")
                .tempfile()
                .map_err(|source| ToolError::Io {
                    path: second.clone(),
                    source,
                })?;
            self.transform.transform(
                &second,
                &TransformRequest::resize_exact(first_dims),
                resized.path(),
            )?;
            resized.path()
        };

        let report = self.metric.compare(&first, compared)?;
        let score = parse_metric_report(&report)?;
        debug!(
            first = %first.display(),
            second = %second.display(),
            score,
            "verified pair"
        );

        Ok(ScoredPair::new(first, second, score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tools::{CannedToolkit, ImageGeometry};

    const SUMMARY: &str =
        "[Parsed_ssim_0 @ 0x1] SSIM Y:0.95 (13.0) U:0.97 (15.2) V:0.96 (14.0) All:0.956789 (13.6)";

    fn verifier(tools: CannedToolkit) -> (Arc<CannedToolkit>, SimilarityVerifier) {
        let tools = Arc::new(tools);
        let verifier = SimilarityVerifier::new(&Toolkit::canned(tools.clone()));
        (tools, verifier)
    }

    #[test]
    fn parses_single_summary_line() {
        let report = format!("Input #0, image2, from 'a.jpg':\n{SUMMARY}\n");
        let score = parse_metric_report(&report).unwrap();
        assert!((score - 0.956789).abs() < 1e-9);
    }

    #[test]
    fn parses_perfect_score() {
        let report = "[Parsed_ssim_0 @ 0x1] SSIM Y:1.000000 (inf) All:1.000000 (inf)\n";
        assert_eq!(parse_metric_report(report).unwrap(), 1.0);
    }

    #[test]
    fn missing_summary_line_is_fatal() {
        let result = parse_metric_report("Input #0, image2\nOutput #0, null\n");
        assert!(matches!(
            result,
            Err(VerifyError::SummaryLines { found: 0, .. })
        ));
    }

    #[test]
    fn multiple_summary_lines_are_fatal() {
        let report = format!("{SUMMARY}\n{SUMMARY}\n");
        assert!(matches!(
            parse_metric_report(&report),
            Err(VerifyError::SummaryLines { found: 2, .. })
        ));
    }

    #[test]
    fn summary_without_score_is_fatal() {
        let result = parse_metric_report("[x] SSIM Y:0.9 All:n/a (0)\n");
        assert!(matches!(result, Err(VerifyError::UnparsableScore { .. })));
    }

    #[test]
    fn score_above_one_is_rejected() {
        let result = parse_metric_report("[x] SSIM All:1.500000 (inf)\n");
        assert!(matches!(result, Err(VerifyError::ScoreOutOfRange { .. })));
    }

    #[test]
    fn narrower_image_goes_first() {
        let (_, verifier) = verifier(
            CannedToolkit::new()
                .with_geometry("/wide.jpg", ImageGeometry::new(4000, 3000))
                .with_geometry("/narrow.jpg", ImageGeometry::new(800, 600))
                .with_score("/narrow.jpg", 0.91)
                .with_score("/wide.jpg", 0.42),
        );

        let scored = verifier
            .verify(&CandidatePair::new("/wide.jpg", "/narrow.jpg"))
            .unwrap();

        assert_eq!(scored.first, PathBuf::from("/narrow.jpg"));
        assert_eq!(scored.second, PathBuf::from("/wide.jpg"));
        assert_eq!(scored.score, 0.91);
    }

    #[test]
    fn verification_is_order_independent_for_unequal_widths() {
        let (_, verifier) = verifier(
            CannedToolkit::new()
                .with_geometry("/a.jpg", ImageGeometry::new(1024, 768))
                .with_geometry("/b.jpg", ImageGeometry::new(2048, 1536))
                .with_score("/a.jpg", 0.88)
                .with_score("/b.jpg", 0.12),
        );
        let pair = CandidatePair::new("/a.jpg", "/b.jpg");

        let forward = verifier.verify(&pair).unwrap();
        let backward = verifier.verify(&pair.reversed()).unwrap();

        assert_eq!(forward.score, backward.score);
        assert_eq!(forward.first, backward.first);
    }

    #[test]
    fn rotated_image_uses_displayed_width() {
        // Stored 4000x3000 but rotated: displayed 3000 wide, narrower than 3500
        let (_, verifier) = verifier(
            CannedToolkit::new()
                .with_geometry("/a.jpg", ImageGeometry::new(3500, 2000))
                .with_geometry("/rotated.jpg", ImageGeometry::new(4000, 3000).with_orientation(6))
                .with_score("/rotated.jpg", 0.85),
        );

        let scored = verifier
            .verify(&CandidatePair::new("/a.jpg", "/rotated.jpg"))
            .unwrap();

        assert_eq!(scored.first, PathBuf::from("/rotated.jpg"));
        assert_eq!(scored.score, 0.85);
    }

    #[test]
    fn equal_dimensions_skip_resize() {
        let (tools, verifier) = verifier(CannedToolkit::new().with_score("/a.jpg", 0.99));

        verifier
            .verify(&CandidatePair::new("/a.jpg", "/b.jpg"))
            .unwrap();

        assert_eq!(tools.transform_calls(), 0);
        assert_eq!(tools.metric_calls(), 1);
    }

    #[test]
    fn unequal_dimensions_resize_second_image() {
        let (tools, verifier) = verifier(
            CannedToolkit::new()
                .with_geometry("/a.jpg", ImageGeometry::new(640, 480))
                .with_geometry("/b.jpg", ImageGeometry::new(640, 500)),
        );

        verifier
            .verify(&CandidatePair::new("/a.jpg", "/b.jpg"))
            .unwrap();

        assert_eq!(tools.transform_calls(), 1);
    }
}
