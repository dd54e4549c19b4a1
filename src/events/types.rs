//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the matching pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Input expansion events
    Scan(ScanEvent),
    /// Fingerprinting stage events
    Fingerprint(StageEvent),
    /// Bucketing and pair generation events
    Compare(CompareEvent),
    /// Similarity verification stage events
    Verify(StageEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events while expanding the input paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Expansion has started
    Started { paths: Vec<PathBuf> },
    /// An input path was skipped
    Skipped { path: PathBuf, reason: String },
    /// Expansion completed
    Completed { total_files: usize },
}

/// Events of one pooled stage (fingerprinting or verification)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageEvent {
    /// Dispatch is about to begin
    Started { to_compute: usize, cached: usize },
    /// One task finished
    Progress(StageProgress),
    /// All results were collected and written to the cache
    Completed { computed: usize },
}

/// Progress information inside a pooled stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageProgress {
    /// Tasks finished so far
    pub completed: usize,
    /// Tasks dispatched in this stage
    pub total: usize,
    /// Image handled by the task that just finished
    pub current_path: PathBuf,
}

/// Events from bucketing and pair generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CompareEvent {
    /// Candidate clusters and pairs are known
    Completed {
        clusters: usize,
        candidate_images: usize,
        pairs: usize,
    },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Fingerprinting,
    Bucketing,
    Verifying,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Images that passed the extension filter
    pub total_files: usize,
    /// Images sharing a fingerprint with at least one other image
    pub candidate_images: usize,
    /// Candidate pairs that were scored
    pub scored_pairs: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Fingerprinting => write!(f, "Fingerprinting"),
            PipelinePhase::Bucketing => write!(f, "Bucketing"),
            PipelinePhase::Verifying => write!(f, "Verifying"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_events_are_serializable() {
        let event = Event::Verify(StageEvent::Progress(StageProgress {
            completed: 3,
            total: 10,
            current_path: PathBuf::from("/photos/a.jpg"),
        }));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Verify(StageEvent::Progress(p)) => {
                assert_eq!(p.completed, 3);
                assert_eq!(p.total, 10);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn phase_display() {
        assert_eq!(PipelinePhase::Fingerprinting.to_string(), "Fingerprinting");
        assert_eq!(PipelinePhase::Verifying.to_string(), "Verifying");
    }
}
