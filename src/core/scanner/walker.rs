//! Input path expansion using walkdir.

use super::{filter::ImageFilter, normalize_path};
use crate::error::ScanError;
use crate::events::{null_sender, Event, EventSender, ScanEvent};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for input expansion
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Descend into nested directories instead of immediate entries only
    pub recursive: bool,
    /// Whether to include hidden entries found inside directories
    pub include_hidden: bool,
}

/// Expands files and directories into normalized image references
pub struct InputExpander {
    config: ScanConfig,
    filter: ImageFilter,
}

impl InputExpander {
    /// Create a new expander with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let filter = ImageFilter::new().with_hidden(config.include_hidden);
        Self { config, filter }
    }

    /// Expand without progress reporting
    pub fn expand(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>, ScanError> {
        self.expand_with_events(paths, &null_sender())
    }

    /// Expand the given paths, sorted and de-duplicated
    pub fn expand_with_events(
        &self,
        paths: &[PathBuf],
        events: &EventSender,
    ) -> Result<Vec<PathBuf>, ScanError> {
        events.send(Event::Scan(ScanEvent::Started {
            paths: paths.to_vec(),
        }));

        let mut images = BTreeSet::new();

        for path in paths {
            if path.is_file() {
                if self.filter.accepts_extension(path) {
                    images.insert(normalize_path(path)?);
                } else {
                    debug!(path = %path.display(), "skipping unsupported file");
                }
            } else if path.is_dir() {
                self.expand_directory(path, &mut images)?;
            } else {
                warn!(path = %path.display(), "input path does not exist, skipping");
                events.send(Event::Scan(ScanEvent::Skipped {
                    path: path.clone(),
                    reason: "not found".to_string(),
                }));
            }
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_files: images.len(),
        }));

        Ok(images.into_iter().collect())
    }

    fn expand_directory(
        &self,
        root: &PathBuf,
        images: &mut BTreeSet<PathBuf>,
    ) -> Result<(), ScanError> {
        let mut walker = WalkDir::new(root).min_depth(1).follow_links(false);
        if !self.config.recursive {
            walker = walker.max_depth(1);
        }

        let entries = walker
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || self.filter.accepts_entry_name(entry.path()));

        for entry in entries {
            let entry = entry.map_err(|e| ScanError::ReadDirectory {
                path: e.path().map(|p| p.to_path_buf()).unwrap_or_else(|| root.clone()),
                source: e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop")),
            })?;

            let path = entry.path();
            if path.is_file() && self.filter.accepts_extension(path) {
                images.insert(normalize_path(path)?);
            }
        }

        Ok(())
    }
}
