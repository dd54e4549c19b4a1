//! # Scanner Module
//!
//! Turns the command-line paths into a set of image references.
//!
//! ## Rules
//! - A file argument participates if its extension is accepted
//! - A directory argument contributes its immediate entries, which go
//!   through the same filter (full traversal only with `recursive`)
//! - Every reference is an absolute, lexically normalized path
//!
//! ## Example
//! ```rust,ignore
//! use duplicate_image_finder::core::scanner::{InputExpander, ScanConfig};
//!
//! let expander = InputExpander::new(ScanConfig::default());
//! let images = expander.expand(&["/Users/me/Photos".into()])?;
//! ```

mod filter;
mod walker;

pub use filter::ImageFilter;
pub use walker::{InputExpander, ScanConfig};

use crate::error::ScanError;
use std::path::{Component, Path, PathBuf};

/// Make a path absolute and resolve `.` and `..` lexically.
///
/// Symlinks are not followed; identity is by path, not by content.
pub fn normalize_path(path: &Path) -> Result<PathBuf, ScanError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|source| ScanError::Normalize {
                path: path.to_path_buf(),
                source,
            })?
            .join(path)
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}
