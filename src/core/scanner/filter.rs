//! Extension filtering for input paths.

use std::collections::HashSet;
use std::path::Path;

/// Decides which files are supported images
pub struct ImageFilter {
    /// Lowercase file extensions to include
    extensions: HashSet<String>,
    /// Whether to include hidden directory entries
    include_hidden: bool,
}

impl ImageFilter {
    /// Create a filter accepting JPEG files
    pub fn new() -> Self {
        Self {
            extensions: ["jpg", "jpeg"].iter().map(|e| e.to_string()).collect(),
            include_hidden: false,
        }
    }

    /// Include hidden entries (starting with .) found inside directories
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Check the extension only, as done for explicit file arguments
    pub fn accepts_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    /// Check whether a directory entry should be considered at all
    pub fn accepts_entry_name(&self, path: &Path) -> bool {
        if self.include_hidden {
            return true;
        }
        !path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.starts_with('.'))
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_accepts_jpeg_any_case() {
        let filter = ImageFilter::new();
        assert!(filter.accepts_extension(Path::new("/photos/image.jpg")));
        assert!(filter.accepts_extension(Path::new("/photos/image.JPEG")));
        assert!(filter.accepts_extension(Path::new("/photos/IMG_0001.Jpg")));
    }

    #[test]
    fn filter_rejects_other_formats() {
        let filter = ImageFilter::new();
        assert!(!filter.accepts_extension(Path::new("/photos/image.png")));
        assert!(!filter.accepts_extension(Path::new("/photos/notes.txt")));
        assert!(!filter.accepts_extension(Path::new("/photos/no_extension")));
    }

    #[test]
    fn hidden_entries_skipped_by_default() {
        let filter = ImageFilter::new();
        assert!(!filter.accepts_entry_name(Path::new("/photos/.thumb.jpg")));
        assert!(filter.accepts_entry_name(Path::new("/photos/thumb.jpg")));
    }

    #[test]
    fn hidden_entries_can_be_included() {
        let filter = ImageFilter::new().with_hidden(true);
        assert!(filter.accepts_entry_name(Path::new("/photos/.thumb.jpg")));
    }
}
