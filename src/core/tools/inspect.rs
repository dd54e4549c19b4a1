//! In-process image inspection: header dimensions plus EXIF orientation.

use super::traits::ImageInspector;
use super::ImageGeometry;
use crate::error::ToolError;
use exif::{In, Reader, Tag};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Reads dimensions from the image header and orientation from EXIF
#[derive(Debug, Clone, Default)]
pub struct ExifInspector;

impl ExifInspector {
    pub fn new() -> Self {
        Self
    }
}

impl ImageInspector for ExifInspector {
    fn inspect(&self, path: &Path) -> Result<ImageGeometry, ToolError> {
        let (width, height) =
            image::image_dimensions(path).map_err(|e| ToolError::Inspect {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Ok(ImageGeometry::new(width, height).with_orientation(read_orientation(path)))
    }
}

/// EXIF orientation code; missing or unreadable EXIF means upright (1)
fn read_orientation(path: &Path) -> u16 {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return 1,
    };

    let mut bufreader = BufReader::new(&file);
    let exif = match Reader::new().read_from_container(&mut bufreader) {
        Ok(r) => r,
        Err(_) => return 1,
    };

    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .and_then(|v| u16::try_from(v).ok())
        .filter(|v| (1..=8).contains(v))
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_file_is_an_inspect_error() {
        let result = ExifInspector::new().inspect(Path::new("/nonexistent/a.jpg"));
        assert!(matches!(result, Err(ToolError::Inspect { .. })));
    }

    #[test]
    fn garbage_file_is_an_inspect_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"this is not a valid image file").unwrap();

        let result = ExifInspector::new().inspect(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn orientation_defaults_to_upright() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xD9]).unwrap();

        assert_eq!(read_orientation(file.path()), 1);
        assert_eq!(read_orientation(Path::new("/nonexistent/a.jpg")), 1);
    }
}
