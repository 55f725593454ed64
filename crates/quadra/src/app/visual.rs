use std::path::{Path, PathBuf};

use image::{ImageReader, RgbaImage};
use thiserror::Error;

use super::surface::TextureId;

#[derive(Debug, Error)]
pub enum VisualError {
    #[error("failed to open image at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image at {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Drawable state of an entity. Decoding happens at entity construction;
/// the upload to a surface texture happens lazily on first draw. A failure
/// at either step parks the visual in `Failed` — the entity stays fully
/// valid for geometry and dispatch, it just stops being drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visual {
    Decoded(RgbaImage),
    Ready(TextureId),
    Failed,
}

impl Visual {
    pub fn load(path: &Path) -> Result<RgbaImage, VisualError> {
        let reader = ImageReader::open(path).map_err(|source| VisualError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = reader.decode().map_err(|source| VisualError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(decoded.to_rgba8())
    }

    pub fn is_drawable(&self) -> bool {
        !matches!(self, Visual::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_round_trips_a_real_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tile.png");
        let mut pixels = RgbaImage::new(3, 2);
        pixels.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        pixels.save(&path).expect("save png");

        let loaded = Visual::load(&path).expect("load");
        assert_eq!(loaded.dimensions(), (3, 2));
        assert_eq!(loaded.get_pixel(0, 0), &image::Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn load_reports_missing_file_as_open_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Visual::load(&dir.path().join("missing.png")).expect_err("err");
        assert!(matches!(err, VisualError::Open { .. }));
    }

    #[test]
    fn load_reports_garbage_bytes_as_decode_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("corrupt.png");
        std::fs::write(&path, b"definitely not a png").expect("write");

        let err = Visual::load(&path).expect_err("err");
        assert!(matches!(err, VisualError::Decode { .. }));
    }

    #[test]
    fn failed_visual_is_not_drawable() {
        assert!(!Visual::Failed.is_drawable());
        assert!(Visual::Decoded(RgbaImage::new(1, 1)).is_drawable());
    }
}
