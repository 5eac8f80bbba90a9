//! Preview PNG and exported project output

use image::imageops::FilterType;
use image::RgbaImage;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::script::safe_id;

/// Extension of exported project containers.
pub const PROJECT_EXTENSION: &str = "fra";

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    /// Scaled dimensions do not fit in a `u32`
    #[error("cannot scale {width}x{height} image by {factor}: too large")]
    TooLarge { width: u32, height: u32, factor: u8 },
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Save an RGBA image to a PNG file, creating parent directories.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    ensure_parent(path)?;
    image.save(path)?;
    Ok(())
}

/// Write raw bytes to a file, creating parent directories.
pub fn save_bytes(bytes: &[u8], path: &Path) -> Result<(), OutputError> {
    ensure_parent(path)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Scale image by integer factor using nearest-neighbor interpolation.
///
/// This preserves crisp pixel edges. A factor of 0 or 1 returns the image
/// unchanged.
pub fn scale_image(image: RgbaImage, factor: u8) -> Result<RgbaImage, OutputError> {
    if factor <= 1 {
        return Ok(image);
    }
    let (w, h) = image.dimensions();
    let too_large = || OutputError::TooLarge { width: w, height: h, factor };
    let new_w = w.checked_mul(u32::from(factor)).ok_or_else(too_large)?;
    let new_h = h.checked_mul(u32::from(factor)).ok_or_else(too_large)?;
    Ok(image::imageops::resize(&image, new_w, new_h, FilterType::Nearest))
}

/// Path of a costume preview: `dir/{safe_id}_{index}.png`.
pub fn preview_path(dir: &Path, object_id: &str, costume_index: u32) -> PathBuf {
    let stem: String = safe_id(object_id)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    dir.join(format!("{}_{}.png", stem, costume_index))
}

/// `path`, or the first free `{stem}-{n}.{ext}` sibling (n from 2) when
/// `path` is already in `taken`.
///
/// Distinct object ids can sanitize to the same preview name.
pub fn disambiguate_path(path: PathBuf, taken: &HashSet<PathBuf>) -> PathBuf {
    if !taken.contains(&path) {
        return path;
    }
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let ext = path.extension().map(|e| format!(".{}", e.to_string_lossy())).unwrap_or_default();
    (2u32..)
        .map(|n| path.with_file_name(format!("{}-{}{}", stem, n, ext)))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or(path)
}

/// Filename of an exported project: `{id}.fra`.
pub fn project_file_name(id: &str) -> String {
    format!("{}.{}", id, PROJECT_EXTENSION)
}
