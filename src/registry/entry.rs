//! Discovered files and their naming-convention classification.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Names that carry their own identity: palette content or `<file>.<ext>.meta` sidecars.
static HAS_GUID_INFO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^.+(\.palettes|\.[A-Za-z0-9_]+\.meta)$").expect("identity pattern is valid")
});

/// Suffix stripped from a sidecar name to find its target.
pub const META_SUFFIX: &str = ".meta";

/// How a file participates in identity resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// A `*.palettes` file; carries its own guid.
    Primary,
    /// A `*.<ext>.meta` file carrying the guid of its target.
    Sidecar,
    /// Any other file; identified later through a sidecar.
    Unclassified,
}

/// Classify a file by its name.
pub fn classify(name: &str) -> FileKind {
    if !HAS_GUID_INFO.is_match(name) {
        FileKind::Unclassified
    } else if name.ends_with(META_SUFFIX) {
        FileKind::Sidecar
    } else {
        FileKind::Primary
    }
}

/// Name of the file a sidecar describes.
pub fn sidecar_target(name: &str) -> &str {
    name.strip_suffix(META_SUFFIX).unwrap_or(name)
}

#[derive(Clone, PartialEq, Eq)]
enum Source {
    Disk(PathBuf),
    Memory(Arc<[u8]>),
}

/// A named file whose content is read on demand.
#[derive(Clone, PartialEq, Eq)]
pub struct FileHandle {
    name: String,
    source: Source,
}

impl FileHandle {
    /// A file on disk, named by its final path component.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        Self { name, source: Source::Disk(path) }
    }

    /// An in-memory file.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Self { name: name.into(), source: Source::Memory(Arc::from(bytes)) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location on disk, if this file lives there.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            Source::Disk(path) => Some(path),
            Source::Memory(_) => None,
        }
    }

    /// Read the whole content.
    pub fn read(&self) -> io::Result<Vec<u8>> {
        match &self.source {
            Source::Disk(path) => std::fs::read(path),
            Source::Memory(bytes) => Ok(bytes.to_vec()),
        }
    }

    /// Read the whole content as UTF-8 text.
    pub fn read_text(&self) -> io::Result<String> {
        String::from_utf8(self.read()?).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Source::Disk(path) => write!(f, "FileHandle({:?} @ {})", self.name, path.display()),
            Source::Memory(bytes) => {
                write!(f, "FileHandle({:?}, {} bytes in memory)", self.name, bytes.len())
            }
        }
    }
}

/// A discovered file together with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub handle: FileHandle,
    pub kind: FileKind,
}

impl FileEntry {
    /// Classify a handle by its name.
    pub fn new(handle: FileHandle) -> Self {
        let kind = classify(handle.name());
        Self { handle, kind }
    }

    pub fn name(&self) -> &str {
        self.handle.name()
    }
}

impl From<FileHandle> for FileEntry {
    fn from(handle: FileHandle) -> Self {
        Self::new(handle)
    }
}
