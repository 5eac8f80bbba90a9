//! Asset registry: guid resolution and the resolved object graph.
//!
//! This module provides:
//! - `classify` and `FileEntry` for sorting discovered files by naming convention
//! - `AssetRegistry` for joining content files with their `.meta` sidecars in any order
//! - `PaletteGraph` holding the `GameObject`s and `Costume`s built from palette files
//! - A unified `Registry` trait for name-keyed lookups
//!
//! Orphans are reported as a batch by `AssetRegistry::finalize`; the caller
//! decides whether they are fatal.

mod asset;
mod entry;
mod graph;
mod traits;

// Re-export all public items from submodules
pub use asset::{AssetRegistry, RegistryError, ValidationError, DEFAULT_ALLOWLIST};
pub use entry::{classify, sidecar_target, FileEntry, FileHandle, FileKind, META_SUFFIX};
pub use graph::{is_valid_id, Costume, GameObject, GraphError, PaletteGraph};
pub use traits::Registry;
