//! Guid resolution across independently discovered project files.
//!
//! Files arrive one at a time in whatever order the directory walk yields
//! them. A content file and the sidecar that names it may come in either
//! order, so every filename still waiting for its counterpart is held in an
//! explicit [`Pending`] state until the other half shows up:
//!
//! | Arrives      | Pending state for the name | Result                          |
//! |--------------|----------------------------|---------------------------------|
//! | content      | none                       | `AwaitingSidecar(handle)`       |
//! | content      | `AwaitingContent(guid)`    | resolved `guid -> handle`       |
//! | sidecar      | none                       | `AwaitingContent(guid)`         |
//! | sidecar      | `AwaitingSidecar(handle)`  | resolved `guid -> handle`       |
//! | `*.palettes` | -                          | resolved under its own guid     |
//!
//! Anything still pending after the scan is an orphan.

use glob::Pattern;
use std::collections::HashMap;
use std::io;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::color::ColorError;
use crate::models::{Guid, MetaFile, PaletteFile, SlotId};

use super::entry::{sidecar_target, FileEntry, FileHandle, FileKind, META_SUFFIX};
use super::graph::{Costume, GameObject, PaletteGraph};

/// Filenames that never take part in identity resolution.
pub const DEFAULT_ALLOWLIST: &[&str] = &["README.md", "*.md", "*.fraytools"];

/// Error while reading or interpreting project files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// File could not be read
    #[error("failed to read '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
    /// File content is not the expected JSON
    #[error("failed to parse '{name}': {source}")]
    Json {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    /// A color in a palette file is not a valid packed color
    #[error("invalid color in '{name}': {source}")]
    Color {
        name: String,
        #[source]
        source: ColorError,
    },
    /// A costume mapping references a color slot the palette does not define
    #[error("costume '{costume}' in '{name}' references unknown color slot '{slot}'")]
    UnknownSlot { name: String, costume: String, slot: SlotId },
    /// A listed palette guid has no resolved file
    #[error("palette guid '{0}' has no file")]
    MissingPalette(Guid),
    /// Several files failed; every failure is listed
    #[error("{} project files failed to load:\n{}", .0.len(), .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Multiple(Vec<RegistryError>),
}

impl RegistryError {
    /// Collapse a list of failures into one error.
    fn from_list(mut errors: Vec<RegistryError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(RegistryError::Multiple(errors)),
        }
    }
}

/// Files whose identity link never resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Content without a sidecar and sidecars without content, both sorted
    #[error("{}", format_orphans(.unresolved_files, .dangling_sidecars))]
    OrphanFiles { unresolved_files: Vec<String>, dangling_sidecars: Vec<String> },
}

fn format_orphans(unresolved: &[String], dangling: &[String]) -> String {
    let mut parts = Vec::new();
    if !unresolved.is_empty() {
        parts.push(format!("files with no guid: {}", unresolved.join(", ")));
    }
    if !dangling.is_empty() {
        parts.push(format!("meta files with no associated content: {}", dangling.join(", ")));
    }
    format!("found orphan files ({})", parts.join("; "))
}

/// Where a filename stands while waiting for its counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    /// Content seen, sidecar not yet.
    AwaitingSidecar(FileHandle),
    /// Sidecar seen, content not yet.
    AwaitingContent(Guid),
}

/// Resolves guids across a stream of files and builds the object graph.
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    pending: HashMap<String, Pending>,
    resolved: HashMap<Guid, FileHandle>,
    palette_guids: Vec<Guid>,
    allowlist: Vec<Pattern>,
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetRegistry {
    /// Create an empty registry with the default allowlist.
    pub fn new() -> Self {
        let allowlist = DEFAULT_ALLOWLIST.iter().filter_map(|p| Pattern::new(p).ok()).collect();
        Self {
            pending: HashMap::new(),
            resolved: HashMap::new(),
            palette_guids: Vec::new(),
            allowlist,
        }
    }

    /// Add filename patterns that are excluded from orphan validation.
    pub fn with_allowlist(mut self, patterns: impl IntoIterator<Item = Pattern>) -> Self {
        self.allowlist.extend(patterns);
        self
    }

    /// Ingest every entry, reporting every failure rather than the first.
    pub fn from_entries(
        entries: impl IntoIterator<Item = FileEntry>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.ingest_all(entries)?;
        Ok(registry)
    }

    /// Ingest entries in order; entries that fail are skipped and reported together.
    pub fn ingest_all(
        &mut self,
        entries: impl IntoIterator<Item = FileEntry>,
    ) -> Result<(), RegistryError> {
        let errors: Vec<RegistryError> =
            entries.into_iter().filter_map(|entry| self.ingest(entry).err()).collect();
        match RegistryError::from_list(errors) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Apply one discovered file.
    pub fn ingest(&mut self, entry: FileEntry) -> Result<(), RegistryError> {
        debug!(file = entry.name(), kind = ?entry.kind, "ingest");
        match entry.kind {
            FileKind::Unclassified => {
                self.ingest_content(entry.handle);
                Ok(())
            }
            FileKind::Sidecar => {
                let guid = read_identity(&entry.handle)?;
                self.ingest_sidecar(entry.name(), guid);
                Ok(())
            }
            FileKind::Primary => {
                let guid = read_identity(&entry.handle)?;
                self.ingest_palette(guid, entry.handle);
                Ok(())
            }
        }
    }

    fn ingest_content(&mut self, handle: FileHandle) {
        let name = handle.name().to_string();
        match self.pending.remove(&name) {
            Some(Pending::AwaitingContent(guid)) => {
                self.resolve(guid, handle);
            }
            previous => {
                if let Some(Pending::AwaitingSidecar(old)) = previous {
                    warn!(file = %name, replaced = ?old, "duplicate file name, keeping the latest");
                }
                self.pending.insert(name, Pending::AwaitingSidecar(handle));
            }
        }
    }

    fn ingest_sidecar(&mut self, sidecar_name: &str, guid: Guid) {
        let target = sidecar_target(sidecar_name).to_string();
        match self.pending.remove(&target) {
            Some(Pending::AwaitingSidecar(handle)) => {
                self.resolve(guid, handle);
            }
            previous => {
                if let Some(Pending::AwaitingContent(old)) = previous {
                    warn!(file = %sidecar_name, replaced = %old, "duplicate meta file, keeping the latest");
                }
                self.pending.insert(target, Pending::AwaitingContent(guid));
            }
        }
    }

    fn ingest_palette(&mut self, guid: Guid, handle: FileHandle) {
        if self.resolved.contains_key(&guid) {
            warn!(guid = %guid, file = handle.name(), "duplicate palette guid, keeping the latest");
        } else {
            self.palette_guids.push(guid.clone());
        }
        self.resolved.insert(guid, handle);
    }

    fn resolve(&mut self, guid: Guid, handle: FileHandle) {
        if let Some(old) = self.resolved.insert(guid.clone(), handle) {
            warn!(guid = %guid, replaced = ?old, "guid resolved twice, keeping the latest");
        }
    }

    /// Fully resolved files by guid.
    pub fn resolved(&self) -> &HashMap<Guid, FileHandle> {
        &self.resolved
    }

    /// Look up a resolved file.
    pub fn lookup(&self, guid: &str) -> Option<&FileHandle> {
        self.resolved.get(guid)
    }

    /// Palette guids in discovery order.
    pub fn palette_guids(&self) -> &[Guid] {
        &self.palette_guids
    }

    /// Content files still waiting for a sidecar, by filename.
    pub fn unresolved_files(&self) -> impl Iterator<Item = (&str, &FileHandle)> {
        self.pending.iter().filter_map(|(name, state)| match state {
            Pending::AwaitingSidecar(handle) => Some((name.as_str(), handle)),
            Pending::AwaitingContent(_) => None,
        })
    }

    /// Sidecar guids still waiting for content, by target filename.
    pub fn pending_sidecars(&self) -> impl Iterator<Item = (&str, &Guid)> {
        self.pending.iter().filter_map(|(name, state)| match state {
            Pending::AwaitingContent(guid) => Some((name.as_str(), guid)),
            Pending::AwaitingSidecar(_) => None,
        })
    }

    fn is_allowlisted(&self, name: &str) -> bool {
        self.allowlist.iter().any(|p| p.matches(name))
    }

    /// Drop allowlisted files and report whatever is still unresolved.
    ///
    /// Orphans stay in the registry; the graph can still be built from what
    /// did resolve.
    pub fn finalize(&mut self) -> Result<(), ValidationError> {
        let allowlisted: Vec<String> = self
            .unresolved_files()
            .map(|(name, _)| name.to_string())
            .filter(|name| self.is_allowlisted(name))
            .collect();
        for name in allowlisted {
            self.pending.remove(&name);
        }

        let mut unresolved_files: Vec<String> =
            self.unresolved_files().map(|(name, _)| name.to_string()).collect();
        let mut dangling_sidecars: Vec<String> = self
            .pending_sidecars()
            .map(|(target, _)| format!("{}{}", target, META_SUFFIX))
            .collect();

        if unresolved_files.is_empty() && dangling_sidecars.is_empty() {
            return Ok(());
        }

        unresolved_files.sort();
        dangling_sidecars.sort();
        for name in &unresolved_files {
            warn!(file = %name, "file has no guid");
        }
        for name in &dangling_sidecars {
            warn!(file = %name, "meta file has no associated content");
        }
        Err(ValidationError::OrphanFiles { unresolved_files, dangling_sidecars })
    }

    /// Build the object graph from every palette, in discovery order.
    ///
    /// Every palette is attempted; failures are reported together.
    pub fn build_graph(&self) -> Result<PaletteGraph, RegistryError> {
        let mut graph = PaletteGraph::new();
        let mut errors = Vec::new();

        for guid in &self.palette_guids {
            match self.load_object(guid) {
                Ok(object) => {
                    if let Some(old) = graph.insert(object) {
                        warn!(id = old.id(), "duplicate palette id, keeping the latest");
                    }
                }
                Err(err) => errors.push(err),
            }
        }

        match RegistryError::from_list(errors) {
            Some(err) => Err(err),
            None => Ok(graph),
        }
    }

    fn load_object(&self, guid: &str) -> Result<GameObject, RegistryError> {
        let handle =
            self.resolved.get(guid).ok_or_else(|| RegistryError::MissingPalette(guid.to_string()))?;
        let name = handle.name();
        let text =
            handle.read_text().map_err(|source| RegistryError::Io { name: name.to_string(), source })?;
        let palette: PaletteFile = serde_json::from_str(&text)
            .map_err(|source| RegistryError::Json { name: name.to_string(), source })?;

        let image = palette.image_asset.as_deref().and_then(|asset| self.resolved.get(asset));
        if image.is_none() {
            warn!(id = %palette.id, file = name, asset = ?palette.image_asset, "image asset did not resolve");
        }

        let mut slot_colors = HashMap::with_capacity(palette.colors.len());
        for slot in &palette.colors {
            let packed = slot
                .color
                .packed()
                .map_err(|source| RegistryError::Color { name: name.to_string(), source })?;
            slot_colors.insert(slot.id.clone(), packed);
        }

        let mut object = GameObject::new(palette.id.clone(), image.cloned());
        for (idx, map) in palette.maps.iter().enumerate() {
            let mut costume = Costume::new(idx as u32, map.name.clone());
            if map.is_base() {
                costume.toggle_enabled();
            }

            for mapping in &map.colors {
                let src = *slot_colors.get(&mapping.palette_color_id).ok_or_else(|| {
                    RegistryError::UnknownSlot {
                        name: name.to_string(),
                        costume: map.name.clone(),
                        slot: mapping.palette_color_id.clone(),
                    }
                })?;
                mapping
                    .target_color
                    .packed()
                    .map_err(|source| RegistryError::Color { name: name.to_string(), source })?;
                costume.set(src, mapping.target_color.clone());
            }

            if !costume.is_enabled() {
                info!(id = %palette.id, costume = %map.name, "base costume starts disabled");
            }
            object.insert_costume(costume);
        }

        Ok(object)
    }
}

fn read_identity(handle: &FileHandle) -> Result<Guid, RegistryError> {
    let name = handle.name();
    let text =
        handle.read_text().map_err(|source| RegistryError::Io { name: name.to_string(), source })?;
    // Palette files carry their guid the same way sidecars do
    let identity: MetaFile = serde_json::from_str(&text)
        .map_err(|source| RegistryError::Json { name: name.to_string(), source })?;
    Ok(identity.guid)
}
