//! The resolved object graph: game objects and their costumes.
//!
//! The graph owns every [`GameObject`] keyed by its id, and every object owns
//! its [`Costume`]s keyed by costume index. Re-keying is only possible through
//! [`PaletteGraph::rename`] and [`GameObject::set_costume_index`], which check
//! the destination before touching either map so a failed call leaves the
//! graph as it was.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::io;
use thiserror::Error;

use crate::color::ColorValue;

use super::entry::FileHandle;
use super::traits::Registry;

/// Exportable object ids look like `namespace::group.name`.
static VALID_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+::[A-Za-z0-9_]+\.[A-Za-z0-9_]+$").expect("id pattern is valid")
});

/// Check an object id against the `namespace::group.name` shape.
pub fn is_valid_id(id: &str) -> bool {
    VALID_ID.is_match(id)
}

/// Error from graph lookups and edits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GraphError {
    /// No object with this id
    #[error("object '{0}' not found")]
    NotFound(String),
    /// Rename target already names another object
    #[error("object id '{0}' is already in use")]
    Occupied(String),
    /// No costume with this index on the object
    #[error("object '{object}' has no costume {index}")]
    CostumeNotFound { object: String, index: u32 },
    /// Every index from the requested one upward is taken
    #[error("object '{object}' has no free costume index at or above {requested}")]
    IndexExhausted { object: String, requested: u32 },
    /// The palette's image asset never resolved
    #[error("object '{0}' has no image asset")]
    MissingImage(String),
    /// Reading the image asset failed
    #[error("failed to read image '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// One named recolor variant of a game object.
#[derive(Debug, Clone, PartialEq)]
pub struct Costume {
    id: u32,
    name: String,
    enabled: bool,
    colors: IndexMap<u32, ColorValue>,
}

impl Costume {
    /// Create an enabled costume with no color mappings.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), enabled: true, colors: IndexMap::new() }
    }

    /// Index of this costume within its object.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn toggle_enabled(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Source packed color to destination color, in definition order.
    pub fn colors(&self) -> &IndexMap<u32, ColorValue> {
        &self.colors
    }

    /// Map a source color; a later mapping of the same source wins.
    pub fn set(&mut self, src: u32, dest: ColorValue) {
        self.colors.insert(src, dest);
    }

    pub fn get(&self, src: u32) -> Option<&ColorValue> {
        self.colors.get(&src)
    }
}

/// An addressable recolor target: one palette file's worth of costumes.
#[derive(Debug, Clone, PartialEq)]
pub struct GameObject {
    id: String,
    costumes: BTreeMap<u32, Costume>,
    image: Option<FileHandle>,
}

impl GameObject {
    pub fn new(id: impl Into<String>, image: Option<FileHandle>) -> Self {
        Self { id: id.into(), costumes: BTreeMap::new(), image }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Add a costume under its own index, replacing any costume already there.
    pub fn insert_costume(&mut self, costume: Costume) -> Option<Costume> {
        self.costumes.insert(costume.id, costume)
    }

    /// Costumes in index order.
    pub fn costumes(&self) -> impl Iterator<Item = &Costume> {
        self.costumes.values()
    }

    pub fn costume(&self, index: u32) -> Option<&Costume> {
        self.costumes.get(&index)
    }

    pub fn costume_mut(&mut self, index: u32) -> Option<&mut Costume> {
        self.costumes.get_mut(&index)
    }

    pub fn costume_count(&self) -> usize {
        self.costumes.len()
    }

    /// Costumes that will be exported.
    pub fn enabled_costumes(&self) -> impl Iterator<Item = &Costume> {
        self.costumes.values().filter(|c| c.is_enabled())
    }

    /// True when nothing would be exported for this object.
    pub fn is_empty(&self) -> bool {
        self.enabled_costumes().next().is_none()
    }

    pub fn has_valid_id(&self) -> bool {
        is_valid_id(&self.id)
    }

    /// Objects with nothing to export are valid whatever their id.
    pub fn is_exportable(&self) -> bool {
        self.is_empty() || self.has_valid_id()
    }

    /// Handle of the referenced image asset, if it resolved.
    pub fn image(&self) -> Option<&FileHandle> {
        self.image.as_ref()
    }

    /// Read the raw bytes of the image asset.
    pub fn image_bytes(&self) -> Result<Vec<u8>, GraphError> {
        let handle = self.image.as_ref().ok_or_else(|| GraphError::MissingImage(self.id.clone()))?;
        handle
            .read()
            .map_err(|source| GraphError::Io { name: handle.name().to_string(), source })
    }

    /// Move a costume to a new index.
    ///
    /// When `requested` is held by another costume, the costume lands on the
    /// next free index above it instead. Returns the index it landed on.
    pub fn set_costume_index(&mut self, current: u32, requested: u32) -> Result<u32, GraphError> {
        if !self.costumes.contains_key(&current) {
            return Err(GraphError::CostumeNotFound { object: self.id.clone(), index: current });
        }

        let target = (requested..=u32::MAX)
            .find(|idx| *idx == current || !self.costumes.contains_key(idx))
            .ok_or_else(|| GraphError::IndexExhausted { object: self.id.clone(), requested })?;

        if target != current {
            if let Some(mut costume) = self.costumes.remove(&current) {
                costume.id = target;
                self.costumes.insert(target, costume);
            }
        }
        Ok(target)
    }
}

/// All game objects of a project, keyed by id in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaletteGraph {
    objects: IndexMap<String, GameObject>,
}

impl PaletteGraph {
    pub fn new() -> Self {
        Self { objects: IndexMap::new() }
    }

    /// Add an object under its id, replacing any object already there.
    pub fn insert(&mut self, object: GameObject) -> Option<GameObject> {
        self.objects.insert(object.id.clone(), object)
    }

    pub fn get(&self, id: &str) -> Option<&GameObject> {
        self.objects.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.objects.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut GameObject> {
        self.objects.get_mut(id)
    }

    /// Objects in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.values()
    }

    /// Re-key an object. Its costumes move with it and it keeps its position.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), GraphError> {
        if !self.objects.contains_key(old) {
            return Err(GraphError::NotFound(old.to_string()));
        }
        if old == new {
            return Ok(());
        }
        if self.objects.contains_key(new) {
            return Err(GraphError::Occupied(new.to_string()));
        }

        if let Some((index, _, mut object)) = self.objects.shift_remove_full(old) {
            object.id = new.to_string();
            self.objects.shift_insert(index, new.to_string(), object);
        }
        Ok(())
    }

    /// Ids of objects that would be exported but fail the id check.
    pub fn invalid_ids(&self) -> Vec<String> {
        self.objects.values().filter(|o| !o.is_exportable()).map(|o| o.id.clone()).collect()
    }
}

impl Registry<GameObject> for PaletteGraph {
    fn contains(&self, name: &str) -> bool {
        PaletteGraph::contains(self, name)
    }

    fn get(&self, name: &str) -> Option<&GameObject> {
        PaletteGraph::get(self, name)
    }

    fn len(&self) -> usize {
        PaletteGraph::len(self)
    }

    fn clear(&mut self) {
        self.objects.clear();
    }

    fn names(&self) -> Box<dyn Iterator<Item = &String> + '_> {
        Box::new(self.objects.keys())
    }
}
