//! Common trait for registries that store named items.

/// Common trait for registries that store named items.
///
/// Provides a read-mostly view over a map from string names to values, so
/// callers can list and look up entries without knowing how the registry
/// keeps them.
///
/// # Type Parameters
///
/// * `V` - The type of value stored in the registry
///
/// # Example
///
/// ```
/// use fmpalette::registry::{GameObject, PaletteGraph, Registry};
///
/// let mut graph = PaletteGraph::new();
/// graph.insert(GameObject::new("ns::hero.body", None));
///
/// assert!(Registry::contains(&graph, "ns::hero.body"));
/// assert_eq!(Registry::len(&graph), 1);
/// ```
pub trait Registry<V> {
    /// Check if an item with the given name exists in the registry.
    fn contains(&self, name: &str) -> bool;

    /// Get an item by name.
    ///
    /// Returns `None` if no item with the given name exists.
    fn get(&self, name: &str) -> Option<&V>;

    /// Get the number of items in the registry.
    fn len(&self) -> usize;

    /// Check if the registry is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all items from the registry.
    fn clear(&mut self);

    /// Get an iterator over all names in the registry.
    fn names(&self) -> Box<dyn Iterator<Item = &String> + '_>;
}
