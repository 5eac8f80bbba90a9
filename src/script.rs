//! Palette script generation.
//!
//! Turns the object graph into the script fragment embedded in the exported
//! project:
//!
//! ```text
//! var ns__hero_body_PALETTES = [
//!   1 => [
//!     4294901760 => 4278255360,
//!   ],
//! ];
//!
//! var PALETTES = [
//!   "ns::hero.body" => ns__hero_body_PALETTES,
//! ];
//! ```
//!
//! Each block is produced by a small builder taking structured arguments, so
//! no slot text is ever searched for inside already rendered text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write;
use tracing::info;

use crate::color::ColorValue;
use crate::registry::{Costume, GameObject, PaletteGraph};

/// The first `namespace::group.name` run in an id. The separator before
/// `name` matches any character.
static ID_PARTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z0-9_]+)::([A-Za-z0-9_]+).([A-Za-z0-9_]+)").expect("id pattern is valid")
});

/// Name of the master list in the generated script.
pub const MASTER_LIST: &str = "PALETTES";

/// Token-safe form of an object id: `ns::group.name` becomes `ns__group_name`.
///
/// Only the first match is rewritten; anything around it is kept.
pub fn safe_id(id: &str) -> String {
    ID_PARTS.replacen(id, 1, "${1}__${2}_${3}").into_owned()
}

/// Script variable holding an object's costumes.
pub fn palettes_symbol(safe_id: &str) -> String {
    format!("{}_{}", safe_id, MASTER_LIST)
}

/// `    <src> => <dest>,`
pub fn color_entry(src: u32, dest: &ColorValue) -> String {
    format!("    {} => {},", src, dest)
}

/// One costume's color map.
pub fn costume_block(index: u32, entries: &[String]) -> String {
    format!("  {} => [\n{}\n  ],", index, entries.join("\n"))
}

/// An object's costume list variable.
pub fn object_block(symbol: &str, costume_blocks: &[String]) -> String {
    format!("var {} = [\n{}\n];\n", symbol, costume_blocks.join("\n"))
}

/// `  "<unsafe id>" => <symbol>,`
pub fn master_entry(unsafe_id: &str, symbol: &str) -> String {
    format!("  \"{}\" => {},", unsafe_id, symbol)
}

/// The whole fragment: object blocks followed by the master list.
pub fn script(object_blocks: &[String], master_entries: &[String]) -> String {
    let mut out = String::new();
    out.push_str(&object_blocks.join("\n"));
    let _ = write!(out, "\n    \nvar {} = [\n{}  \n];", MASTER_LIST, master_entries.join("\n"));
    out
}

fn render_costume(costume: &Costume) -> String {
    let entries: Vec<String> =
        costume.colors().iter().map(|(&src, dest)| color_entry(src, dest)).collect();
    costume_block(costume.id(), &entries)
}

/// Render one object, or `None` when it has no enabled costume.
pub fn render_object(object: &GameObject) -> Option<(String, String)> {
    let mut costume_blocks = Vec::new();
    for costume in object.costumes() {
        if !costume.is_enabled() {
            info!(
                id = object.id(),
                costume = costume.name(),
                "skipping costume because it is disabled"
            );
            continue;
        }
        costume_blocks.push(render_costume(costume));
    }
    if costume_blocks.is_empty() {
        return None;
    }

    let symbol = palettes_symbol(&safe_id(object.id()));
    Some((object_block(&symbol, &costume_blocks), master_entry(object.id(), &symbol)))
}

/// Render the script fragment for every exportable object, in graph order.
pub fn render_script(graph: &PaletteGraph) -> String {
    let (object_blocks, master_entries): (Vec<String>, Vec<String>) =
        graph.iter().filter_map(render_object).unzip();
    script(&object_blocks, &master_entries)
}
