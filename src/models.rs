//! Data models for project files (palettes and sidecar metadata)

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::color::ColorValue;

/// Opaque identifier that cross-links project files.
pub type Guid = String;

/// Identifier of a color slot inside a palette.
///
/// Slot ids are matched exactly, so the string `"1"` and the number `1` are
/// different slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotId {
    Text(String),
    Number(i64),
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotId::Text(s) => f.write_str(s),
            SlotId::Number(n) => write!(f, "{}", n),
        }
    }
}

/// A `*.meta` sidecar carrying the identity of its neighbouring file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetaFile {
    pub guid: Guid,
}

/// A `*.palettes` content file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaletteFile {
    /// File identity.
    pub guid: Guid,
    /// Addressable object id, expected as `namespace::group.name`.
    pub id: String,
    /// Guid of the image the palette recolors.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_asset: Option<Guid>,
    #[serde(default)]
    pub colors: Vec<PaletteColor>,
    /// Costume definitions, in costume index order.
    #[serde(default)]
    pub maps: Vec<CostumeMap>,
}

/// One reusable color of a palette.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaletteColor {
    #[serde(rename = "$id")]
    pub id: SlotId,
    pub color: ColorValue,
}

/// A costume: a named recolor of the palette's colors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostumeMap {
    #[serde(default)]
    pub name: String,
    /// Per-plugin metadata. Only `isBase` is interpreted; entries of any
    /// other shape are kept as-is.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub plugin_metadata: Option<HashMap<String, Value>>,
    #[serde(default)]
    pub colors: Vec<ColorMapping>,
}

impl CostumeMap {
    /// Whether any plugin marks this costume as the base (uncolored) variant.
    pub fn is_base(&self) -> bool {
        self.plugin_metadata
            .as_ref()
            .is_some_and(|plugins| {
                plugins.values().any(|meta| meta.get("isBase").and_then(Value::as_bool) == Some(true))
            })
    }
}

/// Maps one palette slot to its costume color.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColorMapping {
    pub palette_color_id: SlotId,
    pub target_color: ColorValue,
}
