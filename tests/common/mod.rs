//! Shared fixtures: small on-disk projects and template containers

#![allow(dead_code)]

use fmpalette::color::pack;
use fmpalette::container::{Container, SCRIPT_SENTINEL};
use image::{Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

pub const RED: [u8; 4] = [255, 0, 0, 255];
pub const GREEN: [u8; 4] = [0, 255, 0, 255];
pub const BLUE: [u8; 4] = [0, 0, 255, 255];
pub const CLEAR: [u8; 4] = [0, 0, 0, 0];

/// Packed key of an R,G,B,A pixel
pub fn packed(px: [u8; 4]) -> u32 {
    pack(px[0], px[1], px[2], px[3])
}

pub const TEMPLATE_JSON: &str = r#"{"id":"paletteeditor","name":"Palette Editor","scripts":{"palettes":"/*CUSTOM_PALETTE_INFO*/"}}"#;

/// Payload bytes of the test template, including bytes that are not UTF-8
pub fn template_payload() -> Vec<u8> {
    let mut payload = b"PK\x03\x04".to_vec();
    payload.extend((0..=255u8).rev());
    payload
}

pub fn template_bytes() -> Vec<u8> {
    assert!(TEMPLATE_JSON.contains(SCRIPT_SENTINEL));
    Container::assemble(TEMPLATE_JSON, &template_payload()).unwrap()
}

pub fn write_template(dir: &Path) -> PathBuf {
    let path = dir.join("paletteeditor.fra");
    fs::write(&path, template_bytes()).unwrap();
    path
}

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// 2x2 image: red, green / blue, clear
pub fn sprite() -> RgbaImage {
    let mut image = RgbaImage::new(2, 2);
    image.put_pixel(0, 0, Rgba(RED));
    image.put_pixel(1, 0, Rgba(GREEN));
    image.put_pixel(0, 1, Rgba(BLUE));
    image.put_pixel(1, 1, Rgba(CLEAR));
    image
}

pub fn palette_json(guid: &str, id: &str, image_guid: &str) -> String {
    format!(
        r#"{{
  "guid": "{guid}",
  "id": "{id}",
  "imageAsset": "{image_guid}",
  "colors": [
    {{ "$id": "skin", "color": "{red}" }},
    {{ "$id": "eyes", "color": "{green}" }}
  ],
  "maps": [
    {{
      "name": "Default",
      "pluginMetadata": {{ "com.fraymakers.FraymakersMetadata": {{ "isBase": true }} }},
      "colors": [
        {{ "paletteColorId": "skin", "targetColor": "{red}" }},
        {{ "paletteColorId": "eyes", "targetColor": "{green}" }}
      ]
    }},
    {{
      "name": "Blue",
      "colors": [
        {{ "paletteColorId": "skin", "targetColor": "{blue}" }}
      ]
    }}
  ]
}}"#,
        red = packed(RED),
        green = packed(GREEN),
        blue = packed(BLUE),
    )
}

/// Project with one palette, one image and its sidecar, plus a README.
///
/// ```text
/// root/
///   README.md
///   project.fraytools
///   library/hero.palettes
///   library/sprites/hero.png
///   library/sprites/hero.png.meta
/// ```
pub fn write_project(root: &Path, id: &str) {
    write(&root.join("README.md"), b"# test project");
    write(&root.join("project.fraytools"), b"{}");
    write(&root.join("library/hero.palettes"), palette_json("pal-1", id, "img-1").as_bytes());
    write(&root.join("library/sprites/hero.png.meta"), br#"{"guid": "img-1"}"#);
    sprite().save(root.join("library/sprites/hero.png")).unwrap();
}

/// Add a file with no sidecar and a sidecar with no content.
pub fn add_orphans(root: &Path) {
    write(&root.join("library/loose.png"), b"not really a png");
    write(&root.join("library/gone.png.meta"), br#"{"guid": "img-gone"}"#);
}
