//! Exact-match color substitution over RGBA pixel buffers.
//!
//! Every pixel whose packed color is a key of the mapping is overwritten with
//! the destination color; every other pixel is left byte-for-byte alone. No
//! blending is done. Pixels are independent, so the pass runs in parallel.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageOutputFormat, RgbaImage};
use rayon::prelude::*;
use std::collections::HashMap;
use std::io::Cursor;
use thiserror::Error;

use crate::color::{Color, ColorError};
use crate::output::{scale_image, OutputError};
use crate::registry::{Costume, GameObject, GraphError};

/// Bytes per `R, G, B, A` pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Error type for remap and preview operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemapError {
    /// Buffer length is not a whole number of pixels
    #[error("pixel buffer of {0} bytes is not a multiple of {BYTES_PER_PIXEL}")]
    Misaligned(usize),
    /// A destination color could not be parsed
    #[error(transparent)]
    Color(#[from] ColorError),
    /// Source image could not be decoded or the preview encoded
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    /// Image asset could not be loaded
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// Preview could not be scaled
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Packed source color to destination color, ready for lookups.
pub type ColorLookup = HashMap<u32, Color>;

/// Build the lookup table for a costume.
pub fn costume_lookup(costume: &Costume) -> Result<ColorLookup, ColorError> {
    costume
        .colors()
        .iter()
        .map(|(&src, dest)| Ok((src, Color::unpack(dest.packed()?))))
        .collect()
}

/// Replace mapped pixels of an `R, G, B, A` buffer in place.
pub fn remap_in_place(pixels: &mut [u8], lookup: &ColorLookup) -> Result<(), RemapError> {
    if pixels.len() % BYTES_PER_PIXEL != 0 {
        return Err(RemapError::Misaligned(pixels.len()));
    }
    if lookup.is_empty() {
        return Ok(());
    }

    pixels.par_chunks_exact_mut(BYTES_PER_PIXEL).for_each(|px| {
        // Buffer order is R,G,B,A; the packed key is A,R,G,B
        let src = Color::from_rgba([px[0], px[1], px[2], px[3]]).pack();
        if let Some(dest) = lookup.get(&src) {
            px.copy_from_slice(&dest.rgba());
        }
    });
    Ok(())
}

/// Return a remapped copy of an `R, G, B, A` buffer.
pub fn remap(pixels: &[u8], lookup: &ColorLookup) -> Result<Vec<u8>, RemapError> {
    let mut out = pixels.to_vec();
    remap_in_place(&mut out, lookup)?;
    Ok(out)
}

/// Decode an image and apply a costume to it.
pub fn apply_costume(image_bytes: &[u8], costume: &Costume) -> Result<RgbaImage, RemapError> {
    let lookup = costume_lookup(costume)?;
    let mut image = image::load_from_memory(image_bytes)?.to_rgba8();
    remap_in_place(&mut image, &lookup)?;
    Ok(image)
}

/// Encode an image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RemapError> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageOutputFormat::Png)?;
    Ok(out.into_inner())
}

/// Encode an image as a `data:image/png;base64,...` URL.
pub fn to_data_url(image: &RgbaImage) -> Result<String, RemapError> {
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(encode_png(image)?)))
}

/// A rendered costume preview.
#[derive(Debug, Clone)]
pub struct Preview {
    pub costume_id: u32,
    pub costume_name: String,
    pub enabled: bool,
    pub image: RgbaImage,
}

/// Render every costume of an object over its image asset.
///
/// The image is read once and decoded once per costume.
pub fn render_previews(object: &GameObject, scale: u8) -> Result<Vec<Preview>, RemapError> {
    let bytes = object.image_bytes()?;
    object
        .costumes()
        .map(|costume| {
            let image = scale_image(apply_costume(&bytes, costume)?, scale)?;
            Ok(Preview {
                costume_id: costume.id(),
                costume_name: costume.name().to_string(),
                enabled: costume.is_enabled(),
                image,
            })
        })
        .collect()
}
