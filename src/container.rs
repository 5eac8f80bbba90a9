//! `.fra` project container patching.
//!
//! Layout:
//!
//! ```text
//! [u32 big-endian N][N bytes UTF-8 JSON][payload ...]
//! ```
//!
//! Patching rewrites the JSON segment and its length prefix. The payload is
//! copied through untouched and starts right after the new JSON segment.

use thiserror::Error;

/// Size of the big-endian length prefix.
pub const HEADER_SIZE: usize = 4;

/// Placeholder inside the template's JSON that receives the generated script.
pub const SCRIPT_SENTINEL: &str = "/*CUSTOM_PALETTE_INFO*/";

/// Project id used throughout the template.
pub const DEFAULT_ID: &str = "paletteeditor";

/// Project display name used throughout the template.
pub const DEFAULT_NAME: &str = "Palette Editor";

/// The container does not have the expected structure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ContainerError {
    /// Fewer bytes than the length prefix
    #[error("container is {0} bytes, too short for the {HEADER_SIZE}-byte header")]
    Truncated(usize),
    /// Declared JSON length runs past the end of the container
    #[error("header declares {declared} bytes of JSON but only {available} follow")]
    LengthOverrun { declared: usize, available: usize },
    /// JSON segment is not valid UTF-8
    #[error("JSON segment is not valid UTF-8 (at byte {0})")]
    InvalidUtf8(usize),
    /// JSON segment does not contain the sentinel
    #[error("template JSON does not contain '{SCRIPT_SENTINEL}'")]
    MissingSentinel,
    /// New JSON segment does not fit the 32-bit length prefix
    #[error("JSON segment of {0} bytes does not fit in the header")]
    TooLarge(usize),
}

/// A parsed view over container bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container<'a> {
    pub json: &'a str,
    pub payload: &'a [u8],
}

impl<'a> Container<'a> {
    /// Split container bytes into JSON text and payload.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, ContainerError> {
        let header: [u8; HEADER_SIZE] = bytes
            .get(..HEADER_SIZE)
            .and_then(|h| h.try_into().ok())
            .ok_or(ContainerError::Truncated(bytes.len()))?;
        let declared = u32::from_be_bytes(header) as usize;

        let rest = &bytes[HEADER_SIZE..];
        if declared > rest.len() {
            return Err(ContainerError::LengthOverrun { declared, available: rest.len() });
        }

        let (json, payload) = rest.split_at(declared);
        let json = std::str::from_utf8(json)
            .map_err(|e| ContainerError::InvalidUtf8(HEADER_SIZE + e.valid_up_to()))?;
        Ok(Self { json, payload })
    }

    /// Assemble a container around new JSON text with this payload.
    pub fn assemble(json: &str, payload: &[u8]) -> Result<Vec<u8>, ContainerError> {
        let len = u32::try_from(json.len()).map_err(|_| ContainerError::TooLarge(json.len()))?;
        let mut out = Vec::with_capacity(HEADER_SIZE + json.len() + payload.len());
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(json.as_bytes());
        out.extend_from_slice(payload);
        Ok(out)
    }
}

/// Escape text for use inside an already quoted JSON string.
pub fn escape_json_fragment(text: &str) -> String {
    let quoted = serde_json::Value::String(text.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

/// Patch a template container.
///
/// The first `marker` in the JSON text is replaced with the escaped
/// `script`. Then every occurrence of [`DEFAULT_ID`] and [`DEFAULT_NAME`]
/// anywhere in the JSON text, the inserted script included, is replaced with
/// the overrides. The replacement is a plain substring replace over the whole
/// text, matching how the template was authored.
pub fn patch(
    template: &[u8],
    marker: &str,
    script: &str,
    id_override: Option<&str>,
    name_override: Option<&str>,
) -> Result<Vec<u8>, ContainerError> {
    let container = Container::parse(template)?;
    if !container.json.contains(marker) {
        return Err(ContainerError::MissingSentinel);
    }

    let id = id_override.unwrap_or(DEFAULT_ID);
    let name = name_override.unwrap_or(DEFAULT_NAME);
    let json = container
        .json
        .replacen(marker, &escape_json_fragment(script), 1)
        .replace(DEFAULT_ID, id)
        .replace(DEFAULT_NAME, name);

    Container::assemble(&json, container.payload)
}
