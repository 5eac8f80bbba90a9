//! fmpalette - costume palette tooling for Fraymakers projects
//!
//! This library provides functionality to:
//! - Resolve `.palettes` files and `.meta` sidecars into an object graph
//! - Recolor image assets per costume for previews
//! - Render the palette script and patch it into a template `.fra` project

pub mod cli;
pub mod color;
pub mod config;
pub mod container;
pub mod discovery;
pub mod export;
pub mod models;
pub mod output;
pub mod registry;
pub mod remap;
pub mod script;
pub mod template;
