//! Configuration for the fmpal tool
//!
//! Provides types, discovery and loading for the `fmpal.toml` project file.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
