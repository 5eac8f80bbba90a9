//! Export pipeline: validate ids, render the script, patch the template.

use thiserror::Error;
use tracing::info;

use crate::container::{self, ContainerError, SCRIPT_SENTINEL};
use crate::output::project_file_name;
use crate::registry::PaletteGraph;
use crate::script::render_script;
use crate::template::FetchError;

/// Error that blocks an export.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    /// Objects with enabled costumes whose ids are not `namespace::group.name`
    #[error("invalid object ids (expected namespace::group.name): {}", .0.join(", "))]
    InvalidIds(Vec<String>),
    /// Template container could not be patched
    #[error(transparent)]
    Container(#[from] ContainerError),
    /// Template container could not be acquired
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Project id and display name written into the exported container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl ExportOptions {
    /// Project id, falling back to the template's own.
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or(container::DEFAULT_ID)
    }

    /// Display name, falling back to the template's own.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(container::DEFAULT_NAME)
    }
}

/// A patched container ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedProject {
    /// `<id>.fra`
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Objects that made it into the script, in graph order.
    pub exported_ids: Vec<String>,
}

/// Check every object id; all offenders are reported at once.
pub fn validate_export(graph: &PaletteGraph) -> Result<(), ExportError> {
    let invalid = graph.invalid_ids();
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(ExportError::InvalidIds(invalid))
    }
}

/// Build the exported project from the graph and template container bytes.
pub fn build_project(
    graph: &PaletteGraph,
    template: &[u8],
    options: &ExportOptions,
) -> Result<ExportedProject, ExportError> {
    validate_export(graph)?;

    let script = render_script(graph);
    let bytes = container::patch(
        template,
        SCRIPT_SENTINEL,
        &script,
        options.id.as_deref(),
        options.name.as_deref(),
    )?;

    let exported_ids: Vec<String> =
        graph.iter().filter(|o| !o.is_empty()).map(|o| o.id().to_string()).collect();
    info!(id = options.id(), objects = exported_ids.len(), bytes = bytes.len(), "project exported");

    Ok(ExportedProject { file_name: project_file_name(options.id()), bytes, exported_ids })
}
