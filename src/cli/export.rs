//! Export command: apply edits, patch the template and write `{id}.fra`

use std::path::Path;
use std::process::ExitCode;

use crate::config::FmpalConfig;
use crate::export::{build_project, ExportError, ExportOptions};
use crate::output::save_bytes;
use crate::registry::{GraphError, PaletteGraph};
use crate::template::TemplateLoader;

use super::{resolve_project, scan_project, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// `--rename OLD=NEW`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEdit {
    pub old: String,
    pub new: String,
}

/// `ID#INDEX`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostumeRef {
    pub object: String,
    pub index: u32,
}

/// `--move ID#INDEX=NEW`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveEdit {
    pub costume: CostumeRef,
    pub to: u32,
}

pub(crate) fn parse_rename(s: &str) -> Result<RenameEdit, String> {
    match s.split_once('=') {
        Some((old, new)) if !old.is_empty() && !new.is_empty() => {
            Ok(RenameEdit { old: old.to_string(), new: new.to_string() })
        }
        _ => Err(format!("expected OLD=NEW, got '{}'", s)),
    }
}

pub(crate) fn parse_costume_ref(s: &str) -> Result<CostumeRef, String> {
    let (object, index) =
        s.rsplit_once('#').ok_or_else(|| format!("expected ID#INDEX, got '{}'", s))?;
    if object.is_empty() {
        return Err(format!("expected ID#INDEX, got '{}'", s));
    }
    let index = index.parse().map_err(|_| format!("invalid costume index '{}'", index))?;
    Ok(CostumeRef { object: object.to_string(), index })
}

pub(crate) fn parse_move(s: &str) -> Result<MoveEdit, String> {
    let (costume, to) =
        s.rsplit_once('=').ok_or_else(|| format!("expected ID#INDEX=NEW, got '{}'", s))?;
    let costume = parse_costume_ref(costume)?;
    let to = to.parse().map_err(|_| format!("invalid costume index '{}'", to))?;
    Ok(MoveEdit { costume, to })
}

/// Graph edits from the command line.
///
/// Applied as renames, then toggles, then moves; toggles and moves use the
/// ids as they are after renaming.
#[derive(Debug, Clone, Default)]
pub(crate) struct Edits {
    pub rename: Vec<RenameEdit>,
    pub toggle: Vec<CostumeRef>,
    pub moves: Vec<MoveEdit>,
}

impl Edits {
    /// Apply every edit; stops at the first one that fails.
    pub fn apply(&self, graph: &mut PaletteGraph) -> Result<(), GraphError> {
        for edit in &self.rename {
            graph.rename(&edit.old, &edit.new)?;
        }
        for costume in &self.toggle {
            costume_of(graph, costume)?.toggle_enabled();
        }
        for edit in &self.moves {
            let object = graph
                .get_mut(&edit.costume.object)
                .ok_or_else(|| GraphError::NotFound(edit.costume.object.clone()))?;
            let landed = object.set_costume_index(edit.costume.index, edit.to)?;
            if landed != edit.to {
                eprintln!(
                    "Warning: costume {} of '{}' moved to {} because {} is taken",
                    edit.costume.index, edit.costume.object, landed, edit.to
                );
            }
        }
        Ok(())
    }
}

fn costume_of<'a>(
    graph: &'a mut PaletteGraph,
    costume: &CostumeRef,
) -> Result<&'a mut crate::registry::Costume, GraphError> {
    let object =
        graph.get_mut(&costume.object).ok_or_else(|| GraphError::NotFound(costume.object.clone()))?;
    object.costume_mut(costume.index).ok_or_else(|| GraphError::CostumeNotFound {
        object: costume.object.clone(),
        index: costume.index,
    })
}

/// Execute the export command
pub(crate) fn run_export(dir: &Path, config: &FmpalConfig, output: &Path, edits: &Edits) -> ExitCode {
    let loader = TemplateLoader::new(config.template.source());

    // Fetch the template while the project directory is scanned
    let (scanned, prefetch) = rayon::join(|| scan_project(dir, config), || loader.load().map(|_| ()));
    let entries = match scanned {
        Ok(entries) => entries,
        Err(code) => return code,
    };
    if let Err(e) = prefetch {
        tracing::debug!(error = %e, "template prefetch failed, retrying at export");
    }

    let mut project = match resolve_project(entries, config) {
        Ok(p) => p,
        Err(code) => return code,
    };

    if let Err(e) = edits.apply(&mut project.graph) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let template = match loader.load() {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error: {}", ExportError::from(e));
            eprintln!("Export can be retried once the template is reachable.");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let options = ExportOptions {
        id: Some(config.project.id.clone()),
        name: Some(config.project.name.clone()),
    };
    let exported = match build_project(&project.graph, &template, &options) {
        Ok(exported) => exported,
        Err(ExportError::InvalidIds(ids)) => {
            eprintln!("Error: Cannot export, these object ids are not namespace::group.name:");
            for id in ids {
                eprintln!("  {}", id);
            }
            return ExitCode::from(EXIT_ERROR);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let path = output.join(&exported.file_name);
    if let Err(e) = save_bytes(&exported.bytes, &path) {
        eprintln!("Error: Failed to save '{}': {}", path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    println!("Saved: {} ({} objects)", path.display(), exported.exported_ids.len());
    ExitCode::from(EXIT_SUCCESS)
}
