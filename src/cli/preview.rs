//! Preview command: render every costume of every object to PNG

use std::collections::HashSet;
use std::path::Path;
use std::process::ExitCode;

use crate::config::FmpalConfig;
use crate::output::{disambiguate_path, preview_path, save_png};
use crate::registry::GameObject;
use crate::remap::render_previews;

use super::{load_project, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the preview command
pub fn run_preview(
    dir: &Path,
    config: &FmpalConfig,
    output: &Path,
    object_filter: Option<&str>,
) -> ExitCode {
    let project = match load_project(dir, config) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let objects: Vec<&GameObject> = match object_filter {
        Some(id) => match project.graph.get(id) {
            Some(object) => vec![object],
            None => {
                eprintln!("Error: No object with id '{}' found", id);
                return ExitCode::from(EXIT_ERROR);
            }
        },
        None => project.graph.iter().collect(),
    };

    let mut failed = false;
    let mut written = 0usize;
    let mut taken = HashSet::new();
    for object in objects {
        let previews = match render_previews(object, config.preview.scale) {
            Ok(previews) => previews,
            Err(e) => {
                eprintln!("Error: object '{}': {}", object.id(), e);
                failed = true;
                continue;
            }
        };

        for preview in previews {
            let wanted = preview_path(output, object.id(), preview.costume_id);
            let path = disambiguate_path(wanted.clone(), &taken);
            if path != wanted {
                eprintln!(
                    "Warning: '{}' already written; saving object '{}' costume {} as '{}'",
                    wanted.display(),
                    object.id(),
                    preview.costume_id,
                    path.display()
                );
            }
            if let Err(e) = save_png(&preview.image, &path) {
                eprintln!("Error: Failed to save '{}': {}", path.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
            let state = if preview.enabled { "" } else { " (disabled)" };
            println!("Saved: {} [{}]{}", path.display(), preview.costume_name, state);
            taken.insert(path);
            written += 1;
        }
    }

    if written == 0 && !failed {
        eprintln!("Warning: Nothing to preview");
    }

    if failed {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}
