//! Inspect command: report objects, costumes and orphan files

use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

use crate::config::FmpalConfig;
use crate::registry::{GameObject, PaletteGraph, ValidationError};

use super::{load_project, EXIT_ERROR, EXIT_SUCCESS};

#[derive(Debug, Serialize)]
pub(crate) struct InspectReport {
    pub objects: Vec<ObjectReport>,
    pub unresolved_files: Vec<String>,
    pub dangling_sidecars: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ObjectReport {
    pub id: String,
    pub valid_id: bool,
    pub exported: bool,
    pub image: Option<String>,
    pub costumes: Vec<CostumeReport>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CostumeReport {
    pub index: u32,
    pub name: String,
    pub enabled: bool,
    pub colors: usize,
}

impl ObjectReport {
    fn from_object(object: &GameObject) -> Self {
        Self {
            id: object.id().to_string(),
            valid_id: object.has_valid_id(),
            exported: !object.is_empty(),
            image: object.image().map(|h| h.name().to_string()),
            costumes: object
                .costumes()
                .map(|c| CostumeReport {
                    index: c.id(),
                    name: c.name().to_string(),
                    enabled: c.is_enabled(),
                    colors: c.colors().len(),
                })
                .collect(),
        }
    }
}

impl InspectReport {
    pub fn new(graph: &PaletteGraph, orphans: Option<&ValidationError>) -> Self {
        let (unresolved_files, dangling_sidecars) = match orphans {
            Some(ValidationError::OrphanFiles { unresolved_files, dangling_sidecars }) => {
                (unresolved_files.clone(), dangling_sidecars.clone())
            }
            None => (Vec::new(), Vec::new()),
        };
        Self {
            objects: graph.iter().map(ObjectReport::from_object).collect(),
            unresolved_files,
            dangling_sidecars,
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for object in &self.objects {
            let flag = if !object.exported {
                " (not exported)"
            } else if !object.valid_id {
                " (invalid id)"
            } else {
                ""
            };
            out.push_str(&format!("{}{}\n", object.id, flag));
            match &object.image {
                Some(image) => out.push_str(&format!("  image: {}\n", image)),
                None => out.push_str("  image: <missing>\n"),
            }
            for costume in &object.costumes {
                out.push_str(&format!(
                    "  [{}] {} - {}, {} colors\n",
                    costume.index,
                    costume.name,
                    if costume.enabled { "enabled" } else { "disabled" },
                    costume.colors
                ));
            }
        }
        if self.objects.is_empty() {
            out.push_str("No palettes found\n");
        }
        for name in &self.unresolved_files {
            out.push_str(&format!("orphan: {} (no meta file)\n", name));
        }
        for name in &self.dangling_sidecars {
            out.push_str(&format!("orphan: {} (no content)\n", name));
        }
        out
    }
}

/// Execute the inspect command
pub fn run_inspect(dir: &Path, config: &FmpalConfig, json: bool) -> ExitCode {
    let project = match load_project(dir, config) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let report = InspectReport::new(&project.graph, project.orphans.as_ref());

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        print!("{}", report.to_text());
    }

    ExitCode::from(EXIT_SUCCESS)
}
