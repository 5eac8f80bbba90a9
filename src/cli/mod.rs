//! Command-line interface implementation
//!
//! This module provides the CLI entry point, the shared project loading
//! pipeline, and dispatches to submodules for each command.

mod export;
mod inspect;
mod preview;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::{load_config, merge_cli_overrides, CliOverrides, FmpalConfig, CONFIG_FILE_NAME};
use crate::discovery::discover_entries;
use crate::registry::{AssetRegistry, FileEntry, PaletteGraph, ValidationError};

pub use export::{CostumeRef, MoveEdit, RenameEdit};

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;
pub(crate) const EXIT_ABORTED: u8 = 3;

/// fmpal - Load costume palettes, preview recolors and export .fra projects
#[derive(Parser)]
#[command(name = "fmpal")]
#[command(about = "fmpal - Load costume palettes, preview recolors and export .fra projects")]
#[command(version)]
pub struct Cli {
    /// Config file (default: fmpal.toml found by walking up from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More logging (-v info, -vv debug). RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that scans a project
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Project directory
    pub dir: PathBuf,

    /// Directories to descend below the project root (0 = top level only)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Treat orphan files as errors
    #[arg(long)]
    pub strict: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List objects, costumes and orphan files of a project
    Inspect {
        #[command(flatten)]
        scan: ScanArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render one PNG per costume: {dir}/{safeId}_{index}.png
    Preview {
        #[command(flatten)]
        scan: ScanArgs,

        /// Output directory
        #[arg(short, long, default_value = "previews")]
        output: PathBuf,

        /// Only preview the object with this id
        #[arg(long)]
        object: Option<String>,

        /// Scale output by integer factor (1-16)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=16))]
        scale: Option<u8>,
    },

    /// Patch the template project with the palettes and write {id}.fra
    Export {
        #[command(flatten)]
        scan: ScanArgs,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Local template .fra file
        #[arg(long, conflicts_with = "template_url")]
        template: Option<PathBuf>,

        /// Template URL
        #[arg(long)]
        template_url: Option<String>,

        /// Project id (also the output filename)
        #[arg(long)]
        id: Option<String>,

        /// Project display name
        #[arg(long)]
        name: Option<String>,

        /// Rename an object before export
        #[arg(long, value_name = "OLD=NEW", value_parser = export::parse_rename)]
        rename: Vec<RenameEdit>,

        /// Flip a costume's enabled state
        #[arg(long, value_name = "ID#INDEX", value_parser = export::parse_costume_ref)]
        toggle: Vec<CostumeRef>,

        /// Move a costume to another index (next free index if taken)
        #[arg(long = "move", value_name = "ID#INDEX=NEW", value_parser = export::parse_move)]
        moves: Vec<MoveEdit>,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Inspect { scan, json } => {
            let config = match resolve_config(cli.config.as_deref(), &scan, CliOverrides::default()) {
                Ok(c) => c,
                Err(code) => return code,
            };
            inspect::run_inspect(&scan.dir, &config, json)
        }
        Commands::Preview { scan, output, object, scale } => {
            let overrides = CliOverrides { scale, ..Default::default() };
            let config = match resolve_config(cli.config.as_deref(), &scan, overrides) {
                Ok(c) => c,
                Err(code) => return code,
            };
            preview::run_preview(&scan.dir, &config, &output, object.as_deref())
        }
        Commands::Export {
            scan,
            output,
            template,
            template_url,
            id,
            name,
            rename,
            toggle,
            moves,
        } => {
            let overrides = CliOverrides {
                id,
                name,
                template_url,
                template_path: template,
                ..Default::default()
            };
            let config = match resolve_config(cli.config.as_deref(), &scan, overrides) {
                Ok(c) => c,
                Err(code) => return code,
            };
            let edits = export::Edits { rename, toggle, moves };
            export::run_export(&scan.dir, &config, &output, &edits)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load the config file and apply command-line overrides.
fn resolve_config(
    path: Option<&Path>,
    scan: &ScanArgs,
    mut overrides: CliOverrides,
) -> Result<FmpalConfig, ExitCode> {
    let mut config = load_config(path).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_INVALID_ARGS)
    })?;

    overrides.max_depth = scan.max_depth;
    overrides.strict = scan.strict.then_some(true);
    merge_cli_overrides(&mut config, &overrides);

    let errors = config.validate();
    if !errors.is_empty() {
        for error in errors {
            eprintln!("Error: {}", error);
        }
        return Err(ExitCode::from(EXIT_INVALID_ARGS));
    }
    Ok(config)
}

/// A scanned project: its graph plus any orphan report.
pub(crate) struct LoadedProject {
    pub graph: PaletteGraph,
    pub orphans: Option<ValidationError>,
}

/// Discover the project's files.
///
/// An unreadable project directory is reported as aborted, not as an error.
pub(crate) fn scan_project(dir: &Path, config: &FmpalConfig) -> Result<Vec<FileEntry>, ExitCode> {
    discover_entries(dir, config.scan.max_depth).map_err(|e| {
        if e.is_aborted() {
            eprintln!("{}", e);
            ExitCode::from(EXIT_ABORTED)
        } else {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_INVALID_ARGS)
        }
    })
}

/// Resolve discovered files into the object graph.
///
/// Orphans are warnings unless strict mode is on.
pub(crate) fn resolve_project(
    entries: Vec<FileEntry>,
    config: &FmpalConfig,
) -> Result<LoadedProject, ExitCode> {
    let mut allow = config.allow_patterns();
    allow.extend(glob::Pattern::new(CONFIG_FILE_NAME).ok());
    let mut registry = AssetRegistry::new().with_allowlist(allow);

    if let Err(e) = registry.ingest_all(entries) {
        eprintln!("Error: {}", e);
        return Err(ExitCode::from(EXIT_ERROR));
    }

    let orphans = registry.finalize().err();
    if let Some(ref orphans) = orphans {
        if config.scan.strict {
            eprintln!("Error: {}", orphans);
            return Err(ExitCode::from(EXIT_ERROR));
        }
        eprintln!("Warning: {}", orphans);
    }

    let graph = registry.build_graph().map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_ERROR)
    })?;
    debug!(objects = graph.len(), "project loaded");
    Ok(LoadedProject { graph, orphans })
}

/// Discover and resolve a project directory.
pub(crate) fn load_project(dir: &Path, config: &FmpalConfig) -> Result<LoadedProject, ExitCode> {
    let entries = scan_project(dir, config)?;
    resolve_project(entries, config)
}
