//! # Girderline CLI
//!
//! Command-line driver for `bridge_core`. Every command prints JSON on stdout
//! so the output can be piped into a renderer or inspected by a script.
//!
//! ## Commands
//!
//! - `bridge_cli defaults` - Print the default parameter set
//! - `bridge_cli balance` - Size the deck and balance overhang against spacing
//! - `bridge_cli validate` - Check parameters against the form ranges
//! - `bridge_cli layout` - Compute a full drawing for one view
//! - `bridge_cli project new|add|list` - Manage `.bridge` project files
//!
//! Logs go to stderr. Set `RUST_LOG` or pass `--verbose` to see them.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use bridge_core::errors::BridgeError;
use bridge_core::file_io;
use bridge_core::layout::balancer::AdjustmentNotice;
use bridge_core::layout::{compute_drawing, resolve, ViewKind};
use bridge_core::parameters::{BridgeParameters, EditedField};
use bridge_core::project::BridgeProject;
use bridge_core::settings::{DrawingSettings, Viewport};

/// Steel girder bridge schematic engine
#[derive(Parser)]
#[command(name = "bridge_cli")]
#[command(about = "Lays out steel girder bridge schematics as JSON", long_about = None)]
#[command(version)]
struct Cli {
    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default parameters
    Defaults,

    /// Compute deck width and the balanced overhang/spacing pair
    Balance {
        #[command(flatten)]
        input: ParamsInput,
    },

    /// Check parameters against the ranges the input form accepts
    Validate {
        #[command(flatten)]
        input: ParamsInput,
    },

    /// Compute the drawing for one view
    Layout {
        #[command(flatten)]
        input: ParamsInput,

        /// Project file to take the design from (instead of --params)
        #[arg(long, requires = "design", conflicts_with = "params")]
        project: Option<PathBuf>,

        /// Design label inside --project
        #[arg(long, requires = "project")]
        design: Option<String>,

        /// View to draw: cross-section or top
        #[arg(long, default_value_t = ViewKind::CrossSection)]
        view: ViewKind,

        /// Viewport width (px)
        #[arg(long, default_value_t = 1200.0)]
        width: f64,

        /// Viewport height (px)
        #[arg(long, default_value_t = 800.0)]
        height: f64,

        /// Drawing settings JSON (defaults to the project's settings, or built-in defaults)
        #[arg(long)]
        settings: Option<PathBuf>,
    },

    /// Manage project files
    #[command(subcommand)]
    Project(ProjectCommand),
}

#[derive(Args)]
struct ParamsInput {
    /// Parameters JSON file (missing fields take defaults)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Field the user just edited: overhang, spacing or other
    #[arg(long, default_value_t = EditedField::Other)]
    edited: EditedField,
}

#[derive(Subcommand)]
enum ProjectCommand {
    /// Create an empty project file
    New {
        path: PathBuf,
        #[arg(long, default_value = "")]
        engineer: String,
        #[arg(long, default_value = "")]
        job_id: String,
        #[arg(long, default_value = "")]
        client: String,
    },

    /// Add a labelled design to a project (locks the file while writing)
    Add {
        path: PathBuf,
        #[arg(long)]
        label: String,
        /// Parameters JSON file (defaults when omitted)
        #[arg(long)]
        params: Option<PathBuf>,
        /// Who holds the lock while writing
        #[arg(long)]
        user: Option<String>,
    },

    /// List the designs in a project
    List { path: PathBuf },
}

/// Output of `balance`
#[derive(Debug, Serialize)]
struct BalanceReport {
    deck_total_width_mm: f64,
    footpath_count: u32,
    parameters: BridgeParameters,
    notices: Vec<AdjustmentNotice>,
    messages: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ProjectListing<'a> {
    engineer: &'a str,
    job_id: &'a str,
    client: &'a str,
    designs: Vec<&'a str>,
    locked_by: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if let Some(bridge_err) = e.downcast_ref::<BridgeError>() {
                if let Ok(json) = serde_json::to_string_pretty(bridge_err) {
                    eprintln!("{json}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Defaults => print_json(&BridgeParameters::default()),
        Commands::Balance { input } => {
            let params = read_params(input.params.as_deref())?;
            print_json(&balance_report(&params, input.edited))
        }
        Commands::Validate { input } => {
            let params = read_params(input.params.as_deref())?;
            params.validate()?;
            print_json(&serde_json::json!({ "valid": true }))
        }
        Commands::Layout {
            input,
            project,
            design,
            view,
            width,
            height,
            settings,
        } => {
            let (params, project_settings) = match (project, design) {
                (Some(path), Some(label)) => {
                    let project = file_io::load_project(&path)?;
                    let parameters = project.find_design(&label)?.1.parameters.clone();
                    (parameters, project.settings)
                }
                _ => (read_params(input.params.as_deref())?, DrawingSettings::default()),
            };
            let settings = match settings {
                Some(path) => file_io::load_settings(&path)?,
                None => project_settings,
            };

            debug!(%view, width, height, "Computing layout");
            let viewport = Viewport::new(width, height);
            let drawing = compute_drawing(&params, input.edited, view, viewport, &settings);
            print_json(&drawing)
        }
        Commands::Project(cmd) => run_project(cmd),
    }
}

fn run_project(command: ProjectCommand) -> Result<()> {
    match command {
        ProjectCommand::New {
            path,
            engineer,
            job_id,
            client,
        } => {
            if path.exists() {
                let path = path.display().to_string();
                return Err(BridgeError::file_error("create", path, "File already exists").into());
            }
            let project = BridgeProject::new(engineer, job_id, client);
            file_io::save_project(&project, &path)?;
            info!(path = %path.display(), "Created project");
            print_json(&project.meta)
        }
        ProjectCommand::Add {
            path,
            label,
            params,
            user,
        } => {
            let parameters = read_params(params.as_deref())?;
            let user = user
                .or_else(|| std::env::var("USER").ok())
                .unwrap_or_else(|| "unknown".to_string());
            let id = file_io::modify_project(&path, user, |project| {
                project.add_design(label.clone(), parameters)
            })?;
            print_json(&serde_json::json!({ "id": id, "label": label }))
        }
        ProjectCommand::List { path } => {
            let (project, lock) = file_io::load_project_with_lock_check(&path)?;
            let listing = ProjectListing {
                engineer: &project.meta.engineer,
                job_id: &project.meta.job_id,
                client: &project.meta.client,
                designs: project.labels(),
                locked_by: lock.map(|info| info.holder()),
            };
            print_json(&listing)
        }
    }
}

fn read_params(path: Option<&Path>) -> Result<BridgeParameters> {
    match path {
        Some(path) => file_io::load_parameters(path)
            .with_context(|| format!("Failed to read parameters from {}", path.display())),
        None => Ok(BridgeParameters::default()),
    }
}

fn balance_report(params: &BridgeParameters, edited: EditedField) -> BalanceReport {
    let resolved = resolve(params, edited);
    BalanceReport {
        deck_total_width_mm: resolved.deck.total_width_mm,
        footpath_count: resolved.deck.footpath_count,
        messages: resolved.notices.iter().map(AdjustmentNotice::message).collect(),
        parameters: resolved.parameters,
        notices: resolved.notices,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_layout_arguments() {
        let cli = Cli::try_parse_from([
            "bridge_cli", "layout", "--view", "top", "--edited", "spacing", "--width", "900",
        ])
        .unwrap();
        match cli.command {
            Commands::Layout {
                input, view, width, ..
            } => {
                assert_eq!(view, ViewKind::Top);
                assert_eq!(input.edited, EditedField::Spacing);
                assert_eq!(width, 900.0);
            }
            _ => panic!("expected layout"),
        }
    }

    #[test]
    fn test_design_requires_project() {
        assert!(Cli::try_parse_from(["bridge_cli", "layout", "--design", "A"]).is_err());
        assert!(Cli::try_parse_from(["bridge_cli", "layout", "--view", "sideways"]).is_err());
    }

    #[test]
    fn test_balance_report_defaults() {
        let report = balance_report(&BridgeParameters::default(), EditedField::Other);
        assert_eq!(report.deck_total_width_mm, 14_500.0);
        assert_eq!(report.footpath_count, 2);
        assert_eq!(report.parameters.deck_overhang_mm, 2000.0);
        assert_eq!(report.messages.len(), report.notices.len());
        assert!(!report.messages.is_empty());
    }
}
