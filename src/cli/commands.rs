use crate::cli::prompt::TerminalPrompter;
use crate::infra::config;
use crate::infra::deps;
use crate::infra::distrobox::DistroboxAdapter;
use crate::infra::homes::HomeClassifier;
use crate::services::{Outcome, Workflows};
use anyhow::{Result, ensure};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "boxkeeper",
    about = "Backup, restore and convert distrobox containers"
)]
pub struct Cli {
    /// Configuration directory (default: ~/.config/boxkeeper)
    #[arg(long, env = "BOXKEEPER_CONFIG_DIR", default_value_os_t = config::default_config_dir())]
    pub config_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List known containers with their isolation state
    List,
    /// Back up a container to a tar archive
    Backup {
        container: String,
        /// Destination directory for the archive
        #[arg(long)]
        dest: String,
        /// Archive name, without the .tar extension
        #[arg(long)]
        name: String,
    },
    /// Restore a container from a tar archive
    Restore { archive: String },
    /// Convert a container between Standard and Isolated
    Convert { container: String },
    /// Delete a container
    Delete { container: String },
    /// Check external dependencies
    Doctor,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Doctor => doctor(),
        command => dispatch(command, &cli.config_dir),
    }
}

fn dispatch(command: Commands, config_dir: &Path) -> Result<()> {
    deps::require_distrobox()?;

    let settings = config::load_settings(config_dir)?;
    let runtime = match settings.runtime.clone() {
        Some(runtime) => runtime,
        None => deps::detect_runtime()?,
    };
    debug!("using '{runtime}' as the container runtime");

    let toolchain = Arc::new(DistroboxAdapter::new(runtime));
    let homes = HomeClassifier::new(settings.data_dir());
    let workflows = Workflows::new(toolchain, Arc::new(TerminalPrompter::new()), homes);

    match command {
        Commands::List => list(&workflows),
        Commands::Backup {
            container,
            dest,
            name,
        } => {
            ensure!(!name.trim().is_empty(), "backup name cannot be empty");
            let container = workflows.find(&container)?;
            let dest = expand(&dest);
            ensure!(dest.is_dir(), "destination {:?} is not a directory", dest);

            match workflows.backup(&container, &dest, name.trim())? {
                Outcome::Completed(report) => {
                    println!(
                        "Backup of '{}' written to {}",
                        report.container,
                        report.archive.display()
                    );
                    print_warnings(&report.warnings);
                }
                Outcome::Cancelled => println!("Backup cancelled."),
            }
            Ok(())
        }
        Commands::Restore { archive } => {
            let archive = expand(&archive);
            ensure!(archive.is_file(), "backup file {:?} not found", archive);

            match workflows.restore(&archive)? {
                Outcome::Completed(report) => {
                    println!(
                        "Container '{}' restored as {}.",
                        report.container,
                        report.state.label()
                    );
                    print_warnings(&report.warnings);
                }
                Outcome::Cancelled => println!("Restore cancelled."),
            }
            Ok(())
        }
        Commands::Convert { container } => {
            let container = workflows.find(&container)?;
            match workflows.convert(&container)? {
                Outcome::Completed(report) => {
                    println!(
                        "Container '{}' converted to {}.",
                        report.container,
                        report.state.label()
                    );
                    print_warnings(&report.warnings);
                }
                Outcome::Cancelled => println!("Conversion cancelled."),
            }
            Ok(())
        }
        Commands::Delete { container } => {
            let container = workflows.find(&container)?;
            match workflows.delete(&container)? {
                Outcome::Completed(()) => println!("Container '{}' deleted.", container.name),
                Outcome::Cancelled => println!("Deletion cancelled."),
            }
            Ok(())
        }
        Commands::Doctor => unreachable!("handled before dispatch"),
    }
}

fn list(workflows: &Workflows) -> Result<()> {
    let containers = workflows.list()?;
    if containers.is_empty() {
        println!("No distrobox containers found.");
        return Ok(());
    }

    for container in &containers {
        let state = workflows.classify(&container.name);
        println!(
            "{:<25} {:<10} {}",
            container.name,
            state.label(),
            container.image
        );
    }
    Ok(())
}

fn doctor() -> Result<()> {
    println!("Checking external dependencies...");

    for dep in ["distrobox", "podman", "docker"] {
        if deps::command_available(dep) {
            println!("  ok       {dep}");
        } else {
            println!("  missing  {dep}");
        }
    }

    println!("distrobox plus one of podman/docker are required.");
    Ok(())
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        println!("Warning: {warning}");
    }
}
