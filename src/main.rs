mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use plancal_core::PlancalConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "plancal")]
#[command(about = "Turn university class timetables into one .ics calendar per group")]
struct Cli {
    /// Config file (defaults to ~/.config/plancal/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a calendar for every sub-group in the directory
    Generate {
        /// Skip sub-groups whose calendar file already exists
        #[arg(long)]
        resume: bool,

        /// Group directory JSON (overrides `directory` from config)
        #[arg(short, long)]
        directory: Option<PathBuf>,

        /// Output folder for .ics files (overrides `schedules_dir` from config)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Read saved `<id>.html` pages from this folder instead of the network
        #[arg(long)]
        offline: Option<PathBuf>,
    },
    /// Print one sub-group's classes without writing anything
    Preview {
        /// Sub-group id
        id: String,

        /// Keep language classes, as for the language-center group
        #[arg(long)]
        language_center: bool,

        /// Parse a saved timetable page instead of fetching it
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => PlancalConfig::load_from(path)?,
        None => PlancalConfig::load()?,
    };

    match cli.command {
        Commands::Generate {
            resume,
            directory,
            out,
            offline,
        } => commands::generate::run(&cfg, resume, directory, out, offline),
        Commands::Preview {
            id,
            language_center,
            file,
        } => commands::preview::run(&cfg, &id, language_center, file),
    }
}
