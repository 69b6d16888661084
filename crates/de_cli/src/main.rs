//! Decision Engine CLI
//!
//! JSON-lines tracking frames in, per-frame decision reports out.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use de_cli::{build_engine, evaluate_file, load_config, summarize};

#[derive(Parser)]
#[command(name = "decision-engine")]
#[command(about = "Evaluate football tracking frames: eliminations, gaps, action value", long_about = None)]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every frame and write one JSON record per line
    Evaluate {
        /// Input frames (JSON lines or a JSON array)
        #[arg(long)]
        r#in: PathBuf,

        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,

        /// Configuration preset (balanced, counter_attacking, possession)
        #[arg(long)]
        profile: Option<String>,

        /// Configuration JSON file, overrides --profile
        #[arg(long)]
        config: Option<PathBuf>,

        /// Player priors JSON file
        #[arg(long)]
        priors: Option<PathBuf>,
    },

    /// Match summary, decision review and key moments as JSON
    Summary {
        #[arg(long)]
        r#in: PathBuf,

        /// Actions actually taken (JSON lines), graded against the best option
        #[arg(long)]
        actions: Option<PathBuf>,

        /// Entries per key-moment category
        #[arg(long, default_value_t = 10)]
        top: usize,

        #[arg(long)]
        profile: Option<String>,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        priors: Option<PathBuf>,
    },

    /// Print the JSON Schema of the input frame record
    Schema,

    /// Print the resolved configuration
    Config {
        #[arg(long)]
        profile: Option<String>,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("info") };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match cli.command {
        Commands::Evaluate { r#in, out, profile, config, priors } => {
            let engine = build_engine(profile.as_deref(), config.as_deref(), priors.as_deref())?;
            let stats = evaluate_file(&engine, &r#in, out.as_deref())?;
            eprintln!(
                "{} frames: {} evaluated, {} rejected, {} unparsable lines skipped",
                stats.frames, stats.evaluated, stats.rejected, stats.skipped_lines
            );
        }

        Commands::Summary { r#in, actions, top, profile, config, priors } => {
            let engine = build_engine(profile.as_deref(), config.as_deref(), priors.as_deref())?;
            let report = summarize(&engine, &r#in, actions.as_deref(), top)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Schema => {
            let schema = de_core::input_schema_json().map_err(anyhow::Error::msg)?;
            println!("{schema}");
        }

        Commands::Config { profile, config } => {
            let resolved = load_config(profile.as_deref(), config.as_deref())?;
            resolved.validate()?;
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }
    }

    Ok(())
}
