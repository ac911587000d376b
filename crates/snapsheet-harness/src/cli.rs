use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use snapsheet::SheetFile;

use crate::error::Result;
use crate::replay::Replayer;
use crate::script::Script;

#[derive(Debug, Parser)]
#[command(
    name = "snapsheet-harness",
    about = "Replay scripted gesture scenarios against a snapsheet panel",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a JSON script, printing one JSON line per step.
    Replay(ReplayArgs),

    /// Print the default sheet configuration as TOML.
    Defaults,
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Path to the scenario script.
    pub script: PathBuf,

    /// Override the script's frame interval.
    #[arg(long)]
    pub frame_ms: Option<u64>,

    /// TOML file whose `[sheet]` and `[tuning]` replace the script's.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print a summary line after the steps.
    #[arg(long)]
    pub summary: bool,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Replay(args) => run_replay(args),
        Commands::Defaults => {
            let text = SheetFile::default().to_toml_string()?;
            print!("{text}");
            Ok(())
        }
    }
}

fn run_replay(args: ReplayArgs) -> Result<()> {
    let mut script = Script::load(&args.script)?;
    if let Some(frame_ms) = args.frame_ms {
        script.frame_ms = frame_ms;
    }
    if let Some(path) = &args.config {
        let file = SheetFile::from_toml_file(path)?;
        script.sheet = file.sheet;
        script.tuning = file.tuning;
    }
    tracing::info!(
        script = %args.script.display(),
        steps = script.steps.len(),
        frame_ms = script.frame_ms,
        "replaying"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = Replayer::new(&script)?.run(&script, &mut out)?;
    if args.summary {
        writeln!(out, "{}", serde_json::to_string(&summary)?)?;
    }
    tracing::info!(closes = summary.closes, frames = summary.frames, "replay finished");
    Ok(())
}
