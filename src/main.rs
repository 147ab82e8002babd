use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use mandexing::config::Config;
use mandexing::io::script::{self, ScriptOutput};
use mandexing::utils::{logger, report};
use mandexing::{Result, Session};

#[derive(Parser)]
#[command(name = "mandexing")]
#[command(about = "Predict diffraction spots for an oriented crystal and refine its orientation")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to the per-user config location).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict spot positions and print the strongest.
    Predict {
        /// Command script replayed before predicting.
        #[arg(long)]
        script: Option<PathBuf>,

        /// Rotation matrix file to start from.
        #[arg(long)]
        matrix: Option<PathBuf>,

        /// Rows in the printed table.
        #[arg(long, default_value = "40")]
        limit: usize,
    },

    /// Replay a script that watches spots and refines.
    Refine {
        #[arg(long)]
        script: PathBuf,

        /// Write the refined rotation matrix here.
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Print the effective settings as JSON.
    Config {
        /// Save them to the per-user config location.
        #[arg(long)]
        write: bool,
    },
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => Config::load_from(p),
        None => Ok(Config::load()),
    }
}

fn print_script_output(output: &ScriptOutput) {
    for found in &output.identified {
        println!("{}", report::reflection_report(found));
    }
    for refined in &output.refinements {
        println!("{}", report::refinement_report(refined));
    }
}

fn run(cli: Cli, cfg: Config) -> Result<()> {
    match cli.command {
        Commands::Predict { script, matrix, limit } => {
            let mut session = Session::from_config(&cfg)?;
            if let Some(path) = matrix {
                session.load_matrix(&path)?;
            }
            if let Some(path) = script {
                print_script_output(&script::run_file(&mut session, &path)?);
            }
            print!("{}", report::prediction_summary(&session, limit));
        }
        Commands::Refine { script, save } => {
            let mut session = Session::from_config(&cfg)?;
            let output = script::run_file(&mut session, &script)?;
            if output.refinements.is_empty() {
                log::warn!("{:?} never calls 'refine'", script);
            }
            print_script_output(&output);
            if let Some(path) = save {
                session.save_matrix(&path)?;
            }
        }
        Commands::Config { write } => {
            println!("{}", serde_json::to_string_pretty(&cfg)?);
            if write {
                let path = cfg.save()?;
                println!("Saved to {}", path.display());
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Config decides the log level, so it is read before the logger exists
    let cfg = load_config(cli.config.as_deref());
    let level = match (&cfg, cli.verbose) {
        (_, true) => "debug",
        (Ok(cfg), false) => cfg.log_level.as_str(),
        (Err(_), false) => "info",
    };
    let _ = logger::init(level);

    let result = cfg.and_then(|cfg| run(cli, cfg));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
