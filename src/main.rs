//! flatdb command-line shell.
//!
//! ```bash
//! # Interactive session
//! flatdb --data-dir ./data
//!
//! # Run one command and exit
//! flatdb -c "select from Users where age = 30"
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use flatdb::config::{Config, OutputFormat};
use flatdb::shell::{Confirm, Shell};
use flatdb::{Database, JsonFileStorage, ReadCache};

const PROMPT: &str = "flatdb> ";

/// File-backed table store driven by a small command language
#[derive(Parser, Debug)]
#[command(name = "flatdb", version, about)]
struct Args {
    /// Configuration file (defaults to ./flatdb.toml when present)
    #[arg(long, value_name = "FILE", env = "FLATDB_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the metadata and table documents
    #[arg(short = 'd', long, value_name = "DIR", env = "FLATDB_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Do not ask before drop_table and delete
    #[arg(short = 'y', long)]
    yes: bool,

    /// Do not print insert/select timings
    #[arg(long)]
    no_timing: bool,

    /// Execute a single command and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Output format for select results
    #[arg(short = 'o', long, value_enum)]
    output: Option<OutputFormatArg>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    /// Display results in a formatted table
    Table,
    /// Display results as JSON
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Reads the confirmation answer through the line editor.
struct EditorConfirm<'a>(&'a mut DefaultEditor);

impl Confirm for EditorConfirm<'_> {
    fn confirm(&mut self, question: &str) -> bool {
        match self.0.readline(question) {
            Ok(answer) => answer.trim().eq_ignore_ascii_case("y"),
            Err(_) => false,
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    debug!(?config, "configuration loaded");

    let storage = JsonFileStorage::new(&config.data_dir, &config.meta_file);
    let db = Database::new(storage, ReadCache::new(config.cache.invalidate_on_write));
    let mut shell = Shell::new(db, &config, std::io::stdout());
    let mut editor = DefaultEditor::new().context("failed to initialize the terminal")?;

    if let Some(command) = &args.command {
        let _ = shell.handle_line(command, &mut EditorConfirm(&mut editor));
        return Ok(());
    }

    info!(data_dir = %config.data_dir.display(), "starting session");
    println!("flatdb is running. Type help for the list of commands.");

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                if shell
                    .handle_line(&line, &mut EditorConfirm(&mut editor))
                    .is_break()
                {
                    break;
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                println!("Bye.");
                break;
            }
            Err(e) => return Err(e).context("failed to read input"),
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("flatdb=debug")
        } else {
            EnvFilter::new("flatdb=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = Config::load(args.config.as_deref())?;

    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if args.yes {
        config.confirm_destructive = false;
    }
    if args.no_timing {
        config.timing = false;
    }
    if let Some(output) = args.output {
        config.output = output.into();
    }

    Ok(config)
}
