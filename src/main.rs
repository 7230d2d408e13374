//! Quill - a small terminal text editor with incremental syntax highlighting.
//!
//! # Usage
//!
//! ```bash
//! quill main.c
//! quill --serial big.txt
//! quill --dict /usr/share/dict/words notes.txt
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

use quill::app::App;
use quill::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use quill::perf;

/// A terminal text editor with incremental syntax highlighting
#[derive(Parser, Debug)]
#[command(name = "quill", version, about, long_about = None)]
struct Cli {
    /// File to edit
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Load, save and render on a single thread
    #[arg(long)]
    serial: bool,

    /// Log timing of load, save and render
    #[arg(long)]
    perf: bool,

    /// Rows per load/save shard
    #[arg(long, value_name = "N")]
    shard_rows: Option<usize>,

    /// Worker threads per batch
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Word list for spellchecking text files
    #[arg(long = "dict", value_name = "PATH")]
    dictionary: Option<PathBuf>,

    /// Write log events to a file
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

/// Subscriber that passes warnings and errors only.
fn warnings_subscriber<W>(writer: W) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::default().add_directive(LevelFilter::WARN.into()))
        .with_writer(writer)
        .finish()
}

/// Send events to `path` when set, otherwise warnings only to stderr.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        // stdout carries the editor frames.
        tracing::subscriber::set_global_default(warnings_subscriber(std::io::stderr))
            .context("Failed to install logger")?;
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_env("QUILL_LOG").unwrap_or_else(|_| EnvFilter::new("quill=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_thread_names(true)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    let log_path = effective
        .log
        .clone()
        .or_else(|| std::env::var_os("QUILL_LOG_FILE").map(PathBuf::from));
    init_logging(log_path.as_deref())?;
    perf::set_enabled(effective.perf);
    tracing::debug!(?effective, "effective flags");

    let mut app = App::new(cli.file)
        .with_dictionary(effective.dictionary.clone())
        .with_shard_config(effective.shard_config());

    app.run().context("Application error")
}
