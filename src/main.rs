//! Livemark - A terminal markdown editor with live preview.
//!
//! # Usage
//!
//! ```bash
//! livemark notes.md
//! livemark --theme dark
//! livemark notes.md --export notes.html
//! livemark notes.md --stats
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;

use livemark::app::App;
use livemark::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use livemark::document::{MarkdownTransformer, Transformer};
use livemark::highlight::Theme;
use livemark::session::{export_document, export_title};
use livemark::stats::compute_stats;

/// A markdown editor with live HTML preview, autosave and export
#[derive(Parser, Debug)]
#[command(name = "livemark", version, about, long_about = None)]
struct Cli {
    /// Markdown file to open
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Write FILE as a standalone HTML page and exit
    #[arg(long, value_name = "OUT", requires = "file")]
    export: Option<PathBuf>,

    /// Print word and character counts of FILE and exit
    #[arg(long, requires = "file")]
    stats: bool,

    /// Preview and export theme (light or dark)
    #[arg(long)]
    theme: Option<Theme>,

    /// Storage file holding the autosaved session
    #[arg(long, value_name = "PATH")]
    storage: Option<PathBuf>,

    /// Directory receiving saved and exported files
    #[arg(long, value_name = "DIR")]
    download_dir: Option<PathBuf>,

    /// Write logs of the interactive session to a file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Keep single newlines as soft breaks
    #[arg(long)]
    no_breaks: bool,

    /// Disable tables, strikethrough, autolinks and task lists
    #[arg(long)]
    no_gfm: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

impl Cli {
    const fn is_headless(&self) -> bool {
        self.export.is_some() || self.stats
    }
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
}

/// Headless runs log to stderr. The terminal UI owns the screen, so it only
/// logs when a file is given.
fn init_logging(headless: bool, log_file: Option<&Path>) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter());
    if headless {
        builder.with_writer(std::io::stderr).init();
    } else if let Some(path) = log_file {
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else {
        builder.with_writer(std::io::sink).init();
    }
    Ok(())
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn export_to(path: &Path, out: &Path, effective: &ConfigFlags) -> Result<()> {
    let source = read_source(path)?;
    let transformer = MarkdownTransformer::new().with_options(effective.transform_options());
    let body = transformer.transform(&source).html;
    let name = path.file_name().map(|name| name.to_string_lossy().into_owned());
    let page = export_document(
        &body,
        &export_title(name.as_deref()),
        effective.theme.unwrap_or_default(),
    );
    fs::write(out, page).with_context(|| format!("Failed to write {}", out.display()))?;
    tracing::info!(from = %path.display(), to = %out.display(), "exported");
    Ok(())
}

fn print_stats(path: &Path) -> Result<()> {
    let stats = compute_stats(&read_source(path)?);
    println!("{} words", stats.words);
    println!("{} chars", stats.chars);
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

    init_logging(cli.is_headless(), effective.log_file.as_deref())?;

    if let Some(file) = cli.file.as_deref() {
        if let Some(out) = cli.export.as_deref() {
            export_to(file, out, &effective)?;
        }
        if cli.stats {
            print_stats(file)?;
        }
        if cli.is_headless() {
            return Ok(());
        }
        if !file.exists() {
            anyhow::bail!("File not found: {}", file.display());
        }
    }

    let mut app = App::new(effective.storage_path())
        .with_download_dir(effective.download_dir())
        .with_theme(effective.theme)
        .with_transform_options(effective.transform_options())
        .with_initial_file(cli.file);

    app.run().context("Application error")
}
