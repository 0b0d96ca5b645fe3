//! `owldiff`: normalizes and diffs OWL ontologies.
//!
//! Blank node labels, `rdf:List` order and the direction of symmetric
//! axioms are normalized away first, so the diff only reports real changes.
//!
//! **Usage:**
//! ```
//! owldiff diff OLD NEW [--out-prefix diff] [--format turtle|nt] [--diff-mode isomorphic|simple]
//! owldiff normalize INPUT [-o OUTPUT] [--format turtle|nt]
//! ```
//!
//! Inputs may be Turtle, N-Triples, RDF/XML (`.owl`, `.rdf`, `.xml`) or
//! JSON-LD (`.jsonld`); outputs are Turtle or N-Triples.
//!
//! Exits 0 on success (an empty diff included) and 2 on any error.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use owldiff_engine::run::{run_diff, run_normalize, write_atomic, DiffRequest, OutputSpec};
use owldiff_engine::{DiffMode, EngineConfig};
use owldiff_graph::Format;
use tracing_subscriber::EnvFilter;

/// Normalize and diff OWL ontologies.
#[derive(Parser)]
#[command(
    name = "owldiff",
    version,
    about = "Normalize OWL ontologies and report the triples that really changed"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level; RUST_LOG overrides it.
    #[arg(
        long,
        global = true,
        default_value = "info",
        value_parser = ["error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,
}

#[derive(Subcommand)]
enum Command {
    /// Diff two versions of an ontology into additions, removals and unchanged triples.
    Diff {
        /// The old version.
        old: PathBuf,

        /// The new version.
        new: PathBuf,

        /// Output path prefix; files are written as <prefix>.<part>.<ext>.
        #[arg(long, default_value = "diff")]
        out_prefix: PathBuf,

        /// Output serialization (turtle or nt).
        #[arg(long, default_value = "turtle")]
        format: Format,

        /// Do not write the unchanged triples.
        #[arg(long)]
        no_unchanged: bool,

        /// Format of OLD (turtle, nt, rdfxml or jsonld); detected from the extension by default.
        #[arg(long)]
        old_format: Option<Format>,

        /// Format of NEW (turtle, nt, rdfxml or jsonld); detected from the extension by default.
        #[arg(long)]
        new_format: Option<Format>,

        /// Diff strategy (isomorphic or simple).
        #[arg(long)]
        diff_mode: Option<DiffMode>,

        /// Also write the run summary as JSON to this file.
        #[arg(long)]
        summary_json: Option<PathBuf>,

        #[command(flatten)]
        engine: EngineFlags,
    },

    /// Write the normalized form of one ontology.
    Normalize {
        /// The ontology to normalize.
        input: PathBuf,

        /// Output file (default: <input stem>.normalized.<ext> beside the input).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output serialization (turtle or nt); detected from OUTPUT by default.
        #[arg(long)]
        format: Option<Format>,

        /// Format of INPUT (turtle, nt, rdfxml or jsonld); detected from the extension by default.
        #[arg(long)]
        input_format: Option<Format>,

        #[command(flatten)]
        engine: EngineFlags,
    },
}

/// Flags shared by every subcommand that normalizes.
#[derive(Args)]
struct EngineFlags {
    /// TOML configuration file; command-line flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip list sorting and head determinization.
    #[arg(long)]
    no_list_canon: bool,

    /// Skip equivalence and symmetric edge orientation.
    #[arg(long)]
    no_symmetric_canon: bool,

    /// Keep list cells that no longer have any reference.
    #[arg(long)]
    no_prune_lists: bool,

    /// Reject inputs larger than this many bytes.
    #[arg(long)]
    max_input_bytes: Option<u64>,

    /// Emit a progress event every N items in long loops (0 disables).
    #[arg(long)]
    log_every: Option<usize>,
}

impl EngineFlags {
    /// Defaults, then the configuration file, then these flags.
    fn resolve(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?,
            None => EngineConfig::default(),
        };
        if self.no_list_canon {
            config.normalize.list_canon = false;
        }
        if self.no_symmetric_canon {
            config.normalize.symmetric_canon = false;
        }
        if self.no_prune_lists {
            config.normalize.prune_lists = false;
        }
        if let Some(max) = self.max_input_bytes {
            config.input.max_bytes = max;
        }
        if let Some(n) = self.log_every {
            config.normalize.log_every = n;
        }
        Ok(config)
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).with_context(|| format!("invalid log level {level}"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install the log subscriber: {e}"))
}

fn default_output(input: &Path, format: Format) -> PathBuf {
    let stem = input.file_stem().map_or_else(
        || "ontology".to_owned(),
        |s| s.to_string_lossy().into_owned(),
    );
    input.with_file_name(format!("{stem}.normalized.{}", format.extension()))
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Diff {
            old,
            new,
            out_prefix,
            format,
            no_unchanged,
            old_format,
            new_format,
            diff_mode,
            summary_json,
            engine,
        } => {
            let mut config = engine.resolve()?;
            if let Some(mode) = diff_mode {
                config.diff.mode = mode;
            }
            let request = DiffRequest {
                old,
                new,
                old_format,
                new_format,
                output: OutputSpec {
                    prefix: out_prefix,
                    format,
                    write_unchanged: !no_unchanged,
                },
                config,
            };
            let summary = run_diff(&request).context("diff failed")?;
            if let Some(path) = summary_json {
                let json = serde_json::to_string_pretty(&summary).context("failed to encode summary")?;
                write_atomic(&path, &json)
                    .with_context(|| format!("failed to write summary {}", path.display()))?;
            }
        }
        Command::Normalize {
            input,
            output,
            format,
            input_format,
            engine,
        } => {
            let config = engine.resolve()?;
            let output = output.unwrap_or_else(|| default_output(&input, format.unwrap_or_default()));
            let summary = run_normalize(&input, input_format, &output, format, &config)
                .context("normalization failed")?;
            tracing::info!(
                source = %summary.graph.source.display(),
                parsed = summary.graph.parsed_triples,
                normalized = summary.graph.normalized_triples,
                path = %summary.output.path.display(),
                total_ms = summary.total_millis,
                "normalize complete"
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging(&cli.log_level) {
        eprintln!("error: {err:#}");
        return ExitCode::from(2);
    }
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "run failed");
            eprintln!("error: {err}");
            for cause in err.chain().skip(1) {
                eprintln!("  caused by: {cause}");
            }
            ExitCode::from(2)
        }
    }
}
