//! Batch runs: parse, normalize, diff, write.
//!
//! Nothing is written until every earlier stage has succeeded. Each output
//! is first written to a temporary sibling, and the temporaries are renamed
//! into place only once all of them exist, so a failed write replaces no
//! output at all.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use owldiff_graph::{parser, Format, Graph, GraphError, PrefixTable};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::diff::DiffMode;
use crate::error::EngineError;
use crate::pipeline::Normalizer;
use crate::report::{NormalizeReport, StageTiming};

/// Where and how diff outputs are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    /// Path prefix; outputs are `<prefix>.<part>.<ext>`.
    pub prefix: PathBuf,
    /// Serialization of the outputs.
    pub format: Format,
    /// Whether the unchanged triples are written too.
    pub write_unchanged: bool,
}

impl Default for OutputSpec {
    fn default() -> Self {
        Self {
            prefix: PathBuf::from("diff"),
            format: Format::Turtle,
            write_unchanged: true,
        }
    }
}

impl OutputSpec {
    /// Path of one output part (`additions`, `removals`, `unchanged`).
    #[must_use]
    pub fn path(&self, part: &str) -> PathBuf {
        let mut name = self.prefix.as_os_str().to_os_string();
        name.push(format!(".{part}.{}", self.format.extension()));
        PathBuf::from(name)
    }
}

/// A complete diff run.
#[derive(Debug, Clone)]
pub struct DiffRequest {
    /// The old version.
    pub old: PathBuf,
    /// The new version.
    pub new: PathBuf,
    /// Format of `old`; detected from the extension when `None`.
    pub old_format: Option<Format>,
    /// Format of `new`; detected from the extension when `None`.
    pub new_format: Option<Format>,
    /// Output settings.
    pub output: OutputSpec,
    /// Engine settings.
    pub config: EngineConfig,
}

/// Counts for one input graph.
#[derive(Debug, Clone, Serialize)]
pub struct GraphSummary {
    /// The input file.
    pub source: PathBuf,
    /// Triples as parsed.
    pub parsed_triples: usize,
    /// Triples after normalization.
    pub normalized_triples: usize,
    /// What normalization did.
    pub normalization: NormalizeReport,
}

/// One written file.
#[derive(Debug, Clone, Serialize)]
pub struct OutputFile {
    /// `additions`, `removals`, `unchanged`, or `normalized`.
    pub part: String,
    /// Where it was written.
    pub path: PathBuf,
    /// Triples it holds.
    pub triples: usize,
}

/// Everything a diff run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Diff strategy used.
    pub mode: DiffMode,
    /// The old graph.
    pub old: GraphSummary,
    /// The new graph.
    pub new: GraphSummary,
    /// Triples only in the new graph.
    pub additions: usize,
    /// Triples only in the old graph.
    pub removals: usize,
    /// Triples in both.
    pub unchanged: usize,
    /// Files written.
    pub outputs: Vec<OutputFile>,
    /// Top-level stage timings.
    pub stages: Vec<StageTiming>,
    /// Wall-clock time of the whole run in milliseconds.
    pub total_millis: f64,
}

impl RunSummary {
    /// Logs the human-readable summary at `info`.
    pub fn log(&self) {
        tracing::info!(triples = self.old.parsed_triples, source = %self.old.source.display(), "old graph");
        tracing::info!(triples = self.new.parsed_triples, source = %self.new.source.display(), "new graph");
        for out in &self.outputs {
            tracing::info!(part = %out.part, triples = out.triples, path = %out.path.display(), "output written");
        }
        tracing::info!(
            mode = %self.mode,
            additions = self.additions,
            removals = self.removals,
            unchanged = self.unchanged,
            total_ms = self.total_millis,
            "diff complete"
        );
    }
}

/// What a single-graph normalization run did.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizeSummary {
    /// The input graph.
    pub graph: GraphSummary,
    /// The written output.
    pub output: OutputFile,
    /// Top-level stage timings.
    pub stages: Vec<StageTiming>,
    /// Wall-clock time of the whole run in milliseconds.
    pub total_millis: f64,
}

/// Parses and normalizes one input, recording the stage timings.
fn load(
    path: &Path,
    format: Option<Format>,
    config: &EngineConfig,
    normalizer: &Normalizer,
    label: &str,
    stages: &mut Vec<StageTiming>,
) -> Result<(Graph, GraphSummary), EngineError> {
    let t = Instant::now();
    let mut graph = parser::parse_file(path, format, config.input.max_bytes)?;
    stages.push(StageTiming::new(format!("parse-{label}"), t.elapsed()));
    let parsed_triples = graph.len();
    tracing::info!(graph = label, triples = parsed_triples, source = %path.display(), "parsed");

    let t = Instant::now();
    let normalization = {
        let _span = tracing::info_span!("graph", name = label).entered();
        normalizer.normalize(&mut graph)
    };
    stages.push(StageTiming::new(format!("normalize-{label}"), t.elapsed()));
    normalization.diagnostics.log_summary(label);

    let summary = GraphSummary {
        source: path.to_path_buf(),
        parsed_triples,
        normalized_triples: graph.len(),
        normalization,
    };
    Ok((graph, summary))
}

/// Runs a full diff: parse both inputs, normalize each, diff, write outputs.
///
/// # Errors
///
/// Returns [`EngineError::Graph`] if the output format is input-only or an
/// input is missing, too large, or does not parse, [`EngineError::Internal`] if the diff strategy fails, and
/// [`EngineError::Io`] if an output cannot be written.
pub fn run_diff(request: &DiffRequest) -> Result<RunSummary, EngineError> {
    let started = Instant::now();
    let config = &request.config;
    let normalizer = config.normalizer();
    let mut stages = Vec::new();

    if !request.output.format.is_writable() {
        return Err(GraphError::ReadOnlyFormat(request.output.format).into());
    }
    // both inputs are checked before either is parsed
    for path in [&request.old, &request.new] {
        parser::guard_file_size(path, config.input.max_bytes)?;
    }

    let (old, old_summary) = load(&request.old, request.old_format, config, &normalizer, "old", &mut stages)?;
    let (new, new_summary) = load(&request.new, request.new_format, config, &normalizer, "new", &mut stages)?;

    let strategy = config.diff.mode.strategy();
    tracing::info!(mode = strategy.name(), "diffing");
    let t = Instant::now();
    let diff = strategy.diff(&old, &new)?;
    stages.push(StageTiming::new("diff", t.elapsed()));

    let t = Instant::now();
    let prefixes = normalizer.prefixes();
    let mut parts = vec![("additions", diff.additions()), ("removals", diff.removals())];
    if request.output.write_unchanged {
        parts.push(("unchanged", &diff.unchanged));
    }
    let mut outputs = Vec::with_capacity(parts.len());
    let mut files = Vec::with_capacity(parts.len());
    for (part, graph) in parts {
        let path = request.output.path(part);
        files.push((path.clone(), request.output.format.serialize(graph, prefixes)?));
        outputs.push(OutputFile {
            part: part.to_owned(),
            path,
            triples: graph.len(),
        });
    }
    write_all_atomic(&files)?;
    stages.push(StageTiming::new("write", t.elapsed()));

    let summary = RunSummary {
        mode: config.diff.mode,
        old: old_summary,
        new: new_summary,
        additions: diff.additions().len(),
        removals: diff.removals().len(),
        unchanged: diff.unchanged.len(),
        outputs,
        stages,
        total_millis: started.elapsed().as_secs_f64() * 1000.0,
    };
    summary.log();
    Ok(summary)
}

/// Normalizes a single graph and writes it.
///
/// The output format is detected from `output` when `output_format` is `None`.
///
/// # Errors
///
/// Returns [`EngineError::Graph`] if the output format is input-only or the
/// input cannot be read or parsed, and [`EngineError::Io`] if the output
/// cannot be written.
pub fn run_normalize(
    input: &Path,
    input_format: Option<Format>,
    output: &Path,
    output_format: Option<Format>,
    config: &EngineConfig,
) -> Result<NormalizeSummary, EngineError> {
    let started = Instant::now();
    let format = output_format.unwrap_or_else(|| Format::from_path(output));
    if !format.is_writable() {
        return Err(GraphError::ReadOnlyFormat(format).into());
    }
    let normalizer = config.normalizer();
    let mut stages = Vec::new();
    let (graph, summary) = load(input, input_format, config, &normalizer, "input", &mut stages)?;

    let t = Instant::now();
    write_graph(output, &graph, format, normalizer.prefixes())?;
    stages.push(StageTiming::new("write", t.elapsed()));
    tracing::info!(triples = graph.len(), path = %output.display(), "normalized graph written");

    Ok(NormalizeSummary {
        graph: summary,
        output: OutputFile {
            part: "normalized".to_owned(),
            path: output.to_path_buf(),
            triples: graph.len(),
        },
        stages,
        total_millis: started.elapsed().as_secs_f64() * 1000.0,
    })
}

/// Serializes `graph` and writes it atomically.
///
/// # Errors
///
/// Returns [`EngineError::Graph`] if `format` cannot be written and
/// [`EngineError::Io`] if the file cannot be written.
pub fn write_graph(
    path: &Path,
    graph: &Graph,
    format: Format,
    prefixes: &PrefixTable,
) -> Result<(), EngineError> {
    write_atomic(path, &format.serialize(graph, prefixes)?)
}

/// Writes `contents` to a temporary sibling of `path`, then renames it into place.
///
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns [`EngineError::Io`] if a directory cannot be created or the file
/// cannot be written or renamed.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), EngineError> {
    let tmp = stage(path, contents)?;
    rename_into_place(&tmp, path)
}

/// Writes several files so that a failed write replaces none of them.
///
/// Every file goes to a temporary sibling first; renaming starts once all
/// temporaries exist. On failure the temporaries not yet renamed are deleted.
///
/// # Errors
///
/// Returns [`EngineError::Io`] for the first file that cannot be written or
/// renamed.
pub fn write_all_atomic(files: &[(PathBuf, String)]) -> Result<(), EngineError> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(files.len());
    for (path, contents) in files {
        match stage(path, contents) {
            Ok(tmp) => staged.push((tmp, path.as_path())),
            Err(err) => {
                discard(&staged);
                return Err(err);
            }
        }
    }
    for (i, (tmp, path)) in staged.iter().enumerate() {
        if let Err(err) = rename_into_place(tmp, path) {
            discard(&staged[i + 1..]);
            return Err(err);
        }
    }
    Ok(())
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> EngineError {
    let path = path.to_path_buf();
    move |source| EngineError::Io { path, source }
}

/// Writes `<path>.tmp` and returns its path.
fn stage(path: &Path, contents: &str) -> Result<PathBuf, EngineError> {
    let Some(name) = path.file_name() else {
        return Err(EngineError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file path"),
        });
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    let mut tmp_name = name.to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    fs::write(&tmp, contents).map_err(io_error(&tmp))?;
    Ok(tmp)
}

fn rename_into_place(tmp: &Path, path: &Path) -> Result<(), EngineError> {
    fs::rename(tmp, path).map_err(|source| {
        let _ = fs::remove_file(tmp);
        EngineError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn discard(staged: &[(PathBuf, &Path)]) {
    for (tmp, _) in staged {
        if let Err(e) = fs::remove_file(tmp) {
            tracing::warn!(path = %tmp.display(), error = %e, "temporary output left behind");
        }
    }
}
