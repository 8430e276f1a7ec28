use std::{
    cell::OnceCell,
    collections::{BTreeMap, BTreeSet, HashMap},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context as _, Result, anyhow};
use colored::Colorize;
use rayon::prelude::*;
use swc_common::SourceMap;
use tracing::debug;

use crate::{
    cli::args::CommonArgs,
    config::{Config, load_config},
    core::{
        AnalysisConfig, Driver, ExtractionCandidate,
        file_scanner::FileScanner,
        parsers::{ParsedSource, parse_source},
    },
    issues::ParseErrorIssue,
};

/// Candidates of every analyzed file, keyed by file path.
pub type AllCandidates = BTreeMap<String, Vec<ExtractionCandidate>>;

/// Analysis context of one `check` run.
///
/// Configuration and the file list are resolved eagerly so configuration
/// errors surface before any parsing. Parsing and analysis run on first
/// access.
///
/// Configuration priority (highest first): CLI arguments, `.hoistrc.json`,
/// built-in defaults.
pub struct CheckContext {
    /// Merged configuration (CLI args > config file > defaults).
    pub config: Config,

    pub analysis: AnalysisConfig,

    /// Project root directory (for resolving relative paths).
    pub root_dir: PathBuf,

    /// All source files to analyze, in path order.
    pub files: BTreeSet<String>,

    pub verbose: bool,

    parsed_files: OnceCell<HashMap<String, ParsedSource>>,
    parse_errors: OnceCell<Vec<ParseErrorIssue>>,
    candidates: OnceCell<AllCandidates>,
}

impl CheckContext {
    /// Load configuration, apply CLI overrides and scan the source root.
    ///
    /// # Errors
    ///
    /// Returns error if the config file is invalid or the merged analysis
    /// settings are out of range.
    pub fn new(common_args: &CommonArgs) -> Result<Self> {
        let verbose = common_args.verbose;
        let root_dir = common_args
            .source_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        if !root_dir.is_dir() {
            return Err(anyhow!("Source root is not a directory: {}", root_dir.display()));
        }

        let config_result = load_config(&root_dir)?;
        if verbose && !config_result.from_file {
            eprintln!("Note: No .hoistrc.json found, using default configuration");
        }

        let mut config = config_result.config;
        if let Some(max_line_span) = common_args.max_line_span {
            config.max_line_span = max_line_span;
        }
        let analysis = config
            .analysis_config()
            .with_context(|| format!("Invalid settings for {}", root_dir.display()))?;

        let scan_result = FileScanner::new(&root_dir, &config, verbose).scan();
        if scan_result.skipped_count > 0 {
            eprintln!(
                "{} {} path(s) skipped due to access errors{}",
                "warning:".bold().yellow(),
                scan_result.skipped_count,
                if verbose { "" } else { " (use -v for details)" }
            );
        }

        Ok(Self {
            config,
            analysis,
            root_dir,
            files: scan_result.files,
            verbose,
            parsed_files: OnceCell::new(),
            parse_errors: OnceCell::new(),
            candidates: OnceCell::new(),
        })
    }

    /// Parsed AST of every source file that parsed (lazy initialization).
    ///
    /// Files are read and parsed in parallel, each with its own `SourceMap`.
    /// Failures are collected into `parse_errors()`.
    pub fn parsed_files(&self) -> &HashMap<String, ParsedSource> {
        self.parsed_files.get_or_init(|| {
            let (parsed, errors) = parse_files(&self.files, self.verbose);
            let _ = self.parse_errors.set(errors);
            parsed
        })
    }

    /// Files that could not be read or parsed, in path order.
    pub fn parse_errors(&self) -> &Vec<ParseErrorIssue> {
        self.parsed_files();
        self.parse_errors.get_or_init(Vec::new)
    }

    /// Extraction candidates of every parsed file (lazy initialization).
    pub fn candidates(&self) -> &AllCandidates {
        self.candidates.get_or_init(|| {
            let driver = Driver::new(self.analysis.clone());
            self.parsed_files()
                .par_iter()
                .map(|(file_path, source)| (file_path.clone(), driver.process(source)))
                .filter(|(_, candidates)| !candidates.is_empty())
                .collect()
        })
    }

    /// Parsed source of one file, for building report contexts.
    pub fn source(&self, file_path: &str) -> Option<&ParsedSource> {
        self.parsed_files().get(file_path)
    }
}

fn parse_files(
    files: &BTreeSet<String>,
    verbose: bool,
) -> (HashMap<String, ParsedSource>, Vec<ParseErrorIssue>) {
    let results: Vec<(String, Result<ParsedSource>)> = files
        .par_iter()
        .map(|file_path| {
            let result = std::fs::read_to_string(file_path)
                .with_context(|| format!("Failed to read file: {}", file_path))
                .and_then(|code| {
                    let source_map = Arc::new(SourceMap::default());
                    parse_source(code, file_path, source_map)
                });
            (file_path.clone(), result)
        })
        .collect();

    let mut parsed = HashMap::new();
    let mut errors = Vec::new();
    for (file_path, result) in results {
        match result {
            Ok(source) => {
                parsed.insert(file_path, source);
            }
            Err(e) => {
                debug!(file = %file_path, error = %e, "skipping unparsable file");
                if verbose {
                    eprintln!("{} {} - {}", "warning:".bold().yellow(), file_path, e);
                }
                errors.push(ParseErrorIssue {
                    file_path,
                    error: e.to_string(),
                });
            }
        }
    }
    (parsed, errors)
}
