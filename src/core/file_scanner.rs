//! Source file discovery.
//!
//! Includes and ignores come in two flavors: patterns containing `*` or `?`
//! are globs, anything else is a literal path relative to the source root
//! (so `app/[id]` means the directory, not a character class).

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use colored::Colorize;
use glob::{Pattern, glob};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::config::{Config, TEST_FILE_PATTERNS};

const SCANNABLE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "js", "jsx", "mjs"];

fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

fn warn(verbose: bool, message: std::fmt::Arguments<'_>) {
    if verbose {
        eprintln!("{} {}", "warning:".bold().yellow(), message);
    }
}

/// Files found under the source root, in path order.
pub struct ScanResult {
    pub files: BTreeSet<String>,
    pub skipped_count: usize,
}

/// Ignore rules compiled once per scan.
struct IgnoreRules {
    literal_paths: Vec<PathBuf>,
    patterns: Vec<Pattern>,
}

impl IgnoreRules {
    fn new(base_dir: &Path, ignores: &[String], ignore_test_files: bool, verbose: bool) -> Self {
        let mut literal_paths = Vec::new();
        let mut patterns = Vec::new();

        for ignore in ignores {
            if !is_glob_pattern(ignore) {
                literal_paths.push(base_dir.join(ignore));
                continue;
            }
            match Pattern::new(ignore) {
                Ok(pattern) => patterns.push(pattern),
                Err(e) => warn(
                    verbose,
                    format_args!("Invalid ignore pattern '{}': {}", ignore, e),
                ),
            }
        }

        if ignore_test_files {
            patterns.extend(TEST_FILE_PATTERNS.iter().filter_map(|p| Pattern::new(p).ok()));
        }

        Self {
            literal_paths,
            patterns,
        }
    }

    fn is_ignored(&self, path: &Path) -> bool {
        if self.literal_paths.iter().any(|ignored| path.starts_with(ignored)) {
            return true;
        }
        let path_str = path.to_string_lossy();
        self.patterns.iter().any(|p| p.matches(&path_str))
    }
}

pub struct FileScanner<'a> {
    base_dir: &'a Path,
    config: &'a Config,
    verbose: bool,
}

impl<'a> FileScanner<'a> {
    pub fn new(base_dir: &'a Path, config: &'a Config, verbose: bool) -> Self {
        Self {
            base_dir,
            config,
            verbose,
        }
    }

    pub fn scan(&self) -> ScanResult {
        let rules = IgnoreRules::new(
            self.base_dir,
            &self.config.ignores,
            self.config.ignore_test_files,
            self.verbose,
        );

        let mut files = BTreeSet::new();
        let mut skipped_count = 0;

        for root in self.roots() {
            let walker = WalkDir::new(&root)
                .into_iter()
                .filter_entry(|entry| !rules.is_ignored(entry.path()));
            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        skipped_count += 1;
                        warn(self.verbose, format_args!("Cannot access path: {}", e));
                        continue;
                    }
                };
                if is_scannable_file(&entry) {
                    files.insert(entry.path().to_string_lossy().into_owned());
                }
            }
        }

        debug!(files = files.len(), skipped_count, "scanned source root");
        ScanResult {
            files,
            skipped_count,
        }
    }

    /// Directories to walk: the includes if any, else the base directory.
    fn roots(&self) -> Vec<PathBuf> {
        if self.config.includes.is_empty() {
            return vec![self.base_dir.to_path_buf()];
        }

        let mut roots = Vec::new();
        for include in &self.config.includes {
            let path = self.base_dir.join(include);
            if !is_glob_pattern(include) {
                if path.exists() {
                    roots.push(path);
                } else {
                    warn(
                        self.verbose,
                        format_args!("Include path does not exist: {}", path.display()),
                    );
                }
                continue;
            }
            match glob(&path.to_string_lossy()) {
                Ok(entries) => roots.extend(entries.flatten().filter(|entry| entry.is_dir())),
                Err(e) => warn(
                    self.verbose,
                    format_args!("Invalid glob pattern '{}': {}", include, e),
                ),
            }
        }
        roots
    }
}

fn is_scannable_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() && has_scannable_extension(entry.path())
}

fn has_scannable_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SCANNABLE_EXTENSIONS.contains(&ext))
}
