//! Report formatting and printing utilities.
//!
//! Text output is cargo-style; JSON output is a single document on stdout.
//! Kept out of the core so hoist can be used as a library.

use std::io::{self, Write};

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use super::args::OutputFormat;
use super::commands::{CommandResult, CommandSummary, ExplainSummary, InitSummary};
use crate::config::CONFIG_FILE_NAME;
use crate::core::{ExtractionCandidate, SourceContext};
use crate::issues::{Issue, Report, ReportLocation, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Maximum number of further occurrences to list per issue.
const MAX_RELATED_DISPLAY: usize = 3;

pub fn print(result: &CommandResult, verbose: bool) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match &result.summary {
        CommandSummary::Check {
            format: OutputFormat::Json,
        } => print_json_to(result, &mut stdout)?,
        CommandSummary::Check {
            format: OutputFormat::Text,
        } => {
            report_to(&result.issues, &mut stdout);
            if result.issues.is_empty() {
                print_success_to(result.source_files_checked, &mut stdout);
            }
        }
        CommandSummary::Explain(summary) => print_explain_to(summary, &mut stdout),
        CommandSummary::Init(summary) => print_init(summary),
    }

    print_parse_warning_to(result.parse_error_count, verbose, &mut io::stderr().lock());
    Ok(())
}

/// Print issues in cargo-style format to a writer.
///
/// Issues are sorted by location before printing.
pub fn report_to<W: Write>(issues: &[Issue], writer: &mut W) {
    if issues.is_empty() {
        return;
    }

    let mut sorted = issues.to_vec();
    sorted.sort();

    let max_line_width = calculate_max_line_width(&sorted);
    for issue in &sorted {
        print_issue(issue, writer, max_line_width);
    }

    print_summary(&sorted, writer);
}

/// Print a success message when nothing was found.
pub fn print_success_to<W: Write>(source_files: usize, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Checked {} source {} - no repeated expressions found",
            source_files,
            if source_files == 1 { "file" } else { "files" }
        )
        .green()
    );
}

/// Print a warning about files that could not be parsed.
pub fn print_parse_warning_to<W: Write>(count: usize, verbose: bool, writer: &mut W) {
    if count > 0 && !verbose {
        let _ = writeln!(
            writer,
            "{} {} file(s) could not be parsed (use {} for details)",
            "warning:".bold().yellow(),
            count,
            "-v".cyan()
        );
    }
}

// ============================================================
// JSON
// ============================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    files_checked: usize,
    candidates: Vec<JsonCandidate<'a>>,
    parse_errors: Vec<JsonParseError<'a>>,
}

#[derive(Serialize)]
struct JsonCandidate<'a> {
    file: &'a str,
    #[serde(flatten)]
    candidate: &'a ExtractionCandidate,
}

#[derive(Serialize)]
struct JsonParseError<'a> {
    file: &'a str,
    error: &'a str,
}

pub fn print_json_to<W: Write>(result: &CommandResult, writer: &mut W) -> Result<()> {
    let mut report = JsonReport {
        files_checked: result.source_files_checked,
        candidates: Vec::new(),
        parse_errors: Vec::new(),
    };
    for issue in &result.issues {
        match issue {
            Issue::RepeatedExpression(issue) => report.candidates.push(JsonCandidate {
                file: issue.context.file_path(),
                candidate: &issue.candidate,
            }),
            Issue::ParseError(issue) => report.parse_errors.push(JsonParseError {
                file: &issue.file_path,
                error: &issue.error,
            }),
        }
    }

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    writeln!(writer, "{}", json).context("Failed to write report")?;
    Ok(())
}

// ============================================================
// Other commands
// ============================================================

pub fn print_explain_to<W: Write>(summary: &ExplainSummary, writer: &mut W) {
    if summary.reasons.is_empty() {
        let _ = writeln!(
            writer,
            "{} `{}` can be hoisted into a local variable",
            SUCCESS_MARK.green(),
            summary.selection
        );
        return;
    }

    let _ = writeln!(
        writer,
        "{} `{}` cannot be hoisted ({}):",
        FAILURE_MARK.red(),
        summary.selection,
        summary.file_path
    );
    for reason in &summary.reasons {
        let _ = writeln!(writer, "  {} {}", "-".blue(), reason);
    }
}

fn print_init(summary: &InitSummary) {
    if summary.created {
        println!(
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", CONFIG_FILE_NAME).green()
        );
    } else {
        eprintln!("{} {} already exists", "error:".bold().red(), CONFIG_FILE_NAME);
    }
}

// ============================================================
// Internal Functions
// ============================================================

fn print_issue<W: Write>(issue: &Issue, writer: &mut W, max_line_width: usize) {
    let loc = issue.location();
    let message = issue.message();

    let severity = issue.report_severity();
    let severity_str = match severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
    };

    let _ = writeln!(
        writer,
        "{}: \"{}\"  {}",
        severity_str,
        message,
        issue.report_rule().to_string().dimmed().cyan()
    );

    match loc {
        ReportLocation::Source(ctx) => {
            let _ = writeln!(
                writer,
                "  {} {}:{}:{}",
                "-->".blue(),
                ctx.file_path(),
                ctx.line(),
                ctx.col()
            );
            print_source_context(ctx, &message, severity, writer, max_line_width);
        }
        ReportLocation::File { path } => {
            let _ = writeln!(writer, "  {} {}", "-->".blue(), path);
        }
    }

    print_related(issue.related(), writer, max_line_width);

    if let Some(details) = issue.details() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "note:".bold(),
            details,
            width = max_line_width
        );
    }

    if let Some(hint) = issue.hint() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "hint:".bold().cyan(),
            hint,
            width = max_line_width
        );
    }

    let _ = writeln!(writer);
}

/// Source line with the expression underlined.
fn print_source_context<W: Write>(
    ctx: &SourceContext,
    expression: &str,
    severity: Severity,
    writer: &mut W,
    max_line_width: usize,
) {
    let source_line = &ctx.source_line;
    let _ = writeln!(
        writer,
        "{:>width$} {}",
        "",
        "|".blue(),
        width = max_line_width
    );
    let _ = writeln!(
        writer,
        "{:>width$} {} {}",
        ctx.line().to_string().blue(),
        "|".blue(),
        source_line,
        width = max_line_width
    );

    // col is 1-based
    let skip = ctx.col().saturating_sub(1);
    let prefix: String = source_line.chars().take(skip).collect();
    let rest: String = source_line.chars().skip(skip).collect();
    let padding = UnicodeWidthStr::width(prefix.as_str());
    let underline = if rest.starts_with(expression) {
        UnicodeWidthStr::width(expression).max(1)
    } else {
        1
    };
    let carets = "^".repeat(underline);
    let carets = match severity {
        Severity::Error => carets.red(),
        Severity::Warning => carets.yellow(),
    };

    let _ = writeln!(
        writer,
        "{:>width$} {} {:>padding$}{}",
        "",
        "|".blue(),
        "",
        carets,
        width = max_line_width,
        padding = padding
    );
}

fn print_related<W: Write>(related: &[SourceContext], writer: &mut W, max_line_width: usize) {
    let total = related.len();
    let display_count = total.min(MAX_RELATED_DISPLAY);

    for (i, ctx) in related.iter().take(display_count).enumerate() {
        let remaining = total - display_count;
        let suffix = if i == display_count - 1 && remaining > 0 {
            format!(" (and {} more)", remaining)
        } else {
            String::new()
        };

        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}:{}:{}{}",
            "",
            "=".blue(),
            "also:".bold(),
            ctx.file_path(),
            ctx.line(),
            ctx.col(),
            suffix,
            width = max_line_width
        );
    }
}

fn print_summary<W: Write>(issues: &[Issue], writer: &mut W) {
    let total_errors = issues
        .iter()
        .filter(|i| i.report_severity() == Severity::Error)
        .count();
    let total_warnings = issues.len() - total_errors;

    let _ = writeln!(
        writer,
        "{} {} problems ({} {}, {} {})",
        FAILURE_MARK.red(),
        issues.len(),
        total_errors,
        if total_errors == 1 { "error" } else { "errors" }.red(),
        total_warnings,
        if total_warnings == 1 {
            "warning"
        } else {
            "warnings"
        }
        .yellow()
    );
}

fn calculate_max_line_width(issues: &[Issue]) -> usize {
    issues
        .iter()
        .filter_map(|i| match i.location() {
            ReportLocation::Source(ctx) => Some(ctx.line()),
            ReportLocation::File { .. } => None,
        })
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1)
}
