use crate::cli::args::OutputFormat;
use crate::cli::exit_status::ExitStatus;
use crate::core::SkipReason;
use crate::issues::{Issue, Severity};

#[derive(Debug)]
pub enum CommandSummary {
    Check { format: OutputFormat },
    Explain(ExplainSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct ExplainSummary {
    pub file_path: String,
    /// Source text of the selection.
    pub selection: String,
    /// Every failing rule; empty when the selection can be hoisted.
    pub reasons: Vec<SkipReason>,
}

#[derive(Debug)]
pub struct InitSummary {
    /// False when a config file already existed.
    pub created: bool,
}

/// Result of running a hoist command
pub struct CommandResult {
    pub summary: CommandSummary,
    pub error_count: usize,
    pub warning_count: usize,
    /// All issues found during the check, sorted.
    /// Empty for other commands.
    pub issues: Vec<Issue>,
    /// Number of files that failed to parse.
    pub parse_error_count: usize,
    /// Number of source files that were checked.
    pub source_files_checked: usize,
}

impl CommandResult {
    pub fn from_issues(
        summary: CommandSummary,
        mut issues: Vec<Issue>,
        source_files_checked: usize,
    ) -> Self {
        issues.sort();

        let parse_error_count = issues
            .iter()
            .filter(|i| matches!(i, Issue::ParseError(_)))
            .count();
        let error_count = issues
            .iter()
            .filter(|i| i.severity() == Severity::Error)
            .count();
        let warning_count = issues.len() - error_count;

        Self {
            summary,
            error_count,
            warning_count,
            issues,
            parse_error_count,
            source_files_checked,
        }
    }

    pub fn without_issues(summary: CommandSummary) -> Self {
        Self::from_issues(summary, Vec::new(), 0)
    }

    pub fn exit_status(&self) -> ExitStatus {
        let failed = match &self.summary {
            CommandSummary::Check { .. } => !self.issues.is_empty(),
            CommandSummary::Explain(summary) => !summary.reasons.is_empty(),
            CommandSummary::Init(summary) => !summary.created,
        };
        if failed {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        }
    }
}
