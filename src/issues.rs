//! Issue types for analysis results.
//!
//! Each issue carries everything the reporters need, so nothing has to be
//! re-read from disk while printing.

use enum_dispatch::enum_dispatch;

use crate::core::parsers::ParsedSource;
use crate::core::{ExtractionCandidate, SourceContext, SourceLocation};

// ============================================================
// Severity and Rule
// ============================================================

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Rule identifier for each issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    RepeatedExpression,
    ParseError,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::RepeatedExpression => write!(f, "repeated-expression"),
            Rule::ParseError => write!(f, "parse-error"),
        }
    }
}

// ============================================================
// Issue Types
// ============================================================

/// An expression evaluated more than once in one body that can be hoisted
/// into a local variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatedExpressionIssue {
    /// Location of the first occurrence.
    pub context: SourceContext,
    /// Locations of the remaining occurrences.
    pub repeats: Vec<SourceContext>,
    pub candidate: ExtractionCandidate,
}

impl RepeatedExpressionIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::RepeatedExpression
    }

    /// Attach source lines to every occurrence of a candidate.
    ///
    /// Returns `None` for a candidate without occurrences.
    pub fn from_candidate(source: &ParsedSource, candidate: ExtractionCandidate) -> Option<Self> {
        let mut contexts = candidate.occurrences.iter().map(|site| {
            SourceContext::new(
                SourceLocation::new(&source.file_path, site.line, site.column),
                source.line_text(site.line),
            )
        });
        let context = contexts.next()?;
        let repeats = contexts.collect();
        Some(Self {
            context,
            repeats,
            candidate,
        })
    }
}

/// File could not be read or parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrorIssue {
    pub file_path: String,
    pub error: String,
}

impl ParseErrorIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::ParseError
    }
}

// ============================================================
// Issue Enum
// ============================================================

/// A finding reported by `hoist check`.
#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    RepeatedExpression(RepeatedExpressionIssue),
    ParseError(ParseErrorIssue),
}

impl Issue {
    pub fn severity(&self) -> Severity {
        match self {
            Issue::RepeatedExpression(_) => RepeatedExpressionIssue::severity(),
            Issue::ParseError(_) => ParseErrorIssue::severity(),
        }
    }

    pub fn rule(&self) -> Rule {
        match self {
            Issue::RepeatedExpression(_) => RepeatedExpressionIssue::rule(),
            Issue::ParseError(_) => ParseErrorIssue::rule(),
        }
    }
}

// ============================================================
// Report Trait (for CLI output)
// ============================================================

/// Location information for report output.
pub enum ReportLocation<'a> {
    /// Source code location (has source_line for context display).
    Source(&'a SourceContext),
    /// File-level only (for ParseError - no line context).
    File { path: &'a str },
}

/// Uniform view of an issue for the reporters.
#[enum_dispatch]
pub trait Report {
    fn location(&self) -> ReportLocation<'_>;

    /// Primary message to display.
    fn message(&self) -> String;

    fn report_severity(&self) -> Severity;

    fn report_rule(&self) -> Rule;

    /// Optional hint for fixing the issue.
    fn hint(&self) -> Option<String> {
        None
    }

    /// Optional details for the "= note:" line.
    fn details(&self) -> Option<String> {
        None
    }

    /// Further locations of the same finding.
    fn related(&self) -> &[SourceContext] {
        &[]
    }
}

impl Report for RepeatedExpressionIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.context)
    }

    fn message(&self) -> String {
        self.candidate.canonical_text.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn hint(&self) -> Option<String> {
        let name = &self.candidate.suggested_name;
        if self.candidate.name_is_safe {
            Some(format!(
                "extract into `const {} = {};`",
                name, self.candidate.canonical_text
            ))
        } else {
            Some(format!(
                "a catch block between the occurrences reads `{}` or an input of the expression; extract with care",
                name
            ))
        }
    }

    fn details(&self) -> Option<String> {
        let body = &self.candidate.body;
        Some(format!(
            "{} evaluated {} times in {} `{}` (lines {}-{})",
            self.candidate.kind,
            self.candidate.count(),
            body.kind,
            body.name,
            self.candidate.min_line,
            self.candidate.max_line
        ))
    }

    fn related(&self) -> &[SourceContext] {
        &self.repeats
    }
}

impl Report for ParseErrorIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
        }
    }

    fn message(&self) -> String {
        self.error.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }
}

// ============================================================
// Ordering for Issue (for sorting in reports)
// ============================================================

impl Issue {
    fn sort_key(&self) -> (&str, usize, usize) {
        match self.location() {
            ReportLocation::Source(ctx) => (ctx.file_path(), ctx.line(), ctx.col()),
            ReportLocation::File { path } => (path, 0, 0),
        }
    }
}

impl Ord for Issue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.rule().cmp(&other.rule()))
            .then_with(|| self.message().cmp(&other.message()))
    }
}

impl PartialOrd for Issue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use crate::core::parsers::parse_snippet;
    use crate::core::{AnalysisConfig, Driver};
    use crate::issues::*;

    fn repeated_issue(code: &str) -> RepeatedExpressionIssue {
        let parsed = parse_snippet(code, "./src/app.js").unwrap();
        let candidate = Driver::new(AnalysisConfig::default())
            .process(&parsed)
            .remove(0);
        RepeatedExpressionIssue::from_candidate(&parsed, candidate).unwrap()
    }

    #[test]
    fn test_repeated_expression_issue() {
        let issue = repeated_issue("function f(user) {\n  show(user.getName(),\n    user.getName());\n}");

        assert_eq!(RepeatedExpressionIssue::severity(), Severity::Warning);
        assert_eq!(RepeatedExpressionIssue::rule(), Rule::RepeatedExpression);
        assert_eq!(issue.context.location, SourceLocation::new("./src/app.js", 2, 8));
        assert_eq!(issue.context.source_line, "  show(user.getName(),");
        assert_eq!(issue.repeats.len(), 1);
        assert_eq!(issue.repeats[0].location.line, 3);
        assert_eq!(issue.repeats[0].source_line, "    user.getName());");
        assert_eq!(issue.message(), "user.getName()");
        assert_eq!(
            issue.hint().as_deref(),
            Some("extract into `const name = user.getName();`")
        );
        assert_eq!(
            issue.details().as_deref(),
            Some("call evaluated 2 times in function `f` (lines 2-3)")
        );
    }

    #[test]
    fn test_unsafe_name_hint() {
        let mut issue = repeated_issue("function f(a) {\n  g(a.b, a.b);\n}");
        issue.candidate.name_is_safe = false;
        assert!(issue.hint().unwrap().contains("catch block"));
    }

    #[test]
    fn test_parse_error_issue() {
        let issue = ParseErrorIssue {
            file_path: "./src/broken.ts".to_string(),
            error: "Unexpected token".to_string(),
        };
        assert_eq!(ParseErrorIssue::severity(), Severity::Error);
        assert_eq!(ParseErrorIssue::rule(), Rule::ParseError);
        assert_eq!(issue.message(), "Unexpected token");
        assert!(matches!(
            issue.location(),
            ReportLocation::File { path: "./src/broken.ts" }
        ));
    }

    #[test]
    fn test_rule_display() {
        assert_eq!(Rule::RepeatedExpression.to_string(), "repeated-expression");
        assert_eq!(Rule::ParseError.to_string(), "parse-error");
    }

    #[test]
    fn test_issue_ordering() {
        let later = Issue::ParseError(ParseErrorIssue {
            file_path: "./b.ts".to_string(),
            error: "x".to_string(),
        });
        let earlier = Issue::ParseError(ParseErrorIssue {
            file_path: "./a.ts".to_string(),
            error: "y".to_string(),
        });
        let mut issues = vec![later.clone(), earlier.clone()];
        issues.sort();
        assert_eq!(issues, vec![earlier, later]);
    }
}
