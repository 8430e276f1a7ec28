use anyhow::Result;

use super::{CommandResult, CommandSummary};
use crate::{
    cli::args::CheckCommand,
    core::context::CheckContext,
    issues::{Issue, RepeatedExpressionIssue},
};

pub fn check(cmd: CheckCommand) -> Result<CommandResult> {
    let ctx = CheckContext::new(&cmd.common)?;

    let mut issues: Vec<Issue> = Vec::new();
    for (file_path, candidates) in ctx.candidates() {
        let Some(source) = ctx.source(file_path) else {
            continue;
        };
        issues.extend(
            candidates
                .iter()
                .cloned()
                .filter_map(|candidate| RepeatedExpressionIssue::from_candidate(source, candidate))
                .map(Issue::RepeatedExpression),
        );
    }
    issues.extend(ctx.parse_errors().iter().cloned().map(Issue::ParseError));

    Ok(CommandResult::from_issues(
        CommandSummary::Check { format: cmd.format },
        issues,
        ctx.files.len(),
    ))
}
