use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result, bail};
use swc_common::SourceMap;

use super::{CommandResult, CommandSummary, ExplainSummary};
use crate::{
    cli::args::ExplainCommand,
    config::load_config,
    core::{Driver, parsers::parse_source},
};

pub fn explain(cmd: ExplainCommand) -> Result<CommandResult> {
    let file_path = cmd.file.to_string_lossy().into_owned();
    let code = fs::read_to_string(&cmd.file)
        .with_context(|| format!("Failed to read file: {}", file_path))?;

    let selection = cmd
        .offset
        .checked_add(cmd.length)
        .and_then(|end| code.get(cmd.offset..end));
    let Some(selection) = selection.map(str::to_string) else {
        bail!(
            "Selection at {} with length {} is outside {} ({} bytes)",
            cmd.offset,
            cmd.length,
            file_path,
            code.len()
        );
    };

    let config_dir = match &cmd.common.source_root {
        Some(root) => root.clone(),
        None => cmd
            .file
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
    };
    let mut config = load_config(&config_dir)?.config;
    if let Some(max_line_span) = cmd.common.max_line_span {
        config.max_line_span = max_line_span;
    }

    let source = parse_source(code, &file_path, Arc::new(SourceMap::default()))?;
    let reasons = Driver::new(config.analysis_config()?)
        .check_selection(&source, cmd.offset, cmd.length)
        .err()
        .unwrap_or_default();

    Ok(CommandResult::without_issues(CommandSummary::Explain(
        ExplainSummary {
            file_path,
            selection,
            reasons,
        },
    )))
}
