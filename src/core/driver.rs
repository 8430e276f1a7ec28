//! Per-body analysis pipeline.
//!
//! collect → filter → aggregate → name → conflict check, once per
//! declaration body. Bodies share nothing but the read-only parsed source
//! and symbol table, so they are analyzed in parallel.

use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, bail};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::core::aggregate::{CandidateGroup, aggregate};
use crate::core::bodies::{BodyId, find_bodies};
use crate::core::classify::ExprKind;
use crate::core::collect::{OccurrenceCollector, SyntaxNode};
use crate::core::conflict::{
    ExceptionRegion, has_naming_conflict, readers_between, target_readers,
};
use crate::core::filter::{CandidateFilter, SkipReason};
use crate::core::naming::suggest_name;
use crate::core::parsers::ParsedSource;
use crate::core::symbols::SymbolTable;

/// Immutable analysis settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    max_line_span: usize,
    kinds: BTreeSet<ExprKind>,
}

impl AnalysisConfig {
    pub const DEFAULT_MAX_LINE_SPAN: usize = 10;

    /// Validates the settings. `ExprKind::Other` is never collectable and is
    /// ignored in `kinds`.
    pub fn new(max_line_span: i64, kinds: impl IntoIterator<Item = ExprKind>) -> Result<Self> {
        if max_line_span < 0 {
            bail!("maxLineSpan must not be negative (got {})", max_line_span);
        }
        let kinds: BTreeSet<ExprKind> = kinds.into_iter().filter(|k| k.is_eligible()).collect();
        if kinds.is_empty() {
            bail!("at least one expression kind must be enabled");
        }
        Ok(Self {
            max_line_span: max_line_span as usize,
            kinds,
        })
    }

    pub fn max_line_span(&self) -> usize {
        self.max_line_span
    }

    pub fn is_enabled(&self, kind: ExprKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ExprKind> + '_ {
        self.kinds.iter().copied()
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_line_span: Self::DEFAULT_MAX_LINE_SPAN,
            kinds: ExprKind::ELIGIBLE.into_iter().collect(),
        }
    }
}

/// Location of one occurrence of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OccurrenceSite {
    pub offset: usize,
    pub length: usize,
    pub line: usize,
    pub column: usize,
}

/// A repeated expression that can be hoisted into one local variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionCandidate {
    pub body: BodyId,
    pub canonical_text: String,
    pub kind: ExprKind,
    pub occurrences: Vec<OccurrenceSite>,
    pub min_line: usize,
    pub max_line: usize,
    pub suggested_name: String,
    /// False when an intervening `catch` block reads the suggested name or
    /// an identifier the expression reads.
    pub name_is_safe: bool,
}

impl ExtractionCandidate {
    pub fn count(&self) -> usize {
        self.occurrences.len()
    }
}

pub struct Driver {
    config: AnalysisConfig,
}

impl Driver {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Candidates of every body of a file, in body order.
    pub fn process(&self, source: &ParsedSource) -> Vec<ExtractionCandidate> {
        let symbols = SymbolTable::build(source);
        let bodies = find_bodies(source);
        let per_body: Vec<Vec<ExtractionCandidate>> = bodies
            .par_iter()
            .map(|body| self.process_body(source, &symbols, body))
            .collect();
        per_body.into_iter().flatten().collect()
    }

    /// Like [`Driver::process`], but stops before the next body once
    /// `cancel` is set and returns what completed bodies produced.
    pub fn process_until(
        &self,
        source: &ParsedSource,
        cancel: &AtomicBool,
    ) -> Vec<ExtractionCandidate> {
        let symbols = SymbolTable::build(source);
        let mut candidates = Vec::new();
        for body in find_bodies(source) {
            if cancel.load(Ordering::Relaxed) {
                debug!(file = %source.file_path, body = %body.name, "analysis cancelled");
                break;
            }
            candidates.extend(self.process_body(source, &symbols, &body));
        }
        candidates
    }

    pub fn process_body(
        &self,
        source: &ParsedSource,
        symbols: &SymbolTable,
        body: &BodyId,
    ) -> Vec<ExtractionCandidate> {
        if source.source_range(body.span).is_none() {
            warn!(
                file = %source.file_path,
                body = %body.name,
                "body does not map onto the source text, skipping"
            );
            return Vec::new();
        }

        let scan = OccurrenceCollector::new(source, &self.config).collect(body);
        let filter = CandidateFilter::new(symbols);
        let extractable: Vec<_> = scan
            .occurrences
            .into_iter()
            .filter(|occurrence| filter.is_extractable(occurrence))
            .collect();

        aggregate(extractable, self.config.max_line_span)
            .groups
            .iter()
            .filter_map(|group| candidate(body, group, &scan.regions, &scan.declared_names))
            .collect()
    }

    /// Check a selection against every rule.
    ///
    /// The selection must match one node exactly; the innermost body
    /// containing it provides the context.
    pub fn check_selection(
        &self,
        source: &ParsedSource,
        offset: usize,
        length: usize,
    ) -> Result<(), Vec<SkipReason>> {
        let Some(end) = offset.checked_add(length) else {
            return Err(vec![SkipReason::NoNodeSelected]);
        };
        let body = find_bodies(source)
            .into_iter()
            .filter_map(|body| {
                let (start, body_length) = source.source_range(body.span)?;
                (start <= offset && end <= start + body_length).then_some((body_length, body))
            })
            .min_by_key(|(body_length, _)| *body_length)
            .map(|(_, body)| body);
        let Some(body) = body else {
            return Err(vec![SkipReason::NoEnclosingBody]);
        };

        let collector = OccurrenceCollector::new(source, &self.config);
        let Some(selected) = collector.select(&body, offset, length) else {
            return Err(vec![SkipReason::NoNodeSelected]);
        };
        let symbols = SymbolTable::build(source);
        let reasons = CandidateFilter::new(&symbols).rejections(&selected);
        if reasons.is_empty() {
            Ok(())
        } else {
            Err(reasons)
        }
    }
}

fn candidate(
    body: &BodyId,
    group: &CandidateGroup<'_>,
    regions: &[ExceptionRegion],
    declared: &HashSet<String>,
) -> Option<ExtractionCandidate> {
    let first = group.first()?;
    let last = group.last()?;
    let facts = match &first.node {
        SyntaxNode::Expression(facts) => Some(facts),
        _ => None,
    };

    let suggested_name = suggest_name(facts.and_then(|f| f.name_hint.as_deref()), declared);
    let reads = facts.map(|f| f.reads.as_slice()).unwrap_or_default();
    let target = target_readers(&suggested_name, reads);
    let middle = readers_between(regions, first.offset + first.length, last.offset);
    let name_is_safe = !has_naming_conflict(&target, &middle);

    Some(ExtractionCandidate {
        body: body.clone(),
        canonical_text: group.text.to_string(),
        kind: first.kind,
        occurrences: group
            .occurrences
            .iter()
            .map(|o| OccurrenceSite {
                offset: o.offset,
                length: o.length,
                line: o.line,
                column: o.column,
            })
            .collect(),
        min_line: group.min_line,
        max_line: group.max_line,
        suggested_name,
        name_is_safe,
    })
}
