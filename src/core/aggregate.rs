//! Grouping of occurrences by exact source text.

use std::cmp::Reverse;
use std::collections::HashMap;

use tracing::debug;

use crate::core::collect::Occurrence;

/// Occurrences sharing one canonical text.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateGroup<'a> {
    pub text: &'a str,
    /// In collection order.
    pub occurrences: Vec<Occurrence<'a>>,
    pub min_line: usize,
    pub max_line: usize,
}

impl<'a> CandidateGroup<'a> {
    fn new(text: &'a str, occurrences: Vec<Occurrence<'a>>) -> Self {
        let min_line = occurrences.iter().map(|o| o.line).min().unwrap_or(0);
        let max_line = occurrences.iter().map(|o| o.line).max().unwrap_or(0);
        Self {
            text,
            occurrences,
            min_line,
            max_line,
        }
    }

    pub fn count(&self) -> usize {
        self.occurrences.len()
    }

    /// Lines between the first and last occurrence.
    pub fn line_span(&self) -> usize {
        self.max_line - self.min_line
    }

    pub fn first(&self) -> Option<&Occurrence<'a>> {
        self.occurrences.first()
    }

    pub fn last(&self) -> Option<&Occurrence<'a>> {
        self.occurrences.last()
    }
}

/// Aggregation result: retained groups and groups dropped for their span.
#[derive(Debug, Default, PartialEq)]
pub struct Aggregation<'a> {
    pub groups: Vec<CandidateGroup<'a>>,
    pub dropped: Vec<CandidateGroup<'a>>,
}

/// Group occurrences by canonical text.
///
/// Singletons are discarded. Groups spreading over more than
/// `max_line_span` lines go to `dropped`. Both lists are ordered by the
/// offset of each group's first occurrence, outer groups first.
pub fn aggregate<'a>(occurrences: Vec<Occurrence<'a>>, max_line_span: usize) -> Aggregation<'a> {
    let mut by_text: HashMap<&'a str, Vec<Occurrence<'a>>> = HashMap::new();
    for occurrence in occurrences {
        by_text.entry(occurrence.text).or_default().push(occurrence);
    }

    let mut groups: Vec<CandidateGroup<'a>> = by_text
        .into_iter()
        .filter(|(_, occurrences)| occurrences.len() > 1)
        .map(|(text, occurrences)| CandidateGroup::new(text, occurrences))
        .collect();
    // Groups starting at the same offset are nested; the outer one goes first.
    groups.sort_by_key(|group| {
        let start = group.first().map_or(usize::MAX, |o| o.offset);
        (start, Reverse(group.text.len()))
    });

    let mut aggregation = Aggregation::default();
    for group in groups {
        if group.line_span() > max_line_span {
            debug!(
                text = group.text,
                min_line = group.min_line,
                max_line = group.max_line,
                max_line_span,
                "dropping group spanning too many lines"
            );
            aggregation.dropped.push(group);
        } else {
            aggregation.groups.push(group);
        }
    }
    aggregation
}
