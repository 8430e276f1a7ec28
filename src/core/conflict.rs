//! Naming conflicts with intervening exception handlers.
//!
//! Hoisting `a.b()` into `const name = a.b()` moves its evaluation before
//! every later occurrence. A `catch` clause sitting between two occurrences
//! that reads `name` (or anything the expression reads) would observe the
//! new binding instead of the value it saw before, so such an extraction is
//! flagged as unsafe.

use std::collections::HashSet;

/// A `catch` clause of a body and the identifiers its block reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionRegion {
    pub offset: usize,
    pub readers: HashSet<String>,
}

/// Whether any middle reader set shares a name with the target set.
///
/// Empty input on either side means there is nothing to conflict with.
pub fn has_naming_conflict(target: &HashSet<String>, middle: &[HashSet<String>]) -> bool {
    if target.is_empty() || middle.is_empty() {
        return false;
    }
    middle
        .iter()
        .any(|readers| !readers.is_disjoint(target))
}

/// Reader sets of the regions lying strictly between the end of the first
/// occurrence and the start of the last one.
pub fn readers_between(
    regions: &[ExceptionRegion],
    first_end: usize,
    last_start: usize,
) -> Vec<HashSet<String>> {
    regions
        .iter()
        .filter(|region| region.offset >= first_end && region.offset < last_start)
        .map(|region| region.readers.clone())
        .collect()
}

/// The suggested name plus every identifier the candidate reads.
pub fn target_readers(name: &str, reads: &[String]) -> HashSet<String> {
    std::iter::once(name.to_string())
        .chain(reads.iter().cloned())
        .collect()
}
