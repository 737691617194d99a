//! Local-reference extraction: which files must exist next to the
//! document before pandoc can resolve it?
//!
//! Image embeds and plain links are unioned into one set — downstream
//! only existence-checks the paths, it never cares which syntax named
//! them. Remote and opaque targets are discarded; the conservative
//! classifier (see [`super::classify`]) ensures anything ambiguous lands
//! here rather than being silently dropped.

use super::classify::{classify, RefClass};
use super::scan::scan;
use std::collections::BTreeSet;

/// Extract the set of local file paths the document references.
///
/// Deduplicated, case-sensitive exact strings, in no significant order.
/// Pure function of the text: scanning twice yields the same set.
pub fn extract_local_references(text: &str) -> BTreeSet<String> {
    scan(text)
        .into_iter()
        .filter(|r| !r.target.is_empty())
        // Targets with embedded whitespace or quotes (e.g. a quoted title
        // inside the parentheses) are outside the supported grammar.
        .filter(|r| !r.target.contains(char::is_whitespace) && !r.target.contains('"'))
        .filter(|r| classify(r.target) == RefClass::Local)
        .map(|r| r.target.to_string())
        .collect()
}
