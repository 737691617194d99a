//! Markup reference scanner: finds `![label](target)` image embeds and
//! `[label](target)` links in lightweight-markup text.
//!
//! ## Why a hand-written scanner?
//!
//! The extraction grammar is tiny, but two of its rules are load-bearing
//! and must hold exactly:
//!
//! * the target ends at the **first** `)` — greedy matching mis-parses
//!   documents that contain legitimate parenthesised link targets later on
//!   the same line;
//! * nested brackets in labels are unsupported — the label ends at the
//!   first `]`.
//!
//! Encoding those rules in a dedicated scanner makes them explicit and
//! testable instead of artifacts of a pattern engine's matching strategy.
//! An optional trailing `{...}` attribute block is consumed (so callers
//! can splice replacements over the whole syntactic form) but is never
//! part of the target.

use std::ops::Range;

/// Whether a reference is an image embed or a plain link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Image,
    Link,
}

/// One scanned reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupRef<'a> {
    pub kind: RefKind,
    /// Label (alt text) between the brackets, unmodified.
    pub label: &'a str,
    /// Target between the parentheses, whitespace-trimmed, attribute
    /// block excluded.
    pub target: &'a str,
    /// Byte range of the full syntactic form in the input, including the
    /// leading `!` and any trailing `{...}` attribute block.
    pub span: Range<usize>,
}

/// Scan `text` for image and link references, in document order.
pub fn scan(text: &str) -> Vec<MarkupRef<'_>> {
    let bytes = text.as_bytes();
    let mut refs = Vec::new();
    let mut i = 0;

    while let Some(off) = text[i..].find('[') {
        let bracket = i + off;
        let is_image = bracket > 0 && bytes[bracket - 1] == b'!';
        let start = if is_image { bracket - 1 } else { bracket };

        // Label ends at the first ']'; nested brackets are unsupported.
        let Some(label_len) = text[bracket + 1..].find(']') else {
            break;
        };
        let label_end = bracket + 1 + label_len;

        // The grammar requires '(' immediately after ']'.
        if bytes.get(label_end + 1) != Some(&b'(') {
            i = label_end + 1;
            continue;
        }

        // Target ends at the FIRST ')'.
        let Some(target_len) = text[label_end + 2..].find(')') else {
            i = label_end + 1;
            continue;
        };
        let target_end = label_end + 2 + target_len;
        let mut end = target_end + 1;

        // Optional attribute block: `{...}` directly after the ')'.
        if bytes.get(end) == Some(&b'{') {
            if let Some(attr_len) = text[end + 1..].find('}') {
                end = end + 1 + attr_len + 1;
            }
        }

        refs.push(MarkupRef {
            kind: if is_image { RefKind::Image } else { RefKind::Link },
            label: &text[bracket + 1..label_end],
            target: text[label_end + 2..target_end].trim(),
            span: start..end,
        });

        i = target_end + 1;
    }

    refs
}
