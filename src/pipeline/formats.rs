//! Format capability table: which media types pandoc can read, and which
//! output formats each one may be converted to.
//!
//! ## Why a static table?
//!
//! The set of supported conversions is pure configuration data. Keeping it
//! in one constant map means adding a media type never touches the
//! extractor or materializer code, and the legal-output menu shown to a
//! chooser is guaranteed to match what the engine is actually invoked
//! with. The table is built once behind a [`Lazy`] and never mutated, so
//! there is no cross-request state to worry about.
//!
//! Output format order is significant: it is the order presented to the
//! chooser, so entries are stored as ordered slices, not sets.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Capability record for one input media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatEntry {
    /// The format name pandoc expects as its `-f` argument.
    pub canonical_name: &'static str,
    /// File extension conventionally associated with this media type.
    pub extension: &'static str,
    /// Legal output formats, in presentation order, deduplicated.
    pub output_formats: &'static [&'static str],
}

// Markdown and plain text share one entry: files detected as text/plain
// are treated as markdown, matching how the converter has always behaved.
const MARKDOWN: FormatEntry = FormatEntry {
    canonical_name: "markdown",
    extension: ".md",
    output_formats: &[
        "html", "pdf", "docx", "odt", "pptx", "epub", "latex", "rst", "org", "textile",
        "mediawiki", "dokuwiki",
    ],
};

static TABLE: Lazy<HashMap<&'static str, FormatEntry>> = Lazy::new(|| {
    HashMap::from([
        // Lightweight markup formats
        ("text/markdown", MARKDOWN),
        ("text/plain", MARKDOWN),
        (
            "text/x-rst",
            FormatEntry {
                canonical_name: "rst",
                extension: ".rst",
                output_formats: &[
                    "md", "html", "pdf", "docx", "odt", "pptx", "epub", "latex",
                ],
            },
        ),
        (
            "text/org",
            FormatEntry {
                canonical_name: "org",
                extension: ".org",
                output_formats: &[
                    "md", "html", "pdf", "docx", "odt", "pptx", "epub", "latex",
                ],
            },
        ),
        // HTML
        (
            "text/html",
            FormatEntry {
                canonical_name: "html",
                extension: ".html",
                output_formats: &[
                    "md", "pdf", "docx", "odt", "pptx", "epub", "latex", "rst", "org", "textile",
                ],
            },
        ),
        // Word processor formats
        (
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            FormatEntry {
                canonical_name: "docx",
                extension: ".docx",
                output_formats: &[
                    "md", "html", "pdf", "odt", "pptx", "epub", "latex", "rst",
                ],
            },
        ),
        (
            "application/vnd.oasis.opendocument.text",
            FormatEntry {
                canonical_name: "odt",
                extension: ".odt",
                output_formats: &[
                    "md", "html", "pdf", "docx", "pptx", "epub", "latex", "rst",
                ],
            },
        ),
        (
            "text/rtf",
            FormatEntry {
                canonical_name: "rtf",
                extension: ".rtf",
                output_formats: &[
                    "md", "html", "pdf", "docx", "odt", "pptx", "epub", "latex",
                ],
            },
        ),
        // Ebooks
        (
            "application/epub+zip",
            FormatEntry {
                canonical_name: "epub",
                extension: ".epub",
                output_formats: &["md", "html", "pdf", "docx", "odt", "latex"],
            },
        ),
        // Interactive notebooks
        (
            "application/x-ipynb+json",
            FormatEntry {
                canonical_name: "ipynb",
                extension: ".ipynb",
                output_formats: &["md", "html", "pdf", "docx", "odt", "latex"],
            },
        ),
        // Wiki formats
        (
            "text/x-wiki",
            FormatEntry {
                canonical_name: "mediawiki",
                extension: ".wiki",
                output_formats: &["md", "html", "pdf", "docx", "odt", "latex"],
            },
        ),
        // LaTeX
        (
            "text/x-tex",
            FormatEntry {
                canonical_name: "latex",
                extension: ".tex",
                output_formats: &["md", "html", "pdf", "docx", "odt", "pptx", "epub"],
            },
        ),
    ])
});

/// Category groupings used when listing supported formats to a user.
static CATEGORIES: &[(&str, &[&str])] = &[
    ("Markup Formats", &["text/markdown", "text/plain", "text/x-rst", "text/org"]),
    (
        "Document Formats",
        &[
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "application/vnd.oasis.opendocument.text",
            "text/rtf",
        ],
    ),
    ("Web Formats", &["text/html"]),
    ("eBook Formats", &["application/epub+zip"]),
    ("Notebook Formats", &["application/x-ipynb+json"]),
    ("Wiki Formats", &["text/x-wiki"]),
    ("LaTeX", &["text/x-tex"]),
];

/// Look up the capability entry for a media type.
///
/// Returns `None` for unknown media types — never a default entry.
pub fn lookup(media_type: &str) -> Option<&'static FormatEntry> {
    TABLE.get(media_type)
}

/// Whether the media type has a capability entry at all.
pub fn is_supported(media_type: &str) -> bool {
    TABLE.contains_key(media_type)
}

/// Legal output formats for a media type, in presentation order.
///
/// Empty when the media type is unsupported.
pub fn output_formats(media_type: &str) -> &'static [&'static str] {
    lookup(media_type).map(|e| e.output_formats).unwrap_or(&[])
}

/// The pandoc `-f` format name for a media type.
pub fn canonical_format_name(media_type: &str) -> Option<&'static str> {
    lookup(media_type).map(|e| e.canonical_name)
}

/// Category groupings of supported media types, for user-facing listings.
pub fn categories() -> &'static [(&'static str, &'static [&'static str])] {
    CATEGORIES
}

/// Media types whose content is textual markup that should be scanned for
/// file references before conversion.
pub fn is_textual(media_type: &str) -> bool {
    matches!(
        media_type,
        "text/markdown" | "text/plain" | "text/x-rst" | "text/org" | "text/html"
            | "text/x-wiki" | "text/x-tex"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_type_resolves() {
        let entry = lookup("text/html").unwrap();
        assert_eq!(entry.canonical_name, "html");
        assert_eq!(entry.extension, ".html");
    }

    #[test]
    fn unknown_type_is_none_not_default() {
        assert!(lookup("application/pdf").is_none());
        assert!(lookup("").is_none());
        assert!(!is_supported("image/png"));
        assert!(output_formats("application/pdf").is_empty());
        assert!(canonical_format_name("application/pdf").is_none());
    }

    #[test]
    fn plain_text_aliases_markdown() {
        assert_eq!(lookup("text/plain"), lookup("text/markdown"));
        assert_eq!(canonical_format_name("text/plain"), Some("markdown"));
    }

    #[test]
    fn every_entry_has_outputs_excluding_itself() {
        for (mt, entry) in TABLE.iter() {
            assert!(
                !entry.output_formats.is_empty(),
                "{mt} has no output formats"
            );
            assert!(
                !entry.output_formats.contains(&entry.canonical_name),
                "{mt} offers conversion to itself"
            );
        }
    }

    #[test]
    fn output_order_is_stable() {
        // Order is what the chooser sees; pin the markdown menu exactly.
        assert_eq!(
            output_formats("text/markdown"),
            &[
                "html", "pdf", "docx", "odt", "pptx", "epub", "latex", "rst", "org", "textile",
                "mediawiki", "dokuwiki",
            ]
        );
    }

    #[test]
    fn output_formats_are_deduplicated() {
        for (mt, entry) in TABLE.iter() {
            let mut seen = std::collections::HashSet::new();
            for f in entry.output_formats {
                assert!(seen.insert(f), "{mt} lists '{f}' twice");
            }
        }
    }

    #[test]
    fn categories_cover_only_supported_types() {
        for (_, types) in categories() {
            for mt in *types {
                assert!(is_supported(mt), "category lists unsupported type {mt}");
            }
        }
    }

    #[test]
    fn textual_types_are_supported() {
        assert!(is_textual("text/markdown"));
        assert!(is_textual("text/plain"));
        assert!(!is_textual("application/epub+zip"));
        assert!(!is_textual("application/pdf"));
    }
}
