//! Reference classification: is a link target a remote URL, a local path,
//! or neither?
//!
//! ## Why conservative classification?
//!
//! Misclassifying a local path as remote silently drops the reference —
//! pandoc later fails to resolve it and the user has no idea why. The
//! reverse mistake merely prompts the user for a file they can decline to
//! supply. So every ambiguous case defaults to [`RefClass::Local`]: a
//! missing scheme, an unknown scheme, an empty host, a parse failure, or a
//! loopback host all classify Local. Only a well-formed URL with an
//! allow-listed scheme and a real remote host is [`RefClass::Remote`].
//!
//! A third bucket, [`RefClass::Opaque`], holds forms that reference
//! neither a fetchable resource nor an uploadable file: `data:` URIs,
//! scheme-relative `//host/...` references, and in-document `#fragment`
//! anchors. These must never show up in a "please upload this file"
//! prompt.

use reqwest::Url;

/// Schemes that may name a fetchable remote resource.
const REMOTE_SCHEMES: &[&str] = &["http", "https", "ftp", "sftp"];

/// Host aliases that resolve to the local machine.
const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1", "0.0.0.0", "::1"];

/// Classification of a single reference target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefClass {
    /// A fetchable remote resource.
    Remote { scheme: String, host: String },
    /// A path expected to resolve next to the document.
    Local,
    /// Neither remote nor an uploadable local file (data URI,
    /// scheme-relative reference, fragment anchor).
    Opaque,
}

/// Classify a reference target. Total: every input maps to exactly one
/// variant and nothing panics.
pub fn classify(reference: &str) -> RefClass {
    let r = reference.trim();

    // Forms that are neither fetchable nor uploadable.
    if r.starts_with("data:") || r.starts_with("//") || r.starts_with('#') {
        return RefClass::Opaque;
    }

    let url = match Url::parse(r) {
        Ok(u) => u,
        // Relative or otherwise unparseable: a path next to the document.
        Err(_) => return RefClass::Local,
    };

    let scheme = url.scheme();
    if !REMOTE_SCHEMES.contains(&scheme) {
        return RefClass::Local;
    }

    let host = match url.host_str() {
        Some(h) if !h.is_empty() => h,
        _ => return RefClass::Local,
    };

    // Strip IPv6 brackets so "[::1]" matches the loopback list.
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if LOOPBACK_HOSTS.contains(&bare.to_ascii_lowercase().as_str()) {
        return RefClass::Local;
    }
    if bare.starts_with('.') {
        return RefClass::Local;
    }

    RefClass::Remote {
        scheme: scheme.to_string(),
        host: host.to_string(),
    }
}

/// Shorthand used by the extractor and materializer.
pub fn is_remote(reference: &str) -> bool {
    matches!(classify(reference), RefClass::Remote { .. })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_urls_are_remote() {
        assert_eq!(
            classify("https://example.com/logo.png"),
            RefClass::Remote {
                scheme: "https".into(),
                host: "example.com".into()
            }
        );
        assert!(is_remote("http://example.com/a/b.jpg?size=2"));
        assert!(is_remote("ftp://files.example.org/doc.md"));
        assert!(is_remote("sftp://files.example.org/doc.md"));
    }

    #[test]
    fn relative_paths_are_local() {
        assert_eq!(classify("./img/fig1.png"), RefClass::Local);
        assert_eq!(classify("pic.jpg"), RefClass::Local);
        assert_eq!(classify("../shared/notes.md"), RefClass::Local);
        assert_eq!(classify("img/sub dir/x.png"), RefClass::Local);
    }

    #[test]
    fn schemeless_host_like_strings_are_local() {
        // "localhost:8080/x.png" parses with scheme "localhost" — not in the
        // allow-list, so it is a local dependency, not a fetch target.
        assert_eq!(classify("localhost:8080/x.png"), RefClass::Local);
        assert_eq!(classify("www.example.com/x.png"), RefClass::Local);
    }

    #[test]
    fn disallowed_schemes_are_local() {
        assert_eq!(classify("mailto:someone@example.com"), RefClass::Local);
        assert_eq!(classify("file:///etc/hosts"), RefClass::Local);
        assert_eq!(classify("ssh://example.com/repo"), RefClass::Local);
    }

    #[test]
    fn loopback_hosts_are_local() {
        assert_eq!(classify("http://localhost/x.png"), RefClass::Local);
        assert_eq!(classify("http://LOCALHOST:3000/x.png"), RefClass::Local);
        assert_eq!(classify("https://127.0.0.1/x.png"), RefClass::Local);
        assert_eq!(classify("http://0.0.0.0:8080/x.png"), RefClass::Local);
        assert_eq!(classify("http://[::1]/x.png"), RefClass::Local);
    }

    #[test]
    fn opaque_forms() {
        assert_eq!(
            classify("data:image/png;base64,iVBORw0KGgo="),
            RefClass::Opaque
        );
        assert_eq!(classify("//cdn.example.com/x.png"), RefClass::Opaque);
        assert_eq!(classify("#section-2"), RefClass::Opaque);
    }

    #[test]
    fn totality_on_junk() {
        // Never panics, always exactly one bucket.
        for s in ["", " ", ":", "http://", "https://", "!!@@##", "\u{0}", "a b c"] {
            let _ = classify(s);
        }
        assert_eq!(classify(""), RefClass::Local);
        assert_eq!(classify("http://"), RefClass::Local);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert!(is_remote("  https://example.com/x.png  "));
        assert_eq!(classify("  pic.jpg "), RefClass::Local);
    }
}
