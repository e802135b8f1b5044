//! Serialized document bodies.
//!
//! A record's canonical content is a self-describing serialized tree, opened
//! and closed by a root element. Result rows are recognized as documents
//! purely by their first character matching [`ROOT_MARKER`]; everything else
//! is a scalar.

use std::fmt;

use serde::{Deserialize, Serialize};

/// First character identifying a serialized document.
pub const ROOT_MARKER: char = '<';

/// Errors raised when a stored body fails the well-formedness check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// The body does not begin with [`ROOT_MARKER`].
    #[error("document does not start with the root marker")]
    MissingRootMarker,
    /// The root element has no name.
    #[error("document root element has no name")]
    UnnamedRoot,
    /// The root element is never closed.
    #[error("document root element <{root}> is not closed")]
    UnclosedRoot {
        /// Name of the dangling root element.
        root: String,
    },
}

/// A serialized document body.
///
/// Construction via [`Document::new`] is unchecked - the store accepts what
/// the caller hands it (one malformed field must not drop a whole batch).
/// [`Document::parse`] is the checked form used when reading bodies back
/// from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(String);

impl Document {
    /// Wrap a raw body without validating it.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Validate and wrap a body read back from the backend.
    ///
    /// The check is minimal: the body must open with the root marker, the
    /// root element must be named, and it must be closed (self-closing, or
    /// by a matching end tag at the end of the body).
    pub fn parse(raw: impl Into<String>) -> Result<Self, DocumentError> {
        let raw = raw.into();
        if !raw.starts_with(ROOT_MARKER) {
            return Err(DocumentError::MissingRootMarker);
        }
        let root: String = raw[1..]
            .chars()
            .take_while(|c| !c.is_whitespace() && *c != '>' && *c != '/')
            .collect();
        if root.is_empty() {
            return Err(DocumentError::UnnamedRoot);
        }
        let body = raw.trim_end();
        let self_closing = body.ends_with("/>") && body.matches(ROOT_MARKER).count() == 1;
        if !self_closing && !body.ends_with(&format!("</{}>", root)) {
            return Err(DocumentError::UnclosedRoot { root });
        }
        Ok(Self(raw))
    }

    /// Whether a result-row value is a document rather than a scalar.
    pub fn is_document(value: &str) -> bool {
        value.starts_with(ROOT_MARKER)
    }

    /// The raw serialized body.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the raw serialized body.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_self_closing_root() {
        assert!(Document::parse("<root/>").is_ok());
    }

    #[test]
    fn parse_accepts_closed_root_with_children() {
        assert!(Document::parse("<data><item/>text</data>").is_ok());
    }

    #[test]
    fn parse_accepts_trailing_whitespace() {
        assert!(Document::parse("<data>x</data>\n").is_ok());
    }

    #[test]
    fn parse_rejects_scalar() {
        assert_eq!(
            Document::parse("plain text"),
            Err(DocumentError::MissingRootMarker)
        );
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(Document::parse(""), Err(DocumentError::MissingRootMarker));
    }

    #[test]
    fn parse_rejects_unnamed_root() {
        assert_eq!(Document::parse("<>x</>"), Err(DocumentError::UnnamedRoot));
    }

    #[test]
    fn parse_rejects_dangling_root() {
        assert_eq!(
            Document::parse("<data>x"),
            Err(DocumentError::UnclosedRoot {
                root: "data".into()
            })
        );
    }

    #[test]
    fn parse_rejects_mismatched_end_tag() {
        assert!(Document::parse("<data>x</other>").is_err());
    }

    #[test]
    fn is_document_checks_first_character_only() {
        assert!(Document::is_document("<root/>"));
        assert!(!Document::is_document("root"));
        assert!(!Document::is_document(""));
    }

    #[test]
    fn serializes_as_plain_string() {
        let doc = Document::new("<root/>");
        assert_eq!(serde_json::to_string(&doc).unwrap(), "\"<root/>\"");
    }
}
