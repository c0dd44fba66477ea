//! Errors returned by the style loader and the fixture reader.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::validate::ValidationIssue;

/// Result type for loading styles and fixtures.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while loading a style or reading a fixture.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The file does not exist or could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    NotFound {
        /// The path that was requested.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The bytes are not well-formed XML or do not match the CSL element
    /// shapes.
    #[error("malformed style document: {0}")]
    MalformedDocument(#[from] quick_xml::de::DeError),

    /// A fixture line could not be scanned.
    #[error("cannot scan fixture at line {line}: {source}")]
    Scan {
        /// One-based number of the offending line.
        line: usize,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },

    /// Strict mode rejected the document.
    #[error("{} validation issue(s), first: {}", .0.len(), first_issue(.0))]
    Validation(Vec<ValidationIssue>),
}

fn first_issue(issues: &[ValidationIssue]) -> String {
    issues
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}
