//! Errors from the editor's collaborators.

use std::path::PathBuf;

use miette::Diagnostic;

/// Loading or saving the document failed.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum StoreError {
    #[error("could not read document from {}", path.display())]
    #[diagnostic(code(nebula::store::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write document to {}", path.display())]
    #[diagnostic(
        code(nebula::store::write),
        help("check that the directory is writable")
    )]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An AI rewrite request did not produce text.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum RewriteError {
    #[error("no AI rewriter is configured")]
    #[diagnostic(code(nebula::rewrite::unavailable))]
    Unavailable,

    #[error("a rewrite is already in progress")]
    #[diagnostic(code(nebula::rewrite::busy))]
    Busy,

    #[error("rewrite service failed: {0}")]
    #[diagnostic(code(nebula::rewrite::service))]
    Service(String),
}

/// Exporting the document failed.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum ExportError {
    #[error("{0} export is not supported by this exporter")]
    #[diagnostic(code(nebula::export::unsupported))]
    Unsupported(&'static str),

    #[error("could not write export to {}", path.display())]
    #[diagnostic(code(nebula::export::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
