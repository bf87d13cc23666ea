//! Error adapter for converting JitsError to miette diagnostics.
//!
//! This module provides the bridge between the library's error type and miette's
//! rich diagnostic formatting used in the CLI. Every [`JitsError`] variant gets a
//! stable diagnostic code; the ones a script author can act on also get a hint.
//! Causes, such as the store error behind a persistence failure, are rendered by
//! miette from the error source chain.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use jits::JitsError;

/// Adapter giving a [`JitsError`] a miette representation.
pub struct ErrorAdapter<'a>(pub &'a JitsError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            JitsError::InvalidParent { .. } => "jits::invalid_parent",
            JitsError::InconsistentDepth { .. } => "jits::inconsistent_depth",
            JitsError::DanglingEndpoint { .. } => "jits::dangling_endpoint",
            JitsError::SelectedNodeMissing(_) => "jits::selected_node_missing",
            JitsError::PersistenceFailed { .. } => "jits::persistence_failed",
            JitsError::InvalidMedia(_) => "jits::invalid_media",
            JitsError::Config(_) => "jits::config",
            JitsError::Script(_) => "jits::script",
            JitsError::Io(_) => "jits::io",
            JitsError::Export(_) => "jits::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            JitsError::DanglingEndpoint { .. } => {
                "both ends of a connection must name existing nodes"
            }
            JitsError::SelectedNodeMissing(_) => {
                "select an existing node, or add a variant to start a new tree"
            }
            JitsError::InvalidMedia(_) => {
                "a clip needs a video link or id and an end offset after its start offset"
            }
            JitsError::Script(_) => {
                "actions are add, select, connect, move, reorganize and annotate"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}
