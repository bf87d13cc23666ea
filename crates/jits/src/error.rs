//! Error types for Jits operations.
//!
//! This module provides the main error type [`JitsError`]. Every controller
//! operation reports failures through it; none of them are fatal to the process.

use std::io;

use thiserror::Error;

use jits_core::{identifier::Id, media::MediaError};

use crate::store::StoreError;

/// The main error type for Jits operations.
///
/// # Persistence failures
///
/// [`JitsError::PersistenceFailed`] is reported *after* the in-memory mutation has
/// been applied. The local graph is not rolled back; the next snapshot from the
/// store reconciles it.
#[derive(Debug, Error)]
pub enum JitsError {
    #[error("node {node} references parent {parent}, which is not in the graph")]
    InvalidParent { node: Id, parent: Id },

    #[error("node {node} has depth {depth}, expected {expected}")]
    InconsistentDepth {
        node: Id,
        depth: usize,
        expected: usize,
    },

    #[error("edge {source_id} -> {target} references a node that is not in the graph")]
    DanglingEndpoint { source_id: Id, target: Id },

    #[error("selected node {0} no longer exists")]
    SelectedNodeMissing(Id),

    #[error("failed to persist {id}: {source}")]
    PersistenceFailed {
        id: Id,
        #[source]
        source: StoreError,
    },

    #[error("Invalid clip: {0}")]
    InvalidMedia(#[from] MediaError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Export error: {0}")]
    Export(String),
}
