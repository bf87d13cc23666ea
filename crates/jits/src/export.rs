//! Exporting laid-out technique trees.

pub mod svg;

use jits_core::identifier::Id;

use crate::{error::JitsError, graph::GraphModel};

/// Writes a laid-out graph somewhere.
pub trait Exporter {
    /// Exports `model` with `selected` highlighted.
    ///
    /// # Errors
    ///
    /// Returns [`JitsError`] if the output cannot be produced or written.
    fn export_graph(&self, model: &GraphModel, selected: Option<Id>) -> Result<(), JitsError>;
}
