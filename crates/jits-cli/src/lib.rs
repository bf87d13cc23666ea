//! Jits CLI library
//!
//! This module contains the core CLI logic: loading configuration, replaying a
//! session script and exporting the resulting tree.

pub mod error_adapter;
pub mod script;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;

use jits::{
    JitsError,
    export::{Exporter, svg::SvgBuilder},
};

use script::Script;

/// Run the Jits CLI application
///
/// This function replays the session script through a [`jits::GraphController`]
/// and writes the resulting tree as SVG to the output file.
///
/// # Errors
///
/// Returns `JitsError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Script parsing errors
/// - Errors raised by script actions
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), JitsError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing session script"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;
    let script = Script::parse(&source)?;
    info!(actions_count = script.actions().len(); "Script parsed");

    let controller = script.run(app_config.layout())?;

    let exporter = SvgBuilder::new(&args.output)
        .with_style(app_config.style())
        .build()?;
    exporter.export_graph(controller.model(), controller.selected())?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}
