//! A TL schema compiler: reads one or more `.tl` schema files plus a scheme
//! configuration, and emits generated Rust source modeling every
//! constructor, abstract type and RPC method they declare.

pub mod cli;
pub mod compile;
pub mod config;
pub mod emit;
pub mod error;
pub mod output;
pub mod reader;
pub mod tl;

use std::path::{Path, PathBuf};

use log::info;

pub use compile::Warnings;
pub use error::{GenError, Result};

pub struct GenerateOptions {
    pub strict_crc: bool,
}

#[derive(Debug)]
pub struct GenerateReport {
    pub warnings: Warnings,
    pub layer: i32,
    pub written: Vec<PathBuf>,
}

/// Runs the full pipeline: read, parse, validate, emit, write. This is the
/// single entry point both the `tlc` binary and integration tests drive.
pub fn generate(
    inputs: &[PathBuf],
    output_stem: &Path,
    scheme: &config::Scheme,
    options: &GenerateOptions,
) -> Result<GenerateReport> {
    let outcome = compile::compile(
        inputs,
        scheme,
        &compile::Options {
            strict_crc: options.strict_crc,
        },
    )?;

    let mut warnings = outcome.warnings;
    let mut written = Vec::new();

    if scheme.read_write_section() {
        let banner = banner(&outcome.input_names, outcome.layer);
        let model_text = format!("{banner}{}", emit::model::render(&outcome.registry, scheme));
        let methods_text = emit::methods::render(&outcome.registry, scheme);
        let combined = format!("{model_text}\n{methods_text}");
        let path = output::output_path(output_stem, ".rs");
        if output::write_if_changed(&path, &combined)? {
            written.push(path);
        }
    }

    if scheme.write_dump() {
        let dump = emit::dump::render(&outcome.registry);
        warnings.dropped_dump_fields += dump.dropped_fields;
        let path = output::output_path(output_stem, "-dump-to-text.rs");
        if output::write_if_changed(&path, &dump.text)? {
            written.push(path);
        }
    }

    if scheme.write_conversion() {
        let adapter_text = emit::adapter::render(&outcome.registry, scheme)?;
        let path = output::output_path(output_stem, "-conversion.rs");
        if output::write_if_changed(&path, &adapter_text)? {
            written.push(path);
        }
    }

    output::touch_timestamp(output_stem)?;

    info!(
        "generated {} file(s) from {} input(s), layer {}, {} warning(s)",
        written.len(),
        outcome.input_names.len(),
        outcome.layer,
        warnings.total(),
    );

    Ok(GenerateReport {
        warnings,
        layer: outcome.layer,
        written,
    })
}

fn banner(input_names: &[String], layer: i32) -> String {
    format!(
        "// Created from {} // LAYER {}\n\n",
        input_names
            .iter()
            .map(|n| format!("'{n}'"))
            .collect::<Vec<_>>()
            .join(", "),
        layer,
    )
}
