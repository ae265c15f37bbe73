//! Error taxonomy.
//!
//! CRC mismatches and dropped dump-serializer fields are deliberately *not*
//! represented here: they are warn-and-continue, tracked by the warning
//! counters in [`crate::compile::Warnings`] instead of surfaced as an error.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("no input files given")]
    NoInputs,

    #[error("no output path given")]
    NoOutput,

    #[error("bad declaration line: {line:?}")]
    Grammar { line: String },

    #[error("{message} (in line: {line:?})")]
    Semantic { message: String, line: String },

    #[error("unresolved type {name:?} referenced in line: {line:?}")]
    UnresolvedType { name: String, line: String },

    #[error("duplicate type id 0x{id:x} used by both {first:?} and {second:?}")]
    DuplicateId {
        id: u32,
        first: String,
        second: String,
    },

    #[error("flag {flag:?} has bit {child_bit} in {child:?} but bit {parent_bit} in parent {parent:?}")]
    FlagInheritanceMismatch {
        flag: String,
        child: String,
        parent: String,
        child_bit: u8,
        parent_bit: u8,
    },

    #[error("failed to read {path:?}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid scheme configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GenError>;
