//! Source reader (C2): concatenates inputs, extracts the `LAYER N`
//! directive, separates `---types---`/`---functions---` sections, and
//! accumulates per-declaration doc-comments.
//!
//! Grounded in `generate_tl.py`'s `readInputs` plus the comment-accumulation
//! logic at the top of its main loop. The original interleaves comment
//! bookkeeping with declaration parsing; here it's assigned entirely to the
//! reader, but the behavior reproduced — accumulate on a comment-only
//! line, reset on a genuinely blank line, drop a non-blank line's own
//! trailing comment — matches the original exactly.

use std::path::{Path, PathBuf};

use crate::error::GenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Types,
    Functions,
}

/// A schema line ready for grammar parsing, paired with whatever doc-comment
/// text had accumulated above it.
#[derive(Debug, Clone)]
pub struct PendingLine {
    pub section: Section,
    pub code: String,
    pub comment: String,
    pub source: String,
}

pub struct ReadResult {
    pub pending: Vec<PendingLine>,
    pub layer: i32,
    pub names: Vec<String>,
}

fn layer_directive(line: &str) -> Option<i32> {
    let rest = line.trim_start().strip_prefix("// LAYER ")?;
    rest.trim().parse::<i32>().ok()
}

/// Splits a line at its first `//`, returning (code, Some(comment)) if a
/// `//` was present, or (line, None) otherwise.
fn split_comment(line: &str) -> (&str, Option<&str>) {
    match line.find("//") {
        Some(idx) => (&line[..idx], Some(&line[idx + 2..])),
        None => (line, None),
    }
}

pub fn read_inputs(paths: &[PathBuf]) -> Result<ReadResult, GenError> {
    let mut pending = Vec::new();
    let mut names = Vec::new();
    let mut layer = 0;
    let mut accumulated = String::new();
    let mut section = Section::Types;

    for path in paths {
        names.push(basename(path));
        section = Section::Types;

        let text = std::fs::read_to_string(path).map_err(|source| GenError::ReadFile {
            path: path.clone(),
            source,
        })?;

        for raw_line in text.lines() {
            if let Some(n) = layer_directive(raw_line) {
                layer = n;
                continue;
            }

            let (code, comment) = split_comment(raw_line);

            if code.trim().is_empty() {
                match comment {
                    None => accumulated.clear(),
                    Some(c) if !c.is_empty() => {
                        accumulated.push(' ');
                        accumulated.push_str(c);
                    }
                    Some(_) => {}
                }
                continue;
            }

            let trimmed = code.trim();
            if trimmed == "---functions---" {
                section = Section::Functions;
                continue;
            }
            if trimmed == "---types---" {
                section = Section::Types;
                continue;
            }

            pending.push(PendingLine {
                section,
                code: trimmed.to_string(),
                comment: std::mem::take(&mut accumulated),
                source: raw_line.to_string(),
            });
        }
    }

    Ok(ReadResult {
        pending,
        layer,
        names,
    })
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
