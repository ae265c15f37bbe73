//! Type-id canonicalization and CRC32 validation (C4).
//!
//! Ported in *behavior*, not text, from the `cleanline`/`countTypeId`
//! computation in `generate_tl.py`'s main loop (lines ~406-429). The
//! canonical line is built from the untouched declaration name, raw
//! parameter text and result text — deliberately *not* the normalized
//! parameter shapes `analyzer` later produces, since the upstream clients
//! this id has to match computed it the same naive way.

use std::collections::HashMap;

/// Strips a `flags.N?true`/`flags2.N?true` trivial-conditional parameter
/// out of an otherwise-untouched declaration line. The flags-word name is
/// hardcoded to `flags`/`flags2` here, matching the original tool, which
/// canonicalizes against the conventional names rather than whatever the
/// declaration actually calls its flags parameter.
fn strip_trivial_true_params(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    loop {
        match find_trivial_true(rest) {
            Some((start, end)) => {
                out.push_str(&rest[..start]);
                rest = &rest[end..];
            }
            None => {
                out.push_str(rest);
                break;
            }
        }
    }
    out
}

fn find_trivial_true(line: &str) -> Option<(usize, usize)> {
    for (idx, _) in line.match_indices(' ') {
        let tail = &line[idx + 1..];
        let Some(colon) = tail.find(':') else { continue };
        let name = &tail[..colon];
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            continue;
        }
        let after_colon = &tail[colon + 1..];
        for flags_word in ["flags", "flags2"] {
            if let Some(rest) = after_colon.strip_prefix(flags_word) {
                let Some(rest) = rest.strip_prefix('.') else { continue };
                let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
                if digits_end == 0 {
                    continue;
                }
                let Some(after_bit) = rest[digits_end..].strip_prefix("?true") else {
                    continue;
                };
                let match_end = line.len() - after_bit.len();
                return Some((idx, match_end));
            }
        }
    }
    None
}

/// Builds the canonical line the computed CRC32 id is taken over.
pub fn canonicalize(
    original_name: &str,
    raw_params_text: &str,
    result_text: &str,
    synonyms: &HashMap<String, String>,
) -> String {
    let joined = format!("{original_name}{raw_params_text}= {result_text}");
    let mut line = strip_trivial_true_params(&joined);
    line = line.replace('<', " ").replace('>', " ").replace("  ", " ");
    line = line.trim_start_matches(' ').to_string();
    line = line.trim_end_matches(' ').to_string();
    for (synonym, synonym_of) in synonyms {
        line = line.replace(&format!(":{synonym} "), &format!(":{synonym_of} "));
        line = line.replace(&format!("?{synonym} "), &format!("?{synonym_of} "));
    }
    line.replace('{', "").replace('}', "")
}

pub fn compute(cleanline: &str) -> u32 {
    crc32fast::hash(cleanline.as_bytes())
}

/// Strips leading zeros from a declared hex id, matching the original's
/// `while typeid[0] == '0': typeid = typeid[1:]` loop. A declaration of
/// `#0001a2b3` therefore compares equal to a computed id of `1a2b3`.
pub fn strip_leading_zeros(hex: &str) -> &str {
    let trimmed = hex.trim_start_matches('0');
    if trimmed.is_empty() { "0" } else { trimmed }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No id was declared; the computed one is authoritative.
    Computed(u32),
    /// A declared id matched the computed one, or was listed in
    /// `typeIdExceptions` and is trusted despite the mismatch.
    Declared(u32),
    /// A declared id disagreed with the computed one and is not
    /// exempted; this is warn-and-drop unless the caller runs in strict
    /// mode.
    Mismatch { declared: u32, computed: u32 },
}

pub fn resolve(
    original_name: &str,
    declared_hex: Option<&str>,
    cleanline: &str,
    exceptions: &[String],
) -> Resolution {
    let computed = compute(cleanline);
    let Some(declared_hex) = declared_hex else {
        return Resolution::Computed(computed);
    };

    let declared_clean = strip_leading_zeros(declared_hex);
    let computed_hex = format!("{computed:x}");
    if declared_clean == computed_hex {
        return Resolution::Declared(computed);
    }

    let declared_value = u32::from_str_radix(declared_clean, 16).unwrap_or(0);
    let key = format!("{original_name}#{declared_clean}");
    if exceptions.iter().any(|e| e == &key) {
        return Resolution::Declared(declared_value);
    }

    Resolution::Mismatch {
        declared: declared_value,
        computed,
    }
}
