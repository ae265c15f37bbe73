//! Pipeline orchestration: wires the source reader, declaration parser, CRC
//! validator, parameter analyzer, type registry and flag checker together,
//! then hands the finished [`Registry`] to the emitters.

use std::collections::HashMap;
use std::path::PathBuf;

use log::warn;

use crate::config::Scheme;
use crate::error::{GenError, Result};
use crate::reader::{self, PendingLine, Section};
use crate::tl::ast::{ParamShape, ParamToken};
use crate::tl::model::{Constructor, Param, Shape};
use crate::tl::registry::Registry;
use crate::tl::{analyzer, crc, flags, grammar};

/// Running counts of every non-fatal condition the pipeline encountered.
/// CRC mismatches that aren't exception-listed and complex bare types
/// dropped from dump serialization are warn-and-continue, not errors; this
/// is how that policy is made visible to callers instead of being silent.
#[derive(Debug, Default, Clone, Copy)]
pub struct Warnings {
    pub crc_mismatches: u32,
    pub dropped_dump_fields: u32,
}

impl Warnings {
    pub fn total(&self) -> u32 {
        self.crc_mismatches + self.dropped_dump_fields
    }
}

#[derive(Debug)]
pub struct CompileOutcome {
    pub registry: Registry,
    pub layer: i32,
    pub input_names: Vec<String>,
    pub warnings: Warnings,
}

pub struct Options {
    pub strict_crc: bool,
}

pub fn compile(paths: &[PathBuf], scheme: &Scheme, options: &Options) -> Result<CompileOutcome> {
    if paths.is_empty() {
        return Err(GenError::NoInputs);
    }

    let read = reader::read_inputs(paths)?;
    let mut registry = Registry::new();
    let mut checker = flags::FlagChecker::new();
    let mut warnings = Warnings::default();

    for pending in &read.pending {
        if analyzer::is_bots_only_line(&pending.comment) {
            continue;
        }

        let decl = grammar::parse_declaration(&pending.code)?;

        if scheme.skip.iter().any(|s| s == &decl.original_name) {
            continue;
        }

        let is_method = pending.section == Section::Functions;

        let resolved_id = {
            let cleanline = crc::canonicalize(
                &decl.original_name,
                &decl.params_text,
                &decl.result_text,
                &scheme.synonyms,
            );
            crc::resolve(
                &decl.original_name,
                decl.type_id.as_deref(),
                &cleanline,
                &scheme.type_id_exceptions,
            )
        };

        let type_id = match resolved_id {
            crc::Resolution::Computed(id) | crc::Resolution::Declared(id) => id,
            crc::Resolution::Mismatch { declared, computed } => {
                let message = format!(
                    "counted 0x{computed:x} mismatch with provided 0x{declared:x} ({})",
                    decl.original_name
                );
                if options.strict_crc {
                    return Err(GenError::Semantic {
                        message,
                        line: pending.source.clone(),
                    });
                }
                warn!("{message}");
                warnings.crc_mismatches += 1;
                continue;
            }
        };

        let ctor = build_constructor(&decl, pending, is_method, type_id, &registry, scheme)?;

        let mut flag_bits = HashMap::new();
        for param in &ctor.params {
            if let Shape::Conditional { bit, .. } = &param.shape {
                flag_bits.insert(param.name.clone(), *bit);
            }
        }
        checker.record(&ctor.name, flag_bits);
        registry.insert_constructor(ctor)?;
    }

    checker.check(&scheme.flag_inheritance)?;

    for name in &scheme.nullable {
        registry.mark_nullable(name);
    }

    check_type_references(&registry, scheme)?;

    Ok(CompileOutcome {
        registry,
        layer: read.layer,
        input_names: read.names,
        warnings,
    })
}

fn normalize_name(name: &str) -> String {
    name.replace('.', "_")
}

/// Resolves a raw type-reference string (possibly `Vector<...>`-wrapped)
/// into a [`Shape::Named`]/[`Shape::Vector`] tree, following bare
/// constructor names back to the abstract type that owns them the way
/// `handleTemplate` falls back to scanning `typesDict`.
fn resolve_named_shape(text: &str, registry: &Registry) -> Shape {
    let trimmed = text.trim();
    let lower_vec = trimmed
        .strip_prefix("Vector<")
        .or_else(|| trimmed.strip_prefix("vector<"));
    if let Some(inner) = lower_vec {
        if let Some(inner) = inner.strip_suffix('>') {
            return Shape::Vector(Box::new(resolve_named_shape(inner, registry)));
        }
    }

    let starts_upper = trimmed.chars().next().is_some_and(|c| c.is_uppercase());
    let has_dotted_upper = trimmed
        .rsplit_once('.')
        .is_some_and(|(_, tail)| tail.chars().next().is_some_and(|c| c.is_uppercase()));

    if starts_upper || has_dotted_upper {
        Shape::Named(normalize_name(trimmed))
    } else if let Some(meta) = registry.resolve_meta_type(trimmed) {
        Shape::Named(meta.to_string())
    } else {
        Shape::Named(trimmed.to_string())
    }
}

fn build_constructor(
    decl: &crate::tl::ast::RawDecl,
    pending: &PendingLine,
    is_method: bool,
    type_id: u32,
    registry: &Registry,
    scheme: &Scheme,
) -> Result<Constructor> {
    let name = scheme
        .renamed_types
        .get(&decl.original_name)
        .cloned()
        .unwrap_or_else(|| normalize_name(&decl.original_name));

    let type_name = resolve_result_type_name(&decl.result_text);

    let mut template_param = None;
    let mut flags_field: Option<String> = None;
    let mut flags64_field: Option<String> = None;
    let mut params = Vec::new();

    for token in decl.params_text.split_whitespace() {
        match grammar::parse_param_token(token)? {
            ParamToken::TemplateDecl(var) => template_param = Some(var),
            ParamToken::Param(raw) => {
                let bots_only = analyzer::is_bots_only_param(&pending.comment, &raw.name);
                let nullable_vector =
                    !bots_only && analyzer::is_nullable_vector(&pending.comment, &raw.name);
                let nullable = !bots_only
                    && !nullable_vector
                    && analyzer::is_nullable_param(&pending.comment, &raw.name);

                let shape = match &raw.shape {
                    ParamShape::FlagsWord => {
                        if let Some(existing) = &flags_field {
                            if raw.name == format!("{existing}2") {
                                flags64_field = Some(raw.name.clone());
                                continue;
                            }
                        }
                        if nullable || nullable_vector {
                            return Err(GenError::Semantic {
                                message: format!("flags param {:?} should not be nullable", raw.name),
                                line: pending.source.clone(),
                            });
                        }
                        flags_field = Some(raw.name.clone());
                        Shape::Flags { is64: false }
                    }
                    ParamShape::TemplateArg(var) => {
                        if template_param.as_deref() != Some(var.as_str()) {
                            return Err(GenError::Semantic {
                                message: format!("bad template param name: {:?}", raw.name),
                                line: pending.source.clone(),
                            });
                        }
                        if nullable || nullable_vector {
                            return Err(GenError::Semantic {
                                message: format!("template param {:?} should not be nullable", raw.name),
                                line: pending.source.clone(),
                            });
                        }
                        Shape::TemplateVar(var.clone())
                    }
                    ParamShape::Conditional {
                        flags_name,
                        bit,
                        inner,
                    } => {
                        let is64 = flags64_field.as_deref() == Some(flags_name.as_str());
                        if flags_field.as_deref() != Some(flags_name.as_str()) && !is64 {
                            return Err(GenError::Semantic {
                                message: format!(
                                    "conditional field references unknown flags word {flags_name:?}"
                                ),
                                line: pending.source.clone(),
                            });
                        }
                        if nullable || nullable_vector {
                            return Err(GenError::Semantic {
                                message: format!("conditional param {:?} should not be nullable", raw.name),
                                line: pending.source.clone(),
                            });
                        }
                        let effective_bit = if is64 { bit + 32 } else { *bit };
                        let trivial = inner == "true";
                        Shape::Conditional {
                            flags_field: flags_name.clone(),
                            bit: effective_bit,
                            inner: Box::new(resolve_named_shape(inner, registry)),
                            trivial,
                        }
                    }
                    ParamShape::Plain(text) => {
                        let shape = resolve_named_shape(text, registry);
                        match &shape {
                            Shape::Vector(_) => {
                                if nullable {
                                    return Err(GenError::Semantic {
                                        message: format!(
                                            "vector param {:?} should not be nullable",
                                            raw.name
                                        ),
                                        line: pending.source.clone(),
                                    });
                                }
                            }
                            _ if nullable_vector => {
                                return Err(GenError::Semantic {
                                    message: format!(
                                        "non-vector param {:?} should not be vector-nullable",
                                        raw.name
                                    ),
                                    line: pending.source.clone(),
                                });
                            }
                            _ => {}
                        }
                        shape
                    }
                };

                params.push(Param {
                    name: raw.name.clone(),
                    shape,
                    nullable,
                    nullable_vector,
                    bots_only,
                });
            }
        }
    }

    if flags64_field.is_some() {
        if let Some(flags_field) = &flags_field {
            for param in &mut params {
                if &param.name == flags_field {
                    param.shape = Shape::Flags { is64: true };
                }
            }
        }
    }

    let response_type = is_method.then(|| normalize_name(&decl.result_text));

    Ok(Constructor {
        original_name: decl.original_name.clone(),
        name,
        type_name,
        type_id,
        params,
        flags_field,
        flags64_field,
        is_method,
        response_type,
        template_param,
        doc: pending.comment.clone(),
    })
}

/// Walks every constructor's parameters (and its response type, for methods)
/// and confirms each [`Shape::Named`] resolves to a builtin, a registered
/// abstract type, or a specific constructor used bare-as-a-type. Run once
/// the whole registry is built, since TL schemas commonly reference a type
/// before its own declaration appears.
fn check_type_references(registry: &Registry, scheme: &Scheme) -> Result<()> {
    let known = |name: &str| {
        scheme.is_builtin(name)
            || registry.find_type(name).is_some()
            || registry.constructor(name).is_some()
    };

    fn walk(shape: &Shape, known: &impl Fn(&str) -> bool, ctor: &str) -> Result<()> {
        match shape {
            Shape::Named(name) if !known(name) => Err(GenError::UnresolvedType {
                name: name.clone(),
                line: format!("in constructor {ctor:?}"),
            }),
            Shape::Named(_) | Shape::Flags { .. } | Shape::TemplateVar(_) => Ok(()),
            Shape::Vector(inner) => walk(inner, known, ctor),
            Shape::Conditional { inner, .. } => walk(inner, known, ctor),
        }
    }

    for ctor in registry.constructors() {
        for param in &ctor.params {
            walk(&param.shape, &known, &ctor.original_name)?;
        }
        if let Some(response) = &ctor.response_type {
            if !known(response) {
                return Err(GenError::UnresolvedType {
                    name: response.clone(),
                    line: format!("in constructor {:?}", ctor.original_name),
                });
            }
        }
    }
    Ok(())
}

fn resolve_result_type_name(result_text: &str) -> String {
    let trimmed = result_text.trim();
    let base = trimmed
        .strip_prefix("Vector<")
        .or_else(|| trimmed.strip_prefix("vector<"))
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(trimmed);
    normalize_name(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "{contents}").unwrap();
        f
    }

    #[test]
    fn compiles_a_minimal_schema() {
        let f = write_temp("boolTrue#997275b5 = Bool;\nboolFalse#bc799737 = Bool;\n");
        let outcome = compile(
            &[f.path().to_path_buf()],
            &Scheme::default(),
            &Options { strict_crc: false },
        )
        .unwrap();
        assert_eq!(outcome.registry.constructors().len(), 2);
        assert_eq!(outcome.warnings.total(), 0);
    }

    #[test]
    fn unexempted_crc_mismatch_is_dropped_not_fatal() {
        let f = write_temp("boolTrue#deadbeef = Bool;\n");
        let outcome = compile(
            &[f.path().to_path_buf()],
            &Scheme::default(),
            &Options { strict_crc: false },
        )
        .unwrap();
        assert_eq!(outcome.registry.constructors().len(), 0);
        assert_eq!(outcome.warnings.crc_mismatches, 1);
    }

    #[test]
    fn strict_crc_promotes_mismatch_to_a_fatal_error() {
        let f = write_temp("boolTrue#deadbeef = Bool;\n");
        let err = compile(
            &[f.path().to_path_buf()],
            &Scheme::default(),
            &Options { strict_crc: true },
        )
        .unwrap_err();
        assert!(matches!(err, GenError::Semantic { .. }));
    }

    #[test]
    fn flags_and_conditional_fields_are_resolved() {
        let f = write_temp(
            "updateConfig flags:# has_foo:flags.0?true title:flags.1?string = Update;\n",
        );
        let outcome = compile(
            &[f.path().to_path_buf()],
            &Scheme::default(),
            &Options { strict_crc: true },
        )
        .unwrap();
        let ctor = &outcome.registry.constructors()[0];
        assert_eq!(ctor.flags_field.as_deref(), Some("flags"));
        assert!(matches!(
            ctor.params.iter().find(|p| p.name == "has_foo").unwrap().shape,
            Shape::Conditional { trivial: true, .. }
        ));
    }

    #[test]
    fn a_param_referencing_an_undeclared_type_is_rejected() {
        let f = write_temp("inputPeerUser user_id:long access_hash:SecretHandshake = InputPeer;\n");
        let err = compile(
            &[f.path().to_path_buf()],
            &Scheme::default(),
            &Options { strict_crc: false },
        )
        .unwrap_err();
        assert!(matches!(err, GenError::UnresolvedType { name, .. } if name == "SecretHandshake"));
    }

    #[test]
    fn no_inputs_is_an_error() {
        let err = compile(&[], &Scheme::default(), &Options { strict_crc: false }).unwrap_err();
        assert!(matches!(err, GenError::NoInputs));
    }
}
