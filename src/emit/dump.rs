//! Text-dump emitter (C10): per-constructor human-readable serializers, plus
//! the three protocol-level stage functions every dump build needs
//! regardless of schema content.
//!
//! Ported in *behavior* from `generate_tl.py`'s `addTextSerialize` and its
//! hand-written `Serialize_rpc_result`/`Serialize_msg_container`/
//! `Serialize_core_message` functions: each constructor's dump function
//! walks its fields stage-by-stage over four parallel stacks (`types`,
//! `vtypes`, `stages`, `flags`) that together track "what nested value are
//! we printing, and at what point in it." A flags word stage reads the raw
//! value and remembers it; a conditional field's stage tests that
//! remembered bit before deciding whether to consume any bytes at all. A
//! field whose bare vector element type maps to more than one constructor
//! (a "complex bare type") can't be disambiguated at dump time and is
//! dropped with a warning, matching the original's
//! `print('Complex bare type found...')` + `continue`.

use crate::tl::model::Shape;
use crate::tl::registry::Registry;

use super::struct_name;

pub struct DumpOutput {
    pub text: String,
    pub dropped_fields: u32,
}

/// The wire-level type name a stage pushes onto the nested-type stack, not
/// the Rust type the object-model emitter would use.
fn type_label(shape: &Shape) -> String {
    match shape {
        Shape::Named(name) => name.clone(),
        Shape::Vector(inner) => format!("Vector<{}>", type_label(inner)),
        Shape::Flags { is64: true } => "flags2".to_string(),
        Shape::Flags { is64: false } => "flags".to_string(),
        Shape::Conditional { inner, .. } => type_label(inner),
        Shape::TemplateVar(name) => name.clone(),
    }
}

pub fn render(registry: &Registry) -> DumpOutput {
    let mut out = String::new();
    let mut dropped_fields = 0;

    out.push_str("// Generated text-dump serializers. Do not edit by hand.\n\n");
    out.push_str(PROTOCOL_STAGE_FUNCTIONS);
    out.push('\n');

    for ctor in registry.constructors() {
        let fname = format!("serialize_{}", ctor.name);
        out.push_str(&format!(
            "fn {fname}(to: &mut tl_runtime::DumpBuffer, stage: i32, state: &mut tl_runtime::DumpState) -> bool {{\n"
        ));

        if ctor.params.is_empty() {
            out.push_str(&format!(
                "    to.add(\"{{ {} }}\");\n    state.pop();\n    true\n",
                ctor.original_name
            ));
            out.push_str("}\n\n");
            continue;
        }

        out.push_str(&format!(
            "    if stage == 0 {{ to.add(\"{{ {} \"); }}\n",
            ctor.original_name
        ));
        out.push_str("    match stage {\n");

        let mut stage = 0;
        for param in &ctor.params {
            if complex_bare_vector(&param.shape, registry) {
                dropped_fields += 1;
                continue;
            }
            let name = &param.name;
            match &param.shape {
                Shape::Flags { .. } => {
                    out.push_str(&format!(
                        "        {stage} => {{ let flags = to.read_flags_word(); to.add(&format!(\"{name}: {{flags:#x}}\")); state.set_flags(flags); }}\n"
                    ));
                }
                Shape::Conditional { trivial: true, bit, .. } => {
                    out.push_str(&format!(
                        "        {stage} => {{ if (state.flags() & (1 << {bit})) != 0 {{ to.add(\"{name}: YES\"); }} else {{ to.add(\"{name}: SKIPPED\"); }} }}\n"
                    ));
                }
                Shape::Conditional { trivial: false, bit, flags_field, inner } => {
                    let label = type_label(inner);
                    out.push_str(&format!(
                        "        {stage} => {{ if (state.flags() & (1 << {bit})) != 0 {{ to.add(\"{name}: \"); state.push_field(\"{name}\"); state.push_type(\"{label}\"); }} else {{ to.add(\"{name}: [ SKIPPED BY BIT {bit} IN FIELD {flags_field} ]\"); }} }}\n"
                    ));
                }
                _ => {
                    let label = type_label(&param.shape);
                    out.push_str(&format!(
                        "        {stage} => {{ to.add(\"{name}: \"); state.push_field(\"{name}\"); state.push_type(\"{label}\"); }}\n"
                    ));
                }
            }
            stage += 1;
        }
        out.push_str("        _ => { to.add(\"}\"); state.pop(); }\n");
        out.push_str("    }\n    true\n}\n\n");
    }

    DumpOutput { text: out, dropped_fields }
}

/// A bare (non-boxed) vector element type that maps to more than one
/// constructor can't be told apart from its serialized bytes alone; the
/// dump serializer has to drop it.
fn complex_bare_vector(shape: &Shape, registry: &Registry) -> bool {
    match shape {
        Shape::Vector(inner) => complex_bare_vector(inner, registry),
        Shape::Named(name) => registry
            .find_type(name)
            .map(|t| t.constructor_names.len() > 1)
            .unwrap_or(false)
            && registry.constructor(name).is_none(),
        _ => false,
    }
}

const PROTOCOL_STAGE_FUNCTIONS: &str = r#"fn serialize_rpc_result(to: &mut tl_runtime::DumpBuffer, stage: i32, state: &mut tl_runtime::DumpState) -> bool {
    match stage {
        0 => { to.add("rpc_result { req_msg_id: "); true }
        1 => { to.add(", result: "); true }
        _ => { to.add(" }"); state.pop(); true }
    }
}

fn serialize_msg_container(to: &mut tl_runtime::DumpBuffer, stage: i32, state: &mut tl_runtime::DumpState) -> bool {
    match stage {
        0 => { to.add("msg_container [ "); true }
        _ => { to.add(" ]"); state.pop(); true }
    }
}

fn serialize_core_message(to: &mut tl_runtime::DumpBuffer, stage: i32, state: &mut tl_runtime::DumpState) -> bool {
    match stage {
        0 => { to.add("message { msg_id: "); true }
        1 => { to.add(", seqno: "); true }
        2 => { to.add(", bytes: "); true }
        3 => { to.add(", body: "); true }
        _ => { to.add(" }"); state.pop(); true }
    }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::{self, Options};
    use crate::config::Scheme;

    #[test]
    fn includes_the_three_fixed_protocol_functions() {
        let out = render(&Registry::new());
        assert!(out.text.contains("fn serialize_rpc_result"));
        assert!(out.text.contains("fn serialize_msg_container"));
        assert!(out.text.contains("fn serialize_core_message"));
    }

    #[test]
    fn renders_a_stage_machine_per_constructor() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "inputPeerSelf = InputPeer;\n").unwrap();
        let outcome = compile::compile(
            &[tmp.path().to_path_buf()],
            &Scheme::default(),
            &Options { strict_crc: false },
        )
        .unwrap();
        let out = render(&outcome.registry);
        assert!(out.text.contains("fn serialize_inputPeerSelf"));
        assert_eq!(out.dropped_fields, 0);
    }

    #[test]
    fn conditional_fields_are_bit_gated_and_trivial_ones_print_yes_or_skipped() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "bar flags:# name:flags.0?string present:flags.1?true = Bar;\n",
        )
        .unwrap();
        let outcome = compile::compile(
            &[tmp.path().to_path_buf()],
            &Scheme::default(),
            &Options { strict_crc: false },
        )
        .unwrap();
        let out = render(&outcome.registry);
        assert!(out.text.contains("state.set_flags(flags)"));
        assert!(out.text.contains("to.add(\"name: [ SKIPPED BY BIT 0 IN FIELD flags ]\")"));
        assert!(out.text.contains("state.push_type(\"string\")"));
        assert!(out.text.contains("to.add(\"present: YES\")"));
        assert!(out.text.contains("to.add(\"present: SKIPPED\")"));
    }
}
