//! External adapter emitter (C11): bidirectional `From` impls plus type-level
//! conversion functions bridging the generated object model to the external
//! representation named by the scheme's `conversion` block. Only emitted
//! when a scheme actually configures `conversion` — most invocations don't.
//!
//! Field conversions dispatch on shape: strings go through `tl_from_string`,
//! other builtins through `tl_from_simple`, vectors through
//! `tl_from_vector`/`tl_from_vector_optional`, and nested objects recurse
//! through `tl_from::<T>`, wrapped in `optional` when the field is nullable.
//! The reverse (`tl_to_*`) direction mirrors the same split, named by
//! analogy rather than by any declared convention. A `bots_only` param has
//! no external counterpart: the from-external side fills it with `{}`, the
//! to-external side just doesn't emit it. A constructor with a flag-gated
//! field can't be represented at all here — the adapter path has no notion
//! of a flags word — so it's a generation-time error rather than silently
//! wrong output.

use crate::config::Scheme;
use crate::error::GenError;
use crate::tl::model::{Param, Shape};
use crate::tl::registry::Registry;

use super::struct_name;

fn from_external_expr(scheme: &Scheme, param: &Param) -> String {
    if param.bots_only {
        return "{}".to_string();
    }
    let field = &param.name;
    let base = match &param.shape {
        Shape::Named(name) if name == "string" => format!("tl_runtime::adapter::tl_from_string(value.{field})"),
        Shape::Named(name) if scheme.is_builtin(name) => format!("tl_runtime::adapter::tl_from_simple(value.{field})"),
        Shape::Vector(_) if param.nullable_vector => {
            format!("tl_runtime::adapter::tl_from_vector_optional(value.{field})")
        }
        Shape::Vector(_) => format!("tl_runtime::adapter::tl_from_vector(value.{field})"),
        Shape::Named(name) => format!("tl_runtime::adapter::tl_from::<{}>(value.{field})", struct_name(name)),
        _ => format!("value.{field}"),
    };
    if param.nullable {
        format!("tl_runtime::adapter::optional({base})")
    } else {
        base
    }
}

fn to_external_expr(scheme: &Scheme, param: &Param) -> String {
    let field = &param.name;
    let base = match &param.shape {
        Shape::Named(name) if name == "string" => format!("tl_runtime::adapter::tl_to_string(value.{field})"),
        Shape::Named(name) if scheme.is_builtin(name) => format!("tl_runtime::adapter::tl_to_simple(value.{field})"),
        Shape::Vector(_) if param.nullable_vector => {
            format!("tl_runtime::adapter::tl_to_vector_optional(value.{field})")
        }
        Shape::Vector(_) => format!("tl_runtime::adapter::tl_to_vector(value.{field})"),
        Shape::Named(name) => format!("tl_runtime::adapter::tl_to::<{}>(value.{field})", struct_name(name)),
        _ => format!("value.{field}"),
    };
    if param.nullable {
        format!("tl_runtime::adapter::optional({base})")
    } else {
        base
    }
}

pub fn render(registry: &Registry, scheme: &Scheme) -> Result<String, GenError> {
    let Some(conversion) = &scheme.conversion else {
        return Ok(String::new());
    };

    for ctor in registry.constructors() {
        if let Some(param) = ctor
            .params
            .iter()
            .find(|p| matches!(p.shape, Shape::Conditional { .. } | Shape::Flags { .. }))
        {
            return Err(GenError::Semantic {
                message: format!(
                    "constructor {:?} has a flag-gated field {:?}; the external adapter has no way to represent conditional fields",
                    ctor.original_name, param.name
                ),
                line: ctor.original_name.clone(),
            });
        }
    }

    let namespace = if conversion.namespace.is_empty() {
        "external".to_string()
    } else {
        conversion.namespace.clone()
    };

    let mut out = String::new();
    out.push_str("// Generated external-representation adapters. Do not edit by hand.\n\n");
    if !conversion.include.is_empty() {
        out.push_str(&format!("// corresponds to: {}\n\n", conversion.include));
    }

    for ctor in registry.constructors() {
        let sname = struct_name(&ctor.name);

        out.push_str(&format!(
            "impl From<{namespace}::{sname}> for {sname} {{\n    fn from(value: {namespace}::{sname}) -> Self {{\n        {sname} {{\n"
        ));
        for param in &ctor.params {
            out.push_str(&format!("            {}: {},\n", param.name, from_external_expr(scheme, param)));
        }
        out.push_str("        }\n    }\n}\n\n");

        out.push_str(&format!(
            "impl From<{sname}> for {namespace}::{sname} {{\n    fn from(value: {sname}) -> Self {{\n        {namespace}::{sname} {{\n"
        ));
        for param in &ctor.params {
            if param.bots_only {
                continue;
            }
            out.push_str(&format!("            {}: {},\n", param.name, to_external_expr(scheme, param)));
        }
        out.push_str("        }\n    }\n}\n\n");
    }

    for ty in registry.types() {
        let ename = struct_name(&ty.name);
        let fn_suffix = ty.name.to_lowercase();
        let multi = ty.constructor_names.len() > 1;
        let target_ty = if multi { ename.clone() } else { struct_name(&ty.constructor_names[0]) };

        out.push_str(&format!("pub fn tl_from_{fn_suffix}(value: {namespace}::{ename}) -> {target_ty} {{\n"));
        if multi {
            out.push_str("    match value {\n");
            for ctor_name in &ty.constructor_names {
                let sname = struct_name(ctor_name);
                out.push_str(&format!(
                    "        {namespace}::{ename}::{sname}(inner) => {target_ty}::{sname}({sname}::from(inner)),\n"
                ));
            }
            out.push_str("    }\n}\n\n");
        } else {
            let sname = struct_name(&ty.constructor_names[0]);
            out.push_str(&format!("    {sname}::from(value)\n}}\n\n"));
        }

        if ty.nullable {
            out.push_str(&format!(
                "pub fn tl_to_{fn_suffix}(value: Option<&{target_ty}>) -> {namespace}::{ename} {{\n    match value {{\n        None => {namespace}::{ename}::null(),\n"
            ));
            if multi {
                for ctor_name in &ty.constructor_names {
                    let sname = struct_name(ctor_name);
                    out.push_str(&format!(
                        "        Some({target_ty}::{sname}(inner)) => {namespace}::{ename}::{sname}(inner.clone().into()),\n"
                    ));
                }
            } else {
                out.push_str(&format!("        Some(inner) => {namespace}::{ename}::from(inner.clone()),\n"));
            }
            out.push_str("    }\n}\n\n");
        } else {
            out.push_str(&format!("pub fn tl_to_{fn_suffix}(value: &{target_ty}) -> {namespace}::{ename} {{\n"));
            if multi {
                out.push_str("    match value {\n");
                for ctor_name in &ty.constructor_names {
                    let sname = struct_name(ctor_name);
                    out.push_str(&format!(
                        "        {target_ty}::{sname}(inner) => {namespace}::{ename}::{sname}(inner.clone().into()),\n"
                    ));
                }
                out.push_str("    }\n}\n\n");
            } else {
                out.push_str("    value.clone().into()\n}\n\n");
            }
        }
    }

    for extra in &conversion.builtin_additional {
        out.push_str(&format!("// additional builtin conversion: {extra}\n"));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::{self, Options};
    use crate::config::Conversion;

    #[test]
    fn nothing_is_emitted_without_a_conversion_block() {
        assert_eq!(render(&Registry::new(), &Scheme::default()).unwrap(), "");
    }

    #[test]
    fn emits_field_by_field_conversions_in_both_directions() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "inputPeerUser user_id:long = InputPeer;\n").unwrap();
        let outcome = compile::compile(
            &[tmp.path().to_path_buf()],
            &Scheme::default(),
            &Options { strict_crc: false },
        )
        .unwrap();
        let mut scheme = Scheme::default();
        scheme.conversion = Some(Conversion {
            namespace: "legacy".to_string(),
            ..Default::default()
        });
        let rendered = render(&outcome.registry, &scheme).unwrap();
        assert!(rendered.contains("impl From<legacy::InputPeerUser> for InputPeerUser"));
        assert!(rendered.contains("user_id: tl_runtime::adapter::tl_from_simple(value.user_id),"));
        assert!(rendered.contains("impl From<InputPeerUser> for legacy::InputPeerUser"));
        assert!(rendered.contains("user_id: tl_runtime::adapter::tl_to_simple(value.user_id),"));
    }

    #[test]
    fn bots_only_fields_are_synthesized_on_the_way_in_and_dropped_on_the_way_out() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "// @token Internal secret ; for bots only.\nhelperWithSecret token:string = Helper;\n",
        )
        .unwrap();
        let outcome = compile::compile(
            &[tmp.path().to_path_buf()],
            &Scheme::default(),
            &Options { strict_crc: false },
        )
        .unwrap();
        let mut scheme = Scheme::default();
        scheme.conversion = Some(Conversion {
            namespace: "legacy".to_string(),
            ..Default::default()
        });
        let rendered = render(&outcome.registry, &scheme).unwrap();
        assert!(rendered.contains("token: {},"));
        assert!(!rendered.contains("token: tl_runtime::adapter::tl_to_string(value.token),"));
    }

    #[test]
    fn a_multi_constructor_type_gets_a_switching_conversion_function() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "boolTrue#997275b5 = Bool;\nboolFalse#bc799737 = Bool;\n").unwrap();
        let outcome = compile::compile(
            &[tmp.path().to_path_buf()],
            &Scheme::default(),
            &Options { strict_crc: false },
        )
        .unwrap();
        let mut scheme = Scheme::default();
        scheme.conversion = Some(Conversion {
            namespace: "legacy".to_string(),
            ..Default::default()
        });
        let rendered = render(&outcome.registry, &scheme).unwrap();
        assert!(rendered.contains("pub fn tl_from_bool(value: legacy::Bool) -> Bool {"));
        assert!(rendered.contains("legacy::Bool::BoolTrue(inner) => Bool::BoolTrue(BoolTrue::from(inner)),"));
    }

    #[test]
    fn a_conditional_field_makes_adapter_generation_an_error() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "bar flags:# name:flags.0?string = Bar;\n",
        )
        .unwrap();
        let outcome = compile::compile(
            &[tmp.path().to_path_buf()],
            &Scheme::default(),
            &Options { strict_crc: false },
        )
        .unwrap();
        let mut scheme = Scheme::default();
        scheme.conversion = Some(Conversion {
            namespace: "legacy".to_string(),
            ..Default::default()
        });
        let err = render(&outcome.registry, &scheme).unwrap_err();
        assert!(matches!(err, GenError::Semantic { .. }));
    }
}
