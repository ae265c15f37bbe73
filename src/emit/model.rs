//! Object-model emitter (C8): one `struct` per constructor, one `enum` per
//! multi-constructor abstract type, plus the read/write trait impls each
//! needs to round-trip over the wire.
//!
//! Grounded in `grammers-tl-gen`'s `structs.rs`
//! (`examples/other_examples/*grammers*structs.rs.rs`): that crate solves
//! the identical TL-schema-to-Rust problem and settles on exactly this
//! split rather than the original generator's tag+payload-pointer C++
//! classes. A Rust `enum` already *is* a tagged union, so the abstract
//! type's "visitor/matcher" becomes an ordinary `match`. `write_serializable`
//! computes the flags word from field presence rather than storing it as
//! the write-time source of truth, and `write_deserializable` reads it once
//! and tests each conditional field's bit against the raw value; both are
//! mirrored here. `write_impl_from` is mirrored by the per-variant
//! `From`/`TryFrom` impls below the enum.

use crate::config::Scheme;
use crate::tl::model::{Constructor, Param, Shape};
use crate::tl::registry::Registry;

use super::struct_name;

fn qualify(scheme: &Scheme, name: &str) -> String {
    if scheme.is_builtin(name) {
        match name {
            "int" => "i32".to_string(),
            "long" | "int53" => "i64".to_string(),
            "double" => "f64".to_string(),
            "string" => "String".to_string(),
            "bytes" => "Vec<u8>".to_string(),
            "bool" => "bool".to_string(),
            "int128" => "[u8; 16]".to_string(),
            "int256" => "[u8; 32]".to_string(),
            other => struct_name(other),
        }
    } else {
        struct_name(name)
    }
}

/// The Rust type a param's value travels as, after nullable/nullable-vector
/// wrapping. Shared between the struct field declaration and the
/// deserializer, which both need the identical type text.
fn field_type(scheme: &Scheme, shape: &Shape, nullable: bool, nullable_vector: bool) -> String {
    let mut ty = shape.rust_type(|n| qualify(scheme, n));
    if nullable_vector {
        ty = match shape {
            Shape::Vector(inner) => format!("Vec<Option<{}>>", inner.rust_type(|n| qualify(scheme, n))),
            _ => ty,
        };
    } else if nullable {
        ty = format!("Option<{ty}>");
    }
    ty
}

fn render_field(scheme: &Scheme, name: &str, shape: &Shape, nullable: bool, nullable_vector: bool) -> String {
    let ty = field_type(scheme, shape, nullable, nullable_vector);
    format!("    pub {name}: {ty},")
}

fn max_bit(params: &[Param]) -> Option<u32> {
    params
        .iter()
        .filter_map(|p| match &p.shape {
            Shape::Conditional { bit, .. } => Some(*bit),
            _ => None,
        })
        .max()
}

/// Renders the `bitflags::bitflags!` block for a constructor's flags word:
/// one named constant per conditional field at the bit it was declared on,
/// plus `MAX_FIELD`, the highest bit in use shifted into a mask.
fn render_flags_type(ctor_name: &str, is64: bool, params: &[Param]) -> String {
    let flags_name = format!("{}Flags", struct_name(ctor_name));
    let repr = if is64 { "u64" } else { "u32" };
    let mut out = format!(
        "bitflags::bitflags! {{\n    #[derive(Debug, Clone, Copy, PartialEq, Eq)]\n    pub struct {flags_name}: {repr} {{\n"
    );
    for param in params {
        if let Shape::Conditional { bit, .. } = &param.shape {
            out.push_str(&format!(
                "        const {} = 1 << {bit};\n",
                param.name.to_uppercase()
            ));
        }
    }
    if let Some(bit) = max_bit(params) {
        out.push_str(&format!("        const MAX_FIELD = 1 << {bit};\n"));
    }
    out.push_str("    }\n}\n\n");
    out
}

/// `is_<name>()` predicate accessors for trivial-true conditionals: fields
/// that materialize only as a boolean, never as wire data.
fn render_predicates(sname: &str, ctor: &Constructor) -> String {
    let trivials: Vec<&Param> = ctor
        .params
        .iter()
        .filter(|p| matches!(&p.shape, Shape::Conditional { trivial: true, .. }))
        .collect();
    if trivials.is_empty() {
        return String::new();
    }
    let mut out = format!("impl {sname} {{\n");
    for param in trivials {
        out.push_str(&format!(
            "    pub fn is_{name}(&self) -> bool {{\n        self.{name}\n    }}\n",
            name = param.name
        ));
    }
    out.push_str("}\n\n");
    out
}

fn generics_of(ctor: &Constructor) -> String {
    ctor.template_param.as_deref().map(|t| format!("<{t}>")).unwrap_or_default()
}

/// `Serializable`/`Deserializable` impls. A flags word is never itself
/// stored as the source of truth for writing: the writer recomputes it
/// from which conditional fields are present, so a caller can't desync a
/// stored flags value from the fields it's supposed to describe.
/// `Deserializable` is skipped for RPC methods, whose generic argument `!X`
/// has no way to know *which* concrete type to read back.
fn render_rw_impls(scheme: &Scheme, sname: &str, ctor: &Constructor) -> String {
    let mut out = String::new();
    let generics = generics_of(ctor);
    let ser_bounds = ctor
        .template_param
        .as_deref()
        .map(|t| format!("<{t}: tl_runtime::Serializable>"))
        .unwrap_or_default();

    out.push_str(&format!("impl{ser_bounds} tl_runtime::Serializable for {sname}{generics} {{\n"));
    out.push_str("    fn serialize<W: std::io::Write>(&self, buf: &mut W) -> std::io::Result<()> {\n");
    out.push_str("        <Self as tl_runtime::Identifiable>::CONSTRUCTOR_ID.serialize(buf)?;\n");
    for param in &ctor.params {
        match &param.shape {
            Shape::Flags { is64 } => {
                let repr = if *is64 { "u64" } else { "u32" };
                let mut expr = format!("0{repr}");
                for bit_param in &ctor.params {
                    if let Shape::Conditional { bit, trivial, .. } = &bit_param.shape {
                        let test = if *trivial {
                            format!("self.{}", bit_param.name)
                        } else {
                            format!("self.{}.is_some()", bit_param.name)
                        };
                        expr.push_str(&format!(" | if {test} {{ 1{repr} << {bit} }} else {{ 0 }}"));
                    }
                }
                out.push_str(&format!(
                    "        let {name}: {repr} = {expr};\n        {name}.serialize(buf)?;\n",
                    name = param.name
                ));
            }
            Shape::Conditional { trivial: true, .. } => {}
            Shape::Conditional { trivial: false, .. } => {
                out.push_str(&format!(
                    "        if let Some(ref x) = self.{name} {{ x.serialize(buf)?; }}\n",
                    name = param.name
                ));
            }
            _ => {
                out.push_str(&format!("        self.{}.serialize(buf)?;\n", param.name));
            }
        }
    }
    out.push_str("        Ok(())\n    }\n}\n\n");

    if ctor.is_method {
        return out;
    }

    out.push_str(&format!("impl {sname} {{\n"));
    out.push_str("    fn deserialize_body<R: std::io::Read>(buf: &mut R) -> std::io::Result<Self> {\n");
    let mut field_names = Vec::new();
    for param in &ctor.params {
        match &param.shape {
            Shape::Flags { is64 } => {
                let repr = if *is64 { "u64" } else { "u32" };
                out.push_str(&format!(
                    "        let __raw_{name} = {repr}::deserialize(buf)?;\n        let {name} = {sname}Flags::from_bits_truncate(__raw_{name});\n",
                    name = param.name
                ));
                field_names.push(param.name.clone());
            }
            Shape::Conditional { flags_field, bit, trivial: true, .. } => {
                out.push_str(&format!(
                    "        let {name} = (__raw_{flags_field} & (1 << {bit})) != 0;\n",
                    name = param.name
                ));
                field_names.push(param.name.clone());
            }
            Shape::Conditional { flags_field, bit, trivial: false, inner } => {
                let ty = inner.rust_type(|n| qualify(scheme, n));
                out.push_str(&format!(
                    "        let {name} = if (__raw_{flags_field} & (1 << {bit})) != 0 {{ Some({ty}::deserialize(buf)?) }} else {{ None }};\n",
                    name = param.name
                ));
                field_names.push(param.name.clone());
            }
            _ => {
                let ty = field_type(scheme, &param.shape, param.nullable, param.nullable_vector);
                out.push_str(&format!(
                    "        let {name} = {ty}::deserialize(buf)?;\n",
                    name = param.name
                ));
                field_names.push(param.name.clone());
            }
        }
    }
    out.push_str(&format!("        Ok({sname} {{ {} }})\n", field_names.join(", ")));
    out.push_str("    }\n}\n\n");

    out.push_str(&format!("impl tl_runtime::Deserializable for {sname} {{\n"));
    out.push_str("    fn deserialize<R: std::io::Read>(buf: &mut R) -> std::io::Result<Self> {\n");
    out.push_str("        let id = u32::deserialize(buf)?;\n");
    out.push_str(&format!(
        "        if id != <Self as tl_runtime::Identifiable>::CONSTRUCTOR_ID {{\n            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, format!(\"unexpected constructor id {{id:#x}} for {sname}\")));\n        }}\n"
    ));
    out.push_str("        Self::deserialize_body(buf)\n    }\n}\n\n");

    out
}

pub fn render(registry: &Registry, scheme: &Scheme) -> String {
    let mut out = String::new();
    out.push_str("// Generated object model. Do not edit by hand.\n\n");

    for ctor in registry.constructors() {
        let sname = struct_name(&ctor.name);

        if ctor.flags_field.is_some() {
            let is64 = ctor.flags64_field.is_some();
            out.push_str(&render_flags_type(&ctor.name, is64, &ctor.params));
        }

        out.push_str(&format!("/// `{}` (id 0x{:08x}).\n", ctor.original_name, ctor.type_id));
        out.push_str("#[derive(Debug, Clone, PartialEq)]\n");
        if let Some(t) = &ctor.template_param {
            out.push_str(&format!("pub struct {sname}<{t}> {{\n"));
        } else {
            out.push_str(&format!("pub struct {sname} {{\n"));
        }
        for param in &ctor.params {
            if let Shape::Flags { .. } = &param.shape {
                out.push_str(&format!("    pub {}: {sname}Flags,\n", param.name));
                continue;
            }
            if matches!(&param.shape, Shape::Conditional { trivial: true, .. }) {
                out.push_str(&format!("    pub {}: bool,\n", param.name));
                continue;
            }
            out.push_str(&render_field(scheme, &param.name, &param.shape, param.nullable, param.nullable_vector));
            out.push('\n');
        }
        out.push_str("}\n\n");

        out.push_str(&format!(
            "impl{} tl_runtime::Identifiable for {sname}{} {{\n    const CONSTRUCTOR_ID: u32 = 0x{:08x};\n}}\n\n",
            generics_of(ctor),
            generics_of(ctor),
            ctor.type_id,
        ));

        out.push_str(&render_predicates(&sname, ctor));
        out.push_str(&render_rw_impls(scheme, &sname, ctor));
    }

    for ty in registry.types() {
        if ty.constructor_names.len() <= 1 && scheme.optimize_single_data {
            continue;
        }
        let ename = struct_name(&ty.name);
        out.push_str(&format!("#[derive(Debug, Clone, PartialEq)]\npub enum {ename} {{\n"));
        for ctor_name in &ty.constructor_names {
            let sname = struct_name(ctor_name);
            out.push_str(&format!("    {sname}({sname}),\n"));
        }
        out.push_str("}\n\n");

        out.push_str(&format!("impl {ename} {{\n    pub fn constructor_id(&self) -> u32 {{\n        match self {{\n"));
        for ctor_name in &ty.constructor_names {
            let sname = struct_name(ctor_name);
            out.push_str(&format!(
                "            {ename}::{sname}(_) => <{sname} as tl_runtime::Identifiable>::CONSTRUCTOR_ID,\n"
            ));
        }
        out.push_str("        }\n    }\n}\n\n");

        out.push_str(&format!(
            "impl tl_runtime::Serializable for {ename} {{\n    fn serialize<W: std::io::Write>(&self, buf: &mut W) -> std::io::Result<()> {{\n        match self {{\n"
        ));
        for ctor_name in &ty.constructor_names {
            let sname = struct_name(ctor_name);
            out.push_str(&format!("            {ename}::{sname}(x) => x.serialize(buf),\n"));
        }
        out.push_str("        }\n    }\n}\n\n");

        out.push_str(&format!(
            "impl tl_runtime::Deserializable for {ename} {{\n    fn deserialize<R: std::io::Read>(buf: &mut R) -> std::io::Result<Self> {{\n        let id = u32::deserialize(buf)?;\n        match id {{\n"
        ));
        for ctor_name in &ty.constructor_names {
            let sname = struct_name(ctor_name);
            out.push_str(&format!(
                "            <{sname} as tl_runtime::Identifiable>::CONSTRUCTOR_ID => Ok({ename}::{sname}({sname}::deserialize_body(buf)?)),\n"
            ));
        }
        out.push_str(&format!(
            "            other => Err(std::io::Error::new(std::io::ErrorKind::InvalidData, format!(\"unknown constructor id {{other:#x}} for {ename}\"))),\n"
        ));
        out.push_str("        }\n    }\n}\n\n");

        let infallible = ty.is_single_constructor();
        for ctor_name in &ty.constructor_names {
            let sname = struct_name(ctor_name);
            if infallible {
                out.push_str(&format!(
                    "impl From<{ename}> for {sname} {{\n    fn from(value: {ename}) -> Self {{\n        match value {{\n            {ename}::{sname}(x) => x,\n        }}\n    }}\n}}\n\n"
                ));
            } else {
                out.push_str(&format!(
                    "impl TryFrom<{ename}> for {sname} {{\n    type Error = tl_runtime::WrongVariant;\n    fn try_from(value: {ename}) -> Result<Self, Self::Error> {{\n        match value {{\n            {ename}::{sname}(x) => Ok(x),\n            _ => Err(tl_runtime::WrongVariant),\n        }}\n    }}\n}}\n\n"
                ));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::{self, Options};

    #[test]
    fn renders_a_struct_per_constructor_and_an_enum_for_the_boxed_type() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "boolTrue#997275b5 = Bool;\nboolFalse#bc799737 = Bool;\n").unwrap();
        let outcome = compile::compile(
            &[tmp.path().to_path_buf()],
            &Scheme::default(),
            &Options { strict_crc: false },
        )
        .unwrap();
        let rendered = render(&outcome.registry, &Scheme::default());
        assert!(rendered.contains("pub struct BoolTrue"));
        assert!(rendered.contains("pub struct BoolFalse"));
        assert!(rendered.contains("pub enum Bool"));
        assert!(rendered.contains("CONSTRUCTOR_ID: u32 = 0x997275b5"));
    }

    #[test]
    fn renders_a_bitflags_block_with_max_field_for_a_constructor_with_a_flags_word() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "updateConfig flags:# has_foo:flags.0?true title:flags.1?string = Update;\n",
        )
        .unwrap();
        let outcome = compile::compile(
            &[tmp.path().to_path_buf()],
            &Scheme::default(),
            &Options { strict_crc: false },
        )
        .unwrap();
        let rendered = render(&outcome.registry, &Scheme::default());
        assert!(rendered.contains("bitflags::bitflags!"));
        assert!(rendered.contains("pub struct UpdateConfigFlags: u32"));
        assert!(rendered.contains("const HAS_FOO = 1 << 0;"));
        assert!(rendered.contains("const MAX_FIELD = 1 << 1;"));
        assert!(rendered.contains("pub flags: UpdateConfigFlags,"));
    }

    #[test]
    fn trivial_conditional_gets_an_is_present_predicate() {
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
        let rendered = render(&outcome.registry, &Scheme::default());
        assert!(rendered.contains("pub fn is_present(&self) -> bool"));
        assert!(rendered.contains("pub name: Option<String>,"));
    }

    #[test]
    fn emits_serializable_and_deserializable_with_flag_gated_fields() {
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
        let rendered = render(&outcome.registry, &Scheme::default());
        assert!(rendered.contains("impl tl_runtime::Serializable for Bar"));
        assert!(rendered.contains("if self.name.is_some() { 1u32 << 0 } else { 0 }"));
        assert!(rendered.contains("if let Some(ref x) = self.name { x.serialize(buf)?; }"));
        assert!(rendered.contains("impl tl_runtime::Deserializable for Bar"));
        assert!(rendered.contains("let present = (__raw_flags & (1 << 1)) != 0;"));
    }

    #[test]
    fn multi_constructor_enum_gets_tag_dispatch_and_try_from() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "boolTrue#997275b5 = Bool;\nboolFalse#bc799737 = Bool;\n").unwrap();
        let outcome = compile::compile(
            &[tmp.path().to_path_buf()],
            &Scheme::default(),
            &Options { strict_crc: false },
        )
        .unwrap();
        let rendered = render(&outcome.registry, &Scheme::default());
        assert!(rendered.contains("impl tl_runtime::Deserializable for Bool"));
        assert!(rendered.contains("<BoolTrue as tl_runtime::Identifiable>::CONSTRUCTOR_ID => Ok(Bool::BoolTrue(BoolTrue::deserialize_body(buf)?)),"));
        assert!(rendered.contains("impl TryFrom<Bool> for BoolTrue"));
        assert!(rendered.contains("type Error = tl_runtime::WrongVariant;"));
    }
}
