//! RPC method emitter (C9): lowers `---functions---` constructors to
//! `tl_runtime::RemoteCall` impls, following the `RemoteCall` trait pattern
//! in `grammers-tl-gen`'s `structs.rs`. A generic method (one that took a
//! `{X:Type}` parameter) becomes a Rust generic `struct<X>` with its
//! `Response` associated type bound to `X`'s own response type.

use crate::config::Scheme;
use crate::tl::registry::Registry;

use super::struct_name;

pub fn render(registry: &Registry, scheme: &Scheme) -> String {
    let mut out = String::new();
    out.push_str("// Generated RPC methods. Do not edit by hand.\n\n");

    for ctor in registry.constructors() {
        if !ctor.is_method {
            continue;
        }
        let sname = struct_name(&ctor.name);
        let response_ty = ctor
            .response_type
            .as_deref()
            .map(struct_name)
            .unwrap_or_else(|| "()".to_string());

        match &ctor.template_param {
            Some(t) => {
                out.push_str(&format!(
                    "impl<{t}: tl_runtime::RemoteCall> tl_runtime::RemoteCall for {sname}<{t}> {{\n"
                ));
                out.push_str(&format!("    type Response = {t}::Response;\n}}\n\n"));
            }
            None => {
                out.push_str(&format!("impl tl_runtime::RemoteCall for {sname} {{\n"));
                out.push_str(&format!("    type Response = {response_ty};\n}}\n\n"));
            }
        }
    }

    let _ = scheme;
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::{self, Options};

    #[test]
    fn renders_remote_call_for_a_plain_method() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "pong msg_id:long ping_id:long = Pong;\n---functions---\nping ping_id:long = Pong;\n",
        )
        .unwrap();
        let outcome = compile::compile(
            &[tmp.path().to_path_buf()],
            &Scheme::default(),
            &Options { strict_crc: false },
        )
        .unwrap();
        let rendered = render(&outcome.registry, &Scheme::default());
        assert!(rendered.contains("impl tl_runtime::RemoteCall for Ping"));
        assert!(rendered.contains("type Response = Pong;"));
    }
}
