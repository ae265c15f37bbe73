//! Raw declaration AST: the untyped shapes `grammar` extracts straight out
//! of a schema line, before `analyzer`/`registry` attach any cross-reference
//! or comment-tag semantics.
//!
//! Grounded in the capture groups of `generate_tl.py`'s two master regexes
//! (the whole-line `nametype` match and the per-parameter `pnametype`
//! match): this module names those groups instead of re-deriving them from
//! a regex each time they're needed.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDecl {
    pub original_name: String,
    /// Hex digits after `#`, if the declaration spelled out an explicit id.
    /// Leading zeros are preserved here; `crc` strips them before comparing.
    pub type_id: Option<String>,
    pub params_text: String,
    pub result_text: String,
}

/// The shape of a single parameter's type, before nullability/vector-ness
/// from comment tags is folded in by `analyzer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamShape {
    /// The bare `#` flags-word parameter.
    FlagsWord,
    /// `!X` — this parameter carries the method's own generic argument type.
    TemplateArg(String),
    /// `flagsname.N?Type` — present only when bit `N` of `flagsname` is set.
    Conditional {
        flags_name: String,
        bit: u32,
        inner: String,
    },
    /// An ordinary type reference, e.g. `int`, `Vector<Foo>`, `ns.Bar`.
    Plain(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParam {
    pub name: String,
    pub shape: ParamShape,
}

/// One token from a declaration's parameter list: either the `{X:Type}`
/// generic-parameter declaration, or an ordinary named parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamToken {
    TemplateDecl(String),
    Param(RawParam),
}
