//! Semantic intermediate representation (the object the emitters walk).
//!
//! Where `ast` names regex capture groups, `model` names what they *mean*:
//! a constructor belongs to an abstract (boxed) type, carries a resolved
//! parameter list, and optionally a response type if it's an RPC method.
//! A templated emitter walks this structure rather than building text
//! ad-hoc, mirroring the struct-per-constructor/enum-per-abstract-type
//! split used by `grammers-tl-gen`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Named(String),
    Vector(Box<Shape>),
    Flags { is64: bool },
    Conditional {
        flags_field: String,
        bit: u32,
        inner: Box<Shape>,
        trivial: bool,
    },
    TemplateVar(String),
}

impl Shape {
    pub fn rust_type(&self, qualify: impl Fn(&str) -> String) -> String {
        match self {
            Shape::Named(name) => qualify(name),
            Shape::Vector(inner) => format!("Vec<{}>", inner.rust_type(qualify)),
            Shape::Flags { is64: true } => "u64".to_string(),
            Shape::Flags { is64: false } => "u32".to_string(),
            Shape::Conditional { inner, trivial, .. } => {
                if *trivial {
                    "bool".to_string()
                } else {
                    format!("Option<{}>", inner.rust_type(qualify))
                }
            }
            Shape::TemplateVar(name) => name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub shape: Shape,
    pub nullable: bool,
    pub nullable_vector: bool,
    pub bots_only: bool,
}

#[derive(Debug, Clone)]
pub struct Constructor {
    pub original_name: String,
    /// Dots normalized to underscores, e.g. `messages.getDialogs` -> `messages_getDialogs`.
    pub name: String,
    /// The abstract (boxed) type this constructor builds, normalized the same way.
    pub type_name: String,
    pub type_id: u32,
    pub params: Vec<Param>,
    pub flags_field: Option<String>,
    pub flags64_field: Option<String>,
    pub is_method: bool,
    pub response_type: Option<String>,
    pub template_param: Option<String>,
    pub doc: String,
}

impl Constructor {
    pub fn struct_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AbstractType {
    pub name: String,
    pub original_name: String,
    pub constructor_names: Vec<String>,
    pub nullable: bool,
}

impl AbstractType {
    /// A type with a single constructor is a good candidate for the
    /// `optimizeSingleData` struct-instead-of-enum collapse.
    pub fn is_single_constructor(&self) -> bool {
        self.constructor_names.len() == 1
    }
}
