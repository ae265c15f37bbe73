//! Scheme configuration (C1): the user-supplied settings that steer naming,
//! namespaces, exceptions and which optional emitters run.
//!
//! Mirrors the `scheme` dict `generate_tl.py` is invoked with. Every field
//! has a serde default so a partial (or absent) config file still yields a
//! usable scheme.

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Prefixes {
    pub data: String,
    pub r#type: String,
    pub id: String,
    pub construct: String,
}

impl Default for Prefixes {
    fn default() -> Self {
        Self {
            data: String::new(),
            r#type: String::new(),
            id: "mtp".to_string(),
            construct: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Namespaces {
    pub global: String,
    pub creator: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrimitiveTypes {
    pub type_id: String,
    pub prime: String,
    pub buffer: String,
}

impl Default for PrimitiveTypes {
    fn default() -> Self {
        Self {
            type_id: "u32".to_string(),
            prime: "u32".to_string(),
            buffer: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Conversion {
    pub include: String,
    pub namespace: String,
    pub builtin_additional: Vec<String>,
    pub builtin_include_from: String,
    pub builtin_include_to: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DumpToText {
    pub include: String,
}

/// The full scheme configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Scheme {
    pub prefixes: Prefixes,
    pub namespaces: Namespaces,
    pub flag_inheritance: HashMap<String, String>,
    pub type_id_exceptions: Vec<String>,
    pub renamed_types: HashMap<String, String>,
    pub skip: Vec<String>,
    pub builtin: Vec<String>,
    pub builtin_templates: Vec<String>,
    pub builtin_include: String,
    pub nullable: Vec<String>,
    pub synonyms: HashMap<String, String>,
    pub sections: Vec<String>,
    pub types: PrimitiveTypes,
    pub conversion: Option<Conversion>,
    pub dump_to_text: Option<DumpToText>,
    pub optimize_single_data: bool,
}

impl Default for Scheme {
    fn default() -> Self {
        Self {
            prefixes: Prefixes::default(),
            namespaces: Namespaces::default(),
            flag_inheritance: HashMap::new(),
            type_id_exceptions: Vec::new(),
            renamed_types: HashMap::new(),
            skip: Vec::new(),
            builtin: default_builtins(),
            builtin_templates: vec!["vector".to_string()],
            builtin_include: String::new(),
            nullable: Vec::new(),
            synonyms: HashMap::new(),
            sections: vec!["read-write".to_string()],
            types: PrimitiveTypes::default(),
            conversion: None,
            dump_to_text: None,
            optimize_single_data: false,
        }
    }
}

fn default_builtins() -> Vec<String> {
    [
        "int", "long", "double", "string", "bytes", "bool", "true", "int128", "int256",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl Scheme {
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn read_write_section(&self) -> bool {
        self.sections.iter().any(|s| s == "read-write")
    }

    pub fn write_conversion(&self) -> bool {
        self.conversion.is_some()
    }

    pub fn write_dump(&self) -> bool {
        self.dump_to_text.is_some()
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtin.iter().any(|b| b == name) || self.builtin_templates.iter().any(|b| b == name)
    }
}
