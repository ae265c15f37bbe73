//! Type registry (C6): the insertion-order-preserving index of every
//! abstract type and constructor seen so far.
//!
//! Built as `Vec` + `HashMap<String, usize>` rather than pulling in
//! `indexmap`: the access pattern (append during parsing, iterate in
//! declaration order during emission, look up by name for cross-references)
//! is exactly what a hand-rolled index over a `Vec` gives for free.

use std::collections::HashMap;

use super::model::{AbstractType, Constructor};
use crate::error::GenError;

#[derive(Default, Debug)]
pub struct Registry {
    constructors: Vec<Constructor>,
    constructor_index: HashMap<String, usize>,
    types: Vec<AbstractType>,
    type_index: HashMap<String, usize>,
    ids: HashMap<u32, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_type(&mut self, name: &str, original_name: &str) -> usize {
        if let Some(&idx) = self.type_index.get(name) {
            return idx;
        }
        let idx = self.types.len();
        self.types.push(AbstractType {
            name: name.to_string(),
            original_name: original_name.to_string(),
            constructor_names: Vec::new(),
            nullable: false,
        });
        self.type_index.insert(name.to_string(), idx);
        idx
    }

    pub fn insert_constructor(&mut self, ctor: Constructor) -> Result<(), GenError> {
        if let Some(existing) = self.ids.get(&ctor.type_id) {
            if existing != &ctor.original_name {
                return Err(GenError::DuplicateId {
                    id: ctor.type_id,
                    first: existing.clone(),
                    second: ctor.original_name.clone(),
                });
            }
        } else {
            self.ids.insert(ctor.type_id, ctor.original_name.clone());
        }

        let type_idx = self.register_type(&ctor.type_name, &ctor.type_name);
        self.types[type_idx].constructor_names.push(ctor.name.clone());

        let idx = self.constructors.len();
        self.constructor_index.insert(ctor.name.clone(), idx);
        self.constructors.push(ctor);
        Ok(())
    }

    pub fn constructor(&self, name: &str) -> Option<&Constructor> {
        self.constructor_index.get(name).map(|&i| &self.constructors[i])
    }

    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    pub fn types(&self) -> &[AbstractType] {
        &self.types
    }

    pub fn find_type(&self, name: &str) -> Option<&AbstractType> {
        self.type_index.get(name).map(|&i| &self.types[i])
    }

    pub fn mark_nullable(&mut self, name: &str) {
        if let Some(&idx) = self.type_index.get(name) {
            self.types[idx].nullable = true;
        }
    }

    /// Mirrors `handleTemplate`'s fallback scan: a bare vector element type
    /// that isn't itself a known constructor name is looked up against
    /// every abstract type's constructor list to find the one it "owns".
    pub fn resolve_meta_type(&self, bare_constructor_name: &str) -> Option<&str> {
        self.types
            .iter()
            .find(|t| t.constructor_names.iter().any(|c| c == bare_constructor_name))
            .map(|t| t.name.as_str())
    }
}
