//! Flag-inheritance checker (C7).
//!
//! Some constructors share a `flags` word by convention with a "parent"
//! constructor named in the scheme's `flagInheritance` map (e.g.
//! `channelForbidden` extends `channel`). This does not require the two to
//! declare identical flag sets — a child may carry a field the parent
//! doesn't. It only requires that wherever they *do* share a flag name, it
//! sits on the same bit. A flag the parent doesn't have yet is folded into
//! its map rather than rejected (one-way extension), matching
//! `generate_tl.py`'s `parentFlagsCheck` loop exactly, comment and all:
//! "as long as flags don't collide this is not a problem."

use std::collections::HashMap;

use crate::error::GenError;

#[derive(Default)]
pub struct FlagChecker {
    bits_by_constructor: HashMap<String, HashMap<String, u32>>,
}

impl FlagChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, constructor_name: &str, flag_bits: HashMap<String, u32>) {
        self.bits_by_constructor
            .entry(constructor_name.to_string())
            .or_default()
            .extend(flag_bits);
    }

    /// Applies every `child -> parent` relationship in `inheritance`,
    /// erroring on a genuine bit collision and otherwise extending the
    /// parent's flag map with whatever the child introduces.
    pub fn check(&mut self, inheritance: &HashMap<String, String>) -> Result<(), GenError> {
        for (child, parent) in inheritance {
            let Some(child_flags) = self.bits_by_constructor.get(child).cloned() else {
                continue;
            };
            let parent_flags = self.bits_by_constructor.entry(parent.clone()).or_default();

            for (flag, child_bit) in child_flags {
                match parent_flags.get(&flag) {
                    Some(&parent_bit) if parent_bit != child_bit => {
                        return Err(GenError::FlagInheritanceMismatch {
                            flag,
                            child: child.clone(),
                            parent: parent.clone(),
                            child_bit: child_bit as u8,
                            parent_bit: parent_bit as u8,
                        });
                    }
                    Some(_) => {}
                    None => {
                        parent_flags.insert(flag, child_bit);
                    }
                }
            }
        }
        Ok(())
    }
}
