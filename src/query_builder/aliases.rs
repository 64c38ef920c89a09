//! Alias registry shared by a root query and all of its subqueries, so
//! generated aliases follow one sequence and custom aliases stay unique
//! across the whole tree.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::error::{QueryError, Result};

use super::copy::{CopyContext, DeepCopy};

pub(crate) type AliasRegistryRef = Rc<RefCell<AliasRegistry>>;

#[derive(Debug, Clone)]
pub(crate) struct AliasRegistry {
    prefix: String,
    next: u32,
    used: HashSet<String>,
}

impl AliasRegistry {
    pub(crate) fn new_ref(prefix: &str) -> AliasRegistryRef {
        Rc::new(RefCell::new(AliasRegistry {
            prefix: prefix.to_string(),
            next: 0,
            used: HashSet::new(),
        }))
    }

    /// Next `{prefix}{n}` alias not already taken
    pub(crate) fn generate(&mut self) -> String {
        loop {
            self.next += 1;
            let alias = format!("{}{}", self.prefix, self.next);
            if self.used.insert(alias.clone()) {
                return alias;
            }
        }
    }

    /// Reserve a caller-chosen alias
    pub(crate) fn claim(&mut self, alias: &str) -> Result<()> {
        if !is_identifier(alias) {
            return Err(QueryError::invalid_join(format!(
                "'{alias}' is not a valid alias"
            )));
        }
        if !self.used.insert(alias.to_string()) {
            return Err(QueryError::duplicate_alias(alias));
        }
        Ok(())
    }

    pub(crate) fn release(&mut self, alias: &str) {
        self.used.remove(alias);
    }
}

fn is_identifier(alias: &str) -> bool {
    let mut chars = alias.chars();
    matches!(chars.next(), Some(first) if first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

impl DeepCopy for AliasRegistryRef {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        if let Some(existing) = ctx.lookup(self) {
            return existing;
        }
        let clone = Rc::new(RefCell::new(self.borrow().clone()));
        ctx.register(self, &clone);
        clone
    }
}
