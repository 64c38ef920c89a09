//! # Reusable Query Functions
//!
//! A [`QueryFunction`] adds a reusable set of entities and restrictions to a
//! query. A [`QueryTemplate`] keeps a prototype query and hands out deep
//! copies of it, so a base query is built once and specialized many times.

use crate::config::RenderConfig;
use crate::error::Result;

use super::builder::TypeSafeQuery;
use super::copy::{CopyContext, Copyable};

/// A reusable step applied to a query
pub trait QueryFunction {
    fn apply(&self, query: &TypeSafeQuery) -> Result<()>;
}

impl<F> QueryFunction for F
where
    F: Fn(&TypeSafeQuery) -> Result<()>,
{
    fn apply(&self, query: &TypeSafeQuery) -> Result<()> {
        self(query)
    }
}

/// A prototype query copied for every use
pub struct QueryTemplate {
    prototype: TypeSafeQuery,
}

impl QueryTemplate {
    pub fn new(prototype: TypeSafeQuery) -> Self {
        Self { prototype }
    }

    /// Build the prototype by applying `function` to an empty query
    pub fn from_function(config: RenderConfig, function: &impl QueryFunction) -> Result<Self> {
        let prototype = TypeSafeQuery::with_config(config);
        function.apply(&prototype)?;
        Ok(Self::new(prototype))
    }

    pub fn prototype(&self) -> &TypeSafeQuery {
        &self.prototype
    }

    /// An independent copy of the prototype
    pub fn instantiate(&self) -> TypeSafeQuery {
        self.prototype.deep_clone()
    }

    /// Copy the prototype through `ctx`, so handles into the prototype can
    /// be mapped onto the copy with [`CopyContext::get`]
    pub fn instantiate_with(&self, ctx: &mut CopyContext) -> TypeSafeQuery {
        ctx.copy(&self.prototype)
    }
}
