#![allow(clippy::doc_markdown)] // Allow technical terms like HQL, JPQL in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear
#![allow(clippy::should_implement_trait)] // `from`, `eq` and friends are query verbs, not std traits

//! # Typesafe Query
//!
//! Typed builder for object-relational queries.
//!
//! ## Overview
//!
//! Queries are assembled from typed values instead of strings: entity
//! declarations and joins, restrictions combined into `and`/`or` groups,
//! selections, aggregates and correlated subqueries. Each step is checked
//! when it is taken, so references to entities that a query cannot see are
//! rejected at the call that introduces them. A finished query renders to
//! query text with `?` placeholders and the parameters bound to them, in
//! text order.
//!
//! ## Module Organization
//!
//! - [`query_builder`] - Query graph, restrictions, rendering and deep copy
//! - [`config`] - Render configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//! - [`constants`] - Keywords and defaults
//!
//! ## Quick Start
//!
//! ```rust
//! use typesafe_query::prelude::*;
//!
//! # fn main() -> Result<(), QueryError> {
//! let query = TypeSafeQuery::new();
//! let person = query.from("Person");
//! let children = query.join_with(&person, "children", JoinType::Left)?;
//!
//! query.select(&person)?;
//! query
//!     .filter(children.get::<i32>("age"))
//!     .lt(12)?
//!     .or(person.get::<String>("name"))
//!     .starts_with("A")?;
//!
//! let rendered = query.render();
//! assert_eq!(
//!     rendered.text,
//!     "select hobj1 from Person hobj1 left join hobj1.children hobj2 \
//!      where hobj2.age < ? or hobj1.name like ?"
//! );
//! assert_eq!(rendered.params.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! Unit tests live next to the code they cover; integration and property
//! tests are under `tests/`.

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod query_builder;

pub use config::RenderConfig;
pub use error::{QueryError, Result};

/// Everything needed to build and render queries
pub mod prelude {
    pub use crate::config::RenderConfig;
    pub use crate::error::QueryError;
    pub use crate::query_builder::{
        CopyContext, Copyable, Direction, Entity, EntityRef, IgnoreNull, IgnoreNullOrEmpty,
        IntoValue, JoinType, Operator, Param, Property, QueryFunction, QueryScope, QueryTemplate,
        QueryType, RenderedQuery, RestrictionsGroup, SubQuery, TypeSafeQuery, Value,
    };
}
