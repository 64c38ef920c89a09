//! # Query Builder System
//!
//! Typed construction of object-relational queries, rendered to query text
//! plus an ordered parameter list.
//!
//! ## Overview
//!
//! A query is a graph: root entities and the joins below them, values that
//! reference those joins, restrictions grouped into where/having/with
//! clauses, and subqueries that may reference their enclosing queries.
//! Every reference is checked against the scope of the query using it when it
//! is added, so a query that was built without errors always renders.
//!
//! ## Key Components
//!
//! - [`builder`] - Root queries, subqueries and the clause writer
//! - [`values`] - Typed values, arithmetic and operator-aware values
//! - [`functions`] - Aggregates, scalar functions and `case` expressions
//! - [`conditions`] - Restrictions, groups and the restriction chain
//! - [`joins`] - Join declarations, entity handles and typed properties
//! - [`copy`] - Identity-preserving deep copy of query graphs
//! - [`templates`] - Reusable query functions and prototype templates
//! - [`pagination`] - Result windows carried with the rendered query
//!
//! ## Example Usage
//!
//! ```rust
//! use typesafe_query::prelude::*;
//!
//! # fn main() -> Result<(), QueryError> {
//! let query = TypeSafeQuery::new();
//! let person = query.from("Person");
//! let town = query.join(&person, "town")?;
//!
//! query
//!     .filter(person.get::<i32>("age"))
//!     .gt(30)?
//!     .and(town.get::<String>("name"))
//!     .eq("Lyon")?;
//!
//! let rendered = query.render();
//! assert_eq!(
//!     rendered.text,
//!     "from Person hobj1 join hobj1.town hobj2 where hobj1.age > ? and hobj2.name = ?"
//! );
//! assert_eq!(rendered.params, vec![Param::Int(30), Param::Text("Lyon".into())]);
//! # Ok(())
//! # }
//! ```

mod aliases;
pub mod builder;
pub mod conditions;
pub mod copy;
pub mod functions;
pub mod joins;
pub mod ordering;
pub mod pagination;
pub mod predicate;
pub mod render;
pub(crate) mod scope;
pub mod templates;
pub mod types;
pub mod values;

pub use builder::{QueryHandle, QueryScope, SubQuery, TypeSafeQuery};
pub use conditions::{
    Combinator, OnGoingRestriction, Operator, Restriction, RestrictionChain, RestrictionsGroup,
};
pub use copy::{CopyContext, Copyable};
pub use functions::{CaseBuilder, FunctionArg};
pub use joins::{EntityRef, JoinType, Property};
pub use ordering::{Direction, OrderBy};
pub use pagination::Pagination;
pub use predicate::{IgnoreNull, IgnoreNullOrEmpty, RestrictionPredicate};
pub use render::{QueryFragment, RenderedQuery};
pub use templates::{QueryFunction, QueryTemplate};
pub use types::{
    ComparableType, Entity, Literal, NumericType, Param, QueryType, TemporalType, TextType,
};
pub use values::{ArithmeticOp, IntoValue, Value, ValueKind, ValueView};
