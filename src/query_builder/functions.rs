//! # Functions
//!
//! Aggregates, scalar functions and `case` expressions. Every function
//! returns a [`Value`] that can be selected, grouped on, ordered by or used
//! in a restriction.
//!
//! ```rust
//! use typesafe_query::prelude::*;
//! use typesafe_query::query_builder::functions;
//!
//! # fn main() -> Result<(), QueryError> {
//! let query = TypeSafeQuery::new();
//! let person = query.from("Person");
//! let age = person.get::<i32>("age");
//! query.select(functions::max(&age))?;
//! query.select(functions::count())?;
//! assert_eq!(
//!     query.render().text,
//!     "select max(hobj1.age), count(*) from Person hobj1"
//! );
//! # Ok(())
//! # }
//! ```

use std::marker::PhantomData;
use std::rc::Rc;

use crate::error::{QueryError, Result};

use super::builder::{group_visible_from, validate_for_query, QueryRef};
use super::conditions::RestrictionsGroup;
use super::scope::reject;
use super::types::{NumericType, QueryType};
use super::values::{CaseBranch, IntoValue, Value, ValueNode, ValueRef};

/// An argument of [`function`], of any query type
pub struct FunctionArg(ValueRef);

impl<T: QueryType> From<Value<T>> for FunctionArg {
    fn from(value: Value<T>) -> Self {
        FunctionArg(value.node)
    }
}

impl<T: QueryType> From<&Value<T>> for FunctionArg {
    fn from(value: &Value<T>) -> Self {
        FunctionArg(value.node.clone())
    }
}

fn call<R: QueryType>(name: &str, distinct: bool, args: Vec<ValueRef>) -> Value<R> {
    Value::from_node(ValueNode::Function {
        name: name.to_string(),
        distinct,
        args,
    })
}

/// Call any function by name
pub fn function<R: QueryType>(name: &str, args: impl IntoIterator<Item = FunctionArg>) -> Value<R> {
    call(name, false, args.into_iter().map(|arg| arg.0).collect())
}

pub fn max<T: QueryType>(value: impl IntoValue<T>) -> Value<T> {
    call("max", false, vec![value.into_value().node])
}

pub fn min<T: QueryType>(value: impl IntoValue<T>) -> Value<T> {
    call("min", false, vec![value.into_value().node])
}

pub fn sum<T: NumericType>(value: impl IntoValue<T>) -> Value<T> {
    call("sum", false, vec![value.into_value().node])
}

pub fn avg<T: NumericType>(value: impl IntoValue<T>) -> Value<f64> {
    call("avg", false, vec![value.into_value().node])
}

pub fn abs<T: NumericType>(value: impl IntoValue<T>) -> Value<T> {
    call("abs", false, vec![value.into_value().node])
}

/// `count(*)`
pub fn count() -> Value<i64> {
    let star = Rc::new(ValueNode::Custom {
        text: "*".to_string(),
        params: Vec::new(),
    });
    call("count", false, vec![star])
}

pub fn count_of<T: QueryType>(value: impl IntoValue<T>) -> Value<i64> {
    call("count", false, vec![value.into_value().node])
}

pub fn count_distinct<T: QueryType>(value: impl IntoValue<T>) -> Value<i64> {
    call("count", true, vec![value.into_value().node])
}

pub fn upper(value: impl IntoValue<String>) -> Value<String> {
    call("upper", false, vec![value.into_value().node])
}

pub fn lower(value: impl IntoValue<String>) -> Value<String> {
    call("lower", false, vec![value.into_value().node])
}

pub fn trim(value: impl IntoValue<String>) -> Value<String> {
    call("trim", false, vec![value.into_value().node])
}

pub fn length(value: impl IntoValue<String>) -> Value<i32> {
    call("length", false, vec![value.into_value().node])
}

pub fn concat(left: impl IntoValue<String>, right: impl IntoValue<String>) -> Value<String> {
    call(
        "concat",
        false,
        vec![left.into_value().node, right.into_value().node],
    )
}

pub fn coalesce<T: QueryType>(value: impl IntoValue<T>, fallback: impl IntoValue<T>) -> Value<T> {
    call(
        "coalesce",
        false,
        vec![value.into_value().node, fallback.into_value().node],
    )
}

/// `cast(value as U)`
pub fn cast<T: QueryType, U: QueryType>(value: impl IntoValue<T>) -> Value<U> {
    value.into_value().cast()
}

/// Builds a `case` expression scoped to the query that created it
pub struct CaseBuilder<T> {
    query: QueryRef,
    branches: Vec<CaseBranch>,
    otherwise: Option<ValueRef>,
    _type: PhantomData<fn() -> T>,
}

impl<T: QueryType> CaseBuilder<T> {
    pub(crate) fn new(query: QueryRef) -> Self {
        Self {
            query,
            branches: Vec::new(),
            otherwise: None,
            _type: PhantomData,
        }
    }

    /// Add a `when <condition> then <value>` branch
    pub fn when(mut self, condition: &RestrictionsGroup, then: impl IntoValue<T>) -> Result<Self> {
        if !group_visible_from(&condition.node, &self.query) {
            return reject(
                "case_when",
                QueryError::out_of_scope(
                    "case condition belongs to a query that is not this query or an enclosing query",
                ),
            );
        }
        let then = then.into_value().node;
        validate_for_query(&self.query, "case_when", &then)?;
        self.branches.push(CaseBranch {
            when: condition.node.clone(),
            then,
        });
        Ok(self)
    }

    /// Value when no branch matches
    pub fn otherwise(mut self, value: impl IntoValue<T>) -> Result<Self> {
        let value = value.into_value().node;
        validate_for_query(&self.query, "case_when", &value)?;
        self.otherwise = Some(value);
        Ok(self)
    }

    pub fn end(self) -> Result<Value<T>> {
        if self.branches.is_empty() {
            return reject(
                "case_when",
                QueryError::malformed_restriction("case", "requires at least one when branch"),
            );
        }
        Ok(Value::from_node(ValueNode::Case {
            branches: self.branches,
            otherwise: self.otherwise,
        }))
    }
}
