//! # Query Types and Bound Parameters
//!
//! [`QueryType`] names the value categories a typed [`Value`](super::Value) may
//! carry. [`Literal`] types can also be supplied directly as Rust values, and
//! become [`Param`]s bound to placeholders in the rendered text.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use uuid::Uuid;

/// A parameter bound to a placeholder in the rendered query text
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Param {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    /// Enumerated constant, identified by name
    Enum(String),
    /// Collection bound to a single placeholder
    List(Vec<Param>),
}

impl Param {
    pub fn is_null(&self) -> bool {
        matches!(self, Param::Null)
    }

    /// Null, an empty string or an empty collection
    pub fn is_null_or_empty(&self) -> bool {
        match self {
            Param::Null => true,
            Param::Text(text) => text.is_empty(),
            Param::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Render this parameter as an inline literal
    pub fn to_literal(&self) -> String {
        let mut out = String::new();
        self.write_literal(&mut out);
        out
    }

    pub(crate) fn write_literal(&self, out: &mut String) {
        match self {
            Param::Null => out.push_str("null"),
            Param::Bool(value) => out.push_str(if *value { "true" } else { "false" }),
            Param::Int(value) => {
                let _ = write!(out, "{value}");
            }
            Param::Float(value) => {
                let _ = write!(out, "{value:?}");
            }
            Param::Text(value) | Param::Enum(value) => quote_into(value, out),
            Param::Date(value) => quote_into(&value.format("%Y-%m-%d").to_string(), out),
            Param::DateTime(value) => {
                quote_into(&value.format("%Y-%m-%d %H:%M:%S").to_string(), out)
            }
            Param::Timestamp(value) => {
                quote_into(&value.format("%Y-%m-%d %H:%M:%S").to_string(), out)
            }
            Param::Uuid(value) => quote_into(&value.to_string(), out),
            Param::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.write_literal(out);
                }
            }
        }
    }
}

fn quote_into(value: &str, out: &mut String) {
    out.push('\'');
    out.push_str(&value.replace('\'', "''"));
    out.push('\'');
}

macro_rules! param_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Param {
                fn from(value: $ty) -> Self {
                    Param::$variant(value.into())
                }
            }
        )*
    };
}

param_from! {
    bool => Bool,
    i32 => Int,
    i64 => Int,
    f64 => Float,
    String => Text,
    &str => Text,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
    DateTime<Utc> => Timestamp,
    Uuid => Uuid,
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(value: Option<T>) -> Self {
        value.map_or(Param::Null, Into::into)
    }
}

impl<T: Into<Param>> From<Vec<T>> for Param {
    fn from(values: Vec<T>) -> Self {
        Param::List(values.into_iter().map(Into::into).collect())
    }
}

/// A category of values usable in a query
pub trait QueryType: 'static {
    /// Type name emitted when a value is cast to this type
    const TYPE_NAME: &'static str;
}

/// A query type whose Rust values can be bound as parameters
pub trait Literal: QueryType + Sized {
    fn into_param(self) -> Param;
}

/// Types supporting arithmetic and numeric aggregates
pub trait NumericType: QueryType {}

/// Types supporting pattern matching and string functions
pub trait TextType: QueryType {}

/// Types supporting before/after comparisons
pub trait TemporalType: QueryType {}

/// Types with a total order, supporting range comparisons
pub trait ComparableType: QueryType {}

/// Marker for entity-valued paths, such as a join's own value
pub struct Entity;

impl QueryType for Entity {
    const TYPE_NAME: &'static str = "entity";
}

macro_rules! literal_type {
    ($ty:ty, $name:literal) => {
        impl QueryType for $ty {
            const TYPE_NAME: &'static str = $name;
        }

        impl Literal for $ty {
            fn into_param(self) -> Param {
                Param::from(self)
            }
        }
    };
}

literal_type!(bool, "boolean");
literal_type!(i32, "integer");
literal_type!(i64, "long");
literal_type!(f64, "double");
literal_type!(String, "string");
literal_type!(NaiveDate, "date");
literal_type!(NaiveDateTime, "timestamp");
literal_type!(DateTime<Utc>, "timestamp");
literal_type!(Uuid, "uuid");

impl NumericType for i32 {}
impl NumericType for i64 {}
impl NumericType for f64 {}

impl TextType for String {}

impl TemporalType for NaiveDate {}
impl TemporalType for NaiveDateTime {}
impl TemporalType for DateTime<Utc> {}

impl ComparableType for i32 {}
impl ComparableType for i64 {}
impl ComparableType for f64 {}
impl ComparableType for String {}
impl ComparableType for NaiveDate {}
impl ComparableType for NaiveDateTime {}
impl ComparableType for DateTime<Utc> {}
