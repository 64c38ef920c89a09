use crate::error::Result;

use super::builder::{add_order, QueryRef};
use super::types::QueryType;
use super::values::{IntoValue, ValueRef};

/// Sort direction; ascending renders without a keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

pub(crate) struct OrderItem {
    pub(crate) value: ValueRef,
    pub(crate) direction: Direction,
}

/// Appends `order by` entries to a query, in call order
pub struct OrderBy {
    query: QueryRef,
}

impl OrderBy {
    pub(crate) fn new(query: QueryRef) -> Self {
        Self { query }
    }

    pub fn asc<T: QueryType>(self, value: impl IntoValue<T>) -> Result<Self> {
        self.by(value, Direction::Asc)
    }

    pub fn desc<T: QueryType>(self, value: impl IntoValue<T>) -> Result<Self> {
        self.by(value, Direction::Desc)
    }

    pub fn by<T: QueryType>(self, value: impl IntoValue<T>, direction: Direction) -> Result<Self> {
        add_order(&self.query, value.into_value().node, direction)?;
        Ok(self)
    }
}
