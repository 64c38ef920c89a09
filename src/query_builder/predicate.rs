//! Restriction predicates decide, at render time, whether a restriction is
//! emitted. A restriction whose values fail its predicate is skipped as if it
//! had never been added, which lets optional search criteria be written
//! unconditionally.

use super::values::ValueView;

/// Decides whether a restriction over a value should be rendered
pub trait RestrictionPredicate {
    fn is_value_applicable(&self, value: ValueView<'_>) -> bool;
}

impl<F> RestrictionPredicate for F
where
    F: Fn(ValueView<'_>) -> bool,
{
    fn is_value_applicable(&self, value: ValueView<'_>) -> bool {
        self(value)
    }
}

/// Skips restrictions comparing against a null literal
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreNull;

impl RestrictionPredicate for IgnoreNull {
    fn is_value_applicable(&self, value: ValueView<'_>) -> bool {
        !value.literal().is_some_and(|param| param.is_null())
    }
}

/// Skips restrictions comparing against a null literal, an empty string or
/// an empty collection
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreNullOrEmpty;

impl RestrictionPredicate for IgnoreNullOrEmpty {
    fn is_value_applicable(&self, value: ValueView<'_>) -> bool {
        if let Some(param) = value.literal() {
            return !param.is_null_or_empty();
        }
        if let Some(items) = value.collection() {
            return !items.is_empty();
        }
        true
    }
}
