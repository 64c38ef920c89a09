//! Query builder tests, grouped by the part of the query they exercise.

pub mod copy;
pub mod joins;
pub mod restrictions;
pub mod scenarios;
