//! # Query Builder Error Types
//!
//! Build-time failures raised while assembling a query graph. Every variant is
//! reported synchronously at the point of misuse; rendering a query that was
//! built without errors never fails.

use thiserror::Error;

/// Errors raised while building or configuring a query
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Value out of scope: {message}")]
    OutOfScope { message: String },

    #[error("Malformed restriction: operator '{operator}' {message}")]
    MalformedRestriction { operator: String, message: String },

    #[error("Duplicate alias: '{alias}' is already registered in this query")]
    DuplicateAlias { alias: String },

    #[error("Invalid join: {message}")]
    InvalidJoin { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl QueryError {
    /// Create a scope violation error
    pub fn out_of_scope(message: impl Into<String>) -> Self {
        Self::OutOfScope {
            message: message.into(),
        }
    }

    /// Create a malformed restriction error
    pub fn malformed_restriction(operator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedRestriction {
            operator: operator.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate alias error
    pub fn duplicate_alias(alias: impl Into<String>) -> Self {
        Self::DuplicateAlias {
            alias: alias.into(),
        }
    }

    /// Create an invalid join error
    pub fn invalid_join(message: impl Into<String>) -> Self {
        Self::InvalidJoin {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error was caused by a value referenced outside its scope
    pub fn is_scope_violation(&self) -> bool {
        matches!(self, Self::OutOfScope { .. })
    }
}

impl From<config::ConfigError> for QueryError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
