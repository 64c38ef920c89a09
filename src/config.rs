//! # Render Configuration
//!
//! Settings that shape the rendered query text: alias generation, placeholder
//! syntax, and the literal-inlining policy applied to cast comparisons.
//!
//! Configuration is layered with the `config` crate: built-in defaults, then an
//! optional file (any format the `config` crate understands), then `TSQB_*`
//! environment variables.
//!
//! ```rust,no_run
//! use typesafe_query::config::RenderConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RenderConfig::load("config/query.toml")?;
//! assert!(!config.alias_prefix.is_empty());
//! # Ok(())
//! # }
//! ```

use crate::constants::{DEFAULT_ALIAS_PREFIX, ENV_PREFIX};
use crate::error::{QueryError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// How bound parameters appear in the rendered text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// Every parameter renders as `?`
    #[default]
    Positional,
    /// Parameters render as `?1`, `?2`, ... in text order
    Numbered,
}

/// When a restriction compares against a cast value, whether the opposite
/// side is rendered as inline literals instead of bound parameters.
///
/// Some execution engines reject a bound parameter whose type differs from the
/// declared type of the compared path, even when the database would accept it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastLiteralPolicy {
    /// Inline the literals opposite a cast value
    #[default]
    InlineOpposite,
    /// Always bind parameters
    Never,
}

/// Rendering settings captured by a query at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Prefix for auto-generated entity aliases
    pub alias_prefix: String,
    pub placeholder_style: PlaceholderStyle,
    pub cast_literal_policy: CastLiteralPolicy,
    /// Emit the complete rendered text at debug level
    pub log_rendered_queries: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            alias_prefix: DEFAULT_ALIAS_PREFIX.to_string(),
            placeholder_style: PlaceholderStyle::Positional,
            cast_literal_policy: CastLiteralPolicy::InlineOpposite,
            log_rendered_queries: false,
        }
    }
}

impl RenderConfig {
    /// Load configuration from defaults and `TSQB_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::build(None)
    }

    /// Load configuration from a file, with `TSQB_*` environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::build(Some(path.as_ref()))
    }

    fn build(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default("alias_prefix", defaults.alias_prefix)?
            .set_default("placeholder_style", "positional")?
            .set_default("cast_literal_policy", "inline_opposite")?
            .set_default("log_rendered_queries", defaults.log_rendered_queries)?;

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading render configuration file");
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;

        debug!(
            alias_prefix = %config.alias_prefix,
            placeholder_style = ?config.placeholder_style,
            cast_literal_policy = ?config.cast_literal_policy,
            "Render configuration loaded"
        );
        Ok(config)
    }

    /// Reject settings that would produce unparseable query text
    pub fn validate(&self) -> Result<()> {
        let mut chars = self.alias_prefix.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
            _ => {
                return Err(QueryError::configuration(format!(
                    "alias_prefix '{}' must start with a letter or underscore",
                    self.alias_prefix
                )))
            }
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(QueryError::configuration(format!(
                "alias_prefix '{}' may only contain letters, digits and underscores",
                self.alias_prefix
            )));
        }
        Ok(())
    }
}
