//! Shared constants for query rendering and configuration.

/// Prefix of auto-generated entity aliases (`hobj1`, `hobj2`, ...)
pub const DEFAULT_ALIAS_PREFIX: &str = "hobj";

/// Prefix of environment variables read by [`crate::config::RenderConfig::from_env`]
pub const ENV_PREFIX: &str = "TSQB";

/// Wildcard appended or prepended by the text pattern restrictions
pub const LIKE_WILDCARD: char = '%';

/// Positional placeholder emitted for every bound parameter
pub const PLACEHOLDER: char = '?';

/// Query language keywords emitted by the renderer
pub mod keywords {
    pub const SELECT: &str = "select";
    pub const DISTINCT: &str = "distinct";
    pub const FROM: &str = "from";
    pub const WHERE: &str = "where";
    pub const GROUP_BY: &str = "group by";
    pub const HAVING: &str = "having";
    pub const ORDER_BY: &str = "order by";
    pub const WITH: &str = "with";
    pub const AS: &str = "as";
    pub const AND: &str = "and";
    pub const OR: &str = "or";
    pub const DESC: &str = "desc";
    pub const CASE: &str = "case";
    pub const WHEN: &str = "when";
    pub const THEN: &str = "then";
    pub const ELSE: &str = "else";
    pub const END: &str = "end";
    pub const CAST: &str = "cast";
    pub const NULL: &str = "null";
}
