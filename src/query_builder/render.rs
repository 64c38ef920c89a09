//! # Rendering
//!
//! A single [`RenderContext`] is threaded through a query graph: each node
//! appends its text and pushes its parameters in the order their placeholders
//! appear. Literal mode is scoped, so a node asked to inline its literals
//! restores the previous mode before returning.

use crate::config::{PlaceholderStyle, RenderConfig};
use crate::constants::PLACEHOLDER;
use crate::error::{QueryError, Result};
use serde::Serialize;

use super::types::Param;

/// Text and ordered parameters produced by rendering part of a query
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct QueryFragment {
    pub text: String,
    pub params: Vec<Param>,
}

/// A fully rendered query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedQuery {
    pub text: String,
    pub params: Vec<Param>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_result: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

impl RenderedQuery {
    /// Serialize text, parameters and pagination for hand-off to an executor
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

/// Accumulates query text and parameters during a render pass
pub struct RenderContext<'a> {
    config: &'a RenderConfig,
    text: String,
    params: Vec<Param>,
    require_literals: bool,
}

impl<'a> RenderContext<'a> {
    pub(crate) fn new(config: &'a RenderConfig) -> Self {
        Self {
            config,
            text: String::new(),
            params: Vec::new(),
            require_literals: false,
        }
    }

    pub(crate) fn config(&self) -> &RenderConfig {
        self.config
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Bind a parameter, or inline it when literals are required
    pub(crate) fn push_param(&mut self, param: &Param) {
        if self.require_literals {
            param.write_literal(&mut self.text);
            return;
        }
        self.params.push(param.clone());
        self.push_placeholder();
    }

    fn push_placeholder(&mut self) {
        self.text.push(PLACEHOLDER);
        if self.config.placeholder_style == PlaceholderStyle::Numbered {
            self.text.push_str(&self.params.len().to_string());
        }
    }

    /// Append custom text, substituting each `?` outside a quoted string with
    /// the next parameter. Fragments are checked by [`check_fragment`] when
    /// they enter the graph, so placeholders and parameters pair up.
    pub(crate) fn push_fragment(&mut self, text: &str, params: &[Param]) {
        let mut remaining = params.iter();
        let mut in_quotes = false;
        for ch in text.chars() {
            match ch {
                '\'' => {
                    in_quotes = !in_quotes;
                    self.text.push(ch);
                }
                PLACEHOLDER if !in_quotes => match remaining.next() {
                    Some(param) => self.push_param(param),
                    None => self.text.push(ch),
                },
                _ => self.text.push(ch),
            }
        }
    }

    /// Run `f` with literal mode enabled, restoring the previous mode after
    pub(crate) fn with_literals<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = std::mem::replace(&mut self.require_literals, true);
        let result = f(self);
        self.require_literals = previous;
        result
    }

    pub(crate) fn finish(self) -> QueryFragment {
        QueryFragment {
            text: self.text,
            params: self.params,
        }
    }
}

/// Number of `?` placeholders outside quoted strings
pub(crate) fn count_placeholders(text: &str) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for ch in text.chars() {
        match ch {
            '\'' => in_quotes = !in_quotes,
            PLACEHOLDER if !in_quotes => count += 1,
            _ => {}
        }
    }
    count
}

/// Reject custom text whose placeholders and parameters do not pair up
pub(crate) fn check_fragment(text: &str, params: &[Param]) -> Result<()> {
    let placeholders = count_placeholders(text);
    if placeholders != params.len() {
        return Err(QueryError::malformed_restriction(
            "custom",
            format!(
                "has {placeholders} placeholder(s) but {} parameter(s)",
                params.len()
            ),
        ));
    }
    Ok(())
}

/// Nodes that append themselves to a render pass
pub(crate) trait WriteQuery {
    fn write_query(&self, ctx: &mut RenderContext<'_>);
}
