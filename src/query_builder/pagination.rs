use serde::Serialize;

/// Result window of a query, handed to the executor with the rendered text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub first_result: Option<u32>,
    pub max_results: Option<u32>,
}

impl Pagination {
    /// Create pagination with page number (1-indexed) and per-page count.
    /// An offset past `u32::MAX` is clamped to it.
    pub fn new(page: u32, per_page: u32) -> Self {
        let first_result = if page > 0 {
            Some((page - 1).saturating_mul(per_page))
        } else {
            None
        };
        Self {
            first_result,
            max_results: Some(per_page),
        }
    }
}
