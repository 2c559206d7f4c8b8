//! Common API types and utilities

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Generic acknowledgement body used by mutation endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct SimpleOk {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl SimpleOk {
    pub fn new() -> Self {
        Self {
            ok: true,
            data: None,
        }
    }

    pub fn with_data(data: serde_json::Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
        }
    }
}

impl Default for SimpleOk {
    fn default() -> Self {
        Self::new()
    }
}

/// Offset/limit pagination for list endpoints.
///
/// The limit ceiling is enforced at the boundary; anything above it is a
/// validation failure rather than a silent clamp.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

pub const MAX_PAGE_LIMIT: usize = 200;

fn default_limit() -> usize {
    50
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl PageParams {
    /// Apply this page window to an already-fetched row set.
    ///
    /// The remote store query is unpaginated (no query pushdown); slicing
    /// happens in-process, which is acceptable at small data volumes.
    pub fn slice<T>(&self, rows: Vec<T>) -> Vec<T> {
        rows.into_iter()
            .skip(self.offset)
            .take(self.limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_offset_and_limit() {
        let page = PageParams {
            limit: 2,
            offset: 1,
        };
        assert_eq!(page.slice(vec![1, 2, 3, 4]), vec![2, 3]);
    }

    #[test]
    fn defaults_are_50_and_0() {
        let page = PageParams::default();
        assert_eq!(page.limit, 50);
        assert_eq!(page.offset, 0);
    }
}
