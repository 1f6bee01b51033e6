//! Pagination extractor
//!
//! Cursor-based pagination parameters from query strings.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use oficio_core::traits::MessagePage;
use oficio_core::Snowflake;
use serde::Deserialize;

use crate::response::ApiError;

/// Default page size
const DEFAULT_LIMIT: i64 = 50;
/// Maximum page size
const MAX_LIMIT: i64 = 100;

/// Raw pagination query parameters
#[derive(Debug, Deserialize)]
struct PaginationParams {
    #[serde(default)]
    before: Option<String>,
    #[serde(default)]
    after: Option<String>,
    #[serde(default)]
    limit: Option<i64>,
}

/// Validated pagination parameters
#[derive(Debug, Clone)]
pub struct Pagination {
    pub before: Option<Snowflake>,
    pub after: Option<Snowflake>,
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            before: None,
            after: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl From<Pagination> for MessagePage {
    fn from(p: Pagination) -> Self {
        MessagePage {
            before: p.before,
            after: p.after,
            limit: p.limit,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PaginationParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_body(e.to_string()))?;

        let parse = |raw: Option<String>, name: &str| -> Result<Option<Snowflake>, ApiError> {
            raw.map(|s| {
                s.parse()
                    .map_err(|_| ApiError::invalid_path(format!("Invalid {name} cursor")))
            })
            .transpose()
        };

        Ok(Self {
            before: parse(params.before, "before")?,
            after: parse(params.after, "after")?,
            limit: params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        })
    }
}
