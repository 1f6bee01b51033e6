//! Request extractors

mod auth;
mod pagination;
mod validated;

pub use auth::AuthUser;
pub use pagination::Pagination;
pub use validated::ValidatedJson;

use crate::response::ApiError;
use oficio_core::Snowflake;

/// Parse a path segment as a snowflake id
pub fn parse_id(raw: &str, name: &str) -> Result<Snowflake, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::invalid_path(format!("Invalid {name} format")))
}
