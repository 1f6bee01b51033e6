//! PostgreSQL-backed IdentityGate

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, instrument};

use oficio_core::error::DomainError;
use oficio_core::traits::IdentityGate;
use oficio_core::value_objects::Snowflake;

use super::error::map_db_error;

/// Stores the payer identity documents the payment flow is gated on
#[derive(Clone)]
pub struct PgIdentityGate {
    pool: PgPool,
}

impl PgIdentityGate {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityGate for PgIdentityGate {
    #[instrument(skip(self))]
    async fn has_on_file_identity(&self, user_id: Snowflake) -> Result<bool, DomainError> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (SELECT 1 FROM identity_documents WHERE user_id = $1)
            "#,
        )
        .bind(user_id.get())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(exists)
    }

    #[instrument(skip(self, document))]
    async fn collect_identity(
        &self,
        user_id: Snowflake,
        document: &str,
    ) -> Result<(), DomainError> {
        let digits: String = document.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != 11 {
            return Err(DomainError::ValidationError(
                "identity document must have 11 digits".to_string(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO identity_documents (user_id, document, collected_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET document = EXCLUDED.document, collected_at = NOW()
            "#,
        )
        .bind(user_id.get())
        .bind(&digits)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        info!(user_id = %user_id, "Identity document collected");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgIdentityGate>();
    }
}
