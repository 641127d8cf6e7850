//! Contact message queue.

use sqlx::PgPool;
use tracing::instrument;

use harbor_core::ContactMessageId;

use super::RepositoryError;
use crate::models::NewContactMessage;

/// Repository for queued contact messages.
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Queue a message for the mailbox forwarder.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, message), fields(email_domain = %message.email.domain()))]
    pub async fn enqueue(
        &self,
        message: &NewContactMessage,
    ) -> Result<ContactMessageId, RepositoryError> {
        let id = sqlx::query_scalar(
            r"
            INSERT INTO contact_messages (name, email, subject, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.subject)
        .bind(&message.message)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }
}
