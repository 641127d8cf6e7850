//! Contact form handling.
//!
//! Messages are queued in `contact_messages`; delivery to the store mailbox
//! happens outside this service.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::instrument;

use harbor_core::{ContactMessageId, Email};

use super::{required, within_limit};
use crate::db::ContactRepository;
use crate::error::AppError;
use crate::models::NewContactMessage;

const MAX_SUBJECT_LEN: usize = 200;
const MAX_MESSAGE_LEN: usize = 5000;

/// Contact form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

impl ContactRequest {
    fn validate(self) -> Result<NewContactMessage, AppError> {
        let name = required("name", self.name)?;
        within_limit("name", &name, MAX_SUBJECT_LEN)?;
        let email = Email::parse(&required("email", self.email)?).map_err(AppError::validation)?;
        let subject = required("subject", self.subject)?;
        within_limit("subject", &subject, MAX_SUBJECT_LEN)?;
        let message = required("message", self.message)?;
        within_limit("message", &message, MAX_MESSAGE_LEN)?;

        Ok(NewContactMessage {
            name,
            email,
            subject,
            message,
        })
    }
}

/// Validate and queue a contact message.
///
/// # Errors
///
/// Returns `AppError::Validation` for blank fields or a malformed email, and
/// `AppError::Persistence` if queueing fails.
#[instrument(skip(pool, request))]
pub async fn submit_contact(
    pool: &PgPool,
    request: ContactRequest,
) -> Result<ContactMessageId, AppError> {
    let message = request.validate()?;
    let id = ContactRepository::new(pool).enqueue(&message).await?;
    tracing::info!(
        contact_message_id = %id,
        email_domain = %message.email.domain(),
        subject = %message.subject,
        "Contact message queued"
    );
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ContactRequest {
        ContactRequest {
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            subject: Some("Delivery question".to_string()),
            message: Some("When will my order ship?".to_string()),
        }
    }

    #[test]
    fn test_valid_contact() {
        let message = request().validate().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(message.email.as_str(), "ada@example.com");
    }

    #[test]
    fn test_blank_fields_rejected() {
        let mut req = request();
        req.subject = Some(" ".to_string());
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));

        let mut req = request();
        req.message = None;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_malformed_email_rejected() {
        let mut req = request();
        req.email = Some("ada@localhost".to_string());
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }
}
