//! Contact form types.

use harbor_core::Email;

/// A validated contact form submission.
#[derive(Debug, Clone)]
pub struct NewContactMessage {
    pub name: String,
    pub email: Email,
    pub subject: String,
    pub message: String,
}
