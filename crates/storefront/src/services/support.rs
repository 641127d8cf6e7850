//! Support assistant conversations.
//!
//! The client keeps the conversation and sends it whole on every turn. The
//! server only validates it, adds a system prompt describing the store and
//! forwards it to the model.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use harbor_core::Category;

use super::within_limit;
use crate::claude::{ClaudeClient, Message, Role};
use crate::config::StorefrontConfig;
use crate::error::AppError;

/// Most messages accepted in one conversation.
pub const MAX_MESSAGES: usize = 20;
/// Longest accepted message, in characters.
pub const MAX_MESSAGE_LEN: usize = 2000;

pub const TRACKING_PATH: &str = "/track";
pub const CONTACT_PATH: &str = "/contact";
pub const ABOUT_PATH: &str = "/about";

/// Chat request as sent by the widget.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Check a conversation and drop leading assistant turns (the widget's
/// greeting), since the model expects the user to speak first.
fn validate_history(messages: Vec<Message>) -> Result<Vec<Message>, AppError> {
    if messages.len() > MAX_MESSAGES {
        return Err(AppError::Validation(format!(
            "conversation is limited to {MAX_MESSAGES} messages"
        )));
    }

    let messages: Vec<Message> = messages
        .into_iter()
        .skip_while(|m| m.role == Role::Assistant)
        .map(|m| Message {
            role: m.role,
            content: m.content.trim().to_string(),
        })
        .collect();

    for message in &messages {
        if message.content.is_empty() {
            return Err(AppError::Validation("messages cannot be blank".to_string()));
        }
        within_limit("message", &message.content, MAX_MESSAGE_LEN)?;
    }

    match messages.last() {
        Some(last) if last.role == Role::User => {}
        Some(_) => {
            return Err(AppError::Validation(
                "the last message must come from the user".to_string(),
            ));
        }
        None => {
            return Err(AppError::Validation("messages cannot be empty".to_string()));
        }
    }

    Ok(messages)
}

/// System prompt describing the store, its pages and the assistant's limits.
#[must_use]
pub fn system_prompt(config: &StorefrontConfig) -> String {
    let store = &config.store;
    let mut prompt = format!(
        "You are the customer support assistant for {name}, an online store.\n\
         Answer questions about products, ordering, payment, delivery tracking and \
         how to get in touch. Be concise and friendly, and use Markdown.\n\n\
         Store information:\n\
         - Support email: {email}\n\
         - Order tracking: {tracking}\n\
         - Contact page: {contact}\n\
         - About page: {about}\n\
         - Payment is by bank transfer or bitcoin; instructions are shown after checkout.\n\
         - Shipping is free on orders over {threshold}, otherwise {fee}.\n\n\
         Categories:\n",
        name = store.name,
        email = store.support_email,
        tracking = config.page_url(TRACKING_PATH),
        contact = config.page_url(CONTACT_PATH),
        about = config.page_url(ABOUT_PATH),
        threshold = config.shipping.free_threshold,
        fee = config.shipping.flat_fee,
    );
    let categories = Category::ALL
        .iter()
        .map(|category| {
            format!(
                "- {}: {}",
                category.as_str(),
                config.page_url(&category.page_path())
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    prompt.push_str(&categories);
    prompt.push_str(
        "\n\nIf a customer asks about an order, send them to the tracking page. \
         If they need a person, point them to the contact page or the support email. \
         Never invent order details, prices or policies you were not given.",
    );
    prompt
}

/// Answer the latest user message in a conversation.
///
/// # Errors
///
/// Returns `AppError::AssistantUnavailable` when no client is configured,
/// `AppError::Validation` for a malformed conversation and
/// `AppError::Assistant` when the provider fails.
#[instrument(skip_all, fields(messages = request.messages.len()))]
pub async fn chat(
    client: Option<&ClaudeClient>,
    config: &StorefrontConfig,
    request: ChatRequest,
) -> Result<ChatReply, AppError> {
    let client = client.ok_or(AppError::AssistantUnavailable)?;
    let messages = validate_history(request.messages)?;
    let reply = client.reply(messages, Some(system_prompt(config))).await?;
    Ok(ChatReply { reply })
}
