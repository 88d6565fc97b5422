use crate::models;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

fn user() -> models::MessageType {
    models::MessageType::User
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MessageForm {
    #[validate(min_length = 1)]
    pub content: String,
    #[serde(default = "user")]
    pub message_type: models::MessageType,
}

impl MessageForm {
    pub fn into_message(self, user_id: i64, conversation_id: i64) -> models::Message {
        models::Message::draft(conversation_id, user_id, self.content, self.message_type)
    }
}

/// Only the content of a message can be edited. A `message_type` may be echoed
/// back by clients but must match the stored one.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MessageUpdateForm {
    #[validate(min_length = 1)]
    pub content: String,
    #[serde(default)]
    pub message_type: Option<models::MessageType>,
}

impl MessageUpdateForm {
    pub fn check_type(&self, stored: models::MessageType) -> Result<(), String> {
        match self.message_type {
            Some(requested) if requested != stored => Err(format!(
                "message type cannot change from {stored} to {requested}"
            )),
            _ => Ok(()),
        }
    }
}
