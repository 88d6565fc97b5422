use crate::models;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl From<&models::Message> for ChatMessage {
    fn from(message: &models::Message) -> Self {
        Self {
            role: message.message_type.as_str().to_string(),
            content: message.content.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessMessagesRequest {
    pub messages: Vec<ChatMessage>,
    pub user_id: i64,
    pub conversation_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl ProcessMessagesRequest {
    pub fn new(user_id: i64, conversation_id: i64, history: &[models::Message]) -> Self {
        Self {
            messages: history.iter().map(ChatMessage::from).collect(),
            user_id,
            conversation_id,
            context: None,
        }
    }
}

fn assistant() -> String {
    models::MessageType::Assistant.as_str().to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProcessMessagesResponse {
    pub message: String,
    #[serde(default = "assistant")]
    pub message_type: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}
