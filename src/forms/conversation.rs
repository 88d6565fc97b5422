use crate::models;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

fn active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConversationForm {
    #[validate(min_length = 1)]
    #[validate(max_length = 255)]
    pub title: String,
    #[serde(default = "active")]
    pub is_active: bool,
}

impl ConversationForm {
    pub fn into_conversation(self, user_id: i64) -> models::Conversation {
        models::Conversation {
            user_id,
            title: self.title,
            is_active: self.is_active,
            ..Default::default()
        }
    }
}

/// Partial update: absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ConversationUpdateForm {
    #[validate(min_length = 1)]
    #[validate(max_length = 255)]
    pub title: Option<String>,
    pub is_active: Option<bool>,
}

impl ConversationUpdateForm {
    pub fn update(self, conversation: &mut models::Conversation) {
        if let Some(title) = self.title {
            conversation.title = title;
        }
        if let Some(is_active) = self.is_active {
            conversation.is_active = is_active;
        }
    }
}
