mod client;
mod errors;
mod types;

pub use client::LlmClient;
pub use errors::LlmError;
pub use types::*;

use std::time::Duration;

/// Conversational model service.
#[async_trait::async_trait]
pub trait LlmConnector: Send + Sync {
    /// Sends the conversation history and returns the assistant reply.
    async fn process_messages(
        &self,
        request: &ProcessMessagesRequest,
    ) -> Result<ProcessMessagesResponse, LlmError>;

    /// Cheap liveness check of the service.
    async fn health(&self) -> Result<(), LlmError>;

    /// Budget for one background reply, store round trips included.
    fn timeout(&self) -> Duration;
}
