//! Chat message ingestion.
//!
//! A user message is stored synchronously and returned to the caller. When an LLM
//! service is configured, a detached task then reads the conversation history, asks
//! the model for a reply and stores it as an assistant message. That task is bounded
//! by the connector's timeout, never touches the response, and only logs failures.

use crate::connectors::{LlmConnector, LlmError, ProcessMessagesRequest};
use crate::db::{self, PoolManager, StoreError};
use crate::errors::ApiError;
use crate::forms;
use crate::models;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::Instrument;

#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("assistant reply timed out after {0}s")]
    TimedOut(u64),
}

impl ReplyError {
    pub fn kind(&self) -> &'static str {
        match self {
            ReplyError::Llm(err) => err.kind(),
            ReplyError::Store(err) => err.kind(),
            ReplyError::TimedOut(_) => "timeout",
        }
    }
}

/// Outcome of a submission. `dispatch` is the background reply task, if one was started.
pub struct Submission {
    pub message: models::Message,
    pub dispatch: Option<JoinHandle<()>>,
}

#[derive(Clone)]
pub struct MessagePipeline {
    pools: Arc<PoolManager>,
    llm: Option<Arc<dyn LlmConnector>>,
}

impl MessagePipeline {
    pub fn new(pools: Arc<PoolManager>, llm: Option<Arc<dyn LlmConnector>>) -> Self {
        Self { pools, llm }
    }

    pub fn llm(&self) -> Option<&Arc<dyn LlmConnector>> {
        self.llm.as_ref()
    }

    /// Validates and stores a message in a conversation owned by `user_id`, then
    /// schedules the assistant reply for user messages.
    pub async fn submit(
        &self,
        user_id: i64,
        conversation_id: i64,
        form: forms::MessageForm,
        correlation_id: String,
    ) -> Result<Submission, ApiError> {
        let draft = form.into_message(user_id, conversation_id);
        crate::validators::message(&draft)?;

        let pool = self.pools.get().await?;
        let message = db::message::insert_in_conversation(&pool, draft).await?;
        tracing::info!(
            message_id = message.id,
            conversation_id,
            message_type = %message.message_type,
            "Message stored"
        );

        let dispatch = match (&self.llm, message.message_type) {
            (Some(llm), models::MessageType::User) => Some(self.dispatch_reply(
                pool,
                llm.clone(),
                &message,
                correlation_id,
            )),
            _ => None,
        };

        Ok(Submission { message, dispatch })
    }

    fn dispatch_reply(
        &self,
        pool: PgPool,
        llm: Arc<dyn LlmConnector>,
        trigger: &models::Message,
        correlation_id: String,
    ) -> JoinHandle<()> {
        let (user_id, conversation_id) = (trigger.user_id, trigger.conversation_id);
        let span = tracing::info_span!(
            "assistant_reply",
            %correlation_id,
            user_id,
            conversation_id,
            message_id = trigger.id
        );

        tokio::spawn(
            async move {
                let budget = llm.timeout();
                let outcome = tokio::time::timeout(
                    budget,
                    generate_reply(&pool, llm.as_ref(), user_id, conversation_id),
                )
                .await
                .unwrap_or(Err(ReplyError::TimedOut(budget.as_secs())));

                match outcome {
                    Ok(reply) => {
                        tracing::info!(message_id = reply.id, "Assistant reply stored")
                    }
                    Err(err) => tracing::warn!(
                        error_kind = err.kind(),
                        "Assistant reply dropped: {}",
                        err
                    ),
                }
            }
            .instrument(span),
        )
    }
}

/// Sends the full history of a conversation to the model and stores its answer.
pub async fn generate_reply(
    pool: &PgPool,
    llm: &dyn LlmConnector,
    user_id: i64,
    conversation_id: i64,
) -> Result<models::Message, ReplyError> {
    let history = db::message::fetch_by_conversation(pool, conversation_id).await?;
    let request = ProcessMessagesRequest::new(user_id, conversation_id, &history);
    let reply = llm.process_messages(&request).await?;

    if reply.message_type != models::MessageType::Assistant.as_str() {
        tracing::debug!(
            message_type = %reply.message_type,
            "LLM reply type ignored, stored as assistant"
        );
    }

    let assistant = models::Message::draft(
        conversation_id,
        user_id,
        reply.message,
        models::MessageType::Assistant,
    );
    Ok(db::message::insert_in_conversation(pool, assistant).await?)
}
