use super::{LlmConnector, LlmError, ProcessMessagesRequest, ProcessMessagesResponse};
use crate::configuration::LlmSettings;
use std::time::Duration;
use tracing::Instrument;

const PROCESS_MESSAGES_PATH: &str = "/api/v1/process_messages";
const HEALTH_PATH: &str = "/api/v1/chat/health";

/// HTTP client of the LLM service
pub struct LlmClient {
    base_url: String,
    http_client: reqwest::Client,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(settings: &LlmSettings) -> Result<Self, LlmError> {
        let timeout = Duration::from_secs(settings.timeout_secs);
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LlmError::Network)?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            http_client,
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait::async_trait]
impl LlmConnector for LlmClient {
    async fn process_messages(
        &self,
        request: &ProcessMessagesRequest,
    ) -> Result<ProcessMessagesResponse, LlmError> {
        let span = tracing::info_span!(
            "llm_process_messages",
            conversation_id = request.conversation_id,
            history = request.messages.len()
        );

        async {
            let response = self
                .http_client
                .post(self.url(PROCESS_MESSAGES_PATH))
                .json(request)
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                return Err(LlmError::Upstream {
                    status: status.as_u16(),
                    body,
                });
            }

            let reply: ProcessMessagesResponse = serde_json::from_str(&body)
                .map_err(|err| LlmError::Protocol(format!("{err}: {body}")))?;
            if reply.message.trim().is_empty() {
                return Err(LlmError::Protocol("empty reply".to_string()));
            }

            tracing::debug!(reply_len = reply.message.len(), "LLM replied");
            Ok::<_, LlmError>(reply)
        }
        .instrument(span)
        .await
    }

    async fn health(&self) -> Result<(), LlmError> {
        let response = self.http_client.get(self.url(HEALTH_PATH)).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(LlmError::Upstream {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}
