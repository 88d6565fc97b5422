#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM service responded with {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("LLM service unreachable: {0}")]
    Network(#[source] reqwest::Error),
    #[error("unexpected LLM response: {0}")]
    Protocol(String),
}

impl LlmError {
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Upstream { .. } => "upstream",
            LlmError::Network(_) => "network",
            LlmError::Protocol(_) => "protocol",
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LlmError::Protocol(err.to_string())
        } else {
            LlmError::Network(err)
        }
    }
}
