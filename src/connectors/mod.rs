//! External service connectors.
//!
//! Each service is reached through a trait so handlers and the message pipeline
//! depend on behaviour, not on HTTP details, and tests can point the HTTP client
//! at a mock server.

pub mod llm;

pub use llm::{LlmClient, LlmConnector, LlmError, ProcessMessagesRequest, ProcessMessagesResponse};
