use serde::{Deserialize, Serialize};
use serde_valid::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GoogleLogin {
    #[serde(rename = "googleToken")]
    #[validate(min_length = 1)]
    pub google_token: String,
}
