mod google;
mod session;

pub use google::*;
pub use session::*;

use jsonwebtoken::errors::{Error as JwtError, ErrorKind};

pub const SESSION_COOKIE: &str = "trackbot_auth_token";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("unexpected issuer")]
    InvalidIssuer,
    #[error("token was issued for another audience")]
    InvalidAudience,
    #[error("token expired")]
    Expired,
    #[error("token is not valid yet")]
    NotYetValid,
    #[error("email address is not verified")]
    EmailNotVerified,
    #[error("signature mismatch")]
    BadSignature,
    #[error("token was signed with an unknown key `{0}`")]
    UnknownKey(String),
    #[error("failed to fetch signing keys: {0}")]
    KeyFetch(String),
    #[error("session signing secret is not configured")]
    MissingSecret,
    #[error("Google client id is not configured")]
    MissingClientId,
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => AuthError::BadSignature,
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::ImmatureSignature => AuthError::NotYetValid,
            ErrorKind::InvalidAudience => AuthError::InvalidAudience,
            ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
            ErrorKind::MissingRequiredClaim(claim) => {
                AuthError::Malformed(format!("missing `{claim}` claim"))
            }
            ErrorKind::InvalidAlgorithm => {
                AuthError::Malformed("unexpected signing algorithm".to_string())
            }
            _ => AuthError::Malformed(err.to_string()),
        }
    }
}

/// Extracts the token of an `Authorization: Bearer <token>` header value.
pub fn extract_bearer_token(authorization: &str) -> Option<&str> {
    let (scheme, token) = authorization.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
