use super::{AuthError, GoogleClaims};
use crate::models;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const SESSION_ISSUER: &str = "trackbot-app";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: String,
    #[serde(default)]
    pub google_sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn user_context(&self) -> models::UserContext {
        models::UserContext {
            user_id: self.user_id,
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

/// Issues and verifies the HS256 session tokens handed out after Google sign-in.
#[derive(Clone)]
pub struct SessionSigner {
    secret: Vec<u8>,
    ttl_secs: i64,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl SessionSigner {
    pub fn new(secret: impl AsRef<[u8]>, ttl_secs: i64) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    fn secret(&self) -> Result<&[u8], AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }
        Ok(&self.secret)
    }

    pub fn claims_for(&self, user: &models::User, google: &GoogleClaims, now: i64) -> SessionClaims {
        SessionClaims {
            user_id: user.id,
            email: user.email.clone(),
            name: google.display_name().to_string(),
            picture: google.picture.clone(),
            google_sub: google.sub.clone(),
            iss: SESSION_ISSUER.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
        }
    }

    pub fn sign(&self, claims: &SessionClaims) -> Result<String, AuthError> {
        let key = EncodingKey::from_secret(self.secret()?);
        Ok(encode(&Header::new(Algorithm::HS256), claims, &key)?)
    }

    /// Checks signature, algorithm, issuer and expiry against the current time.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let key = DecodingKey::from_secret(self.secret()?);

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[SESSION_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.leeway = 0;

        Ok(decode::<SessionClaims>(token, &key, &validation)?.claims)
    }
}
