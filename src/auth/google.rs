//! Google id token verification.
//!
//! Tokens are RS256 JWTs signed by one of Google's rotating keys. The key set is
//! fetched from the certs endpoint and cached for as long as its `Cache-Control`
//! header allows.

use super::AuthError;
use crate::configuration::AuthSettings;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

pub const GOOGLE_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Allowed clock drift for `iat`, in seconds.
pub const CLOCK_SKEW_SECS: i64 = 300;

/// Minimum cache TTL in seconds (5 minutes)
const MIN_CACHE_TTL_SECS: i64 = 300;

/// Cache TTL when the certs response carries no max-age (1 hour)
const DEFAULT_CACHE_TTL_SECS: i64 = 3600;

/// An unknown `kid` triggers a refetch at most this often.
const UNKNOWN_KEY_REFETCH_SECS: i64 = 60;

/// Claims of a verified Google id token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoogleClaims {
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: String,
    pub iss: String,
    pub aud: String,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
}

impl GoogleClaims {
    /// Checks what the signature check leaves open: a sane `iat` and a verified address.
    pub fn check_identity(&self, now: i64) -> Result<(), AuthError> {
        if self.iat > now + CLOCK_SKEW_SECS {
            return Err(AuthError::NotYetValid);
        }
        if !self.email_verified {
            return Err(AuthError::EmailNotVerified);
        }
        if self.email.is_empty() || self.sub.is_empty() {
            return Err(AuthError::Malformed("missing email or subject".to_string()));
        }
        Ok(())
    }

    /// Display name, falling back to the email address.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Verifies Google id tokens against Google's published signing keys.
pub struct GoogleVerifier {
    client_id: String,
    certs_url: String,
    http_client: Client,
    cached_keys: Arc<RwLock<Option<CachedKeys>>>,
}

impl std::fmt::Debug for GoogleVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleVerifier")
            .field("client_id", &self.client_id)
            .field("certs_url", &self.certs_url)
            .finish_non_exhaustive()
    }
}

impl GoogleVerifier {
    pub fn new(settings: &AuthSettings) -> Result<Self, AuthError> {
        let client_id = settings.google_client_id.trim();
        if client_id.is_empty() {
            return Err(AuthError::MissingClientId);
        }

        Ok(Self {
            client_id: client_id.to_string(),
            certs_url: settings.google_certs_url.clone(),
            http_client: Client::new(),
            cached_keys: Arc::new(RwLock::new(None)),
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Checks signature, algorithm, issuer, audience and expiry, then the identity claims.
    pub async fn verify(&self, token: &str) -> Result<GoogleClaims, AuthError> {
        let header = decode_header(token)?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::Malformed(format!(
                "unsupported alg {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| AuthError::Malformed("token has no key id".to_string()))?;

        let key = self.public_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.client_id]);
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = 0;

        let claims = decode::<GoogleClaims>(token, &key, &validation)
            .map_err(|err| {
                tracing::debug!(error = %err, "Google token validation failed");
                AuthError::from(err)
            })?
            .claims;
        claims.check_identity(Utc::now().timestamp())?;

        tracing::debug!(kid = %kid, "Google token verified");
        Ok(claims)
    }

    async fn public_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.try_get_cached_key(kid).await? {
            return Ok(key);
        }

        self.refresh_keys().await?;

        let cache = self.cached_keys.read().await;
        cache
            .as_ref()
            .and_then(|cached| cached.keys.get(kid).cloned())
            .ok_or_else(|| AuthError::UnknownKey(kid.to_string()))
    }

    /// `Ok(None)` means the cache has to be refreshed first.
    async fn try_get_cached_key(&self, kid: &str) -> Result<Option<DecodingKey>, AuthError> {
        let cache = self.cached_keys.read().await;
        let cached = match cache.as_ref() {
            Some(cached) if cached.expires_at > Utc::now() => cached,
            _ => return Ok(None),
        };

        match cached.keys.get(kid) {
            Some(key) => Ok(Some(key.clone())),
            None if Utc::now() - cached.fetched_at
                < Duration::seconds(UNKNOWN_KEY_REFETCH_SECS) =>
            {
                Err(AuthError::UnknownKey(kid.to_string()))
            }
            None => Ok(None),
        }
    }

    async fn refresh_keys(&self) -> Result<(), AuthError> {
        tracing::info!(url = %self.certs_url, "Fetching Google signing keys");

        let response = self
            .http_client
            .get(&self.certs_url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| {
                tracing::warn!(error = %err, "Failed to fetch Google signing keys");
                AuthError::KeyFetch(err.to_string())
            })?;

        let cache_ttl = response
            .headers()
            .get(reqwest::header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_max_age)
            .unwrap_or(DEFAULT_CACHE_TTL_SECS)
            .max(MIN_CACHE_TTL_SECS);

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|err| AuthError::KeyFetch(format!("invalid key set: {err}")))?;

        let mut keys = HashMap::with_capacity(jwks.keys.len());
        for jwk in &jwks.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                continue;
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(kid, key);
                }
                Err(err) => tracing::warn!(kid = %kid, error = %err, "Skipping unusable signing key"),
            }
        }
        if keys.is_empty() {
            return Err(AuthError::KeyFetch("no usable signing keys".to_string()));
        }

        let fetched_at = Utc::now();
        let expires_at = fetched_at + Duration::seconds(cache_ttl);
        tracing::info!(
            num_keys = keys.len(),
            cache_ttl_secs = cache_ttl,
            expires_at = %expires_at,
            "Google signing keys cached"
        );

        *self.cached_keys.write().await = Some(CachedKeys {
            keys,
            fetched_at,
            expires_at,
        });
        Ok(())
    }
}

/// "public, max-age=19822, must-revalidate" -> 19822
fn parse_max_age(cache_control: &str) -> Option<i64> {
    cache_control
        .split(',')
        .map(str::trim)
        .find_map(|directive| directive.strip_prefix("max-age="))
        .and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CLIENT_ID: &str = "trackbot-web";
    const KID: &str = "trackbot-test-key";
    const CERTS: &str = include_str!("../../tests/fixtures/google_certs.json");
    const SIGNING_KEY: &[u8] = include_bytes!("../../tests/fixtures/google_signing_key.pem");
    const UNTRUSTED_KEY: &[u8] = include_bytes!("../../tests/fixtures/untrusted_signing_key.pem");

    async fn certs_server(expected_fetches: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v3/certs"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("cache-control", "public, max-age=19822, must-revalidate")
                    .set_body_raw(CERTS, "application/json"),
            )
            .expect(expected_fetches)
            .mount(&server)
            .await;
        server
    }

    fn verifier(server: &MockServer) -> GoogleVerifier {
        GoogleVerifier::new(&AuthSettings {
            google_client_id: CLIENT_ID.to_string(),
            google_certs_url: format!("{}/oauth2/v3/certs", server.uri()),
            ..AuthSettings::default()
        })
        .unwrap()
    }

    fn claims() -> serde_json::Value {
        let now = Utc::now().timestamp();
        json!({
            "sub": "1098",
            "email": "runner@example.com",
            "email_verified": true,
            "name": "Runner",
            "iss": "https://accounts.google.com",
            "aud": CLIENT_ID,
            "iat": now - 10,
            "exp": now + 3600,
        })
    }

    fn sign_with(key: &[u8], kid: &str, payload: &serde_json::Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());
        encode(&header, payload, &EncodingKey::from_rsa_pem(key).unwrap()).unwrap()
    }

    fn sign(payload: &serde_json::Value) -> String {
        sign_with(SIGNING_KEY, KID, payload)
    }

    #[tokio::test]
    async fn signed_token_is_verified() {
        let server = certs_server(1).await;
        let verified = verifier(&server).verify(&sign(&claims())).await.unwrap();

        assert_eq!(verified.email, "runner@example.com");
        assert_eq!(verified.sub, "1098");
        assert_eq!(verified.aud, CLIENT_ID);
    }

    #[tokio::test]
    async fn token_signed_by_another_key_is_rejected() {
        let server = certs_server(1).await;
        let forged = sign_with(UNTRUSTED_KEY, KID, &claims());

        assert_eq!(
            verifier(&server).verify(&forged).await,
            Err(AuthError::BadSignature)
        );
    }

    #[tokio::test]
    async fn tampered_payload_is_rejected() {
        let server = certs_server(1).await;
        let token = sign(&claims());

        let mut payload = claims();
        payload["email"] = json!("someone-else@example.com");
        let other = sign(&payload);

        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = other.split('.').nth(1).unwrap();

        assert_eq!(
            verifier(&server).verify(&parts.join(".")).await,
            Err(AuthError::BadSignature)
        );
    }

    #[tokio::test]
    async fn token_without_expiry_is_rejected() {
        let server = certs_server(1).await;
        let mut payload = claims();
        payload.as_object_mut().unwrap().remove("exp");

        assert_eq!(
            verifier(&server).verify(&sign(&payload)).await,
            Err(AuthError::Malformed("missing `exp` claim".to_string()))
        );
    }

    #[tokio::test]
    async fn token_without_audience_is_rejected() {
        let server = certs_server(1).await;
        let verifier = verifier(&server);

        let mut payload = claims();
        payload.as_object_mut().unwrap().remove("aud");
        assert_eq!(
            verifier.verify(&sign(&payload)).await,
            Err(AuthError::Malformed("missing `aud` claim".to_string()))
        );

        let mut payload = claims();
        payload["aud"] = json!("other-client");
        assert_eq!(
            verifier.verify(&sign(&payload)).await,
            Err(AuthError::InvalidAudience)
        );
    }

    #[tokio::test]
    async fn foreign_issuer_is_rejected() {
        let server = certs_server(1).await;
        let mut payload = claims();
        payload["iss"] = json!("https://evil.example.com");

        assert_eq!(
            verifier(&server).verify(&sign(&payload)).await,
            Err(AuthError::InvalidIssuer)
        );
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let server = certs_server(1).await;
        let mut payload = claims();
        payload["exp"] = json!(Utc::now().timestamp() - 10);

        assert_eq!(
            verifier(&server).verify(&sign(&payload)).await,
            Err(AuthError::Expired)
        );
    }

    #[tokio::test]
    async fn unsigned_or_symmetric_tokens_are_rejected_without_fetching_keys() {
        let server = certs_server(0).await;
        let verifier = verifier(&server);

        let unsigned = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.eyJzdWIiOiIxMDk4In0.";
        assert!(matches!(
            verifier.verify(unsigned).await,
            Err(AuthError::Malformed(_))
        ));

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(KID.to_string());
        let symmetric = encode(&header, &claims(), &EncodingKey::from_secret(b"guess")).unwrap();
        assert!(matches!(
            verifier.verify(&symmetric).await,
            Err(AuthError::Malformed(_))
        ));

        assert!(matches!(
            verifier.verify("not-a-token").await,
            Err(AuthError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn keys_are_fetched_once_and_unknown_kid_does_not_refetch() {
        let server = certs_server(1).await;
        let verifier = verifier(&server);

        assert!(verifier.verify(&sign(&claims())).await.is_ok());
        assert!(verifier.verify(&sign(&claims())).await.is_ok());
        assert_eq!(
            verifier
                .verify(&sign_with(SIGNING_KEY, "rotated-key", &claims()))
                .await,
            Err(AuthError::UnknownKey("rotated-key".to_string()))
        );
    }

    #[tokio::test]
    async fn unreachable_certs_endpoint_is_a_key_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert!(matches!(
            verifier(&server).verify(&sign(&claims())).await,
            Err(AuthError::KeyFetch(_))
        ));
    }

    #[test]
    fn empty_client_id_is_rejected() {
        let settings = AuthSettings {
            google_client_id: "  ".to_string(),
            ..AuthSettings::default()
        };
        assert_eq!(
            GoogleVerifier::new(&settings).unwrap_err(),
            AuthError::MissingClientId
        );
    }

    #[test]
    fn identity_claims_are_checked() {
        let now = 1_700_000_000;
        let google = GoogleClaims {
            sub: "1098".to_string(),
            email: "runner@example.com".to_string(),
            email_verified: true,
            iat: now,
            exp: now + 3600,
            ..GoogleClaims::default()
        };
        assert!(google.check_identity(now).is_ok());

        let unverified = GoogleClaims {
            email_verified: false,
            ..google.clone()
        };
        assert_eq!(unverified.check_identity(now), Err(AuthError::EmailNotVerified));

        let early = GoogleClaims {
            iat: now + CLOCK_SKEW_SECS + 1,
            ..google.clone()
        };
        assert_eq!(early.check_identity(now), Err(AuthError::NotYetValid));

        let anonymous = GoogleClaims {
            email: String::new(),
            ..google
        };
        assert!(matches!(
            anonymous.check_identity(now),
            Err(AuthError::Malformed(_))
        ));
    }

    #[test]
    fn max_age_is_read_from_cache_control() {
        assert_eq!(parse_max_age("public, max-age=19822, must-revalidate"), Some(19822));
        assert_eq!(parse_max_age("no-cache"), None);
    }
}
