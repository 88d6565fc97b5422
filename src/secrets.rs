//! Database credentials kept outside of the settings file.

use crate::configuration::DatabaseSettings;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("secret `{0}` is not available")]
    Missing(String),
    #[error("secret `{name}` is malformed: {source}")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u16),
    Text(String),
}

fn port_from_number_or_text<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<PortValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(PortValue::Number(port)) => Ok(Some(port)),
        Some(PortValue::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(PortValue::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Credentials document as stored by the secret manager.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DatabaseSecret {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default, deserialize_with = "port_from_number_or_text")]
    pub port: Option<u16>,
    #[serde(default)]
    pub dbname: Option<String>,
}

impl DatabaseSecret {
    pub fn parse(name: &str, document: &str) -> Result<Self, SecretError> {
        serde_json::from_str(document).map_err(|source| SecretError::Malformed {
            name: name.to_string(),
            source,
        })
    }
}

impl DatabaseSettings {
    /// Takes credentials from the secret. The database name falls back to `postgres`.
    pub fn apply_secret(&mut self, secret: DatabaseSecret) {
        self.username = secret.username;
        self.password = secret.password;
        if let Some(host) = secret.host.filter(|h| !h.is_empty()) {
            self.host = host;
        }
        if let Some(port) = secret.port {
            self.port = port;
        }
        self.database_name = secret
            .dbname
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "postgres".to_string());
    }
}

#[async_trait]
pub trait SecretSource: Send + Sync {
    async fn database_secret(&self) -> Result<DatabaseSecret, SecretError>;
}

/// Reads the secret document from an environment variable named after the secret,
/// e.g. `trackbot/database` is looked up as `TRACKBOT_DATABASE`.
pub struct EnvSecretSource {
    secret_name: String,
}

impl EnvSecretSource {
    pub fn new(secret_name: impl Into<String>) -> Self {
        Self {
            secret_name: secret_name.into(),
        }
    }

    pub fn variable(&self) -> String {
        self.secret_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect()
    }
}

#[async_trait]
impl SecretSource for EnvSecretSource {
    async fn database_secret(&self) -> Result<DatabaseSecret, SecretError> {
        let variable = self.variable();
        let document = std::env::var(&variable)
            .map_err(|_| SecretError::Missing(self.secret_name.clone()))?;
        DatabaseSecret::parse(&self.secret_name, &document)
    }
}

/// Keeps the last fetched secret for a while so the store is not hit on every pool rebuild.
pub struct CachedSecretSource<S> {
    inner: S,
    ttl: Duration,
    cached: RwLock<Option<(DatabaseSecret, Instant)>>,
}

impl<S: SecretSource> CachedSecretSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cached: RwLock::new(None),
        }
    }
}

#[async_trait]
impl<S: SecretSource> SecretSource for CachedSecretSource<S> {
    async fn database_secret(&self) -> Result<DatabaseSecret, SecretError> {
        let now = Instant::now();
        {
            let cached = self.cached.read().await;
            if let Some((secret, expires_at)) = cached.as_ref() {
                if *expires_at > now {
                    return Ok(secret.clone());
                }
            }
        }

        let secret = self.inner.database_secret().await?;
        tracing::debug!("Database secret refreshed");
        *self.cached.write().await = Some((secret.clone(), now + self.ttl));

        Ok(secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SecretSource for CountingSource {
        async fn database_secret(&self) -> Result<DatabaseSecret, SecretError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(DatabaseSecret {
                username: "svc".to_string(),
                password: "pw".to_string(),
                ..Default::default()
            })
        }
    }

    #[test]
    fn port_may_be_number_or_text() {
        let numeric = DatabaseSecret::parse(
            "db",
            r#"{"username":"u","password":"p","host":"h","port":5433}"#,
        )
        .unwrap();
        assert_eq!(numeric.port, Some(5433));

        let text =
            DatabaseSecret::parse("db", r#"{"username":"u","password":"p","port":"5434"}"#).unwrap();
        assert_eq!(text.port, Some(5434));

        assert!(DatabaseSecret::parse("db", r#"{"username":"u"}"#).is_err());
    }

    #[test]
    fn secret_fills_credentials_and_defaults_database_name() {
        let mut settings = DatabaseSettings {
            database_name: "local".to_string(),
            ..DatabaseSettings::default()
        };
        settings.apply_secret(DatabaseSecret {
            username: "svc".to_string(),
            password: "pw".to_string(),
            host: Some("rds.example.com".to_string()),
            port: Some(5433),
            dbname: None,
        });

        assert_eq!(settings.username, "svc");
        assert_eq!(settings.host, "rds.example.com");
        assert_eq!(settings.port, 5433);
        assert_eq!(settings.database_name, "postgres");

        settings.apply_connection_env(|key| match key {
            "DB_HOST" => Some("override.local".to_string()),
            _ => None,
        });
        assert_eq!(settings.host, "override.local");
        assert_eq!(settings.port, 5433);
    }

    #[test]
    fn env_variable_name_is_derived_from_secret_name() {
        assert_eq!(EnvSecretSource::new("trackbot/database").variable(), "TRACKBOT_DATABASE");
    }

    #[tokio::test]
    async fn cached_source_hits_inner_once_within_ttl() {
        let cached = CachedSecretSource::new(
            CountingSource {
                calls: AtomicUsize::new(0),
            },
            Duration::from_secs(300),
        );

        cached.database_secret().await.unwrap();
        cached.database_secret().await.unwrap();
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_entry_is_refetched() {
        let cached = CachedSecretSource::new(
            CountingSource {
                calls: AtomicUsize::new(0),
            },
            Duration::ZERO,
        );

        cached.database_secret().await.unwrap();
        cached.database_secret().await.unwrap();
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }
}
