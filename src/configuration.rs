use serde;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app_host: String,
    pub app_port: u16,
    /// Upper bound for serving one request, background work excluded.
    pub request_timeout_secs: u64,
    /// Local mode: database credentials come from settings instead of the secret store.
    pub test_env: bool,
    pub database: DatabaseSettings,
    pub llm: LlmSettings,
    pub auth: AuthSettings,
    pub secrets: SecretSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_host: "127.0.0.1".to_string(),
            app_port: 8080,
            request_timeout_secs: 60,
            test_env: false,
            database: DatabaseSettings::default(),
            llm: LlmSettings::default(),
            auth: AuthSettings::default(),
            secrets: SecretSettings::default(),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database_name: String,
    pub require_ssl: bool,
    pub max_open_connections: u32,
    pub max_idle_connections: u32,
    pub conn_max_lifetime_secs: u64,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            username: "postgres".to_string(),
            password: "postgres".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            database_name: "postgres".to_string(),
            require_ssl: false,
            max_open_connections: 25,
            max_idle_connections: 5,
            conn_max_lifetime_secs: 300,
            acquire_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:8081".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub jwt_secret: String,
    /// Expected `aud` of Google id tokens. Required at startup.
    pub google_client_id: String,
    /// JWKS endpoint with Google's token signing keys.
    pub google_certs_url: String,
    pub session_ttl_secs: i64,
    pub cookie_secure: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            google_client_id: String::new(),
            google_certs_url: crate::auth::GOOGLE_CERTS_URL.to_string(),
            session_ttl_secs: 300,
            cookie_secure: true,
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct SecretSettings {
    pub region: String,
    pub secret_name: String,
    pub cache_ttl_secs: u64,
}

impl Default for SecretSettings {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            secret_name: "trackbot/database".to_string(),
            cache_ttl_secs: 300,
        }
    }
}

impl DatabaseSettings {
    // Connection string: postgresql://<username>:<password>@<host>:<port>/<database_name>
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name,
        )
    }

    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .ssl_mode(ssl_mode)
    }

    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db().database(&self.database_name)
    }

    /// DB_HOST and DB_PORT win over both the settings file and the secret store.
    pub fn apply_connection_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = env("DB_HOST").filter(|v| !v.is_empty()) {
            self.host = host;
        }
        if let Some(port) = env("DB_PORT").and_then(|v| v.parse().ok()) {
            self.port = port;
        }
    }

    /// Credentials used when running against a local database.
    pub fn apply_local_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(user) = env("DB_USER_LOCAL").filter(|v| !v.is_empty()) {
            self.username = user;
        }
        if let Some(password) = env("DB_PASSWORD_LOCAL") {
            self.password = password;
        }
        if let Some(name) = env("DB_NAME").filter(|v| !v.is_empty()) {
            self.database_name = name;
        }
    }
}

fn flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Settings {
    /// Environment variables override whatever the settings file says.
    pub fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = env("PORT").and_then(|v| v.parse().ok()) {
            self.app_port = port;
        }
        if let Some(test_env) = env("TEST_ENV").as_deref().and_then(flag) {
            self.test_env = test_env;
        }

        self.database.apply_local_env(&env);
        self.database.apply_connection_env(&env);

        if let Some(url) = env("LLM_SERVICE_URL").filter(|v| !v.is_empty()) {
            self.llm.base_url = url;
        }
        if let Some(enabled) = env("LLM_ENABLED").as_deref().and_then(flag) {
            self.llm.enabled = enabled;
        }

        if let Some(secret) = env("TRACKBOT_JWT_SECRET_KEY").filter(|v| !v.is_empty()) {
            self.auth.jwt_secret = secret;
        }
        if let Some(client_id) = env("GOOGLE_CLIENT_ID") {
            self.auth.google_client_id = client_id;
        }
        if let Some(url) = env("GOOGLE_CERTS_URL").filter(|v| !v.is_empty()) {
            self.auth.google_certs_url = url;
        }

        if let Some(region) = env("AWS_REGION").filter(|v| !v.is_empty()) {
            self.secrets.region = region;
        }
        if let Some(name) = env("AWS_SECRET_NAME").filter(|v| !v.is_empty()) {
            self.secrets.secret_name = name;
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Values from an optional `configuration.{yaml,toml,json}` next to the binary
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .build()?;

    let mut config: Settings = settings.try_deserialize()?;
    config.apply_env(|key| std::env::var(key).ok());

    Ok(config)
}
