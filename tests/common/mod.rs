#![allow(dead_code)]

use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::sync::Arc;
use std::time::Duration;
use trackbot::auth::{GoogleClaims, SessionSigner};
use trackbot::configuration::{get_configuration, DatabaseSettings, Settings};
use trackbot::db::PoolManager;
use trackbot::{db, models};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const GOOGLE_CLIENT_ID: &str = "trackbot-web";
pub const GOOGLE_KEY_ID: &str = "trackbot-test-key";
pub const GOOGLE_SIGNING_KEY: &[u8] = include_bytes!("../fixtures/google_signing_key.pem");
pub const UNTRUSTED_SIGNING_KEY: &[u8] = include_bytes!("../fixtures/untrusted_signing_key.pem");
const GOOGLE_CERTS: &str = include_str!("../fixtures/google_certs.json");

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    pub pool_manager: Arc<PoolManager>,
    pub llm_server: MockServer,
    pub google_server: MockServer,
    pub signer: SessionSigner,
    pub client: reqwest::Client,
}

/// Serves the fixture key set the way Google's certs endpoint does.
pub async fn google_certs_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth2/v3/certs"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("cache-control", "public, max-age=21600")
                .set_body_raw(GOOGLE_CERTS, "application/json"),
        )
        .mount(&server)
        .await;
    server
}

pub async fn spawn_app() -> Option<TestApp> {
    let mut configuration = get_configuration().expect("Failed to get configuration");
    let llm_server = MockServer::start().await;

    configuration.llm.enabled = true;
    configuration.llm.base_url = llm_server.uri();
    configuration.llm.timeout_secs = 2;
    configuration.auth.jwt_secret = JWT_SECRET.to_string();
    configuration.auth.google_client_id = GOOGLE_CLIENT_ID.to_string();
    configuration.auth.cookie_secure = false;

    spawn_app_with_configuration(configuration, llm_server).await
}

pub async fn spawn_app_with_configuration(
    mut configuration: Settings,
    llm_server: MockServer,
) -> Option<TestApp> {
    let google_server = google_certs_server().await;
    configuration.auth.google_certs_url = format!("{}/oauth2/v3/certs", google_server.uri());

    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();

    let connection_pool = match configure_database(&configuration.database).await {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("Skipping tests: failed to connect to postgres: {}", err);
            return None;
        }
    };

    let signer = SessionSigner::new(
        &configuration.auth.jwt_secret,
        configuration.auth.session_ttl_secs,
    );
    let pool_manager = Arc::new(PoolManager::new(configuration.database.clone()));
    let server = trackbot::startup::run(listener, pool_manager.clone(), configuration)
        .await
        .expect("Failed to bind address.");
    let _ = tokio::spawn(server);

    Some(TestApp {
        address,
        db_pool: connection_pool,
        pool_manager,
        llm_server,
        google_server,
        signer,
        client: reqwest::Client::new(),
    })
}

pub async fn configure_database(config: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    let mut connection = PgConnection::connect_with(&config.without_db()).await?;

    connection
        .execute(format!(r#"CREATE DATABASE "{}""#, config.database_name).as_str())
        .await?;

    let connection_pool = PgPool::connect_with(config.with_db()).await?;
    db::migrations::initialize_models(&connection_pool)
        .await
        .expect("Failed to initialize models");

    Ok(connection_pool)
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.address, path)
    }

    pub async fn create_user(&self, email: &str) -> models::User {
        db::user::insert(
            &self.db_pool,
            models::User {
                email: email.to_string(),
                ..models::User::default()
            },
        )
        .await
        .expect("Failed to insert user")
    }

    /// Session token for `user`, as the login endpoint would issue it.
    pub fn token_for(&self, user: &models::User) -> String {
        let google = GoogleClaims {
            sub: format!("google-{}", user.id),
            email: user.email.clone(),
            email_verified: true,
            name: "Test Runner".to_string(),
            ..GoogleClaims::default()
        };
        let now = chrono::Utc::now().timestamp();
        self.signer
            .sign(&self.signer.claims_for(user, &google, now))
            .expect("Failed to sign session")
    }

    pub async fn get(&self, user: &models::User, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(self.token_for(user))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post(
        &self,
        user: &models::User,
        path: &str,
        body: serde_json::Value,
    ) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(self.token_for(user))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn put(
        &self,
        user: &models::User,
        path: &str,
        body: serde_json::Value,
    ) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .bearer_auth(self.token_for(user))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn delete(&self, user: &models::User, path: &str) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(self.token_for(user))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn create_conversation(&self, user: &models::User, title: &str) -> i64 {
        let response = self
            .post(
                user,
                &format!("/users/{}/conversations", user.id),
                serde_json::json!({ "title": title }),
            )
            .await;
        assert_eq!(201, response.status().as_u16());
        let body: serde_json::Value = response.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }

    /// Polls the message list until it has `expected` entries or the deadline passes.
    pub async fn wait_for_messages(
        &self,
        user: &models::User,
        conversation_id: i64,
        expected: usize,
        deadline: Duration,
    ) -> Vec<serde_json::Value> {
        let path = format!("/users/{}/conversations/{}/messages", user.id, conversation_id);
        let started = std::time::Instant::now();
        loop {
            let messages: Vec<serde_json::Value> =
                self.get(user, &path).await.json().await.unwrap();
            if messages.len() >= expected || started.elapsed() >= deadline {
                return messages;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}
