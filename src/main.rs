use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use trackbot::configuration::get_configuration;
use trackbot::db::{self, PoolManager};
use trackbot::secrets::{CachedSecretSource, EnvSecretSource, SecretSource};
use trackbot::startup::run;
use trackbot::telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("trackbot".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let mut settings = get_configuration()?;

    if settings.test_env {
        tracing::info!("Local mode, database credentials come from settings");
    } else {
        let source = CachedSecretSource::new(
            EnvSecretSource::new(settings.secrets.secret_name.clone()),
            Duration::from_secs(settings.secrets.cache_ttl_secs),
        );
        let secret = source.database_secret().await?;
        settings.database.apply_secret(secret);
        settings
            .database
            .apply_connection_env(|key| std::env::var(key).ok());
    }

    if settings.auth.jwt_secret.is_empty() {
        anyhow::bail!("TRACKBOT_JWT_SECRET_KEY is not set");
    }
    if settings.auth.google_client_id.trim().is_empty() {
        anyhow::bail!("GOOGLE_CLIENT_ID is not set");
    }

    let pool_manager = Arc::new(PoolManager::new(settings.database.clone()));
    let pg_pool = pool_manager.get().await?;

    let applied = db::migrations::initialize_models(&pg_pool).await?;
    tracing::info!(count = applied.len(), "Database models initialized");

    let address = format!("{}:{}", settings.app_host, settings.app_port);
    tracing::info!("Start server at {:?}", &address);
    let listener = TcpListener::bind(&address)?;

    run(listener, pool_manager.clone(), settings).await?.await?;

    pool_manager.close().await;
    Ok(())
}
