use crate::configuration::DatabaseSettings;
use crate::db::StoreError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// How long a pool that answered a ping is handed out without checking again.
pub const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(30);

struct Checked {
    pool: PgPool,
    at: Instant,
}

/// Owns the process wide connection pool. Handlers and background tasks ask it for
/// the pool on every use; the pool is created on first use and recreated once it is
/// closed or stops answering.
pub struct PoolManager {
    settings: DatabaseSettings,
    pool: Mutex<Option<Checked>>,
}

impl PoolManager {
    pub fn new(settings: DatabaseSettings) -> Self {
        Self {
            settings,
            pool: Mutex::new(None),
        }
    }

    pub fn pool_options(&self) -> PgPoolOptions {
        let settings = &self.settings;
        // idle connections above the floor are reaped, so the floor bounds what stays idle
        PgPoolOptions::new()
            .max_connections(settings.max_open_connections)
            .min_connections(settings.max_idle_connections.min(settings.max_open_connections))
            .max_lifetime(Duration::from_secs(settings.conn_max_lifetime_secs))
            .idle_timeout(Duration::from_secs(settings.conn_max_lifetime_secs))
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
    }

    /// Returns a live pool, creating or replacing it as needed.
    pub async fn get(&self) -> Result<PgPool, StoreError> {
        let mut guard = self.pool.lock().await;

        if let Some(checked) = guard.as_mut() {
            if checked.pool.is_closed() {
                tracing::warn!("Database pool was closed, recreating");
            } else if checked.at.elapsed() < HEALTH_CHECK_INTERVAL {
                return Ok(checked.pool.clone());
            } else {
                match ping(&checked.pool).await {
                    Ok(()) => {
                        checked.at = Instant::now();
                        return Ok(checked.pool.clone());
                    }
                    Err(err) => {
                        tracing::warn!("Database pool failed health check, recreating: {:?}", err);
                        checked.pool.close().await;
                    }
                }
            }
            *guard = None;
        }

        tracing::info!(
            host = %self.settings.host,
            port = self.settings.port,
            database = %self.settings.database_name,
            "Opening database pool"
        );
        let pool = self
            .pool_options()
            .connect_with(self.settings.with_db())
            .await
            .map_err(|err| {
                tracing::error!("Failed to connect to database: {:?}", err);
                StoreError::Storage(err)
            })?;
        *guard = Some(Checked {
            pool: pool.clone(),
            at: Instant::now(),
        });

        Ok(pool)
    }

    pub async fn close(&self) {
        if let Some(checked) = self.pool.lock().await.take() {
            checked.pool.close().await;
            tracing::info!("Database pool closed");
        }
    }
}

pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}
