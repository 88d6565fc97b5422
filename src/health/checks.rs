use super::models::{ComponentHealth, HealthCheckResponse};
use crate::connectors::LlmConnector;
use crate::db::PoolManager;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HealthChecker {
    pools: Arc<PoolManager>,
    llm: Option<Arc<dyn LlmConnector>>,
    start_time: Instant,
}

impl HealthChecker {
    pub fn new(pools: Arc<PoolManager>, llm: Option<Arc<dyn LlmConnector>>) -> Self {
        Self {
            pools,
            llm,
            start_time: Instant::now(),
        }
    }

    pub async fn check_all(&self) -> HealthCheckResponse {
        let version = env!("CARGO_PKG_VERSION").to_string();
        let uptime = self.start_time.elapsed().as_secs();
        let mut response = HealthCheckResponse::new(version, uptime);

        let (db_result, llm_result) = tokio::join!(
            timeout(CHECK_TIMEOUT, self.check_database()),
            timeout(CHECK_TIMEOUT, self.check_llm())
        );

        let db_health =
            db_result.unwrap_or_else(|_| ComponentHealth::unhealthy("Timeout".to_string()));
        let llm_health =
            llm_result.unwrap_or_else(|_| ComponentHealth::unhealthy("Timeout".to_string()));

        response.add_component("database", db_health, true);
        response.add_component("llm", llm_health, false);
        response
    }

    async fn check_database(&self) -> ComponentHealth {
        let start = Instant::now();
        let pinged = match self.pools.get().await {
            Ok(pool) => crate::db::pool::ping(&pool).await.map_err(|err| format!("{err:?}")),
            Err(err) => Err(format!("{err:?}")),
        };
        match pinged {
            Ok(()) => ComponentHealth::healthy(start.elapsed().as_millis() as u64),
            Err(err) => {
                tracing::error!("Database health check failed: {}", err);
                ComponentHealth::unhealthy("Database unreachable".to_string())
            }
        }
    }

    async fn check_llm(&self) -> ComponentHealth {
        let llm = match &self.llm {
            Some(llm) => llm,
            None => return ComponentHealth::disabled(),
        };

        let start = Instant::now();
        match llm.health().await {
            Ok(()) => ComponentHealth::healthy(start.elapsed().as_millis() as u64),
            Err(err) => {
                tracing::warn!(error_kind = err.kind(), "LLM health check failed: {}", err);
                ComponentHealth::unhealthy("LLM service unavailable".to_string())
            }
        }
    }
}
