use chrono::{DateTime, Utc};
use serde::Serialize;

/// A row of the migration ledger.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct MigrationRecord {
    pub id: i64,
    pub name: String,
    pub applied_at: DateTime<Utc>,
}
