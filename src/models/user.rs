use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity of the caller, attached to the request by the authentication middleware.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserContext {
    pub user_id: i64,
    pub email: String,
    pub name: String,
}
