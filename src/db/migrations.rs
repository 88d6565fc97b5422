use crate::db::error::log_failure;
use crate::db::StoreError;
use crate::models;
use sqlx::PgPool;
use tracing::Instrument;

/// Key of the transaction scoped advisory lock serializing concurrent boots.
const MIGRATION_LOCK_KEY: i64 = 0x7472_6163_6b62;

pub struct Migration {
    pub name: &'static str,
    pub statement: &'static str,
}

/// Ordered schema history. Entries are append only: never edit or reorder applied ones.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "create_users_table",
        statement: r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            email VARCHAR(255) NOT NULL UNIQUE CHECK (email <> ''),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    },
    Migration {
        name: "create_workouts_table",
        statement: r#"
        CREATE TABLE IF NOT EXISTS workouts (
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    },
    Migration {
        name: "create_exercises_table",
        statement: r#"
        CREATE TABLE IF NOT EXISTS exercises (
            id BIGSERIAL PRIMARY KEY,
            workout_id BIGINT NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
            name VARCHAR(255) NOT NULL CHECK (name <> ''),
            type VARCHAR(20) NOT NULL CHECK (type IN ('cardio', 'weights')),
            notes TEXT,
            distance DOUBLE PRECISION,
            duration INTEGER,
            sets INTEGER,
            reps INTEGER,
            weight DOUBLE PRECISION,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT exercises_fields_match_type CHECK (
                (type = 'cardio' AND distance IS NOT NULL AND duration IS NOT NULL
                    AND sets IS NULL AND reps IS NULL AND weight IS NULL)
                OR
                (type = 'weights' AND sets IS NOT NULL AND reps IS NOT NULL AND weight IS NOT NULL
                    AND distance IS NULL AND duration IS NULL)
            )
        )
        "#,
    },
    Migration {
        name: "create_conversations_table",
        statement: r#"
        CREATE TABLE IF NOT EXISTS conversations (
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title VARCHAR(255) NOT NULL CHECK (title <> ''),
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    },
    Migration {
        name: "create_messages_table",
        statement: r#"
        CREATE TABLE IF NOT EXISTS messages (
            id BIGSERIAL PRIMARY KEY,
            conversation_id BIGINT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            content TEXT NOT NULL CHECK (content <> ''),
            message_type VARCHAR(20) NOT NULL CHECK (message_type IN ('user', 'assistant', 'system')),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    },
    Migration {
        name: "create_messages_conversation_index",
        statement: r#"
        CREATE INDEX IF NOT EXISTS messages_conversation_created_idx
            ON messages (conversation_id, created_at, id)
        "#,
    },
];

/// Applies every pending migration inside one transaction and returns the names
/// applied by this call. Running it again is a no-op.
pub async fn initialize_models(pool: &PgPool) -> Result<Vec<String>, StoreError> {
    let span = tracing::info_span!("Applying schema migrations");
    apply(pool, MIGRATIONS).instrument(span).await
}

pub(crate) async fn apply(
    pool: &PgPool,
    migrations: &[Migration],
) -> Result<Vec<String>, StoreError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|err| log_failure("begin migration transaction", err))?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(&mut *tx)
        .await
        .map_err(|err| log_failure("acquire migration lock", err))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS migrations (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL UNIQUE,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(&mut *tx)
    .await
    .map_err(|err| log_failure("create migration ledger", err))?;

    let done: Vec<String> = sqlx::query_scalar("SELECT name FROM migrations")
        .fetch_all(&mut *tx)
        .await
        .map_err(|err| log_failure("read migration ledger", err))?;

    let mut applied = Vec::new();
    for migration in migrations {
        if done.iter().any(|name| name == migration.name) {
            continue;
        }

        tracing::info!(migration = migration.name, "Applying migration");
        sqlx::query(migration.statement)
            .execute(&mut *tx)
            .await
            .map_err(|err| log_failure(&format!("apply migration {}", migration.name), err))?;

        sqlx::query("INSERT INTO migrations (name) VALUES ($1)")
            .bind(migration.name)
            .execute(&mut *tx)
            .await
            .map_err(|err| log_failure("record migration", err))?;

        applied.push(migration.name.to_string());
    }

    tx.commit()
        .await
        .map_err(|err| log_failure("commit migrations", err))?;

    if applied.is_empty() {
        tracing::info!("Schema is up to date");
    } else {
        tracing::info!(count = applied.len(), "Schema migrations applied");
    }

    Ok(applied)
}

pub async fn applied_migrations(pool: &PgPool) -> Result<Vec<models::MigrationRecord>, StoreError> {
    sqlx::query_as::<_, models::MigrationRecord>(
        "SELECT id, name, applied_at FROM migrations ORDER BY id",
    )
    .fetch_all(pool)
    .await
    .map_err(|err| log_failure("list applied migrations", err))
}
