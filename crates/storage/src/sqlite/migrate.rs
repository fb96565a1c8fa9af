use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the full schema (assignments, per-assignment game thresholds,
/// per-student correct-item records, and indexes).
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS assignments (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS assignment_games (
                    assignment_id TEXT NOT NULL,
                    game_id TEXT NOT NULL,
                    items_required INTEGER NOT NULL CHECK (items_required >= 0),
                    PRIMARY KEY (assignment_id, game_id),
                    FOREIGN KEY (assignment_id) REFERENCES assignments(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        // Items are keyed by (assignment, student, game, item) so a repeat
        // answer for the same item cannot inflate the unique count.
        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS progress_items (
                    assignment_id TEXT NOT NULL,
                    student_id TEXT NOT NULL,
                    game_id TEXT NOT NULL,
                    item_id TEXT NOT NULL,
                    answered_at TEXT NOT NULL,
                    PRIMARY KEY (assignment_id, student_id, game_id, item_id),
                    FOREIGN KEY (assignment_id) REFERENCES assignments(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_progress_items_student
                    ON progress_items (assignment_id, student_id, game_id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
