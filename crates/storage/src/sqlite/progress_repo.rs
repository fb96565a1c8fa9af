use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use progress_core::model::{AssignmentId, GameId, ItemId, StudentId};

use super::SqliteRepository;
use crate::repository::{
    AssignmentGame, AssignmentRecord, GameProgressRow, ProgressRepository, StorageError,
};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn assignment_id_from_text(value: &str) -> Result<AssignmentId, StorageError> {
    value.parse::<AssignmentId>().map_err(ser)
}

fn game_id_from_text(value: &str) -> Result<GameId, StorageError> {
    GameId::new(value).map_err(ser)
}

fn items_required_from_i64(value: i64) -> Result<u32, StorageError> {
    u32::try_from(value).map_err(|_| StorageError::Serialization(format!("invalid items_required: {value}")))
}

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn upsert_assignment(&self, assignment: &AssignmentRecord) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
                INSERT INTO assignments (id, name)
                VALUES (?1, ?2)
                ON CONFLICT(id) DO UPDATE SET name = excluded.name
            ",
        )
        .bind(assignment.id.to_string())
        .bind(&assignment.name)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        sqlx::query("DELETE FROM assignment_games WHERE assignment_id = ?1")
            .bind(assignment.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for game in &assignment.games {
            sqlx::query(
                r"
                    INSERT INTO assignment_games (assignment_id, game_id, items_required)
                    VALUES (?1, ?2, ?3)
                ",
            )
            .bind(assignment.id.to_string())
            .bind(game.game_id.as_str())
            .bind(i64::from(game.items_required))
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)
    }

    async fn get_assignment(&self, id: AssignmentId) -> Result<AssignmentRecord, StorageError> {
        let row = sqlx::query("SELECT id, name FROM assignments WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?
            .ok_or(StorageError::NotFound)?;

        let id = assignment_id_from_text(row.try_get::<String, _>("id").map_err(ser)?.as_str())?;
        let name: String = row.try_get("name").map_err(ser)?;

        let game_rows = sqlx::query(
            r"
                SELECT game_id, items_required
                FROM assignment_games
                WHERE assignment_id = ?1
                ORDER BY game_id
            ",
        )
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut games = Vec::with_capacity(game_rows.len());
        for row in &game_rows {
            games.push(AssignmentGame {
                game_id: game_id_from_text(row.try_get::<String, _>("game_id").map_err(ser)?.as_str())?,
                items_required: items_required_from_i64(
                    row.try_get::<i64, _>("items_required").map_err(ser)?,
                )?,
            });
        }

        Ok(AssignmentRecord { id, name, games })
    }

    async fn record_correct_item(
        &self,
        assignment_id: AssignmentId,
        student_id: StudentId,
        game_id: &GameId,
        item_id: &ItemId,
        answered_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let configured = sqlx::query(
            r"
                SELECT 1 FROM assignment_games
                WHERE assignment_id = ?1 AND game_id = ?2
            ",
        )
        .bind(assignment_id.to_string())
        .bind(game_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;
        if configured.is_none() {
            return Err(StorageError::NotFound);
        }

        let res = sqlx::query(
            r"
                INSERT INTO progress_items (assignment_id, student_id, game_id, item_id, answered_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(assignment_id, student_id, game_id, item_id) DO NOTHING
            ",
        )
        .bind(assignment_id.to_string())
        .bind(student_id.to_string())
        .bind(game_id.as_str())
        .bind(item_id.as_str())
        .bind(answered_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.rows_affected() == 1)
    }

    async fn list_progress(
        &self,
        assignment_id: AssignmentId,
        student_id: StudentId,
    ) -> Result<Vec<GameProgressRow>, StorageError> {
        let exists = sqlx::query("SELECT 1 FROM assignments WHERE id = ?1")
            .bind(assignment_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        if exists.is_none() {
            return Err(StorageError::NotFound);
        }

        let rows = sqlx::query(
            r"
                SELECT
                    g.game_id,
                    g.items_required,
                    COUNT(p.item_id) AS unique_correct_items
                FROM assignment_games g
                LEFT JOIN progress_items p
                    ON p.assignment_id = g.assignment_id
                    AND p.game_id = g.game_id
                    AND p.student_id = ?2
                WHERE g.assignment_id = ?1
                GROUP BY g.game_id, g.items_required
                ORDER BY g.game_id
            ",
        )
        .bind(assignment_id.to_string())
        .bind(student_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut progress = Vec::with_capacity(rows.len());
        for row in &rows {
            let count: i64 = row.try_get("unique_correct_items").map_err(ser)?;
            progress.push(GameProgressRow {
                game_id: game_id_from_text(row.try_get::<String, _>("game_id").map_err(ser)?.as_str())?,
                unique_correct_items: u32::try_from(count)
                    .map_err(|_| StorageError::Serialization(format!("invalid count: {count}")))?,
                items_required: items_required_from_i64(
                    row.try_get::<i64, _>("items_required").map_err(ser)?,
                )?,
            });
        }
        Ok(progress)
    }
}
