// UsedWord repository: words already played in a given game.
use sqlx::{PgPool, Postgres, Transaction};

use crate::errors::StoreError;
use crate::models::UsedWord;

#[derive(Clone)]
pub struct UsedWordRepository {
    pool: PgPool,
}

impl UsedWordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Unique on `(game_id, title)` — a duplicate indicates the engine's
    /// own `is_word_used` check raced something and should be treated as
    /// a bug, not a user-facing conflict.
    pub async fn create_used_word(
        &self,
        game_id: i64,
        title: &str,
    ) -> Result<UsedWord, StoreError> {
        let title = title.to_lowercase();
        let used = sqlx::query_as::<_, UsedWord>(
            "INSERT INTO usedwords (game_id, title) VALUES ($1, $2)
             RETURNING id, game_id, title",
        )
        .bind(game_id)
        .bind(&title)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(e, &format!("used word '{title}' in game {game_id}")))?;
        Ok(used)
    }

    pub async fn list_used_words(&self, game_id: i64) -> Result<Vec<UsedWord>, StoreError> {
        let words = sqlx::query_as::<_, UsedWord>(
            "SELECT id, game_id, title FROM usedwords WHERE game_id = $1 ORDER BY id",
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(words)
    }

    pub async fn is_used(&self, game_id: i64, title: &str) -> Result<bool, StoreError> {
        let title = title.to_lowercase();
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM usedwords WHERE game_id = $1 AND title = $2)",
        )
        .bind(game_id)
        .bind(&title)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Delete every used-word row for a game, as part of `clear_game`'s
    /// transaction.
    pub(crate) async fn delete_all_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        game_id: i64,
    ) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM usedwords WHERE game_id = $1")
            .bind(game_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
