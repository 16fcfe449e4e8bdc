// Vote repository: crowd-sourced verdicts on a pending vote word.
use sqlx::PgPool;

use crate::errors::StoreError;
use crate::models::Vote;

#[derive(Clone)]
pub struct VoteRepository {
    pool: PgPool,
}

impl VoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Unique on `(player_id, title)` — a duplicate is the user-facing
    /// "you already voted" case, converted by the caller into
    /// `vote_conflict`.
    pub async fn create_vote(
        &self,
        game_id: i64,
        player_id: i64,
        title: &str,
        is_correct: bool,
    ) -> Result<Vote, StoreError> {
        let vote = sqlx::query_as::<_, Vote>(
            "INSERT INTO votes (game_id, player_id, title, is_correct)
             VALUES ($1, $2, $3, $4)
             RETURNING id, game_id, player_id, title, is_correct",
        )
        .bind(game_id)
        .bind(player_id)
        .bind(title)
        .bind(is_correct)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            StoreError::from_sqlx(e, &format!("vote by player {player_id} on '{title}'"))
        })?;
        Ok(vote)
    }

    pub async fn list_votes(&self, game_id: i64, title: &str) -> Result<Vec<Vote>, StoreError> {
        let votes = sqlx::query_as::<_, Vote>(
            "SELECT id, game_id, player_id, title, is_correct
             FROM votes WHERE game_id = $1 AND title = $2",
        )
        .bind(game_id)
        .bind(title)
        .fetch_all(&self.pool)
        .await?;
        Ok(votes)
    }
}
