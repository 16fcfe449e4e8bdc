// Player repository: per-game participants.
use sqlx::PgPool;

use crate::errors::StoreError;
use crate::models::{Player, PlayerStatus};

#[derive(Clone)]
pub struct PlayerRepository {
    pool: PgPool,
}

impl PlayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create with `status=Active, online=true, score=0`. Fails with
    /// `UniqueViolation` on `(user_id, game_id)` duplicate (the player
    /// already registered), `FKViolation` if the game is gone.
    pub async fn create_player(
        &self,
        game_id: i64,
        user_id: i64,
        name: &str,
    ) -> Result<Player, StoreError> {
        let player = sqlx::query_as::<_, Player>(
            "INSERT INTO players (game_id, user_id, name, status, online, score)
             VALUES ($1, $2, $3, 'Active', TRUE, 0)
             RETURNING id, game_id, user_id, name, status, online, score",
        )
        .bind(game_id)
        .bind(user_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(e, &format!("player {user_id} in game {game_id}")))?;

        tracing::debug!(game_id, user_id, name, "registered player");
        Ok(player)
    }

    pub async fn list_players(&self, game_id: i64) -> Result<Vec<Player>, StoreError> {
        let players = sqlx::query_as::<_, Player>(
            "SELECT id, game_id, user_id, name, status, online, score
             FROM players WHERE game_id = $1 ORDER BY id",
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(players)
    }

    /// Ordered `(status DESC, score DESC)` so the Winner (if any) and the
    /// highest scorers sort first — the shape the scoreboard (§4.5.3)
    /// reads directly.
    pub async fn list_player_ranked(&self, game_id: i64) -> Result<Vec<Player>, StoreError> {
        let players = sqlx::query_as::<_, Player>(
            "SELECT id, game_id, user_id, name, status, online, score
             FROM players WHERE game_id = $1
             ORDER BY status DESC, score DESC",
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(players)
    }

    pub async fn find_player(
        &self,
        game_id: i64,
        user_id: i64,
    ) -> Result<Option<Player>, StoreError> {
        let player = sqlx::query_as::<_, Player>(
            "SELECT id, game_id, user_id, name, status, online, score
             FROM players WHERE game_id = $1 AND user_id = $2",
        )
        .bind(game_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(player)
    }

    /// Atomically increment a player's score by 1.
    pub async fn player_scored(&self, player_id: i64) -> Result<Player, StoreError> {
        let player = sqlx::query_as::<_, Player>(
            "UPDATE players SET score = score + 1 WHERE id = $1
             RETURNING id, game_id, user_id, name, status, online, score",
        )
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("player {player_id}")))?;
        Ok(player)
    }

    pub async fn patch_player(
        &self,
        player_id: i64,
        online: Option<bool>,
        status: Option<PlayerStatus>,
        score: Option<i32>,
    ) -> Result<Player, StoreError> {
        let player = sqlx::query_as::<_, Player>(
            "UPDATE players SET
                online = COALESCE($1, online),
                status = COALESCE($2, status),
                score = COALESCE($3, score)
             WHERE id = $4
             RETURNING id, game_id, user_id, name, status, online, score",
        )
        .bind(online)
        .bind(status.map(|s| s.as_str().to_string()))
        .bind(score)
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("player {player_id}")))?;
        Ok(player)
    }
}
