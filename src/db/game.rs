// Game repository: the durable state machine row (C1 §4.1).
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::db::{PlayerRepository, SettingRepository, UsedWordRepository};
use crate::errors::StoreError;
use crate::models::{GameAggregate, GameRow, GameStatus};

#[derive(Clone)]
pub struct GameRepository {
    pool: PgPool,
}

/// Partial update for `patch_game`. Every field is optional; a field set
/// to `Clear(None)` writes SQL `NULL`, a field set to `Clear(Some(v))`
/// writes `v`, and `Keep` leaves the column untouched. This lets a single
/// partial-update call express both "set this" and "null this out",
/// which `spec.md`'s transitions both need (e.g. `next_player` clears
/// `vote_word` on resuming play).
#[derive(Debug, Default)]
pub struct GamePatch {
    pub status: Option<GameStatus>,
    pub setting_id: Option<i64>,
    pub moves_order: Clearable<String>,
    pub current_move: Clearable<i64>,
    pub last_word: Clearable<String>,
    pub vote_word: Clearable<String>,
    pub event_timestamp: Clearable<DateTime<Utc>>,
    pub elapsed_time: Option<i32>,
}

#[derive(Debug, Default, Clone)]
pub enum Clearable<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> Clearable<T> {
    fn into_option(self) -> Option<Option<T>> {
        match self {
            Clearable::Keep => None,
            Clearable::Clear => Some(None),
            Clearable::Set(v) => Some(Some(v)),
        }
    }
}

impl GameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_aggregate(
        &self,
        game: GameRow,
        settings: &SettingRepository,
        players: &PlayerRepository,
    ) -> Result<GameAggregate, StoreError> {
        let setting = settings.get_setting_by_id(game.setting_id).await?;
        let players = players.list_players(game.id).await?;
        Ok(GameAggregate {
            game,
            setting,
            players,
        })
    }

    /// Fetch a game row, eagerly joined with its setting and players.
    pub async fn get_game_by_id(
        &self,
        id: i64,
        settings: &SettingRepository,
        players: &PlayerRepository,
    ) -> Result<GameAggregate, StoreError> {
        let row = sqlx::query_as::<_, GameRow>(
            "SELECT id, peer_id, setting_id, status, moves_order, current_move,
                    last_word, vote_word, event_timestamp, elapsed_time
             FROM games WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("game {id}")))?;

        self.load_aggregate(row, settings, players).await
    }

    /// Create a fresh game in status `init` for a peer.
    pub async fn create_game(&self, setting_id: i64, peer_id: i64) -> Result<GameRow, StoreError> {
        let game = sqlx::query_as::<_, GameRow>(
            "INSERT INTO games (peer_id, setting_id, status, elapsed_time)
             VALUES ($1, $2, 'init', 0)
             RETURNING id, peer_id, setting_id, status, moves_order, current_move,
                       last_word, vote_word, event_timestamp, elapsed_time",
        )
        .bind(peer_id)
        .bind(setting_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(e, &format!("game for peer {peer_id}")))?;

        tracing::info!(game_id = game.id, peer_id, "created game");
        Ok(game)
    }

    /// Every game whose status is not `finished`, eagerly joined. Used by
    /// the Coordinator at boot. Combines the optional `peer_id` filter
    /// with `status <> 'finished'` using a real SQL `AND` — never the
    /// Python `and`-on-expressions bug recorded in the Open Questions.
    pub async fn list_active_games(
        &self,
        peer_id: Option<i64>,
        settings: &SettingRepository,
        players: &PlayerRepository,
    ) -> Result<Vec<GameAggregate>, StoreError> {
        let rows = match peer_id {
            Some(peer_id) => {
                sqlx::query_as::<_, GameRow>(
                    "SELECT id, peer_id, setting_id, status, moves_order, current_move,
                            last_word, vote_word, event_timestamp, elapsed_time
                     FROM games
                     WHERE status <> 'finished' AND peer_id = $1
                     ORDER BY id",
                )
                .bind(peer_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, GameRow>(
                    "SELECT id, peer_id, setting_id, status, moves_order, current_move,
                            last_word, vote_word, event_timestamp, elapsed_time
                     FROM games
                     WHERE status <> 'finished'
                     ORDER BY id",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut aggregates = Vec::with_capacity(rows.len());
        for row in rows {
            aggregates.push(self.load_aggregate(row, settings, players).await?);
        }
        Ok(aggregates)
    }

    /// List games, newest event first, optionally filtered by peer and/or
    /// status.
    pub async fn list_games(
        &self,
        peer_id: Option<i64>,
        status: Option<GameStatus>,
    ) -> Result<Vec<GameRow>, StoreError> {
        let rows = sqlx::query_as::<_, GameRow>(
            "SELECT id, peer_id, setting_id, status, moves_order, current_move,
                    last_word, vote_word, event_timestamp, elapsed_time
             FROM games
             WHERE ($1::BIGINT IS NULL OR peer_id = $1)
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY event_timestamp DESC NULLS LAST",
        )
        .bind(peer_id)
        .bind(status.map(|s| s.as_str().to_string()))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Most recent finished game for a peer, if any (used by `!статус`
    /// when the live game is still in `init`).
    pub async fn latest_finished_game(
        &self,
        peer_id: i64,
    ) -> Result<Option<GameRow>, StoreError> {
        let row = sqlx::query_as::<_, GameRow>(
            "SELECT id, peer_id, setting_id, status, moves_order, current_move,
                    last_word, vote_word, event_timestamp, elapsed_time
             FROM games
             WHERE peer_id = $1 AND status = 'finished'
             ORDER BY id DESC
             LIMIT 1",
        )
        .bind(peer_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Atomically delete all players and used-words for the game, then
    /// reset its fields to the initial `init` state. Runs in one
    /// transaction so a crash mid-clear never leaves an orphaned half
    /// reset.
    pub async fn clear_game(
        &self,
        game_id: i64,
        used_words: &UsedWordRepository,
    ) -> Result<GameRow, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM players WHERE game_id = $1")
            .bind(game_id)
            .execute(&mut *tx)
            .await?;
        used_words.delete_all_in_tx(&mut tx, game_id).await?;

        let game = sqlx::query_as::<_, GameRow>(
            "UPDATE games
             SET status = 'init', moves_order = NULL, event_timestamp = NULL,
                 current_move = NULL, elapsed_time = 0, last_word = NULL, vote_word = NULL
             WHERE id = $1
             RETURNING id, peer_id, setting_id, status, moves_order, current_move,
                       last_word, vote_word, event_timestamp, elapsed_time",
        )
        .bind(game_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("game {game_id}")))?;

        tx.commit().await?;

        tracing::info!(game_id, "cleared game back to init");
        Ok(game)
    }

    /// Partial update of any subset of mutable fields.
    pub async fn patch_game(&self, game_id: i64, patch: GamePatch) -> Result<GameRow, StoreError> {
        let GamePatch {
            status,
            setting_id,
            moves_order,
            current_move,
            last_word,
            vote_word,
            event_timestamp,
            elapsed_time,
        } = patch;

        let moves_order = moves_order.into_option();
        let current_move = current_move.into_option();
        let last_word = last_word.into_option();
        let vote_word = vote_word.into_option();
        let event_timestamp = event_timestamp.into_option();

        let game = sqlx::query_as::<_, GameRow>(
            "UPDATE games SET
                status = COALESCE($1, status),
                setting_id = COALESCE($2, setting_id),
                moves_order = CASE WHEN $3 THEN $4 ELSE moves_order END,
                current_move = CASE WHEN $5 THEN $6 ELSE current_move END,
                last_word = CASE WHEN $7 THEN $8 ELSE last_word END,
                vote_word = CASE WHEN $9 THEN $10 ELSE vote_word END,
                event_timestamp = CASE WHEN $11 THEN $12 ELSE event_timestamp END,
                elapsed_time = COALESCE($13, elapsed_time)
             WHERE id = $14
             RETURNING id, peer_id, setting_id, status, moves_order, current_move,
                       last_word, vote_word, event_timestamp, elapsed_time",
        )
        .bind(status.map(|s| s.as_str().to_string()))
        .bind(setting_id)
        .bind(moves_order.is_some())
        .bind(moves_order.flatten())
        .bind(current_move.is_some())
        .bind(current_move.flatten())
        .bind(last_word.is_some())
        .bind(last_word.flatten())
        .bind(vote_word.is_some())
        .bind(vote_word.flatten())
        .bind(event_timestamp.is_some())
        .bind(event_timestamp.flatten())
        .bind(elapsed_time)
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("game {game_id}")))?;

        Ok(game)
    }
}
