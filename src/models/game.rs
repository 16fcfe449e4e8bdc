use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use std::fmt;

use crate::models::{Player, Setting};

/// Status column of the `games` table.
///
/// Stored as plain `TEXT` (not a Postgres native enum type), matching the
/// original schema's string status column — see Open Questions in
/// `SPEC_FULL.md` about avoiding the `jsonb`/`astext` cast dead code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Init,
    Registration,
    Started,
    VoteWord,
    Finished,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Init => "init",
            GameStatus::Registration => "registration",
            GameStatus::Started => "started",
            GameStatus::VoteWord => "vote_word",
            GameStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GameStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "init" => Ok(GameStatus::Init),
            "registration" => Ok(GameStatus::Registration),
            "started" => Ok(GameStatus::Started),
            "vote_word" => Ok(GameStatus::VoteWord),
            "finished" => Ok(GameStatus::Finished),
            other => Err(format!("unknown game status: {other}")),
        }
    }
}

/// `games` table row, flat with nullable fields for states that don't use
/// them, per the DB schema in `spec.md` §3. `RoomEngine` still holds this
/// row for `id`/`peer_id` and for writing `patch_game` calls, but decides
/// behavior by converting it to the tagged `GameState` enum in
/// `crate::game::state` first — every nullable field here has a non-null
/// counterpart on the `GameState` variant that matched it.
#[derive(Debug, Clone, FromRow)]
pub struct GameRow {
    pub id: i64,
    pub peer_id: i64,
    pub setting_id: i64,
    pub status: String,
    pub moves_order: Option<String>,
    pub current_move: Option<i64>,
    pub last_word: Option<String>,
    pub vote_word: Option<String>,
    pub event_timestamp: Option<DateTime<Utc>>,
    pub elapsed_time: i32,
}

impl GameRow {
    pub fn status(&self) -> GameStatus {
        self.status.parse().unwrap_or(GameStatus::Init)
    }

    /// Parse the space-separated `moves_order` string into user ids.
    pub fn moves_order_vec(&self) -> Vec<i64> {
        self.moves_order
            .as_deref()
            .map(|s| s.split_whitespace().filter_map(|p| p.parse().ok()).collect())
            .unwrap_or_default()
    }

    pub fn encode_moves_order(ids: &[i64]) -> String {
        ids.iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A game row eagerly joined with its setting and players, as returned by
/// `get_game_by_id` / `list_active_games`.
#[derive(Debug, Clone)]
pub struct GameAggregate {
    pub game: GameRow,
    pub setting: Setting,
    pub players: Vec<Player>,
}
