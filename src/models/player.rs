use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use std::fmt;

/// `players` table row's `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PlayerStatus {
    Active,
    Winner,
}

impl PlayerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerStatus::Active => "Active",
            PlayerStatus::Winner => "Winner",
        }
    }
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlayerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(PlayerStatus::Active),
            "Winner" => Ok(PlayerStatus::Winner),
            other => Err(format!("unknown player status: {other}")),
        }
    }
}

/// `players` table row. Unique on `(user_id, game_id)`; cascade-deleted
/// with the owning game.
#[derive(Debug, Clone, FromRow)]
pub struct Player {
    pub id: i64,
    pub game_id: i64,
    pub user_id: i64,
    pub name: String,
    pub status: String,
    pub online: bool,
    pub score: i32,
}

impl Player {
    pub fn status(&self) -> PlayerStatus {
        self.status.parse().unwrap_or(PlayerStatus::Active)
    }
}
