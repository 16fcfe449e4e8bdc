use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// `settings` table row: a game mode binding a per-turn timeout to a
/// dictionary source ("слова" or "города").
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Setting {
    pub id: i64,
    pub title: String,
    pub timeout: i32,
}

pub const WORDS_SETTING_TITLE: &str = "слова";
pub const CITIES_SETTING_TITLE: &str = "города";
