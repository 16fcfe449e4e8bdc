use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// `words` table row: the known-word dictionary, with a black-list flag
/// for confirmed non-words.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Word {
    pub id: i64,
    pub title: String,
    pub is_correct: bool,
}
