use sqlx::prelude::FromRow;

/// `usedwords` table row: a word already played in a given game.
#[derive(Debug, Clone, FromRow)]
pub struct UsedWord {
    pub id: i64,
    pub game_id: i64,
    pub title: String,
}
