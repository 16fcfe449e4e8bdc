use sqlx::prelude::FromRow;

/// `votes` table row: one player's verdict on a crowd-sourced word,
/// unique per `(player_id, title)`.
#[derive(Debug, Clone, FromRow)]
pub struct Vote {
    pub id: i64,
    pub game_id: i64,
    pub player_id: i64,
    pub title: String,
    pub is_correct: bool,
}
