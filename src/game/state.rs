// Tagged game state (REDESIGN FLAGS, `spec.md` §9): each variant only
// carries the fields that make sense for it, instead of the nullable-column
// `GameRow` the store persists. `RoomEngine` builds this from the freshly
// loaded `GameRow` at the top of every dispatch and matches on it to decide
// which handler runs and what non-null data that handler gets to work
// with — the raw `GameRow` is kept alongside only for `game.id`/`peer_id`
// and for `patch_game` writes, never consulted for its nullable fields
// once a `GameState` has been built from it.

use chrono::{DateTime, Duration, Utc};

use crate::models::{GameRow, GameStatus};

#[derive(Debug, Clone)]
pub enum GameState {
    Init,
    Registration {
        deadline: DateTime<Utc>,
    },
    Started {
        moves_order: Vec<i64>,
        current: i64,
        last_word: String,
        deadline: DateTime<Utc>,
    },
    VoteWord {
        moves_order: Vec<i64>,
        current: i64,
        last_word: String,
        vote_word: String,
        deadline: DateTime<Utc>,
    },
    Finished {
        winner: Option<i64>,
    },
}

impl GameState {
    /// Reconstruct the tagged state from a flat row. `timeout` is the
    /// setting's per-turn timeout in seconds, needed to turn the row's
    /// `event_timestamp` (the moment the current timer was *armed*) into
    /// an actual deadline. `winner` for the `Finished` variant isn't
    /// stored on the row directly — it is the sole player whose `status`
    /// is `Winner`, so the caller resolves it from the player list and
    /// passes it in here.
    pub fn from_row(row: &GameRow, timeout: i32, winner: Option<i64>) -> Self {
        match row.status() {
            GameStatus::Init => GameState::Init,
            GameStatus::Registration => GameState::Registration {
                deadline: deadline_from(row, timeout),
            },
            GameStatus::Started => GameState::Started {
                moves_order: row.moves_order_vec(),
                current: row.current_move.unwrap_or_default(),
                last_word: row.last_word.clone().unwrap_or_default(),
                deadline: deadline_from(row, timeout),
            },
            GameStatus::VoteWord => GameState::VoteWord {
                moves_order: row.moves_order_vec(),
                current: row.current_move.unwrap_or_default(),
                last_word: row.last_word.clone().unwrap_or_default(),
                vote_word: row.vote_word.clone().unwrap_or_default(),
                deadline: deadline_from(row, timeout),
            },
            GameStatus::Finished => GameState::Finished { winner },
        }
    }

    pub fn status(&self) -> GameStatus {
        match self {
            GameState::Init => GameStatus::Init,
            GameState::Registration { .. } => GameStatus::Registration,
            GameState::Started { .. } => GameStatus::Started,
            GameState::VoteWord { .. } => GameStatus::VoteWord,
            GameState::Finished { .. } => GameStatus::Finished,
        }
    }

    pub fn current_player_id(&self) -> Option<i64> {
        match self {
            GameState::Started { current, .. } | GameState::VoteWord { current, .. } => {
                Some(*current)
            }
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        match self {
            GameState::Registration { deadline }
            | GameState::Started { deadline, .. }
            | GameState::VoteWord { deadline, .. } => Some(*deadline),
            _ => None,
        }
    }
}

/// The row's `event_timestamp` is the moment the currently-armed timer was
/// started, not the moment it expires — add the setting's timeout to get
/// the actual deadline.
fn deadline_from(row: &GameRow, timeout: i32) -> DateTime<Utc> {
    let armed_at = row.event_timestamp.unwrap_or_else(Utc::now);
    armed_at + Duration::seconds(timeout as i64)
}

/// Circular successor of `current` within `moves_order`, skipping nothing
/// (removal happens separately) — wraps to the front past the last id.
pub fn next_in_rotation(moves_order: &[i64], current: i64) -> Option<i64> {
    let pos = moves_order.iter().position(|&id| id == current)?;
    moves_order.get((pos + 1) % moves_order.len()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_row() -> GameRow {
        GameRow {
            id: 1,
            peer_id: 10,
            setting_id: 1,
            status: "init".to_string(),
            moves_order: None,
            current_move: None,
            last_word: None,
            vote_word: None,
            event_timestamp: None,
            elapsed_time: 0,
        }
    }

    #[test]
    fn started_reads_moves_order_and_current_move_user_id() {
        let mut row = base_row();
        row.status = "started".to_string();
        row.moves_order = Some(GameRow::encode_moves_order(&[7, 8, 9]));
        row.current_move = Some(8);
        row.last_word = Some("кот".to_string());
        row.event_timestamp = Some(Utc::now());

        let state = GameState::from_row(&row, 30, None);
        match &state {
            GameState::Started {
                moves_order,
                current,
                last_word,
                ..
            } => {
                assert_eq!(moves_order, &vec![7, 8, 9]);
                assert_eq!(*current, 8);
                assert_eq!(last_word, "кот");
            }
            other => panic!("expected Started, got {other:?}"),
        }
        assert_eq!(state.current_player_id(), Some(8));
    }

    #[test]
    fn deadline_is_arm_time_plus_timeout_not_arm_time_itself() {
        let mut row = base_row();
        row.status = "started".to_string();
        row.moves_order = Some(GameRow::encode_moves_order(&[1, 2]));
        row.current_move = Some(1);
        row.last_word = Some("кот".to_string());
        let armed_at = Utc::now();
        row.event_timestamp = Some(armed_at);

        let state = GameState::from_row(&row, 45, None);
        let deadline = state.deadline().unwrap();
        assert_eq!(deadline, armed_at + Duration::seconds(45));
        assert!(deadline > armed_at, "deadline must be later than arm time, not equal to it");
    }

    #[test]
    fn finished_carries_winner() {
        let mut row = base_row();
        row.status = "finished".to_string();
        let state = GameState::from_row(&row, 30, Some(42));
        assert!(matches!(state, GameState::Finished { winner: Some(42) }));
    }

    #[test]
    fn rotation_wraps_to_front() {
        assert_eq!(next_in_rotation(&[7, 8, 9], 9), Some(7));
        assert_eq!(next_in_rotation(&[7, 8, 9], 8), Some(9));
        assert_eq!(next_in_rotation(&[7], 7), Some(7));
    }
}
