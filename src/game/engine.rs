// Per-room game logic (C5): the word-validation pipeline (§4.5.2),
// `next_player` (§4.5.2 continued), the scoreboard (§4.5.3), vote tally
// (§4.5.4), and the registration->play transition (§4.5.1). Every entry
// point loads a fresh `GameRow`, converts it to a `GameState` and
// dispatches on *that* — the handlers below never read `game.current_move`
// / `game.last_word` / `game.moves_order` directly, only the non-null
// fields a matched `GameState` variant hands them. Loading straight off
// the row (never from anything cached in-memory) is what lets a restart
// never see stale state (`spec.md` §5).
//
// This module has no notion of a mailbox or a spawned task — that belongs
// to `actor.rs`. Every method here runs to completion for one inbound
// event and returns a `TimerPlan` telling the actor what to arm next.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::seq::SliceRandom;

use crate::catalog;
use crate::chat_gateway::ChatGateway;
use crate::db::{Clearable, GamePatch, Store};
use crate::errors::{EngineError, StoreError};
use crate::models::{GameRow, GameStatus, Player, PlayerStatus, Setting};

use super::dictionary::{self, DictionaryVerdict};
use super::rules;
use super::state::{next_in_rotation, GameState};

/// What the actor should do with its timer after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPlan {
    /// Leave whatever timer is currently armed running, untouched.
    Unchanged,
    /// Cancel any current timer (with `CancelReason::Normal`) and arm a
    /// fresh one for this duration.
    Rearm(Duration),
    /// Cancel any current timer (with `CancelReason::Normal`); arm none.
    Cancel,
}

pub struct RoomEngine {
    store: Store,
    gateway: Arc<dyn ChatGateway>,
}

impl RoomEngine {
    pub fn new(store: Store, gateway: Arc<dyn ChatGateway>) -> Self {
        Self { store, gateway }
    }

    /// Dispatch one inbound chat message against the game's current
    /// persisted state, per the state table in `spec.md` §4.5.
    pub async fn dispatch_update(
        &self,
        game_id: i64,
        user_id: i64,
        body: &str,
    ) -> Result<TimerPlan, EngineError> {
        let aggregate = self
            .store
            .games
            .get_game_by_id(game_id, &self.store.settings, &self.store.players)
            .await?;
        let body = body.trim();

        if body.to_lowercase() == "!статус" {
            self.handle_status(&aggregate.game, &aggregate.players).await?;
            return Ok(TimerPlan::Unchanged);
        }

        let state = GameState::from_row(&aggregate.game, aggregate.setting.timeout, winner_id(&aggregate.players));

        match state {
            GameState::Init => self.handle_init(aggregate.game, user_id, body).await,
            GameState::Registration { .. } => {
                self.handle_registration(aggregate.game, &aggregate.setting, user_id, body, &aggregate.players)
                    .await
            }
            GameState::Started {
                moves_order,
                current,
                last_word,
                ..
            } => {
                self.handle_started(
                    aggregate.game,
                    &aggregate.setting,
                    &aggregate.players,
                    user_id,
                    body,
                    &moves_order,
                    current,
                    &last_word,
                )
                .await
            }
            GameState::VoteWord {
                current, vote_word, ..
            } => {
                self.handle_vote_word(aggregate.game, &aggregate.setting, &aggregate.players, user_id, body, current, &vote_word)
                    .await
            }
            // A finished game's room is replaced by the Coordinator before
            // dispatch reaches here; a stray update is a no-op.
            GameState::Finished { .. } => Ok(TimerPlan::Unchanged),
        }
    }

    /// A previously armed timer fired. Stale fires (the timer the actor
    /// held was already superseded) are filtered out by the actor before
    /// this is called.
    pub async fn handle_timer_fired(&self, game_id: i64) -> Result<TimerPlan, EngineError> {
        let aggregate = self
            .store
            .games
            .get_game_by_id(game_id, &self.store.settings, &self.store.players)
            .await?;

        let state = GameState::from_row(&aggregate.game, aggregate.setting.timeout, winner_id(&aggregate.players));

        match state {
            GameState::Registration { .. } => {
                self.registration_timeout(aggregate.game, &aggregate.setting, &aggregate.players)
                    .await
            }
            GameState::Started {
                moves_order,
                current,
                last_word,
                ..
            } => {
                self.started_timeout(aggregate.game, &aggregate.players, &moves_order, current, &last_word)
                    .await
            }
            GameState::VoteWord {
                moves_order,
                current,
                last_word,
                vote_word,
                ..
            } => {
                self.vote_timeout(aggregate.game, &aggregate.players, &moves_order, current, &last_word, &vote_word)
                    .await
            }
            GameState::Init | GameState::Finished { .. } => Ok(TimerPlan::Unchanged),
        }
    }

    /// Boot recovery (`spec.md` §4.6): re-announce whatever the live
    /// game was waiting on and arm a timer for the remaining duration.
    pub async fn re_init(&self, game_id: i64) -> Result<TimerPlan, EngineError> {
        let aggregate = self
            .store
            .games
            .get_game_by_id(game_id, &self.store.settings, &self.store.players)
            .await?;
        let game = &aggregate.game;
        let setting = &aggregate.setting;
        let remaining = (setting.timeout - game.elapsed_time).max(0) as u64;
        let state = GameState::from_row(game, setting.timeout, winner_id(&aggregate.players));

        let plan = match state {
            GameState::Registration { .. } => {
                self.gateway
                    .send_message(
                        game.peer_id,
                        &catalog::registration_prompt(&setting.title, setting.timeout),
                    )
                    .await;
                TimerPlan::Rearm(Duration::from_secs(remaining))
            }
            GameState::Started { current, last_word, .. } => {
                let current_name = player_name(&aggregate.players, current);
                self.gateway
                    .send_message(
                        game.peer_id,
                        &catalog::player_move(&current_name, &last_word, setting.timeout),
                    )
                    .await;
                TimerPlan::Rearm(Duration::from_secs(remaining))
            }
            GameState::VoteWord { vote_word, .. } => {
                self.gateway
                    .send_message(game.peer_id, &catalog::vote_prompt(&vote_word, setting.timeout))
                    .await;
                TimerPlan::Rearm(Duration::from_secs(remaining))
            }
            GameState::Init | GameState::Finished { .. } => TimerPlan::Unchanged,
        };

        if plan != TimerPlan::Unchanged {
            self.store
                .games
                .patch_game(
                    game.id,
                    GamePatch {
                        elapsed_time: Some(0),
                        ..Default::default()
                    },
                )
                .await?;
        }

        Ok(plan)
    }

    async fn handle_init(&self, game: GameRow, _user_id: i64, body: &str) -> Result<TimerPlan, EngineError> {
        use crate::models::{CITIES_SETTING_TITLE, WORDS_SETTING_TITLE};

        let title = body.to_lowercase();
        if title != WORDS_SETTING_TITLE && title != CITIES_SETTING_TITLE {
            self.gateway.send_message(game.peer_id, &catalog::start_hint()).await;
            return Ok(TimerPlan::Unchanged);
        }

        let setting = self.store.settings.get_setting_by_title(&title).await?;
        self.store
            .games
            .patch_game(
                game.id,
                GamePatch {
                    status: Some(GameStatus::Registration),
                    setting_id: Some(setting.id),
                    event_timestamp: Clearable::Set(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;

        self.gateway
            .send_message(game.peer_id, &catalog::registration_prompt(&setting.title, setting.timeout))
            .await;
        Ok(TimerPlan::Rearm(Duration::from_secs(setting.timeout as u64)))
    }

    async fn handle_registration(
        &self,
        game: GameRow,
        setting: &Setting,
        user_id: i64,
        body: &str,
        players: &[Player],
    ) -> Result<TimerPlan, EngineError> {
        if body.to_lowercase() == "я" {
            let name = self.resolve_display_name(game.peer_id, user_id).await;
            let name = name.as_str();

            if players.iter().any(|p| p.user_id == user_id) {
                self.gateway
                    .send_message(game.peer_id, &catalog::registration_conflict(name))
                    .await;
                return Ok(TimerPlan::Unchanged);
            }

            match self.store.players.create_player(game.id, user_id, name).await {
                Ok(_) => {
                    self.gateway
                        .send_message(game.peer_id, &catalog::registration_ack(name))
                        .await
                }
                Err(StoreError::UniqueViolation(_)) => {
                    self.gateway
                        .send_message(game.peer_id, &catalog::registration_conflict(name))
                        .await
                }
                Err(err) => {
                    tracing::error!(game_id = game.id, user_id, %err, "failed to register player");
                    self.gateway
                        .send_message(game.peer_id, &catalog::registration_error(name))
                        .await;
                }
            }
            return Ok(TimerPlan::Unchanged);
        }

        self.gateway
            .send_message(game.peer_id, &catalog::registration_prompt(&setting.title, setting.timeout))
            .await;
        Ok(TimerPlan::Unchanged)
    }

    async fn registration_timeout(
        &self,
        game: GameRow,
        setting: &Setting,
        players: &[Player],
    ) -> Result<TimerPlan, EngineError> {
        if players.len() >= 2 {
            return self.transition_into_play(game, setting, players).await;
        }

        self.store.games.clear_game(game.id, &self.store.used_words).await?;
        self.gateway
            .send_message(game.peer_id, &catalog::registration_failed())
            .await;
        Ok(TimerPlan::Cancel)
    }

    /// §4.5.1: shuffle players, seed the first word, open play.
    async fn transition_into_play(
        &self,
        game: GameRow,
        setting: &Setting,
        players: &[Player],
    ) -> Result<TimerPlan, EngineError> {
        let mut moves_order: Vec<i64> = players.iter().map(|p| p.user_id).collect();
        moves_order.shuffle(&mut rand::rng());

        let strategy = dictionary::strategy_for(setting);
        let first_word = strategy.random_seed_word(&self.store).await?;
        self.store.used_words.create_used_word(game.id, &first_word).await?;

        let current = moves_order[0];
        self.store
            .games
            .patch_game(
                game.id,
                GamePatch {
                    status: Some(GameStatus::Started),
                    moves_order: Clearable::Set(GameRow::encode_moves_order(&moves_order)),
                    current_move: Clearable::Set(current),
                    last_word: Clearable::Set(first_word.clone()),
                    event_timestamp: Clearable::Set(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;

        self.gateway
            .send_message(game.peer_id, &catalog::registration_success())
            .await;
        let current_name = player_name(players, current);
        self.gateway
            .send_message(
                game.peer_id,
                &catalog::player_move(&current_name, &first_word, setting.timeout),
            )
            .await;
        Ok(TimerPlan::Rearm(Duration::from_secs(setting.timeout as u64)))
    }

    async fn handle_started(
        &self,
        game: GameRow,
        setting: &Setting,
        players: &[Player],
        user_id: i64,
        body: &str,
        moves_order: &[i64],
        current: i64,
        last_word: &str,
    ) -> Result<TimerPlan, EngineError> {
        let current_name = player_name(players, current);

        if user_id != current {
            self.gateway
                .send_message(game.peer_id, &catalog::player_move(&current_name, last_word, setting.timeout))
                .await;
            return Ok(TimerPlan::Unchanged);
        }

        let word = body.to_lowercase();

        if self.store.used_words.is_used(game.id, &word).await? {
            self.gateway
                .send_message(game.peer_id, &catalog::player_used_word(&current_name, &word))
                .await;
            return self.next_player(&game, players, moves_order, current, last_word, false, "").await;
        }

        // Inserted before the letter check is intentional (`spec.md` §9's
        // final Open Question): a rejected word still burns its slot.
        self.store.used_words.create_used_word(game.id, &word).await?;

        let required = rules::required_first_letter(last_word);
        if !required.map(|l| rules::starts_with_letter(&word, l)).unwrap_or(true) {
            self.gateway
                .send_message(game.peer_id, &catalog::player_word_wrong(&current_name, &word, last_word))
                .await;
            return self.next_player(&game, players, moves_order, current, last_word, false, "").await;
        }

        let strategy = dictionary::strategy_for(setting);
        match strategy.lookup(&self.store, &word).await? {
            DictionaryVerdict::Correct => {
                self.next_player(&game, players, moves_order, current, last_word, true, &word).await
            }
            DictionaryVerdict::Blacklisted => {
                self.gateway
                    .send_message(game.peer_id, &catalog::player_word_blacklisted(&current_name, &word))
                    .await;
                self.next_player(&game, players, moves_order, current, last_word, false, "").await
            }
            DictionaryVerdict::CityMissing => {
                self.gateway
                    .send_message(game.peer_id, &catalog::city_doesnt_exist(&current_name, &word))
                    .await;
                self.next_player(&game, players, moves_order, current, last_word, false, "").await
            }
            DictionaryVerdict::Vote => {
                self.store
                    .games
                    .patch_game(
                        game.id,
                        GamePatch {
                            status: Some(GameStatus::VoteWord),
                            vote_word: Clearable::Set(word.clone()),
                            event_timestamp: Clearable::Set(Utc::now()),
                            ..Default::default()
                        },
                    )
                    .await?;
                self.gateway
                    .send_message(game.peer_id, &catalog::vote_prompt(&word, setting.timeout))
                    .await;
                Ok(TimerPlan::Rearm(Duration::from_secs(setting.timeout as u64)))
            }
        }
    }

    async fn started_timeout(
        &self,
        game: GameRow,
        players: &[Player],
        moves_order: &[i64],
        current: i64,
        last_word: &str,
    ) -> Result<TimerPlan, EngineError> {
        let current_name = player_name(players, current);
        self.gateway
            .send_message(game.peer_id, &catalog::player_timeout(&current_name))
            .await;
        self.next_player(&game, players, moves_order, current, last_word, false, "").await
    }

    async fn handle_vote_word(
        &self,
        game: GameRow,
        setting: &Setting,
        players: &[Player],
        user_id: i64,
        body: &str,
        current: i64,
        vote_word: &str,
    ) -> Result<TimerPlan, EngineError> {
        let body_lower = body.to_lowercase();
        let voter_name = player_name(players, user_id);

        if body_lower == "да" || body_lower == "нет" {
            if user_id == current {
                self.gateway.send_message(game.peer_id, &catalog::vote_self(&voter_name)).await;
                return Ok(TimerPlan::Unchanged);
            }

            let Some(voter) = players.iter().find(|p| p.user_id == user_id) else {
                return Ok(TimerPlan::Unchanged);
            };

            match self
                .store
                .votes
                .create_vote(game.id, voter.id, vote_word, body_lower == "да")
                .await
            {
                Ok(_) => self.gateway.send_message(game.peer_id, &catalog::vote_ack(&voter_name)).await,
                Err(StoreError::UniqueViolation(_)) => {
                    self.gateway.send_message(game.peer_id, &catalog::vote_conflict(&voter_name)).await
                }
                Err(err) => return Err(err.into()),
            }
            return Ok(TimerPlan::Unchanged);
        }

        if user_id != current {
            self.gateway
                .send_message(game.peer_id, &catalog::vote_prompt(vote_word, setting.timeout))
                .await;
        }
        Ok(TimerPlan::Unchanged)
    }

    /// §4.5.4: tally votes, persist the verdict as a dictionary entry,
    /// announce the result, resume play.
    async fn vote_timeout(
        &self,
        game: GameRow,
        players: &[Player],
        moves_order: &[i64],
        current: i64,
        last_word: &str,
        vote_word: &str,
    ) -> Result<TimerPlan, EngineError> {
        let votes = self.store.votes.list_votes(game.id, vote_word).await?;
        let pos = votes.iter().filter(|v| v.is_correct).count();
        let neg = votes.iter().filter(|v| !v.is_correct).count();
        let accepted = pos >= neg;

        match self.store.words.create_word(vote_word, accepted).await {
            Ok(_) | Err(StoreError::UniqueViolation(_)) => {}
            Err(err) => return Err(err.into()),
        }

        self.gateway
            .send_message(game.peer_id, &catalog::vote_result(vote_word, accepted))
            .await;

        self.store
            .games
            .patch_game(
                game.id,
                GamePatch {
                    status: Some(GameStatus::Started),
                    vote_word: Clearable::Clear,
                    event_timestamp: Clearable::Set(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;

        self.next_player(&game, players, moves_order, current, last_word, accepted, vote_word).await
    }

    /// §4.5.2 `next_player`: advance the turn, score or eliminate the
    /// current player, and either finish the game or announce the next
    /// turn and arm its timer. `moves_order`/`current`/`last_word` come
    /// from the caller's already-built `GameState`, not re-read off `game`.
    async fn next_player(
        &self,
        game: &GameRow,
        players: &[Player],
        moves_order: &[i64],
        current: i64,
        last_word: &str,
        success: bool,
        word: &str,
    ) -> Result<TimerPlan, EngineError> {
        let successor = next_in_rotation(moves_order, current);

        let mut moves_order = moves_order.to_vec();
        if success {
            if let Some(player) = players.iter().find(|p| p.user_id == current) {
                self.store.players.player_scored(player.id).await?;
            }
        } else {
            moves_order.retain(|&id| id != current);
        }

        if moves_order.len() == 1 {
            let winner_user_id = moves_order[0];
            if let Some(player) = players.iter().find(|p| p.user_id == winner_user_id) {
                self.store
                    .players
                    .patch_player(player.id, None, Some(PlayerStatus::Winner), None)
                    .await?;
            }
            self.store
                .games
                .patch_game(
                    game.id,
                    GamePatch {
                        status: Some(GameStatus::Finished),
                        moves_order: Clearable::Set(GameRow::encode_moves_order(&moves_order)),
                        current_move: Clearable::Clear,
                        vote_word: Clearable::Clear,
                        event_timestamp: Clearable::Clear,
                        ..Default::default()
                    },
                )
                .await?;
            let winner_name = players.iter().find(|p| p.user_id == winner_user_id).map(|p| p.name.as_str());
            self.gateway
                .send_message(game.peer_id, &catalog::game_finished(winner_name))
                .await;
            return Ok(TimerPlan::Cancel);
        }

        let next_current = successor.unwrap_or(current);
        let last_word = if success { word.to_string() } else { last_word.to_string() };

        self.store
            .games
            .patch_game(
                game.id,
                GamePatch {
                    status: Some(GameStatus::Started),
                    moves_order: Clearable::Set(GameRow::encode_moves_order(&moves_order)),
                    current_move: Clearable::Set(next_current),
                    last_word: Clearable::Set(last_word.clone()),
                    event_timestamp: Clearable::Set(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;

        let setting = self.store.settings.get_setting_by_id(game.setting_id).await?;
        let next_name = player_name(players, next_current);
        self.gateway
            .send_message(game.peer_id, &catalog::player_move(&next_name, &last_word, setting.timeout))
            .await;
        Ok(TimerPlan::Rearm(Duration::from_secs(setting.timeout as u64)))
    }

    async fn handle_status(&self, game: &GameRow, players: &[Player]) -> Result<(), EngineError> {
        let text = match game.status() {
            GameStatus::Init => match self.store.games.latest_finished_game(game.peer_id).await? {
                Some(finished) => {
                    let ranked = self.store.players.list_player_ranked(finished.id).await?;
                    catalog::status_scoreboard(&scoreboard_rows(&ranked))
                }
                None => catalog::status_init(),
            },
            GameStatus::Registration => {
                let numbered: Vec<(i32, &str)> = players
                    .iter()
                    .enumerate()
                    .map(|(i, p)| ((i + 1) as i32, p.name.as_str()))
                    .collect();
                catalog::status_registration(&numbered)
            }
            GameStatus::Started | GameStatus::VoteWord | GameStatus::Finished => {
                let ranked = self.store.players.list_player_ranked(game.id).await?;
                catalog::status_scoreboard(&scoreboard_rows(&ranked))
            }
        };
        self.gateway.send_message(game.peer_id, &text).await;
        Ok(())
    }

    /// §4.2: resolve a registrant's display name via `ChatGateway::get_players`,
    /// falling back to the synthetic `id_<user_id>` name on a miss.
    async fn resolve_display_name(&self, peer_id: i64, user_id: i64) -> String {
        self.gateway
            .get_players(peer_id)
            .await
            .into_iter()
            .find(|m| m.user_id == user_id)
            .map(|m| m.name)
            .unwrap_or_else(|| format!("id_{user_id}"))
    }
}

/// The sole player marked `Winner`, if any — `GameState::Finished`'s
/// `winner` field isn't a persisted column, so it's resolved from the
/// player list on every load.
fn winner_id(players: &[Player]) -> Option<i64> {
    players.iter().find(|p| p.status() == PlayerStatus::Winner).map(|p| p.user_id)
}

fn player_name(players: &[Player], user_id: i64) -> String {
    players
        .iter()
        .find(|p| p.user_id == user_id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| format!("id_{user_id}"))
}

fn scoreboard_rows(players: &[Player]) -> Vec<(i32, &str, i32)> {
    players
        .iter()
        .enumerate()
        .map(|(i, p)| ((i + 1) as i32, p.name.as_str(), p.score))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_plan_equality() {
        assert_eq!(TimerPlan::Unchanged, TimerPlan::Unchanged);
        assert_ne!(TimerPlan::Rearm(Duration::from_secs(1)), TimerPlan::Unchanged);
        assert_ne!(TimerPlan::Cancel, TimerPlan::Unchanged);
    }
}
