// End-to-end engine scenarios (`spec.md` §8 S1-S6), driven directly
// against `RoomEngine` rather than through the actor/timer machinery: a
// "timer fires" step is simulated by calling `handle_timer_fired`
// directly, which is equivalent to what the actor does once its armed
// timer actually elapses (`spec.md` §9's per-invocation dispatch note
// applies the same way here — each call handles exactly one event).
//
// The dictionary is seeded so the one random choice the engine makes
// (`transition_into_play`'s pick of the opening word/city) has exactly one
// candidate at the moment it runs, making these tests deterministic
// without threading a seeded RNG through the engine.
//
// Display names are seeded into the `RecordingGateway` via `set_players`
// before registration, mirroring how `bin/bot.rs` calls `observe_member`
// as live updates arrive: the engine resolves a registrant's name through
// `ChatGateway::get_players`, never from the inbound update itself.

mod common;

use std::sync::Arc;

use wordchain_bot::catalog;
use wordchain_bot::chat_gateway::{ChatMember, RecordingGateway};
use wordchain_bot::game::RoomEngine;
use wordchain_bot::models::{GameStatus, CITIES_SETTING_TITLE, WORDS_SETTING_TITLE};

fn name_for(user_id: i64) -> &'static str {
    match user_id {
        1 => "Аня",
        2 => "Боря",
        3 => "Вера",
        other => panic!("unexpected test user id {other}"),
    }
}

async fn seed_roster(gateway: &RecordingGateway, peer_id: i64, user_ids: &[i64]) {
    let members = user_ids
        .iter()
        .map(|&id| ChatMember {
            user_id: id,
            name: name_for(id).to_string(),
        })
        .collect();
    gateway.set_players(peer_id, members).await;
}

#[tokio::test]
async fn happy_path_then_used_word_eliminates_loser() {
    let db = common::spawn_store().await;
    let gateway = Arc::new(RecordingGateway::new());
    let engine = RoomEngine::new(db.store.clone(), gateway.clone());

    // Exactly one correct word exists when the engine picks the opener.
    db.store.words.create_word("аа", true).await.unwrap();

    let setting = db.store.settings.get_setting_by_title(WORDS_SETTING_TITLE).await.unwrap();
    let game = db.store.games.create_game(setting.id, 100).await.unwrap();
    seed_roster(&gateway, 100, &[1, 2]).await;

    engine.dispatch_update(game.id, 1, "слова").await.unwrap();
    engine.dispatch_update(game.id, 1, "я").await.unwrap();
    engine.dispatch_update(game.id, 2, "я").await.unwrap();

    let sent = gateway.sent_messages().await;
    assert!(sent.iter().any(|(_, t)| t == &catalog::registration_ack("Аня")));
    assert!(sent.iter().any(|(_, t)| t == &catalog::registration_ack("Боря")));

    // Registration timer fires with 2 players registered -> play opens.
    engine.handle_timer_fired(game.id).await.unwrap();

    let started = db
        .store
        .games
        .get_game_by_id(game.id, &db.store.settings, &db.store.players)
        .await
        .unwrap();
    assert_eq!(started.game.status(), GameStatus::Started);
    assert_eq!(started.game.last_word.as_deref(), Some("аа"));
    let current = started.game.current_move.unwrap();
    assert!(current == 1 || current == 2);
    let other = if current == 1 { 2 } else { 1 };

    // Now that the opener is locked in, make the rest of the chain
    // available for lookup.
    db.store.words.create_word("аб", true).await.unwrap();
    db.store.words.create_word("ба", true).await.unwrap();

    // current plays "аб" (starts on "аа"'s tail letter), accepted.
    engine.dispatch_update(game.id, current, "аб").await.unwrap();
    let after_first_move = db
        .store
        .games
        .get_game_by_id(game.id, &db.store.settings, &db.store.players)
        .await
        .unwrap();
    assert_eq!(after_first_move.game.last_word.as_deref(), Some("аб"));
    assert_eq!(after_first_move.game.current_move, Some(other));
    let scorer = after_first_move.players.iter().find(|p| p.user_id == current).unwrap();
    assert_eq!(scorer.score, 1, "accepting a word scores the player who played it");

    // other plays "ба" (starts on "аб"'s tail letter), accepted.
    engine.dispatch_update(game.id, other, "ба").await.unwrap();
    let after_second_move = db
        .store
        .games
        .get_game_by_id(game.id, &db.store.settings, &db.store.players)
        .await
        .unwrap();
    assert_eq!(after_second_move.game.last_word.as_deref(), Some("ба"));
    assert_eq!(after_second_move.game.current_move, Some(current));

    // current repeats "аб", already used -> eliminated, other wins.
    engine.dispatch_update(game.id, current, "аб").await.unwrap();

    let finished = db
        .store
        .games
        .get_game_by_id(game.id, &db.store.settings, &db.store.players)
        .await
        .unwrap();
    assert_eq!(finished.game.status(), GameStatus::Finished);
    assert_eq!(finished.game.moves_order_vec(), vec![other]);

    let winner = finished.players.iter().find(|p| p.user_id == other).unwrap();
    assert_eq!(winner.status().as_str(), "Winner");

    let sent = gateway.sent_messages().await;
    assert!(sent.iter().any(|(_, t)| t == &catalog::player_used_word(name_for(current), "аб")));
    assert!(sent
        .iter()
        .any(|(_, t)| t == &catalog::game_finished(Some(name_for(other)))));
}

#[tokio::test]
async fn registration_fails_with_fewer_than_two_players() {
    let db = common::spawn_store().await;
    let gateway = Arc::new(RecordingGateway::new());
    let engine = RoomEngine::new(db.store.clone(), gateway.clone());

    let setting = db.store.settings.get_setting_by_title(WORDS_SETTING_TITLE).await.unwrap();
    let game = db.store.games.create_game(setting.id, 101).await.unwrap();
    seed_roster(&gateway, 101, &[1]).await;

    engine.dispatch_update(game.id, 1, "слова").await.unwrap();
    engine.dispatch_update(game.id, 1, "я").await.unwrap();

    engine.handle_timer_fired(game.id).await.unwrap();

    let game_after = db
        .store
        .games
        .get_game_by_id(game.id, &db.store.settings, &db.store.players)
        .await
        .unwrap();
    assert_eq!(game_after.game.status(), GameStatus::Init);
    assert!(game_after.players.is_empty());

    let sent = gateway.sent_messages().await;
    assert!(sent.iter().any(|(_, t)| t == &catalog::registration_failed()));
}

#[tokio::test]
async fn registering_twice_is_a_conflict() {
    let db = common::spawn_store().await;
    let gateway = Arc::new(RecordingGateway::new());
    let engine = RoomEngine::new(db.store.clone(), gateway.clone());

    let setting = db.store.settings.get_setting_by_title(WORDS_SETTING_TITLE).await.unwrap();
    let game = db.store.games.create_game(setting.id, 102).await.unwrap();
    seed_roster(&gateway, 102, &[1]).await;

    engine.dispatch_update(game.id, 1, "слова").await.unwrap();
    engine.dispatch_update(game.id, 1, "я").await.unwrap();
    engine.dispatch_update(game.id, 1, "я").await.unwrap();

    let sent = gateway.sent_messages().await;
    assert!(sent.iter().any(|(_, t)| t == &catalog::registration_conflict("Аня")));
}

#[tokio::test]
async fn unknown_word_goes_to_a_vote_and_ties_resolve_in_favour() {
    let db = common::spawn_store().await;
    let gateway = Arc::new(RecordingGateway::new());
    let engine = RoomEngine::new(db.store.clone(), gateway.clone());

    db.store.words.create_word("аа", true).await.unwrap();

    let setting = db.store.settings.get_setting_by_title(WORDS_SETTING_TITLE).await.unwrap();
    let game = db.store.games.create_game(setting.id, 103).await.unwrap();
    seed_roster(&gateway, 103, &[1, 2, 3]).await;

    engine.dispatch_update(game.id, 1, "слова").await.unwrap();
    engine.dispatch_update(game.id, 1, "я").await.unwrap();
    engine.dispatch_update(game.id, 2, "я").await.unwrap();
    engine.dispatch_update(game.id, 3, "я").await.unwrap();

    engine.handle_timer_fired(game.id).await.unwrap();

    let started = db
        .store
        .games
        .get_game_by_id(game.id, &db.store.settings, &db.store.players)
        .await
        .unwrap();
    let current = started.game.current_move.unwrap();
    let others: Vec<i64> = [1i64, 2, 3].into_iter().filter(|id| *id != current).collect();

    // "абажур" starts on "аа"'s tail letter and is absent from the words
    // table, so it must fall to a vote rather than being auto-accepted or
    // blacklisted.
    engine.dispatch_update(game.id, current, "абажур").await.unwrap();

    let voting = db
        .store
        .games
        .get_game_by_id(game.id, &db.store.settings, &db.store.players)
        .await
        .unwrap();
    assert_eq!(voting.game.status(), GameStatus::VoteWord);
    assert_eq!(voting.game.vote_word.as_deref(), Some("абажур"));

    engine.dispatch_update(game.id, others[0], "да").await.unwrap();
    engine.dispatch_update(game.id, others[1], "нет").await.unwrap();

    // The word's author may not vote on their own submission.
    engine.dispatch_update(game.id, current, "да").await.unwrap();
    let sent = gateway.sent_messages().await;
    assert!(sent.iter().any(|(_, t)| t == &catalog::vote_self(name_for(current))));

    engine.handle_timer_fired(game.id).await.unwrap();

    let sent = gateway.sent_messages().await;
    assert!(sent.iter().any(|(_, t)| t == &catalog::vote_result("абажур", true)));

    let word = db.store.words.get_word_by_title("абажур").await.unwrap();
    assert!(word.is_correct, "a tied vote must accept the word");

    let resumed = db
        .store
        .games
        .get_game_by_id(game.id, &db.store.settings, &db.store.players)
        .await
        .unwrap();
    assert_eq!(resumed.game.status(), GameStatus::Started);
    assert_eq!(resumed.game.last_word.as_deref(), Some("абажур"));
    assert!(resumed.game.vote_word.is_none());
    let scorer = resumed.players.iter().find(|p| p.user_id == current).unwrap();
    assert_eq!(scorer.score, 1);
}

#[tokio::test]
async fn cities_mode_rejects_unknown_and_accepts_known_with_capitalization() {
    let db = common::spawn_store().await;
    let gateway = Arc::new(RecordingGateway::new());
    let engine = RoomEngine::new(db.store.clone(), gateway.clone());

    // The only city present when the opener is chosen.
    sqlx::query("INSERT INTO cities (title) VALUES ($1)")
        .bind("Орел")
        .execute(&db.pool)
        .await
        .unwrap();

    let setting = db.store.settings.get_setting_by_title(CITIES_SETTING_TITLE).await.unwrap();
    let game = db.store.games.create_game(setting.id, 104).await.unwrap();
    seed_roster(&gateway, 104, &[1, 2]).await;

    engine.dispatch_update(game.id, 1, "города").await.unwrap();
    engine.dispatch_update(game.id, 1, "я").await.unwrap();
    engine.dispatch_update(game.id, 2, "я").await.unwrap();
    engine.handle_timer_fired(game.id).await.unwrap();

    let started = db
        .store
        .games
        .get_game_by_id(game.id, &db.store.settings, &db.store.players)
        .await
        .unwrap();
    assert_eq!(started.game.last_word.as_deref(), Some("Орел"));
    let current = started.game.current_move.unwrap();
    let other = if current == 1 { 2 } else { 1 };

    // "Орел" ends in 'л'; "лиссабон" starts on 'л' but isn't a known city.
    engine.dispatch_update(game.id, current, "лиссабон").await.unwrap();

    let sent = gateway.sent_messages().await;
    assert!(sent
        .iter()
        .any(|(_, t)| t == &catalog::city_doesnt_exist(name_for(current), "лиссабон")));

    let after_reject = db
        .store
        .games
        .get_game_by_id(game.id, &db.store.settings, &db.store.players)
        .await
        .unwrap();
    // Rejection doesn't change last_word, so the next city must still
    // start on 'л'.
    assert_eq!(after_reject.game.last_word.as_deref(), Some("Орел"));
    assert_eq!(after_reject.game.current_move, Some(other));

    sqlx::query("INSERT INTO cities (title) VALUES ($1)")
        .bind("Ленинград")
        .execute(&db.pool)
        .await
        .unwrap();

    engine.dispatch_update(game.id, other, "ленинград").await.unwrap();

    let after_accept = db
        .store
        .games
        .get_game_by_id(game.id, &db.store.settings, &db.store.players)
        .await
        .unwrap();
    assert_eq!(after_accept.game.last_word.as_deref(), Some("ленинград"));
    let scorer = after_accept.players.iter().find(|p| p.user_id == other).unwrap();
    assert_eq!(scorer.score, 1);
}

#[tokio::test]
async fn status_command_reports_scoreboard_during_play() {
    let db = common::spawn_store().await;
    let gateway = Arc::new(RecordingGateway::new());
    let engine = RoomEngine::new(db.store.clone(), gateway.clone());

    db.store.words.create_word("аа", true).await.unwrap();
    let setting = db.store.settings.get_setting_by_title(WORDS_SETTING_TITLE).await.unwrap();
    let game = db.store.games.create_game(setting.id, 105).await.unwrap();
    seed_roster(&gateway, 105, &[1, 2]).await;

    engine.dispatch_update(game.id, 1, "слова").await.unwrap();
    engine.dispatch_update(game.id, 1, "я").await.unwrap();
    engine.dispatch_update(game.id, 2, "я").await.unwrap();
    engine.handle_timer_fired(game.id).await.unwrap();

    engine.dispatch_update(game.id, 1, "!статус").await.unwrap();

    let sent = gateway.sent_messages().await;
    let (_, last) = sent.last().unwrap();
    assert!(last.starts_with("Счет игры: "));
    assert!(last.contains("Аня"));
    assert!(last.contains("Боря"));
}

#[tokio::test]
async fn restart_recovery_rearms_for_the_remaining_duration() {
    let db = common::spawn_store().await;
    let gateway = Arc::new(RecordingGateway::new());
    let engine = RoomEngine::new(db.store.clone(), gateway.clone());

    db.store.words.create_word("аа", true).await.unwrap();
    let setting = db.store.settings.get_setting_by_title(WORDS_SETTING_TITLE).await.unwrap();
    let game = db.store.games.create_game(setting.id, 106).await.unwrap();
    seed_roster(&gateway, 106, &[1, 2]).await;

    engine.dispatch_update(game.id, 1, "слова").await.unwrap();
    engine.dispatch_update(game.id, 1, "я").await.unwrap();
    engine.dispatch_update(game.id, 2, "я").await.unwrap();
    engine.handle_timer_fired(game.id).await.unwrap();

    // Simulate a shutdown 20s into a 60s turn timer.
    db.store
        .games
        .patch_game(
            game.id,
            wordchain_bot::db::GamePatch {
                elapsed_time: Some(20),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let plan = engine.re_init(game.id).await.unwrap();
    match plan {
        wordchain_bot::game::TimerPlan::Rearm(duration) => {
            assert_eq!(duration.as_secs(), 40, "60s timeout minus 20s already elapsed");
        }
        other => panic!("expected a rearm plan, got {other:?}"),
    }

    let after_reinit = db
        .store
        .games
        .get_game_by_id(game.id, &db.store.settings, &db.store.players)
        .await
        .unwrap();
    assert_eq!(after_reinit.game.elapsed_time, 0, "re_init resets elapsed_time once rescheduled");
}
