// Store-level integration tests (C1, `spec.md` §8 invariants 1, 3, 4, 8),
// run against a real Postgres via testcontainers rather than a fake, since
// the invariants being checked here — unique constraints, cascade deletes,
// transactional atomicity — are properties of the database itself.

mod common;

use wordchain_bot::db::{Clearable, GamePatch};
use wordchain_bot::errors::StoreError;
use wordchain_bot::models::{GameStatus, WORDS_SETTING_TITLE};

#[tokio::test]
async fn at_most_one_live_game_per_peer() {
    let db = common::spawn_store().await;
    let setting = db.store.settings.get_setting_by_title(WORDS_SETTING_TITLE).await.unwrap();

    db.store.games.create_game(setting.id, 777).await.unwrap();
    let second = db.store.games.create_game(setting.id, 777).await;

    assert!(
        matches!(second, Err(StoreError::UniqueViolation(_)) | Err(StoreError::Transient(_))),
        "a second non-finished game for the same peer must be rejected by the DB, got {second:?}"
    );
}

#[tokio::test]
async fn clear_game_purges_players_and_used_words() {
    let db = common::spawn_store().await;
    let setting = db.store.settings.get_setting_by_title(WORDS_SETTING_TITLE).await.unwrap();
    let game = db.store.games.create_game(setting.id, 100).await.unwrap();

    db.store.players.create_player(game.id, 1, "Аня").await.unwrap();
    db.store.players.create_player(game.id, 2, "Боря").await.unwrap();
    db.store.used_words.create_used_word(game.id, "слово").await.unwrap();

    db.store
        .games
        .patch_game(
            game.id,
            GamePatch {
                status: Some(GameStatus::Started),
                moves_order: Clearable::Set("1 2".to_string()),
                current_move: Clearable::Set(1),
                last_word: Clearable::Set("слово".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let cleared = db.store.games.clear_game(game.id, &db.store.used_words).await.unwrap();

    assert_eq!(cleared.status(), GameStatus::Init);
    assert!(cleared.moves_order.is_none());
    assert!(cleared.current_move.is_none());
    assert!(cleared.last_word.is_none());
    assert!(cleared.vote_word.is_none());
    assert_eq!(cleared.elapsed_time, 0);

    let players = db.store.players.list_players(game.id).await.unwrap();
    assert!(players.is_empty(), "players must be purged by clear_game");
    let used = db.store.used_words.list_used_words(game.id).await.unwrap();
    assert!(used.is_empty(), "used words must be purged by clear_game");
}

#[tokio::test]
async fn used_word_is_unique_per_game() {
    let db = common::spawn_store().await;
    let setting = db.store.settings.get_setting_by_title(WORDS_SETTING_TITLE).await.unwrap();
    let game = db.store.games.create_game(setting.id, 200).await.unwrap();

    db.store.used_words.create_used_word(game.id, "кот").await.unwrap();
    let dup = db.store.used_words.create_used_word(game.id, "КОТ").await;

    assert!(
        matches!(dup, Err(StoreError::UniqueViolation(_))),
        "re-inserting the same title (case-folded) must violate the per-game uniqueness constraint"
    );
}

#[tokio::test]
async fn player_registration_is_unique_per_game() {
    let db = common::spawn_store().await;
    let setting = db.store.settings.get_setting_by_title(WORDS_SETTING_TITLE).await.unwrap();
    let game = db.store.games.create_game(setting.id, 300).await.unwrap();

    db.store.players.create_player(game.id, 42, "Аня").await.unwrap();
    let dup = db.store.players.create_player(game.id, 42, "Аня (second try)").await;

    assert!(matches!(dup, Err(StoreError::UniqueViolation(_))));
}

#[tokio::test]
async fn vote_is_unique_per_player_and_title() {
    let db = common::spawn_store().await;
    let setting = db.store.settings.get_setting_by_title(WORDS_SETTING_TITLE).await.unwrap();
    let game = db.store.games.create_game(setting.id, 400).await.unwrap();
    let player = db.store.players.create_player(game.id, 1, "Аня").await.unwrap();

    db.store.votes.create_vote(game.id, player.id, "глина", true).await.unwrap();
    let dup = db.store.votes.create_vote(game.id, player.id, "глина", false).await;

    assert!(matches!(dup, Err(StoreError::UniqueViolation(_))));
}

#[tokio::test]
async fn vote_tally_accepts_on_tie() {
    let db = common::spawn_store().await;
    let setting = db.store.settings.get_setting_by_title(WORDS_SETTING_TITLE).await.unwrap();
    let game = db.store.games.create_game(setting.id, 500).await.unwrap();
    let p1 = db.store.players.create_player(game.id, 1, "Аня").await.unwrap();
    let p2 = db.store.players.create_player(game.id, 2, "Боря").await.unwrap();

    db.store.votes.create_vote(game.id, p1.id, "глина", true).await.unwrap();
    db.store.votes.create_vote(game.id, p2.id, "глина", false).await.unwrap();

    let votes = db.store.votes.list_votes(game.id, "глина").await.unwrap();
    let pos = votes.iter().filter(|v| v.is_correct).count();
    let neg = votes.iter().filter(|v| !v.is_correct).count();
    assert_eq!(pos, 1);
    assert_eq!(neg, 1);
    assert!(pos >= neg, "a tie must resolve in favour of the word, per spec.md §4.5.4");
}

#[tokio::test]
async fn deleting_a_game_cascades_to_players_and_votes() {
    let db = common::spawn_store().await;
    let setting = db.store.settings.get_setting_by_title(WORDS_SETTING_TITLE).await.unwrap();
    let game = db.store.games.create_game(setting.id, 600).await.unwrap();
    let player = db.store.players.create_player(game.id, 1, "Аня").await.unwrap();
    db.store.votes.create_vote(game.id, player.id, "глина", true).await.unwrap();
    db.store.used_words.create_used_word(game.id, "глина").await.unwrap();

    sqlx::query("DELETE FROM games WHERE id = $1")
        .bind(game.id)
        .execute(&db.pool)
        .await
        .unwrap();

    assert!(db.store.players.list_players(game.id).await.unwrap().is_empty());
    assert!(db.store.used_words.list_used_words(game.id).await.unwrap().is_empty());
    assert!(db.store.votes.list_votes(game.id, "глина").await.unwrap().is_empty());
}

#[tokio::test]
async fn list_active_games_excludes_finished_and_respects_peer_filter() {
    let db = common::spawn_store().await;
    let setting = db.store.settings.get_setting_by_title(WORDS_SETTING_TITLE).await.unwrap();

    let live = db.store.games.create_game(setting.id, 700).await.unwrap();
    let other_peer = db.store.games.create_game(setting.id, 701).await.unwrap();

    db.store
        .games
        .patch_game(
            other_peer.id,
            GamePatch {
                status: Some(GameStatus::Finished),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let all_active = db
        .store
        .games
        .list_active_games(None, &db.store.settings, &db.store.players)
        .await
        .unwrap();
    assert_eq!(all_active.len(), 1);
    assert_eq!(all_active[0].game.id, live.id);

    let scoped = db
        .store
        .games
        .list_active_games(Some(701), &db.store.settings, &db.store.players)
        .await
        .unwrap();
    assert!(scoped.is_empty(), "peer 701's only game is finished, so it must not be 'active'");
}
