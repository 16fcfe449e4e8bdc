// Coordinator (C6): owns the `peer_id -> RoomHandle` map and is the only
// thing that creates or tears down rooms. Grounded on the teacher's
// `AppState` (`src/state.rs`) for the "one shared map behind a `Mutex`,
// cloned into every task" shape, generalized from a connection registry to
// a room registry.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::chat_gateway::ChatGateway;
use crate::db::Store;
use crate::errors::StoreError;
use crate::game::{RoomActor, RoomEngine, RoomHandle};
use crate::models::WORDS_SETTING_TITLE;
use crate::update_source::Update;

#[derive(Clone)]
pub struct Coordinator {
    store: Store,
    gateway: Arc<dyn ChatGateway>,
    rooms: Arc<Mutex<HashMap<i64, RoomHandle>>>,
}

impl Coordinator {
    pub fn new(store: Store, gateway: Arc<dyn ChatGateway>) -> Self {
        Self {
            store,
            gateway,
            rooms: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// `spec.md` §4.6 boot: recover every non-finished game, spawn its
    /// room, and re-announce whatever it was waiting on.
    pub async fn boot(&self) -> Result<(), StoreError> {
        let active = self
            .store
            .games
            .list_active_games(None, &self.store.settings, &self.store.players)
            .await?;

        let mut rooms = self.rooms.lock().await;
        for aggregate in active {
            let game_id = aggregate.game.id;
            let peer_id = aggregate.game.peer_id;
            let engine = RoomEngine::new(self.store.clone(), self.gateway.clone());
            let plan = match engine.re_init(game_id).await {
                Ok(plan) => plan,
                Err(err) => {
                    tracing::error!(game_id, %err, "re_init failed during boot recovery");
                    continue;
                }
            };
            let handle = RoomActor::spawn(game_id, engine, self.store.clone(), plan);
            rooms.insert(peer_id, handle);
        }
        Ok(())
    }

    /// Route one inbound update to its room, spawning a fresh game (and
    /// room) first if none is active for this peer yet.
    pub async fn dispatch(&self, update: Update) -> Result<(), StoreError> {
        let peer_id = update.peer_id;
        let active = self
            .store
            .games
            .list_active_games(Some(peer_id), &self.store.settings, &self.store.players)
            .await?;

        let mut rooms = self.rooms.lock().await;

        let handle = match active.into_iter().next() {
            Some(aggregate) => match rooms.get(&peer_id) {
                Some(handle) if handle.game_id() == aggregate.game.id => handle.clone(),
                // Missing or stale (restarted mid-session without a boot
                // pass over this peer) — re-attach a fresh room to the
                // existing row rather than discarding its progress.
                _ => {
                    let game_id = aggregate.game.id;
                    let engine = RoomEngine::new(self.store.clone(), self.gateway.clone());
                    let plan = engine.re_init(game_id).await?;
                    let handle = RoomActor::spawn(game_id, engine, self.store.clone(), plan);
                    rooms.insert(peer_id, handle.clone());
                    handle
                }
            },
            None => {
                if let Some(stale) = rooms.remove(&peer_id) {
                    stale.shutdown().await;
                }
                let setting = self.store.settings.get_setting_by_title(WORDS_SETTING_TITLE).await?;
                let game = self.store.games.create_game(setting.id, peer_id).await?;
                let engine = RoomEngine::new(self.store.clone(), self.gateway.clone());
                let handle = RoomActor::spawn(
                    game.id,
                    engine,
                    self.store.clone(),
                    crate::game::TimerPlan::Unchanged,
                );
                rooms.insert(peer_id, handle.clone());
                handle
            }
        };
        drop(rooms);

        handle.send(update).await;
        Ok(())
    }

    /// Cancel every room's outstanding timer and persist its elapsed time.
    pub async fn shutdown(&self) {
        let rooms = self.rooms.lock().await;
        for handle in rooms.values() {
            handle.shutdown().await;
        }
    }
}
