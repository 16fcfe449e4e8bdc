// Per-room actor (C5): one `tokio::task` per live game, reading a private
// mailbox. Grounded on the teacher's `games/lexi_wars/engine.rs` run loop,
// but traded its `Arc<RwLock<Inner>>` + `Notify`-polled countdown for an
// owned `RoomEngine` plus a `TimerHandle` that posts back into this same
// mailbox as `RoomCommand::TimerFired` — the actor is the only place that
// ever touches its own timer, so there is nothing to lock.

use tokio::sync::{mpsc, oneshot};

use crate::db::{GamePatch, Store};
use crate::errors::CancelReason;
use crate::update_source::Update;

use super::engine::{RoomEngine, TimerPlan};
use super::timer::{TimerHandle, TimerId};

pub enum RoomCommand {
    Update(Update),
    TimerFired(TimerId),
    Shutdown(oneshot::Sender<()>),
}

/// A cheap, clone-able reference to a running room. Dropping every handle
/// does not stop the actor — only `shutdown` or the process exiting does.
#[derive(Clone)]
pub struct RoomHandle {
    game_id: i64,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn game_id(&self) -> i64 {
        self.game_id
    }

    pub async fn send(&self, update: Update) {
        let _ = self.sender.send(RoomCommand::Update(update)).await;
    }

    pub async fn shutdown(&self) {
        let (tx, rx) = oneshot::channel();
        if self.sender.send(RoomCommand::Shutdown(tx)).await.is_ok() {
            let _ = rx.await;
        }
    }
}

pub struct RoomActor {
    game_id: i64,
    engine: RoomEngine,
    store: Store,
    receiver: mpsc::Receiver<RoomCommand>,
    self_sender: mpsc::Sender<RoomCommand>,
    timer: Option<TimerHandle>,
    next_timer_id: TimerId,
}

impl RoomActor {
    /// Spawn the actor's task and return a handle to it. `initial_plan`
    /// comes from whatever caused the room to exist: a fresh game opens
    /// with `TimerPlan::Unchanged` (nothing armed yet), a recovered one
    /// from `RoomEngine::re_init`.
    pub fn spawn(game_id: i64, engine: RoomEngine, store: Store, initial_plan: TimerPlan) -> RoomHandle {
        let (sender, receiver) = mpsc::channel(32);
        let handle = RoomHandle {
            game_id,
            sender: sender.clone(),
        };

        let mut actor = RoomActor {
            game_id,
            engine,
            store,
            receiver,
            self_sender: sender,
            timer: None,
            next_timer_id: 0,
        };

        tokio::spawn(async move {
            actor.apply_plan(initial_plan);
            actor.run().await;
        });

        handle
    }

    async fn run(&mut self) {
        while let Some(command) = self.receiver.recv().await {
            match command {
                RoomCommand::Update(update) => {
                    let result = self
                        .engine
                        .dispatch_update(self.game_id, update.user_id, &update.body)
                        .await;
                    match result {
                        Ok(plan) => self.apply_plan(plan),
                        Err(err) => tracing::error!(game_id = self.game_id, %err, "update dispatch failed"),
                    }
                }
                RoomCommand::TimerFired(id) => {
                    // A fire racing a cancellation (the timer was replaced
                    // or the room shut down between the sleep completing
                    // and this command being processed) is stale; ignore it.
                    if self.timer.as_ref().map(|t| t.id()) != Some(id) {
                        continue;
                    }
                    self.timer = None;
                    match self.engine.handle_timer_fired(self.game_id).await {
                        Ok(plan) => self.apply_plan(plan),
                        Err(err) => tracing::error!(game_id = self.game_id, %err, "timer dispatch failed"),
                    }
                }
                RoomCommand::Shutdown(ack) => {
                    self.persist_shutdown_elapsed().await;
                    let _ = ack.send(());
                    return;
                }
            }
        }
    }

    /// The only place a timer is cancelled or armed. `Unchanged` leaves a
    /// live deadline alone so no-op inputs (registration chatter, a
    /// non-current player's turn, `!статус`) can't accidentally kill it.
    fn apply_plan(&mut self, plan: TimerPlan) {
        match plan {
            TimerPlan::Unchanged => {}
            TimerPlan::Cancel => {
                if let Some(timer) = self.timer.take() {
                    timer.cancel(CancelReason::Normal);
                }
            }
            TimerPlan::Rearm(duration) => {
                if let Some(timer) = self.timer.take() {
                    timer.cancel(CancelReason::Normal);
                }
                let id = self.next_timer_id;
                self.next_timer_id += 1;
                self.timer = Some(TimerHandle::spawn(
                    id,
                    duration,
                    self.self_sender.clone(),
                    RoomCommand::TimerFired(id),
                ));
            }
        }
    }

    async fn persist_shutdown_elapsed(&mut self) {
        let Some(timer) = self.timer.take() else { return };
        let Some(elapsed) = timer.cancel(CancelReason::Shutdown) else {
            return;
        };
        let patch = GamePatch {
            elapsed_time: Some(elapsed.as_secs() as i32),
            ..Default::default()
        };
        if let Err(err) = self.store.games.patch_game(self.game_id, patch).await {
            tracing::error!(game_id = self.game_id, %err, "failed to persist elapsed time on shutdown");
        }
    }
}
