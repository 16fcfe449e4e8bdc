// Chat gateway (C2): the one seam between the engine and a real chat
// platform. `send_message` never returns a `Result` — a degraded transport
// must never stop the engine from making forward progress (`spec.md` §4.2).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct ChatMember {
    pub user_id: i64,
    pub name: String,
}

#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn send_message(&self, peer_id: i64, text: &str);
    async fn get_players(&self, peer_id: i64) -> Vec<ChatMember>;
}

/// Production adapter over `teloxide::Bot`.
///
/// Telegram has no bulk "list group members" call that works for arbitrary
/// group sizes, so `get_players` falls back to whatever participants the
/// ingester (out of scope) has observed arriving as `Update`s, tracked here
/// in a small in-memory cache keyed by `peer_id`. Call `observe_member` as
/// updates come in to keep it warm.
pub struct TeloxideGateway {
    bot: Bot,
    seen_members: Mutex<HashMap<i64, Vec<ChatMember>>>,
}

impl TeloxideGateway {
    pub fn new(token: &str) -> Self {
        Self {
            bot: Bot::new(token),
            seen_members: Mutex::new(HashMap::new()),
        }
    }

    /// Record a member as having been seen in a chat, so `get_players` can
    /// answer without a platform round-trip.
    pub async fn observe_member(&self, peer_id: i64, member: ChatMember) {
        let mut seen = self.seen_members.lock().await;
        let entry = seen.entry(peer_id).or_default();
        if !entry.iter().any(|m| m.user_id == member.user_id) {
            entry.push(member);
        }
    }
}

#[async_trait]
impl ChatGateway for TeloxideGateway {
    async fn send_message(&self, peer_id: i64, text: &str) {
        if let Err(err) = self.bot.send_message(ChatId(peer_id), text).await {
            tracing::warn!(peer_id, %err, "failed to deliver chat message");
        }
    }

    async fn get_players(&self, peer_id: i64) -> Vec<ChatMember> {
        self.seen_members
            .lock()
            .await
            .get(&peer_id)
            .cloned()
            .unwrap_or_default()
    }
}

/// Test double that records every outbound message instead of sending it,
/// so engine tests can assert on exact message sequences (scenarios S1-S7).
#[derive(Clone, Default)]
pub struct RecordingGateway {
    sent: Arc<Mutex<Vec<(i64, String)>>>,
    players: Arc<Mutex<HashMap<i64, Vec<ChatMember>>>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_players(&self, peer_id: i64, members: Vec<ChatMember>) {
        self.players.lock().await.insert(peer_id, members);
    }

    pub async fn sent_messages(&self) -> Vec<(i64, String)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl ChatGateway for RecordingGateway {
    async fn send_message(&self, peer_id: i64, text: &str) {
        self.sent.lock().await.push((peer_id, text.to_string()));
    }

    async fn get_players(&self, peer_id: i64) -> Vec<ChatMember> {
        self.players.lock().await.get(&peer_id).cloned().unwrap_or_default()
    }
}
