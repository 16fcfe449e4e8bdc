// Update source (C3): the typed inbound event and the channel the
// Coordinator drains. An external ingester (out of scope, `spec.md` §1)
// pushes onto the sender half; ordering within a `peer_id` is preserved by
// construction since `mpsc` is FIFO and each room's own mailbox is FIFO.

#[derive(Debug, Clone)]
pub struct Update {
    pub peer_id: i64,
    pub user_id: i64,
    pub body: String,
}

pub type UpdateSender = tokio::sync::mpsc::Sender<Update>;
pub type UpdateReceiver = tokio::sync::mpsc::Receiver<Update>;

pub fn channel(capacity: usize) -> (UpdateSender, UpdateReceiver) {
    tokio::sync::mpsc::channel(capacity)
}
