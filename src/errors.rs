// Error taxonomy for the store and the game engine.
use thiserror::Error;

/// Errors surfaced by the persistence layer (C1).
///
/// Repositories translate raw `sqlx::Error` values into these variants so
/// callers can decide recovery without matching on database-specific error
/// codes.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key violated: {0}")]
    FKViolation(String),

    #[error("transient database error: {0}")]
    Transient(#[from] sqlx::Error),
}

impl StoreError {
    /// Classify a raw sqlx error from an insert/update against a known
    /// constraint name, falling back to `Transient` for anything else.
    pub fn from_sqlx(err: sqlx::Error, context: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation(context.to_string());
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::FKViolation(context.to_string());
            }
        }
        StoreError::Transient(err)
    }
}

/// Reason a room's active timer task was cancelled.
///
/// Redesigned from the source's literal `"normal"` sentinel string into a
/// tagged variant the engine matches on explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Graceful handoff to the next handler (a word was accepted, a vote
    /// tally resolved, registration closed normally). `elapsed_time` must
    /// not be touched.
    Normal,
    /// Process shutdown. `elapsed_time` must be computed and persisted so
    /// boot recovery can re-arm the timer for the remaining duration.
    Shutdown,
}

/// Errors surfaced by the per-room game engine (C5) and the Coordinator (C6).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("timer cancelled: {0:?}")]
    Cancelled(CancelReason),

    #[error("room actor is no longer running")]
    RoomGone,
}
