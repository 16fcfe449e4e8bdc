// Per-room game engine (C5).
mod actor;
mod dictionary;
mod engine;
mod rules;
mod state;
mod timer;

pub use actor::{RoomActor, RoomCommand, RoomHandle};
pub use dictionary::{strategy_for, CitiesDict, DictionaryStrategy, DictionaryVerdict, WordsDict};
pub use engine::{RoomEngine, TimerPlan};
pub use state::GameState;
pub use timer::TimerHandle;
