// Durable state (C1). One repository per entity, following the teacher's
// per-entity repository layout (each entity owns its own CRUD methods
// against a cloned `PgPool`), composed behind a single `Store` facade so
// the engine can depend on one handle.
mod city;
mod game;
mod player;
mod setting;
mod used_word;
mod vote;
mod word;

pub use city::{capitalize, CityRepository};
pub use game::{Clearable, GamePatch, GameRepository};
pub use player::PlayerRepository;
pub use setting::SettingRepository;
pub use used_word::UsedWordRepository;
pub use vote::VoteRepository;
pub use word::WordRepository;

use sqlx::PgPool;

/// Facade over every entity repository, sharing one connection pool.
#[derive(Clone)]
pub struct Store {
    pub words: WordRepository,
    pub cities: CityRepository,
    pub settings: SettingRepository,
    pub games: GameRepository,
    pub players: PlayerRepository,
    pub used_words: UsedWordRepository,
    pub votes: VoteRepository,
}

impl Store {
    pub fn new(pool: PgPool) -> Self {
        Self {
            words: WordRepository::new(pool.clone()),
            cities: CityRepository::new(pool.clone()),
            settings: SettingRepository::new(pool.clone()),
            games: GameRepository::new(pool.clone()),
            players: PlayerRepository::new(pool.clone()),
            used_words: UsedWordRepository::new(pool.clone()),
            votes: VoteRepository::new(pool),
        }
    }
}
