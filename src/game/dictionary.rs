// Dictionary strategy (REDESIGN FLAGS, `spec.md` §9): replaces a branch on
// `setting.title` scattered through the word-handling code with one
// capability per dictionary source.

use async_trait::async_trait;

use crate::db::{capitalize, Store};
use crate::errors::StoreError;
use crate::models::{Setting, CITIES_SETTING_TITLE, WORDS_SETTING_TITLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryVerdict {
    /// Known word/city, accepted outright.
    Correct,
    /// Known non-word, rejected outright (words mode only).
    Blacklisted,
    /// Not a known city (cities mode — no crowd vote path).
    CityMissing,
    /// Unknown word, must go to a crowd vote (words mode only).
    Vote,
}

#[async_trait]
pub trait DictionaryStrategy: Send + Sync {
    async fn lookup(&self, store: &Store, word: &str) -> Result<DictionaryVerdict, StoreError>;
    async fn random_seed_word(&self, store: &Store) -> Result<String, StoreError>;
}

pub struct WordsDict;

#[async_trait]
impl DictionaryStrategy for WordsDict {
    async fn lookup(&self, store: &Store, word: &str) -> Result<DictionaryVerdict, StoreError> {
        match store.words.get_word_by_title(word).await {
            Ok(w) if w.is_correct => Ok(DictionaryVerdict::Correct),
            Ok(_) => Ok(DictionaryVerdict::Blacklisted),
            Err(StoreError::NotFound(_)) => Ok(DictionaryVerdict::Vote),
            Err(e) => Err(e),
        }
    }

    /// Pick a random known-correct word to open the game with. If the
    /// dictionary is empty, seed it with "Орел" and use that, per
    /// `spec.md` §4.5.1.
    async fn random_seed_word(&self, store: &Store) -> Result<String, StoreError> {
        if let Some(word) = store.words.random_correct_word().await? {
            return Ok(word.title);
        }
        let seeded = store.words.create_word("Орел", true).await?;
        Ok(seeded.title)
    }
}

pub struct CitiesDict;

#[async_trait]
impl DictionaryStrategy for CitiesDict {
    async fn lookup(&self, store: &Store, word: &str) -> Result<DictionaryVerdict, StoreError> {
        let capitalized = capitalize(word);
        match store.cities.get_city_by_title(&capitalized).await {
            Ok(_) => Ok(DictionaryVerdict::Correct),
            Err(StoreError::NotFound(_)) => Ok(DictionaryVerdict::CityMissing),
            Err(e) => Err(e),
        }
    }

    async fn random_seed_word(&self, store: &Store) -> Result<String, StoreError> {
        store
            .cities
            .random_city()
            .await?
            .map(|c| c.title)
            .ok_or_else(|| StoreError::NotFound("no cities to seed with".to_string()))
    }
}

pub fn strategy_for(setting: &Setting) -> Box<dyn DictionaryStrategy> {
    match setting.title.as_str() {
        CITIES_SETTING_TITLE => Box::new(CitiesDict),
        WORDS_SETTING_TITLE => Box::new(WordsDict),
        _ => Box::new(WordsDict),
    }
}
