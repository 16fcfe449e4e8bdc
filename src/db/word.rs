// Word repository: the known-word dictionary and black list.
use sqlx::PgPool;

use crate::errors::StoreError;
use crate::models::Word;

#[derive(Clone)]
pub struct WordRepository {
    pool: PgPool,
}

impl WordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a word, case-folded to lower before storage. Ignoring a
    /// unique violation is the caller's job (see vote tally §4.5.4, which
    /// tolerates a concurrent vote having already inserted the word).
    pub async fn create_word(&self, title: &str, is_correct: bool) -> Result<Word, StoreError> {
        let title = title.to_lowercase();
        let word = sqlx::query_as::<_, Word>(
            "INSERT INTO words (title, is_correct) VALUES ($1, $2)
             RETURNING id, title, is_correct",
        )
        .bind(&title)
        .bind(is_correct)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(e, &format!("word title '{title}'")))?;

        tracing::debug!(word = %word.title, is_correct, "created word");
        Ok(word)
    }

    pub async fn get_word_by_title(&self, title: &str) -> Result<Word, StoreError> {
        let title = title.to_lowercase();
        sqlx::query_as::<_, Word>("SELECT id, title, is_correct FROM words WHERE title = $1")
            .bind(&title)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from)?
            .ok_or_else(|| StoreError::NotFound(format!("word '{title}'")))
    }

    pub async fn list_words(&self, is_correct: Option<bool>) -> Result<Vec<Word>, StoreError> {
        let words = match is_correct {
            Some(flag) => {
                sqlx::query_as::<_, Word>(
                    "SELECT id, title, is_correct FROM words WHERE is_correct = $1 ORDER BY id",
                )
                .bind(flag)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Word>("SELECT id, title, is_correct FROM words ORDER BY id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(words)
    }

    /// Pick a uniform random correct word. Used to seed the first move in
    /// "слова" mode (§4.5.1).
    pub async fn random_correct_word(&self) -> Result<Option<Word>, StoreError> {
        let word = sqlx::query_as::<_, Word>(
            "SELECT id, title, is_correct FROM words WHERE is_correct = TRUE
             ORDER BY random() LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(word)
    }

    pub async fn count_words(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM words")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
