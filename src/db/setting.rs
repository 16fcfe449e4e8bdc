// Setting repository: game modes binding a turn-timeout to a dictionary.
use sqlx::PgPool;

use crate::errors::StoreError;
use crate::models::Setting;

#[derive(Clone)]
pub struct SettingRepository {
    pool: PgPool,
}

impl SettingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_setting_by_title(&self, title: &str) -> Result<Setting, StoreError> {
        sqlx::query_as::<_, Setting>(
            "SELECT id, title, timeout FROM settings WHERE title = $1",
        )
        .bind(title)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("setting '{title}'")))
    }

    pub async fn get_setting_by_id(&self, id: i64) -> Result<Setting, StoreError> {
        sqlx::query_as::<_, Setting>("SELECT id, title, timeout FROM settings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("setting {id}")))
    }

    pub async fn list_settings(&self) -> Result<Vec<Setting>, StoreError> {
        let settings =
            sqlx::query_as::<_, Setting>("SELECT id, title, timeout FROM settings ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(settings)
    }
}
