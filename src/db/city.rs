// City repository: reference list of valid city names for "города" mode.
use sqlx::PgPool;

use crate::errors::StoreError;
use crate::models::City;

#[derive(Clone)]
pub struct CityRepository {
    pool: PgPool,
}

impl CityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up by the capitalized canonical form (callers capitalize
    /// first, per `spec.md` §4.1).
    pub async fn get_city_by_title(&self, title: &str) -> Result<City, StoreError> {
        sqlx::query_as::<_, City>(
            "SELECT id, title, id_region, id_country FROM cities WHERE title = $1",
        )
        .bind(title)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("city '{title}'")))
    }

    pub async fn list_cities(&self) -> Result<Vec<City>, StoreError> {
        let cities = sqlx::query_as::<_, City>(
            "SELECT id, title, id_region, id_country FROM cities ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(cities)
    }

    /// Pick a uniform random city. Used to seed the first move in
    /// "города" mode (§4.5.1).
    pub async fn random_city(&self) -> Result<Option<City>, StoreError> {
        let city = sqlx::query_as::<_, City>(
            "SELECT id, title, id_region, id_country FROM cities ORDER BY random() LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(city)
    }
}

/// Capitalize the first character, lower-case the rest — mirrors Python's
/// `str.capitalize()` used by the source to match the canonical-cased
/// city titles stored in the table.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::capitalize;

    #[test]
    fn capitalizes_cyrillic_words() {
        assert_eq!(capitalize("ленинград"), "Ленинград");
        assert_eq!(capitalize("ОРЕЛ"), "Орел");
        assert_eq!(capitalize(""), "");
    }
}
