use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// `cities` table row: a reference list of valid city names for "города"
/// mode, matched case-insensitively against the capitalized form.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct City {
    pub id: i64,
    pub title: String,
    pub id_region: Option<i64>,
    pub id_country: Option<i64>,
}
