use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A (book, member) favorite edge. The pair is the primary key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Favorite {
    pub book_id: i64,
    pub member_id: i64,
    pub created_at: DateTime<Utc>,
}
