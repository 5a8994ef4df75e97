use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A directed follow edge from `follower_id` to `followee_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Follow {
    pub follower_id: i64,
    pub followee_id: i64,
    pub created_at: DateTime<Utc>,
}
