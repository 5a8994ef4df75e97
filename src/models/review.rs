use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A review joined with its author's username.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Review {
    pub id: i64,
    pub book_id: i64,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub member_id: i64,
    pub author: String,
    pub content: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment on a review joined with its author's username.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct ReviewComment {
    pub id: i64,
    pub review_id: i64,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub member_id: i64,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /books/{id}/reviews`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReviewInput {
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
}

/// Body of `PUT /reviews/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ReviewUpdate {
    #[validate(length(min = 1, max = 2000))]
    pub content: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<i32>,
}

/// Body of `POST /reviews/{id}/comments`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CommentInput {
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub book_id: i64,
    pub member_id: i64,
    pub content: String,
    pub rating: i32,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub review_id: i64,
    pub member_id: i64,
    pub content: String,
}
