//! Persistence contracts.
//!
//! Services talk to storage only through these traits, held as `Arc<dyn Store>` in
//! `AppState`. `PgStore` backs them with PostgreSQL; `MemoryStore` keeps everything in
//! process and is used when no database is configured and by the test suite.
//!
//! Conflicts on unique keys are reported in-band (`Ok(None)` / `Ok(false)`) so the
//! calling service can pick the matching domain error code.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{
    Book, BookInput, BookQuery, Member, MemberChanges, MemberSummary, NewComment, NewMember,
    NewReview, Review, ReviewComment, ReviewUpdate,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn find_member_by_username(&self, username: &str) -> Result<Option<Member>, AppError>;

    /// Returns `None` when the username is already taken.
    async fn create_member(&self, member: NewMember) -> Result<Option<Member>, AppError>;

    /// Applies `changes` atomically. Returns `None` when the member no longer exists.
    async fn update_member(
        &self,
        username: &str,
        changes: MemberChanges,
    ) -> Result<Option<Member>, AppError>;

    /// Removes the member and everything hanging off it. Returns `false` if nothing was deleted.
    async fn delete_member(&self, username: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Returns `None` when the ISBN is already registered.
    async fn create_book(&self, book: BookInput) -> Result<Option<Book>, AppError>;

    async fn find_book(&self, id: i64) -> Result<Option<Book>, AppError>;

    async fn search_books(&self, query: &BookQuery) -> Result<Vec<Book>, AppError>;
}

#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Returns `false` if the pair already exists.
    async fn add_favorite(&self, book_id: i64, member_id: i64) -> Result<bool, AppError>;

    /// Returns `false` if the pair did not exist.
    async fn remove_favorite(&self, book_id: i64, member_id: i64) -> Result<bool, AppError>;

    async fn count_favorites(&self, book_id: i64) -> Result<i64, AppError>;

    async fn favorite_books(&self, member_id: i64) -> Result<Vec<Book>, AppError>;
}

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Returns `false` if the edge already exists.
    async fn add_follow(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError>;

    /// Returns `false` if the edge did not exist.
    async fn remove_follow(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError>;

    async fn followers(&self, member_id: i64) -> Result<Vec<MemberSummary>, AppError>;

    async fn followings(&self, member_id: i64) -> Result<Vec<MemberSummary>, AppError>;
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Returns `None` when the member already reviewed the book.
    async fn create_review(&self, review: NewReview) -> Result<Option<Review>, AppError>;

    async fn find_review(&self, id: i64) -> Result<Option<Review>, AppError>;

    /// Newest first.
    async fn reviews_for_book(&self, book_id: i64) -> Result<Vec<Review>, AppError>;

    async fn update_review(
        &self,
        id: i64,
        changes: ReviewUpdate,
    ) -> Result<Option<Review>, AppError>;

    /// Deletes the review together with its comments.
    async fn delete_review(&self, id: i64) -> Result<bool, AppError>;

    async fn create_comment(&self, comment: NewComment) -> Result<ReviewComment, AppError>;

    async fn find_comment(&self, id: i64) -> Result<Option<ReviewComment>, AppError>;

    /// Oldest first.
    async fn comments_for_review(&self, review_id: i64) -> Result<Vec<ReviewComment>, AppError>;

    async fn delete_comment(&self, id: i64) -> Result<bool, AppError>;
}

/// Everything the application needs from storage.
pub trait Store:
    MemberRepository + BookRepository + FavoriteRepository + FollowRepository + ReviewRepository
{
}

impl<T> Store for T where
    T: MemberRepository + BookRepository + FavoriteRepository + FollowRepository + ReviewRepository
{
}

pub type StoreState = Arc<dyn Store>;
