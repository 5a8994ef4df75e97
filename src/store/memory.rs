use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{
    BookRepository, FavoriteRepository, FollowRepository, MemberRepository, ReviewRepository,
};
use crate::error::AppError;
use crate::models::{
    Book, BookInput, BookQuery, Favorite, Follow, Member, MemberChanges, MemberSummary,
    NewComment, NewMember, NewReview, Review, ReviewComment, ReviewUpdate,
};

/// Rows as they would sit in the tables; author names are joined on read.
#[derive(Debug, Clone)]
struct ReviewRow {
    id: i64,
    book_id: i64,
    member_id: i64,
    content: String,
    rating: i32,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct CommentRow {
    id: i64,
    review_id: i64,
    member_id: i64,
    content: String,
    created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    members: BTreeMap<i64, Member>,
    books: BTreeMap<i64, Book>,
    favorites: Vec<Favorite>,
    follows: Vec<Follow>,
    reviews: BTreeMap<i64, ReviewRow>,
    comments: BTreeMap<i64, CommentRow>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn member_by_username(&self, username: &str) -> Option<&Member> {
        self.members.values().find(|m| m.username == username)
    }

    fn username(&self, member_id: i64) -> Option<String> {
        self.members.get(&member_id).map(|m| m.username.clone())
    }

    fn summary(&self, member_id: i64) -> Option<MemberSummary> {
        self.members.get(&member_id).map(|m| MemberSummary {
            username: m.username.clone(),
            nickname: m.nickname.clone(),
        })
    }

    /// `None` when the author row is gone; cascades keep that from happening.
    fn review(&self, row: &ReviewRow) -> Option<Review> {
        Some(Review {
            id: row.id,
            book_id: row.book_id,
            member_id: row.member_id,
            author: self.username(row.member_id)?,
            content: row.content.clone(),
            rating: row.rating,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn comment(&self, row: &CommentRow) -> Option<ReviewComment> {
        Some(ReviewComment {
            id: row.id,
            review_id: row.review_id,
            member_id: row.member_id,
            author: self.username(row.member_id)?,
            content: row.content.clone(),
            created_at: row.created_at,
        })
    }

    fn remove_review(&mut self, id: i64) -> bool {
        self.comments.retain(|_, c| c.review_id != id);
        self.reviews.remove(&id).is_some()
    }
}

/// The in-memory counterpart of a foreign key violation.
fn unknown_member(member_id: i64) -> AppError {
    AppError::NotFound(format!("Member {} does not exist", member_id))
}

/// A process-local store. Each operation runs under one lock acquisition, so
/// multi-row mutations are all-or-nothing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemberRepository for MemoryStore {
    async fn find_member_by_username(&self, username: &str) -> Result<Option<Member>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.member_by_username(username).cloned())
    }

    async fn create_member(&self, member: NewMember) -> Result<Option<Member>, AppError> {
        let mut tables = self.tables.write().await;
        if tables.member_by_username(&member.username).is_some() {
            return Ok(None);
        }

        let now = Utc::now();
        let id = tables.next_id();
        let created = Member {
            id,
            username: member.username,
            password_hash: member.password_hash,
            email: member.email,
            gender: member.gender,
            nickname: member.nickname,
            birth: member.birth,
            created_at: now,
            updated_at: now,
        };
        tables.members.insert(id, created.clone());
        Ok(Some(created))
    }

    async fn update_member(
        &self,
        username: &str,
        changes: MemberChanges,
    ) -> Result<Option<Member>, AppError> {
        let mut tables = self.tables.write().await;
        let member = tables
            .members
            .values_mut()
            .find(|m| m.username == username);

        Ok(member.map(|member| {
            member.apply(changes);
            member.clone()
        }))
    }

    async fn delete_member(&self, username: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let Some(id) = tables.member_by_username(username).map(|m| m.id) else {
            return Ok(false);
        };

        let authored: Vec<i64> = tables
            .reviews
            .values()
            .filter(|r| r.member_id == id)
            .map(|r| r.id)
            .collect();
        for review_id in authored {
            tables.remove_review(review_id);
        }
        tables.comments.retain(|_, c| c.member_id != id);
        tables.favorites.retain(|f| f.member_id != id);
        tables
            .follows
            .retain(|f| f.follower_id != id && f.followee_id != id);
        tables.members.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl BookRepository for MemoryStore {
    async fn create_book(&self, book: BookInput) -> Result<Option<Book>, AppError> {
        let mut tables = self.tables.write().await;
        if let Some(isbn) = &book.isbn {
            if tables
                .books
                .values()
                .any(|b| b.isbn.as_deref() == Some(isbn.as_str()))
            {
                return Ok(None);
            }
        }

        let id = tables.next_id();
        let created = Book {
            id,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            description: book.description,
            created_at: Utc::now(),
        };
        tables.books.insert(id, created.clone());
        Ok(Some(created))
    }

    async fn find_book(&self, id: i64) -> Result<Option<Book>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.books.get(&id).cloned())
    }

    async fn search_books(&self, query: &BookQuery) -> Result<Vec<Book>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .values()
            .filter(|b| query.matches(b))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FavoriteRepository for MemoryStore {
    async fn add_favorite(&self, book_id: i64, member_id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        if tables
            .favorites
            .iter()
            .any(|f| f.book_id == book_id && f.member_id == member_id)
        {
            return Ok(false);
        }
        tables.favorites.push(Favorite {
            book_id,
            member_id,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn remove_favorite(&self, book_id: i64, member_id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.favorites.len();
        tables
            .favorites
            .retain(|f| !(f.book_id == book_id && f.member_id == member_id));
        Ok(tables.favorites.len() < before)
    }

    async fn count_favorites(&self, book_id: i64) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.favorites.iter().filter(|f| f.book_id == book_id).count() as i64)
    }

    async fn favorite_books(&self, member_id: i64) -> Result<Vec<Book>, AppError> {
        let tables = self.tables.read().await;
        // Newest favorite first, pushes are chronological.
        Ok(tables
            .favorites
            .iter()
            .rev()
            .filter(|f| f.member_id == member_id)
            .filter_map(|f| tables.books.get(&f.book_id).cloned())
            .collect())
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn add_follow(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        if tables
            .follows
            .iter()
            .any(|f| f.follower_id == follower_id && f.followee_id == followee_id)
        {
            return Ok(false);
        }
        tables.follows.push(Follow {
            follower_id,
            followee_id,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn remove_follow(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|f| !(f.follower_id == follower_id && f.followee_id == followee_id));
        Ok(tables.follows.len() < before)
    }

    async fn followers(&self, member_id: i64) -> Result<Vec<MemberSummary>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .filter(|f| f.followee_id == member_id)
            .filter_map(|f| tables.summary(f.follower_id))
            .collect())
    }

    async fn followings(&self, member_id: i64) -> Result<Vec<MemberSummary>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .filter(|f| f.follower_id == member_id)
            .filter_map(|f| tables.summary(f.followee_id))
            .collect())
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn create_review(&self, review: NewReview) -> Result<Option<Review>, AppError> {
        let mut tables = self.tables.write().await;
        if tables
            .reviews
            .values()
            .any(|r| r.book_id == review.book_id && r.member_id == review.member_id)
        {
            return Ok(None);
        }

        let now = Utc::now();
        let row = ReviewRow {
            id: tables.next_id(),
            book_id: review.book_id,
            member_id: review.member_id,
            content: review.content,
            rating: review.rating,
            created_at: now,
            updated_at: now,
        };
        let created = tables
            .review(&row)
            .ok_or_else(|| unknown_member(row.member_id))?;
        tables.reviews.insert(row.id, row);
        Ok(Some(created))
    }

    async fn find_review(&self, id: i64) -> Result<Option<Review>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.reviews.get(&id).and_then(|row| tables.review(row)))
    }

    async fn reviews_for_book(&self, book_id: i64) -> Result<Vec<Review>, AppError> {
        let tables = self.tables.read().await;
        // Ids grow with time, so reverse id order is newest first.
        Ok(tables
            .reviews
            .values()
            .rev()
            .filter(|r| r.book_id == book_id)
            .filter_map(|row| tables.review(row))
            .collect())
    }

    async fn update_review(
        &self,
        id: i64,
        changes: ReviewUpdate,
    ) -> Result<Option<Review>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.reviews.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(content) = changes.content {
            row.content = content;
        }
        if let Some(rating) = changes.rating {
            row.rating = rating;
        }
        row.updated_at = Utc::now();

        let row = row.clone();
        Ok(tables.review(&row))
    }

    async fn delete_review(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.remove_review(id))
    }

    async fn create_comment(&self, comment: NewComment) -> Result<ReviewComment, AppError> {
        let mut tables = self.tables.write().await;
        let row = CommentRow {
            id: tables.next_id(),
            review_id: comment.review_id,
            member_id: comment.member_id,
            content: comment.content,
            created_at: Utc::now(),
        };
        let created = tables
            .comment(&row)
            .ok_or_else(|| unknown_member(row.member_id))?;
        tables.comments.insert(row.id, row);
        Ok(created)
    }

    async fn find_comment(&self, id: i64) -> Result<Option<ReviewComment>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.get(&id).and_then(|row| tables.comment(row)))
    }

    async fn comments_for_review(&self, review_id: i64) -> Result<Vec<ReviewComment>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|c| c.review_id == review_id)
            .filter_map(|row| tables.comment(row))
            .collect())
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.comments.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_member(username: &str) -> NewMember {
        NewMember {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            email: format!("{}@example.com", username),
            gender: None,
            nickname: username.to_uppercase(),
            birth: None,
        }
    }

    fn new_book(isbn: Option<&str>) -> BookInput {
        BookInput {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            isbn: isbn.map(str::to_string),
            description: None,
        }
    }

    #[actix_rt::test]
    async fn test_usernames_are_unique() {
        let store = MemoryStore::new();
        assert!(store.create_member(new_member("alice")).await.unwrap().is_some());
        assert!(store.create_member(new_member("alice")).await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_isbn_is_unique_but_optional() {
        let store = MemoryStore::new();
        assert!(store.create_book(new_book(Some("9780441172719"))).await.unwrap().is_some());
        assert!(store.create_book(new_book(Some("9780441172719"))).await.unwrap().is_none());
        assert!(store.create_book(new_book(None)).await.unwrap().is_some());
        assert!(store.create_book(new_book(None)).await.unwrap().is_some());
    }

    #[actix_rt::test]
    async fn test_edges_reject_duplicates() {
        let store = MemoryStore::new();
        assert!(store.add_follow(1, 2).await.unwrap());
        assert!(!store.add_follow(1, 2).await.unwrap());
        assert!(store.add_follow(2, 1).await.unwrap());

        assert!(store.add_favorite(10, 1).await.unwrap());
        assert!(!store.add_favorite(10, 1).await.unwrap());
        assert!(store.remove_favorite(10, 1).await.unwrap());
        assert!(!store.remove_favorite(10, 1).await.unwrap());
    }

    #[actix_rt::test]
    async fn test_delete_member_cascades() {
        let store = MemoryStore::new();
        let alice = store.create_member(new_member("alice")).await.unwrap().unwrap();
        let bob = store.create_member(new_member("bob")).await.unwrap().unwrap();
        let book = store.create_book(new_book(None)).await.unwrap().unwrap();

        store.add_favorite(book.id, alice.id).await.unwrap();
        store.add_follow(alice.id, bob.id).await.unwrap();
        store.add_follow(bob.id, alice.id).await.unwrap();
        let alice_review = store
            .create_review(NewReview {
                book_id: book.id,
                member_id: alice.id,
                content: "Spice".to_string(),
                rating: 5,
            })
            .await
            .unwrap()
            .unwrap();
        let bob_comment = store
            .create_comment(NewComment {
                review_id: alice_review.id,
                member_id: bob.id,
                content: "Agreed".to_string(),
            })
            .await
            .unwrap();

        assert!(store.delete_member("alice").await.unwrap());
        assert!(!store.delete_member("alice").await.unwrap());

        assert_eq!(store.count_favorites(book.id).await.unwrap(), 0);
        assert!(store.followers(bob.id).await.unwrap().is_empty());
        assert!(store.followings(bob.id).await.unwrap().is_empty());
        assert!(store.find_review(alice_review.id).await.unwrap().is_none());
        assert!(store.find_comment(bob_comment.id).await.unwrap().is_none());
        assert!(store.find_member_by_username("bob").await.unwrap().is_some());
    }

    #[actix_rt::test]
    async fn test_update_member_applies_changes() {
        let store = MemoryStore::new();
        store.create_member(new_member("alice")).await.unwrap();

        let updated = store
            .update_member(
                "alice",
                MemberChanges {
                    email: Some("new@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.email, "new@example.com");
        assert_eq!(updated.nickname, "ALICE");

        let missing = store
            .update_member("nobody", MemberChanges::default())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[actix_rt::test]
    async fn test_reviews_are_newest_first() {
        let store = MemoryStore::new();
        let alice = store.create_member(new_member("alice")).await.unwrap().unwrap();
        let bob = store.create_member(new_member("bob")).await.unwrap().unwrap();
        let book = store.create_book(new_book(None)).await.unwrap().unwrap();

        for member_id in [alice.id, bob.id] {
            store
                .create_review(NewReview {
                    book_id: book.id,
                    member_id,
                    content: "ok".to_string(),
                    rating: 3,
                })
                .await
                .unwrap();
        }

        let authors: Vec<String> = store
            .reviews_for_book(book.id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.author)
            .collect();
        assert_eq!(authors, vec!["bob".to_string(), "alice".to_string()]);
    }

    #[actix_rt::test]
    async fn test_rows_need_an_existing_author() {
        let store = MemoryStore::new();
        let book = store.create_book(new_book(None)).await.unwrap().unwrap();

        let review = store
            .create_review(NewReview {
                book_id: book.id,
                member_id: 404,
                content: "ghost".to_string(),
                rating: 1,
            })
            .await;
        assert!(matches!(review, Err(AppError::NotFound(_))));

        let comment = store
            .create_comment(NewComment {
                review_id: 1,
                member_id: 404,
                content: "ghost".to_string(),
            })
            .await;
        assert!(matches!(comment, Err(AppError::NotFound(_))));
        assert!(store.comments_for_review(1).await.unwrap().is_empty());
        assert!(store.reviews_for_book(book.id).await.unwrap().is_empty());
    }
}
