use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{
    BookRepository, FavoriteRepository, FollowRepository, MemberRepository, ReviewRepository,
};
use crate::error::AppError;
use crate::models::{
    Book, BookInput, BookQuery, Member, MemberChanges, MemberSummary, NewComment, NewMember,
    NewReview, Review, ReviewComment, ReviewUpdate,
};

const MEMBER_COLUMNS: &str =
    "id, username, password_hash, email, gender, nickname, birth, created_at, updated_at";
const BOOK_COLUMNS: &str = "id, title, author, isbn, description, created_at";

const REVIEW_SELECT: &str = "SELECT r.id, r.book_id, r.member_id, m.username AS author, \
     r.content, r.rating, r.created_at, r.updated_at \
     FROM reviews r JOIN members m ON m.id = r.member_id";
const COMMENT_SELECT: &str = "SELECT c.id, c.review_id, c.member_id, m.username AS author, \
     c.content, c.created_at \
     FROM review_comments c JOIN members m ON m.id = c.member_id";

/// `%needle%` with LIKE metacharacters escaped, matching `BookQuery::matches`.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// PostgreSQL implementation of every repository trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool and brings the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl MemberRepository for PgStore {
    async fn find_member_by_username(&self, username: &str) -> Result<Option<Member>, AppError> {
        let member = sqlx::query_as::<_, Member>(&format!(
            "SELECT {} FROM members WHERE username = $1",
            MEMBER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(member)
    }

    async fn create_member(&self, member: NewMember) -> Result<Option<Member>, AppError> {
        let created = sqlx::query_as::<_, Member>(&format!(
            "INSERT INTO members (username, password_hash, email, gender, nickname, birth) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (username) DO NOTHING \
             RETURNING {}",
            MEMBER_COLUMNS
        ))
        .bind(&member.username)
        .bind(&member.password_hash)
        .bind(&member.email)
        .bind(member.gender)
        .bind(&member.nickname)
        .bind(member.birth)
        .fetch_optional(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_member(
        &self,
        username: &str,
        changes: MemberChanges,
    ) -> Result<Option<Member>, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Member>(&format!(
            "SELECT {} FROM members WHERE username = $1 FOR UPDATE",
            MEMBER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut member) = current else {
            return Ok(None);
        };
        member.apply(changes);

        let updated = sqlx::query_as::<_, Member>(&format!(
            "UPDATE members \
             SET password_hash = $1, email = $2, gender = $3, nickname = $4, birth = $5, updated_at = $6 \
             WHERE id = $7 \
             RETURNING {}",
            MEMBER_COLUMNS
        ))
        .bind(&member.password_hash)
        .bind(&member.email)
        .bind(member.gender)
        .bind(&member.nickname)
        .bind(member.birth)
        .bind(member.updated_at)
        .bind(member.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete_member(&self, username: &str) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM members WHERE username = $1 FOR UPDATE",
        )
        .bind(username)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(id) = id else {
            return Ok(false);
        };

        for statement in [
            "DELETE FROM review_comments WHERE member_id = $1",
            "DELETE FROM reviews WHERE member_id = $1",
            "DELETE FROM favorites WHERE member_id = $1",
            "DELETE FROM follows WHERE follower_id = $1 OR followee_id = $1",
            "DELETE FROM members WHERE id = $1",
        ] {
            sqlx::query(statement).bind(id).execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}

#[async_trait]
impl BookRepository for PgStore {
    async fn create_book(&self, book: BookInput) -> Result<Option<Book>, AppError> {
        let created = sqlx::query_as::<_, Book>(&format!(
            "INSERT INTO books (title, author, isbn, description) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (isbn) DO NOTHING \
             RETURNING {}",
            BOOK_COLUMNS
        ))
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.description)
        .fetch_optional(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_book(&self, id: i64) -> Result<Option<Book>, AppError> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE id = $1",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    async fn search_books(&self, query: &BookQuery) -> Result<Vec<Book>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM books", BOOK_COLUMNS));

        if let Some(needle) = query.needle() {
            let pattern = contains_pattern(needle);
            builder.push(" WHERE title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(r" ESCAPE '\' OR author ILIKE ");
            builder.push_bind(pattern);
            builder.push(r" ESCAPE '\'");
        }
        builder.push(" ORDER BY id");

        let books = builder.build_query_as::<Book>().fetch_all(&self.pool).await?;
        Ok(books)
    }
}

#[async_trait]
impl FavoriteRepository for PgStore {
    async fn add_favorite(&self, book_id: i64, member_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO favorites (book_id, member_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(book_id)
        .bind(member_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn remove_favorite(&self, book_id: i64, member_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM favorites WHERE book_id = $1 AND member_id = $2")
            .bind(book_id)
            .bind(member_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn count_favorites(&self, book_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM favorites WHERE book_id = $1")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn favorite_books(&self, member_id: i64) -> Result<Vec<Book>, AppError> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT b.id, b.title, b.author, b.isbn, b.description, b.created_at \
             FROM books b JOIN favorites f ON f.book_id = b.id \
             WHERE f.member_id = $1 \
             ORDER BY f.created_at DESC, b.id",
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }
}

#[async_trait]
impl FollowRepository for PgStore {
    async fn add_follow(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO follows (follower_id, followee_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(follower_id)
        .bind(followee_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn remove_follow(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2")
                .bind(follower_id)
                .bind(followee_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn followers(&self, member_id: i64) -> Result<Vec<MemberSummary>, AppError> {
        let members = sqlx::query_as::<_, MemberSummary>(
            "SELECT m.username, m.nickname \
             FROM follows f JOIN members m ON m.id = f.follower_id \
             WHERE f.followee_id = $1 \
             ORDER BY f.created_at, m.username",
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    async fn followings(&self, member_id: i64) -> Result<Vec<MemberSummary>, AppError> {
        let members = sqlx::query_as::<_, MemberSummary>(
            "SELECT m.username, m.nickname \
             FROM follows f JOIN members m ON m.id = f.followee_id \
             WHERE f.follower_id = $1 \
             ORDER BY f.created_at, m.username",
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }
}

#[async_trait]
impl ReviewRepository for PgStore {
    async fn create_review(&self, review: NewReview) -> Result<Option<Review>, AppError> {
        let created = sqlx::query_as::<_, Review>(
            "WITH r AS ( \
                 INSERT INTO reviews (book_id, member_id, content, rating) \
                 VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (book_id, member_id) DO NOTHING \
                 RETURNING * \
             ) \
             SELECT r.id, r.book_id, r.member_id, m.username AS author, \
                    r.content, r.rating, r.created_at, r.updated_at \
             FROM r JOIN members m ON m.id = r.member_id",
        )
        .bind(review.book_id)
        .bind(review.member_id)
        .bind(&review.content)
        .bind(review.rating)
        .fetch_optional(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_review(&self, id: i64) -> Result<Option<Review>, AppError> {
        let review = sqlx::query_as::<_, Review>(&format!("{} WHERE r.id = $1", REVIEW_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(review)
    }

    async fn reviews_for_book(&self, book_id: i64) -> Result<Vec<Review>, AppError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "{} WHERE r.book_id = $1 ORDER BY r.created_at DESC, r.id DESC",
            REVIEW_SELECT
        ))
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn update_review(
        &self,
        id: i64,
        changes: ReviewUpdate,
    ) -> Result<Option<Review>, AppError> {
        let updated = sqlx::query_as::<_, Review>(
            "WITH r AS ( \
                 UPDATE reviews \
                 SET content = COALESCE($1, content), rating = COALESCE($2, rating), updated_at = $3 \
                 WHERE id = $4 \
                 RETURNING * \
             ) \
             SELECT r.id, r.book_id, r.member_id, m.username AS author, \
                    r.content, r.rating, r.created_at, r.updated_at \
             FROM r JOIN members m ON m.id = r.member_id",
        )
        .bind(changes.content)
        .bind(changes.rating)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_review(&self, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM review_comments WHERE review_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() == 1)
    }

    async fn create_comment(&self, comment: NewComment) -> Result<ReviewComment, AppError> {
        let created = sqlx::query_as::<_, ReviewComment>(
            "WITH c AS ( \
                 INSERT INTO review_comments (review_id, member_id, content) \
                 VALUES ($1, $2, $3) \
                 RETURNING * \
             ) \
             SELECT c.id, c.review_id, c.member_id, m.username AS author, c.content, c.created_at \
             FROM c JOIN members m ON m.id = c.member_id",
        )
        .bind(comment.review_id)
        .bind(comment.member_id)
        .bind(&comment.content)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_comment(&self, id: i64) -> Result<Option<ReviewComment>, AppError> {
        let comment =
            sqlx::query_as::<_, ReviewComment>(&format!("{} WHERE c.id = $1", COMMENT_SELECT))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(comment)
    }

    async fn comments_for_review(&self, review_id: i64) -> Result<Vec<ReviewComment>, AppError> {
        let comments = sqlx::query_as::<_, ReviewComment>(&format!(
            "{} WHERE c.review_id = $1 ORDER BY c.created_at, c.id",
            COMMENT_SELECT
        ))
        .bind(review_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM review_comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
