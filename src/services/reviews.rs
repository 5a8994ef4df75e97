use validator::Validate;

use crate::error::{AppError, ReviewErrorCode};
use crate::models::{
    CommentInput, Member, NewComment, NewReview, Review, ReviewComment, ReviewInput, ReviewUpdate,
};
use crate::state::AppState;
use crate::store::{BookRepository, ReviewRepository};

pub async fn write(
    state: &AppState,
    author: &Member,
    book_id: i64,
    input: ReviewInput,
) -> Result<Review, AppError> {
    input.validate()?;
    require_book(state, book_id).await?;

    state
        .store
        .create_review(NewReview {
            book_id,
            member_id: author.id,
            content: input.content,
            rating: input.rating,
        })
        .await?
        .ok_or_else(|| ReviewErrorCode::AlreadyReviewed.into())
}

pub async fn for_book(state: &AppState, book_id: i64) -> Result<Vec<Review>, AppError> {
    require_book(state, book_id).await?;
    state.store.reviews_for_book(book_id).await
}

pub async fn edit(
    state: &AppState,
    member: &Member,
    review_id: i64,
    changes: ReviewUpdate,
) -> Result<Review, AppError> {
    changes.validate()?;
    let review = owned_review(state, member, review_id).await?;

    state
        .store
        .update_review(review.id, changes)
        .await?
        .ok_or_else(|| ReviewErrorCode::ReviewNotFound.into())
}

pub async fn remove(state: &AppState, member: &Member, review_id: i64) -> Result<(), AppError> {
    let review = owned_review(state, member, review_id).await?;
    if !state.store.delete_review(review.id).await? {
        return Err(ReviewErrorCode::ReviewNotFound.into());
    }
    Ok(())
}

pub async fn comment(
    state: &AppState,
    author: &Member,
    review_id: i64,
    input: CommentInput,
) -> Result<ReviewComment, AppError> {
    input.validate()?;
    let review = find_review(state, review_id).await?;

    state
        .store
        .create_comment(NewComment {
            review_id: review.id,
            member_id: author.id,
            content: input.content,
        })
        .await
}

pub async fn comments(state: &AppState, review_id: i64) -> Result<Vec<ReviewComment>, AppError> {
    let review = find_review(state, review_id).await?;
    state.store.comments_for_review(review.id).await
}

pub async fn remove_comment(
    state: &AppState,
    member: &Member,
    review_id: i64,
    comment_id: i64,
) -> Result<(), AppError> {
    let comment = state
        .store
        .find_comment(comment_id)
        .await?
        .filter(|comment| comment.review_id == review_id)
        .ok_or_else(|| AppError::from(ReviewErrorCode::CommentNotFound))?;

    if comment.member_id != member.id {
        return Err(ReviewErrorCode::NotAuthor.into());
    }
    if !state.store.delete_comment(comment.id).await? {
        return Err(ReviewErrorCode::CommentNotFound.into());
    }
    Ok(())
}

async fn require_book(state: &AppState, book_id: i64) -> Result<(), AppError> {
    match state.store.find_book(book_id).await? {
        Some(_) => Ok(()),
        None => Err(ReviewErrorCode::BookNotFound.into()),
    }
}

async fn find_review(state: &AppState, review_id: i64) -> Result<Review, AppError> {
    state
        .store
        .find_review(review_id)
        .await?
        .ok_or_else(|| ReviewErrorCode::ReviewNotFound.into())
}

async fn owned_review(
    state: &AppState,
    member: &Member,
    review_id: i64,
) -> Result<Review, AppError> {
    let review = find_review(state, review_id).await?;
    if review.member_id != member.id {
        return Err(ReviewErrorCode::NotAuthor.into());
    }
    Ok(review)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing;

    fn input(rating: i32) -> ReviewInput {
        ReviewInput {
            content: "Quietly devastating.".to_string(),
            rating,
        }
    }

    #[actix_rt::test]
    async fn test_one_review_per_member_and_book() {
        let state = testing::state();
        let alice = testing::member(&state, "alice").await;
        let book = testing::book(&state, "The Left Hand of Darkness").await;

        let review = write(&state, &alice, book.id, input(5)).await.unwrap();
        assert_eq!(review.author, "alice");
        assert_eq!(
            write(&state, &alice, book.id, input(4)).await.unwrap_err().code(),
            "400-1"
        );
    }

    #[actix_rt::test]
    async fn test_review_requires_existing_book() {
        let state = testing::state();
        let alice = testing::member(&state, "alice").await;

        assert_eq!(
            write(&state, &alice, 404, input(3)).await.unwrap_err().code(),
            "404-3"
        );
        assert_eq!(for_book(&state, 404).await.unwrap_err().code(), "404-3");
    }

    #[actix_rt::test]
    async fn test_only_author_edits_or_removes() {
        let state = testing::state();
        let alice = testing::member(&state, "alice").await;
        let bob = testing::member(&state, "bob").await;
        let book = testing::book(&state, "Lathe of Heaven").await;
        let review = write(&state, &alice, book.id, input(3)).await.unwrap();

        let bump = ReviewUpdate {
            rating: Some(4),
            ..Default::default()
        };
        assert_eq!(
            edit(&state, &bob, review.id, bump.clone()).await.unwrap_err().code(),
            "403-1"
        );
        assert_eq!(
            remove(&state, &bob, review.id).await.unwrap_err().code(),
            "403-1"
        );

        let edited = edit(&state, &alice, review.id, bump).await.unwrap();
        assert_eq!(edited.rating, 4);
        assert_eq!(edited.content, review.content);

        remove(&state, &alice, review.id).await.unwrap();
        assert!(for_book(&state, book.id).await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_comments() {
        let state = testing::state();
        let alice = testing::member(&state, "alice").await;
        let bob = testing::member(&state, "bob").await;
        let book = testing::book(&state, "Tehanu").await;
        let review = write(&state, &alice, book.id, input(5)).await.unwrap();

        let reply = comment(
            &state,
            &bob,
            review.id,
            CommentInput {
                content: "Agreed!".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(reply.author, "bob");
        assert_eq!(comments(&state, review.id).await.unwrap().len(), 1);

        assert_eq!(
            remove_comment(&state, &alice, review.id, reply.id)
                .await
                .unwrap_err()
                .code(),
            "403-1"
        );
        assert_eq!(
            remove_comment(&state, &bob, review.id + 1000, reply.id)
                .await
                .unwrap_err()
                .code(),
            "404-2"
        );

        remove_comment(&state, &bob, review.id, reply.id).await.unwrap();
        assert!(comments(&state, review.id).await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_removing_review_drops_comments() {
        let state = testing::state();
        let alice = testing::member(&state, "alice").await;
        let book = testing::book(&state, "Always Coming Home").await;
        let review = write(&state, &alice, book.id, input(4)).await.unwrap();
        let reply = comment(
            &state,
            &alice,
            review.id,
            CommentInput {
                content: "Self-reply".to_string(),
            },
        )
        .await
        .unwrap();

        remove(&state, &alice, review.id).await.unwrap();
        assert!(state.store.find_comment(reply.id).await.unwrap().is_none());
        assert_eq!(comments(&state, review.id).await.unwrap_err().code(), "404-1");
    }
}
