//! Review and comment handlers.
//!
//! `write` and `for_book` live under the `/books` scope; the rest under `/reviews`.

use actix_web::{delete, get, post, put, web, Responder};

use crate::{
    auth::CurrentMember,
    error::AppError,
    models::{CommentInput, ReviewInput, ReviewUpdate},
    response::GenericResponse,
    services::reviews,
    state::AppState,
};

/// Reviews a book. A member reviews each book at most once.
#[post("/{id}/reviews")]
pub async fn write(
    CurrentMember(member): CurrentMember,
    state: web::Data<AppState>,
    book_id: web::Path<i64>,
    input: web::Json<ReviewInput>,
) -> Result<impl Responder, AppError> {
    let review = reviews::write(&state, &member, book_id.into_inner(), input.into_inner()).await?;
    Ok(GenericResponse::of(review, "Review written").created())
}

/// The book's reviews, newest first.
#[get("/{id}/reviews")]
pub async fn for_book(
    state: web::Data<AppState>,
    book_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let found = reviews::for_book(&state, book_id.into_inner()).await?;
    Ok(GenericResponse::of(found, "Reviews").ok())
}

/// Updates the review's content and/or rating. Author only.
#[put("/{id}")]
pub async fn edit(
    CurrentMember(member): CurrentMember,
    state: web::Data<AppState>,
    review_id: web::Path<i64>,
    changes: web::Json<ReviewUpdate>,
) -> Result<impl Responder, AppError> {
    let review =
        reviews::edit(&state, &member, review_id.into_inner(), changes.into_inner()).await?;
    Ok(GenericResponse::of(review, "Review updated").ok())
}

/// Deletes the review and its comments. Author only.
///
/// ## Responses:
/// - `200 OK`: the review is gone.
/// - `403 Forbidden` (`403-1`): the caller did not write it.
/// - `404 Not Found` (`404-1`): no such review.
#[delete("/{id}")]
pub async fn remove(
    CurrentMember(member): CurrentMember,
    state: web::Data<AppState>,
    review_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    reviews::remove(&state, &member, review_id.into_inner()).await?;
    Ok(GenericResponse::message("Review deleted").ok())
}

/// Comments on a review. Any authenticated member may comment.
#[post("/{id}/comments")]
pub async fn comment(
    CurrentMember(member): CurrentMember,
    state: web::Data<AppState>,
    review_id: web::Path<i64>,
    input: web::Json<CommentInput>,
) -> Result<impl Responder, AppError> {
    let written =
        reviews::comment(&state, &member, review_id.into_inner(), input.into_inner()).await?;
    Ok(GenericResponse::of(written, "Comment written").created())
}

/// The review's comments, oldest first.
#[get("/{id}/comments")]
pub async fn comments(
    state: web::Data<AppState>,
    review_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let found = reviews::comments(&state, review_id.into_inner()).await?;
    Ok(GenericResponse::of(found, "Comments").ok())
}

/// Deletes a comment. Author only.
///
/// ## Responses:
/// - `200 OK`: the comment is gone.
/// - `403 Forbidden` (`403-1`): the caller did not write it.
/// - `404 Not Found` (`404-2`): no such comment on this review.
#[delete("/{id}/comments/{comment_id}")]
pub async fn remove_comment(
    CurrentMember(member): CurrentMember,
    state: web::Data<AppState>,
    path: web::Path<(i64, i64)>,
) -> Result<impl Responder, AppError> {
    let (review_id, comment_id) = path.into_inner();
    reviews::remove_comment(&state, &member, review_id, comment_id).await?;
    Ok(GenericResponse::message("Comment deleted").ok())
}
