use actix_web::{delete, get, post, web, Responder};

use crate::{
    auth::CurrentMember,
    error::AppError,
    models::{BookInput, BookQuery},
    response::GenericResponse,
    services::books,
    state::AppState,
};

/// Registers a book. Any authenticated member may do so.
///
/// ## Responses:
/// - `201 Created`: the stored `Book`.
/// - `400 Bad Request` (`400-1`): the ISBN is already registered.
/// - `422 Unprocessable Entity`: title, author or ISBN failed validation.
#[post("")]
pub async fn register(
    _member: CurrentMember,
    state: web::Data<AppState>,
    input: web::Json<BookInput>,
) -> Result<impl Responder, AppError> {
    let book = books::register(&state, input.into_inner()).await?;
    Ok(GenericResponse::of(book, "Book registered").created())
}

/// Lists books ordered by id. `?q=` filters on title or author, ignoring case.
#[get("")]
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<BookQuery>,
) -> Result<impl Responder, AppError> {
    let found = books::search(&state, &query).await?;
    Ok(GenericResponse::of(found, "Books").ok())
}

/// The caller's favorite books, most recently added first.
///
/// ## Responses:
/// - `200 OK`: an array of `Book`.
/// - `401 Unauthorized`: missing or invalid bearer token.
#[get("/favorites")]
pub async fn favorites(
    CurrentMember(member): CurrentMember,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let found = books::favorites(&state, &member).await?;
    Ok(GenericResponse::of(found, "Favorite books").ok())
}

/// A single book with the number of members who favorited it.
///
/// ## Responses:
/// - `200 OK`: the `Book` fields plus `favorite_count`.
/// - `400 Bad Request`: the id is not a number.
/// - `404 Not Found` (`404-1`): no such book.
#[get("/{id}")]
pub async fn detail(
    state: web::Data<AppState>,
    book_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let book = books::detail(&state, book_id.into_inner()).await?;
    Ok(GenericResponse::of(book, "Book detail").ok())
}

/// Adds the book to the caller's favorites.
///
/// ## Responses:
/// - `201 Created`: the favorite was recorded.
/// - `404 Not Found` (`404-1`): no such book.
/// - `400 Bad Request` (`400-2`): already a favorite.
#[post("/{id}/favorite")]
pub async fn favorite(
    CurrentMember(member): CurrentMember,
    state: web::Data<AppState>,
    book_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    books::favorite(&state, &member, book_id.into_inner()).await?;
    Ok(GenericResponse::message("Added to favorites").created())
}

/// Removes the book from the caller's favorites.
///
/// ## Responses:
/// - `200 OK`: the favorite was removed.
/// - `404 Not Found` (`404-1`): no such book.
/// - `400 Bad Request` (`400-3`): the book was not a favorite.
#[delete("/{id}/favorite")]
pub async fn unfavorite(
    CurrentMember(member): CurrentMember,
    state: web::Data<AppState>,
    book_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    books::unfavorite(&state, &member, book_id.into_inner()).await?;
    Ok(GenericResponse::message("Removed from favorites").ok())
}
