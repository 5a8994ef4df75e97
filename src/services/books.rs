use validator::Validate;

use crate::error::{AppError, BookErrorCode};
use crate::models::{Book, BookDetail, BookInput, BookQuery, Member};
use crate::state::AppState;
use crate::store::{BookRepository, FavoriteRepository};

pub async fn register(state: &AppState, input: BookInput) -> Result<Book, AppError> {
    let input = input.normalized();
    input.validate()?;

    let book = state
        .store
        .create_book(input)
        .await?
        .ok_or_else(|| AppError::from(BookErrorCode::DuplicateIsbn))?;

    log::info!("book registered: {} ({})", book.title, book.id);
    Ok(book)
}

pub async fn search(state: &AppState, query: &BookQuery) -> Result<Vec<Book>, AppError> {
    state.store.search_books(query).await
}

pub async fn detail(state: &AppState, book_id: i64) -> Result<BookDetail, AppError> {
    let book = find(state, book_id).await?;
    let favorite_count = state.store.count_favorites(book.id).await?;
    Ok(BookDetail {
        book,
        favorite_count,
    })
}

pub async fn favorite(state: &AppState, member: &Member, book_id: i64) -> Result<(), AppError> {
    let book = find(state, book_id).await?;
    if !state.store.add_favorite(book.id, member.id).await? {
        return Err(BookErrorCode::AlreadyFavorite.into());
    }
    Ok(())
}

pub async fn unfavorite(state: &AppState, member: &Member, book_id: i64) -> Result<(), AppError> {
    let book = find(state, book_id).await?;
    if !state.store.remove_favorite(book.id, member.id).await? {
        return Err(BookErrorCode::NotFavorite.into());
    }
    Ok(())
}

pub async fn favorites(state: &AppState, member: &Member) -> Result<Vec<Book>, AppError> {
    state.store.favorite_books(member.id).await
}

async fn find(state: &AppState, book_id: i64) -> Result<Book, AppError> {
    state
        .store
        .find_book(book_id)
        .await?
        .ok_or_else(|| BookErrorCode::BookNotFound.into())
}
