use actix_web::{delete, get, post, web, Responder};

use crate::{
    auth::CurrentMember, error::AppError, response::GenericResponse, services::follows,
    state::AppState,
};

/// Lists the members following the caller.
///
/// ## Responses:
/// - `200 OK`: an array of `{username, nickname}` in follow order.
/// - `401 Unauthorized`: missing or invalid bearer token.
#[get("/followers")]
pub async fn followers(
    CurrentMember(member): CurrentMember,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let members = follows::followers(&state, &member).await?;
    Ok(GenericResponse::of(members, "Followers").ok())
}

/// Lists the members the caller follows.
///
/// ## Responses:
/// - `200 OK`: an array of `{username, nickname}` in follow order.
/// - `401 Unauthorized`: missing or invalid bearer token.
#[get("/followings")]
pub async fn followings(
    CurrentMember(member): CurrentMember,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let members = follows::followings(&state, &member).await?;
    Ok(GenericResponse::of(members, "Followings").ok())
}

/// Follows the member named in the path.
///
/// ## Responses:
/// - `201 Created`: the edge was created.
/// - `404 Not Found` (`404-1`): no such member.
/// - `400 Bad Request`: `400-2` when already following, `400-3` when following oneself.
#[post("/{username}")]
pub async fn follow(
    CurrentMember(member): CurrentMember,
    state: web::Data<AppState>,
    username: web::Path<String>,
) -> Result<impl Responder, AppError> {
    follows::follow(&state, &member, &username).await?;
    Ok(GenericResponse::message(format!("Now following {}", username)).created())
}

/// Stops following the member named in the path.
///
/// ## Responses:
/// - `200 OK`: the edge was removed.
/// - `404 Not Found` (`404-1`): no such member.
/// - `400 Bad Request` (`400-1`): the caller was not following them.
#[delete("/{username}")]
pub async fn unfollow(
    CurrentMember(member): CurrentMember,
    state: web::Data<AppState>,
    username: web::Path<String>,
) -> Result<impl Responder, AppError> {
    follows::unfollow(&state, &member, &username).await?;
    Ok(GenericResponse::message(format!("Unfollowed {}", username)).ok())
}
