use actix_web::{delete, get, post, put, web, Responder};

use crate::{
    auth::{self, CurrentMember, JoinRequest, LoginRequest},
    error::AppError,
    models::{MemberProfile, ModifyRequest, PasswordRequest},
    response::GenericResponse,
    services::members,
    state::AppState,
};

/// Join
///
/// Creates a member account. Responds `201 Created` with the new profile.
#[post("")]
pub async fn join(
    state: web::Data<AppState>,
    registration: web::Json<JoinRequest>,
) -> Result<impl Responder, AppError> {
    let member = auth::join(&state, registration.into_inner()).await?;
    Ok(GenericResponse::of(MemberProfile::from(&member), "Member joined").created())
}

/// Login
///
/// Checks the credentials and returns a bearer token with the member profile.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    credentials: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let session = auth::login(&state, credentials.into_inner()).await?;
    Ok(GenericResponse::of(session, "Logged in").ok())
}

/// The caller's own profile. Never includes the password hash.
#[get("/mine")]
pub async fn mine(CurrentMember(member): CurrentMember) -> Result<impl Responder, AppError> {
    Ok(GenericResponse::of(MemberProfile::from(&member), "Member profile").ok())
}

/// Partially updates the caller's profile. Omitted fields are left unchanged.
#[put("/mine")]
pub async fn modify(
    CurrentMember(member): CurrentMember,
    state: web::Data<AppState>,
    changes: web::Json<ModifyRequest>,
) -> Result<impl Responder, AppError> {
    let updated = members::modify(&state, &member, changes.into_inner()).await?;
    Ok(GenericResponse::of(MemberProfile::from(&updated), "Member updated").ok())
}

/// Deletes the caller's account together with everything it owns.
///
/// The body must repeat the current password.
#[delete("/mine")]
pub async fn withdraw(
    CurrentMember(member): CurrentMember,
    state: web::Data<AppState>,
    confirmation: web::Json<PasswordRequest>,
) -> Result<impl Responder, AppError> {
    members::withdraw(&state, &member, confirmation.into_inner()).await?;
    Ok(GenericResponse::message("Member deleted").ok())
}
