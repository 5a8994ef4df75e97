use validator::Validate;

use crate::auth::{hash_password, verify_password};
use crate::error::{AppError, MemberErrorCode};
use crate::models::{Member, MemberChanges, ModifyRequest, PasswordRequest};
use crate::state::AppState;
use crate::store::MemberRepository;

/// Applies a partial profile update in one transaction. A new password is re-hashed.
pub async fn modify(
    state: &AppState,
    member: &Member,
    request: ModifyRequest,
) -> Result<Member, AppError> {
    request.validate()?;

    let password_hash = match request.password.as_deref() {
        Some(password) => Some(hash_password(password, state.bcrypt_cost)?),
        None => None,
    };

    let changes = MemberChanges {
        password_hash,
        email: request.email,
        gender: request.gender,
        nickname: request.nickname,
        birth: request.birth,
    };

    state
        .store
        .update_member(&member.username, changes)
        .await?
        .ok_or_else(|| MemberErrorCode::Unauthorized.into())
}

/// Deletes the account after re-checking the password.
///
/// A wrong password fails with `INCORRECT_AUTHORIZED` and leaves the record untouched.
pub async fn withdraw(
    state: &AppState,
    member: &Member,
    request: PasswordRequest,
) -> Result<(), AppError> {
    request.validate()?;

    if !verify_password(&request.password, &member.password_hash)? {
        return Err(MemberErrorCode::IncorrectAuthorized.into());
    }

    if !state.store.delete_member(&member.username).await? {
        return Err(MemberErrorCode::Unauthorized.into());
    }

    log::info!("member withdrew: {}", member.username);
    Ok(())
}
