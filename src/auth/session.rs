//! Credential checks and identity resolution.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use validator::Validate;

use super::{hash_password, verify_password, JoinRequest, LoginRequest, LoginResponse};
use crate::error::{AppError, MemberErrorCode};
use crate::models::{Member, MemberProfile, NewMember};
use crate::state::AppState;
use crate::store::MemberRepository;

/// Registers a new member.
///
/// Fails with `DUPLICATE_USERNAME` if the username is taken, including when a
/// concurrent join wins the race between the lookup and the insert.
pub async fn join(state: &AppState, registration: JoinRequest) -> Result<Member, AppError> {
    registration.validate()?;

    if state
        .store
        .find_member_by_username(&registration.username)
        .await?
        .is_some()
    {
        return Err(MemberErrorCode::DuplicateUsername.into());
    }

    let password_hash = hash_password(&registration.password, state.bcrypt_cost)?;
    let member = state
        .store
        .create_member(NewMember {
            username: registration.username,
            password_hash,
            email: registration.email,
            gender: registration.gender,
            nickname: registration.nickname,
            birth: registration.birth,
        })
        .await?
        .ok_or_else(|| AppError::from(MemberErrorCode::DuplicateUsername))?;

    log::info!("member joined: {}", member.username);
    Ok(member)
}

/// Checks credentials and issues a bearer token.
pub async fn login(state: &AppState, credentials: LoginRequest) -> Result<LoginResponse, AppError> {
    credentials.validate()?;

    let member = state
        .store
        .find_member_by_username(&credentials.username)
        .await?
        .ok_or_else(|| AppError::from(MemberErrorCode::NonExistingId))?;

    if !verify_password(&credentials.password, &member.password_hash)? {
        log::debug!("incorrect password for {}", member.username);
        return Err(MemberErrorCode::IncorrectPassword.into());
    }

    let token = state.tokens.generate(&member.username)?;
    log::info!("member logged in: {}", member.username);
    Ok(LoginResponse {
        token,
        member: MemberProfile::from(&member),
    })
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolves the calling member from the request headers.
///
/// - no or malformed `Authorization` header: `UNAUTHORIZED`
/// - token fails verification: `INVALID_TOKEN`
/// - token names a member that no longer exists: `UNAUTHORIZED`
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Member, AppError> {
    let token = bearer_token(headers).ok_or_else(|| {
        log::debug!("request without bearer token");
        AppError::from(MemberErrorCode::Unauthorized)
    })?;

    let claims = state.tokens.verify(token)?;

    state
        .store
        .find_member_by_username(&claims.sub)
        .await?
        .ok_or_else(|| {
            log::debug!("token subject {} no longer exists", claims.sub);
            AppError::from(MemberErrorCode::Unauthorized)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenService;
    use crate::store::MemoryStore;
    use actix_web::http::header::HeaderValue;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::new(
            Arc::new(MemoryStore::new()),
            TokenService::new("session-test-secret", 1),
            crate::auth::password::TEST_BCRYPT_COST,
        )
    }

    fn registration(username: &str) -> JoinRequest {
        JoinRequest {
            username: username.to_string(),
            password: "password123".to_string(),
            email: format!("{}@example.com", username),
            gender: None,
            nickname: "Reader".to_string(),
            birth: None,
        }
    }

    fn credentials(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn code_of<T: std::fmt::Debug>(result: Result<T, AppError>) -> String {
        result.unwrap_err().code()
    }

    #[actix_rt::test]
    async fn test_join_stores_hashed_password() {
        let state = state();
        let member = join(&state, registration("reader")).await.unwrap();

        assert_ne!(member.password_hash, "password123");
        assert!(verify_password("password123", &member.password_hash).unwrap());
    }

    #[actix_rt::test]
    async fn test_join_rejects_duplicate_username() {
        let state = state();
        join(&state, registration("reader")).await.unwrap();
        assert_eq!(code_of(join(&state, registration("reader")).await), "400-1");
    }

    #[actix_rt::test]
    async fn test_login_failures() {
        let state = state();
        join(&state, registration("reader")).await.unwrap();

        assert_eq!(
            code_of(login(&state, credentials("reader", "wrong-password")).await),
            "400-2"
        );
        assert_eq!(
            code_of(login(&state, credentials("nobody", "password123")).await),
            "404-1"
        );
    }

    #[actix_rt::test]
    async fn test_login_token_authenticates() {
        let state = state();
        join(&state, registration("reader")).await.unwrap();

        let response = login(&state, credentials("reader", "password123")).await.unwrap();
        assert_eq!(response.member.username, "reader");

        let headers = headers_with(&format!("Bearer {}", response.token));
        let member = authenticate(&state, &headers).await.unwrap();
        assert_eq!(member.username, "reader");
    }

    #[actix_rt::test]
    async fn test_authenticate_failures() {
        let state = state();
        join(&state, registration("reader")).await.unwrap();

        assert_eq!(code_of(authenticate(&state, &HeaderMap::new()).await), "401-1");
        assert_eq!(
            code_of(authenticate(&state, &headers_with("Basic abc")).await),
            "401-1"
        );
        assert_eq!(
            code_of(authenticate(&state, &headers_with("Bearer garbage")).await),
            "401-2"
        );

        // Valid signature, but the member is gone.
        let token = state.tokens.generate("ghost").unwrap();
        assert_eq!(
            code_of(authenticate(&state, &headers_with(&format!("Bearer {}", token))).await),
            "401-1"
        );
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(bearer_token(&headers_with("bearer abc")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
