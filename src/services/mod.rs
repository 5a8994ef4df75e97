//! Domain operations shared by the HTTP handlers.
//!
//! Each function takes the shared `AppState`, performs the domain checks and returns
//! `AppError` with the matching code on failure.

pub mod books;
pub mod follows;
pub mod members;
pub mod reviews;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use crate::auth::{join, JoinRequest, TokenService};
    use crate::models::{Book, BookInput, Member};
    use crate::state::AppState;
    use crate::store::{BookRepository, MemoryStore};

    pub fn state() -> AppState {
        AppState::new(
            Arc::new(MemoryStore::new()),
            TokenService::new("service-test-secret", 1),
            crate::auth::password::TEST_BCRYPT_COST,
        )
    }

    pub async fn member(state: &AppState, username: &str) -> Member {
        join(
            state,
            JoinRequest {
                username: username.to_string(),
                password: "password123".to_string(),
                email: format!("{}@example.com", username),
                gender: None,
                nickname: format!("{}-nick", username),
                birth: None,
            },
        )
        .await
        .unwrap()
    }

    pub async fn book(state: &AppState, title: &str) -> Book {
        state
            .store
            .create_book(BookInput {
                title: title.to_string(),
                author: "Ursula K. Le Guin".to_string(),
                isbn: None,
                description: None,
            })
            .await
            .unwrap()
            .unwrap()
    }
}
