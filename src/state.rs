use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::Config;
use crate::store::{Store, StoreState};

/// Shared by every worker through `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub store: StoreState,
    pub tokens: TokenService,
    /// bcrypt work factor for new password hashes.
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService, bcrypt_cost: u32) -> Self {
        Self {
            store,
            tokens,
            bcrypt_cost,
        }
    }

    pub fn from_config(config: &Config, store: Arc<dyn Store>) -> Self {
        Self::new(
            store,
            TokenService::new(&config.jwt_secret, config.jwt_expiration_hours),
            config.bcrypt_cost,
        )
    }
}
