#![doc = "The `bookclub` library crate."]
#![doc = ""]
#![doc = "Members, books, favorites, follows and reviews behind a JSON/JWT HTTP API."]
#![doc = "The binary (`main.rs`) builds the store, wraps it in `AppState` and mounts"]
#![doc = "`routes::config` on an actix-web server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
