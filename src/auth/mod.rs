pub mod extractors;
pub mod password;
pub mod session;
pub mod token;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::member::validate_birth;
use crate::models::{Gender, MemberProfile};

// Re-export necessary items
pub use extractors::CurrentMember;
pub use password::{hash_password, verify_password};
pub use session::{authenticate, bearer_token, join, login};
pub use token::{Claims, TokenService};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Represents the payload for a member login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a new member registration (`POST /members`).
#[derive(Debug, Deserialize, Validate)]
pub struct JoinRequest {
    /// Must be between 3 and 32 characters, alphanumeric, and can include underscores or hyphens.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    /// Must be at least 6 characters long.
    #[validate(length(min = 6, max = 100))]
    pub password: String,
    #[validate(email)]
    pub email: String,
    pub gender: Option<Gender>,
    #[validate(length(min = 1, max = 32))]
    pub nickname: String,
    #[validate(custom = "validate_birth")]
    pub birth: Option<NaiveDate>,
}

/// `data` of a successful login: the bearer token plus the member's profile.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub member: MemberProfile,
}
