//!
//! # Error Handling
//!
//! This module defines `AppError`, the single error type returned by every service
//! and handler, together with the per-domain error code enums (`MemberErrorCode`,
//! `FollowErrorCode`, `BookErrorCode`, `ReviewErrorCode`).
//!
//! Each domain code is an `(HTTP status, code, message)` triple exposed through the
//! `ErrorCode` trait. `AppError` implements `actix_web::error::ResponseError`, so a
//! failing handler is rendered as the uniform error envelope:
//!
//! ```json
//! { "code": "400-3", "data": null, "message": "You cannot follow yourself." }
//! ```
//!
//! `From` conversions for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error`, `bcrypt::BcryptError` and the code enums let `?`
//! do the translation.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// A domain failure with a fixed HTTP status, a stable code and a human readable message.
pub trait ErrorCode {
    fn status(&self) -> StatusCode;
    fn code(&self) -> &'static str;
    fn message(&self) -> &'static str;
}

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failed or is missing (HTTP 401).
    Unauthorized(String),
    /// Malformed request, e.g. an unparsable JSON body or path segment (HTTP 400).
    BadRequest(String),
    /// The requested resource does not exist (HTTP 404).
    NotFound(String),
    /// Unexpected server-side failure (HTTP 500).
    InternalServerError(String),
    /// Failure reported by the database driver (HTTP 500).
    DatabaseError(String),
    /// DTO validation failed (HTTP 422).
    ValidationError(String),
    /// A failure described by one of the domain error code enums.
    Domain {
        status: StatusCode,
        code: &'static str,
        message: &'static str,
    },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Domain { status, .. } => *status,
        }
    }

    /// The code placed in the error envelope. Generic variants use the bare status number.
    pub fn code(&self) -> String {
        match self {
            AppError::Domain { code, .. } => (*code).to_string(),
            other => other.status().as_u16().to_string(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::InternalServerError(msg)
            | AppError::ValidationError(msg) => msg.clone(),
            // Driver details stay in the logs.
            AppError::DatabaseError(_) => "Database error".to_string(),
            AppError::Domain { message, .. } => (*message).to_string(),
        }
    }

    fn from_code(code: impl ErrorCode) -> Self {
        AppError::Domain {
            status: code.status(),
            code: code.code(),
            message: code.message(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Domain { code, message, .. } => write!(f, "{} ({})", message, code),
        }
    }
}

/// Renders every `AppError` as the error envelope with the matching status code.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::warn!("{}", self);
        }

        HttpResponse::build(status).json(json!({
            "code": self.code(),
            "data": null,
            "message": self.message(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::DatabaseError(error.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Any failure to verify a bearer token surfaces as `INVALID_TOKEN`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        log::debug!("token rejected: {}", error);
        MemberErrorCode::InvalidToken.into()
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

/// Member and authentication failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberErrorCode {
    NonExistingId,
    DuplicateUsername,
    IncorrectPassword,
    Unauthorized,
    InvalidToken,
    IncorrectAuthorized,
}

impl ErrorCode for MemberErrorCode {
    fn status(&self) -> StatusCode {
        match self {
            MemberErrorCode::NonExistingId => StatusCode::NOT_FOUND,
            MemberErrorCode::DuplicateUsername | MemberErrorCode::IncorrectPassword => {
                StatusCode::BAD_REQUEST
            }
            MemberErrorCode::Unauthorized
            | MemberErrorCode::InvalidToken
            | MemberErrorCode::IncorrectAuthorized => StatusCode::UNAUTHORIZED,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            MemberErrorCode::NonExistingId => "404-1",
            MemberErrorCode::DuplicateUsername => "400-1",
            MemberErrorCode::IncorrectPassword => "400-2",
            MemberErrorCode::Unauthorized => "401-1",
            MemberErrorCode::InvalidToken => "401-2",
            MemberErrorCode::IncorrectAuthorized => "401-3",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            MemberErrorCode::NonExistingId => "Member does not exist.",
            MemberErrorCode::DuplicateUsername => "Username is already taken.",
            MemberErrorCode::IncorrectPassword => "Password is incorrect.",
            MemberErrorCode::Unauthorized => "Authentication is required.",
            MemberErrorCode::InvalidToken => "Token is invalid or expired.",
            MemberErrorCode::IncorrectAuthorized => "Authorization check failed.",
        }
    }
}

/// Follow relation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowErrorCode {
    NotFoundMember,
    NotFollowing,
    AlreadyFollowing,
    CanNotFollowMyself,
}

impl ErrorCode for FollowErrorCode {
    fn status(&self) -> StatusCode {
        match self {
            FollowErrorCode::NotFoundMember => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            FollowErrorCode::NotFoundMember => "404-1",
            FollowErrorCode::NotFollowing => "400-1",
            FollowErrorCode::AlreadyFollowing => "400-2",
            FollowErrorCode::CanNotFollowMyself => "400-3",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            FollowErrorCode::NotFoundMember => "Member does not exist.",
            FollowErrorCode::NotFollowing => "You are not following this member.",
            FollowErrorCode::AlreadyFollowing => "You are already following this member.",
            FollowErrorCode::CanNotFollowMyself => "You cannot follow yourself.",
        }
    }
}

/// Book and favorite failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookErrorCode {
    BookNotFound,
    DuplicateIsbn,
    AlreadyFavorite,
    NotFavorite,
}

impl ErrorCode for BookErrorCode {
    fn status(&self) -> StatusCode {
        match self {
            BookErrorCode::BookNotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            BookErrorCode::BookNotFound => "404-1",
            BookErrorCode::DuplicateIsbn => "400-1",
            BookErrorCode::AlreadyFavorite => "400-2",
            BookErrorCode::NotFavorite => "400-3",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            BookErrorCode::BookNotFound => "Book does not exist.",
            BookErrorCode::DuplicateIsbn => "A book with this ISBN already exists.",
            BookErrorCode::AlreadyFavorite => "Book is already in your favorites.",
            BookErrorCode::NotFavorite => "Book is not in your favorites.",
        }
    }
}

/// Review and review comment failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewErrorCode {
    ReviewNotFound,
    CommentNotFound,
    BookNotFound,
    AlreadyReviewed,
    NotAuthor,
}

impl ErrorCode for ReviewErrorCode {
    fn status(&self) -> StatusCode {
        match self {
            ReviewErrorCode::ReviewNotFound
            | ReviewErrorCode::CommentNotFound
            | ReviewErrorCode::BookNotFound => StatusCode::NOT_FOUND,
            ReviewErrorCode::AlreadyReviewed => StatusCode::BAD_REQUEST,
            ReviewErrorCode::NotAuthor => StatusCode::FORBIDDEN,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ReviewErrorCode::ReviewNotFound => "404-1",
            ReviewErrorCode::CommentNotFound => "404-2",
            ReviewErrorCode::BookNotFound => "404-3",
            ReviewErrorCode::AlreadyReviewed => "400-1",
            ReviewErrorCode::NotAuthor => "403-1",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ReviewErrorCode::ReviewNotFound => "Review does not exist.",
            ReviewErrorCode::CommentNotFound => "Comment does not exist.",
            ReviewErrorCode::BookNotFound => "Book does not exist.",
            ReviewErrorCode::AlreadyReviewed => "You have already reviewed this book.",
            ReviewErrorCode::NotAuthor => "Only the author can change this.",
        }
    }
}

impl From<MemberErrorCode> for AppError {
    fn from(code: MemberErrorCode) -> AppError {
        AppError::from_code(code)
    }
}

impl From<FollowErrorCode> for AppError {
    fn from(code: FollowErrorCode) -> AppError {
        AppError::from_code(code)
    }
}

impl From<BookErrorCode> for AppError {
    fn from(code: BookErrorCode) -> AppError {
        AppError::from_code(code)
    }
}

impl From<ReviewErrorCode> for AppError {
    fn from(code: ReviewErrorCode) -> AppError {
        AppError::from_code(code)
    }
}
