use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

/// The uniform success envelope: `{ "data": ..., "message": ... }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenericResponse<T> {
    pub data: Option<T>,
    pub message: String,
}

impl<T: Serialize> GenericResponse<T> {
    pub fn of(data: T, message: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            message: message.into(),
        }
    }

    pub fn ok(self) -> HttpResponse {
        HttpResponse::Ok().json(self)
    }

    pub fn created(self) -> HttpResponse {
        HttpResponse::Created().json(self)
    }
}

impl GenericResponse<()> {
    /// An envelope carrying only a message; `data` serializes as `null`.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: message.into(),
        }
    }
}
