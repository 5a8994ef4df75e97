use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::auth::session::authenticate;
use crate::error::AppError;
use crate::models::Member;
use crate::state::AppState;

/// The member behind the request's bearer token.
///
/// Taking `CurrentMember` as a handler argument makes the route require
/// authentication; extraction runs `authenticate` against the request headers and
/// rejects the request with the matching 401 envelope when it fails.
#[derive(Debug, Clone)]
pub struct CurrentMember(pub Member);

impl FromRequest for CurrentMember {
    type Error = ActixError; // AppError will be converted into ActixError via ResponseError
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let headers = req.headers().clone();

        Box::pin(async move {
            let state = state.ok_or_else(|| {
                AppError::InternalServerError("Application state is not configured".into())
            })?;
            let member = authenticate(&state, &headers).await?;
            Ok(CurrentMember(member))
        })
    }
}
