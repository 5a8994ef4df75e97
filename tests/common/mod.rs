#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App, Error};
use serde_json::{json, Value};

use bookclub::auth::TokenService;
use bookclub::routes;
use bookclub::state::AppState;
use bookclub::store::MemoryStore;

pub const PASSWORD: &str = "password123";

/// bcrypt's minimum work factor.
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_state() -> AppState {
    AppState::new(
        Arc::new(MemoryStore::new()),
        TokenService::new("integration-test-secret", 1),
        TEST_BCRYPT_COST,
    )
}

pub async fn test_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::config),
    )
    .await
}

/// Sends the request and returns the status with the decoded envelope.
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn join<S, B>(app: &S, username: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/members")
        .set_json(json!({
            "username": username,
            "password": PASSWORD,
            "email": format!("{}@example.com", username),
            "nickname": format!("{}-nick", username),
        }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "join failed: {}", body);
    body
}

pub async fn login<S, B>(app: &S, username: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/members/login")
        .set_json(json!({ "username": username, "password": PASSWORD }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["data"]["token"]
        .as_str()
        .expect("token in login response")
        .to_string()
}

/// Joins `username` and returns a bearer token for it.
pub async fn member_token<S, B>(app: &S, username: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    join(app, username).await;
    login(app, username).await
}

pub async fn register_book<S, B>(app: &S, token: &str, title: &str, isbn: Option<&str>) -> i64
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/books")
        .insert_header(bearer(token))
        .set_json(json!({
            "title": title,
            "author": "Ursula K. Le Guin",
            "isbn": isbn,
        }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "book registration failed: {}", body);
    body["data"]["id"].as_i64().expect("book id")
}
