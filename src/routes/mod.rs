pub mod books;
pub mod follows;
pub mod health;
pub mod members;
pub mod reviews;

use actix_web::{web, HttpRequest};

use crate::error::AppError;

/// Registers every scope of the API on the given service config.
///
/// Literal segments (`/mine`, `/favorites`, `/followers`) are registered ahead of
/// the parameterised routes that would otherwise shadow them.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .service(health::health)
        .service(
            web::scope("/members")
                .service(members::join)
                .service(members::login)
                .service(members::mine)
                .service(members::modify)
                .service(members::withdraw),
        )
        .service(
            web::scope("/books")
                .service(books::register)
                .service(books::search)
                .service(books::favorites)
                .service(books::detail)
                .service(books::favorite)
                .service(books::unfavorite)
                .service(reviews::write)
                .service(reviews::for_book),
        )
        .service(
            web::scope("/reviews")
                .service(reviews::edit)
                .service(reviews::remove)
                .service(reviews::comment)
                .service(reviews::comments)
                .service(reviews::remove_comment),
        )
        .service(
            web::scope("/follows")
                .service(follows::followers)
                .service(follows::followings)
                .service(follows::follow)
                .service(follows::unfollow),
        );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req: &HttpRequest| AppError::BadRequest(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req: &HttpRequest| AppError::BadRequest(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req: &HttpRequest| AppError::BadRequest(err.to_string()).into())
}
