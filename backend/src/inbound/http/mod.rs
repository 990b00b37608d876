//! HTTP inbound adapter exposing the lending REST endpoints.

pub mod error;
pub mod health;
pub mod lending;
pub mod library;
pub mod schemas;
pub mod state;
mod validation;

use actix_web::{Scope, web};

pub use error::ApiResult;

/// The `/api` scope with every lending and listing route registered and JSON
/// body errors mapped to the error envelope.
///
/// Callers still provide `web::Data<HttpState>` on the enclosing `App`.
#[must_use]
pub fn api_scope() -> Scope {
    web::scope("/api")
        .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .service(lending::borrow_book)
        .service(lending::return_book)
        .service(library::list_books)
        .service(library::list_members)
}
