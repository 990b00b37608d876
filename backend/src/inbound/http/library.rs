//! Read-only catalogue and membership listings.
//!
//! ```text
//! GET /api/books
//! GET /api/members
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{BookAvailability, MemberStanding};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// One entry of `GET /api/books`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    /// Book code.
    #[schema(example = "JK-45")]
    pub code: String,
    /// Display title.
    #[schema(example = "Harry Potter")]
    pub title: String,
    /// Copies on the shelf right now.
    pub available_stock: u32,
}

impl From<BookAvailability> for BookResponse {
    fn from(book: BookAvailability) -> Self {
        Self {
            code: book.code.to_string(),
            title: book.title,
            available_stock: book.available_stock,
        }
    }
}

/// One entry of `GET /api/members`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MemberResponse {
    /// Member code.
    #[schema(example = "M001")]
    pub code: String,
    /// Stored penalty flag. An expired penalty stays set until the next late
    /// return overwrites it.
    pub is_penalized: bool,
    /// RFC 3339 end of an expiring penalty.
    pub penalty_until: Option<String>,
    /// Active loans held by the member.
    pub borrowings_count: u32,
}

impl From<MemberStanding> for MemberResponse {
    fn from(member: MemberStanding) -> Self {
        Self {
            code: member.code.to_string(),
            is_penalized: member.penalty.is_penalized(),
            penalty_until: member.penalty.until().map(|until| until.to_rfc3339()),
            borrowings_count: member.active_loan_count,
        }
    }
}

/// List every book with its available stock.
#[utoipa::path(
    get,
    path = "/api/books",
    responses(
        (status = 200, description = "Books ordered by code", body = [BookResponse]),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["library"],
    operation_id = "listBooks"
)]
#[get("/books")]
pub async fn list_books(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<BookResponse>>> {
    let books = state.library.list_books().await?;
    Ok(web::Json(books.into_iter().map(BookResponse::from).collect()))
}

/// List every member with their loan count and penalty.
#[utoipa::path(
    get,
    path = "/api/members",
    responses(
        (status = 200, description = "Members ordered by code", body = [MemberResponse]),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["library"],
    operation_id = "listMembers"
)]
#[get("/members")]
pub async fn list_members(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<MemberResponse>>> {
    let members = state.library.list_members().await?;
    Ok(web::Json(
        members.into_iter().map(MemberResponse::from).collect(),
    ))
}
