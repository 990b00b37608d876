//! Borrow and return HTTP handlers.
//!
//! ```text
//! POST /api/books/borrow {"member_id":"M001","book_id":"JK-45"}
//! POST /api/books/return {"member_id":"M001","book_id":"JK-45"}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{BorrowReceipt, LendingRequest, ReturnReceipt};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{BOOK_ID, MEMBER_ID, parse_book_code, parse_member_code};

/// `message` of a successful borrow.
pub const BORROWED_MESSAGE: &str = "Book borrowed successfully.";
/// `message` of an on-time return.
pub const RETURNED_MESSAGE: &str = "Book returned successfully.";
/// `message` of a late return.
pub const RETURNED_LATE_MESSAGE: &str =
    "Book returned late. The member is penalized and cannot borrow until the penalty ends.";

/// Body shared by the borrow and return endpoints. Both fields carry public
/// codes, not row ids.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct LendingRequestBody {
    /// Member code.
    #[schema(example = "M001")]
    pub member_id: Option<String>,
    /// Book code.
    #[schema(example = "JK-45")]
    pub book_id: Option<String>,
}

fn parse_lending_request(body: LendingRequestBody) -> ApiResult<LendingRequest> {
    let member_code = parse_member_code(body.member_id, MEMBER_ID)?;
    let book_code = parse_book_code(body.book_id, BOOK_ID)?;
    Ok(LendingRequest::new(member_code, book_code))
}

/// Body of a successful borrow.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BorrowResponse {
    /// Human-readable confirmation.
    #[schema(example = "Book borrowed successfully.")]
    pub message: String,
    /// UUID of the new loan.
    pub loan_id: String,
    /// Member code.
    pub member_id: String,
    /// Book code.
    pub book_id: String,
    /// RFC 3339 timestamp.
    pub borrowed_at: String,
    /// Copies still on the shelf.
    pub remaining_stock: u32,
}

impl From<BorrowReceipt> for BorrowResponse {
    fn from(receipt: BorrowReceipt) -> Self {
        Self {
            message: BORROWED_MESSAGE.to_owned(),
            loan_id: receipt.loan_id.to_string(),
            member_id: receipt.member_code.to_string(),
            book_id: receipt.book_code.to_string(),
            borrowed_at: receipt.borrowed_at.to_rfc3339(),
            remaining_stock: receipt.remaining_stock,
        }
    }
}

/// Body of a successful return.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReturnResponse {
    /// Confirmation, mentioning the penalty on a late return.
    pub message: String,
    /// UUID of the closed loan.
    pub loan_id: String,
    /// Member code.
    pub member_id: String,
    /// Book code.
    pub book_id: String,
    /// RFC 3339 timestamp.
    pub borrowed_at: String,
    /// RFC 3339 timestamp.
    pub returned_at: String,
    /// Whole days the loan was held.
    pub days_elapsed: i64,
    /// Whether the return was late.
    pub penalty_applied: bool,
    /// End of the penalty; null when none was applied or it is permanent.
    pub penalty_until: Option<String>,
    /// Copies on the shelf after the return.
    pub stock: u32,
}

impl From<ReturnReceipt> for ReturnResponse {
    fn from(receipt: ReturnReceipt) -> Self {
        let penalty_applied = receipt.penalty.is_some();
        Self {
            message: if penalty_applied {
                RETURNED_LATE_MESSAGE
            } else {
                RETURNED_MESSAGE
            }
            .to_owned(),
            loan_id: receipt.loan_id.to_string(),
            member_id: receipt.member_code.to_string(),
            book_id: receipt.book_code.to_string(),
            borrowed_at: receipt.borrowed_at.to_rfc3339(),
            returned_at: receipt.returned_at.to_rfc3339(),
            days_elapsed: receipt.days_elapsed,
            penalty_applied,
            penalty_until: receipt
                .penalty
                .and_then(|penalty| penalty.until())
                .map(|until| until.to_rfc3339()),
            stock: receipt.stock,
        }
    }
}

/// Borrow one copy of a book.
#[utoipa::path(
    post,
    path = "/api/books/borrow",
    request_body = LendingRequestBody,
    responses(
        (status = 200, description = "Loan opened", body = BorrowResponse),
        (status = 400, description = "Penalized, over the limit, unavailable or invalid", body = ErrorSchema),
        (status = 404, description = "Member not found", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["lending"],
    operation_id = "borrowBook"
)]
#[post("/books/borrow")]
pub async fn borrow_book(
    state: web::Data<HttpState>,
    payload: web::Json<LendingRequestBody>,
) -> ApiResult<web::Json<BorrowResponse>> {
    let request = parse_lending_request(payload.into_inner())?;
    let receipt = state.lending.borrow_book(request).await?;
    Ok(web::Json(BorrowResponse::from(receipt)))
}

/// Return a borrowed book, applying the late-return penalty when due.
#[utoipa::path(
    post,
    path = "/api/books/return",
    request_body = LendingRequestBody,
    responses(
        (status = 200, description = "Loan closed", body = ReturnResponse),
        (status = 400, description = "No active loan or invalid request", body = ErrorSchema),
        (status = 404, description = "Member or book not found", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["lending"],
    operation_id = "returnBook"
)]
#[post("/books/return")]
pub async fn return_book(
    state: web::Data<HttpState>,
    payload: web::Json<LendingRequestBody>,
) -> ApiResult<web::Json<ReturnResponse>> {
    let request = parse_lending_request(payload.into_inner())?;
    let receipt = state.lending.return_book(request).await?;
    Ok(web::Json(ReturnResponse::from(receipt)))
}

#[cfg(test)]
#[path = "lending_tests.rs"]
mod tests;
