//! Tests for the borrow and return handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::LendingError;
use crate::domain::ports::{LendingStoreError, MockLendingCommand, MockLibraryQuery};
use crate::inbound::http::error::json_error_handler;
use crate::test_support::MutableClock;
use crate::test_support::library::demo_http_state;

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(web::scope("/api").service(borrow_book).service(return_book))
}

fn state_with_command(command: MockLendingCommand) -> HttpState {
    HttpState::new(Arc::new(command), Arc::new(MockLibraryQuery::new()))
}

#[fixture]
fn clock() -> Arc<MutableClock> {
    Arc::new(MutableClock::at_library_opening())
}

async fn post(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    uri: &str,
    body: Value,
) -> (StatusCode, Value) {
    let req = actix_test::TestRequest::post()
        .uri(uri)
        .set_json(body)
        .to_request();
    let res = actix_test::call_service(app, req).await;
    let status = res.status();
    let body: Value = actix_test::read_body_json(res).await;
    (status, body)
}

fn lending_body(member: &str, book: &str) -> Value {
    json!({"member_id": member, "book_id": book})
}

#[rstest]
#[actix_web::test]
async fn borrowing_the_last_copy_returns_a_receipt(clock: Arc<MutableClock>) {
    let app = actix_test::init_service(test_app(demo_http_state(clock))).await;

    let (status, body) = post(&app, "/api/books/borrow", lending_body("M001", "JK-45")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], BORROWED_MESSAGE);
    assert_eq!(body["member_id"], "M001");
    assert_eq!(body["book_id"], "JK-45");
    assert_eq!(body["remaining_stock"], 0);
    assert_eq!(body["borrowed_at"], "2025-01-06T09:00:00+00:00");
    assert!(
        body["loan_id"]
            .as_str()
            .is_some_and(|id| uuid::Uuid::parse_str(id).is_ok())
    );
}

#[rstest]
#[actix_web::test]
async fn borrowing_an_exhausted_book_is_a_bad_request(clock: Arc<MutableClock>) {
    let app = actix_test::init_service(test_app(demo_http_state(clock))).await;
    post(&app, "/api/books/borrow", lending_body("M001", "JK-45")).await;

    let (status, body) = post(&app, "/api/books/borrow", lending_body("M002", "JK-45")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["message"], "Book is not available.");
    assert_eq!(body["details"]["reason"], "book_unavailable");
    assert_eq!(body["details"]["book_id"], "JK-45");
}

#[rstest]
#[actix_web::test]
async fn a_third_loan_exceeds_the_limit(clock: Arc<MutableClock>) {
    let app = actix_test::init_service(test_app(demo_http_state(clock))).await;
    post(&app, "/api/books/borrow", lending_body("M001", "SHR-1")).await;
    post(&app, "/api/books/borrow", lending_body("M001", "TOL-3")).await;

    let (status, body) = post(&app, "/api/books/borrow", lending_body("M001", "JK-45")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["reason"], "borrow_limit_exceeded");
    assert_eq!(body["details"]["limit"], 2);
}

#[rstest]
#[actix_web::test]
async fn unknown_members_are_not_found(clock: Arc<MutableClock>) {
    let app = actix_test::init_service(test_app(demo_http_state(clock))).await;

    let (status, body) = post(&app, "/api/books/borrow", lending_body("M404", "JK-45")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["details"]["reason"], "member_not_found");
}

#[rstest]
#[actix_web::test]
async fn late_returns_report_the_penalty(clock: Arc<MutableClock>) {
    let app = actix_test::init_service(test_app(demo_http_state(clock.clone()))).await;
    post(&app, "/api/books/borrow", lending_body("M001", "JK-45")).await;
    clock.advance_days(8);

    let (status, body) = post(&app, "/api/books/return", lending_body("M001", "JK-45")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], RETURNED_LATE_MESSAGE);
    assert_eq!(body["days_elapsed"], 8);
    assert_eq!(body["penalty_applied"], true);
    assert_eq!(body["penalty_until"], "2025-01-17T09:00:00+00:00");
    assert_eq!(body["stock"], 1);

    let (status, body) = post(&app, "/api/books/borrow", lending_body("M001", "SHR-1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["reason"], "member_penalized");
}

#[rstest]
#[actix_web::test]
async fn on_time_returns_apply_no_penalty(clock: Arc<MutableClock>) {
    let app = actix_test::init_service(test_app(demo_http_state(clock.clone()))).await;
    post(&app, "/api/books/borrow", lending_body("M002", "TOL-3")).await;
    clock.advance_days(7);

    let (status, body) = post(&app, "/api/books/return", lending_body("M002", "TOL-3")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], RETURNED_MESSAGE);
    assert_eq!(body["penalty_applied"], false);
    assert_eq!(body["penalty_until"], Value::Null);
    assert_eq!(body["stock"], 3);
}

#[rstest]
#[actix_web::test]
async fn returning_without_a_loan_is_a_bad_request(clock: Arc<MutableClock>) {
    let app = actix_test::init_service(test_app(demo_http_state(clock))).await;

    let (status, body) = post(&app, "/api/books/return", lending_body("M001", "JK-45")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["reason"], "loan_not_found");
}

#[rstest]
#[case::missing_member(json!({"book_id": "JK-45"}), "member_id", "missing_field")]
#[case::missing_book(json!({"member_id": "M001"}), "book_id", "missing_field")]
#[case::bad_member(json!({"member_id": "M 001", "book_id": "JK-45"}), "member_id", "invalid_code")]
#[actix_web::test]
async fn invalid_bodies_never_reach_the_service(
    #[case] body: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = actix_test::init_service(test_app(state_with_command(MockLendingCommand::new()))).await;

    let (status, body) = post(&app, "/api/books/borrow", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], field);
    assert_eq!(body["details"]["code"], code);
}

#[rstest]
#[actix_web::test]
async fn malformed_json_is_rejected_with_the_envelope() {
    let app = actix_test::init_service(test_app(state_with_command(MockLendingCommand::new()))).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/books/return")
        .insert_header(("content-type", "application/json"))
        .set_payload("[1, 2")
        .to_request();

    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["reason"], "malformed_body");
}

#[rstest]
#[actix_web::test]
async fn lost_store_connections_are_service_unavailable() {
    let mut command = MockLendingCommand::new();
    command.expect_borrow_book().times(1).returning(|_| {
        Err(LendingError::Store(LendingStoreError::connection(
            "connection refused",
        )))
    });
    let app = actix_test::init_service(test_app(state_with_command(command))).await;

    let (status, body) = post(&app, "/api/books/borrow", lending_body("M001", "JK-45")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "service_unavailable");
    assert_eq!(body["message"], "Lending store is unavailable.");
    assert!(!body.to_string().contains("connection refused"));
}

#[rstest]
#[actix_web::test]
async fn query_failures_are_redacted() {
    let mut command = MockLendingCommand::new();
    command.expect_return_book().times(1).returning(|_| {
        Err(LendingError::Store(LendingStoreError::query(
            "relation \"loans\" does not exist",
        )))
    });
    let app = actix_test::init_service(test_app(state_with_command(command))).await;

    let (status, body) = post(&app, "/api/books/return", lending_body("M001", "JK-45")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "internal_error");
    assert_eq!(body["message"], "Internal server error");
    assert!(body.get("details").is_none());
}
