//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every lending, listing and health path plus the
//! error envelope schemas from `inbound::http::schemas`. Swagger UI serves it
//! in debug builds and `cargo run --bin openapi-dump` prints it.

use crate::inbound::http::lending::{
    BorrowResponse, LendingRequestBody, ReturnResponse,
};
use crate::inbound::http::library::{BookResponse, MemberResponse};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library lending API",
        description = "Borrow and return books under a per-member loan limit and late-return penalty."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::lending::borrow_book,
        crate::inbound::http::lending::return_book,
        crate::inbound::http::library::list_books,
        crate::inbound::http::library::list_members,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        LendingRequestBody,
        BorrowResponse,
        ReturnResponse,
        BookResponse,
        MemberResponse,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "lending", description = "Borrowing and returning books"),
        (name = "library", description = "Catalogue and membership listings"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_has_envelope_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        for field in ["code", "message", "traceId", "details"] {
            assert_object_schema_has_field(error_schema, field);
        }
    }

    #[test]
    fn lending_request_uses_snake_case_ids() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let body = schemas.get("LendingRequestBody").expect("request schema");

        assert_object_schema_has_field(body, "member_id");
        assert_object_schema_has_field(body, "book_id");
    }

    #[rstest]
    #[case("/api/books/borrow")]
    #[case("/api/books/return")]
    #[case("/api/books")]
    #[case("/api/members")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn every_route_is_documented(#[case] path: &str) {
        assert!(ApiDoc::openapi().paths.paths.contains_key(path));
    }
}
