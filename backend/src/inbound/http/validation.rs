//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{BookCode, CodeValidationError, Error, MemberCode};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValidationCode {
    MissingField,
    InvalidCode,
}

impl ValidationCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidCode => "invalid_code",
        }
    }
}

/// Name of a request body field, as clients spell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    const fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) const MEMBER_ID: FieldName = FieldName::new("member_id");
pub(crate) const BOOK_ID: FieldName = FieldName::new("book_id");

fn validation_error(field: FieldName, code: ValidationCode, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({
        "reason": "validation_error",
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    validation_error(
        field,
        ValidationCode::MissingField,
        format!("missing required field: {name}"),
    )
}

pub(crate) fn invalid_code_error(field: FieldName, err: &CodeValidationError) -> Error {
    let name = field.as_str();
    validation_error(field, ValidationCode::InvalidCode, format!("{name}: {err}"))
}

fn parse_code<T>(
    value: Option<String>,
    field: FieldName,
    parse: impl FnOnce(&str) -> Result<T, CodeValidationError>,
) -> Result<T, Error> {
    let raw = value.ok_or_else(|| missing_field_error(field))?;
    if raw.trim().is_empty() {
        return Err(missing_field_error(field));
    }
    parse(&raw).map_err(|err| invalid_code_error(field, &err))
}

pub(crate) fn parse_member_code(value: Option<String>, field: FieldName) -> Result<MemberCode, Error> {
    parse_code(value, field, |raw| MemberCode::new(raw))
}

pub(crate) fn parse_book_code(value: Option<String>, field: FieldName) -> Result<BookCode, Error> {
    parse_code(value, field, |raw| BookCode::new(raw))
}
