//! Shared validation helpers for inbound HTTP adapters.

use std::str::FromStr;

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::{Error, FactoryId, Role, Username};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    EmptyField,
    InvalidDate,
    InvalidFactoryId,
    InvalidUsername,
    InvalidRole,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::EmptyField => "empty_field",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidFactoryId => "invalid_factory_id",
            ErrorCode::InvalidUsername => "invalid_username",
            ErrorCode::InvalidRole => "invalid_role",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn require_non_empty(value: &str, field: FieldName) -> Result<(), Error> {
    if value.trim().is_empty() {
        let name = field.as_str();
        Err(
            Error::invalid_request(format!("{name} must not be empty")).with_details(json!({
                "field": name,
                "code": ErrorCode::EmptyField.as_str(),
            })),
        )
    } else {
        Ok(())
    }
}

/// Parse an ISO `YYYY-MM-DD` business date.
pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        let name = field.as_str();
        field_error(
            field,
            format!("{name} must be a YYYY-MM-DD date"),
            ErrorCode::InvalidDate,
            value,
        )
    })
}

pub(crate) fn parse_factory_id(value: &str, field: FieldName) -> Result<FactoryId, Error> {
    FactoryId::new(value).map_err(|err| {
        field_error(
            field,
            err.to_string(),
            ErrorCode::InvalidFactoryId,
            value,
        )
    })
}

pub(crate) fn parse_username(value: &str, field: FieldName) -> Result<Username, Error> {
    Username::new(value).map_err(|err| {
        field_error(field, err.to_string(), ErrorCode::InvalidUsername, value)
    })
}

pub(crate) fn parse_role(value: &str, field: FieldName) -> Result<Role, Error> {
    Role::from_str(value).map_err(|_| {
        let name = field.as_str();
        field_error(
            field,
            format!("{name} must be factory_employee or headquarters"),
            ErrorCode::InvalidRole,
            value,
        )
    })
}
