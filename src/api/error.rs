use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::models::ValidationError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const NOT_NULL_VIOLATION: &str = "23502";
const CHECK_VIOLATION: &str = "23514";
const STRING_TOO_LONG: &str = "22001";
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

/// Errors returned by the REST handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(ValidationError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Internal server error")]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Constraint violations are client errors; anything else from the database is ours
fn from_database_error(err: &sqlx::Error) -> Option<ApiError> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };

    client_error_message(db_err.code().as_deref(), db_err.constraint()).map(ApiError::BadRequest)
}

/// Message for a PostgreSQL error that was caused by the request's data
fn client_error_message(code: Option<&str>, constraint: Option<&str>) -> Option<String> {
    let message = match code? {
        UNIQUE_VIOLATION => match constraint {
            Some("enrollments_student_group_unique") => "The student is already enrolled in this group",
            _ => "A record with these values already exists",
        },
        FOREIGN_KEY_VIOLATION => "A referenced record does not exist",
        NOT_NULL_VIOLATION => "A required value is missing",
        CHECK_VIOLATION => match constraint {
            Some("users_role_exclusive") => "The user's role does not match its linked profile",
            _ => "A value is out of the allowed range",
        },
        STRING_TOO_LONG => "A value is longer than the field allows",
        INVALID_TEXT_REPRESENTATION => "A value has an invalid format",
        _ => return None,
    };

    Some(message.to_string())
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(validation) = err.downcast_ref::<ValidationError>() {
            return ApiError::Validation(validation.clone());
        }

        if let Some(api_error) = err.downcast_ref::<sqlx::Error>().and_then(from_database_error) {
            return api_error;
        }

        ApiError::Internal(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err.status() {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(err.to_string()),
            StatusCode::FORBIDDEN => ApiError::Forbidden(err.to_string()),
            _ => ApiError::Internal(err.into()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// A key that cannot be parsed can never match a record
impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        ApiError::NotFound("Record")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            ApiError::Validation(err) => json!({
                "error": "Validation failed",
                "field": err.field,
                "message": err.message,
            }),
            ApiError::Internal(err) => {
                tracing::error!("Request failed: {:#}", err);
                json!({
                    "error": "Internal server error",
                    "message": "An unexpected error occurred",
                })
            }
            other => json!({
                "error": status.canonical_reason().unwrap_or("Error"),
                "message": other.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validation_error_is_found_in_chain() {
        let err = anyhow::Error::new(ValidationError::new("name", "This field may not be blank"))
            .context("creating country");
        let api_error = ApiError::from(err);

        assert_eq!(api_error.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(api_error, ApiError::Validation(ref v) if v.field == "name"));
    }

    #[test]
    fn test_unexpected_errors_are_internal() {
        let api_error = ApiError::from(anyhow::anyhow!("connection reset"));
        assert_eq!(api_error.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let api_error = ApiError::from(anyhow::Error::new(sqlx::Error::RowNotFound));
        assert_eq!(api_error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_auth_errors_keep_their_status() {
        assert_eq!(
            ApiError::from(AuthError::MissingCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::InsufficientPermissions).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_bad_data_from_the_database_is_a_client_error() {
        assert_eq!(
            client_error_message(Some("23505"), Some("enrollments_student_group_unique")).as_deref(),
            Some("The student is already enrolled in this group")
        );
        assert_eq!(
            client_error_message(Some("23514"), Some("users_role_exclusive")).as_deref(),
            Some("The user's role does not match its linked profile")
        );
        assert!(client_error_message(Some("22001"), None).is_some());
        assert!(client_error_message(Some("22P02"), None).is_some());
        assert!(client_error_message(Some("23503"), Some("employees_contract_type_fkey")).is_some());

        assert_eq!(client_error_message(Some("40001"), None), None);
        assert_eq!(client_error_message(None, None), None);
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(ApiError::NotFound("Country").to_string(), "Country not found");
    }
}
