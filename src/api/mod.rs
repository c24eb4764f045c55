// API routes and handlers

pub mod academics;
pub mod accounts;
pub mod error;
pub mod fitness;
pub mod forms;
pub mod health;
pub mod human_resources;
pub mod locations;
pub mod pages;
pub mod render;
pub mod routes;

use axum::{extract::Path, http::StatusCode, Json};
use axum_extra::extract::WithRejection;

use error::ApiError;

/// JSON request body whose rejections surface as 400 responses
pub type JsonBody<T> = WithRejection<Json<T>, ApiError>;

/// Numeric path key; anything unparsable is a missing record
pub type KeyPath<T> = WithRejection<Path<T>, ApiError>;

pub(crate) fn deleted(found: bool, kind: &'static str) -> Result<StatusCode, ApiError> {
    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(kind))
    }
}
