use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use axum_extra::extract::WithRejection;

use super::error::ApiError;
use super::{deleted, JsonBody};
use crate::models::{ContractType, EmployeeType, LookupRequest};
use crate::services::HumanResourcesService;

/// Contract type and employee type lookup routes
pub fn human_resources_routes(service: HumanResourcesService) -> Router {
    Router::new()
        .route("/contract-types", get(list_contract_types).post(create_contract_type))
        .route(
            "/contract-types/:name",
            get(get_contract_type)
                .put(update_contract_type)
                .delete(delete_contract_type),
        )
        .route("/employee-types", get(list_employee_types).post(create_employee_type))
        .route(
            "/employee-types/:name",
            get(get_employee_type)
                .put(update_employee_type)
                .delete(delete_employee_type),
        )
        .with_state(service)
}

#[tracing::instrument(skip(service))]
async fn list_contract_types(
    State(service): State<HumanResourcesService>,
) -> Result<Json<Vec<ContractType>>, ApiError> {
    Ok(Json(service.list_contract_types().await?))
}

#[tracing::instrument(skip(service))]
async fn get_contract_type(
    State(service): State<HumanResourcesService>,
    Path(name): Path<String>,
) -> Result<Json<ContractType>, ApiError> {
    service
        .get_contract_type(&name)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Contract type"))
}

#[tracing::instrument(skip(service, request))]
async fn create_contract_type(
    State(service): State<HumanResourcesService>,
    WithRejection(Json(request), _): JsonBody<LookupRequest>,
) -> Result<(StatusCode, Json<ContractType>), ApiError> {
    Ok((StatusCode::CREATED, Json(service.create_contract_type(request).await?)))
}

#[tracing::instrument(skip(service, request))]
async fn update_contract_type(
    State(service): State<HumanResourcesService>,
    Path(name): Path<String>,
    WithRejection(Json(request), _): JsonBody<LookupRequest>,
) -> Result<Json<ContractType>, ApiError> {
    service
        .update_contract_type(&name, request)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Contract type"))
}

#[tracing::instrument(skip(service))]
async fn delete_contract_type(
    State(service): State<HumanResourcesService>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    deleted(service.delete_contract_type(&name).await?, "Contract type")
}

#[tracing::instrument(skip(service))]
async fn list_employee_types(
    State(service): State<HumanResourcesService>,
) -> Result<Json<Vec<EmployeeType>>, ApiError> {
    Ok(Json(service.list_employee_types().await?))
}

#[tracing::instrument(skip(service))]
async fn get_employee_type(
    State(service): State<HumanResourcesService>,
    Path(name): Path<String>,
) -> Result<Json<EmployeeType>, ApiError> {
    service
        .get_employee_type(&name)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Employee type"))
}

#[tracing::instrument(skip(service, request))]
async fn create_employee_type(
    State(service): State<HumanResourcesService>,
    WithRejection(Json(request), _): JsonBody<LookupRequest>,
) -> Result<(StatusCode, Json<EmployeeType>), ApiError> {
    Ok((StatusCode::CREATED, Json(service.create_employee_type(request).await?)))
}

#[tracing::instrument(skip(service, request))]
async fn update_employee_type(
    State(service): State<HumanResourcesService>,
    Path(name): Path<String>,
    WithRejection(Json(request), _): JsonBody<LookupRequest>,
) -> Result<Json<EmployeeType>, ApiError> {
    service
        .update_employee_type(&name, request)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Employee type"))
}

#[tracing::instrument(skip(service))]
async fn delete_employee_type(
    State(service): State<HumanResourcesService>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    deleted(service.delete_employee_type(&name).await?, "Employee type")
}
