use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use axum_extra::extract::WithRejection;

use super::error::ApiError;
use super::{deleted, JsonBody, KeyPath};
use crate::models::{
    Area, AreaRequest, Campus, CampusRequest, City, CityRequest, Country, CountryRequest,
    Department, DepartmentRequest, Faculty, FacultyRequest, LocationFilter,
};
use crate::services::LocationService;

type Filter = WithRejection<Query<LocationFilter>, ApiError>;

/// Geographic and organizational hierarchy routes
pub fn location_routes(service: LocationService) -> Router {
    Router::new()
        .route("/countries", get(list_countries).post(create_country))
        .route(
            "/countries/:code",
            get(get_country).put(update_country).delete(delete_country),
        )
        .route("/departments", get(list_departments).post(create_department))
        .route(
            "/departments/:code",
            get(get_department).put(update_department).delete(delete_department),
        )
        .route("/cities", get(list_cities).post(create_city))
        .route("/cities/:code", get(get_city).put(update_city).delete(delete_city))
        .route("/campuses", get(list_campuses).post(create_campus))
        .route(
            "/campuses/:code",
            get(get_campus).put(update_campus).delete(delete_campus),
        )
        .route("/faculties", get(list_faculties).post(create_faculty))
        .route(
            "/faculties/:code",
            get(get_faculty).put(update_faculty).delete(delete_faculty),
        )
        .route("/areas", get(list_areas).post(create_area))
        .route("/areas/:code", get(get_area).put(update_area).delete(delete_area))
        .with_state(service)
}

// Countries

#[tracing::instrument(skip(service))]
async fn list_countries(State(service): State<LocationService>) -> Result<Json<Vec<Country>>, ApiError> {
    Ok(Json(service.list_countries().await?))
}

#[tracing::instrument(skip(service))]
async fn get_country(
    State(service): State<LocationService>,
    WithRejection(Path(code), _): KeyPath<i32>,
) -> Result<Json<Country>, ApiError> {
    service.get_country(code).await?.map(Json).ok_or(ApiError::NotFound("Country"))
}

#[tracing::instrument(skip(service, request))]
async fn create_country(
    State(service): State<LocationService>,
    WithRejection(Json(request), _): JsonBody<CountryRequest>,
) -> Result<(StatusCode, Json<Country>), ApiError> {
    Ok((StatusCode::CREATED, Json(service.create_country(request).await?)))
}

#[tracing::instrument(skip(service, request))]
async fn update_country(
    State(service): State<LocationService>,
    WithRejection(Path(code), _): KeyPath<i32>,
    WithRejection(Json(request), _): JsonBody<CountryRequest>,
) -> Result<Json<Country>, ApiError> {
    service
        .update_country(code, request)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Country"))
}

#[tracing::instrument(skip(service))]
async fn delete_country(
    State(service): State<LocationService>,
    WithRejection(Path(code), _): KeyPath<i32>,
) -> Result<StatusCode, ApiError> {
    deleted(service.delete_country(code).await?, "Country")
}

// Departments

#[tracing::instrument(skip(service))]
async fn list_departments(
    State(service): State<LocationService>,
    WithRejection(Query(filter), _): Filter,
) -> Result<Json<Vec<Department>>, ApiError> {
    Ok(Json(service.list_departments(filter.country).await?))
}

#[tracing::instrument(skip(service))]
async fn get_department(
    State(service): State<LocationService>,
    WithRejection(Path(code), _): KeyPath<i32>,
) -> Result<Json<Department>, ApiError> {
    service
        .get_department(code)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Department"))
}

#[tracing::instrument(skip(service, request))]
async fn create_department(
    State(service): State<LocationService>,
    WithRejection(Json(request), _): JsonBody<DepartmentRequest>,
) -> Result<(StatusCode, Json<Department>), ApiError> {
    Ok((StatusCode::CREATED, Json(service.create_department(request).await?)))
}

#[tracing::instrument(skip(service, request))]
async fn update_department(
    State(service): State<LocationService>,
    WithRejection(Path(code), _): KeyPath<i32>,
    WithRejection(Json(request), _): JsonBody<DepartmentRequest>,
) -> Result<Json<Department>, ApiError> {
    service
        .update_department(code, request)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Department"))
}

#[tracing::instrument(skip(service))]
async fn delete_department(
    State(service): State<LocationService>,
    WithRejection(Path(code), _): KeyPath<i32>,
) -> Result<StatusCode, ApiError> {
    deleted(service.delete_department(code).await?, "Department")
}

// Cities

#[tracing::instrument(skip(service))]
async fn list_cities(
    State(service): State<LocationService>,
    WithRejection(Query(filter), _): Filter,
) -> Result<Json<Vec<City>>, ApiError> {
    Ok(Json(service.list_cities(filter.department).await?))
}

#[tracing::instrument(skip(service))]
async fn get_city(
    State(service): State<LocationService>,
    WithRejection(Path(code), _): KeyPath<i32>,
) -> Result<Json<City>, ApiError> {
    service.get_city(code).await?.map(Json).ok_or(ApiError::NotFound("City"))
}

#[tracing::instrument(skip(service, request))]
async fn create_city(
    State(service): State<LocationService>,
    WithRejection(Json(request), _): JsonBody<CityRequest>,
) -> Result<(StatusCode, Json<City>), ApiError> {
    Ok((StatusCode::CREATED, Json(service.create_city(request).await?)))
}

#[tracing::instrument(skip(service, request))]
async fn update_city(
    State(service): State<LocationService>,
    WithRejection(Path(code), _): KeyPath<i32>,
    WithRejection(Json(request), _): JsonBody<CityRequest>,
) -> Result<Json<City>, ApiError> {
    service
        .update_city(code, request)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("City"))
}

#[tracing::instrument(skip(service))]
async fn delete_city(
    State(service): State<LocationService>,
    WithRejection(Path(code), _): KeyPath<i32>,
) -> Result<StatusCode, ApiError> {
    deleted(service.delete_city(code).await?, "City")
}

// Campuses

#[tracing::instrument(skip(service))]
async fn list_campuses(
    State(service): State<LocationService>,
    WithRejection(Query(filter), _): Filter,
) -> Result<Json<Vec<Campus>>, ApiError> {
    Ok(Json(service.list_campuses(filter.city).await?))
}

#[tracing::instrument(skip(service))]
async fn get_campus(
    State(service): State<LocationService>,
    WithRejection(Path(code), _): KeyPath<i32>,
) -> Result<Json<Campus>, ApiError> {
    service.get_campus(code).await?.map(Json).ok_or(ApiError::NotFound("Campus"))
}

#[tracing::instrument(skip(service, request))]
async fn create_campus(
    State(service): State<LocationService>,
    WithRejection(Json(request), _): JsonBody<CampusRequest>,
) -> Result<(StatusCode, Json<Campus>), ApiError> {
    Ok((StatusCode::CREATED, Json(service.create_campus(request).await?)))
}

#[tracing::instrument(skip(service, request))]
async fn update_campus(
    State(service): State<LocationService>,
    WithRejection(Path(code), _): KeyPath<i32>,
    WithRejection(Json(request), _): JsonBody<CampusRequest>,
) -> Result<Json<Campus>, ApiError> {
    service
        .update_campus(code, request)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Campus"))
}

#[tracing::instrument(skip(service))]
async fn delete_campus(
    State(service): State<LocationService>,
    WithRejection(Path(code), _): KeyPath<i32>,
) -> Result<StatusCode, ApiError> {
    deleted(service.delete_campus(code).await?, "Campus")
}

// Faculties

#[tracing::instrument(skip(service))]
async fn list_faculties(
    State(service): State<LocationService>,
    WithRejection(Query(filter), _): Filter,
) -> Result<Json<Vec<Faculty>>, ApiError> {
    Ok(Json(service.list_faculties(filter.campus).await?))
}

#[tracing::instrument(skip(service))]
async fn get_faculty(
    State(service): State<LocationService>,
    WithRejection(Path(code), _): KeyPath<i32>,
) -> Result<Json<Faculty>, ApiError> {
    service.get_faculty(code).await?.map(Json).ok_or(ApiError::NotFound("Faculty"))
}

#[tracing::instrument(skip(service, request))]
async fn create_faculty(
    State(service): State<LocationService>,
    WithRejection(Json(request), _): JsonBody<FacultyRequest>,
) -> Result<(StatusCode, Json<Faculty>), ApiError> {
    Ok((StatusCode::CREATED, Json(service.create_faculty(request).await?)))
}

#[tracing::instrument(skip(service, request))]
async fn update_faculty(
    State(service): State<LocationService>,
    WithRejection(Path(code), _): KeyPath<i32>,
    WithRejection(Json(request), _): JsonBody<FacultyRequest>,
) -> Result<Json<Faculty>, ApiError> {
    service
        .update_faculty(code, request)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Faculty"))
}

#[tracing::instrument(skip(service))]
async fn delete_faculty(
    State(service): State<LocationService>,
    WithRejection(Path(code), _): KeyPath<i32>,
) -> Result<StatusCode, ApiError> {
    deleted(service.delete_faculty(code).await?, "Faculty")
}

// Areas

#[tracing::instrument(skip(service))]
async fn list_areas(
    State(service): State<LocationService>,
    WithRejection(Query(filter), _): Filter,
) -> Result<Json<Vec<Area>>, ApiError> {
    Ok(Json(service.list_areas(filter.faculty).await?))
}

#[tracing::instrument(skip(service))]
async fn get_area(
    State(service): State<LocationService>,
    WithRejection(Path(code), _): KeyPath<i32>,
) -> Result<Json<Area>, ApiError> {
    service.get_area(code).await?.map(Json).ok_or(ApiError::NotFound("Area"))
}

#[tracing::instrument(skip(service, request))]
async fn create_area(
    State(service): State<LocationService>,
    WithRejection(Json(request), _): JsonBody<AreaRequest>,
) -> Result<(StatusCode, Json<Area>), ApiError> {
    Ok((StatusCode::CREATED, Json(service.create_area(request).await?)))
}

#[tracing::instrument(skip(service, request))]
async fn update_area(
    State(service): State<LocationService>,
    WithRejection(Path(code), _): KeyPath<i32>,
    WithRejection(Json(request), _): JsonBody<AreaRequest>,
) -> Result<Json<Area>, ApiError> {
    service
        .update_area(code, request)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Area"))
}

#[tracing::instrument(skip(service))]
async fn delete_area(
    State(service): State<LocationService>,
    WithRejection(Path(code), _): KeyPath<i32>,
) -> Result<StatusCode, ApiError> {
    deleted(service.delete_area(code).await?, "Area")
}
