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
    Enrollment, EnrollmentFilter, EnrollmentRequest, Group, GroupFilter, GroupRequest, Program,
    ProgramFilter, ProgramRequest, Subject, SubjectFilter, SubjectRequest,
};
use crate::services::AcademicService;

/// Academic catalog and registration routes
pub fn academic_routes(service: AcademicService) -> Router {
    Router::new()
        .route("/programs", get(list_programs).post(create_program))
        .route(
            "/programs/:code",
            get(get_program).put(update_program).delete(delete_program),
        )
        .route("/subjects", get(list_subjects).post(create_subject))
        .route(
            "/subjects/:code",
            get(get_subject).put(update_subject).delete(delete_subject),
        )
        .route("/groups", get(list_groups).post(create_group))
        .route("/groups/:nrc", get(get_group).put(update_group).delete(delete_group))
        .route("/enrollments", get(list_enrollments).post(create_enrollment))
        .route(
            "/enrollments/:id",
            get(get_enrollment).put(update_enrollment).delete(delete_enrollment),
        )
        .with_state(service)
}

// Programs

#[tracing::instrument(skip(service))]
async fn list_programs(
    State(service): State<AcademicService>,
    WithRejection(Query(filter), _): WithRejection<Query<ProgramFilter>, ApiError>,
) -> Result<Json<Vec<Program>>, ApiError> {
    Ok(Json(service.list_programs(&filter).await?))
}

#[tracing::instrument(skip(service))]
async fn get_program(
    State(service): State<AcademicService>,
    WithRejection(Path(code), _): KeyPath<i32>,
) -> Result<Json<Program>, ApiError> {
    service.get_program(code).await?.map(Json).ok_or(ApiError::NotFound("Program"))
}

#[tracing::instrument(skip(service, request))]
async fn create_program(
    State(service): State<AcademicService>,
    WithRejection(Json(request), _): JsonBody<ProgramRequest>,
) -> Result<(StatusCode, Json<Program>), ApiError> {
    Ok((StatusCode::CREATED, Json(service.create_program(request).await?)))
}

#[tracing::instrument(skip(service, request))]
async fn update_program(
    State(service): State<AcademicService>,
    WithRejection(Path(code), _): KeyPath<i32>,
    WithRejection(Json(request), _): JsonBody<ProgramRequest>,
) -> Result<Json<Program>, ApiError> {
    service
        .update_program(code, request)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Program"))
}

#[tracing::instrument(skip(service))]
async fn delete_program(
    State(service): State<AcademicService>,
    WithRejection(Path(code), _): KeyPath<i32>,
) -> Result<StatusCode, ApiError> {
    deleted(service.delete_program(code).await?, "Program")
}

// Subjects

#[tracing::instrument(skip(service))]
async fn list_subjects(
    State(service): State<AcademicService>,
    WithRejection(Query(filter), _): WithRejection<Query<SubjectFilter>, ApiError>,
) -> Result<Json<Vec<Subject>>, ApiError> {
    Ok(Json(service.list_subjects(&filter).await?))
}

#[tracing::instrument(skip(service))]
async fn get_subject(
    State(service): State<AcademicService>,
    Path(code): Path<String>,
) -> Result<Json<Subject>, ApiError> {
    service.get_subject(&code).await?.map(Json).ok_or(ApiError::NotFound("Subject"))
}

#[tracing::instrument(skip(service, request))]
async fn create_subject(
    State(service): State<AcademicService>,
    WithRejection(Json(request), _): JsonBody<SubjectRequest>,
) -> Result<(StatusCode, Json<Subject>), ApiError> {
    Ok((StatusCode::CREATED, Json(service.create_subject(request).await?)))
}

#[tracing::instrument(skip(service, request))]
async fn update_subject(
    State(service): State<AcademicService>,
    Path(code): Path<String>,
    WithRejection(Json(request), _): JsonBody<SubjectRequest>,
) -> Result<Json<Subject>, ApiError> {
    service
        .update_subject(&code, request)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Subject"))
}

#[tracing::instrument(skip(service))]
async fn delete_subject(
    State(service): State<AcademicService>,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    deleted(service.delete_subject(&code).await?, "Subject")
}

// Groups

#[tracing::instrument(skip(service))]
async fn list_groups(
    State(service): State<AcademicService>,
    WithRejection(Query(filter), _): WithRejection<Query<GroupFilter>, ApiError>,
) -> Result<Json<Vec<Group>>, ApiError> {
    Ok(Json(service.list_groups(&filter).await?))
}

#[tracing::instrument(skip(service))]
async fn get_group(
    State(service): State<AcademicService>,
    Path(nrc): Path<String>,
) -> Result<Json<Group>, ApiError> {
    service.get_group(&nrc).await?.map(Json).ok_or(ApiError::NotFound("Group"))
}

#[tracing::instrument(skip(service, request))]
async fn create_group(
    State(service): State<AcademicService>,
    WithRejection(Json(request), _): JsonBody<GroupRequest>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    Ok((StatusCode::CREATED, Json(service.create_group(request).await?)))
}

#[tracing::instrument(skip(service, request))]
async fn update_group(
    State(service): State<AcademicService>,
    Path(nrc): Path<String>,
    WithRejection(Json(request), _): JsonBody<GroupRequest>,
) -> Result<Json<Group>, ApiError> {
    service
        .update_group(&nrc, request)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Group"))
}

#[tracing::instrument(skip(service))]
async fn delete_group(
    State(service): State<AcademicService>,
    Path(nrc): Path<String>,
) -> Result<StatusCode, ApiError> {
    deleted(service.delete_group(&nrc).await?, "Group")
}

// Enrollments

#[tracing::instrument(skip(service))]
async fn list_enrollments(
    State(service): State<AcademicService>,
    WithRejection(Query(filter), _): WithRejection<Query<EnrollmentFilter>, ApiError>,
) -> Result<Json<Vec<Enrollment>>, ApiError> {
    Ok(Json(service.list_enrollments(&filter).await?))
}

#[tracing::instrument(skip(service))]
async fn get_enrollment(
    State(service): State<AcademicService>,
    WithRejection(Path(id), _): KeyPath<i32>,
) -> Result<Json<Enrollment>, ApiError> {
    service
        .get_enrollment(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Enrollment"))
}

#[tracing::instrument(skip(service, request))]
async fn create_enrollment(
    State(service): State<AcademicService>,
    WithRejection(Json(request), _): JsonBody<EnrollmentRequest>,
) -> Result<(StatusCode, Json<Enrollment>), ApiError> {
    Ok((StatusCode::CREATED, Json(service.create_enrollment(request).await?)))
}

#[tracing::instrument(skip(service, request))]
async fn update_enrollment(
    State(service): State<AcademicService>,
    WithRejection(Path(id), _): KeyPath<i32>,
    WithRejection(Json(request), _): JsonBody<EnrollmentRequest>,
) -> Result<Json<Enrollment>, ApiError> {
    service
        .update_enrollment(id, request)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Enrollment"))
}

#[tracing::instrument(skip(service))]
async fn delete_enrollment(
    State(service): State<AcademicService>,
    WithRejection(Path(id), _): KeyPath<i32>,
) -> Result<StatusCode, ApiError> {
    deleted(service.delete_enrollment(id).await?, "Enrollment")
}
