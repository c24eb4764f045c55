use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use axum_extra::extract::WithRejection;

use super::error::ApiError;
use super::{deleted, JsonBody};
use crate::models::{
    AdoptRoutineRequest, Exercise, ExerciseFilter, ExercisePayload, FollowUp, FollowUpPayload,
    Progress, ProgressFilter, ProgressPayload, Recommendation, RecommendationPayload, Record,
    Routine, RoutineFilter, RoutinePayload, TrainerUserFilter,
};
use crate::services::{AdoptOutcome, FitnessService};

type Filter<T> = WithRejection<Query<T>, ApiError>;

/// Fitness document routes
pub fn fitness_routes(service: FitnessService) -> Router {
    Router::new()
        .route("/exercises", get(list_exercises).post(create_exercise))
        .route(
            "/exercises/:id",
            get(get_exercise).put(update_exercise).delete(delete_exercise),
        )
        .route("/routines", get(list_routines).post(create_routine))
        .route(
            "/routines/:id",
            get(get_routine).put(update_routine).delete(delete_routine),
        )
        .route("/routines/:id/adopt", post(adopt_routine))
        .route("/progress", get(list_progress).post(create_progress))
        .route(
            "/progress/:id",
            get(get_progress).put(update_progress).delete(delete_progress),
        )
        .route(
            "/recommendations",
            get(list_recommendations).post(create_recommendation),
        )
        .route(
            "/recommendations/:id",
            get(get_recommendation)
                .put(update_recommendation)
                .delete(delete_recommendation),
        )
        .route("/followups", get(list_followups).post(create_followup))
        .route(
            "/followups/:id",
            get(get_followup).put(update_followup).delete(delete_followup),
        )
        .with_state(service)
}

// Exercises

#[tracing::instrument(skip(service))]
async fn list_exercises(
    State(service): State<FitnessService>,
    WithRejection(Query(filter), _): Filter<ExerciseFilter>,
) -> Result<Json<Vec<Record<Exercise>>>, ApiError> {
    Ok(Json(service.list_exercises(filter).await?))
}

#[tracing::instrument(skip(service))]
async fn get_exercise(
    State(service): State<FitnessService>,
    Path(id): Path<String>,
) -> Result<Json<Record<Exercise>>, ApiError> {
    service.get_exercise(&id).await?.map(Json).ok_or(ApiError::NotFound("Exercise"))
}

#[tracing::instrument(skip(service, payload))]
async fn create_exercise(
    State(service): State<FitnessService>,
    WithRejection(Json(payload), _): JsonBody<ExercisePayload>,
) -> Result<(StatusCode, Json<Record<Exercise>>), ApiError> {
    Ok((StatusCode::CREATED, Json(service.create_exercise(payload).await?)))
}

#[tracing::instrument(skip(service, payload))]
async fn update_exercise(
    State(service): State<FitnessService>,
    Path(id): Path<String>,
    WithRejection(Json(payload), _): JsonBody<ExercisePayload>,
) -> Result<Json<Record<Exercise>>, ApiError> {
    service
        .update_exercise(&id, payload)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Exercise"))
}

#[tracing::instrument(skip(service))]
async fn delete_exercise(
    State(service): State<FitnessService>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    deleted(service.delete_exercise(&id).await?, "Exercise")
}

// Routines

#[tracing::instrument(skip(service))]
async fn list_routines(
    State(service): State<FitnessService>,
    WithRejection(Query(filter), _): Filter<RoutineFilter>,
) -> Result<Json<Vec<Record<Routine>>>, ApiError> {
    Ok(Json(service.list_routines(filter).await?))
}

#[tracing::instrument(skip(service))]
async fn get_routine(
    State(service): State<FitnessService>,
    Path(id): Path<String>,
) -> Result<Json<Record<Routine>>, ApiError> {
    service.get_routine(&id).await?.map(Json).ok_or(ApiError::NotFound("Routine"))
}

#[tracing::instrument(skip(service, payload))]
async fn create_routine(
    State(service): State<FitnessService>,
    WithRejection(Json(payload), _): JsonBody<RoutinePayload>,
) -> Result<(StatusCode, Json<Record<Routine>>), ApiError> {
    Ok((StatusCode::CREATED, Json(service.create_routine(payload).await?)))
}

#[tracing::instrument(skip(service, payload))]
async fn update_routine(
    State(service): State<FitnessService>,
    Path(id): Path<String>,
    WithRejection(Json(payload), _): JsonBody<RoutinePayload>,
) -> Result<Json<Record<Routine>>, ApiError> {
    service
        .update_routine(&id, payload)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Routine"))
}

#[tracing::instrument(skip(service))]
async fn delete_routine(
    State(service): State<FitnessService>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    deleted(service.delete_routine(&id).await?, "Routine")
}

#[tracing::instrument(skip(service, request), fields(user_id = %request.user_id))]
async fn adopt_routine(
    State(service): State<FitnessService>,
    Path(id): Path<String>,
    WithRejection(Json(request), _): JsonBody<AdoptRoutineRequest>,
) -> Result<(StatusCode, Json<Record<Routine>>), ApiError> {
    match service.adopt_routine(&id, &request.user_id).await? {
        AdoptOutcome::Adopted(record) => Ok((StatusCode::CREATED, Json(record))),
        AdoptOutcome::NotFound => Err(ApiError::NotFound("Routine")),
        AdoptOutcome::NotTemplate => Err(ApiError::BadRequest(
            "Only template routines can be adopted".to_string(),
        )),
    }
}

// Progress

#[tracing::instrument(skip(service))]
async fn list_progress(
    State(service): State<FitnessService>,
    WithRejection(Query(filter), _): Filter<ProgressFilter>,
) -> Result<Json<Vec<Record<Progress>>>, ApiError> {
    Ok(Json(service.list_progress(filter).await?))
}

#[tracing::instrument(skip(service))]
async fn get_progress(
    State(service): State<FitnessService>,
    Path(id): Path<String>,
) -> Result<Json<Record<Progress>>, ApiError> {
    service.get_progress(&id).await?.map(Json).ok_or(ApiError::NotFound("Progress"))
}

#[tracing::instrument(skip(service, payload))]
async fn create_progress(
    State(service): State<FitnessService>,
    WithRejection(Json(payload), _): JsonBody<ProgressPayload>,
) -> Result<(StatusCode, Json<Record<Progress>>), ApiError> {
    Ok((StatusCode::CREATED, Json(service.create_progress(payload).await?)))
}

#[tracing::instrument(skip(service, payload))]
async fn update_progress(
    State(service): State<FitnessService>,
    Path(id): Path<String>,
    WithRejection(Json(payload), _): JsonBody<ProgressPayload>,
) -> Result<Json<Record<Progress>>, ApiError> {
    service
        .update_progress(&id, payload)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Progress"))
}

#[tracing::instrument(skip(service))]
async fn delete_progress(
    State(service): State<FitnessService>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    deleted(service.delete_progress(&id).await?, "Progress")
}

// Recommendations

#[tracing::instrument(skip(service))]
async fn list_recommendations(
    State(service): State<FitnessService>,
    WithRejection(Query(filter), _): Filter<TrainerUserFilter>,
) -> Result<Json<Vec<Record<Recommendation>>>, ApiError> {
    Ok(Json(service.list_recommendations(filter).await?))
}

#[tracing::instrument(skip(service))]
async fn get_recommendation(
    State(service): State<FitnessService>,
    Path(id): Path<String>,
) -> Result<Json<Record<Recommendation>>, ApiError> {
    service
        .get_recommendation(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Recommendation"))
}

#[tracing::instrument(skip(service, payload))]
async fn create_recommendation(
    State(service): State<FitnessService>,
    WithRejection(Json(payload), _): JsonBody<RecommendationPayload>,
) -> Result<(StatusCode, Json<Record<Recommendation>>), ApiError> {
    Ok((StatusCode::CREATED, Json(service.create_recommendation(payload).await?)))
}

#[tracing::instrument(skip(service, payload))]
async fn update_recommendation(
    State(service): State<FitnessService>,
    Path(id): Path<String>,
    WithRejection(Json(payload), _): JsonBody<RecommendationPayload>,
) -> Result<Json<Record<Recommendation>>, ApiError> {
    service
        .update_recommendation(&id, payload)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Recommendation"))
}

#[tracing::instrument(skip(service))]
async fn delete_recommendation(
    State(service): State<FitnessService>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    deleted(service.delete_recommendation(&id).await?, "Recommendation")
}

// Follow-ups

#[tracing::instrument(skip(service))]
async fn list_followups(
    State(service): State<FitnessService>,
    WithRejection(Query(filter), _): Filter<TrainerUserFilter>,
) -> Result<Json<Vec<Record<FollowUp>>>, ApiError> {
    Ok(Json(service.list_followups(filter).await?))
}

#[tracing::instrument(skip(service))]
async fn get_followup(
    State(service): State<FitnessService>,
    Path(id): Path<String>,
) -> Result<Json<Record<FollowUp>>, ApiError> {
    service.get_followup(&id).await?.map(Json).ok_or(ApiError::NotFound("Follow-up"))
}

#[tracing::instrument(skip(service, payload))]
async fn create_followup(
    State(service): State<FitnessService>,
    WithRejection(Json(payload), _): JsonBody<FollowUpPayload>,
) -> Result<(StatusCode, Json<Record<FollowUp>>), ApiError> {
    Ok((StatusCode::CREATED, Json(service.create_followup(payload).await?)))
}

#[tracing::instrument(skip(service, payload))]
async fn update_followup(
    State(service): State<FitnessService>,
    Path(id): Path<String>,
    WithRejection(Json(payload), _): JsonBody<FollowUpPayload>,
) -> Result<Json<Record<FollowUp>>, ApiError> {
    service
        .update_followup(&id, payload)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Follow-up"))
}

#[tracing::instrument(skip(service))]
async fn delete_followup(
    State(service): State<FitnessService>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    deleted(service.delete_followup(&id).await?, "Follow-up")
}
