use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use axum_extra::extract::WithRejection;

use super::error::ApiError;
use super::{deleted, JsonBody};
use crate::auth::{
    admin_only_middleware, jwt_auth_middleware, AuthError, AuthService, LoginRequest,
    LoginResponse, MessageResponse, UserSession,
};
use crate::models::{
    Employee, EmployeeFilter, EmployeeRequest, Student, StudentFilter, StudentRequest,
    UserDetail, UserFilter, UserRequest,
};
use crate::services::AccountService;

#[derive(Clone)]
pub struct AccountsState {
    pub accounts: AccountService,
    pub auth: AuthService,
}

/// Login, session and account routes. User management is admin only.
pub fn account_routes(accounts: AccountService, auth: AuthService) -> Router {
    let users = Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:username",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route_layer(middleware::from_fn(admin_only_middleware));

    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/students", get(list_students).post(create_student))
        .route(
            "/students/:id",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/employees", get(list_employees).post(create_employee))
        .route(
            "/employees/:id",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
        .merge(users)
        .route_layer(middleware::from_fn_with_state(auth.clone(), jwt_auth_middleware));

    Router::new()
        .route("/login", post(login))
        .merge(protected)
        .with_state(AccountsState { accounts, auth })
}

// Session

#[tracing::instrument(skip(state, request), fields(username = %request.username))]
async fn login(
    State(state): State<AccountsState>,
    WithRejection(Json(request), _): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (user, token) = state.auth.login(&request).await?;
    let user = state.accounts.user_detail(user).await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.auth.jwt().session_expires_in_seconds(),
        user,
    }))
}

#[tracing::instrument(skip(state, session), fields(username = %session.username))]
async fn logout(
    State(state): State<AccountsState>,
    Extension(session): Extension<UserSession>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth.logout(&session).await?;
    Ok(Json(MessageResponse {
        message: "Successfully logged out".to_string(),
    }))
}

#[tracing::instrument(skip(state, session), fields(username = %session.username))]
async fn me(
    State(state): State<AccountsState>,
    Extension(session): Extension<UserSession>,
) -> Result<Json<UserDetail>, ApiError> {
    let user = state
        .accounts
        .get_user_by_id(session.user_id)
        .await?
        .ok_or(AuthError::InvalidToken)?;
    Ok(Json(user))
}

// Students

#[tracing::instrument(skip(state))]
async fn list_students(
    State(state): State<AccountsState>,
    WithRejection(Query(filter), _): WithRejection<Query<StudentFilter>, ApiError>,
) -> Result<Json<Vec<Student>>, ApiError> {
    Ok(Json(state.accounts.list_students(&filter).await?))
}

#[tracing::instrument(skip(state))]
async fn get_student(
    State(state): State<AccountsState>,
    Path(id): Path<String>,
) -> Result<Json<Student>, ApiError> {
    state
        .accounts
        .get_student(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Student"))
}

#[tracing::instrument(skip(state, request))]
async fn create_student(
    State(state): State<AccountsState>,
    WithRejection(Json(request), _): JsonBody<StudentRequest>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    Ok((StatusCode::CREATED, Json(state.accounts.create_student(request).await?)))
}

#[tracing::instrument(skip(state, request))]
async fn update_student(
    State(state): State<AccountsState>,
    Path(id): Path<String>,
    WithRejection(Json(request), _): JsonBody<StudentRequest>,
) -> Result<Json<Student>, ApiError> {
    state
        .accounts
        .update_student(&id, request)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Student"))
}

#[tracing::instrument(skip(state))]
async fn delete_student(
    State(state): State<AccountsState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    deleted(state.accounts.delete_student(&id).await?, "Student")
}

// Employees

#[tracing::instrument(skip(state))]
async fn list_employees(
    State(state): State<AccountsState>,
    WithRejection(Query(filter), _): WithRejection<Query<EmployeeFilter>, ApiError>,
) -> Result<Json<Vec<Employee>>, ApiError> {
    Ok(Json(state.accounts.list_employees(&filter).await?))
}

#[tracing::instrument(skip(state))]
async fn get_employee(
    State(state): State<AccountsState>,
    Path(id): Path<String>,
) -> Result<Json<Employee>, ApiError> {
    state
        .accounts
        .get_employee(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Employee"))
}

#[tracing::instrument(skip(state, request))]
async fn create_employee(
    State(state): State<AccountsState>,
    WithRejection(Json(request), _): JsonBody<EmployeeRequest>,
) -> Result<(StatusCode, Json<Employee>), ApiError> {
    Ok((StatusCode::CREATED, Json(state.accounts.create_employee(request).await?)))
}

#[tracing::instrument(skip(state, request))]
async fn update_employee(
    State(state): State<AccountsState>,
    Path(id): Path<String>,
    WithRejection(Json(request), _): JsonBody<EmployeeRequest>,
) -> Result<Json<Employee>, ApiError> {
    state
        .accounts
        .update_employee(&id, request)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Employee"))
}

#[tracing::instrument(skip(state))]
async fn delete_employee(
    State(state): State<AccountsState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    deleted(state.accounts.delete_employee(&id).await?, "Employee")
}

// Users

#[tracing::instrument(skip(state))]
async fn list_users(
    State(state): State<AccountsState>,
    WithRejection(Query(filter), _): WithRejection<Query<UserFilter>, ApiError>,
) -> Result<Json<Vec<UserDetail>>, ApiError> {
    Ok(Json(state.accounts.list_users(filter.role).await?))
}

#[tracing::instrument(skip(state))]
async fn get_user(
    State(state): State<AccountsState>,
    Path(username): Path<String>,
) -> Result<Json<UserDetail>, ApiError> {
    state
        .accounts
        .get_user(&username)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("User"))
}

#[tracing::instrument(skip(state, request), fields(username = %request.username))]
async fn create_user(
    State(state): State<AccountsState>,
    WithRejection(Json(request), _): JsonBody<UserRequest>,
) -> Result<(StatusCode, Json<UserDetail>), ApiError> {
    Ok((StatusCode::CREATED, Json(state.accounts.create_user(request).await?)))
}

#[tracing::instrument(skip(state, request))]
async fn update_user(
    State(state): State<AccountsState>,
    Path(username): Path<String>,
    WithRejection(Json(request), _): JsonBody<UserRequest>,
) -> Result<Json<UserDetail>, ApiError> {
    state
        .accounts
        .update_user(&username, request)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("User"))
}

#[tracing::instrument(skip(state))]
async fn delete_user(
    State(state): State<AccountsState>,
    Path(username): Path<String>,
) -> Result<StatusCode, ApiError> {
    deleted(state.accounts.delete_user(&username).await?, "User")
}
