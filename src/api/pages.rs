use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Extension, Form, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::error::ApiError;
use super::forms::{ExerciseForm, ProgressForm, RecommendationForm, RoutineForm};
use super::render;
use crate::auth::{page_auth_middleware, AuthError, AuthService, LoginRequest, UserSession, SESSION_COOKIE};
use crate::models::{Exercise, ProgressFilter, UserDetail, ValidationError};
use crate::services::{AccountService, DashboardService, FitnessService};

#[derive(Clone)]
pub struct PagesState {
    pub auth: AuthService,
    pub accounts: AccountService,
    pub fitness: FitnessService,
    pub dashboard: DashboardService,
}

/// Server-rendered pages, authenticated by the session cookie
pub fn page_routes(
    auth: AuthService,
    accounts: AccountService,
    fitness: FitnessService,
    dashboard: DashboardService,
) -> Router {
    let pages = Router::new()
        .route("/fitness/dashboard", get(dashboard_page))
        .route("/fitness/routines", get(routines_page))
        .route("/fitness/routines/create", get(routine_form).post(routine_submit))
        .route("/fitness/routines/:id", get(routine_detail_page))
        .route("/fitness/exercises", get(exercises_page))
        .route("/fitness/exercises/create", get(exercise_form).post(exercise_submit))
        .route("/fitness/exercises/:id", get(exercise_detail_page))
        .route("/fitness/progress", get(progress_page))
        .route("/fitness/progress/create", get(progress_form).post(progress_submit))
        .route("/fitness/reports", get(reports_page))
        .route("/fitness/trainer", get(trainer_page))
        .route("/fitness/trainer/users/:username/progress", get(trainee_page))
        .route(
            "/fitness/trainer/users/:username/recommend",
            get(recommendation_form).post(recommendation_submit),
        )
        .route("/fitness/admin", get(admin_page))
        .route("/fitness/admin/trainers", get(trainer_management_page))
        .route("/fitness/admin/reports", get(admin_reports_page))
        .route_layer(middleware::from_fn_with_state(auth.clone(), page_auth_middleware));

    Router::new()
        .route("/", get(home_page))
        .route("/login", get(login_form).post(login_submit))
        .route("/logout", get(logout))
        .merge(pages)
        .with_state(PagesState {
            auth,
            accounts,
            fitness,
            dashboard,
        })
}

/// The signed-in user, if the cookie carries a live session
async fn current_user(state: &PagesState, jar: &CookieJar) -> Result<Option<UserDetail>, ApiError> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };
    match state.auth.validate_session(cookie.value()).await {
        Ok(session) => Ok(state.accounts.get_user_by_id(session.user_id).await?),
        Err(AuthError::Database(err)) => Err(AuthError::Database(err).into()),
        Err(_) => Ok(None),
    }
}

/// Load the user behind a session; a deleted account sends the visitor back to sign in
async fn session_user(state: &PagesState, session: &UserSession) -> Result<Result<UserDetail, Response>, ApiError> {
    Ok(state
        .accounts
        .get_user_by_id(session.user_id)
        .await?
        .ok_or_else(|| Redirect::to("/login").into_response()))
}

/// Validation failures re-render the form; anything else is a server error
fn invalid_form(err: anyhow::Error) -> Result<ValidationError, ApiError> {
    err.downcast::<ValidationError>().map_err(ApiError::from)
}

fn dashboard_redirect() -> Response {
    Redirect::to("/fitness/dashboard").into_response()
}

#[tracing::instrument(skip(state, jar))]
async fn home_page(State(state): State<PagesState>, jar: CookieJar) -> Result<Html<String>, ApiError> {
    let user = current_user(&state, &jar).await?;
    Ok(render::home_page(user.as_ref()))
}

async fn login_form() -> Html<String> {
    render::login_page("", None)
}

#[tracing::instrument(skip(state, jar, form), fields(username = %form.username))]
async fn login_submit(
    State(state): State<PagesState>,
    jar: CookieJar,
    Form(form): Form<LoginRequest>,
) -> Result<Response, ApiError> {
    match state.auth.login(&form).await {
        Ok((user, token)) => {
            let cookie = Cookie::build((SESSION_COOKIE, token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax);
            let target = user.role().home_path();
            Ok((jar.add(cookie), Redirect::to(target)).into_response())
        }
        Err(AuthError::InvalidCredentials | AuthError::InactiveUser) => Ok((
            StatusCode::UNAUTHORIZED,
            render::login_page(&form.username, Some("Invalid username or password")),
        )
            .into_response()),
        Err(err) => Err(err.into()),
    }
}

#[tracing::instrument(skip(state, jar))]
async fn logout(State(state): State<PagesState>, jar: CookieJar) -> Result<Response, ApiError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Ok(session) = state.auth.validate_session(cookie.value()).await {
            state.auth.logout(&session).await?;
        }
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Redirect::to("/")).into_response())
}

#[tracing::instrument(skip(state, session), fields(username = %session.username))]
async fn dashboard_page(
    State(state): State<PagesState>,
    Extension(session): Extension<UserSession>,
) -> Result<Response, ApiError> {
    let user = match session_user(&state, &session).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    let dashboard = state.dashboard.user_dashboard(&user.username).await?;
    Ok(render::dashboard_page(&user, &dashboard).into_response())
}

#[tracing::instrument(skip(state, session), fields(username = %session.username))]
async fn reports_page(
    State(state): State<PagesState>,
    Extension(session): Extension<UserSession>,
) -> Result<Response, ApiError> {
    let user = match session_user(&state, &session).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    let report = state.dashboard.progress_report(&user.username).await?;
    Ok(render::reports_page(&user, &report).into_response())
}

#[tracing::instrument(skip(state, session), fields(username = %session.username))]
async fn trainer_page(
    State(state): State<PagesState>,
    Extension(session): Extension<UserSession>,
) -> Result<Response, ApiError> {
    let user = match session_user(&state, &session).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    if !user.is_trainer() {
        return Ok(dashboard_redirect());
    }
    let dashboard = state.dashboard.trainer_dashboard(&user.username).await?;
    Ok(render::trainer_page(&user, &dashboard).into_response())
}

#[tracing::instrument(skip(state, session), fields(username = %session.username))]
async fn admin_page(
    State(state): State<PagesState>,
    Extension(session): Extension<UserSession>,
) -> Result<Response, ApiError> {
    if !session.is_admin() {
        return Ok(dashboard_redirect());
    }
    let user = match session_user(&state, &session).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    let dashboard = state.dashboard.admin_dashboard().await?;
    Ok(render::admin_page(&user, &dashboard).into_response())
}

#[tracing::instrument(skip(state, session), fields(username = %session.username))]
async fn routines_page(
    State(state): State<PagesState>,
    Extension(session): Extension<UserSession>,
) -> Result<Response, ApiError> {
    let user = match session_user(&state, &session).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    let routines = state.fitness.visible_routines(&user.username).await?;
    Ok(render::routines_page(&user, &routines).into_response())
}

#[tracing::instrument(skip(state, session), fields(username = %session.username))]
async fn routine_detail_page(
    State(state): State<PagesState>,
    Extension(session): Extension<UserSession>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let user = match session_user(&state, &session).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    let Some(routine) = state.fitness.get_routine(&id).await? else {
        return Ok(Redirect::to("/fitness/routines").into_response());
    };

    let mut exercises: HashMap<String, Exercise> = HashMap::new();
    for entry in &routine.document.exercises {
        if let Some(record) = state.fitness.get_exercise(&entry.exercise_id).await? {
            exercises.insert(record.id, record.document);
        }
    }
    Ok(render::routine_detail_page(&user, &routine, &exercises).into_response())
}

#[tracing::instrument(skip(state, session), fields(username = %session.username))]
async fn routine_form(
    State(state): State<PagesState>,
    Extension(session): Extension<UserSession>,
) -> Result<Response, ApiError> {
    let user = match session_user(&state, &session).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    let exercises = state.fitness.exercise_catalog().await?;
    Ok(render::routine_form_page(&user, &exercises, None).into_response())
}

#[tracing::instrument(skip(state, session, inputs), fields(username = %session.username))]
async fn routine_submit(
    State(state): State<PagesState>,
    Extension(session): Extension<UserSession>,
    Form(inputs): Form<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let user = match session_user(&state, &session).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    let created = match RoutineForm::from_fields(&inputs) {
        Ok(form) => state.fitness.create_routine(form.into_payload(&user.username)).await,
        Err(invalid) => Err(invalid.into()),
    };
    match created {
        Ok(record) => Ok(Redirect::to(&format!("/fitness/routines/{}", record.id)).into_response()),
        Err(err) => {
            let invalid = invalid_form(err)?;
            let exercises = state.fitness.exercise_catalog().await?;
            Ok((
                StatusCode::BAD_REQUEST,
                render::routine_form_page(&user, &exercises, Some(&invalid)),
            )
                .into_response())
        }
    }
}

#[tracing::instrument(skip(state, session), fields(username = %session.username))]
async fn exercises_page(
    State(state): State<PagesState>,
    Extension(session): Extension<UserSession>,
) -> Result<Response, ApiError> {
    let user = match session_user(&state, &session).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    let exercises = state.fitness.exercise_catalog().await?;
    Ok(render::exercises_page(&user, &exercises).into_response())
}

#[tracing::instrument(skip(state, session), fields(username = %session.username))]
async fn exercise_detail_page(
    State(state): State<PagesState>,
    Extension(session): Extension<UserSession>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let user = match session_user(&state, &session).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    match state.fitness.get_exercise(&id).await? {
        Some(exercise) => Ok(render::exercise_detail_page(&user, &exercise).into_response()),
        None => Ok(Redirect::to("/fitness/exercises").into_response()),
    }
}

#[tracing::instrument(skip(state, session), fields(username = %session.username))]
async fn exercise_form(
    State(state): State<PagesState>,
    Extension(session): Extension<UserSession>,
) -> Result<Response, ApiError> {
    let user = match session_user(&state, &session).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    Ok(render::exercise_form_page(&user, None).into_response())
}

#[tracing::instrument(skip(state, session, form), fields(username = %session.username))]
async fn exercise_submit(
    State(state): State<PagesState>,
    Extension(session): Extension<UserSession>,
    Form(form): Form<ExerciseForm>,
) -> Result<Response, ApiError> {
    let user = match session_user(&state, &session).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    let created = match form.into_payload(&user.username) {
        Ok(payload) => state.fitness.create_exercise(payload).await,
        Err(invalid) => Err(invalid.into()),
    };
    match created {
        Ok(_) => Ok(Redirect::to("/fitness/exercises").into_response()),
        Err(err) => {
            let invalid = invalid_form(err)?;
            Ok((StatusCode::BAD_REQUEST, render::exercise_form_page(&user, Some(&invalid))).into_response())
        }
    }
}

#[tracing::instrument(skip(state, session), fields(username = %session.username))]
async fn progress_page(
    State(state): State<PagesState>,
    Extension(session): Extension<UserSession>,
) -> Result<Response, ApiError> {
    let user = match session_user(&state, &session).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    let progress = state
        .fitness
        .list_progress(ProgressFilter {
            user_id: Some(user.username.clone()),
            ..Default::default()
        })
        .await?;
    Ok(render::progress_page(&user, &progress).into_response())
}

/// Progress form with the user's routines and the exercise catalog to pick from
async fn render_progress_form(
    state: &PagesState,
    user: &UserDetail,
    error: Option<&ValidationError>,
) -> Result<Html<String>, ApiError> {
    let routines = state.fitness.visible_routines(&user.username).await?;
    let exercises = state.fitness.exercise_catalog().await?;
    Ok(render::progress_form_page(user, &routines, &exercises, error))
}

#[tracing::instrument(skip(state, session), fields(username = %session.username))]
async fn progress_form(
    State(state): State<PagesState>,
    Extension(session): Extension<UserSession>,
) -> Result<Response, ApiError> {
    let user = match session_user(&state, &session).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    Ok(render_progress_form(&state, &user, None).await?.into_response())
}

#[tracing::instrument(skip(state, session, form), fields(username = %session.username))]
async fn progress_submit(
    State(state): State<PagesState>,
    Extension(session): Extension<UserSession>,
    Form(form): Form<ProgressForm>,
) -> Result<Response, ApiError> {
    let user = match session_user(&state, &session).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    let created = match form.into_payload(&user.username) {
        Ok(payload) => state.fitness.create_progress(payload).await,
        Err(invalid) => Err(invalid.into()),
    };
    match created {
        Ok(_) => Ok(Redirect::to("/fitness/progress").into_response()),
        Err(err) => {
            let invalid = invalid_form(err)?;
            let page = render_progress_form(&state, &user, Some(&invalid)).await?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
    }
}

/// The signed-in trainer, or a redirect for everyone else
async fn trainer_user(state: &PagesState, session: &UserSession) -> Result<Result<UserDetail, Response>, ApiError> {
    Ok(match session_user(state, session).await? {
        Ok(user) if user.is_trainer() => Ok(user),
        Ok(_) => Err(dashboard_redirect()),
        Err(redirect) => Err(redirect),
    })
}

#[tracing::instrument(skip(state, session), fields(trainer = %session.username))]
async fn trainee_page(
    State(state): State<PagesState>,
    Extension(session): Extension<UserSession>,
    Path(username): Path<String>,
) -> Result<Response, ApiError> {
    let trainer = match trainer_user(&state, &session).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    match state.dashboard.trainee_progress(&trainer.username, &username).await? {
        Some(trainee) => Ok(render::trainee_page(&trainer, &trainee).into_response()),
        None => Ok(Redirect::to("/fitness/trainer").into_response()),
    }
}

#[tracing::instrument(skip(state, session), fields(trainer = %session.username))]
async fn recommendation_form(
    State(state): State<PagesState>,
    Extension(session): Extension<UserSession>,
    Path(username): Path<String>,
) -> Result<Response, ApiError> {
    let trainer = match trainer_user(&state, &session).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    match state.dashboard.trainee_progress(&trainer.username, &username).await? {
        Some(trainee) => Ok(render::recommendation_form_page(&trainer, &trainee, None).into_response()),
        None => Ok(Redirect::to("/fitness/trainer").into_response()),
    }
}

#[tracing::instrument(skip(state, session, form), fields(trainer = %session.username))]
async fn recommendation_submit(
    State(state): State<PagesState>,
    Extension(session): Extension<UserSession>,
    Path(username): Path<String>,
    Form(form): Form<RecommendationForm>,
) -> Result<Response, ApiError> {
    let trainer = match trainer_user(&state, &session).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    let Some(trainee) = state.dashboard.trainee_progress(&trainer.username, &username).await? else {
        return Ok(Redirect::to("/fitness/trainer").into_response());
    };

    let payload = form.into_payload(&trainer.username, &trainee.user.username);
    match state.fitness.create_recommendation(payload).await {
        Ok(_) => Ok(Redirect::to(&format!("/fitness/trainer/users/{}/progress", trainee.user.username)).into_response()),
        Err(err) => {
            let invalid = invalid_form(err)?;
            Ok((
                StatusCode::BAD_REQUEST,
                render::recommendation_form_page(&trainer, &trainee, Some(&invalid)),
            )
                .into_response())
        }
    }
}

#[tracing::instrument(skip(state, session), fields(username = %session.username))]
async fn trainer_management_page(
    State(state): State<PagesState>,
    Extension(session): Extension<UserSession>,
) -> Result<Response, ApiError> {
    if !session.is_admin() {
        return Ok(dashboard_redirect());
    }
    let user = match session_user(&state, &session).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    let trainers = state.dashboard.trainer_management().await?;
    Ok(render::trainer_management_page(&user, &trainers).into_response())
}

#[tracing::instrument(skip(state, session), fields(username = %session.username))]
async fn admin_reports_page(
    State(state): State<PagesState>,
    Extension(session): Extension<UserSession>,
) -> Result<Response, ApiError> {
    if !session.is_admin() {
        return Ok(dashboard_redirect());
    }
    let user = match session_user(&state, &session).await? {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    let report = state.dashboard.admin_report().await?;
    Ok(render::admin_reports_page(&user, &report).into_response())
}
