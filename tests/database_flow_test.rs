mod common;

use assert_matches::assert_matches;
use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sqlx::PgPool;

use campus_fit::api::routes::{create_app, App};
use common::{login, page, page_login, seeded_database, send, test_config, unique};

/// Runs every database scenario against one seeded database, in order
#[tokio::test]
async fn test_complete_campus_fit_flow() {
    let Some(pool) = seeded_database().await else {
        return;
    };
    let app = create_app(pool.clone(), pool.clone(), &test_config());
    let admin = login(&app, "admin", "admin12345").await;

    trailing_slash_is_accepted(&app, &admin).await;
    location_create_then_read(&app, &admin).await;
    lookups_create_then_read(&app, &admin).await;
    academic_catalog_create_then_read(&app, &admin, &pool).await;
    let student = student_create_then_read(&app, &admin, &pool).await;
    duplicate_enrollment_is_rejected(&app, &admin, &student).await;
    user_role_exclusivity(&app, &admin, &student).await;
    sessions_follow_account_changes(&app, &admin, &pool).await;
    exercise_create_then_read(&app, &admin).await;
    routine_rejects_unknown_exercises(&app, &admin).await;
    progress_and_coaching_create_then_read(&app, &admin).await;
    routine_adoption_copies_the_template(&app, &admin).await;
    non_admins_cannot_manage_users(&app).await;
    dashboard_page_uses_the_session_cookie(&app).await;
    fitness_pages_create_documents(&app, &admin).await;
    trainer_pages_send_recommendations(&app, &admin).await;
    admin_pages_are_for_admins(&app).await;
    logout_revokes_the_token(&app).await;
}

async fn trailing_slash_is_accepted(app: &App, token: &str) {
    let (status, countries) = send(app, Method::GET, "/api/locations/countries/", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_matches!(countries, Value::Array(ref list) if !list.is_empty());
}

async fn location_create_then_read(app: &App, token: &str) {
    let name = unique("Pais ");
    let (status, created) = send(
        app,
        Method::POST,
        "/api/locations/countries",
        Some(token),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/locations/countries/{}", created["code"]);
    let (status, fetched) = send(app, Method::GET, &uri, Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, _) = send(app, Method::DELETE, &uri, Some(token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(app, Method::GET, &uri, Some(token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn student_create_then_read(app: &App, token: &str, pool: &PgPool) -> String {
    let (campus, city): (i32, i32) =
        sqlx::query_as("SELECT code, city_code FROM campuses WHERE name = 'Campus Cali'")
            .fetch_one(pool)
            .await
            .unwrap();
    let id = unique("9");

    let (status, created) = send(
        app,
        Method::POST,
        "/api/accounts/students",
        Some(token),
        Some(json!({
            "id": id,
            "first_name": "Sofia",
            "last_name": "Vargas",
            "email": format!("{}@campus.edu.co", id),
            "birth_date": "2003-05-20",
            "birth_place": city,
            "campus": campus,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["id"], id.as_str());

    let (status, fetched) = send(
        app,
        Method::GET,
        &format!("/api/accounts/students/{}", id),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    id
}

async fn duplicate_enrollment_is_rejected(app: &App, token: &str, student: &str) {
    let enrollment = json!({ "student": student, "group": "50101", "status": "Activo" });

    let (status, created) = send(
        app,
        Method::POST,
        "/api/academics/enrollments",
        Some(token),
        Some(enrollment.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert!(created["enrollment_date"].is_string());

    let (status, body) = send(
        app,
        Method::POST,
        "/api/academics/enrollments",
        Some(token),
        Some(enrollment),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

async fn user_role_exclusivity(app: &App, token: &str, student: &str) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/accounts/users",
        Some(token),
        Some(json!({
            "username": unique("both"),
            "password": "secret123",
            "role": "STUDENT",
            "student": student,
            "employee": "2002",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "non_field_errors");

    let (status, body) = send(
        app,
        Method::POST,
        "/api/accounts/users",
        Some(token),
        Some(json!({
            "username": unique("adm"),
            "password": "secret123",
            "role": "ADMIN",
            "employee": "2001",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "role");

    let username = unique("stu");
    let (status, created) = send(
        app,
        Method::POST,
        "/api/accounts/users",
        Some(token),
        Some(json!({
            "username": username,
            "password": "secret123",
            "role": "STUDENT",
            "student": student,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["role"], "STUDENT");
    assert!(created.get("password_hash").is_none());

    let user_token = login(app, &username, "secret123").await;
    let (status, me) = send(app, Method::GET, "/api/accounts/me", Some(&user_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], username.as_str());
}

async fn routine_adoption_copies_the_template(app: &App, token: &str) {
    let (status, templates) = send(
        app,
        Method::GET,
        "/api/fitness/routines?is_template=true",
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let templates = templates.as_array().cloned().unwrap();
    assert!(templates.iter().all(|routine| routine["is_template"] == true));
    let template = templates.first().cloned().unwrap();
    let template_id = template["id"].as_str().unwrap();

    let (status, adopted) = send(
        app,
        Method::POST,
        &format!("/api/fitness/routines/{}/adopt", template_id),
        Some(token),
        Some(json!({ "user_id": "student" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", adopted);
    assert_ne!(adopted["id"], template["id"]);
    assert_eq!(adopted["is_template"], false);
    assert_eq!(adopted["adopted_from"], template_id);
    assert_eq!(adopted["user_id"], "student");
    assert_eq!(adopted["exercises"], template["exercises"]);

    let (status, _) = send(
        app,
        Method::POST,
        &format!("/api/fitness/routines/{}/adopt", adopted["id"].as_str().unwrap()),
        Some(token),
        Some(json!({ "user_id": "student" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        app,
        Method::POST,
        "/api/fitness/routines/missing/adopt",
        Some(token),
        Some(json!({ "user_id": "student" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn non_admins_cannot_manage_users(app: &App) {
    let trainer = login(app, "trainer", "trainer123").await;

    let (status, _) = send(app, Method::GET, "/api/accounts/users", Some(&trainer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, exercises) = send(app, Method::GET, "/api/fitness/exercises", Some(&trainer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_matches!(exercises, Value::Array(ref list) if !list.is_empty());
}

async fn dashboard_page_uses_the_session_cookie(app: &App) {
    let cookie = page_login(app, "student", "student123").await;

    let dashboard = page(app, "/fitness/dashboard", Some(&cookie), None).await;
    assert_eq!(dashboard.status, StatusCode::OK);

    let admin = page(app, "/fitness/admin", Some(&cookie), None).await;
    assert!(admin.status.is_redirection());
    assert_eq!(admin.location.as_deref(), Some("/fitness/dashboard"));
}

async fn logout_revokes_the_token(app: &App) {
    let token = login(app, "trainer", "trainer123").await;

    let (status, _) = send(app, Method::POST, "/api/accounts/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(app, Method::GET, "/api/accounts/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

async fn lookups_create_then_read(app: &App, token: &str) {
    for table in ["contract-types", "employee-types"] {
        let name = unique("Tipo");
        let (status, created) = send(
            app,
            Method::POST,
            &format!("/api/human-resources/{}", table),
            Some(token),
            Some(json!({ "name": name })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", created);

        let uri = format!("/api/human-resources/{}/{}", table, name);
        let (status, fetched) = send(app, Method::GET, &uri, Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, _) = send(app, Method::DELETE, &uri, Some(token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}

async fn academic_catalog_create_then_read(app: &App, token: &str, pool: &PgPool) {
    let area: i32 = sqlx::query_scalar("SELECT code FROM areas WHERE name = 'Bienestar Universitario'")
        .fetch_one(pool)
        .await
        .unwrap();

    let (status, program) = send(
        app,
        Method::POST,
        "/api/academics/programs",
        Some(token),
        Some(json!({ "name": unique("Programa "), "area": area })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", program);
    let (status, fetched) = send(
        app,
        Method::GET,
        &format!("/api/academics/programs/{}", program["code"]),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, program);

    let code = unique("SB");
    let (status, subject) = send(
        app,
        Method::POST,
        "/api/academics/subjects",
        Some(token),
        Some(json!({ "code": code, "name": "Natacion", "program": program["code"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", subject);
    let (status, fetched) = send(
        app,
        Method::GET,
        &format!("/api/academics/subjects/{}", code),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, subject);

    let nrc = unique("N");
    let semester = unique("");
    let (status, group) = send(
        app,
        Method::POST,
        "/api/academics/groups",
        Some(token),
        Some(json!({
            "nrc": nrc,
            "number": 1,
            "semester": semester,
            "subject": code,
            "professor": "2001",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", group);
    assert_eq!(group["professor_name"], "Carlos Mejia");
    let (status, fetched) = send(
        app,
        Method::GET,
        &format!("/api/academics/groups/{}", nrc),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, group);

    let (status, by_semester) = send(
        app,
        Method::GET,
        &format!("/api/academics/groups?semester={}", semester),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_semester, json!([group]));
}

/// Account changes apply to tokens already handed out
async fn sessions_follow_account_changes(app: &App, admin: &str, pool: &PgPool) {
    let create_admin = |username: String| async move {
        let (status, created) = send(
            app,
            Method::POST,
            "/api/accounts/users",
            Some(admin),
            Some(json!({ "username": username, "password": "secret123", "role": "ADMIN" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", created);
        login(app, &username, "secret123").await
    };

    let deactivated = unique("ops");
    let token = create_admin(deactivated.clone()).await;
    let (status, _) = send(app, Method::GET, "/api/accounts/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, updated) = send(
        app,
        Method::PUT,
        &format!("/api/accounts/users/{}", deactivated),
        Some(admin),
        Some(json!({ "username": deactivated, "role": "ADMIN", "is_active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", updated);
    assert_eq!(updated["is_active"], false);

    let (status, _) = send(app, Method::GET, "/api/accounts/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(
        app,
        Method::POST,
        "/api/accounts/login",
        None,
        Some(json!({ "username": deactivated, "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let demoted = unique("ops");
    let token = create_admin(demoted.clone()).await;
    let student = student_create_then_read(app, admin, pool).await;
    let (status, updated) = send(
        app,
        Method::PUT,
        &format!("/api/accounts/users/{}", demoted),
        Some(admin),
        Some(json!({ "username": demoted, "role": "STUDENT", "student": student })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", updated);

    let (status, _) = send(app, Method::GET, "/api/accounts/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, me) = send(app, Method::GET, "/api/accounts/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "STUDENT");

    let (status, body) = send(
        app,
        Method::PUT,
        &format!("/api/accounts/users/{}", demoted),
        Some(admin),
        Some(json!({ "username": unique("renamed"), "role": "STUDENT", "student": student })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "username");
}

async fn exercise_create_then_read(app: &App, token: &str) {
    let (status, created) = send(
        app,
        Method::POST,
        "/api/fitness/exercises",
        Some(token),
        Some(json!({
            "name": unique("Remo "),
            "type": "fuerza",
            "difficulty": "media",
            "duration": 8.0,
            "created_by": "trainer",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    let id = created["id"].as_str().unwrap();

    let (status, fetched) = send(
        app,
        Method::GET,
        &format!("/api/fitness/exercises/{}", id),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, strength) = send(app, Method::GET, "/api/fitness/exercises?type=fuerza", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    let strength = strength.as_array().cloned().unwrap();
    assert!(strength.iter().all(|exercise| exercise["type"] == "fuerza"));
    assert!(strength.iter().any(|exercise| exercise["id"] == id));
}

async fn routine_rejects_unknown_exercises(app: &App, token: &str) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/fitness/routines",
        Some(token),
        Some(json!({
            "name": "Rutina fantasma",
            "created_by": "admin",
            "exercises": [{ "exercise_id": "does-not-exist", "sets": 3 }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "exercises[0].exercise_id");
}

async fn progress_and_coaching_create_then_read(app: &App, token: &str) {
    let runner = unique("runner");
    let mut ids = Vec::new();
    for date in ["2024-03-01T08:00:00Z", "2024-05-01T08:00:00Z", "2024-04-01T08:00:00Z"] {
        let (status, created) = send(
            app,
            Method::POST,
            "/api/fitness/progress",
            Some(token),
            Some(json!({ "user_id": runner, "date": date, "effort_level": 6, "duration": 1200.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", created);
        ids.push(created["id"].as_str().unwrap().to_string());
    }

    let (status, fetched) = send(
        app,
        Method::GET,
        &format!("/api/fitness/progress/{}", ids[0]),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["user_id"], runner.as_str());

    let (status, listed) = send(
        app,
        Method::GET,
        &format!("/api/fitness/progress?user_id={}", runner),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let dates: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry["date"].as_str())
        .map(|date| &date[..10])
        .collect();
    assert_eq!(dates, vec!["2024-05-01", "2024-04-01", "2024-03-01"]);

    let (status, recommendation) = send(
        app,
        Method::POST,
        "/api/fitness/recommendations",
        Some(token),
        Some(json!({
            "trainer_id": "trainer",
            "user_id": runner,
            "message": "Sube la intensidad",
            "related_progress_id": ids[1],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", recommendation);
    let (status, fetched) = send(
        app,
        Method::GET,
        &format!("/api/fitness/recommendations/{}", recommendation["id"].as_str().unwrap()),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, recommendation);

    let (status, followup) = send(
        app,
        Method::POST,
        "/api/fitness/followups",
        Some(token),
        Some(json!({ "trainer_id": "trainer", "user_id": runner, "progress_id": ids[1] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", followup);
    let (status, listed) = send(
        app,
        Method::GET,
        &format!("/api/fitness/followups?trainer_id=trainer&user_id={}", runner),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([followup]));
}

async fn fitness_pages_create_documents(app: &App, token: &str) {
    let cookie = page_login(app, "student", "student123").await;
    let (_, exercises) = send(app, Method::GET, "/api/fitness/exercises", Some(token), None).await;
    let exercise_id = exercises[0]["id"].as_str().unwrap().to_string();

    let name = unique("Rutina ");
    let form = format!(
        "name={}&description=&exercises%5B0%5D%5Bexercise_id%5D=&exercises%5B1%5D%5Bexercise_id%5D={}&exercises%5B1%5D%5Bsets%5D=3",
        name.replace(' ', "+"),
        exercise_id
    );
    let created = page(app, "/fitness/routines/create", Some(&cookie), Some(&form)).await;
    assert_eq!(created.status, StatusCode::SEE_OTHER);
    let detail_uri = created.location.unwrap();
    assert!(detail_uri.starts_with("/fitness/routines/"));

    let detail = page(app, &detail_uri, Some(&cookie), None).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert!(detail.html.contains(&name));

    let list = page(app, "/fitness/routines/", Some(&cookie), None).await;
    assert_eq!(list.status, StatusCode::OK);
    assert!(list.html.contains(&name));
    assert!(list.html.contains("Rutina de Iniciacion"));

    let rejected = page(
        app,
        "/fitness/routines/create",
        Some(&cookie),
        Some("name=Vacia&exercises%5B0%5D%5Bexercise_id%5D="),
    )
    .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    assert!(rejected.html.contains("Add at least one exercise"));

    let exercise = unique("Trote");
    let created = page(
        app,
        "/fitness/exercises/create",
        Some(&cookie),
        Some(&format!("name={}&type=cardio&difficulty=baja&duration=20", exercise)),
    )
    .await;
    assert_eq!(created.location.as_deref(), Some("/fitness/exercises"));
    let list = page(app, "/fitness/exercises", Some(&cookie), None).await;
    assert!(list.html.contains(&exercise));

    let logged = page(
        app,
        "/fitness/progress/create",
        Some(&cookie),
        Some(&format!("exercise_id={}&date=2024-06-15&repetitions=15&duration=25&notes=", exercise_id)),
    )
    .await;
    assert_eq!(logged.location.as_deref(), Some("/fitness/progress"));
    let list = page(app, "/fitness/progress", Some(&cookie), None).await;
    assert!(list.html.contains("2024-06-15"));

    let rejected = page(
        app,
        "/fitness/progress/create",
        Some(&cookie),
        Some("effort_level=11"),
    )
    .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    assert!(rejected.html.contains("effort_level"));
}

async fn trainer_pages_send_recommendations(app: &App, token: &str) {
    let trainer = page_login(app, "trainer", "trainer123").await;

    let progress = page(app, "/fitness/trainer/users/student/progress", Some(&trainer), None).await;
    assert_eq!(progress.status, StatusCode::OK);
    assert!(progress.html.contains("Laura Gomez"));

    let message = unique("Descansa ");
    let sent = page(
        app,
        "/fitness/trainer/users/student/recommend",
        Some(&trainer),
        Some(&format!("message={}&related_routine_id=&related_progress_id=", message.replace(' ', "+"))),
    )
    .await;
    assert_eq!(sent.location.as_deref(), Some("/fitness/trainer/users/student/progress"));

    let (status, sent) = send(
        app,
        Method::GET,
        "/api/fitness/recommendations?trainer_id=trainer&user_id=student",
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(sent.as_array().unwrap().iter().any(|r| r["message"] == message.as_str()));

    let blank = page(
        app,
        "/fitness/trainer/users/student/recommend",
        Some(&trainer),
        Some("message=+"),
    )
    .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);

    let student = page_login(app, "student", "student123").await;
    let denied = page(app, "/fitness/trainer/users/student/progress", Some(&student), None).await;
    assert_eq!(denied.location.as_deref(), Some("/fitness/dashboard"));
}

async fn admin_pages_are_for_admins(app: &App) {
    let admin = page_login(app, "admin", "admin12345").await;

    let trainers = page(app, "/fitness/admin/trainers", Some(&admin), None).await;
    assert_eq!(trainers.status, StatusCode::OK);
    assert!(trainers.html.contains("Diana Lopez"));

    let reports = page(app, "/fitness/admin/reports", Some(&admin), None).await;
    assert_eq!(reports.status, StatusCode::OK);
    assert!(reports.html.contains("Registered users"));

    let trainer = page_login(app, "trainer", "trainer123").await;
    let denied = page(app, "/fitness/admin/reports", Some(&trainer), None).await;
    assert_eq!(denied.location.as_deref(), Some("/fitness/dashboard"));
}
