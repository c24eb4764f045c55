use std::collections::HashMap;

use axum::response::Html;

use crate::models::{
    Difficulty, Exercise, ExerciseType, Progress, Record, Routine, UserDetail, ValidationError,
};
use crate::services::dashboard_service::{
    AdminDashboard, AdminReport, ProgressReport, TraineeProgress, TrainerDashboard, TrainerStats,
    UserDashboard,
};

/// Empty exercise rows offered by the routine form
const ROUTINE_FORM_ROWS: usize = 5;

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;background:#f5f6f8;color:#222}\
header{background:#1b3a5c;color:#fff;padding:12px 24px;display:flex;justify-content:space-between}\
header a{color:#fff;margin-left:16px}main{max-width:960px;margin:24px auto;padding:0 16px}\
.cards{display:flex;gap:16px;flex-wrap:wrap}.card{background:#fff;border-radius:8px;padding:16px;flex:1;min-width:160px}\
.card strong{display:block;font-size:2em}table{width:100%;border-collapse:collapse;background:#fff;margin:12px 0}\
td,th{padding:8px;border-bottom:1px solid #ddd;text-align:left}.error{color:#b00020}";

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, user: Option<&UserDetail>, body: &str) -> Html<String> {
    let nav = match user {
        Some(user) => {
            let mut links = String::from(
                "<a href=\"/fitness/dashboard\">Dashboard</a><a href=\"/fitness/routines\">Routines</a>\
                 <a href=\"/fitness/exercises\">Exercises</a><a href=\"/fitness/progress\">Progress</a>\
                 <a href=\"/fitness/reports\">Reports</a>",
            );
            if user.is_trainer() {
                links.push_str("<a href=\"/fitness/trainer\">Trainer</a>");
            }
            if user.role == crate::auth::UserRole::Admin {
                links.push_str("<a href=\"/fitness/admin\">Admin</a>");
            }
            format!(
                "<span>{}</span><nav>{}<a href=\"/logout\">Sign out</a></nav>",
                escape_html(&user.display_name()),
                links
            )
        }
        None => "<span>Campus Fit</span><nav><a href=\"/login\">Sign in</a></nav>".to_string(),
    };

    Html(format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{title} | Campus Fit</title><style>{style}</style></head>\
         <body><header>{nav}</header><main><h1>{title}</h1>{body}</main></body></html>",
        title = escape_html(title),
        style = STYLE,
        nav = nav,
        body = body
    ))
}

fn card(label: &str, value: impl std::fmt::Display) -> String {
    format!("<div class=\"card\"><strong>{}</strong>{}</div>", value, escape_html(label))
}

fn type_label(exercise_type: ExerciseType) -> &'static str {
    match exercise_type {
        ExerciseType::Cardio => "Cardio",
        ExerciseType::Strength => "Strength",
        ExerciseType::Mobility => "Mobility",
    }
}

fn optional<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn routine_table(routines: &[Record<Routine>]) -> String {
    if routines.is_empty() {
        return "<p>No routines yet.</p>".to_string();
    }
    let rows: String = routines
        .iter()
        .map(|record| {
            format!(
                "<tr><td><a href=\"/fitness/routines/{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&record.id),
                escape_html(&record.document.name),
                record.document.exercises.len(),
                if record.document.is_template { "Template" } else { "Personal" },
                record.document.created_at.format("%Y-%m-%d")
            )
        })
        .collect();
    format!(
        "<table><tr><th>Name</th><th>Exercises</th><th>Kind</th><th>Created</th></tr>{}</table>",
        rows
    )
}

fn progress_table(progress: &[Record<Progress>]) -> String {
    if progress.is_empty() {
        return "<p>No progress logged yet.</p>".to_string();
    }
    let rows: String = progress
        .iter()
        .map(|record| {
            let entry = &record.document;
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                entry.date.format("%Y-%m-%d %H:%M"),
                optional(entry.repetitions),
                optional(entry.duration.map(|seconds| format!("{:.0} min", seconds / 60.0))),
                optional(entry.effort_level)
            )
        })
        .collect();
    format!(
        "<table><tr><th>Date</th><th>Repetitions</th><th>Duration</th><th>Effort</th></tr>{}</table>",
        rows
    )
}

pub fn home_page(user: Option<&UserDetail>) -> Html<String> {
    let body = match user {
        Some(user) => format!(
            "<p>Welcome back, {}.</p><p><a href=\"{}\">Go to your dashboard</a></p>",
            escape_html(&user.display_name()),
            user.role.home_path()
        ),
        None => "<p>Track routines, log your workouts and follow your progress.</p>\
                 <p><a href=\"/login\">Sign in</a> to get started.</p>"
            .to_string(),
    };
    layout("Welcome", user, &body)
}

pub fn login_page(username: &str, error: Option<&str>) -> Html<String> {
    let error = error
        .map(|message| format!("<p class=\"error\">{}</p>", escape_html(message)))
        .unwrap_or_default();
    let body = format!(
        "{error}<form method=\"post\" action=\"/login\">\
         <p><label>Username or email<br><input name=\"username\" value=\"{username}\" required></label></p>\
         <p><label>Password<br><input type=\"password\" name=\"password\" required></label></p>\
         <p><button type=\"submit\">Sign in</button></p></form>",
        error = error,
        username = escape_html(username)
    );
    layout("Sign in", None, &body)
}

pub fn dashboard_page(user: &UserDetail, dashboard: &UserDashboard) -> Html<String> {
    let body = format!(
        "<div class=\"cards\">{}{}{}{}</div><h2>Recent routines</h2>{}<h2>Recent progress</h2>{}",
        card("Routines", dashboard.total_routines),
        card("Progress entries", dashboard.total_progress),
        card("Workouts this week", dashboard.weekly_workouts),
        card("Day streak", dashboard.current_streak),
        routine_table(&dashboard.recent_routines),
        progress_table(&dashboard.recent_progress)
    );
    layout("My dashboard", Some(user), &body)
}

pub fn reports_page(user: &UserDetail, report: &ProgressReport) -> Html<String> {
    let weeks: String = report
        .weeks
        .iter()
        .map(|week| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&week.label),
                week.workouts,
                optional(week.avg_effort)
            )
        })
        .collect();

    let types: String = report
        .type_distribution
        .iter()
        .map(|(exercise_type, count)| {
            format!("<tr><td>{}</td><td>{}</td></tr>", type_label(*exercise_type), count)
        })
        .collect();

    let summary = &report.summary;
    let body = format!(
        "<h2>Weekly progress</h2><table><tr><th>Week</th><th>Workouts</th><th>Average effort</th></tr>{weeks}</table>\
         <h2>Exercise types</h2><table><tr><th>Type</th><th>Entries</th></tr>{types}</table>\
         <h2>Activity summary: {period}</h2><div class=\"cards\">{workouts}{minutes}{effort}{routines}</div>",
        weeks = weeks,
        types = types,
        period = escape_html(&summary.period),
        workouts = card("Workouts", summary.total_workouts),
        minutes = card("Minutes", summary.total_minutes),
        effort = card("Average effort", optional(summary.avg_effort)),
        routines = card("Routines completed", summary.routines_completed)
    );
    layout("Reports", Some(user), &body)
}

pub fn trainer_page(user: &UserDetail, dashboard: &TrainerDashboard) -> Html<String> {
    let users = if dashboard.assigned_users_list.is_empty() {
        "<p>No users assigned yet.</p>".to_string()
    } else {
        let items: String = dashboard
            .assigned_users_list
            .iter()
            .map(|username| {
                format!(
                    "<li><a href=\"/fitness/trainer/users/{0}/progress\">{0}</a></li>",
                    escape_html(username)
                )
            })
            .collect();
        format!("<ul>{}</ul>", items)
    };

    let body = format!(
        "<div class=\"cards\">{}{}{}{}</div><h2>Assigned users</h2>{}<h2>My routines</h2>{}",
        card("Assigned users", dashboard.assigned_users),
        card("Routines created", dashboard.total_routines_created),
        card("Recommendations sent", dashboard.total_recommendations),
        card("Pending follow-ups", dashboard.pending_followups),
        users,
        routine_table(&dashboard.trainer_routines)
    );
    layout("Trainer dashboard", Some(user), &body)
}

pub fn admin_page(user: &UserDetail, dashboard: &AdminDashboard) -> Html<String> {
    let body = format!(
        "<div class=\"cards\">{}{}{}{}</div>\
         <p><a href=\"/fitness/admin/trainers\">Trainers</a> | <a href=\"/fitness/admin/reports\">Platform reports</a></p>",
        card("Users", dashboard.total_users),
        card("Trainers", dashboard.total_trainers),
        card("Routines", dashboard.total_routines),
        card("Progress entries", dashboard.total_progress)
    );
    layout("Administration", Some(user), &body)
}

fn difficulty_label(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Low => "Low",
        Difficulty::Medium => "Medium",
        Difficulty::High => "High",
    }
}

fn form_error(error: Option<&ValidationError>) -> String {
    error
        .map(|error| format!("<p class=\"error\">{}</p>", escape_html(&error.to_string())))
        .unwrap_or_default()
}

/// `<option>` list led by an empty choice
fn options<'a>(blank: &str, choices: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    let mut html = format!("<option value=\"\">{}</option>", escape_html(blank));
    for (value, label) in choices {
        html.push_str(&format!(
            "<option value=\"{}\">{}</option>",
            escape_html(value),
            escape_html(label)
        ));
    }
    html
}

pub fn routines_page(user: &UserDetail, routines: &[Record<Routine>]) -> Html<String> {
    let body = format!(
        "<p><a href=\"/fitness/routines/create\">New routine</a></p>{}",
        routine_table(routines)
    );
    layout("Routines", Some(user), &body)
}

pub fn routine_detail_page(
    user: &UserDetail,
    routine: &Record<Routine>,
    exercises: &HashMap<String, Exercise>,
) -> Html<String> {
    let document = &routine.document;
    let rows: String = document
        .exercises
        .iter()
        .map(|entry| {
            let name = exercises
                .get(&entry.exercise_id)
                .map(|exercise| exercise.name.as_str())
                .unwrap_or("Removed exercise");
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(name),
                optional(entry.sets),
                optional(entry.reps),
                optional(entry.rest.map(|seconds| format!("{} s", seconds))),
                optional(entry.duration.map(|minutes| format!("{} min", minutes)))
            )
        })
        .collect();

    let adopted = document
        .adopted_from
        .as_ref()
        .map(|template| {
            format!(
                "<p>Adopted from <a href=\"/fitness/routines/{0}\">{0}</a></p>",
                escape_html(template)
            )
        })
        .unwrap_or_default();

    let body = format!(
        "<p>{description}</p><p>{kind} by {author}, created {created}</p>{adopted}\
         <table><tr><th>Exercise</th><th>Sets</th><th>Reps</th><th>Rest</th><th>Duration</th></tr>{rows}</table>\
         <p><a href=\"/fitness/routines\">Back to routines</a></p>",
        description = escape_html(document.description.as_deref().unwrap_or("")),
        kind = if document.is_template { "Template" } else { "Personal routine" },
        author = escape_html(&document.created_by),
        created = document.created_at.format("%Y-%m-%d"),
        adopted = adopted,
        rows = rows
    );
    layout(&document.name, Some(user), &body)
}

pub fn routine_form_page(
    user: &UserDetail,
    exercises: &[Record<Exercise>],
    error: Option<&ValidationError>,
) -> Html<String> {
    let choices = || {
        options(
            "No exercise",
            exercises
                .iter()
                .map(|record| (record.id.as_str(), record.document.name.as_str())),
        )
    };
    let rows: String = (0..ROUTINE_FORM_ROWS)
        .map(|row| {
            format!(
                "<tr><td><select name=\"exercises[{row}][exercise_id]\">{choices}</select></td>\
                 <td><input type=\"number\" min=\"1\" name=\"exercises[{row}][sets]\"></td>\
                 <td><input type=\"number\" min=\"1\" name=\"exercises[{row}][reps]\"></td>\
                 <td><input type=\"number\" min=\"0\" name=\"exercises[{row}][rest]\"></td></tr>",
                row = row,
                choices = choices()
            )
        })
        .collect();

    let body = format!(
        "{error}<form method=\"post\" action=\"/fitness/routines/create\">\
         <p><label>Name<br><input name=\"name\" maxlength=\"120\" required></label></p>\
         <p><label>Description<br><textarea name=\"description\" rows=\"3\"></textarea></label></p>\
         <p><label><input type=\"checkbox\" name=\"is_template\"> Share as a template</label></p>\
         <table><tr><th>Exercise</th><th>Sets</th><th>Reps</th><th>Rest (s)</th></tr>{rows}</table>\
         <p><button type=\"submit\">Save routine</button></p></form>",
        error = form_error(error),
        rows = rows
    );
    layout("New routine", Some(user), &body)
}

pub fn exercises_page(user: &UserDetail, exercises: &[Record<Exercise>]) -> Html<String> {
    let table = if exercises.is_empty() {
        "<p>No exercises yet.</p>".to_string()
    } else {
        let rows: String = exercises
            .iter()
            .map(|record| {
                let exercise = &record.document;
                format!(
                    "<tr><td><a href=\"/fitness/exercises/{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape_html(&record.id),
                    escape_html(&exercise.name),
                    type_label(exercise.exercise_type),
                    exercise.difficulty.map(difficulty_label).unwrap_or("-"),
                    optional(exercise.duration.map(|minutes| format!("{} min", minutes)))
                )
            })
            .collect();
        format!(
            "<table><tr><th>Name</th><th>Type</th><th>Difficulty</th><th>Duration</th></tr>{}</table>",
            rows
        )
    };
    let body = format!("<p><a href=\"/fitness/exercises/create\">New exercise</a></p>{}", table);
    layout("Exercises", Some(user), &body)
}

pub fn exercise_detail_page(user: &UserDetail, exercise: &Record<Exercise>) -> Html<String> {
    let document = &exercise.document;
    let video = document
        .video_url
        .as_ref()
        .map(|url| format!("<p><a href=\"{0}\">{0}</a></p>", escape_html(url)))
        .unwrap_or_default();
    let body = format!(
        "<p>{description}</p><div class=\"cards\">{kind}{difficulty}{duration}</div>{video}\
         <p><a href=\"/fitness/exercises\">Back to exercises</a></p>",
        description = escape_html(document.description.as_deref().unwrap_or("")),
        kind = card("Type", type_label(document.exercise_type)),
        difficulty = card("Difficulty", document.difficulty.map(difficulty_label).unwrap_or("-")),
        duration = card("Minutes", optional(document.duration)),
        video = video
    );
    layout(&document.name, Some(user), &body)
}

pub fn exercise_form_page(user: &UserDetail, error: Option<&ValidationError>) -> Html<String> {
    let types: String = ExerciseType::ALL
        .iter()
        .map(|t| format!("<option value=\"{}\">{}</option>", t.as_str(), type_label(*t)))
        .collect();
    let difficulties = options(
        "Not set",
        Difficulty::ALL.iter().map(|d| (d.as_str(), difficulty_label(*d))),
    );

    let body = format!(
        "{error}<form method=\"post\" action=\"/fitness/exercises/create\">\
         <p><label>Name<br><input name=\"name\" maxlength=\"100\" required></label></p>\
         <p><label>Type<br><select name=\"type\">{types}</select></label></p>\
         <p><label>Description<br><textarea name=\"description\" rows=\"3\"></textarea></label></p>\
         <p><label>Duration (min)<br><input type=\"number\" step=\"any\" min=\"0\" name=\"duration\"></label></p>\
         <p><label>Difficulty<br><select name=\"difficulty\">{difficulties}</select></label></p>\
         <p><label>Video URL<br><input type=\"url\" name=\"video_url\"></label></p>\
         <p><button type=\"submit\">Save exercise</button></p></form>",
        error = form_error(error),
        types = types,
        difficulties = difficulties
    );
    layout("New exercise", Some(user), &body)
}

pub fn progress_page(user: &UserDetail, progress: &[Record<Progress>]) -> Html<String> {
    let body = format!(
        "<p><a href=\"/fitness/progress/create\">Log a workout</a></p>{}",
        progress_table(progress)
    );
    layout("My progress", Some(user), &body)
}

pub fn progress_form_page(
    user: &UserDetail,
    routines: &[Record<Routine>],
    exercises: &[Record<Exercise>],
    error: Option<&ValidationError>,
) -> Html<String> {
    let routine_choices = options(
        "No routine",
        routines
            .iter()
            .map(|record| (record.id.as_str(), record.document.name.as_str())),
    );
    let exercise_choices = options(
        "No exercise",
        exercises
            .iter()
            .map(|record| (record.id.as_str(), record.document.name.as_str())),
    );

    let body = format!(
        "{error}<form method=\"post\" action=\"/fitness/progress/create\">\
         <p><label>Routine<br><select name=\"routine_id\">{routines}</select></label></p>\
         <p><label>Exercise<br><select name=\"exercise_id\">{exercises}</select></label></p>\
         <p><label>Date<br><input type=\"date\" name=\"date\"></label></p>\
         <p><label>Repetitions<br><input type=\"number\" min=\"0\" name=\"repetitions\"></label></p>\
         <p><label>Duration (min)<br><input type=\"number\" step=\"any\" min=\"0\" name=\"duration\"></label></p>\
         <p><label>Effort (1-10)<br><input type=\"number\" min=\"1\" max=\"10\" name=\"effort_level\" value=\"5\"></label></p>\
         <p><label>Notes<br><textarea name=\"notes\" rows=\"3\"></textarea></label></p>\
         <p><button type=\"submit\">Save</button></p></form>",
        error = form_error(error),
        routines = routine_choices,
        exercises = exercise_choices
    );
    layout("Log a workout", Some(user), &body)
}

fn recommendation_list(trainee: &TraineeProgress) -> String {
    if trainee.recommendations.is_empty() {
        return "<p>No recommendations sent yet.</p>".to_string();
    }
    let items: String = trainee
        .recommendations
        .iter()
        .map(|record| {
            format!(
                "<li>{}: {}</li>",
                record.document.created_at.format("%Y-%m-%d"),
                escape_html(&record.document.message)
            )
        })
        .collect();
    format!("<ul>{}</ul>", items)
}

pub fn trainee_page(user: &UserDetail, trainee: &TraineeProgress) -> Html<String> {
    let totals = &trainee.totals;
    let last_workout = totals
        .last_workout
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());

    let body = format!(
        "<p>{username}</p><div class=\"cards\">{workouts}{effort}{minutes}{last}</div>\
         <p><a href=\"/fitness/trainer/users/{username}/recommend\">Send a recommendation</a></p>\
         <h2>Progress</h2>{progress}<h2>Recommendations</h2>{recommendations}",
        username = escape_html(&trainee.user.username),
        workouts = card("Workouts", totals.total_workouts),
        effort = card("Average effort", optional(totals.avg_effort)),
        minutes = card("Minutes", totals.total_minutes),
        last = card("Last workout", last_workout),
        progress = progress_table(&trainee.progress),
        recommendations = recommendation_list(trainee)
    );
    layout(&trainee.user.display_name(), Some(user), &body)
}

pub fn recommendation_form_page(
    user: &UserDetail,
    trainee: &TraineeProgress,
    error: Option<&ValidationError>,
) -> Html<String> {
    let routines = options(
        "None",
        trainee
            .routines
            .iter()
            .map(|record| (record.id.as_str(), record.document.name.as_str())),
    );
    let labels: Vec<(String, String)> = trainee
        .progress
        .iter()
        .map(|record| (record.id.clone(), record.document.date.format("%Y-%m-%d %H:%M").to_string()))
        .collect();
    let progress = options(
        "None",
        labels.iter().map(|(id, label)| (id.as_str(), label.as_str())),
    );

    let body = format!(
        "{error}<form method=\"post\" action=\"/fitness/trainer/users/{username}/recommend\">\
         <p><label>Message<br><textarea name=\"message\" rows=\"4\" required></textarea></label></p>\
         <p><label>Related routine<br><select name=\"related_routine_id\">{routines}</select></label></p>\
         <p><label>Related progress<br><select name=\"related_progress_id\">{progress}</select></label></p>\
         <p><button type=\"submit\">Send</button></p></form>",
        error = form_error(error),
        username = escape_html(&trainee.user.username),
        routines = routines,
        progress = progress
    );
    layout(
        &format!("Recommendation for {}", trainee.user.display_name()),
        Some(user),
        &body,
    )
}

pub fn trainer_management_page(user: &UserDetail, trainers: &[TrainerStats]) -> Html<String> {
    let table = if trainers.is_empty() {
        "<p>No trainers registered.</p>".to_string()
    } else {
        let rows: String = trainers
            .iter()
            .map(|stats| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape_html(&stats.trainer.display_name()),
                    escape_html(&stats.trainer.username),
                    stats.users_advised,
                    stats.routines_created,
                    stats.recommendations_sent,
                    stats.pending_followups
                )
            })
            .collect();
        format!(
            "<table><tr><th>Name</th><th>Username</th><th>Users</th><th>Routines</th>\
             <th>Recommendations</th><th>Pending follow-ups</th></tr>{}</table>",
            rows
        )
    };
    layout("Trainers", Some(user), &table)
}

pub fn admin_reports_page(user: &UserDetail, report: &AdminReport) -> Html<String> {
    let months: String = report
        .platform_usage
        .iter()
        .map(|month| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&month.label),
                month.active_users,
                month.workouts
            )
        })
        .collect();
    let roles: String = report
        .activity_by_role
        .iter()
        .map(|(group, count)| format!("<tr><td>{}</td><td>{}</td></tr>", group, count))
        .collect();
    let stats: String = report
        .general_stats
        .iter()
        .map(|stat| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                stat.metric,
                stat.value,
                optional(stat.change.map(|change| format!("+{}%", change)))
            )
        })
        .collect();

    let body = format!(
        "<h2>Platform usage</h2><table><tr><th>Month</th><th>Active users</th><th>Workouts</th></tr>{months}</table>\
         <h2>Activity by role</h2><table><tr><th>Group</th><th>Entries</th></tr>{roles}</table>\
         <h2>General statistics</h2><table><tr><th>Metric</th><th>Value</th><th>This month</th></tr>{stats}</table>",
        months = months,
        roles = roles,
        stats = stats
    );
    layout("Platform reports", Some(user), &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserRole;
    use crate::services::dashboard_service::GeneralStat;
    use crate::services::fitness_stats::MonthBucket;
    use chrono::Utc;

    fn member() -> UserDetail {
        UserDetail {
            username: "laura".to_string(),
            role: UserRole::Student,
            is_active: true,
            is_staff: false,
            created_at: Utc::now(),
            student: None,
            student_details: None,
            employee: None,
            employee_details: None,
        }
    }

    fn exercise(id: &str, name: &str) -> Record<Exercise> {
        Record {
            id: id.to_string(),
            document: Exercise {
                name: name.to_string(),
                exercise_type: ExerciseType::Strength,
                description: None,
                duration: None,
                difficulty: Some(Difficulty::Medium),
                video_url: None,
                created_by: "system".to_string(),
                created_at: Utc::now(),
            },
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#x27;x&#x27;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_login_page_escapes_username_and_shows_error() {
        let Html(page) = login_page("<b>eve</b>", Some("Invalid credentials"));

        assert!(page.contains("&lt;b&gt;eve&lt;/b&gt;"));
        assert!(page.contains("Invalid credentials"));
        assert!(!page.contains("<b>eve</b>"));
    }

    #[test]
    fn test_home_page_for_visitors_links_to_login() {
        let Html(page) = home_page(None);
        assert!(page.contains("href=\"/login\""));
    }

    #[test]
    fn test_routine_form_lists_exercises_and_shows_error() {
        let exercises = vec![exercise("ex-1", "Sentadillas <Basicas>")];
        let error = ValidationError::new("exercises", "Add at least one exercise to the routine");
        let Html(page) = routine_form_page(&member(), &exercises, Some(&error));

        assert!(page.contains("name=\"exercises[0][exercise_id]\""));
        assert!(page.contains(&format!("name=\"exercises[{}][rest]\"", ROUTINE_FORM_ROWS - 1)));
        assert!(page.contains("<option value=\"ex-1\">Sentadillas &lt;Basicas&gt;</option>"));
        assert!(page.contains("exercises: Add at least one exercise to the routine"));
    }

    #[test]
    fn test_routine_detail_names_removed_exercises() {
        let routine = Record {
            id: "r-1".to_string(),
            document: Routine {
                name: "Full body".to_string(),
                description: None,
                exercises: vec![
                    crate::models::RoutineExercise {
                        exercise_id: "ex-1".to_string(),
                        sets: Some(3),
                        reps: Some(12),
                        rest: Some(60),
                        duration: None,
                    },
                    crate::models::RoutineExercise {
                        exercise_id: "gone".to_string(),
                        sets: None,
                        reps: None,
                        rest: None,
                        duration: None,
                    },
                ],
                created_by: "trainer".to_string(),
                is_template: true,
                adopted_from: None,
                user_id: None,
                created_at: Utc::now(),
            },
        };
        let mut exercises = HashMap::new();
        let known = exercise("ex-1", "Burpees");
        exercises.insert(known.id, known.document);

        let Html(page) = routine_detail_page(&member(), &routine, &exercises);

        assert!(page.contains("<td>Burpees</td><td>3</td><td>12</td><td>60 s</td>"));
        assert!(page.contains("Removed exercise"));
        assert!(page.contains("Template by trainer"));
    }

    #[test]
    fn test_admin_reports_page_shows_growth() {
        let report = AdminReport {
            platform_usage: vec![MonthBucket {
                label: "Oct 2024".to_string(),
                active_users: 4,
                workouts: 9,
            }],
            activity_by_role: vec![("Students", 7), ("Employees", 0), ("Trainers", 2)],
            general_stats: vec![
                GeneralStat {
                    metric: "Routines created",
                    value: 12,
                    change: Some(20.0),
                },
                GeneralStat {
                    metric: "Progress entries",
                    value: 3,
                    change: None,
                },
            ],
        };
        let Html(page) = admin_reports_page(&member(), &report);

        assert!(page.contains("<td>Oct 2024</td><td>4</td><td>9</td>"));
        assert!(page.contains("<td>Students</td><td>7</td>"));
        assert!(page.contains("<td>Routines created</td><td>12</td><td>+20%</td>"));
        assert!(page.contains("<td>Progress entries</td><td>3</td><td>-</td>"));
    }
}
