// HTML form bodies for the server-rendered fitness pages. Browsers send
// every input as text, so blank fields mean "not given".

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;

use crate::models::{
    Difficulty, ExercisePayload, ExerciseType, ProgressPayload, RecommendationPayload,
    RoutineExercise, RoutinePayload, ValidationError,
};

const DEFAULT_EFFORT: i32 = 5;

fn blank_to_none(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn number<T: FromStr>(field: &str, value: &str) -> Result<Option<T>, ValidationError> {
    match value.trim() {
        "" => Ok(None),
        text => text
            .parse()
            .map(Some)
            .map_err(|_| ValidationError::new(field, "Enter a valid number")),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExerciseForm {
    pub name: String,
    #[serde(rename = "type")]
    pub exercise_type: String,
    pub description: String,
    pub duration: String,
    pub difficulty: String,
    pub video_url: String,
}

impl ExerciseForm {
    pub fn into_payload(self, created_by: &str) -> Result<ExercisePayload, ValidationError> {
        let exercise_type = ExerciseType::parse(self.exercise_type.trim())
            .ok_or_else(|| ValidationError::new("type", "Select a valid exercise type"))?;
        let difficulty = match self.difficulty.trim() {
            "" => None,
            value => Some(
                Difficulty::parse(value)
                    .ok_or_else(|| ValidationError::new("difficulty", "Select a valid difficulty"))?,
            ),
        };

        Ok(ExercisePayload {
            name: self.name.trim().to_string(),
            exercise_type,
            description: blank_to_none(&self.description),
            duration: number("duration", &self.duration)?,
            difficulty,
            video_url: blank_to_none(&self.video_url),
            created_by: Some(created_by.to_string()),
        })
    }
}

/// Routine form. Exercise rows arrive as `exercises[<row>][<field>]` inputs.
#[derive(Debug, Default, PartialEq)]
pub struct RoutineForm {
    pub name: String,
    pub description: String,
    pub is_template: bool,
    pub exercises: Vec<RoutineExercise>,
}

impl RoutineForm {
    pub fn from_fields(fields: &[(String, String)]) -> Result<Self, ValidationError> {
        let mut form = RoutineForm::default();
        let mut rows: BTreeMap<u32, BTreeMap<&str, &str>> = BTreeMap::new();

        for (key, value) in fields {
            match key.as_str() {
                "name" => form.name = value.clone(),
                "description" => form.description = value.clone(),
                "is_template" => form.is_template = value == "on" || value == "true",
                _ => {
                    if let Some((row, field)) = exercise_row_key(key) {
                        rows.entry(row).or_default().insert(field, value.as_str());
                    }
                }
            }
        }

        for row in rows.values() {
            let exercise_id = row.get("exercise_id").copied().unwrap_or_default().trim();
            if exercise_id.is_empty() {
                continue;
            }
            let index = form.exercises.len();
            let field = |name: &str| format!("exercises[{}].{}", index, name);
            let value = |name: &str| row.get(name).copied().unwrap_or_default();

            form.exercises.push(RoutineExercise {
                exercise_id: exercise_id.to_string(),
                sets: number(&field("sets"), value("sets"))?,
                reps: number(&field("reps"), value("reps"))?,
                rest: number(&field("rest"), value("rest"))?,
                duration: number(&field("duration"), value("duration"))?,
            });
        }

        if form.exercises.is_empty() {
            return Err(ValidationError::new(
                "exercises",
                "Add at least one exercise to the routine",
            ));
        }
        Ok(form)
    }

    /// Routines built from the page belong to the signed-in user
    pub fn into_payload(self, username: &str) -> RoutinePayload {
        RoutinePayload {
            name: self.name.trim().to_string(),
            description: blank_to_none(&self.description),
            exercises: self.exercises,
            created_by: username.to_string(),
            is_template: self.is_template,
            adopted_from: None,
            user_id: Some(username.to_string()),
        }
    }
}

/// Splits `exercises[3][reps]` into `(3, "reps")`
fn exercise_row_key(key: &str) -> Option<(u32, &str)> {
    let rest = key.strip_prefix("exercises[")?;
    let (row, rest) = rest.split_once("][")?;
    let field = rest.strip_suffix(']')?;
    Some((row.parse().ok()?, field))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProgressForm {
    pub routine_id: String,
    pub exercise_id: String,
    pub date: String,
    pub repetitions: String,
    /// Minutes
    pub duration: String,
    pub effort_level: String,
    pub notes: String,
}

impl ProgressForm {
    pub fn into_payload(self, username: &str) -> Result<ProgressPayload, ValidationError> {
        let date = match self.date.trim() {
            "" => None,
            value => {
                let day = NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .map_err(|_| ValidationError::new("date", "Enter a valid date"))?;
                let midnight = day
                    .and_hms_opt(0, 0, 0)
                    .ok_or_else(|| ValidationError::new("date", "Enter a valid date"))?;
                Some(Utc.from_utc_datetime(&midnight))
            }
        };
        let minutes: Option<f64> = number("duration", &self.duration)?;

        Ok(ProgressPayload {
            user_id: username.to_string(),
            routine_id: blank_to_none(&self.routine_id),
            exercise_id: blank_to_none(&self.exercise_id),
            date,
            repetitions: number("repetitions", &self.repetitions)?,
            duration: minutes.map(|minutes| minutes * 60.0),
            effort_level: Some(number("effort_level", &self.effort_level)?.unwrap_or(DEFAULT_EFFORT)),
            notes: blank_to_none(&self.notes),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecommendationForm {
    pub message: String,
    pub related_routine_id: String,
    pub related_progress_id: String,
}

impl RecommendationForm {
    pub fn into_payload(self, trainer: &str, username: &str) -> RecommendationPayload {
        RecommendationPayload {
            trainer_id: trainer.to_string(),
            user_id: username.to_string(),
            message: self.message.trim().to_string(),
            related_progress_id: blank_to_none(&self.related_progress_id),
            related_routine_id: blank_to_none(&self.related_routine_id),
        }
    }
}
