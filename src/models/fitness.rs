use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{
    validate_max_len, validate_range, validate_text, validate_url, ValidationError,
    ValidationResult,
};

/// A document stored in one of the fitness collections
pub trait Document: Serialize + serde::de::DeserializeOwned + Send + Sync + Unpin + 'static {
    /// Collection name, also the suffix of its backing table
    const COLLECTION: &'static str;
    /// Fields indexed for filtering
    const INDEXES: &'static [&'static str];
    /// Timestamp field lists are ordered by, newest first
    const ORDER_FIELD: &'static str = "created_at";
}

/// A stored document together with its identifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record<D> {
    pub id: String,
    #[serde(flatten)]
    pub document: D,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    Cardio,
    #[serde(rename = "fuerza")]
    Strength,
    #[serde(rename = "movilidad")]
    Mobility,
}

impl ExerciseType {
    pub const ALL: [ExerciseType; 3] = [
        ExerciseType::Cardio,
        ExerciseType::Strength,
        ExerciseType::Mobility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseType::Cardio => "cardio",
            ExerciseType::Strength => "fuerza",
            ExerciseType::Mobility => "movilidad",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Difficulty {
    #[serde(rename = "baja")]
    Low,
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "alta")]
    High,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Low, Difficulty::Medium, Difficulty::High];

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Low => "baja",
            Difficulty::Medium => "media",
            Difficulty::High => "alta",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub name: String,
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
    pub description: Option<String>,
    /// Minutes
    pub duration: Option<f64>,
    pub difficulty: Option<Difficulty>,
    pub video_url: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Document for Exercise {
    const COLLECTION: &'static str = "exercises";
    const INDEXES: &'static [&'static str] = &["difficulty", "type", "created_by"];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExercisePayload {
    pub name: String,
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
    pub description: Option<String>,
    pub duration: Option<f64>,
    pub difficulty: Option<Difficulty>,
    pub video_url: Option<String>,
    pub created_by: Option<String>,
}

impl ExercisePayload {
    pub fn validate(&self) -> ValidationResult {
        validate_text("name", &self.name, 100)?;
        if let Some(duration) = self.duration {
            validate_range("duration", duration, Some(0.0), None)?;
        }
        match self.video_url.as_deref() {
            Some(url) if !url.is_empty() => validate_url("video_url", url),
            _ => Ok(()),
        }
    }

    pub fn into_document(self, created_at: DateTime<Utc>) -> Exercise {
        Exercise {
            name: self.name,
            exercise_type: self.exercise_type,
            description: self.description,
            duration: self.duration,
            difficulty: self.difficulty,
            video_url: self.video_url.filter(|url| !url.is_empty()),
            created_by: self
                .created_by
                .filter(|creator| !creator.is_empty())
                .unwrap_or_else(|| "system".to_string()),
            created_at,
        }
    }
}

/// Exercise configuration embedded in a routine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutineExercise {
    pub exercise_id: String,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    /// Seconds between sets
    pub rest: Option<i32>,
    /// Used by cardio exercises
    pub duration: Option<f64>,
}

impl RoutineExercise {
    fn validate(&self, index: usize) -> ValidationResult {
        let field = |name: &str| format!("exercises[{}].{}", index, name);

        if self.exercise_id.trim().is_empty() {
            return Err(ValidationError::new(&field("exercise_id"), "This field is required"));
        }
        if let Some(sets) = self.sets {
            validate_range(&field("sets"), sets, Some(1), None)?;
        }
        if let Some(reps) = self.reps {
            validate_range(&field("reps"), reps, Some(1), None)?;
        }
        if let Some(rest) = self.rest {
            validate_range(&field("rest"), rest, Some(0), None)?;
        }
        if let Some(duration) = self.duration {
            validate_range(&field("duration"), duration, Some(0.0), None)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Routine {
    pub name: String,
    pub description: Option<String>,
    pub exercises: Vec<RoutineExercise>,
    pub created_by: String,
    pub is_template: bool,
    pub adopted_from: Option<String>,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Document for Routine {
    const COLLECTION: &'static str = "routines";
    const INDEXES: &'static [&'static str] = &["created_by", "user_id", "is_template"];
}

impl Routine {
    /// Personal copy of a template routine for `user_id`
    pub fn adopt(&self, template_id: &str, user_id: &str, now: DateTime<Utc>) -> Routine {
        Routine {
            name: self.name.clone(),
            description: self.description.clone(),
            exercises: self.exercises.clone(),
            created_by: user_id.to_string(),
            is_template: false,
            adopted_from: Some(template_id.to_string()),
            user_id: Some(user_id.to_string()),
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutinePayload {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub exercises: Vec<RoutineExercise>,
    pub created_by: String,
    #[serde(default)]
    pub is_template: bool,
    pub adopted_from: Option<String>,
    pub user_id: Option<String>,
}

impl RoutinePayload {
    pub fn validate(&self) -> ValidationResult {
        validate_text("name", &self.name, 120)?;
        validate_text("created_by", &self.created_by, 50)?;
        for (index, exercise) in self.exercises.iter().enumerate() {
            exercise.validate(index)?;
        }
        Ok(())
    }

    pub fn into_document(self, created_at: DateTime<Utc>) -> Routine {
        Routine {
            name: self.name,
            description: self.description,
            exercises: self.exercises,
            created_by: self.created_by,
            is_template: self.is_template,
            adopted_from: self.adopted_from,
            user_id: self.user_id,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdoptRoutineRequest {
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Progress {
    pub user_id: String,
    pub routine_id: Option<String>,
    pub exercise_id: Option<String>,
    pub date: DateTime<Utc>,
    pub repetitions: Option<i32>,
    /// Seconds
    pub duration: Option<f64>,
    /// 1-10 scale
    pub effort_level: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Document for Progress {
    const COLLECTION: &'static str = "progress";
    const INDEXES: &'static [&'static str] = &["user_id", "routine_id", "date"];
    const ORDER_FIELD: &'static str = "date";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressPayload {
    pub user_id: String,
    pub routine_id: Option<String>,
    pub exercise_id: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub repetitions: Option<i32>,
    pub duration: Option<f64>,
    pub effort_level: Option<i32>,
    pub notes: Option<String>,
}

impl ProgressPayload {
    pub fn validate(&self) -> ValidationResult {
        validate_text("user_id", &self.user_id, 50)?;
        if let Some(repetitions) = self.repetitions {
            validate_range("repetitions", repetitions, Some(0), None)?;
        }
        if let Some(duration) = self.duration {
            validate_range("duration", duration, Some(0.0), None)?;
        }
        if let Some(effort) = self.effort_level {
            validate_range("effort_level", effort, Some(1), Some(10))?;
        }
        Ok(())
    }

    pub fn into_document(self, created_at: DateTime<Utc>) -> Progress {
        Progress {
            user_id: self.user_id,
            routine_id: self.routine_id.filter(|id| !id.is_empty()),
            exercise_id: self.exercise_id.filter(|id| !id.is_empty()),
            date: self.date.unwrap_or(created_at),
            repetitions: self.repetitions,
            duration: self.duration,
            effort_level: self.effort_level,
            notes: self.notes,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub trainer_id: String,
    pub user_id: String,
    pub message: String,
    pub related_progress_id: Option<String>,
    pub related_routine_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Document for Recommendation {
    const COLLECTION: &'static str = "recommendations";
    const INDEXES: &'static [&'static str] = &["trainer_id", "user_id", "created_at"];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationPayload {
    pub trainer_id: String,
    pub user_id: String,
    pub message: String,
    pub related_progress_id: Option<String>,
    pub related_routine_id: Option<String>,
}

impl RecommendationPayload {
    pub fn validate(&self) -> ValidationResult {
        validate_text("trainer_id", &self.trainer_id, 50)?;
        validate_text("user_id", &self.user_id, 50)?;
        validate_text("message", &self.message, 2000)
    }

    pub fn into_document(self, created_at: DateTime<Utc>) -> Recommendation {
        Recommendation {
            trainer_id: self.trainer_id,
            user_id: self.user_id,
            message: self.message,
            related_progress_id: self.related_progress_id.filter(|id| !id.is_empty()),
            related_routine_id: self.related_routine_id.filter(|id| !id.is_empty()),
            created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FollowUp {
    pub trainer_id: String,
    pub user_id: String,
    pub progress_id: Option<String>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Document for FollowUp {
    const COLLECTION: &'static str = "followups";
    const INDEXES: &'static [&'static str] = &["trainer_id", "user_id", "created_at"];
}

impl FollowUp {
    /// A follow-up is pending until the trainer writes a comment
    pub fn is_pending(&self) -> bool {
        self.comment
            .as_deref()
            .map(|comment| comment.trim().is_empty())
            .unwrap_or(true)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpPayload {
    pub trainer_id: String,
    pub user_id: String,
    pub progress_id: Option<String>,
    pub comment: Option<String>,
}

impl FollowUpPayload {
    pub fn validate(&self) -> ValidationResult {
        validate_text("trainer_id", &self.trainer_id, 50)?;
        validate_text("user_id", &self.user_id, 50)?;
        if let Some(comment) = &self.comment {
            validate_max_len("comment", comment, 2000)?;
        }
        Ok(())
    }

    pub fn into_document(self, created_at: DateTime<Utc>) -> FollowUp {
        FollowUp {
            trainer_id: self.trainer_id,
            user_id: self.user_id,
            progress_id: self.progress_id.filter(|id| !id.is_empty()),
            comment: self.comment,
            created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExerciseFilter {
    pub difficulty: Option<Difficulty>,
    #[serde(rename = "type")]
    pub exercise_type: Option<ExerciseType>,
    pub created_by: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RoutineFilter {
    pub user_id: Option<String>,
    pub is_template: Option<bool>,
    pub created_by: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProgressFilter {
    pub user_id: Option<String>,
    pub routine_id: Option<String>,
    pub exercise_id: Option<String>,
}

/// Filters shared by recommendations and follow-ups
#[derive(Debug, Default, Deserialize)]
pub struct TrainerUserFilter {
    pub user_id: Option<String>,
    pub trainer_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn exercise_payload() -> ExercisePayload {
        serde_json::from_value(json!({
            "name": "Burpees",
            "type": "cardio",
            "difficulty": "media",
            "duration": 15.0,
            "video_url": "https://example.com/videos/burpees"
        }))
        .unwrap()
    }

    #[test]
    fn test_exercise_wire_format() {
        let exercise = exercise_payload().into_document(Utc::now());
        let value = serde_json::to_value(&exercise).unwrap();

        assert_eq!(value["type"], "cardio");
        assert_eq!(value["difficulty"], "media");
        assert_eq!(value["created_by"], "system");
    }

    #[test]
    fn test_exercise_rejects_unknown_type() {
        let result = serde_json::from_value::<ExercisePayload>(json!({
            "name": "Yoga",
            "type": "flexibilidad"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_exercise_validation() {
        let mut payload = exercise_payload();
        assert!(payload.validate().is_ok());

        payload.video_url = Some("not a url".to_string());
        assert_eq!(payload.validate().unwrap_err().field, "video_url");

        payload.video_url = None;
        payload.duration = Some(-1.0);
        assert_eq!(payload.validate().unwrap_err().field, "duration");
    }

    #[test]
    fn test_routine_exercise_validation_names_the_entry() {
        let payload: RoutinePayload = serde_json::from_value(json!({
            "name": "Full body",
            "created_by": "juan.p",
            "exercises": [
                {"exercise_id": "a1", "sets": 3, "reps": 12, "rest": 60},
                {"exercise_id": "a2", "sets": 0}
            ]
        }))
        .unwrap();

        let err = payload.validate().unwrap_err();
        assert_eq!(err.field, "exercises[1].sets");
    }

    #[test]
    fn test_progress_effort_bounds() {
        let mut payload: ProgressPayload = serde_json::from_value(json!({
            "user_id": "laura.h",
            "effort_level": 7
        }))
        .unwrap();
        assert!(payload.validate().is_ok());

        payload.effort_level = Some(11);
        assert_eq!(payload.validate().unwrap_err().field, "effort_level");
    }

    #[test]
    fn test_progress_date_defaults_to_creation_time() {
        let now = Utc::now();
        let payload: ProgressPayload = serde_json::from_value(json!({
            "user_id": "laura.h",
            "routine_id": ""
        }))
        .unwrap();

        let progress = payload.into_document(now);
        assert_eq!(progress.date, now);
        assert_eq!(progress.routine_id, None);
    }

    #[test]
    fn test_routine_adoption_copies_exercises() {
        let template = Routine {
            name: "Fuerza básica".to_string(),
            description: None,
            exercises: vec![RoutineExercise {
                exercise_id: "e1".to_string(),
                sets: Some(3),
                reps: Some(10),
                rest: Some(60),
                duration: None,
            }],
            created_by: "juan.p".to_string(),
            is_template: true,
            adopted_from: None,
            user_id: None,
            created_at: Utc::now(),
        };

        let copy = template.adopt("t1", "laura.h", Utc::now());

        assert!(!copy.is_template);
        assert_eq!(copy.adopted_from.as_deref(), Some("t1"));
        assert_eq!(copy.user_id.as_deref(), Some("laura.h"));
        assert_eq!(copy.exercises, template.exercises);
    }

    #[test]
    fn test_followup_pending() {
        let mut followup = FollowUp {
            trainer_id: "juan.p".to_string(),
            user_id: "laura.h".to_string(),
            progress_id: None,
            comment: None,
            created_at: Utc::now(),
        };
        assert!(followup.is_pending());

        followup.comment = Some("Buen progreso".to_string());
        assert!(!followup.is_pending());
    }

    #[test]
    fn test_record_flattens_document() {
        let record = Record {
            id: "abc".to_string(),
            document: FollowUp {
                trainer_id: "juan.p".to_string(),
                user_id: "laura.h".to_string(),
                progress_id: None,
                comment: None,
                created_at: Utc::now(),
            },
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(value["trainer_id"], "juan.p");
    }
}
