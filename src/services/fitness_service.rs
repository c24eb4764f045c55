use std::collections::HashSet;

use anyhow::Result;
use chrono::Utc;

use super::document_store::{filters, DocumentStore};
use crate::models::{
    Exercise, ExerciseFilter, ExercisePayload, FollowUp, FollowUpPayload, Progress,
    ProgressFilter, ProgressPayload, Recommendation, RecommendationPayload, Record, Routine,
    RoutineFilter, RoutinePayload, TrainerUserFilter, ValidationError,
};

/// Why a routine could not be adopted
#[derive(Debug)]
pub enum AdoptOutcome {
    Adopted(Record<Routine>),
    NotFound,
    NotTemplate,
}

/// Exercises, routines, progress, recommendations and follow-ups
#[derive(Debug, Clone)]
pub struct FitnessService {
    store: DocumentStore,
}

impl FitnessService {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    // Exercises

    pub async fn list_exercises(&self, filter: ExerciseFilter) -> Result<Vec<Record<Exercise>>> {
        self.store
            .find(&filters([
                ("difficulty", filter.difficulty.map(|d| d.as_str().to_string())),
                ("type", filter.exercise_type.map(|t| t.as_str().to_string())),
                ("created_by", filter.created_by),
            ]))
            .await
    }

    /// Every exercise, alphabetical
    pub async fn exercise_catalog(&self) -> Result<Vec<Record<Exercise>>> {
        let mut exercises = self.list_exercises(ExerciseFilter::default()).await?;
        exercises.sort_by_cached_key(|record| record.document.name.to_lowercase());
        Ok(exercises)
    }

    pub async fn get_exercise(&self, id: &str) -> Result<Option<Record<Exercise>>> {
        self.store.get(id).await
    }

    pub async fn create_exercise(&self, payload: ExercisePayload) -> Result<Record<Exercise>> {
        payload.validate()?;
        let record = self.store.insert(payload.into_document(Utc::now())).await?;
        tracing::info!("Created exercise {} ({})", record.document.name, record.id);
        Ok(record)
    }

    /// Replacement keeps the original creation time
    pub async fn update_exercise(
        &self,
        id: &str,
        payload: ExercisePayload,
    ) -> Result<Option<Record<Exercise>>> {
        payload.validate()?;
        let Some(existing) = self.store.get::<Exercise>(id).await? else {
            return Ok(None);
        };
        let document = payload.into_document(existing.document.created_at);
        self.store.replace(id, document).await
    }

    pub async fn delete_exercise(&self, id: &str) -> Result<bool> {
        self.store.delete::<Exercise>(id).await
    }

    // Routines

    pub async fn list_routines(&self, filter: RoutineFilter) -> Result<Vec<Record<Routine>>> {
        self.store
            .find(&filters([
                ("user_id", filter.user_id),
                ("is_template", filter.is_template.map(|t| t.to_string())),
                ("created_by", filter.created_by),
            ]))
            .await
    }

    /// The user's own routines plus every template, newest first
    pub async fn visible_routines(&self, username: &str) -> Result<Vec<Record<Routine>>> {
        let own = self
            .list_routines(RoutineFilter {
                user_id: Some(username.to_string()),
                ..Default::default()
            })
            .await?;
        let templates = self
            .list_routines(RoutineFilter {
                is_template: Some(true),
                ..Default::default()
            })
            .await?;

        let mut seen = HashSet::new();
        let mut routines: Vec<Record<Routine>> = own
            .into_iter()
            .chain(templates)
            .filter(|record| seen.insert(record.id.clone()))
            .collect();
        routines.sort_by(|a, b| b.document.created_at.cmp(&a.document.created_at));
        Ok(routines)
    }

    pub async fn get_routine(&self, id: &str) -> Result<Option<Record<Routine>>> {
        self.store.get(id).await
    }

    pub async fn create_routine(&self, payload: RoutinePayload) -> Result<Record<Routine>> {
        payload.validate()?;
        self.check_exercises_exist(&payload).await?;
        let record = self.store.insert(payload.into_document(Utc::now())).await?;
        tracing::info!("Created routine {} ({})", record.document.name, record.id);
        Ok(record)
    }

    pub async fn update_routine(
        &self,
        id: &str,
        payload: RoutinePayload,
    ) -> Result<Option<Record<Routine>>> {
        payload.validate()?;
        let Some(existing) = self.store.get::<Routine>(id).await? else {
            return Ok(None);
        };
        self.check_exercises_exist(&payload).await?;
        let document = payload.into_document(existing.document.created_at);
        self.store.replace(id, document).await
    }

    pub async fn delete_routine(&self, id: &str) -> Result<bool> {
        self.store.delete::<Routine>(id).await
    }

    /// Copy a template routine into a personal routine for `user_id`
    pub async fn adopt_routine(&self, id: &str, user_id: &str) -> Result<AdoptOutcome> {
        if user_id.trim().is_empty() {
            return Err(ValidationError::new("user_id", "This field may not be blank").into());
        }

        let Some(template) = self.store.get::<Routine>(id).await? else {
            return Ok(AdoptOutcome::NotFound);
        };
        if !template.document.is_template {
            return Ok(AdoptOutcome::NotTemplate);
        }

        let copy = template.document.adopt(&template.id, user_id.trim(), Utc::now());
        let record = self.store.insert(copy).await?;
        tracing::info!("User {} adopted routine {} as {}", user_id, id, record.id);
        Ok(AdoptOutcome::Adopted(record))
    }

    async fn check_exercises_exist(&self, payload: &RoutinePayload) -> Result<()> {
        for (index, entry) in payload.exercises.iter().enumerate() {
            if !self.store.exists::<Exercise>(&entry.exercise_id).await? {
                return Err(ValidationError::new(
                    &format!("exercises[{}].exercise_id", index),
                    format!("Exercise {} does not exist", entry.exercise_id),
                )
                .into());
            }
        }
        Ok(())
    }

    // Progress

    pub async fn list_progress(&self, filter: ProgressFilter) -> Result<Vec<Record<Progress>>> {
        self.store
            .find(&filters([
                ("user_id", filter.user_id),
                ("routine_id", filter.routine_id),
                ("exercise_id", filter.exercise_id),
            ]))
            .await
    }

    pub async fn get_progress(&self, id: &str) -> Result<Option<Record<Progress>>> {
        self.store.get(id).await
    }

    pub async fn create_progress(&self, payload: ProgressPayload) -> Result<Record<Progress>> {
        payload.validate()?;
        self.store.insert(payload.into_document(Utc::now())).await
    }

    pub async fn update_progress(
        &self,
        id: &str,
        payload: ProgressPayload,
    ) -> Result<Option<Record<Progress>>> {
        payload.validate()?;
        let Some(existing) = self.store.get::<Progress>(id).await? else {
            return Ok(None);
        };
        let keep_date = payload.date.is_none();
        let mut document = payload.into_document(existing.document.created_at);
        if keep_date {
            document.date = existing.document.date;
        }
        self.store.replace(id, document).await
    }

    pub async fn delete_progress(&self, id: &str) -> Result<bool> {
        self.store.delete::<Progress>(id).await
    }

    // Recommendations

    pub async fn list_recommendations(
        &self,
        filter: TrainerUserFilter,
    ) -> Result<Vec<Record<Recommendation>>> {
        self.store
            .find(&filters([
                ("user_id", filter.user_id),
                ("trainer_id", filter.trainer_id),
            ]))
            .await
    }

    pub async fn get_recommendation(&self, id: &str) -> Result<Option<Record<Recommendation>>> {
        self.store.get(id).await
    }

    pub async fn create_recommendation(
        &self,
        payload: RecommendationPayload,
    ) -> Result<Record<Recommendation>> {
        payload.validate()?;
        self.store.insert(payload.into_document(Utc::now())).await
    }

    pub async fn update_recommendation(
        &self,
        id: &str,
        payload: RecommendationPayload,
    ) -> Result<Option<Record<Recommendation>>> {
        payload.validate()?;
        let Some(existing) = self.store.get::<Recommendation>(id).await? else {
            return Ok(None);
        };
        let document = payload.into_document(existing.document.created_at);
        self.store.replace(id, document).await
    }

    pub async fn delete_recommendation(&self, id: &str) -> Result<bool> {
        self.store.delete::<Recommendation>(id).await
    }

    // Follow-ups

    pub async fn list_followups(&self, filter: TrainerUserFilter) -> Result<Vec<Record<FollowUp>>> {
        self.store
            .find(&filters([
                ("user_id", filter.user_id),
                ("trainer_id", filter.trainer_id),
            ]))
            .await
    }

    pub async fn get_followup(&self, id: &str) -> Result<Option<Record<FollowUp>>> {
        self.store.get(id).await
    }

    pub async fn create_followup(&self, payload: FollowUpPayload) -> Result<Record<FollowUp>> {
        payload.validate()?;
        self.store.insert(payload.into_document(Utc::now())).await
    }

    pub async fn update_followup(
        &self,
        id: &str,
        payload: FollowUpPayload,
    ) -> Result<Option<Record<FollowUp>>> {
        payload.validate()?;
        let Some(existing) = self.store.get::<FollowUp>(id).await? else {
            return Ok(None);
        };
        let document = payload.into_document(existing.document.created_at);
        self.store.replace(id, document).await
    }

    pub async fn delete_followup(&self, id: &str) -> Result<bool> {
        self.store.delete::<FollowUp>(id).await
    }
}
