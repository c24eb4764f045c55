use std::collections::{HashMap, HashSet};

use anyhow::Result;
use chrono::Utc;

use super::fitness_stats::{
    activity_by_group, activity_summary, current_streak, growth_percent, monthly_activity,
    progress_totals, same_month, type_distribution, weekly_buckets, weekly_workouts,
    ActivitySummary, MonthBucket, ProgressTotals, WeekBucket, REPORT_MONTHS, REPORT_WEEKS,
    ROLE_GROUPS,
};
use super::{AccountService, FitnessService};
use crate::auth::UserRole;
use crate::models::{
    Exercise, ExerciseFilter, ExerciseType, FollowUp, Progress, ProgressFilter, Recommendation,
    Record, Routine, RoutineFilter, TrainerUserFilter, UserDetail,
};

const RECENT_LIMIT: usize = 5;

#[derive(Debug)]
pub struct UserDashboard {
    pub total_routines: usize,
    pub total_progress: usize,
    pub weekly_workouts: usize,
    pub current_streak: u32,
    pub recent_routines: Vec<Record<Routine>>,
    pub recent_progress: Vec<Record<Progress>>,
}

#[derive(Debug)]
pub struct ProgressReport {
    pub weeks: Vec<WeekBucket>,
    pub type_distribution: Vec<(ExerciseType, usize)>,
    pub summary: ActivitySummary,
}

#[derive(Debug)]
pub struct TrainerDashboard {
    pub assigned_users: usize,
    pub total_routines_created: usize,
    pub total_recommendations: usize,
    pub pending_followups: usize,
    pub assigned_users_list: Vec<String>,
    pub trainer_routines: Vec<Record<Routine>>,
}

#[derive(Debug)]
pub struct AdminDashboard {
    pub total_users: i64,
    pub total_trainers: i64,
    pub total_routines: i64,
    pub total_progress: i64,
}

/// One trainee as seen by a trainer
#[derive(Debug)]
pub struct TraineeProgress {
    pub user: UserDetail,
    pub totals: ProgressTotals,
    pub progress: Vec<Record<Progress>>,
    pub routines: Vec<Record<Routine>>,
    /// Sent by the viewing trainer, newest first
    pub recommendations: Vec<Record<Recommendation>>,
}

#[derive(Debug)]
pub struct TrainerStats {
    pub trainer: UserDetail,
    pub routines_created: usize,
    pub recommendations_sent: usize,
    pub users_advised: usize,
    pub pending_followups: usize,
}

#[derive(Debug, PartialEq)]
pub struct GeneralStat {
    pub metric: &'static str,
    pub value: i64,
    /// Growth this month, in percent
    pub change: Option<f64>,
}

#[derive(Debug)]
pub struct AdminReport {
    pub platform_usage: Vec<MonthBucket>,
    pub activity_by_role: Vec<(&'static str, usize)>,
    pub general_stats: Vec<GeneralStat>,
}

/// Aggregates behind the HTML dashboards. Fitness documents refer to
/// people by username.
#[derive(Debug, Clone)]
pub struct DashboardService {
    accounts: AccountService,
    fitness: FitnessService,
}

impl DashboardService {
    pub fn new(accounts: AccountService, fitness: FitnessService) -> Self {
        Self { accounts, fitness }
    }

    pub async fn user_dashboard(&self, username: &str) -> Result<UserDashboard> {
        let routines = self
            .fitness
            .list_routines(RoutineFilter {
                user_id: Some(username.to_string()),
                ..Default::default()
            })
            .await?;
        let progress = self.user_progress(username).await?;

        let entries: Vec<Progress> = progress.iter().map(|record| record.document.clone()).collect();
        let now = Utc::now();

        Ok(UserDashboard {
            total_routines: routines.len(),
            total_progress: progress.len(),
            weekly_workouts: weekly_workouts(&entries, now),
            current_streak: current_streak(&entries, now.date_naive()),
            recent_routines: routines.into_iter().take(RECENT_LIMIT).collect(),
            recent_progress: progress.into_iter().take(RECENT_LIMIT).collect(),
        })
    }

    pub async fn progress_report(&self, username: &str) -> Result<ProgressReport> {
        let entries: Vec<Progress> = self
            .user_progress(username)
            .await?
            .into_iter()
            .map(|record| record.document)
            .collect();

        let exercises: HashMap<String, Exercise> = self
            .fitness
            .list_exercises(ExerciseFilter::default())
            .await?
            .into_iter()
            .map(|record| (record.id, record.document))
            .collect();

        let now = Utc::now();
        Ok(ProgressReport {
            weeks: weekly_buckets(&entries, now, REPORT_WEEKS),
            type_distribution: type_distribution(&entries, &exercises),
            summary: activity_summary(&entries, now),
        })
    }

    pub async fn trainer_dashboard(&self, trainer: &str) -> Result<TrainerDashboard> {
        let by_trainer = || TrainerUserFilter {
            trainer_id: Some(trainer.to_string()),
            user_id: None,
        };

        let recommendations = self.fitness.list_recommendations(by_trainer()).await?;
        let followups: Vec<Record<FollowUp>> = self.fitness.list_followups(by_trainer()).await?;
        let routines = self
            .fitness
            .list_routines(RoutineFilter {
                created_by: Some(trainer.to_string()),
                ..Default::default()
            })
            .await?;

        let users: HashSet<&str> = recommendations
            .iter()
            .map(|record| record.document.user_id.as_str())
            .chain(followups.iter().map(|record| record.document.user_id.as_str()))
            .collect();
        let mut assigned_users_list: Vec<String> = users.into_iter().map(str::to_string).collect();
        assigned_users_list.sort();

        Ok(TrainerDashboard {
            assigned_users: assigned_users_list.len(),
            total_routines_created: routines.len(),
            total_recommendations: recommendations.len(),
            pending_followups: followups.iter().filter(|record| record.document.is_pending()).count(),
            assigned_users_list,
            trainer_routines: routines,
        })
    }

    pub async fn admin_dashboard(&self) -> Result<AdminDashboard> {
        let store = self.fitness.store();
        Ok(AdminDashboard {
            total_users: self.accounts.count_users().await?,
            total_trainers: self.accounts.count_trainers().await?,
            total_routines: store.count::<Routine>(&[]).await?,
            total_progress: store.count::<Progress>(&[]).await?,
        })
    }

    /// `None` when no user has that username
    pub async fn trainee_progress(&self, trainer: &str, username: &str) -> Result<Option<TraineeProgress>> {
        let Some(user) = self.accounts.get_user(username).await? else {
            return Ok(None);
        };

        let progress = self.user_progress(username).await?;
        let entries: Vec<Progress> = progress.iter().map(|record| record.document.clone()).collect();
        let routines = self
            .fitness
            .list_routines(RoutineFilter {
                user_id: Some(username.to_string()),
                ..Default::default()
            })
            .await?;
        let recommendations = self
            .fitness
            .list_recommendations(TrainerUserFilter {
                trainer_id: Some(trainer.to_string()),
                user_id: Some(username.to_string()),
            })
            .await?;

        Ok(Some(TraineeProgress {
            user,
            totals: progress_totals(&entries),
            progress,
            routines,
            recommendations,
        }))
    }

    /// Every trainer account with its coaching activity
    pub async fn trainer_management(&self) -> Result<Vec<TrainerStats>> {
        let trainers: Vec<UserDetail> = self
            .accounts
            .list_users(Some(UserRole::Employee))
            .await?
            .into_iter()
            .filter(UserDetail::is_trainer)
            .collect();

        let mut stats = Vec::with_capacity(trainers.len());
        for trainer in trainers {
            let dashboard = self.trainer_dashboard(&trainer.username).await?;
            stats.push(TrainerStats {
                trainer,
                routines_created: dashboard.total_routines_created,
                recommendations_sent: dashboard.total_recommendations,
                users_advised: dashboard.assigned_users,
                pending_followups: dashboard.pending_followups,
            });
        }
        Ok(stats)
    }

    pub async fn admin_report(&self) -> Result<AdminReport> {
        let now = Utc::now();
        let users = self.accounts.list_users(None).await?;
        let routines = self.fitness.list_routines(RoutineFilter::default()).await?;
        let progress: Vec<Progress> = self
            .fitness
            .list_progress(ProgressFilter::default())
            .await?
            .into_iter()
            .map(|record| record.document)
            .collect();

        let groups: HashMap<String, &'static str> = users
            .iter()
            .filter_map(|user| role_group(user).map(|group| (user.username.clone(), group)))
            .collect();

        let stat = |metric, total: usize, added: usize| GeneralStat {
            metric,
            value: total as i64,
            change: growth_percent(total as i64, added as i64),
        };
        let general_stats = vec![
            stat(
                "Registered users",
                users.len(),
                users.iter().filter(|user| same_month(user.created_at, now)).count(),
            ),
            stat(
                "Routines created",
                routines.len(),
                routines
                    .iter()
                    .filter(|record| same_month(record.document.created_at, now))
                    .count(),
            ),
            stat(
                "Progress entries",
                progress.len(),
                progress.iter().filter(|entry| same_month(entry.created_at, now)).count(),
            ),
        ];

        Ok(AdminReport {
            platform_usage: monthly_activity(&progress, now, REPORT_MONTHS),
            activity_by_role: activity_by_group(&progress, &groups),
            general_stats,
        })
    }

    async fn user_progress(&self, username: &str) -> Result<Vec<Record<Progress>>> {
        self.fitness
            .list_progress(ProgressFilter {
                user_id: Some(username.to_string()),
                ..Default::default()
            })
            .await
    }
}

/// Reporting group for a user; administrators are not counted
fn role_group(user: &UserDetail) -> Option<&'static str> {
    match user.role {
        UserRole::Student => Some(ROLE_GROUPS[0]),
        UserRole::Employee if user.is_trainer() => Some(ROLE_GROUPS[2]),
        UserRole::Employee => Some(ROLE_GROUPS[1]),
        UserRole::Admin => None,
    }
}
