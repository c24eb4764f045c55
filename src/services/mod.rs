// Business logic services

pub mod academic_service;
pub mod account_service;
pub mod dashboard_service;
pub mod document_store;
pub mod fitness_service;
pub mod fitness_stats;
pub mod human_resources_service;
pub mod location_service;

pub use academic_service::AcademicService;
pub use account_service::AccountService;
pub use dashboard_service::DashboardService;
pub use document_store::DocumentStore;
pub use fitness_service::{AdoptOutcome, FitnessService};
pub use human_resources_service::HumanResourcesService;
pub use location_service::LocationService;
