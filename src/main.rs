use anyhow::Result;
use axum::{extract::Request, ServiceExt};
use campus_fit::api::routes::create_app;
use campus_fit::config::{run_migrations, AppConfig, DatabaseConfig, DatabaseSeeder};
use campus_fit::services::{DocumentStore, FitnessService};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let database = DatabaseConfig::from_env()?;
    let db = database.create_pool().await?;
    let fitness_db = database.create_fitness_pool().await?;

    run_migrations(&db).await?;
    let store = DocumentStore::new(fitness_db.clone());
    store.ensure_collections().await?;

    if config.seed_demo_data {
        if config.is_production() {
            warn!("Seeding demo accounts with well-known passwords in production");
        }
        DatabaseSeeder::new(db.clone(), FitnessService::new(store))
            .seed_all()
            .await?;
    }

    let app = create_app(db, fitness_db, &config);

    let listener = TcpListener::bind(config.server_address()).await?;
    info!(
        "Campus Fit server starting on http://{} ({})",
        config.server_address(),
        config.environment
    );
    info!("Health check available at http://{}/health", config.server_address());

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}
