use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

mod ai;
mod analyzer;
mod config;
mod controllers;
mod execution;
mod http;
mod models;
mod planner;
mod settings;
mod util;

use config::Config;
use execution::ProgressStore;
use planner::PlanCatalog;
use settings::SettingsStore;

/// Hours a terminal execution stays in the registry before the janitor
/// evicts it
const EXECUTION_RETENTION_HOURS: i64 = 24;

pub struct AppState {
    pub config: Config,
    pub settings: Arc<SettingsStore>,
    pub catalog: Arc<PlanCatalog>,
    pub progress: Arc<ProgressStore>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let host = config.host.clone();
    let port = config.port;

    log::info!("Using data directory {}", config.data_dir.display());
    std::fs::create_dir_all(&config.data_dir)?;

    let settings = Arc::new(SettingsStore::new(&config.data_dir));
    let catalog = Arc::new(PlanCatalog::new());
    let progress = Arc::new(ProgressStore::new());

    // Evict terminal executions nobody released explicitly
    let janitor_store = progress.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
        loop {
            interval.tick().await;
            if !janitor_store.is_empty() {
                log::debug!(
                    "[PROGRESS_STORE] Sweeping {} tracked executions",
                    janitor_store.len()
                );
                janitor_store.cleanup_old(EXECUTION_RETENTION_HOURS);
            }
        }
    });

    log::info!("Starting DiskPilot backend on {}:{}", host, port);

    let allowed_origin = config.allowed_origin.clone();
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                config: config.clone(),
                settings: Arc::clone(&settings),
                catalog: Arc::clone(&catalog),
                progress: Arc::clone(&progress),
            }))
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config)
            .configure(controllers::analysis::config)
            .configure(controllers::plans::config)
            .configure(controllers::execution::config)
            .configure(controllers::progress::config)
            .configure(controllers::settings::config)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
