use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use db_pool::{create_pool, update_pool_metrics, DbConfig};
use insta_service::config::{Config, StoreBackend};
use insta_service::handlers;
use insta_service::logging::init_tracing;
use insta_service::repository::{
    MemorySocialRepository, PostgresSocialRepository, SocialRepository,
};
use insta_service::storage::{LocalMediaStorage, MediaStorage};
use insta_service::AppState;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const SERVICE_NAME: &str = "insta-service";

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.app.json_logs);

    info!("Starting {} v{}", SERVICE_NAME, env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.env);

    let repo: Arc<dyn SocialRepository> = match config.database.backend {
        StoreBackend::Postgres => {
            let url = config
                .database
                .url
                .clone()
                .context("DATABASE_URL environment variable not set")?;
            let db_config = DbConfig::new(SERVICE_NAME, url);
            db_config.log_config();

            let pool = create_pool(db_config)
                .await
                .context("Failed to create database pool")?;

            let repo = PostgresSocialRepository::new(pool.clone());
            if config.database.run_migrations {
                repo.migrate().await.context("Failed to run migrations")?;
                info!("Database migrations applied");
            } else {
                info!("Skipping database migrations (RUN_MIGRATIONS=false)");
            }

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_secs(30));
                loop {
                    interval.tick().await;
                    update_pool_metrics(&pool, SERVICE_NAME);
                }
            });

            Arc::new(repo)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemorySocialRepository::new())
        }
    };

    let media: Arc<dyn MediaStorage> = Arc::new(LocalMediaStorage::new(
        &config.media.root,
        config.media.base_url.clone(),
    ));
    let state = web::Data::new(AppState::new(repo, media));

    let max_upload_bytes = config.media.max_upload_bytes;
    let bind_addr = (config.app.host.clone(), config.app.http_port);
    info!("HTTP server listening on {}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(handlers::metrics))
            .configure(handlers::api_routes(max_upload_bytes))
    })
    .bind(bind_addr)
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server error")?;

    info!("{} shut down", SERVICE_NAME);
    Ok(())
}
