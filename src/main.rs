mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;
mod utils;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::services::ai::gemini::GeminiClient;
use crate::services::ai::{ChatModel, SpamClassifier};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!(error = %e, "invalid configuration");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    tracing::info!("🔌 Connecting to database...");
    let db = db::establish_connection(&config).await.map_err(|e| {
        tracing::error!(error = %e, "failed to connect to database");
        std::io::Error::other(e)
    })?;
    tracing::info!("✅ Database connected!");

    if config.auto_migrate {
        db::ensure_schema(&db).await.map_err(|e| {
            tracing::error!(error = %e, "schema bootstrap failed");
            std::io::Error::other(e)
        })?;
    }

    // Un seul client HTTP partagé par le classifieur et le chat
    let gemini = Arc::new(GeminiClient::from_config(&config).map_err(std::io::Error::other)?);
    let classifier: web::Data<dyn SpamClassifier> = web::Data::from(gemini.clone() as Arc<dyn SpamClassifier>);
    let chat: web::Data<dyn ChatModel> = web::Data::from(gemini as Arc<dyn ChatModel>);

    let bind = (config.host.clone(), config.port);
    tracing::info!("🚀 Starting server on http://{}:{}", bind.0, bind.1);

    let db = web::Data::new(db);
    let config = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(db.clone())
            .app_data(config.clone())
            .app_data(classifier.clone())
            .app_data(chat.clone())
            .app_data(routes::json_config())
            .app_data(routes::query_config())
            .app_data(routes::path_config())
            .configure(routes::configure_routes)
    })
        .bind(bind)?
        .run()
        .await
}
