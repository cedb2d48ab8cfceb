pub mod health;
pub mod auth;
pub mod accounts;
pub mod transactions;
pub mod budgets;
pub mod categories;
pub mod fraud;
pub mod ai;

use actix_web::{error, web, HttpRequest};

use crate::error::ApiError;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(accounts::account_routes)
            .configure(transactions::transaction_routes)
            .configure(budgets::budget_routes)
            .configure(categories::category_routes)
            .configure(fraud::fraud_routes)
            .configure(ai::ai_routes)
    );
}

// Les erreurs des extracteurs (JSON, query, path) passent aussi par ApiError
// pour garder le format {"error": "..."}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: error::JsonPayloadError, _req: &HttpRequest| {
        ApiError::bad_request(format!("Invalid JSON body: {}", err)).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: error::QueryPayloadError, _req: &HttpRequest| {
        ApiError::bad_request(format!("Invalid query parameters: {}", err)).into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|_err: error::PathError, _req: &HttpRequest| {
        ApiError::not_found("Resource not found").into()
    })
}
