use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::dto::{CreateAccountRequest, UpdateAccountRequest};
use crate::services::account_service::AccountService;

/// GET /api/accounts - Comptes de l'utilisateur, plus récents en premier
#[get("")]
pub async fn list_accounts(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let accounts = AccountService::list(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(accounts))
}

/// POST /api/accounts - Nouveau compte (jamais "par défaut")
#[post("")]
pub async fn create_account(
    auth_user: AuthUser,
    body: web::Json<CreateAccountRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    request.validate()?;

    let account = AccountService::create(db.get_ref(), auth_user.user_id, request).await?;
    Ok(HttpResponse::Created().json(account))
}

/// PUT /api/accounts/{id} - name, balance, include_in_savings (propriétaire uniquement)
#[put("/{id}")]
pub async fn update_account(
    auth_user: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateAccountRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    request.validate()?;

    let account = AccountService::update(db.get_ref(), auth_user.user_id, path.into_inner(), request).await?;
    Ok(HttpResponse::Ok().json(account))
}

/// DELETE /api/accounts/{id} - Les comptes par défaut sont protégés
#[delete("/{id}")]
pub async fn delete_account(
    auth_user: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    AccountService::delete(db.get_ref(), auth_user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn account_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/accounts")
            .service(list_accounts)
            .service(create_account)
            .service(update_account)
            .service(delete_account)
    );
}
