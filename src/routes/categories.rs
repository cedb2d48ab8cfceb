use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::dto::CategoryQuery;
use crate::services::category_service::CategoryService;

/// GET /api/categories?type=income|expense (défaut: expense)
#[get("")]
pub async fn list_categories(
    auth_user: AuthUser,
    query: web::Query<CategoryQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    auth_user.ensure_is(query.user_id)?;

    let category_type = query.category_type.unwrap_or_default();
    let categories = CategoryService::list(db.get_ref(), auth_user.user_id, category_type).await?;

    Ok(HttpResponse::Ok().json(categories))
}

pub fn category_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/categories")
            .service(list_categories)
    );
}
