use actix_web::{get, patch, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::dto::{BudgetQuery, CreateBudgetRequest, UpdateBudgetRequest};
use crate::services::budget_service::{BudgetChange, BudgetService, NewBudget};

/// GET /api/budgets?month=YYYY-MM (user_id accepté s'il correspond au token)
#[get("")]
pub async fn list_budgets(
    auth_user: AuthUser,
    query: web::Query<BudgetQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    auth_user.ensure_is(query.user_id)?;

    let month = query
        .month
        .ok_or_else(|| ApiError::bad_request("month (YYYY-MM) is required"))?;

    let budgets = BudgetService::list_for_month(db.get_ref(), auth_user.user_id, &month).await?;
    Ok(HttpResponse::Ok().json(budgets))
}

#[post("")]
pub async fn create_budget(
    auth_user: AuthUser,
    body: web::Json<CreateBudgetRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    auth_user.ensure_is(request.user_id)?;
    request.validate()?;

    let budget = BudgetService::create(db.get_ref(), auth_user.user_id, NewBudget::try_from(request)?).await?;
    Ok(HttpResponse::Created().json(budget))
}

/// PATCH /api/budgets/{id} - is_deleted => soft delete, sinon amount
#[patch("/{id}")]
pub async fn update_budget(
    auth_user: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateBudgetRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let change = BudgetChange::try_from(body.into_inner())?;

    let budget = BudgetService::update(db.get_ref(), auth_user.user_id, path.into_inner(), change).await?;
    Ok(HttpResponse::Ok().json(budget))
}

pub fn budget_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/budgets")
            .service(list_budgets)
            .service(create_budget)
            .service(update_budget)
    );
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use crate::models::category;
    use crate::routes::test_support::{bearer, user, Deps};

    fn authenticated_db(caller: Uuid) -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![user(caller)]])
    }

    #[actix_web::test]
    async fn test_month_is_required() {
        let caller = Uuid::new_v4();
        let app = crate::test_app!(Deps::offline(authenticated_db(caller).into_connection()));

        let req = test::TestRequest::get()
            .uri("/api/budgets")
            .insert_header(bearer(caller))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_other_user_id_is_forbidden() {
        let caller = Uuid::new_v4();
        let app = crate::test_app!(Deps::offline(authenticated_db(caller).into_connection()));

        let req = test::TestRequest::get()
            .uri(&format!("/api/budgets?user_id={}&month=2025-03", Uuid::new_v4()))
            .insert_header(bearer(caller))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_patch_without_change_is_bad_request() {
        let caller = Uuid::new_v4();
        let app = crate::test_app!(Deps::offline(authenticated_db(caller).into_connection()));

        let req = test::TestRequest::patch()
            .uri(&format!("/api/budgets/{}", Uuid::new_v4()))
            .insert_header(bearer(caller))
            .set_json(serde_json::json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_create_with_invisible_category_is_not_found() {
        let caller = Uuid::new_v4();
        let db = authenticated_db(caller)
            .append_query_results([Vec::<category::Model>::new()])
            .into_connection();
        let app = crate::test_app!(Deps::offline(db));

        let req = test::TestRequest::post()
            .uri("/api/budgets")
            .insert_header(bearer(caller))
            .set_json(serde_json::json!({
                "category_id": Uuid::new_v4(),
                "amount": 5000,
                "period": "monthly",
                "start_date": "2025-03-01"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
