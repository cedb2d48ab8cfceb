use actix_web::{delete, get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::dto::{CreateTransactionRequest, TransactionFilter};
use crate::services::transaction_service::{NewTransaction, TransactionService};

/// GET /api/transactions?type=&category=&from=&to=
#[get("")]
pub async fn list_transactions(
    auth_user: AuthUser,
    query: web::Query<TransactionFilter>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let transactions = TransactionService::list(db.get_ref(), auth_user.user_id, &query).await?;
    Ok(HttpResponse::Ok().json(transactions))
}

/// POST /api/transactions - Le solde du compte n'est pas ajusté
#[post("")]
pub async fn create_transaction(
    auth_user: AuthUser,
    body: web::Json<CreateTransactionRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    request.validate()?;
    let new = NewTransaction::try_from(request)?;

    let transaction = TransactionService::create(db.get_ref(), auth_user.user_id, new).await?;
    Ok(HttpResponse::Created().json(transaction))
}

#[delete("/{id}")]
pub async fn delete_transaction(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    TransactionService::delete(db.get_ref(), auth_user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn transaction_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/transactions")
            .service(list_transactions)
            .service(create_transaction)
            .service(delete_transaction)
    );
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use crate::routes::test_support::{bearer, user, Deps};

    async fn post_body(body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let caller = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(caller)]])
            .into_connection();
        let app = crate::test_app!(Deps::offline(db));

        let req = test::TestRequest::post()
            .uri("/api/transactions")
            .insert_header(bearer(caller))
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        (status, test::read_body_json(resp).await)
    }

    #[actix_web::test]
    async fn test_unknown_type_is_rejected_before_persistence() {
        let (status, _) = post_body(serde_json::json!({
            "amount": 10, "type": "refund", "category": "Food",
            "account_id": Uuid::new_v4(), "date": "2025-01-01"
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_missing_fields() {
        let (status, body) = post_body(serde_json::json!({"amount": 10, "type": "expense"})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");
    }

    #[actix_web::test]
    async fn test_negative_amount() {
        let (status, body) = post_body(serde_json::json!({
            "amount": -3, "type": "income", "category": "Salary",
            "account_id": Uuid::new_v4(), "date": "2025-01-01"
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Amount must be greater than 0");
    }
}
