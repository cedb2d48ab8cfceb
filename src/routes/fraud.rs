use actix_web::{delete, get, patch, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::dto::{DetectSpamRequest, SpamListQuery};
use crate::services::ai::SpamClassifier;
use crate::services::fraud_service::{FraudService, IncomingMessage};

/// POST /api/fraud/detect - Classe un SMS intercepté par le mobile
#[post("/detect")]
pub async fn detect_spam(
    auth_user: AuthUser,
    body: web::Json<DetectSpamRequest>,
    db: web::Data<DatabaseConnection>,
    classifier: web::Data<dyn SpamClassifier>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    request.validate()?;

    let (Some(phone_number), Some(message_text)) = (request.phone_number, request.message_text) else {
        return Err(ApiError::bad_request("Phone number and message text are required"));
    };

    let message = IncomingMessage {
        phone_number,
        message_text,
        ml_prediction: request.ml_prediction,
        ml_confidence: request.ml_confidence,
    };

    let (saved, prediction) =
        FraudService::detect(db.get_ref(), classifier.get_ref(), auth_user.user_id, message).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "data": saved,
        "prediction": prediction
    })))
}

/// GET /api/fraud/messages?limit=&offset=&unreadOnly=
#[get("/messages")]
pub async fn list_messages(
    auth_user: AuthUser,
    query: web::Query<SpamListQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let messages = FraudService::list(
        db.get_ref(),
        auth_user.user_id,
        query.limit,
        query.offset,
        query.unread_only.unwrap_or(false),
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": messages.len(),
        "data": messages
    })))
}

#[get("/messages/{id}")]
pub async fn get_message(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let message = FraudService::find(db.get_ref(), auth_user.user_id, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": message
    })))
}

#[patch("/messages/{id}/read")]
pub async fn mark_as_read(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let message = FraudService::mark_as_read(db.get_ref(), auth_user.user_id, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": message
    })))
}

/// PATCH /api/fraud/messages/{id}/safe - Faux positif
#[patch("/messages/{id}/safe")]
pub async fn mark_as_safe(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let message = FraudService::mark_as_false_positive(db.get_ref(), auth_user.user_id, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": message
    })))
}

#[delete("/messages/{id}")]
pub async fn delete_message(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    FraudService::delete(db.get_ref(), auth_user.user_id, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Message deleted successfully"
    })))
}

#[get("/stats")]
pub async fn security_stats(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let stats = FraudService::stats(db.get_ref(), auth_user.user_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": stats
    })))
}

pub fn fraud_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/fraud")
            .service(detect_spam)
            .service(list_messages)
            .service(get_message)
            .service(mark_as_read)
            .service(mark_as_safe)
            .service(delete_message)
            .service(security_stats)
    );
}
