use actix_web::{post, web, HttpResponse};
use validator::Validate;

use crate::error::ApiError;
use crate::models::dto::{ChatRequest, ChatResponse};
use crate::services::ai::ChatModel;
use crate::services::chat_service::ChatService;

/// POST /api/ai/chat - Assistant financier (PUBLIC, sans état)
#[post("/chat")]
pub async fn chat(
    body: web::Json<ChatRequest>,
    model: web::Data<dyn ChatModel>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    request.validate()?;

    let message = request
        .message
        .ok_or_else(|| ApiError::bad_request("Message is required"))?;

    let reply = ChatService::ask(model.get_ref(), &message, request.context.as_ref()).await?;

    Ok(HttpResponse::Ok().json(ChatResponse { reply }))
}

pub fn ai_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/ai")
            .service(chat)
    );
}
