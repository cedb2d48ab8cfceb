use serde_json::Value;

use crate::error::ApiError;
use crate::services::ai::{ChatModel, ChatRole, ChatTurn};

pub const ASSISTANT_NAME: &str = "Jordan Bhai";

const ACKNOWLEDGEMENT: &str =
    "Understood. I am Jordan Bhai, ready to help with finances using the provided data.";

/// Instruction système: persona, restriction au thème finance, données de l'utilisateur
pub fn system_instruction(context: Option<&Value>) -> String {
    let data = match context {
        Some(value) if !value.is_null() => value.to_string(),
        _ => "{}".to_string(),
    };

    format!(
        r#"You are {ASSISTANT_NAME}, a helpful and knowledgeable financial assistant.
Your goal is to assist the user with their personal finances based on the provided data.

RULES:
1. Answer ONLY finance-related questions. If the user asks about anything else (e.g., sports, coding, general knowledge), politely refuse and say you only talk about money.
2. Use the "User Financial Data" provided below to give specific, personalized answers.
3. Be encouraging, friendly, and use the name "{ASSISTANT_NAME}" if asked who you are.
4. Keep answers concise and helpful.

USER FINANCIAL DATA (JSON):
{data}

Now answer the user's question."#
    )
}

/// Historique envoyé au modèle: instruction, accusé de réception, question
pub fn conversation(message: &str, context: Option<&Value>) -> Vec<ChatTurn> {
    vec![
        ChatTurn { role: ChatRole::User, text: system_instruction(context) },
        ChatTurn { role: ChatRole::Model, text: ACKNOWLEDGEMENT.to_string() },
        ChatTurn { role: ChatRole::User, text: message.to_string() },
    ]
}

pub struct ChatService;

impl ChatService {
    /// Sans état: tout le contexte est renvoyé par le client à chaque appel
    pub async fn ask(
        model: &dyn ChatModel,
        message: &str,
        context: Option<&Value>,
    ) -> Result<String, ApiError> {
        let turns = conversation(message, context);

        model.reply(&turns).await.map_err(|e| {
            ApiError::internal(format!("chat model failed: {}", e))
        })
    }
}
