// ============================================================================
// CLIENT GEMINI (REST generateContent)
// ============================================================================
//
// Description:
//   Implémente SpamClassifier et ChatModel via l'API REST Gemini.
//   Chaque appel est borné par un timeout (AI_TIMEOUT_SECS).
//
// Endpoint:
//   POST {base}/models/{model}:generateContent?key={GEMINI_API_KEY}
//
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AiError, AiVerdict, ChatModel, ChatRole, ChatTurn, SpamClassifier, classification_prompt, parse_verdict};
use crate::config::AppConfig;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const CHAT_MAX_OUTPUT_TOKENS: u32 = 500;

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    classifier_model: String,
    chat_model: String,
}

// ---------- Format de requête/réponse Gemini ----------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatène les parts texte du premier candidat
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.trim().is_empty() { None } else { Some(text) }
    }
}

impl GeminiClient {
    pub fn new(
        api_key: Option<String>,
        classifier_model: String,
        chat_model: String,
        timeout: Duration,
    ) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: GEMINI_BASE_URL.to_string(),
            api_key,
            classifier_model,
            chat_model,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AiError> {
        Self::new(
            config.gemini_api_key.clone(),
            config.classifier_model.clone(),
            config.chat_model.clone(),
            config.ai_timeout,
        )
    }

    async fn generate(
        &self,
        model: &str,
        turns: &[ChatTurn],
        generation_config: Option<GenerationConfig>,
    ) -> Result<String, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let body = GenerateRequest {
            contents: turns
                .iter()
                .map(|turn| Content {
                    role: match turn.role {
                        ChatRole::User => "user",
                        ChatRole::Model => "model",
                    },
                    parts: vec![Part { text: &turn.text }],
                })
                .collect(),
            generation_config,
        };

        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Status { status: status.as_u16(), body });
        }

        let parsed: GenerateResponse = response.json().await.map_err(map_transport_error)?;
        parsed.text().ok_or(AiError::EmptyReply)
    }
}

fn map_transport_error(e: reqwest::Error) -> AiError {
    if e.is_timeout() {
        AiError::Timeout
    } else {
        AiError::Transport(e.to_string())
    }
}

#[async_trait]
impl SpamClassifier for GeminiClient {
    async fn classify(&self, message_text: &str) -> Result<AiVerdict, AiError> {
        let prompt = classification_prompt(message_text);
        let turns = [ChatTurn { role: ChatRole::User, text: prompt }];

        let reply = self.generate(&self.classifier_model, &turns, None).await?;
        parse_verdict(&reply)
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn reply(&self, turns: &[ChatTurn]) -> Result<String, AiError> {
        self.generate(
            &self.chat_model,
            turns,
            Some(GenerationConfig { max_output_tokens: CHAT_MAX_OUTPUT_TOKENS }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_joins_parts() {
        let raw = r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "there"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.text(), Some("Hello there".to_string()));
    }

    #[test]
    fn test_response_without_candidates() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert_eq!(parsed.text(), None);
    }

    #[test]
    fn test_request_shape() {
        let turns = [
            ChatTurn { role: ChatRole::User, text: "instructions".to_string() },
            ChatTurn { role: ChatRole::Model, text: "ok".to_string() },
        ];
        let body = GenerateRequest {
            contents: turns
                .iter()
                .map(|t| Content {
                    role: if t.role == ChatRole::User { "user" } else { "model" },
                    parts: vec![Part { text: &t.text }],
                })
                .collect(),
            generation_config: Some(GenerationConfig { max_output_tokens: 500 }),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 500);
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let client = GeminiClient::new(None, "m".into(), "m".into(), Duration::from_secs(1)).unwrap();
        let result = client.classify("hello").await;
        assert!(matches!(result, Err(AiError::MissingApiKey)));
    }
}
