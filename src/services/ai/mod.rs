/*
services/ai/
├─ mod.rs      ← Interfaces (SpamClassifier, ChatModel), verdict, prompts
└─ gemini.rs   ← Implémentation REST Gemini (reqwest + timeout)
*/
pub mod gemini;

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::models::spam_message::ThreatLevel;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI API key is not configured")]
    MissingApiKey,

    #[error("AI request timed out")]
    Timeout,

    #[error("AI request failed: {0}")]
    Transport(String),

    #[error("AI endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("AI returned an empty reply")]
    EmptyReply,

    #[error("AI verdict could not be parsed: {0}")]
    MalformedVerdict(String),
}

/// Jugement renvoyé par le classifieur IA
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiVerdict {
    pub is_spam: bool,
    #[serde(default, deserialize_with = "lenient_threat_level")]
    pub threat_level: ThreatLevel,
    pub confidence: f64,
    #[serde(default)]
    pub reason: String,
}

impl AiVerdict {
    /// Verdict utilisé quand la réponse du modèle ne contient aucun objet JSON
    pub fn unable_to_analyze() -> Self {
        Self {
            is_spam: false,
            threat_level: ThreatLevel::Low,
            confidence: 0.5,
            reason: "Unable to analyze".to_string(),
        }
    }
}

// Le modèle ne respecte pas toujours la casse ("High") ni l'ensemble de valeurs.
// Valeur inconnue ou absente => Low, sans invalider isSpam.
fn lenient_threat_level<'de, D>(deserializer: D) -> Result<ThreatLevel, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    let level = match raw.as_str().map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("high") => ThreatLevel::High,
        Some("medium") => ThreatLevel::Medium,
        _ => ThreatLevel::Low,
    };
    Ok(level)
}

/// Un tour de conversation envoyé au modèle
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Model,
}

//trait = Interface : le moteur anti-fraude ne dépend pas du SDK d'un fournisseur
#[async_trait]
pub trait SpamClassifier: Send + Sync {
    async fn classify(&self, message_text: &str) -> Result<AiVerdict, AiError>;
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn reply(&self, turns: &[ChatTurn]) -> Result<String, AiError>;
}

static JSON_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{[\s\S]*\}").expect("static regex is valid")
});

/// Extrait l'objet JSON embarqué dans la réponse texte du modèle
/// - aucun objet trouvé => verdict de repli "Unable to analyze"
/// - objet trouvé mais invalide => erreur (le moteur garde alors la prédiction ML)
pub fn parse_verdict(reply: &str) -> Result<AiVerdict, AiError> {
    match JSON_OBJECT.find(reply) {
        Some(m) => serde_json::from_str(m.as_str())
            .map_err(|e| AiError::MalformedVerdict(e.to_string())),
        None => Ok(AiVerdict::unable_to_analyze()),
    }
}

pub fn classification_prompt(message_text: &str) -> String {
    format!(
        r#"Analyze the following SMS message for fraud/smishing attempts. Return only a JSON object with these fields:

{{
  "isSpam": boolean,
  "threatLevel": "low"|"medium"|"high",
  "confidence": 0.0-1.0,
  "reason": "brief explanation"
}}

SMS Message (may be in Bangla): "{message_text}"

Look for:
- Requests for personal/banking information
- Fake prize/lottery notifications
- Urgent calls to action with threats
- Suspicious links or phone numbers
- Fake authority impersonation (bank, government)"#
    )
}
