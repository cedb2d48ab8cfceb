// ============================================================================
// DTO - REQUÊTES / RÉPONSES DE L'API
// ============================================================================
//
// Les champs obligatoires sont des Option<> côté désérialisation pour que
// l'absence d'un champ produise notre message 400 (via validator) plutôt
// qu'une erreur serde générique.
//
// ============================================================================

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::budget::BudgetPeriod;
use crate::models::category::CategoryType;
use crate::models::transaction::TransactionType;
use crate::models::users::{self, Role};

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(required(message = "All fields are required"), length(min = 1, message = "All fields are required"))]
    pub name: Option<String>,
    #[validate(required(message = "All fields are required"), length(min = 1, message = "All fields are required"))]
    pub email: Option<String>,
    #[validate(required(message = "All fields are required"), length(min = 1, message = "All fields are required"))]
    pub phone: Option<String>,
    #[validate(required(message = "All fields are required"), length(min = 1, message = "All fields are required"))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(required(message = "Email and password are required"), length(min = 1, message = "Email and password are required"))]
    pub email: Option<String>,
    #[validate(required(message = "Email and password are required"), length(min = 1, message = "Email and password are required"))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Profil renvoyé au client (jamais de hash)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for UserProfile {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            description: user.description,
            created_at: user.created_at,
        }
    }
}

// Réponse après signup/login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserProfile,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    #[validate(required(message = "Name, type, and parent_type are required"), length(min = 1, message = "Name, type, and parent_type are required"))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    #[validate(required(message = "Name, type, and parent_type are required"), length(min = 1, message = "Name, type, and parent_type are required"))]
    pub account_type: Option<String>,
    #[validate(required(message = "Name, type, and parent_type are required"), length(min = 1, message = "Name, type, and parent_type are required"))]
    pub parent_type: Option<String>,
    pub balance: Option<Decimal>,
    pub include_in_savings: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAccountRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub balance: Option<Decimal>,
    pub include_in_savings: Option<bool>,
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTransactionRequest {
    #[validate(required(message = "Missing required fields"))]
    pub amount: Option<Decimal>,
    #[serde(rename = "type")]
    #[validate(required(message = "Missing required fields"))]
    pub transaction_type: Option<TransactionType>,
    #[validate(required(message = "Missing required fields"), length(min = 1, message = "Missing required fields"))]
    pub category: Option<String>,
    #[validate(required(message = "Missing required fields"))]
    pub account_id: Option<Uuid>,
    #[validate(required(message = "Missing required fields"), length(min = 1, message = "Missing required fields"))]
    pub date: Option<String>, // "2025-01-31" ou RFC 3339
    pub note: Option<String>,
}

/// Filtres de GET /api/transactions - intervalle de dates semi-ouvert [from, to)
#[derive(Debug, Default, Deserialize)]
pub struct TransactionFilter {
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub category: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

// ---------------------------------------------------------------------------
// Budgets / catégories
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct BudgetQuery {
    pub user_id: Option<Uuid>,
    pub month: Option<String>, // YYYY-MM
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBudgetRequest {
    pub id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    #[validate(required(message = "Missing required fields"))]
    pub category_id: Option<Uuid>,
    #[validate(required(message = "Missing required fields"))]
    pub amount: Option<Decimal>,
    #[validate(required(message = "Missing required fields"))]
    pub period: Option<BudgetPeriod>,
    #[validate(required(message = "Missing required fields"))]
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBudgetRequest {
    pub amount: Option<Decimal>,
    pub is_deleted: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub user_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub category_type: Option<CategoryType>,
}

// ---------------------------------------------------------------------------
// Fraud detection
// ---------------------------------------------------------------------------

/// Prédiction fournie par le modèle local (mobile)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MlPrediction {
    Smish,
    Promo,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DetectSpamRequest {
    #[validate(required(message = "Phone number and message text are required"), length(min = 1, message = "Phone number and message text are required"))]
    pub phone_number: Option<String>,
    #[validate(required(message = "Phone number and message text are required"), length(min = 1, message = "Phone number and message text are required"))]
    pub message_text: Option<String>,
    pub ml_prediction: Option<MlPrediction>,
    #[validate(range(min = 0.0, max = 1.0, message = "mlConfidence must be between 0 and 1"))]
    pub ml_confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpamListQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub unread_only: Option<bool>,
}

/// Agrégats de GET /api/fraud/stats
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityStats {
    pub total: u64,
    pub unread: u64,
    pub high_threat: u64,
    pub medium_threat: u64,
    pub low_threat: u64,
    pub today: u64,
    pub this_week: u64,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(required(message = "Message is required"), length(min = 1, message = "Message is required"))]
    pub message: Option<String>,
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}
