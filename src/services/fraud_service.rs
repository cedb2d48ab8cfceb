// ============================================================================
// SERVICE : DÉTECTION DE FRAUDE (SMISHING)
// ============================================================================
//
// Description:
//   Réconcilie deux signaux pour chaque SMS reçu:
//     1. la prédiction locale (ML) fournie par le mobile + sa confiance
//     2. une re-vérification IA, appelée seulement si la confiance ML est
//        < 0.85 ou si le ML dit déjà "smish"
//   puis enregistre le verdict (spam_messages).
//
// Points d'attention:
//   - Un échec de l'IA n'empêche JAMAIS l'enregistrement: on garde le ML
//   - Le niveau de menace donné par l'IA est écrasé par la règle de
//     confiance quand la prédiction finale est "smish" (comportement
//     historique conservé, voir tests)
//   - Toutes les requêtes sont filtrées par user_id
//
// ============================================================================

use chrono::{DateTime, Duration, Utc};
use sea_orm::*;
use sea_orm::sea_query::{Asterisk, Expr, SimpleExpr};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::dto::{MlPrediction, SecurityStats};
use crate::models::spam_message::{self, DetectionMethod, ThreatLevel};
use crate::services::ai::SpamClassifier;

// ========== CONSTANTES ==========
pub const AI_VERIFICATION_THRESHOLD: f64 = 0.85; // En dessous => re-vérification IA
pub const HIGH_THREAT_CONFIDENCE: f64 = 0.95;    // Au-dessus (strict) => menace "high"
pub const DEFAULT_PAGE_SIZE: u64 = 50;
pub const MAX_PAGE_SIZE: u64 = 200;
// ================================

/// Résultat de la réconciliation ML + IA, avant persistance
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub prediction: MlPrediction,
    pub threat_level: ThreatLevel,
    pub detection_method: DetectionMethod,
    pub ai_confidence: Option<f64>,
}

/// SMS à classer
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub phone_number: String,
    pub message_text: String,
    pub ml_prediction: Option<MlPrediction>,
    pub ml_confidence: Option<f64>,
}

/// L'IA est consultée si la confiance ML est présente et sous le seuil, ou si le ML dit "smish"
pub fn should_verify(ml_confidence: Option<f64>, prediction: MlPrediction) -> bool {
    let low_confidence = ml_confidence.is_some_and(|c| c < AI_VERIFICATION_THRESHOLD);
    low_confidence || prediction == MlPrediction::Smish
}

/// Applique la politique de réconciliation
pub async fn assess(
    classifier: &dyn SpamClassifier,
    message_text: &str,
    ml_prediction: Option<MlPrediction>,
    ml_confidence: Option<f64>,
) -> Assessment {
    let mut prediction = ml_prediction.unwrap_or_default();
    let mut threat_level = ThreatLevel::Low;
    let mut detection_method = DetectionMethod::Ml;
    let mut ai_confidence = None;

    // Une confiance présente à 0.0 compte comme basse (et non comme absente)
    if should_verify(ml_confidence, prediction) {
        match classifier.classify(message_text).await {
            Ok(verdict) => {
                ai_confidence = Some(verdict.confidence);
                detection_method = DetectionMethod::Both;

                if verdict.is_spam {
                    prediction = MlPrediction::Smish;
                    threat_level = verdict.threat_level;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "AI analysis failed, keeping ML prediction");
            }
        }
    }

    match prediction {
        MlPrediction::Smish => {
            threat_level = if ml_confidence.is_some_and(|c| c > HIGH_THREAT_CONFIDENCE) {
                ThreatLevel::High
            } else {
                ThreatLevel::Medium
            };
        }
        MlPrediction::Promo => threat_level = ThreatLevel::Low,
        MlPrediction::Unknown => {}
    }

    Assessment {
        prediction,
        threat_level,
        detection_method,
        ai_confidence,
    }
}

/// Début des fenêtres "today" (minuit UTC) et "this_week" (minuit UTC - 7 jours)
pub fn stats_windows(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start_of_today = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or(now);

    (start_of_today, start_of_today - Duration::days(7))
}

/// Une ligne d'agrégats calculée côté Postgres
#[derive(Debug, FromQueryResult)]
struct StatsRow {
    total: i64,
    unread: i64,
    high_threat: i64,
    medium_threat: i64,
    low_threat: i64,
    today: i64,
    this_week: i64,
}

impl From<StatsRow> for SecurityStats {
    fn from(row: StatsRow) -> Self {
        let count = |n: i64| u64::try_from(n).unwrap_or_default();
        Self {
            total: count(row.total),
            unread: count(row.unread),
            high_threat: count(row.high_threat),
            medium_threat: count(row.medium_threat),
            low_threat: count(row.low_threat),
            today: count(row.today),
            this_week: count(row.this_week),
        }
    }
}

fn count_where(condition: &str) -> SimpleExpr {
    Expr::cust(format!("COUNT(*) FILTER (WHERE {condition})"))
}

fn count_since(since: DateTime<Utc>) -> SimpleExpr {
    Expr::cust_with_values("COUNT(*) FILTER (WHERE detected_at >= ?)", [since])
}

/// SELECT unique: un COUNT(*) FILTER par compteur
fn stats_query(user_id: Uuid, now: DateTime<Utc>) -> Select<spam_message::Entity> {
    let (start_of_today, start_of_week) = stats_windows(now);

    spam_message::Entity::find()
        .select_only()
        .column_as(Expr::col(Asterisk).count(), "total")
        .column_as(count_where("is_read = FALSE"), "unread")
        .column_as(count_where("threat_level = 'high'"), "high_threat")
        .column_as(count_where("threat_level = 'medium'"), "medium_threat")
        .column_as(count_where("threat_level = 'low'"), "low_threat")
        .column_as(count_since(start_of_today), "today")
        .column_as(count_since(start_of_week), "this_week")
        .filter(spam_message::Column::UserId.eq(user_id))
}

pub struct FraudService;

impl FraudService {
    /// Classe un SMS et enregistre le verdict
    pub async fn detect(
        db: &DatabaseConnection,
        classifier: &dyn SpamClassifier,
        user_id: Uuid,
        message: IncomingMessage,
    ) -> Result<(spam_message::Model, MlPrediction), ApiError> {
        let assessment = assess(
            classifier,
            &message.message_text,
            message.ml_prediction,
            message.ml_confidence,
        )
        .await;

        let record = spam_message::ActiveModel {
            user_id: Set(user_id),
            phone_number: Set(message.phone_number),
            message_text: Set(message.message_text),
            detection_method: Set(assessment.detection_method),
            threat_level: Set(assessment.threat_level),
            ai_confidence: Set(assessment.ai_confidence),
            ml_confidence: Set(message.ml_confidence),
            detected_at: Set(Utc::now()),
            is_read: Set(false),
            is_false_positive: Set(false),
            ..Default::default()
        };

        let saved = record.insert(db).await?;

        tracing::info!(
            %user_id,
            message_id = saved.id,
            method = ?saved.detection_method,
            threat = ?saved.threat_level,
            "spam verdict recorded"
        );

        Ok((saved, assessment.prediction))
    }

    /// Liste paginée, plus récents en premier
    pub async fn list(
        db: &DatabaseConnection,
        user_id: Uuid,
        limit: Option<u64>,
        offset: Option<u64>,
        unread_only: bool,
    ) -> Result<Vec<spam_message::Model>, ApiError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

        let mut query = spam_message::Entity::find()
            .filter(spam_message::Column::UserId.eq(user_id));

        if unread_only {
            query = query.filter(spam_message::Column::IsRead.eq(false));
        }

        let messages = query
            .order_by_desc(spam_message::Column::DetectedAt)
            .limit(limit)
            .offset(offset.unwrap_or(0))
            .all(db)
            .await?;

        Ok(messages)
    }

    pub async fn find(
        db: &DatabaseConnection,
        user_id: Uuid,
        id: i32,
    ) -> Result<spam_message::Model, ApiError> {
        spam_message::Entity::find_by_id(id)
            .filter(spam_message::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found("Message not found"))
    }

    pub async fn mark_as_read(
        db: &DatabaseConnection,
        user_id: Uuid,
        id: i32,
    ) -> Result<spam_message::Model, ApiError> {
        let message = Self::find(db, user_id, id).await?;

        let mut active: spam_message::ActiveModel = message.into();
        active.is_read = Set(true);
        Ok(active.update(db).await?)
    }

    /// "Safe" côté client: faux positif
    pub async fn mark_as_false_positive(
        db: &DatabaseConnection,
        user_id: Uuid,
        id: i32,
    ) -> Result<spam_message::Model, ApiError> {
        let message = Self::find(db, user_id, id).await?;

        let mut active: spam_message::ActiveModel = message.into();
        active.is_false_positive = Set(true);
        Ok(active.update(db).await?)
    }

    pub async fn delete(
        db: &DatabaseConnection,
        user_id: Uuid,
        id: i32,
    ) -> Result<(), ApiError> {
        let result = spam_message::Entity::delete_many()
            .filter(spam_message::Column::Id.eq(id))
            .filter(spam_message::Column::UserId.eq(user_id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ApiError::not_found("Message not found"));
        }

        Ok(())
    }

    pub async fn stats(
        db: &DatabaseConnection,
        user_id: Uuid,
    ) -> Result<SecurityStats, ApiError> {
        let row = stats_query(user_id, Utc::now())
            .into_model::<StatsRow>()
            .one(db)
            .await?;

        Ok(row.map(SecurityStats::from).unwrap_or_default())
    }
}
