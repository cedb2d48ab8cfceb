// ============================================================================
// MODÈLE : SPAM MESSAGES
// ============================================================================
//
// Description:
//   Un enregistrement par SMS classé par le moteur de détection de fraude.
//
// Colonnes de la table spam_messages:
//   - id (SERIAL, PRIMARY KEY)
//   - user_id (UUID, NOT NULL, FK vers users)
//   - phone_number (VARCHAR, NOT NULL)
//   - message_text (TEXT, NOT NULL)
//   - detection_method ('ml' | 'ai' | 'both')
//   - threat_level ('low' | 'medium' | 'high')
//   - ai_confidence, ml_confidence (0.0 - 1.0, NULL si absent)
//   - detected_at (TIMESTAMPTZ)
//   - is_read, is_false_positive (BOOLEAN, DEFAULT FALSE)
//
// Points d'attention:
//   - Seuls is_read et is_false_positive changent après insertion
//   - Toutes les requêtes filtrent sur user_id
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    #[sea_orm(string_value = "ml")]
    Ml,
    #[sea_orm(string_value = "ai")]
    Ai,
    #[sea_orm(string_value = "both")]
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    #[default]
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "spam_messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: Uuid,
    pub phone_number: String,
    #[sea_orm(column_type = "Text")]
    pub message_text: String,
    pub detection_method: DetectionMethod,
    pub threat_level: ThreatLevel,
    pub ai_confidence: Option<f64>,
    pub ml_confidence: Option<f64>,
    pub detected_at: DateTimeUtc,
    pub is_read: bool,
    pub is_false_positive: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
