// ============================================================================
// MODÈLE : ACCOUNTS
// ============================================================================
//
// Colonnes de la table accounts:
//   - id (UUID, PRIMARY KEY)
//   - user_id (UUID, NOT NULL, FK vers users)
//   - name (VARCHAR, NOT NULL)
//   - type (VARCHAR, NOT NULL) - ex: cash, bkash, bank
//   - parent_type (VARCHAR, NOT NULL) - ex: cash, mobile_banking, bank, savings
//   - balance (DECIMAL, DEFAULT 0)
//   - currency (VARCHAR, DEFAULT 'BDT')
//   - is_default (BOOLEAN) - comptes créés à l'inscription, non supprimables
//   - include_in_savings (BOOLEAN)
//   - created_at (TIMESTAMPTZ)
//
// Points d'attention:
//   - Seul le propriétaire peut modifier/supprimer un compte
//   - is_default = true => suppression refusée
//   - Le solde n'est PAS ajusté automatiquement par les transactions
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

pub const DEFAULT_CURRENCY: &str = "BDT";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    #[sea_orm(column_name = "type")]
    pub account_type: String,
    pub parent_type: String,
    pub balance: Decimal,
    pub currency: String,
    pub is_default: bool,
    pub include_in_savings: bool,
    pub created_at: DateTimeUtc,
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

    #[sea_orm(has_many = "super::transaction::Entity")]
    Transaction,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
