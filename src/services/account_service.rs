use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::*;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::account::{self, DEFAULT_CURRENCY};
use crate::models::dto::{CreateAccountRequest, UpdateAccountRequest};

pub struct AccountService;

/// Compte de départ créé à l'inscription
struct SeedAccount {
    name: &'static str,
    account_type: &'static str,
    parent_type: &'static str,
    opening_balance: i64,
    include_in_savings: bool,
}

const DEFAULT_ACCOUNTS: [SeedAccount; 5] = [
    SeedAccount { name: "Wallet", account_type: "cash", parent_type: "cash", opening_balance: 0, include_in_savings: false },
    SeedAccount { name: "bKash", account_type: "bkash", parent_type: "mobile_banking", opening_balance: 0, include_in_savings: false },
    SeedAccount { name: "Nagad", account_type: "nagad", parent_type: "mobile_banking", opening_balance: 0, include_in_savings: false },
    SeedAccount { name: "Bank Account", account_type: "bank", parent_type: "bank", opening_balance: 0, include_in_savings: false },
    SeedAccount { name: "Savings", account_type: "savings", parent_type: "savings", opening_balance: 1000, include_in_savings: true },
];

/// Les comptes par défaut d'un nouvel utilisateur (tous is_default = true)
pub fn default_accounts(user_id: Uuid) -> Vec<account::ActiveModel> {
    let now = Utc::now();

    DEFAULT_ACCOUNTS
        .iter()
        .map(|seed| account::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            name: Set(seed.name.to_string()),
            account_type: Set(seed.account_type.to_string()),
            parent_type: Set(seed.parent_type.to_string()),
            balance: Set(Decimal::from(seed.opening_balance)),
            currency: Set(DEFAULT_CURRENCY.to_string()),
            is_default: Set(true),
            include_in_savings: Set(seed.include_in_savings),
            created_at: Set(now),
        })
        .collect()
}

/// Seul le propriétaire peut modifier un compte
pub fn ensure_owner(account: &account::Model, caller: Uuid, action: &str) -> Result<(), ApiError> {
    if account.user_id != caller {
        return Err(ApiError::forbidden(format!("User not authorized to {} this account", action)));
    }
    Ok(())
}

/// Propriétaire + compte non par défaut
pub fn ensure_deletable(account: &account::Model, caller: Uuid) -> Result<(), ApiError> {
    ensure_owner(account, caller, "delete")?;
    if account.is_default {
        return Err(ApiError::bad_request("Default accounts cannot be deleted"));
    }
    Ok(())
}

impl AccountService {
    /// Crée les comptes par défaut (appelé dans la transaction d'inscription)
    pub async fn provision_defaults<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> Result<usize, DbErr> {
        let accounts = default_accounts(user_id);
        let count = accounts.len();

        account::Entity::insert_many(accounts)
            .exec_without_returning(db)
            .await?;

        Ok(count)
    }

    /// Comptes de l'utilisateur, plus récents en premier
    pub async fn list(
        db: &DatabaseConnection,
        user_id: Uuid,
    ) -> Result<Vec<account::Model>, ApiError> {
        let accounts = account::Entity::find()
            .filter(account::Column::UserId.eq(user_id))
            .order_by_desc(account::Column::CreatedAt)
            .all(db)
            .await?;

        Ok(accounts)
    }

    pub async fn create(
        db: &DatabaseConnection,
        user_id: Uuid,
        request: CreateAccountRequest,
    ) -> Result<account::Model, ApiError> {
        let (Some(name), Some(account_type), Some(parent_type)) =
            (request.name, request.account_type, request.parent_type)
        else {
            return Err(ApiError::bad_request("Name, type, and parent_type are required"));
        };

        let new_account = account::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            name: Set(name),
            account_type: Set(account_type),
            parent_type: Set(parent_type),
            balance: Set(request.balance.unwrap_or(Decimal::ZERO)),
            currency: Set(DEFAULT_CURRENCY.to_string()),
            is_default: Set(false),
            include_in_savings: Set(request.include_in_savings.unwrap_or(false)),
            created_at: Set(Utc::now()),
        };

        Ok(new_account.insert(db).await?)
    }

    pub async fn update(
        db: &DatabaseConnection,
        caller: Uuid,
        id: Uuid,
        request: UpdateAccountRequest,
    ) -> Result<account::Model, ApiError> {
        let existing = account::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found("Account not found"))?;

        ensure_owner(&existing, caller, "update")?;

        let mut active: account::ActiveModel = existing.clone().into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(balance) = request.balance {
            active.balance = Set(balance);
        }
        if let Some(include) = request.include_in_savings {
            active.include_in_savings = Set(include);
        }

        // Rien à changer: on évite un UPDATE vide
        if !active.is_changed() {
            return Ok(existing);
        }

        Ok(active.update(db).await?)
    }

    pub async fn delete(
        db: &DatabaseConnection,
        caller: Uuid,
        id: Uuid,
    ) -> Result<(), ApiError> {
        let existing = account::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found("Account not found"))?;

        ensure_deletable(&existing, caller)?;

        account::Entity::delete_by_id(existing.id).exec(db).await?;
        tracing::info!(account_id = %id, user_id = %caller, "account deleted");

        Ok(())
    }
}
