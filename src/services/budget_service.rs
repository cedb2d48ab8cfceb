use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::*;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::budget::{self, BudgetPeriod};
use crate::models::dto::{CreateBudgetRequest, UpdateBudgetRequest};
use crate::services::category_service::CategoryService;
use crate::utils::dates::month_bounds;

pub struct BudgetService;

/// Modification demandée par PATCH /api/budgets/:id
#[derive(Debug, Clone, PartialEq)]
pub enum BudgetChange {
    SoftDelete,
    Amount(Decimal),
}

impl TryFrom<UpdateBudgetRequest> for BudgetChange {
    type Error = ApiError;

    // is_deleted: true a priorité sur amount; false ne supprime rien
    fn try_from(request: UpdateBudgetRequest) -> Result<Self, Self::Error> {
        match (request.is_deleted, request.amount) {
            (Some(true), _) => Ok(Self::SoftDelete),
            (_, Some(amount)) if amount > Decimal::ZERO => Ok(Self::Amount(amount)),
            (_, Some(_)) => Err(ApiError::bad_request("Amount must be greater than 0")),
            (_, None) => Err(ApiError::bad_request("Nothing to update: provide amount or is_deleted")),
        }
    }
}

/// Budget validé, prêt à être inséré
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub id: Option<Uuid>,
    pub category_id: Uuid,
    pub amount: Decimal,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl TryFrom<CreateBudgetRequest> for NewBudget {
    type Error = ApiError;

    fn try_from(request: CreateBudgetRequest) -> Result<Self, Self::Error> {
        let (Some(category_id), Some(amount), Some(period), Some(start_date)) =
            (request.category_id, request.amount, request.period, request.start_date)
        else {
            return Err(ApiError::bad_request("Missing required fields"));
        };

        if amount <= Decimal::ZERO {
            return Err(ApiError::bad_request("Amount must be greater than 0"));
        }
        if request.end_date.is_some_and(|end| end < start_date) {
            return Err(ApiError::bad_request("end_date must not precede start_date"));
        }

        Ok(Self {
            id: request.id,
            category_id,
            amount,
            period,
            start_date,
            end_date: request.end_date,
        })
    }
}

impl BudgetService {
    /// Budgets mensuels non supprimés dont start_date tombe dans le mois demandé
    pub async fn list_for_month(
        db: &DatabaseConnection,
        user_id: Uuid,
        month: &str,
    ) -> Result<Vec<budget::Model>, ApiError> {
        let (start, end) = month_bounds(month)
            .ok_or_else(|| ApiError::bad_request("Invalid month format"))?;

        let budgets = budget::Entity::find()
            .filter(budget::Column::UserId.eq(user_id))
            .filter(budget::Column::IsDeleted.eq(false))
            .filter(budget::Column::Period.eq(BudgetPeriod::Monthly))
            .filter(budget::Column::StartDate.gte(start))
            .filter(budget::Column::StartDate.lt(end))
            .order_by_desc(budget::Column::CreatedAt)
            .all(db)
            .await?;

        Ok(budgets)
    }

    pub async fn create(
        db: &DatabaseConnection,
        user_id: Uuid,
        new: NewBudget,
    ) -> Result<budget::Model, ApiError> {
        // La catégorie doit être une catégorie système ou appartenir à l'utilisateur
        CategoryService::find_visible(db, user_id, new.category_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Category not found"))?;

        let now = Utc::now();
        let record = budget::ActiveModel {
            id: Set(new.id.unwrap_or_else(Uuid::new_v4)),
            user_id: Set(user_id),
            category_id: Set(new.category_id),
            amount: Set(new.amount),
            period: Set(new.period),
            start_date: Set(new.start_date),
            end_date: Set(new.end_date),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(record.insert(db).await?)
    }

    /// Modifie le plafond ou soft-delete. Jamais de suppression physique.
    pub async fn update(
        db: &DatabaseConnection,
        user_id: Uuid,
        id: Uuid,
        change: BudgetChange,
    ) -> Result<budget::Model, ApiError> {
        let existing = budget::Entity::find_by_id(id)
            .filter(budget::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found("Budget not found"))?;

        let mut active: budget::ActiveModel = existing.into();
        match change {
            BudgetChange::SoftDelete => active.is_deleted = Set(true),
            BudgetChange::Amount(amount) => active.amount = Set(amount),
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(db).await?)
    }
}
