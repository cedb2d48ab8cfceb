use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::*;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::account;
use crate::models::dto::{CreateTransactionRequest, TransactionFilter};
use crate::models::transaction::{self, TransactionType};
use crate::utils::dates::parse_date_time;

pub struct TransactionService;

/// Transaction validée, prête à être insérée
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub category: String,
    pub account_id: Uuid,
    pub date: DateTime<Utc>,
    pub note: Option<String>,
}

impl TryFrom<CreateTransactionRequest> for NewTransaction {
    type Error = ApiError;

    fn try_from(request: CreateTransactionRequest) -> Result<Self, Self::Error> {
        let (Some(amount), Some(transaction_type), Some(category), Some(account_id), Some(date)) = (
            request.amount,
            request.transaction_type,
            request.category,
            request.account_id,
            request.date,
        ) else {
            return Err(ApiError::bad_request("Missing required fields"));
        };

        if amount <= Decimal::ZERO {
            return Err(ApiError::bad_request("Amount must be greater than 0"));
        }

        let date = parse_date_time(&date)
            .ok_or_else(|| ApiError::bad_request("Invalid date format (expected YYYY-MM-DD or RFC 3339)"))?;

        Ok(Self {
            amount,
            transaction_type,
            category,
            account_id,
            date,
            note: request.note.filter(|n| !n.trim().is_empty()),
        })
    }
}

/// Bornes [from, to) validées
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn from_filter(filter: &TransactionFilter) -> Result<Self, ApiError> {
        let parse = |raw: &Option<String>, name: &str| -> Result<Option<DateTime<Utc>>, ApiError> {
            match raw {
                None => Ok(None),
                Some(s) => parse_date_time(s)
                    .map(Some)
                    .ok_or_else(|| ApiError::bad_request(format!("Invalid '{}' date", name))),
            }
        };

        let range = Self {
            from: parse(&filter.from, "from")?,
            to: parse(&filter.to, "to")?,
        };

        if let (Some(from), Some(to)) = (range.from, range.to) {
            if from > to {
                return Err(ApiError::bad_request("'from' must not be after 'to'"));
            }
        }

        Ok(range)
    }
}

impl TransactionService {
    /// Enregistre une transaction. Le solde du compte n'est PAS modifié.
    pub async fn create(
        db: &DatabaseConnection,
        user_id: Uuid,
        new: NewTransaction,
    ) -> Result<transaction::Model, ApiError> {
        // Le compte référencé doit exister et appartenir à l'utilisateur
        let referenced = account::Entity::find_by_id(new.account_id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found("Account not found"))?;

        if referenced.user_id != user_id {
            return Err(ApiError::forbidden("User not authorized to use this account"));
        }

        let record = transaction::ActiveModel {
            user_id: Set(user_id),
            account_id: Set(Some(new.account_id)),
            amount: Set(new.amount),
            transaction_type: Set(new.transaction_type),
            category: Set(new.category),
            date: Set(new.date),
            note: Set(new.note),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        Ok(record.insert(db).await?)
    }

    /// Transactions de l'utilisateur, filtrées, triées par date décroissante
    pub async fn list(
        db: &DatabaseConnection,
        user_id: Uuid,
        filter: &TransactionFilter,
    ) -> Result<Vec<transaction::Model>, ApiError> {
        let range = DateRange::from_filter(filter)?;

        let mut query = transaction::Entity::find()
            .filter(transaction::Column::UserId.eq(user_id));

        if let Some(kind) = filter.transaction_type {
            query = query.filter(transaction::Column::TransactionType.eq(kind));
        }
        if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
            query = query.filter(transaction::Column::Category.eq(category));
        }
        if let Some(from) = range.from {
            query = query.filter(transaction::Column::Date.gte(from));
        }
        if let Some(to) = range.to {
            query = query.filter(transaction::Column::Date.lt(to));
        }

        let transactions = query
            .order_by_desc(transaction::Column::Date)
            .order_by_desc(transaction::Column::Id)
            .all(db)
            .await?;

        Ok(transactions)
    }

    pub async fn delete(
        db: &DatabaseConnection,
        user_id: Uuid,
        id: i32,
    ) -> Result<(), ApiError> {
        let result = transaction::Entity::delete_many()
            .filter(transaction::Column::Id.eq(id))
            .filter(transaction::Column::UserId.eq(user_id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ApiError::not_found("Transaction not found"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request(amount: i64, date: &str) -> CreateTransactionRequest {
        CreateTransactionRequest {
            amount: Some(Decimal::from(amount)),
            transaction_type: Some(TransactionType::Expense),
            category: Some("Food".to_string()),
            account_id: Some(Uuid::new_v4()),
            date: Some(date.to_string()),
            note: Some("  ".to_string()),
        }
    }

    fn account_of(owner: Uuid, id: Uuid) -> account::Model {
        account::Model {
            id,
            user_id: owner,
            name: "Wallet".to_string(),
            account_type: "cash".to_string(),
            parent_type: "cash".to_string(),
            balance: Decimal::ZERO,
            currency: "BDT".to_string(),
            is_default: true,
            include_in_savings: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_valid_request_converts() {
        let new = NewTransaction::try_from(request(120, "2025-02-10")).unwrap();

        assert_eq!(new.amount, Decimal::from(120));
        assert_eq!(new.date, Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap());
        assert_eq!(new.note, None);
    }

    #[test]
    fn test_missing_field_rejected() {
        let mut req = request(10, "2025-02-10");
        req.category = None;
        assert!(matches!(NewTransaction::try_from(req), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        assert!(NewTransaction::try_from(request(0, "2025-02-10")).is_err());
        assert!(NewTransaction::try_from(request(-5, "2025-02-10")).is_err());
    }

    #[test]
    fn test_bad_date_rejected() {
        assert!(NewTransaction::try_from(request(10, "10/02/2025")).is_err());
    }

    #[test]
    fn test_date_range_order() {
        let filter = TransactionFilter {
            from: Some("2025-03-01".to_string()),
            to: Some("2025-02-01".to_string()),
            ..Default::default()
        };
        assert!(DateRange::from_filter(&filter).is_err());

        let filter = TransactionFilter {
            from: Some("2025-02-01".to_string()),
            to: Some("2025-03-01".to_string()),
            ..Default::default()
        };
        let range = DateRange::from_filter(&filter).unwrap();
        assert_eq!(range.to, Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()));
    }

    #[tokio::test]
    async fn test_foreign_account_is_forbidden() {
        let new = NewTransaction::try_from(request(10, "2025-02-10")).unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![account_of(Uuid::new_v4(), new.account_id)]])
            .into_connection();

        let err = TransactionService::create(&db, Uuid::new_v4(), new).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_create_on_own_account() {
        let owner = Uuid::new_v4();
        let new = NewTransaction::try_from(request(10, "2025-02-10")).unwrap();
        let stored = transaction::Model {
            id: 1,
            user_id: owner,
            account_id: Some(new.account_id),
            amount: new.amount,
            transaction_type: TransactionType::Expense,
            category: "Food".to_string(),
            date: new.date,
            note: None,
            created_at: Utc::now(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![account_of(owner, new.account_id)]])
            .append_query_results([vec![stored.clone()]])
            .into_connection();

        let created = TransactionService::create(&db, owner, new).await.unwrap();
        assert_eq!(created, stored);
    }

    #[tokio::test]
    async fn test_delete_missing_transaction() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 0 }])
            .into_connection();

        let err = TransactionService::delete(&db, Uuid::new_v4(), 3).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
