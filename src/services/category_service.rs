use sea_orm::*;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::category::{self, CategoryType};

pub struct CategoryService;

impl CategoryService {
    /// Catégories système + catégories de l'utilisateur pour un type, triées par nom
    pub async fn list(
        db: &DatabaseConnection,
        user_id: Uuid,
        category_type: CategoryType,
    ) -> Result<Vec<category::Model>, ApiError> {
        let categories = category::Entity::find()
            .filter(Self::visible_to(user_id))
            .filter(category::Column::CategoryType.eq(category_type))
            .order_by_asc(category::Column::Name)
            .all(db)
            .await?;

        Ok(categories)
    }

    /// Une catégorie visible par l'utilisateur (système ou à lui)
    pub async fn find_visible(
        db: &DatabaseConnection,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<category::Model>, DbErr> {
        category::Entity::find_by_id(id)
            .filter(Self::visible_to(user_id))
            .one(db)
            .await
    }

    fn visible_to(user_id: Uuid) -> Condition {
        Condition::any()
            .add(category::Column::UserId.eq(user_id))
            .add(category::Column::IsSystem.eq(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_includes_system_categories() {
        let user_id = Uuid::new_v4();
        let rows = vec![
            category::Model {
                id: Uuid::new_v4(),
                user_id: None,
                name: "Food".to_string(),
                category_type: CategoryType::Expense,
                is_system: true,
            },
            category::Model {
                id: Uuid::new_v4(),
                user_id: Some(user_id),
                name: "Rickshaw".to_string(),
                category_type: CategoryType::Expense,
                is_system: false,
            },
        ];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([rows.clone()])
            .into_connection();

        let result = CategoryService::list(&db, user_id, CategoryType::Expense).await.unwrap();
        assert_eq!(result, rows);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("is_system"));
        assert!(log.contains("ORDER BY"));
    }
}
