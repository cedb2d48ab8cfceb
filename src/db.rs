// connexion BD + création du schéma

use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{ConnectionTrait, ConnectOptions, Database, DatabaseConnection, DbErr, EntityTrait, Schema};

use crate::config::AppConfig;
use crate::models::{account, budget, category, spam_message, transaction, users};

pub async fn establish_connection(config: &AppConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options.sqlx_logging(false);

    Database::connect(options).await
}

/// CREATE TABLE IF NOT EXISTS pour une entité
async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<(), DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();

    db.execute(db.get_database_backend().build(&statement)).await?;
    Ok(())
}

fn spam_indexes() -> [IndexCreateStatement; 2] {
    [
        Index::create()
            .if_not_exists()
            .name("idx_spam_messages_user_id")
            .table(spam_message::Entity)
            .col(spam_message::Column::UserId)
            .to_owned(),
        Index::create()
            .if_not_exists()
            .name("idx_spam_messages_detected_at")
            .table(spam_message::Entity)
            .col(spam_message::Column::DetectedAt)
            .to_owned(),
    ]
}

/// Crée les tables manquantes (ordre des clés étrangères) + index
pub async fn ensure_schema<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    create_table(db, &schema, users::Entity).await?;
    create_table(db, &schema, category::Entity).await?;
    create_table(db, &schema, account::Entity).await?;
    create_table(db, &schema, transaction::Entity).await?;
    create_table(db, &schema, budget::Entity).await?;
    create_table(db, &schema, spam_message::Entity).await?;

    for index in spam_indexes() {
        db.execute(backend.build(&index)).await?;
    }

    tracing::info!("database schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_ensure_schema_creates_tables_in_fk_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results((0..8).map(|_| MockExecResult { last_insert_id: 0, rows_affected: 0 }))
            .into_connection();

        ensure_schema(&db).await.unwrap();

        let log: Vec<String> = db
            .into_transaction_log()
            .iter()
            .map(|t| format!("{:?}", t))
            .collect();

        assert_eq!(log.len(), 8);
        assert!(log.iter().take(6).all(|s| s.contains("CREATE TABLE IF NOT EXISTS")));
        assert!(log[0].contains("users"));
        assert!(log[5].contains("spam_messages"));
        assert!(log[6].contains("idx_spam_messages_user_id"));
        assert!(log[7].contains("idx_spam_messages_detected_at"));
    }
}
