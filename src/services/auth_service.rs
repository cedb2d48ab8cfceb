use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::dto::{ChangePasswordRequest, LoginRequest, SignupRequest, UserProfile};
use crate::models::users::{self, Role};
use crate::services::account_service::AccountService;
use crate::utils::{jwt, password};

pub struct AuthService;

/// Identité + token émis après signup/login
#[derive(Debug)]
pub struct Session {
    pub user: UserProfile,
    pub token: String,
}

fn issue_token(user_id: Uuid, role: Role, secret: &str) -> Result<String, ApiError> {
    jwt::generate_token(user_id, role, secret)
        .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))
}

fn hash(plain: &str) -> Result<String, ApiError> {
    password::hash_password(plain)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))
}

fn matches_hash(plain: &str, stored: &str) -> Result<bool, ApiError> {
    password::verify_password(plain, stored)
        .map_err(|e| ApiError::internal(format!("Password verification error: {}", e)))
}

impl AuthService {
    /// Crée l'utilisateur et ses comptes par défaut dans UNE transaction
    pub async fn signup(
        db: &DatabaseConnection,
        secret: &str,
        request: SignupRequest,
    ) -> Result<Session, ApiError> {
        let (Some(name), Some(email), Some(phone), Some(plain)) =
            (request.name, request.email, request.phone, request.password)
        else {
            return Err(ApiError::bad_request("All fields are required"));
        };

        // 1. Vérifier si l'utilisateur existe déjà
        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ApiError::conflict("User already exists"));
        }

        // 2. Hash le mot de passe (avant d'ouvrir la transaction)
        let password_hash = hash(&plain)?;

        // 3. Utilisateur + comptes: tout ou rien
        let txn = db.begin().await?;

        let new_user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            email: Set(email),
            phone: Set(phone),
            password_hash: Set(password_hash),
            role: Set(Role::User),
            description: Set(None),
            created_at: Set(Utc::now()),
        };

        let user = new_user.insert(&txn).await.map_err(|e| match e.sql_err() {
            // Course entre deux inscriptions sur le même email
            Some(SqlErr::UniqueConstraintViolation(_)) => ApiError::conflict("User already exists"),
            _ => ApiError::from(e),
        })?;

        let seeded = AccountService::provision_defaults(&txn, user.id).await?;
        txn.commit().await?;

        tracing::info!(user_id = %user.id, accounts = seeded, "user signed up");

        // 4. Générer le JWT
        let token = issue_token(user.id, user.role, secret)?;

        Ok(Session { user: user.into(), token })
    }

    pub async fn login(
        db: &DatabaseConnection,
        secret: &str,
        request: LoginRequest,
    ) -> Result<Session, ApiError> {
        let (Some(email), Some(plain)) = (request.email, request.password) else {
            return Err(ApiError::bad_request("Email and password are required"));
        };

        // Même message que l'email soit inconnu ou le mot de passe faux
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(db)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

        if !matches_hash(&plain, &user.password_hash)? {
            return Err(ApiError::unauthorized("Invalid credentials"));
        }

        let token = issue_token(user.id, user.role, secret)?;

        Ok(Session { user: user.into(), token })
    }

    pub async fn change_password(
        db: &DatabaseConnection,
        user_id: Uuid,
        request: ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        let user = users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        if !matches_hash(&request.current_password, &user.password_hash)? {
            return Err(ApiError::unauthorized("Current password is incorrect"));
        }

        let new_hash = hash(&request.new_password)?;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.update(db).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn stored_user(plain: &str) -> users::Model {
        users::Model {
            id: Uuid::new_v4(),
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            phone: "1".to_string(),
            password_hash: password::hash_password(plain).unwrap(),
            role: Role::User,
            description: None,
            created_at: Utc::now(),
        }
    }

    fn login_request(plain: &str) -> LoginRequest {
        LoginRequest {
            email: Some("a@x.com".to_string()),
            password: Some(plain.to_string()),
        }
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored_user("p")]])
            .into_connection();

        let err = AuthService::login(&db, SECRET, login_request("wrong")).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert_eq!(err.public_message(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .into_connection();

        let err = AuthService::login(&db, SECRET, login_request("p")).await.unwrap_err();
        assert_eq!(err.public_message(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let user = stored_user("p");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user.clone()]])
            .into_connection();

        let session = AuthService::login(&db, SECRET, login_request("p")).await.unwrap();
        let claims = jwt::verify_token(&session.token, SECRET).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(session.user.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_signup_duplicate_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored_user("p")]])
            .into_connection();

        let request = SignupRequest {
            name: Some("A".to_string()),
            email: Some("a@x.com".to_string()),
            phone: Some("1".to_string()),
            password: Some("p".to_string()),
        };
        let err = AuthService::signup(&db, SECRET, request).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_signup_creates_user_and_accounts_atomically() {
        let user = stored_user("p");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .append_query_results([vec![user.clone()]])
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 5 }])
            .into_connection();

        let request = SignupRequest {
            name: Some("A".to_string()),
            email: Some("a@x.com".to_string()),
            phone: Some("1".to_string()),
            password: Some("p".to_string()),
        };
        let session = AuthService::signup(&db, SECRET, request).await.unwrap();
        assert_eq!(session.user.id, user.id);

        // Insertion du user et des comptes dans la même transaction
        let log = db.into_transaction_log();
        assert!(log.iter().any(|t| {
            let stmts = format!("{:?}", t);
            stmts.contains("INSERT INTO") && stmts.contains("users") && stmts.contains("accounts")
        }));
    }

    #[tokio::test]
    async fn test_change_password_rejects_wrong_current() {
        let user = stored_user("old");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user.clone()]])
            .into_connection();

        let request = ChangePasswordRequest {
            current_password: "nope".to_string(),
            new_password: "new".to_string(),
        };
        let err = AuthService::change_password(&db, user.id, request).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }
}
