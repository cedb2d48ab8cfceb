use actix_web::{dev::Payload, web, FromRequest, HttpRequest, http::header};
use futures::future::LocalBoxFuture;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::dto::UserProfile;
use crate::models::users::{Entity as Users, Role};
use crate::utils::jwt;

/// Utilisateur authentifié, résolu depuis la BD à chaque requête
/// Utilisé comme extracteur dans les routes protégées
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
    pub profile: UserProfile,
}

impl AuthUser {
    /// Un user_id envoyé par le client doit être celui du token
    pub fn ensure_is(&self, claimed: Option<Uuid>) -> Result<(), ApiError> {
        match claimed {
            Some(id) if id != self.user_id => {
                Err(ApiError::forbidden("Cannot access another user's data"))
            }
            _ => Ok(()),
        }
    }
}

/// Extrait le token du header (format: "Bearer <token>")
fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Vérifie le token puis recharge l'utilisateur (aucun cache entre requêtes)
pub async fn authenticate(
    token: Option<String>,
    db: &DatabaseConnection,
    secret: &str,
) -> Result<AuthUser, ApiError> {
    let token = token.ok_or_else(|| ApiError::unauthorized("Authorization token is required"))?;

    let claims = jwt::verify_token(&token, secret).map_err(|e| {
        tracing::debug!(error = %e, "token rejected");
        ApiError::unauthorized("Invalid or expired token")
    })?;

    let user = Users::find_by_id(claims.sub)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
        profile: user.into(),
    })
}

/// Implémentation de FromRequest pour AuthUser
/// Le lookup BD étant asynchrone, on retourne une future boxée
impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let db = req.app_data::<web::Data<DatabaseConnection>>().cloned();
        let config = req.app_data::<web::Data<AppConfig>>().cloned();

        Box::pin(async move {
            let (db, config) = match (db, config) {
                (Some(db), Some(config)) => (db, config),
                _ => return Err(ApiError::internal("AuthUser extractor: app data not configured")),
            };

            authenticate(token, db.get_ref(), &config.jwt_secret).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::models::users;

    const SECRET: &str = "test-secret";

    fn user(id: Uuid) -> users::Model {
        users::Model {
            id,
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            phone: "1".to_string(),
            password_hash: "pbkdf2:sha256:1$c2FsdA$aGFzaA".to_string(),
            role: Role::User,
            description: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_bearer_token_parsing() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(bearer_token(&req), Some("abc.def.ghi".to_string()));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert_eq!(bearer_token(&req), None);

        let req = TestRequest::default().to_http_request();
        assert_eq!(bearer_token(&req), None);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = authenticate(None, &db, SECRET).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_bad_signature_is_unauthorized() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let token = jwt::generate_token(Uuid::new_v4(), Role::User, "other-secret").unwrap();

        let err = authenticate(Some(token), &db, SECRET).await.unwrap_err();
        assert_eq!(err.public_message(), "Invalid or expired token");
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .into_connection();
        let token = jwt::generate_token(Uuid::new_v4(), Role::User, SECRET).unwrap();

        let err = authenticate(Some(token), &db, SECRET).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_valid_token_resolves_user() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(id)]])
            .into_connection();
        let token = jwt::generate_token(id, Role::User, SECRET).unwrap();

        let auth = authenticate(Some(token), &db, SECRET).await.unwrap();
        assert_eq!(auth.user_id, id);
        assert_eq!(auth.profile.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_claimed_user_id_must_match() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(id)]])
            .into_connection();
        let token = jwt::generate_token(id, Role::User, SECRET).unwrap();
        let auth = authenticate(Some(token), &db, SECRET).await.unwrap();

        assert!(auth.ensure_is(None).is_ok());
        assert!(auth.ensure_is(Some(id)).is_ok());
        assert!(matches!(auth.ensure_is(Some(Uuid::new_v4())), Err(ApiError::Forbidden(_))));
    }
}
