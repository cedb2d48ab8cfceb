use actix_web::{post, get, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::dto::{AuthResponse, ChangePasswordRequest, LoginRequest, SignupRequest};
use crate::services::auth_service::AuthService;

/// POST /api/auth/signup - Créer un compte + comptes par défaut (PUBLIC)
#[post("/signup")]
pub async fn signup(
    body: web::Json<SignupRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    request.validate()?;

    let session = AuthService::signup(db.get_ref(), &config.jwt_secret, request).await?;

    Ok(HttpResponse::Created().json(AuthResponse {
        message: "User registered successfully".to_string(),
        user: session.user,
        token: session.token,
    }))
}

/// POST /api/auth/login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    request.validate()?;

    let session = AuthService::login(db.get_ref(), &config.jwt_secret, request).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "Login successful".to_string(),
        user: session.user,
        token: session.token,
    }))
}

/// GET /api/auth/me - Profil de l'utilisateur courant (PROTÉGÉE)
#[get("/me")]
pub async fn me(auth_user: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(auth_user.profile)
}

/// POST /api/auth/change-password - Changer son mot de passe (PROTÉGÉE)
#[post("/change-password")]
pub async fn change_password(
    auth_user: AuthUser,
    body: web::Json<ChangePasswordRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    request.validate()?;

    AuthService::change_password(db.get_ref(), auth_user.user_id, request).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Password changed successfully"
    })))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(signup)
            .service(login)
            .service(me)
            .service(change_password)
    );
}
