use actix_web::{web, HttpResponse};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

use crate::database::models::{Role, User};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::{AuthService, Claims};

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let full_name = user.full_name();
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            full_name,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// POST /api/v1/auth/login
pub async fn login(
    auth_service: web::Data<AuthService>,
    input: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();

    if !email_regex().is_match(input.email.trim()) {
        return Err(AppError::BadRequest("invalid email format".to_string()));
    }
    if input.password.is_empty() {
        return Err(AppError::BadRequest("password is required".to_string()));
    }

    let (token, user) = auth_service.login(&input.email, &input.password).await?;

    log::info!("user {} logged in", user.id);

    Ok(HttpResponse::Ok().json(ApiResponse::success(LoginResponse {
        token,
        user: user.into(),
    })))
}

/// GET /api/v1/auth/me
pub async fn me(
    claims: Claims,
    auth_service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let user = auth_service.user_by_id(claims.user_id()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(UserResponse::from(user))))
}
