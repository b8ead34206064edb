use actix_web::{
    dev::Payload, error::ErrorUnauthorized, web::Data, Error as ActixError, FromRequest,
    HttpRequest,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::{Role, User};
use crate::database::repositories::UserRepository;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    pub email: String,
    pub role: Role,
    pub exp: usize, // expiration time
}

impl Claims {
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }

    pub fn is_employee(&self) -> bool {
        self.role == Role::Employee
    }
}

impl FromRequest for Claims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "));

        if let (Some(token), Some(config)) = (token, req.app_data::<Data<Config>>()) {
            match decode::<Claims>(
                token,
                &DecodingKey::from_secret(config.jwt_secret.as_ref()),
                &Validation::new(Algorithm::HS256),
            ) {
                Ok(token_data) => return ready(Ok(token_data.claims)),
                Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
            }
        }

        ready(Err(ErrorUnauthorized(
            "Missing or invalid authorization header",
        )))
    }
}

#[derive(Clone)]
pub struct AuthService {
    user_repository: UserRepository,
    config: Config,
}

impl AuthService {
    pub fn new(config: Config, user_repository: UserRepository) -> Self {
        Self {
            user_repository,
            config,
        }
    }

    /// Verifies the credentials and issues a signed token. Unknown email and
    /// wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, User), AppError> {
        let email = email.trim().to_lowercase();

        let user = self
            .user_repository
            .find_by_email(&email)
            .await
            .map_err(|e| AppError::Internal(e.into()))?
            .ok_or(AppError::InvalidCredentials)?;

        let password_ok = bcrypt::verify(password, &user.password_hash)
            .map_err(|e| AppError::Internal(e.into()))?;
        if !password_ok {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.issue_token(&user)?;
        Ok((token, user))
    }

    pub async fn user_by_id(&self, id: Uuid) -> Result<User, AppError> {
        self.user_repository
            .find_by_id(id)
            .await
            .map_err(|e| AppError::Internal(e.into()))?
            .ok_or(AppError::Unauthorized)
    }

    fn issue_token(&self, user: &User) -> Result<String, AppError> {
        let expiration = Utc::now() + Duration::hours(self.config.jwt_expiration_hours);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            exp: expiration.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )
        .map_err(|e| AppError::Internal(e.into()))
    }
}
