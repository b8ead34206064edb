#![allow(dead_code)]

use actix_web::web;
use chrono::{Duration, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use leavedesk::database::models::Role;
use leavedesk::database::repositories::{
    LeaveBalanceRepository, LeaveRequestRepository, UserRepository,
};
use leavedesk::handlers::{auth, leave};
use leavedesk::services::auth::Claims;
use leavedesk::{AppLeaveService, AuthService, Config, LeaveService};

pub struct TestContext {
    pub auth_service: AuthService,
    pub leave_service: AppLeaveService,
    pub config: Config,
}

impl TestContext {
    pub fn new() -> Self {
        let config = test_config();

        // Lazy pool: no connection is opened until a query actually runs, so
        // tests that are rejected before touching storage need no database.
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("valid database url");

        let auth_service = AuthService::new(config.clone(), UserRepository::new(pool.clone()));
        let leave_service = LeaveService::new(
            LeaveRequestRepository::new(pool.clone()),
            LeaveBalanceRepository::new(pool),
        );

        Self {
            auth_service,
            leave_service,
            config,
        }
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost:5432/leavedesk_test".to_string(),
        jwt_secret: "test-jwt-secret-key-that-is-long-enough".to_string(),
        jwt_expiration_hours: 1,
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        cors_origin: "http://localhost:3000".to_string(),
    }
}

/// A signed token for an arbitrary user with the given role.
pub fn token_for(config: &Config, role: Role) -> String {
    token_for_user(config, Uuid::new_v4(), role)
}

pub fn token_for_user(config: &Config, user_id: Uuid, role: Role) -> String {
    let claims = Claims {
        sub: user_id,
        email: SafeEmail().fake(),
        role,
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_ref()),
    )
    .expect("token encodes")
}

/// The `/api/v1` routes under test, mirroring the server wiring.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(
                web::scope("/auth")
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            .service(
                web::scope("/leaves")
                    .route("", web::post().to(leave::submit_leave))
                    .route("/my-requests", web::get().to(leave::my_requests))
                    .route("/my-balance", web::get().to(leave::my_balance)),
            )
            .service(
                web::scope("/manager")
                    .route("/pending-requests", web::get().to(leave::pending_requests))
                    .route(
                        "/requests/{id}/approve",
                        web::post().to(leave::approve_leave),
                    )
                    .route(
                        "/requests/{id}/reject",
                        web::post().to(leave::reject_leave),
                    ),
            ),
    );
}
