use actix_cors::Cors;
use actix_web::{get, middleware::Logger, web, App, HttpResponse, HttpServer, Responder};
use anyhow::Result;

use leavedesk::database::{
    init_database,
    repositories::{LeaveBalanceRepository, LeaveRequestRepository, UserRepository},
};
use leavedesk::handlers::{auth, leave};
use leavedesk::middleware::{RateLimit, RequestId};
use leavedesk::{AuthService, Config, LeaveService};

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("LeaveDesk API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    log::info!(
        "configuration loaded (environment: {})",
        config.environment
    );

    let pool = init_database(&config.database_url).await?;
    log::info!("database initialized");

    let user_repository = UserRepository::new(pool.clone());
    let request_repository = LeaveRequestRepository::new(pool.clone());
    let balance_repository = LeaveBalanceRepository::new(pool.clone());

    let auth_service = AuthService::new(config.clone(), user_repository);
    let leave_service = LeaveService::new(request_repository, balance_repository);

    let auth_service_data = web::Data::new(auth_service);
    let leave_service_data = web::Data::new(leave_service);
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    log::info!("server starting on http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .app_data(auth_service_data.clone())
            .app_data(leave_service_data.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin(&config.cors_origin)
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        "Authorization",
                        "Content-Type",
                        "Accept",
                        "X-Correlation-ID",
                    ])
                    .max_age(3600),
            )
            .wrap(RequestId)
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{User-Agent}i" %T correlation_id=%{x-correlation-id}o"#,
            ))
            .service(hello)
            .service(health)
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/auth")
                            .service(
                                web::resource("/login")
                                    .wrap(RateLimit::login())
                                    .route(web::post().to(auth::login)),
                            )
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
                            .route(
                                "/pending-requests",
                                web::get().to(leave::pending_requests),
                            )
                            .route(
                                "/requests/{id}/approve",
                                web::post().to(leave::approve_leave),
                            )
                            .route(
                                "/requests/{id}/reject",
                                web::post().to(leave::reject_leave),
                            ),
                    ),
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
