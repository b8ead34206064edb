use actix_web::{http::StatusCode, test, web, App};
use pretty_assertions::assert_eq;
use serde_json::json;
use serial_test::serial;

mod common;

macro_rules! test_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($ctx.auth_service.clone()))
                .app_data(web::Data::new($ctx.leave_service))
                .app_data(web::Data::new($ctx.config.clone()))
                .configure(common::api_routes),
        )
        .await
    };
}

#[actix_web::test]
#[serial]
async fn login_rejects_malformed_email() {
    let ctx = common::TestContext::new();
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(&json!({
            "email": "not-an-email",
            "password": "password123"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
}

#[actix_web::test]
#[serial]
async fn login_rejects_empty_password() {
    let ctx = common::TestContext::new();
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(&json!({
            "email": "employee@company.com",
            "password": ""
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
#[serial]
async fn login_rejects_missing_fields() {
    let ctx = common::TestContext::new();
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(&json!({ "email": "employee@company.com" }))
        .to_request();

    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
#[serial]
async fn me_requires_authentication() {
    let ctx = common::TestContext::new();
    let app = test_app!(ctx);

    let req = test::TestRequest::get().uri("/api/v1/auth/me").to_request();

    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn me_rejects_garbage_token() {
    let ctx = common::TestContext::new();
    let app = test_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .to_request();

    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn me_rejects_token_signed_with_wrong_secret() {
    let ctx = common::TestContext::new();

    let mut foreign_config = common::test_config();
    foreign_config.jwt_secret = "a-completely-different-32-char-secret!!".to_string();
    let token = common::token_for(
        &foreign_config,
        leavedesk::database::models::Role::Employee,
    );

    let app = test_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();

    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
