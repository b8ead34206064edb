use actix_web::{http::StatusCode, test, web, App};
use pretty_assertions::assert_eq;
use serde_json::json;
use serial_test::serial;
use uuid::Uuid;

use leavedesk::database::models::Role;

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
async fn submit_leave_requires_authentication() {
    let ctx = common::TestContext::new();
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/leaves")
        .set_json(&json!({
            "leave_type": "sick_leave",
            "start_date": "2026-03-01",
            "end_date": "2026-03-03",
            "reason": "flu"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn my_requests_requires_authentication() {
    let ctx = common::TestContext::new();
    let app = test_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/v1/leaves/my-requests")
        .to_request();

    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn my_balance_requires_authentication() {
    let ctx = common::TestContext::new();
    let app = test_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/v1/leaves/my-balance")
        .to_request();

    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn pending_requests_requires_authentication() {
    let ctx = common::TestContext::new();
    let app = test_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/v1/manager/pending-requests")
        .to_request();

    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn approve_requires_authentication() {
    let ctx = common::TestContext::new();
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/v1/manager/requests/{}/approve",
            Uuid::new_v4()
        ))
        .set_json(&json!({ "note": "ok" }))
        .to_request();

    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn submit_leave_rejects_unknown_leave_type() {
    let ctx = common::TestContext::new();
    let token = common::token_for(&ctx.config, Role::Employee);
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/leaves")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(&json!({
            "leave_type": "maternity",
            "start_date": "2026-03-01",
            "end_date": "2026-03-03",
            "reason": "test"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
}

#[actix_web::test]
#[serial]
async fn submit_leave_rejects_inverted_date_range() {
    let ctx = common::TestContext::new();
    let token = common::token_for(&ctx.config, Role::Employee);
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/v1/leaves")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(&json!({
            "leave_type": "sick_leave",
            "start_date": "2026-03-10",
            "end_date": "2026-03-01",
            "reason": "test"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
#[serial]
async fn pending_requests_rejects_employees() {
    let ctx = common::TestContext::new();
    let token = common::token_for(&ctx.config, Role::Employee);
    let app = test_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/v1/manager/pending-requests")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();

    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
#[serial]
async fn approve_rejects_employees() {
    let ctx = common::TestContext::new();
    let token = common::token_for(&ctx.config, Role::Employee);
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/v1/manager/requests/{}/approve",
            Uuid::new_v4()
        ))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(&json!({ "note": "trying anyway" }))
        .to_request();

    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
#[serial]
async fn reject_rejects_employees() {
    let ctx = common::TestContext::new();
    let token = common::token_for(&ctx.config, Role::Employee);
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/v1/manager/requests/{}/reject",
            Uuid::new_v4()
        ))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(&json!({ "note": null }))
        .to_request();

    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
