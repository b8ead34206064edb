use pretty_assertions::assert_eq;
use serial_test::serial;
use std::env;

use leavedesk::Config;

mod common;

fn set_var(key: &str, value: &str) {
    // SAFETY: tests that touch the process environment are #[serial]
    unsafe { env::set_var(key, value) };
}

fn remove_var(key: &str) {
    // SAFETY: tests that touch the process environment are #[serial]
    unsafe { env::remove_var(key) };
}

#[test]
#[serial]
fn from_env_requires_jwt_secret() {
    remove_var("JWT_SECRET");

    let result = Config::from_env_only();

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("JWT_SECRET"));
}

#[test]
#[serial]
fn from_env_rejects_short_jwt_secret() {
    set_var("JWT_SECRET", "too-short");

    let result = Config::from_env_only();

    assert!(result.is_err());
    remove_var("JWT_SECRET");
}

#[test]
#[serial]
fn from_env_applies_defaults() {
    set_var("JWT_SECRET", "test-jwt-secret-key-that-is-long-enough");
    remove_var("HOST");
    remove_var("PORT");
    remove_var("ENVIRONMENT");
    remove_var("JWT_EXPIRE_HOURS");

    let config = Config::from_env_only().unwrap();

    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8080);
    assert_eq!(config.environment, "development");
    assert_eq!(config.jwt_expiration_hours, 24);
    assert!(config.is_development());
    assert!(!config.is_production());

    remove_var("JWT_SECRET");
}

#[test]
#[serial]
fn server_address_joins_host_and_port() {
    let mut config = common::test_config();
    config.host = "0.0.0.0".to_string();
    config.port = 9999;

    assert_eq!(config.server_address(), "0.0.0.0:9999");
}
