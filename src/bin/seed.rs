//! Seeds demo data for manual testing: one manager, one employee, and their
//! yearly balances. Existing rows are wiped first.
//!
//! Usage: `cargo run --bin seed`

use anyhow::Result;
use bcrypt::{hash, DEFAULT_COST};
use bigdecimal::BigDecimal;
use chrono::{Datelike, Utc};

use leavedesk::database::models::{LeaveBalance, LeaveType, Role, User};
use leavedesk::database::{init_database, repositories::UserRepository};
use leavedesk::Config;

const DEMO_PASSWORD: &str = "password123";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    let pool = init_database(&config.database_url).await?;

    log::info!("wiping existing data...");
    sqlx::query("TRUNCATE leave_requests, leave_balances, users")
        .execute(&pool)
        .await?;

    let users = UserRepository::new(pool.clone());
    let password_hash = hash(DEMO_PASSWORD, DEFAULT_COST)?;

    let manager = User::new(
        "Mara",
        "Ngamsiri",
        "manager@company.com",
        password_hash.clone(),
        Role::Manager,
    );
    let employee = User::new(
        "Ekarat",
        "Boonmee",
        "employee@company.com",
        password_hash,
        Role::Employee,
    );

    users.create(&manager).await?;
    users.create(&employee).await?;

    let year = Utc::now().year();

    for user in [&manager, &employee] {
        for &leave_type in LeaveType::ALL {
            let balance = LeaveBalance::new(user.id, leave_type, default_quota(leave_type), year);
            insert_balance(&pool, &balance).await?;
        }
    }

    println!("Seed data created.");
    println!("  Manager:  manager@company.com / {DEMO_PASSWORD} ({})", manager.id);
    println!("  Employee: employee@company.com / {DEMO_PASSWORD} ({})", employee.id);

    Ok(())
}

fn default_quota(leave_type: LeaveType) -> BigDecimal {
    BigDecimal::from(match leave_type {
        LeaveType::Sick => 30,
        LeaveType::Annual => 15,
        LeaveType::Personal => 10,
    })
}

async fn insert_balance(pool: &sqlx::PgPool, balance: &LeaveBalance) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO
            leave_balances (
                id,
                user_id,
                leave_type,
                year,
                total_days,
                used_days,
                pending_days,
                created_at,
                updated_at
            )
        VALUES
            ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(balance.id)
    .bind(balance.user_id)
    .bind(balance.leave_type)
    .bind(balance.year)
    .bind(&balance.total_days)
    .bind(&balance.used_days)
    .bind(&balance.pending_days)
    .bind(balance.created_at)
    .bind(balance.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}
