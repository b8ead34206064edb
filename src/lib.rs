pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pagination;
pub mod services;

pub use config::Config;
pub use database::repositories::{LeaveBalanceRepository, LeaveRequestRepository, UserRepository};
pub use error::{AppError, LeaveError};
pub use services::{AuthService, LeaveService};

/// The service wired to the Postgres-backed stores, as registered in app data.
pub type AppLeaveService = LeaveService<LeaveRequestRepository, LeaveBalanceRepository>;
