pub mod auth;
pub mod leave;

pub use auth::{AuthService, Claims};
pub use leave::{LeaveBalanceStore, LeaveRequestStore, LeaveService};
