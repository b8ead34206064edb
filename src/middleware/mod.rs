pub mod rate_limit;
pub mod request_id;

pub use rate_limit::{RateLimit, RateLimitConfig, RateLimitStore};
pub use request_id::{RequestId, RequestIdExt};
