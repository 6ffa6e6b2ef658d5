pub mod catalog;
pub mod rate_limit;
pub mod seats;
pub mod showtimes;

pub use catalog::Catalog;
pub use rate_limit::{MemoryRateLimiter, RateLimiter, RedisRateLimiter};
