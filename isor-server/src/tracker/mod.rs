//! Rate-limited queries against the portal.

mod service;
mod throttle;

pub use service::{QueryOutcome, Tracker};
pub use throttle::{Acquire, QueryClass, RateLimitConfig, RateLimiter};
