//! Rate limiting logic and state management.

mod backend;
mod clock;
mod info;
mod limiter;
mod window;

pub use backend::RateLimiterBackend;
pub use clock::{Clock, ManualClock, SystemClock};
pub use info::{RateLimitInfo, RateLimitStatus};
pub use limiter::{RateLimiter, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_SECONDS};
pub use window::SlidingWindow;
