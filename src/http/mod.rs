//! HTTP front for the rate limiter.
//!
//! Each request is keyed by the peer IP address. The limiter decides; this
//! layer only turns the decision into a response.

mod handlers;
mod server;

pub use handlers::{protected, root, router, status};
pub use server::HttpServer;
