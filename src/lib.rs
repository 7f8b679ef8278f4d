//! Gatekeeper - Sliding-Window Rate Limiting Service
//!
//! This crate implements an in-memory, per-client sliding-window rate
//! limiter and a thin HTTP front that consults it before serving a
//! protected resource. State lives in a single process and is not persisted.

pub mod config;
pub mod error;
pub mod http;
pub mod ratelimit;
