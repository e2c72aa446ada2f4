//! Infrastructure layer
//!
//! Adapters for the domain ports: Postgres persistence, the invoice list
//! cache, email delivery, PDF rendering, plus configuration and metrics.

pub mod cache;
pub mod config;
pub mod email;
pub mod metrics;
pub mod pdf;
pub mod persistence;
