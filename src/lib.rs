//! Invoicing web application: onboarding, invoice management, email
//! notifications and PDF rendering.

pub mod adapters;
pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
mod testing;
