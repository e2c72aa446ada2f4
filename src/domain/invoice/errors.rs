use super::value_objects::{InvoiceStatus, ValueObjectError};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::auth::AuthError;
use crate::domain::notification::NotificationError;

#[derive(Debug, Error)]
pub enum InvoiceError {
  #[error("Authentication required")]
  AuthRequired,

  #[error("Validation error: {0}")]
  Validation(#[from] ValueObjectError),

  #[error("Invoice not found: {0}")]
  InvoiceNotFound(Uuid),

  #[error("Invalid status transition from {from} to {to}")]
  InvalidStatusTransition {
    from: InvoiceStatus,
    to: InvoiceStatus,
  },

  #[error("PDF generation failed: {0}")]
  PdfGenerationFailed(String),

  #[error("Notification error: {0}")]
  Notification(#[from] NotificationError),

  #[error("Cache error: {0}")]
  Cache(String),

  #[error("Auth error: {0}")]
  Auth(#[from] AuthError),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Internal error: {0}")]
  Internal(String),
}
