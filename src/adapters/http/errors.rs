use actix_web::{
  HttpResponse,
  error::ResponseError,
  http::{StatusCode, header::ContentType},
};
use std::fmt;

use crate::domain::auth::errors::{AuthError, RepositoryError};
use crate::domain::invoice::InvoiceError;

use super::dtos::ErrorResponse;

const DEFAULT_INTERNAL_MESSAGE: &str = "Internal server error";

/// API error type that maps domain errors to HTTP responses
#[derive(Debug)]
pub enum ApiError {
  /// Malformed request (400 Bad Request)
  Validation(String),

  /// No valid session (401 Unauthorized)
  Unauthorized,

  /// Invoice missing or owned by someone else (404 Not Found)
  InvoiceNotFound,

  /// Operation not allowed in the current state (409 Conflict)
  Conflict(String),

  /// Internal server error (500). `public` is what the client sees,
  /// `detail` only goes to the log.
  Internal {
    public: &'static str,
    detail: String,
  },
}

impl ApiError {
  pub fn internal(detail: impl Into<String>) -> Self {
    ApiError::Internal {
      public: DEFAULT_INTERNAL_MESSAGE,
      detail: detail.into(),
    }
  }

  /// Replaces the client-facing message of a 500; other errors pass through
  pub fn or_internal(self, public: &'static str) -> Self {
    match self {
      ApiError::Internal { detail, .. } => ApiError::Internal { public, detail },
      other => other,
    }
  }

  fn message(&self) -> String {
    match self {
      ApiError::Validation(msg) => msg.clone(),
      ApiError::Unauthorized => "Unauthorized".to_string(),
      ApiError::InvoiceNotFound => "Invoice not found".to_string(),
      ApiError::Conflict(msg) => msg.clone(),
      ApiError::Internal { public, .. } => public.to_string(),
    }
  }
}

impl fmt::Display for ApiError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ApiError::Internal { public, detail } => write!(f, "{}: {}", public, detail),
      other => f.write_str(&other.message()),
    }
  }
}

impl ResponseError for ApiError {
  fn status_code(&self) -> StatusCode {
    match self {
      ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::InvoiceNotFound => StatusCode::NOT_FOUND,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    if let ApiError::Internal { detail, .. } = self {
      // Don't expose internal error details
      tracing::error!("Internal error: {}", detail);
    }

    HttpResponse::build(self.status_code())
      .content_type(ContentType::json())
      .json(ErrorResponse {
        error: self.message(),
      })
  }
}

/// Convert InvoiceError to ApiError
impl From<InvoiceError> for ApiError {
  fn from(error: InvoiceError) -> Self {
    match error {
      InvoiceError::AuthRequired => ApiError::Unauthorized,
      InvoiceError::InvoiceNotFound(_) => ApiError::InvoiceNotFound,
      InvoiceError::Validation(err) => ApiError::Validation(err.to_string()),
      InvoiceError::InvalidStatusTransition { .. } => ApiError::Conflict(error.to_string()),
      InvoiceError::Auth(err) => ApiError::from(err),
      other => ApiError::internal(other.to_string()),
    }
  }
}

/// Convert AuthError to ApiError
impl From<AuthError> for ApiError {
  fn from(error: AuthError) -> Self {
    match error {
      AuthError::InvalidSession | AuthError::UserNotFound => ApiError::Unauthorized,
      AuthError::ValueObject(_) => ApiError::Unauthorized,
      AuthError::Repository(RepositoryError::NotFound) => ApiError::Unauthorized,
      AuthError::Repository(err) => ApiError::internal(err.to_string()),
    }
  }
}

impl From<tera::Error> for ApiError {
  fn from(error: tera::Error) -> Self {
    ApiError::internal(format!("Template error: {:?}", error))
  }
}
