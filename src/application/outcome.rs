use crate::domain::auth::{AuthError, RepositoryError, User};

use super::forms::SubmissionReply;

/// Who is making the request. Resolved once per request from the session
/// and handed to every use case.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
  user: Option<User>,
  /// Set when the session store could not be asked
  lookup_failure: Option<String>,
}

impl AuthContext {
  pub fn authenticated(user: User) -> Self {
    Self {
      user: Some(user),
      lookup_failure: None,
    }
  }

  pub fn anonymous() -> Self {
    Self::default()
  }

  /// The session could not be checked because its store failed
  pub fn unavailable(detail: impl Into<String>) -> Self {
    Self {
      user: None,
      lookup_failure: Some(detail.into()),
    }
  }

  /// The signed-in user, `None` for anonymous callers. Fails when the
  /// session lookup itself failed, so callers report a server error
  /// instead of asking the user to sign in again.
  pub fn resolve(&self) -> Result<Option<&User>, AuthError> {
    match &self.lookup_failure {
      Some(detail) => Err(AuthError::Repository(RepositoryError::ConnectionFailed(
        detail.clone(),
      ))),
      None => Ok(self.user.as_ref()),
    }
  }

}

/// Pages a successful action navigates to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
  Dashboard,
  Invoices,
  Onboarding,
}

impl Route {
  pub fn path(&self) -> &'static str {
    match self {
      Route::Dashboard => "/dashboard",
      Route::Invoices => "/dashboard/invoices",
      Route::Onboarding => "/onboarding",
    }
  }
}

/// Result of a form action
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
  Navigate(Route),
  ValidationFailed(SubmissionReply),
  AuthRequired,
}
