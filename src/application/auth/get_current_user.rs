use std::sync::Arc;

use crate::domain::auth::User;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::SessionToken;

/// Use case for getting the current authenticated user
pub struct GetCurrentUserUseCase {
  auth_service: Arc<AuthService>,
}

impl GetCurrentUserUseCase {
  /// Creates a new instance of GetCurrentUserUseCase
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Resolves the session token carried by a request to its user
  ///
  /// # Errors
  /// Returns `AuthError` if the token is malformed, unknown or expired
  pub async fn execute(&self, session_token: String) -> Result<User, AuthError> {
    let token = SessionToken::from_string(session_token)?;
    self.auth_service.validate_session(token).await
  }
}
