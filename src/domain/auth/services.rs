use std::sync::Arc;
use uuid::Uuid;

use super::entities::{User, UserProfile};
use super::errors::AuthError;
use super::ports::{SessionRepository, UserRepository};
use super::value_objects::SessionToken;

/// Authentication service: resolves bearer tokens to users and keeps
/// the user profile current.
pub struct AuthService {
  user_repo: Arc<dyn UserRepository>,
  session_repo: Arc<dyn SessionRepository>,
}

impl AuthService {
  /// Creates a new instance of AuthService
  pub fn new(user_repo: Arc<dyn UserRepository>, session_repo: Arc<dyn SessionRepository>) -> Self {
    Self {
      user_repo,
      session_repo,
    }
  }

  /// Validates a session token and returns the owning user
  ///
  /// # Errors
  /// Returns `AuthError::InvalidSession` if the token is unknown or expired.
  /// Expired sessions are deleted on the way out.
  pub async fn validate_session(&self, token: SessionToken) -> Result<User, AuthError> {
    let token_hash = token.hash();

    let session = self
      .session_repo
      .find_by_token_hash(token_hash.as_str())
      .await?
      .ok_or(AuthError::InvalidSession)?;

    if session.is_expired() {
      self.session_repo.delete(session.id).await?;
      tracing::debug!(session_id = %session.id, "Deleted expired session");
      return Err(AuthError::InvalidSession);
    }

    self
      .user_repo
      .find_by_id(session.user_id)
      .await?
      .ok_or(AuthError::UserNotFound)
  }

  /// Stores the onboarding profile for a user
  pub async fn update_profile(
    &self,
    user_id: Uuid,
    profile: UserProfile,
  ) -> Result<User, AuthError> {
    self
      .user_repo
      .update_profile(user_id, &profile)
      .await?
      .ok_or(AuthError::UserNotFound)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::auth::Session;
  use crate::testing::{InMemorySessionRepository, InMemoryUserRepository};
  use chrono::{Duration, Utc};

  fn service(
    users: &Arc<InMemoryUserRepository>,
    sessions: &Arc<InMemorySessionRepository>,
  ) -> AuthService {
    AuthService::new(users.clone(), sessions.clone())
  }

  #[tokio::test]
  async fn test_validate_session_returns_user() {
    let users = Arc::new(InMemoryUserRepository::default());
    let sessions = Arc::new(InMemorySessionRepository::default());
    let user = users.insert(User::new("ada@example.com".to_string()));

    let token = SessionToken::from_string("1f".repeat(32)).unwrap();
    sessions.insert(Session::new(
      user.id,
      token.hash().as_str().to_string(),
      Utc::now() + Duration::hours(1),
    ));

    let found = service(&users, &sessions)
      .validate_session(token)
      .await
      .unwrap();
    assert_eq!(found.id, user.id);
  }

  #[tokio::test]
  async fn test_unknown_token_is_rejected() {
    let users = Arc::new(InMemoryUserRepository::default());
    let sessions = Arc::new(InMemorySessionRepository::default());

    let token = SessionToken::from_string("2e".repeat(32)).unwrap();
    let result = service(&users, &sessions).validate_session(token).await;
    assert!(matches!(result, Err(AuthError::InvalidSession)));
  }

  #[tokio::test]
  async fn test_expired_session_is_deleted() {
    let users = Arc::new(InMemoryUserRepository::default());
    let sessions = Arc::new(InMemorySessionRepository::default());
    let user = users.insert(User::new("ada@example.com".to_string()));

    let token = SessionToken::from_string("3d".repeat(32)).unwrap();
    sessions.insert(Session::new(
      user.id,
      token.hash().as_str().to_string(),
      Utc::now() - Duration::minutes(5),
    ));

    let result = service(&users, &sessions).validate_session(token).await;
    assert!(matches!(result, Err(AuthError::InvalidSession)));
    assert_eq!(sessions.len(), 0);
  }

  #[tokio::test]
  async fn test_update_profile_for_unknown_user() {
    let users = Arc::new(InMemoryUserRepository::default());
    let sessions = Arc::new(InMemorySessionRepository::default());

    let result = service(&users, &sessions)
      .update_profile(
        Uuid::new_v4(),
        UserProfile {
          first_name: "Ada".to_string(),
          last_name: "Lovelace".to_string(),
          address: "London".to_string(),
        },
      )
      .await;
    assert!(matches!(result, Err(AuthError::UserNotFound)));
  }
}
