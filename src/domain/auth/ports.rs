use async_trait::async_trait;
use uuid::Uuid;

use super::entities::{Session, User, UserProfile};
use super::errors::AuthError;

/// Repository trait for user persistence operations
#[async_trait]
pub trait UserRepository: Send + Sync {
  /// Finds a user by their unique identifier
  async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError>;

  /// Stores the onboarding profile. `None` when the user does not exist.
  async fn update_profile(
    &self,
    id: Uuid,
    profile: &UserProfile,
  ) -> Result<Option<User>, AuthError>;
}

/// Sessions are written by the sign-in provider; this service only reads
/// them and removes the ones it finds expired.
#[async_trait]
pub trait SessionRepository: Send + Sync {
  /// Finds a session by its token hash
  async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, AuthError>;

  /// Deletes a specific session
  async fn delete(&self, session_id: Uuid) -> Result<(), AuthError>;
}
