use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account. Created by the sign-in provider, completed through onboarding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  /// Unique identifier for the user
  pub id: Uuid,
  /// User's email address (unique)
  pub email: String,
  /// Set during onboarding
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  pub address: Option<String>,
  /// Timestamp when the user was created
  pub created_at: DateTime<Utc>,
  /// Timestamp when the user was last updated
  pub updated_at: DateTime<Utc>,
}

impl User {
  /// Creates a user that has not been onboarded yet
  pub fn new(email: String) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      email,
      first_name: None,
      last_name: None,
      address: None,
      created_at: now,
      updated_at: now,
    }
  }

  /// Applies the onboarding profile
  pub fn update_profile(&mut self, profile: UserProfile) {
    self.first_name = Some(profile.first_name);
    self.last_name = Some(profile.last_name);
    self.address = Some(profile.address);
    self.updated_at = Utc::now();
  }

  /// A user is onboarded once both names are present
  pub fn is_onboarded(&self) -> bool {
    let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
    present(&self.first_name) && present(&self.last_name)
  }

  pub fn display_name(&self) -> String {
    match (&self.first_name, &self.last_name) {
      (Some(first), Some(last)) => format!("{} {}", first, last),
      (Some(first), None) => first.clone(),
      _ => self.email.clone(),
    }
  }
}

/// Profile fields collected during onboarding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
  pub first_name: String,
  pub last_name: String,
  pub address: String,
}

/// Session entity representing an active user session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  /// Unique identifier for the session
  pub id: Uuid,
  /// Reference to the user who owns this session
  pub user_id: Uuid,
  /// SHA-256 hash of the bearer token
  pub session_token: String,
  /// Timestamp when the session expires
  pub expires_at: DateTime<Utc>,
  /// Timestamp when the session was created
  pub created_at: DateTime<Utc>,
}

impl Session {
  pub fn new(user_id: Uuid, session_token: String, expires_at: DateTime<Utc>) -> Self {
    Self {
      id: Uuid::new_v4(),
      user_id,
      session_token,
      expires_at,
      created_at: Utc::now(),
    }
  }

  /// Checks if the session has expired
  pub fn is_expired(&self) -> bool {
    self.expires_at <= Utc::now()
  }
}
