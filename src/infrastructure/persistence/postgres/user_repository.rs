use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::auth::entities::{User, UserProfile};
use crate::domain::auth::errors::{AuthError, RepositoryError};
use crate::domain::auth::ports::UserRepository;

/// Database row structure for users table
#[derive(Debug, FromRow)]
struct UserRow {
  id: Uuid,
  email: String,
  first_name: Option<String>,
  last_name: Option<String>,
  address: Option<String>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
  fn from(row: UserRow) -> Self {
    User {
      id: row.id,
      email: row.email,
      first_name: row.first_name,
      last_name: row.last_name,
      address: row.address,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

/// PostgreSQL implementation of the UserRepository trait
pub struct PostgresUserRepository {
  pool: PgPool,
}

impl PostgresUserRepository {
  /// Creates a new PostgresUserRepository with the given connection pool
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
  /// Finds a user by their unique identifier
  async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(
      r#"
            SELECT id, email, first_name, last_name, address, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await
    .map_err(|e| {
      tracing::error!("Failed to find user by id: {}", e);
      AuthError::Repository(RepositoryError::QueryFailed(e.to_string()))
    })?;

    Ok(row.map(User::from))
  }

  /// Stores the onboarding profile
  async fn update_profile(
    &self,
    id: Uuid,
    profile: &UserProfile,
  ) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(
      r#"
            UPDATE users
            SET first_name = $2, last_name = $3, address = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, first_name, last_name, address, created_at, updated_at
            "#,
    )
    .bind(id)
    .bind(&profile.first_name)
    .bind(&profile.last_name)
    .bind(&profile.address)
    .fetch_optional(&self.pool)
    .await
    .map_err(|e| {
      tracing::error!("Failed to update user profile: {}", e);
      AuthError::Repository(RepositoryError::QueryFailed(e.to_string()))
    })?;

    Ok(row.map(User::from))
  }
}
