use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::auth::entities::Session;
use crate::domain::auth::errors::{AuthError, RepositoryError};
use crate::domain::auth::ports::SessionRepository;

/// Database row structure for sessions table
#[derive(Debug, FromRow)]
struct SessionRow {
  id: Uuid,
  user_id: Uuid,
  session_token: String,
  expires_at: DateTime<Utc>,
  created_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
  fn from(row: SessionRow) -> Self {
    Session {
      id: row.id,
      user_id: row.user_id,
      session_token: row.session_token,
      expires_at: row.expires_at,
      created_at: row.created_at,
    }
  }
}

/// PostgreSQL implementation of the SessionRepository trait
pub struct PostgresSessionRepository {
  pool: PgPool,
}

impl PostgresSessionRepository {
  /// Creates a new PostgresSessionRepository with the given connection pool
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
  /// Finds a session by its token hash
  async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, AuthError> {
    let row = sqlx::query_as::<_, SessionRow>(
      r#"
            SELECT id, user_id, session_token, expires_at, created_at
            FROM sessions
            WHERE session_token = $1
            "#,
    )
    .bind(token_hash)
    .fetch_optional(&self.pool)
    .await
    .map_err(|e| {
      tracing::error!("Failed to find session by token hash: {}", e);
      AuthError::Repository(RepositoryError::QueryFailed(e.to_string()))
    })?;

    Ok(row.map(Session::from))
  }

  /// Deletes a specific session
  async fn delete(&self, session_id: Uuid) -> Result<(), AuthError> {
    sqlx::query("DELETE FROM sessions WHERE id = $1")
      .bind(session_id)
      .execute(&self.pool)
      .await
      .map_err(|e| {
        tracing::error!("Failed to delete session: {}", e);
        AuthError::Repository(RepositoryError::QueryFailed(e.to_string()))
      })?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::auth::SessionToken;
  use crate::infrastructure::persistence::postgres::user_repository::test_support::{
    insert_user, setup_test_db,
  };
  use chrono::Duration;

  async fn insert_session(pool: &PgPool, session: &Session) {
    sqlx::query(
      "INSERT INTO sessions (id, user_id, session_token, expires_at, created_at) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(session.id)
    .bind(session.user_id)
    .bind(&session.session_token)
    .bind(session.expires_at)
    .bind(session.created_at)
    .execute(pool)
    .await
    .expect("Failed to insert session");
  }

  #[tokio::test]
  #[ignore = "requires docker"]
  async fn test_find_and_delete_session() {
    let (pool, _container) = setup_test_db().await;
    let user = insert_user(&pool, "session@example.com").await;

    let token = SessionToken::from_string("ab".repeat(32)).unwrap();
    let session = Session::new(
      user.id,
      token.hash().as_str().to_string(),
      Utc::now() + Duration::hours(1),
    );
    insert_session(&pool, &session).await;

    let repo = PostgresSessionRepository::new(pool);
    let found = repo
      .find_by_token_hash(token.hash().as_str())
      .await
      .unwrap()
      .unwrap();
    assert_eq!(found.id, session.id);
    assert_eq!(found.user_id, user.id);

    repo.delete(session.id).await.unwrap();
    assert!(
      repo
        .find_by_token_hash(token.hash().as_str())
        .await
        .unwrap()
        .is_none()
    );
  }
}
