use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::invoice::{InvoiceError, InvoiceListCache, InvoiceSummary};

/// List cache shared by every instance behind the same Redis
#[derive(Clone)]
pub struct RedisInvoiceListCache {
  manager: ConnectionManager,
  ttl: Duration,
}

impl RedisInvoiceListCache {
  pub fn new(manager: ConnectionManager, ttl: Duration) -> Self {
    Self { manager, ttl }
  }

  fn key(user_id: Uuid) -> String {
    format!("invoicer:invoices:{}", user_id)
  }
}

fn cache_error(action: &str, e: impl std::fmt::Display) -> InvoiceError {
  InvoiceError::Cache(format!("Failed to {} invoice list: {}", action, e))
}

#[async_trait]
impl InvoiceListCache for RedisInvoiceListCache {
  async fn get(&self, user_id: Uuid) -> Result<Option<Vec<InvoiceSummary>>, InvoiceError> {
    let mut conn = self.manager.clone();
    let raw: Option<String> = redis::cmd("GET")
      .arg(Self::key(user_id))
      .query_async(&mut conn)
      .await
      .map_err(|e| cache_error("read", e))?;

    match raw {
      Some(json) => match serde_json::from_str(&json) {
        Ok(invoices) => Ok(Some(invoices)),
        Err(e) => {
          // Treat an unreadable entry as a miss; the next put replaces it
          tracing::warn!(user_id = %user_id, error = %e, "Discarding malformed cached invoice list");
          Ok(None)
        }
      },
      None => Ok(None),
    }
  }

  async fn put(&self, user_id: Uuid, invoices: &[InvoiceSummary]) -> Result<(), InvoiceError> {
    let json = serde_json::to_string(invoices).map_err(|e| cache_error("encode", e))?;
    let mut conn = self.manager.clone();

    redis::cmd("SET")
      .arg(Self::key(user_id))
      .arg(json)
      .arg("EX")
      .arg(self.ttl.as_secs().max(1))
      .query_async::<()>(&mut conn)
      .await
      .map_err(|e| cache_error("store", e))
  }

  async fn invalidate(&self, user_id: Uuid) -> Result<(), InvoiceError> {
    let mut conn = self.manager.clone();
    redis::cmd("DEL")
      .arg(Self::key(user_id))
      .query_async::<()>(&mut conn)
      .await
      .map_err(|e| cache_error("invalidate", e))
  }
}
