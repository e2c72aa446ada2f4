use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::domain::invoice::{InvoiceError, InvoiceListCache, InvoiceSummary};

struct CachedList {
  stored_at: Instant,
  invoices: Vec<InvoiceSummary>,
}

/// Process-local list cache, used when no Redis is configured
pub struct MemoryInvoiceListCache {
  ttl: Duration,
  entries: Mutex<HashMap<Uuid, CachedList>>,
}

impl MemoryInvoiceListCache {
  pub fn new(ttl: Duration) -> Self {
    Self {
      ttl,
      entries: Mutex::new(HashMap::new()),
    }
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, CachedList>>, InvoiceError> {
    self
      .entries
      .lock()
      .map_err(|_| InvoiceError::Cache("list cache lock poisoned".to_string()))
  }
}

#[async_trait]
impl InvoiceListCache for MemoryInvoiceListCache {
  async fn get(&self, user_id: Uuid) -> Result<Option<Vec<InvoiceSummary>>, InvoiceError> {
    let mut entries = self.lock()?;
    match entries.get(&user_id) {
      Some(entry) if entry.stored_at.elapsed() < self.ttl => Ok(Some(entry.invoices.clone())),
      Some(_) => {
        entries.remove(&user_id);
        Ok(None)
      }
      None => Ok(None),
    }
  }

  async fn put(&self, user_id: Uuid, invoices: &[InvoiceSummary]) -> Result<(), InvoiceError> {
    self.lock()?.insert(
      user_id,
      CachedList {
        stored_at: Instant::now(),
        invoices: invoices.to_vec(),
      },
    );
    Ok(())
  }

  async fn invalidate(&self, user_id: Uuid) -> Result<(), InvoiceError> {
    self.lock()?.remove(&user_id);
    Ok(())
  }
}
