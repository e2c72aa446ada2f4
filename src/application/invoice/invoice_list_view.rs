use std::sync::Arc;
use uuid::Uuid;

use crate::application::outcome::AuthContext;
use crate::domain::invoice::{InvoiceError, InvoiceListCache, InvoiceService, InvoiceSummary};

/// Drops the cached invoice list of an owner. A cache outage only costs
/// freshness, so failures are logged and swallowed.
pub async fn invalidate_list_view(cache: &dyn InvoiceListCache, user_id: Uuid) {
  if let Err(e) = cache.invalidate(user_id).await {
    tracing::warn!(user_id = %user_id, error = %e, "Failed to invalidate invoice list view");
  }
}

/// Invoice list page, served from the view cache when possible
pub struct InvoiceListViewUseCase {
  invoice_service: Arc<InvoiceService>,
  list_cache: Arc<dyn InvoiceListCache>,
}

impl InvoiceListViewUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>, list_cache: Arc<dyn InvoiceListCache>) -> Self {
    Self {
      invoice_service,
      list_cache,
    }
  }

  pub async fn execute(&self, ctx: &AuthContext) -> Result<Vec<InvoiceSummary>, InvoiceError> {
    let user = ctx.resolve()?.ok_or(InvoiceError::AuthRequired)?;

    match self.list_cache.get(user.id).await {
      Ok(Some(cached)) => return Ok(cached),
      Ok(None) => {}
      Err(e) => tracing::warn!(user_id = %user.id, error = %e, "Invoice list cache read failed"),
    }

    let invoices = self.invoice_service.list_invoices(user.id).await?;
    if let Err(e) = self.list_cache.put(user.id, &invoices).await {
      tracing::warn!(user_id = %user.id, error = %e, "Invoice list cache write failed");
    }
    Ok(invoices)
  }
}
