use async_trait::async_trait;
use uuid::Uuid;

use super::entities::{Invoice, InvoiceDraft, InvoiceSummary};
use super::errors::InvoiceError;

/// Every mutation is scoped by owner; a row belonging to someone else
/// behaves exactly like a missing row.
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
  async fn create(&self, invoice: Invoice) -> Result<Invoice, InvoiceError>;

  /// Unscoped lookup, used by the public download link
  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError>;

  async fn find_for_owner(&self, id: Uuid, user_id: Uuid) -> Result<Option<Invoice>, InvoiceError>;

  /// Overwrites every editable field. `None` when no row matches `(id, user_id)`
  /// or when the stored row is PAID and the draft would reopen it.
  async fn update_for_owner(
    &self,
    id: Uuid,
    user_id: Uuid,
    draft: &InvoiceDraft,
  ) -> Result<Option<Invoice>, InvoiceError>;

  /// Sets the status to PAID. `None` when no row matches `(id, user_id)`.
  async fn mark_paid_for_owner(&self, id: Uuid, user_id: Uuid)
  -> Result<Option<Invoice>, InvoiceError>;

  /// Returns `false` when no row matched.
  async fn delete_for_owner(&self, id: Uuid, user_id: Uuid) -> Result<bool, InvoiceError>;

  /// Newest first
  async fn list_summaries_for_owner(&self, user_id: Uuid)
  -> Result<Vec<InvoiceSummary>, InvoiceError>;
}

/// Renders an invoice as a single-page PDF document
pub trait InvoicePdfRenderer: Send + Sync {
  fn render(&self, invoice: &Invoice) -> Result<Vec<u8>, InvoiceError>;
}

/// Cached invoice list per owner. Entries may be stale until they expire
/// or are invalidated.
#[async_trait]
pub trait InvoiceListCache: Send + Sync {
  async fn get(&self, user_id: Uuid) -> Result<Option<Vec<InvoiceSummary>>, InvoiceError>;
  async fn put(&self, user_id: Uuid, invoices: &[InvoiceSummary]) -> Result<(), InvoiceError>;
  async fn invalidate(&self, user_id: Uuid) -> Result<(), InvoiceError>;
}
