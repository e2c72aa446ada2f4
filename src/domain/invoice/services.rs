use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use super::entities::{Invoice, InvoiceDraft, InvoiceSummary};
use super::errors::InvoiceError;
use super::ports::InvoiceRepository;
use super::value_objects::{Currency, InvoiceStatus};

/// Counts and paid revenue shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
  pub total_invoices: usize,
  pub paid_invoices: usize,
  pub pending_invoices: usize,
  pub paid_revenue: BTreeMap<Currency, Decimal>,
  pub outstanding: BTreeMap<Currency, Decimal>,
}

impl DashboardStats {
  pub fn from_summaries(invoices: &[InvoiceSummary]) -> Self {
    let mut stats = DashboardStats {
      total_invoices: invoices.len(),
      ..Default::default()
    };

    for invoice in invoices {
      let bucket = match invoice.status {
        InvoiceStatus::Paid => {
          stats.paid_invoices += 1;
          &mut stats.paid_revenue
        }
        InvoiceStatus::Pending => {
          stats.pending_invoices += 1;
          &mut stats.outstanding
        }
      };
      *bucket.entry(invoice.currency).or_insert(Decimal::ZERO) += invoice.total;
    }

    stats
  }
}

pub struct InvoiceService {
  invoice_repo: Arc<dyn InvoiceRepository>,
}

impl InvoiceService {
  pub fn new(invoice_repo: Arc<dyn InvoiceRepository>) -> Self {
    Self { invoice_repo }
  }

  pub async fn create_invoice(
    &self,
    user_id: Uuid,
    draft: InvoiceDraft,
  ) -> Result<Invoice, InvoiceError> {
    let invoice = Invoice::new(user_id, draft);
    self.invoice_repo.create(invoice).await
  }

  /// Full overwrite of an owned invoice
  pub async fn update_invoice(
    &self,
    user_id: Uuid,
    invoice_id: Uuid,
    draft: InvoiceDraft,
  ) -> Result<Invoice, InvoiceError> {
    let mut current = self.get_owned_invoice(user_id, invoice_id).await?;

    // Reject forbidden status changes before touching the row
    current.apply(draft.clone())?;

    if let Some(updated) = self
      .invoice_repo
      .update_for_owner(invoice_id, user_id, &draft)
      .await?
    {
      return Ok(updated);
    }

    // The row changed after it was read: deleted, or paid in the meantime
    match self.invoice_repo.find_for_owner(invoice_id, user_id).await? {
      Some(latest) => Err(InvoiceError::InvalidStatusTransition {
        from: latest.status,
        to: draft.status,
      }),
      None => Err(InvoiceError::InvoiceNotFound(invoice_id)),
    }
  }

  /// Marking an already paid invoice succeeds without changes
  pub async fn mark_paid(&self, user_id: Uuid, invoice_id: Uuid) -> Result<Invoice, InvoiceError> {
    self
      .invoice_repo
      .mark_paid_for_owner(invoice_id, user_id)
      .await?
      .ok_or(InvoiceError::InvoiceNotFound(invoice_id))
  }

  pub async fn delete_invoice(&self, user_id: Uuid, invoice_id: Uuid) -> Result<(), InvoiceError> {
    if self
      .invoice_repo
      .delete_for_owner(invoice_id, user_id)
      .await?
    {
      Ok(())
    } else {
      Err(InvoiceError::InvoiceNotFound(invoice_id))
    }
  }

  pub async fn get_owned_invoice(
    &self,
    user_id: Uuid,
    invoice_id: Uuid,
  ) -> Result<Invoice, InvoiceError> {
    self
      .invoice_repo
      .find_for_owner(invoice_id, user_id)
      .await?
      .ok_or(InvoiceError::InvoiceNotFound(invoice_id))
  }

  /// Lookup by id alone, for the shareable download link
  pub async fn get_invoice(&self, invoice_id: Uuid) -> Result<Invoice, InvoiceError> {
    self
      .invoice_repo
      .find_by_id(invoice_id)
      .await?
      .ok_or(InvoiceError::InvoiceNotFound(invoice_id))
  }

  pub async fn list_invoices(&self, user_id: Uuid) -> Result<Vec<InvoiceSummary>, InvoiceError> {
    self.invoice_repo.list_summaries_for_owner(user_id).await
  }
}
