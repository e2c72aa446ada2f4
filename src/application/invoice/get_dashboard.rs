use std::sync::Arc;

use crate::application::outcome::AuthContext;
use crate::domain::auth::User;
use crate::domain::invoice::{DashboardStats, InvoiceError, InvoiceService, InvoiceSummary};

const RECENT_INVOICES: usize = 5;

#[derive(Debug)]
pub struct DashboardResponse {
  pub user: User,
  pub stats: DashboardStats,
  pub recent_invoices: Vec<InvoiceSummary>,
}

pub struct GetDashboardUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl GetDashboardUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(&self, ctx: &AuthContext) -> Result<DashboardResponse, InvoiceError> {
    let user = ctx.resolve()?.ok_or(InvoiceError::AuthRequired)?;
    let invoices = self.invoice_service.list_invoices(user.id).await?;

    Ok(DashboardResponse {
      user: user.clone(),
      stats: DashboardStats::from_summaries(&invoices),
      recent_invoices: invoices.into_iter().take(RECENT_INVOICES).collect(),
    })
  }
}
