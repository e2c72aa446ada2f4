use uuid::Uuid;

use crate::domain::invoice::{Invoice, format_currency, format_long_date_us};
use crate::domain::notification::{EmailTemplate, InvoiceEmailVariables, Mailbox, TemplatedEmail};

/// Builds the public download link for an invoice PDF
#[derive(Debug, Clone)]
pub struct InvoiceLinkBuilder {
  base_url: String,
}

impl InvoiceLinkBuilder {
  pub fn new(base_url: impl Into<String>) -> Self {
    let base_url = base_url.into();
    Self {
      base_url: base_url.trim_end_matches('/').to_string(),
    }
  }

  /// Local base outside production, public URL in production
  pub fn for_environment(production: bool, local_base_url: &str, production_url: &str) -> Self {
    if production {
      Self::new(production_url)
    } else {
      Self::new(local_base_url)
    }
  }

  pub fn link(&self, invoice_id: Uuid) -> String {
    format!("{}/api/invoice/{}", self.base_url, invoice_id)
  }
}

/// The client's mailbox, unless a sandbox address overrides every recipient
pub fn resolve_recipient(invoice: &Invoice, recipient_override: Option<&str>) -> Mailbox {
  match recipient_override.map(str::trim).filter(|s| !s.is_empty()) {
    Some(address) => Mailbox::new(address),
    None => Mailbox::named(invoice.client_email.clone(), invoice.client_name.clone()),
  }
}

/// Sender identity and addressing rules for invoice emails
#[derive(Debug, Clone)]
pub struct InvoiceMailer {
  sender: Mailbox,
  support_email: Option<String>,
  recipient_override: Option<String>,
  links: InvoiceLinkBuilder,
}

impl InvoiceMailer {
  pub fn new(
    sender: Mailbox,
    support_email: Option<String>,
    recipient_override: Option<String>,
    links: InvoiceLinkBuilder,
  ) -> Self {
    Self {
      sender,
      support_email,
      recipient_override,
      links,
    }
  }

  pub fn links(&self) -> &InvoiceLinkBuilder {
    &self.links
  }

  pub fn compose(&self, template: EmailTemplate, invoice: &Invoice) -> TemplatedEmail {
    let support_email = match template {
      EmailTemplate::InvoiceReminder => self.support_email.clone(),
      EmailTemplate::InvoiceCreated | EmailTemplate::InvoiceUpdated => None,
    };

    TemplatedEmail {
      template,
      from: self.sender.clone(),
      to: resolve_recipient(invoice, self.recipient_override.as_deref()),
      variables: InvoiceEmailVariables {
        client_name: invoice.client_name.clone(),
        invoice_number: invoice.invoice_number,
        invoice_due_date: format_long_date_us(invoice.due_date()),
        invoice_amount: format_currency(invoice.total, invoice.currency),
        invoice_link: self.links.link(invoice.id),
        support_email,
      },
    }
  }
}
