use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::InvoiceError;
use super::value_objects::{Currency, InvoiceStatus};

/// Validated invoice fields as submitted through the invoice form.
///
/// `total` is entered independently of `item_quantity * item_rate`; nothing
/// forces the two to agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
  pub invoice_name: String,
  pub invoice_number: i32,
  pub currency: Currency,
  pub issue_date: NaiveDate,
  pub due_in_days: i32,
  pub item_description: String,
  pub item_quantity: i32,
  pub item_rate: Decimal,
  pub total: Decimal,
  pub note: Option<String>,
  pub from_name: String,
  pub from_email: String,
  pub from_address: String,
  pub client_name: String,
  pub client_email: String,
  pub client_address: String,
  pub status: InvoiceStatus,
}

// Invoice - billing document with a single line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
  pub id: Uuid,
  pub user_id: Uuid,
  pub invoice_name: String,
  pub invoice_number: i32,
  pub currency: Currency,
  pub issue_date: NaiveDate,
  pub due_in_days: i32,
  pub item_description: String,
  pub item_quantity: i32,
  pub item_rate: Decimal,
  pub total: Decimal,
  pub note: Option<String>,
  pub from_name: String,
  pub from_email: String,
  pub from_address: String,
  pub client_name: String,
  pub client_email: String,
  pub client_address: String,
  pub status: InvoiceStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Invoice {
  /// New invoices always start out PENDING, whatever the draft says.
  pub fn new(user_id: Uuid, draft: InvoiceDraft) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      user_id,
      invoice_name: draft.invoice_name,
      invoice_number: draft.invoice_number,
      currency: draft.currency,
      issue_date: draft.issue_date,
      due_in_days: draft.due_in_days,
      item_description: draft.item_description,
      item_quantity: draft.item_quantity,
      item_rate: draft.item_rate,
      total: draft.total,
      note: draft.note,
      from_name: draft.from_name,
      from_email: draft.from_email,
      from_address: draft.from_address,
      client_name: draft.client_name,
      client_email: draft.client_email,
      client_address: draft.client_address,
      status: InvoiceStatus::Pending,
      created_at: now,
      updated_at: now,
    }
  }

  /// Overwrites every editable field with the draft.
  pub fn apply(&mut self, draft: InvoiceDraft) -> Result<(), InvoiceError> {
    if !self.status.can_transition_to(draft.status) {
      return Err(InvoiceError::InvalidStatusTransition {
        from: self.status,
        to: draft.status,
      });
    }

    self.invoice_name = draft.invoice_name;
    self.invoice_number = draft.invoice_number;
    self.currency = draft.currency;
    self.issue_date = draft.issue_date;
    self.due_in_days = draft.due_in_days;
    self.item_description = draft.item_description;
    self.item_quantity = draft.item_quantity;
    self.item_rate = draft.item_rate;
    self.total = draft.total;
    self.note = draft.note;
    self.from_name = draft.from_name;
    self.from_email = draft.from_email;
    self.from_address = draft.from_address;
    self.client_name = draft.client_name;
    self.client_email = draft.client_email;
    self.client_address = draft.client_address;
    self.status = draft.status;
    self.updated_at = Utc::now();
    Ok(())
  }

  /// Marks the invoice paid. Returns `false` when it already was.
  pub fn mark_paid(&mut self) -> bool {
    if self.status == InvoiceStatus::Paid {
      return false;
    }
    self.status = InvoiceStatus::Paid;
    self.updated_at = Utc::now();
    true
  }

  pub fn due_date(&self) -> NaiveDate {
    self.issue_date + Duration::days(i64::from(self.due_in_days))
  }

  /// Field values keyed by form field name, used to pre-fill the edit form.
  pub fn form_values(&self) -> Vec<(&'static str, String)> {
    vec![
      ("id", self.id.to_string()),
      ("invoiceName", self.invoice_name.clone()),
      ("invoiceNumber", self.invoice_number.to_string()),
      ("currency", self.currency.as_str().to_string()),
      ("date", self.issue_date.format("%Y-%m-%d").to_string()),
      ("dueDate", self.due_in_days.to_string()),
      ("invoiceItemDescription", self.item_description.clone()),
      ("invoiceItemQuantity", self.item_quantity.to_string()),
      ("invoiceItemRate", self.item_rate.to_string()),
      ("total", self.total.to_string()),
      ("note", self.note.clone().unwrap_or_default()),
      ("fromName", self.from_name.clone()),
      ("fromEmail", self.from_email.clone()),
      ("fromAddress", self.from_address.clone()),
      ("clientName", self.client_name.clone()),
      ("clientEmail", self.client_email.clone()),
      ("clientAddress", self.client_address.clone()),
      ("status", self.status.as_str().to_string()),
    ]
  }
}

/// Row of the invoice list, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
  pub id: Uuid,
  pub client_name: String,
  #[serde(with = "rust_decimal::serde::float")]
  pub total: Decimal,
  pub status: InvoiceStatus,
  pub invoice_number: i32,
  pub currency: Currency,
  #[serde(with = "iso_millis")]
  pub created_at: DateTime<Utc>,
}

/// `createdAt` as RFC 3339 in UTC with millisecond precision.
mod iso_millis {
  use chrono::{DateTime, SecondsFormat, Utc};
  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&raw)
      .map(|dt| dt.with_timezone(&Utc))
      .map_err(serde::de::Error::custom)
  }
}


#[cfg(test)]
mod tests {
  use super::fixtures::draft;
  use super::*;
  use rust_decimal_macros::dec;

  #[test]
  fn test_new_invoice_is_pending() {
    let mut submitted = draft();
    submitted.status = InvoiceStatus::Paid;
    let invoice = Invoice::new(Uuid::new_v4(), submitted);
    assert_eq!(invoice.status, InvoiceStatus::Pending);
  }

  #[test]
  fn test_due_date() {
    let invoice = Invoice::new(Uuid::new_v4(), draft());
    assert_eq!(
      invoice.due_date(),
      NaiveDate::from_ymd_opt(2025, 2, 4).unwrap()
    );
  }

  #[test]
  fn test_mark_paid_is_idempotent() {
    let mut invoice = Invoice::new(Uuid::new_v4(), draft());
    assert!(invoice.mark_paid());
    assert!(!invoice.mark_paid());
    assert_eq!(invoice.status, InvoiceStatus::Paid);
  }

  #[test]
  fn test_apply_overwrites_fields() {
    let mut invoice = Invoice::new(Uuid::new_v4(), draft());
    let mut edited = draft();
    edited.client_name = "Hopper & Co".to_string();
    edited.total = dec!(10);
    edited.status = InvoiceStatus::Paid;

    invoice.apply(edited).unwrap();
    assert_eq!(invoice.client_name, "Hopper & Co");
    assert_eq!(invoice.total, dec!(10));
    assert_eq!(invoice.status, InvoiceStatus::Paid);
  }

  #[test]
  fn test_apply_cannot_reopen_paid_invoice() {
    let mut invoice = Invoice::new(Uuid::new_v4(), draft());
    invoice.mark_paid();

    let result = invoice.apply(draft());
    assert!(matches!(
      result,
      Err(InvoiceError::InvalidStatusTransition {
        from: InvoiceStatus::Paid,
        to: InvoiceStatus::Pending
      })
    ));
    assert_eq!(invoice.status, InvoiceStatus::Paid);
  }

  #[test]
  fn test_summary_serialization() {
    let summary = InvoiceSummary {
      id: Uuid::nil(),
      client_name: "Grace Ltd".to_string(),
      total: dec!(12.5),
      status: InvoiceStatus::Pending,
      invoice_number: 3,
      currency: Currency::EUR,
      created_at: Utc::now(),
    };
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["clientName"], "Grace Ltd");
    assert_eq!(json["total"], 12.5);
    assert_eq!(json["status"], "PENDING");
    assert_eq!(json["invoiceNumber"], 3);
    assert_eq!(json["currency"], "EUR");
  }

  #[test]
  fn test_summary_created_at_has_millis_and_z() {
    let created_at = DateTime::parse_from_rfc3339("2025-03-01T09:30:15.123456Z")
      .unwrap()
      .with_timezone(&Utc);
    let summary = InvoiceSummary {
      id: Uuid::nil(),
      client_name: "Grace Ltd".to_string(),
      total: dec!(1),
      status: InvoiceStatus::Paid,
      invoice_number: 1,
      currency: Currency::USD,
      created_at,
    };
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["createdAt"], "2025-03-01T09:30:15.123Z");
  }
}
