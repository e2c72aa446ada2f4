//! Form submission parsing.
//!
//! A raw field bag is turned into a typed record in two passes: fields are
//! first coerced into their types (numbers, dates, enumerations), then the
//! typed record is checked with its `validator` constraints. Errors from both
//! passes are reported per form field together with the submitted values so
//! the form can be rendered again.

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::auth::UserProfile;
use crate::domain::invoice::{Currency, InvoiceDraft, InvoiceStatus};

/// Raw submitted fields keyed by form field name
pub type FormData = BTreeMap<String, String>;

/// Messages per form field name
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Decodes an `application/x-www-form-urlencoded` body. Repeated keys keep
/// the last value.
pub fn decode_form(body: &[u8]) -> Result<FormData, serde_urlencoded::de::Error> {
  let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;
  Ok(pairs.into_iter().collect())
}

/// What the form gets back when a submission is rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReply {
  pub status: &'static str,
  pub errors: FieldErrors,
  pub values: FormData,
}

impl SubmissionReply {
  pub fn new(errors: FieldErrors, values: FormData) -> Self {
    Self {
      status: "error",
      errors,
      values,
    }
  }
}

#[cfg(test)]
impl SubmissionReply {
  pub fn has_error(&self, field: &str) -> bool {
    self.errors.contains_key(field)
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Submission<T> {
  Success(T),
  Invalid(SubmissionReply),
}

/// A form whose fields can be parsed into a typed record
pub trait FormSchema {
  type Output;

  fn parse(form: &FormData) -> Result<Self::Output, FieldErrors>;
}

pub fn parse_with_schema<S: FormSchema>(form: &FormData) -> Submission<S::Output> {
  match S::parse(form) {
    Ok(record) => Submission::Success(record),
    Err(errors) => Submission::Invalid(SubmissionReply::new(errors, form.clone())),
  }
}

/// Reads fields out of the bag, collecting coercion errors as it goes
struct FieldReader<'a> {
  form: &'a FormData,
  errors: FieldErrors,
}

impl<'a> FieldReader<'a> {
  fn new(form: &'a FormData) -> Self {
    Self {
      form,
      errors: FieldErrors::new(),
    }
  }

  fn raw(&self, name: &str) -> Option<&'a str> {
    self
      .form
      .get(name)
      .map(|v| v.trim())
      .filter(|v| !v.is_empty())
  }

  fn reject(&mut self, name: &str, message: impl Into<String>) {
    self
      .errors
      .entry(name.to_string())
      .or_default()
      .push(message.into());
  }

  /// Trimmed text; empty when missing so the length rules report it
  fn text(&self, name: &str) -> String {
    self.raw(name).unwrap_or_default().to_string()
  }

  fn optional_text(&self, name: &str) -> Option<String> {
    self.raw(name).map(str::to_string)
  }

  fn parsed<T: FromStr>(&mut self, name: &str, label: &str, invalid: &str) -> Option<T> {
    match self.raw(name) {
      None => {
        self.reject(name, format!("{} is required", label));
        None
      }
      Some(raw) => match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
          self.reject(name, invalid);
          None
        }
      },
    }
  }

  /// A money amount that still fits the store once rounded to cents
  fn amount(&mut self, name: &str, label: &str) -> Option<Decimal> {
    let value = self.parsed::<Decimal>(name, label, "Must be a number")?;
    if value.round_dp(2) > MAX_AMOUNT {
      self.reject(name, format!("{} is too large", label));
      return None;
    }
    Some(value)
  }

  fn date(&mut self, name: &str, label: &str) -> Option<NaiveDate> {
    match self.raw(name) {
      None => {
        self.reject(name, format!("{} is required", label));
        None
      }
      Some(raw) => match parse_date(raw) {
        Some(date) => Some(date),
        None => {
          self.reject(name, "Please enter a valid date");
          None
        }
      },
    }
  }

  /// Merges constraint failures for fields that passed coercion
  fn finish(mut self, checked: Result<(), ValidationErrors>) -> FieldErrors {
    if let Err(errors) = checked {
      for (field, field_errors) in errors.field_errors() {
        let name = camel_case(&field);
        if self.errors.contains_key(&name) {
          continue;
        }
        for error in field_errors.iter() {
          let message = error
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("Invalid value for {}", name));
          self.reject(&name, message);
        }
      }
    }
    self.errors
  }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp
fn parse_date(raw: &str) -> Option<NaiveDate> {
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn camel_case(snake: &str) -> String {
  let mut out = String::with_capacity(snake.len());
  let mut upper = false;
  for ch in snake.chars() {
    if ch == '_' {
      upper = true;
    } else if upper {
      out.extend(ch.to_uppercase());
      upper = false;
    } else {
      out.push(ch);
    }
  }
  out
}

/// Widest value a `NUMERIC(15, 2)` column holds
const MAX_AMOUNT: Decimal = dec!(9999999999999.99);
/// Width of the `VARCHAR` name and email columns
const MAX_SHORT_TEXT: usize = 255;

fn fits_short_column(value: &str) -> Result<(), ValidationError> {
  if value.chars().count() > MAX_SHORT_TEXT {
    return Err(ValidationError::new("too_long"));
  }
  Ok(())
}

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
  if value.is_sign_negative() && !value.is_zero() {
    return Err(ValidationError::new("non_negative"));
  }
  Ok(())
}

// ============================================================================
// Onboarding
// ============================================================================

#[derive(Debug, Validate)]
struct OnboardingForm {
  #[validate(length(min = 2, max = 100, message = "First name is required"))]
  first_name: String,
  #[validate(length(min = 2, max = 100, message = "Last name is required"))]
  last_name: String,
  #[validate(length(min = 2, max = 500, message = "Address is required"))]
  address: String,
}

pub struct OnboardingSchema;

impl FormSchema for OnboardingSchema {
  type Output = UserProfile;

  fn parse(form: &FormData) -> Result<UserProfile, FieldErrors> {
    let reader = FieldReader::new(form);
    let record = OnboardingForm {
      first_name: reader.text("firstName"),
      last_name: reader.text("lastName"),
      address: reader.text("address"),
    };

    let errors = reader.finish(record.validate());
    if !errors.is_empty() {
      return Err(errors);
    }

    Ok(UserProfile {
      first_name: record.first_name,
      last_name: record.last_name,
      address: record.address,
    })
  }
}

// ============================================================================
// Invoice
// ============================================================================

#[derive(Debug, Validate)]
struct InvoiceForm {
  #[validate(length(min = 1, max = 200, message = "Invoice name is required"))]
  invoice_name: String,
  #[validate(range(min = 1, message = "Invoice number must be at least 1"))]
  invoice_number: i32,
  currency: Currency,
  date: NaiveDate,
  #[validate(range(min = 0, max = 365, message = "Due date must be between 0 and 365 days"))]
  due_date: i32,
  #[validate(length(min = 1, message = "Description is required"))]
  invoice_item_description: String,
  #[validate(range(min = 1, message = "Quantity must be at least 1"))]
  invoice_item_quantity: i32,
  #[validate(custom(function = "non_negative", message = "Rate cannot be negative"))]
  invoice_item_rate: Decimal,
  #[validate(custom(function = "non_negative", message = "Total cannot be negative"))]
  total: Decimal,
  note: Option<String>,
  #[validate(
    length(min = 1, message = "Your name is required"),
    custom(function = "fits_short_column", message = "Must be at most 255 characters")
  )]
  from_name: String,
  #[validate(
    email(message = "Invalid email address"),
    custom(function = "fits_short_column", message = "Must be at most 255 characters")
  )]
  from_email: String,
  #[validate(length(min = 1, message = "Your address is required"))]
  from_address: String,
  #[validate(
    length(min = 1, message = "Client name is required"),
    custom(function = "fits_short_column", message = "Must be at most 255 characters")
  )]
  client_name: String,
  #[validate(
    email(message = "Invalid email address"),
    custom(function = "fits_short_column", message = "Must be at most 255 characters")
  )]
  client_email: String,
  #[validate(length(min = 1, message = "Client address is required"))]
  client_address: String,
  status: InvoiceStatus,
}

/// The invoice form shared by create and edit
pub struct InvoiceSchema;

impl FormSchema for InvoiceSchema {
  type Output = InvoiceDraft;

  fn parse(form: &FormData) -> Result<InvoiceDraft, FieldErrors> {
    let mut reader = FieldReader::new(form);

    let invoice_number = reader.parsed::<i32>("invoiceNumber", "Invoice number", "Must be a whole number");
    let currency = reader.parsed::<Currency>("currency", "Currency", "Please select a valid currency");
    let date = reader.date("date", "Date");
    let due_date = reader.parsed::<i32>("dueDate", "Due date", "Must be a whole number of days");
    let quantity =
      reader.parsed::<i32>("invoiceItemQuantity", "Quantity", "Must be a whole number");
    let rate = reader.amount("invoiceItemRate", "Rate");
    let total = reader.amount("total", "Total");
    let status = reader.parsed::<InvoiceStatus>("status", "Status", "Please select a valid status");

    let record = InvoiceForm {
      invoice_name: reader.text("invoiceName"),
      invoice_number: invoice_number.unwrap_or(1),
      currency: currency.unwrap_or(Currency::USD),
      date: date.unwrap_or_default(),
      due_date: due_date.unwrap_or(0),
      invoice_item_description: reader.text("invoiceItemDescription"),
      invoice_item_quantity: quantity.unwrap_or(1),
      invoice_item_rate: rate.unwrap_or_default(),
      total: total.unwrap_or_default(),
      note: reader.optional_text("note"),
      from_name: reader.text("fromName"),
      from_email: reader.text("fromEmail"),
      from_address: reader.text("fromAddress"),
      client_name: reader.text("clientName"),
      client_email: reader.text("clientEmail"),
      client_address: reader.text("clientAddress"),
      status: status.unwrap_or(InvoiceStatus::Pending),
    };

    let errors = reader.finish(record.validate());
    if !errors.is_empty() {
      return Err(errors);
    }

    Ok(InvoiceDraft {
      invoice_name: record.invoice_name,
      invoice_number: record.invoice_number,
      currency: record.currency,
      issue_date: record.date,
      due_in_days: record.due_date,
      item_description: record.invoice_item_description,
      item_quantity: record.invoice_item_quantity,
      item_rate: record.invoice_item_rate,
      total: record.total,
      note: record.note,
      from_name: record.from_name,
      from_email: record.from_email,
      from_address: record.from_address,
      client_name: record.client_name,
      client_email: record.client_email,
      client_address: record.client_address,
      status: record.status,
    })
  }
}

/// Reads the invoice id carried by the edit form
pub fn invoice_id(form: &FormData) -> Option<Uuid> {
  form.get("id").and_then(|raw| Uuid::parse_str(raw.trim()).ok())
}
