use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueObjectError {
  #[error("Invalid currency code: {0}")]
  InvalidCurrency(String),
  #[error("Invalid invoice status: {0}")]
  InvalidStatus(String),
}

// Invoice Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceStatus {
  Pending,
  Paid,
}

impl InvoiceStatus {
  /// PENDING may move to PAID; PAID is terminal. Staying put is always allowed.
  pub fn can_transition_to(&self, new_status: InvoiceStatus) -> bool {
    match (self, new_status) {
      (InvoiceStatus::Pending, _) => true,
      (InvoiceStatus::Paid, InvoiceStatus::Paid) => true,
      (InvoiceStatus::Paid, InvoiceStatus::Pending) => false,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      InvoiceStatus::Pending => "PENDING",
      InvoiceStatus::Paid => "PAID",
    }
  }
}

impl FromStr for InvoiceStatus {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "PENDING" => Ok(InvoiceStatus::Pending),
      "PAID" => Ok(InvoiceStatus::Paid),
      _ => Err(ValueObjectError::InvalidStatus(format!(
        "Unknown status: {}",
        s
      ))),
    }
  }
}

impl fmt::Display for InvoiceStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// Currency - ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
  USD,
  EUR,
  NGN,
}

impl Currency {
  pub const ALL: [Currency; 3] = [Currency::USD, Currency::EUR, Currency::NGN];

  pub fn as_str(&self) -> &'static str {
    match self {
      Currency::USD => "USD",
      Currency::EUR => "EUR",
      Currency::NGN => "NGN",
    }
  }

  pub fn symbol(&self) -> &'static str {
    match self {
      Currency::USD => "$",
      Currency::EUR => "€",
      Currency::NGN => "₦",
    }
  }
}

impl FromStr for Currency {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "USD" => Ok(Currency::USD),
      "EUR" => Ok(Currency::EUR),
      "NGN" => Ok(Currency::NGN),
      _ => Err(ValueObjectError::InvalidCurrency(format!(
        "Unsupported currency: {}",
        s
      ))),
    }
  }
}

impl fmt::Display for Currency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
