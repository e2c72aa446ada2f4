use serde::{Deserialize, Serialize};

/// Which provider-side template renders the email
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTemplate {
  InvoiceCreated,
  InvoiceUpdated,
  InvoiceReminder,
}

impl EmailTemplate {
  pub fn as_str(&self) -> &'static str {
    match self {
      EmailTemplate::InvoiceCreated => "invoice_created",
      EmailTemplate::InvoiceUpdated => "invoice_updated",
      EmailTemplate::InvoiceReminder => "invoice_reminder",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mailbox {
  pub email: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
}

impl Mailbox {
  pub fn new(email: impl Into<String>) -> Self {
    Self {
      email: email.into(),
      name: None,
    }
  }

  pub fn named(email: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      email: email.into(),
      name: Some(name.into()),
    }
  }
}

/// Values substituted into the invoice email templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceEmailVariables {
  pub client_name: String,
  pub invoice_number: i32,
  pub invoice_due_date: String,
  pub invoice_amount: String,
  pub invoice_link: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub support_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatedEmail {
  pub template: EmailTemplate,
  pub from: Mailbox,
  pub to: Mailbox,
  pub variables: InvoiceEmailVariables,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_variables_use_template_names() {
    let variables = InvoiceEmailVariables {
      client_name: "Grace Ltd".to_string(),
      invoice_number: 12,
      invoice_due_date: "February 4, 2025".to_string(),
      invoice_amount: "$3,000.00".to_string(),
      invoice_link: "http://localhost:8080/api/invoice/abc".to_string(),
      support_email: None,
    };

    let json = serde_json::to_value(&variables).unwrap();
    assert_eq!(json["clientName"], "Grace Ltd");
    assert_eq!(json["invoiceNumber"], 12);
    assert_eq!(json["invoiceDueDate"], "February 4, 2025");
    assert_eq!(json["invoiceAmount"], "$3,000.00");
    assert!(json.get("supportEmail").is_none());
  }

  #[test]
  fn test_mailbox_without_name_omits_it() {
    let json = serde_json::to_value(Mailbox::new("a@example.com")).unwrap();
    assert_eq!(json, serde_json::json!({ "email": "a@example.com" }));
  }
}
