use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

use crate::domain::notification::{
  EmailSender, EmailTemplate, InvoiceEmailVariables, Mailbox, NotificationError, TemplatedEmail,
};
use crate::infrastructure::config::EmailTemplateIds;

/// Request body of the templated send endpoint
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
  from: &'a Mailbox,
  to: [&'a Mailbox; 1],
  template_uuid: &'a str,
  template_variables: &'a InvoiceEmailVariables,
}

/// Sends provider-side templated emails over the Mailtrap HTTP API
pub struct MailtrapEmailSender {
  client: Client,
  api_url: String,
  api_token: String,
  templates: EmailTemplateIds,
}

impl MailtrapEmailSender {
  pub fn new(
    api_url: String,
    api_token: String,
    templates: EmailTemplateIds,
    timeout: Duration,
  ) -> Result<Self, NotificationError> {
    if api_url.is_empty() || api_token.is_empty() {
      return Err(NotificationError::Configuration(
        "email api_url and api_token are required for the mailtrap provider".to_string(),
      ));
    }

    let client = Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| NotificationError::Configuration(format!("HTTP client: {}", e)))?;

    Ok(Self {
      client,
      api_url,
      api_token,
      templates,
    })
  }

  fn template_uuid(&self, template: EmailTemplate) -> &str {
    match template {
      EmailTemplate::InvoiceCreated => &self.templates.invoice_created,
      EmailTemplate::InvoiceUpdated => &self.templates.invoice_updated,
      EmailTemplate::InvoiceReminder => &self.templates.invoice_reminder,
    }
  }
}

#[async_trait]
impl EmailSender for MailtrapEmailSender {
  async fn send(&self, email: &TemplatedEmail) -> Result<(), NotificationError> {
    let body = SendRequest {
      from: &email.from,
      to: [&email.to],
      template_uuid: self.template_uuid(email.template),
      template_variables: &email.variables,
    };

    let response = self
      .client
      .post(&self.api_url)
      .bearer_auth(&self.api_token)
      .json(&body)
      .send()
      .await
      .map_err(|e| NotificationError::Transport(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
      tracing::info!(
        template = email.template.as_str(),
        to = %email.to.email,
        "Email accepted by provider"
      );
      return Ok(());
    }

    let detail = response.text().await.unwrap_or_default();
    let message = format!("{}: {}", status, detail);
    // 429 is worth retrying; other client errors are not
    if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
      Err(NotificationError::Rejected(message))
    } else {
      Err(NotificationError::Transport(message))
    }
  }
}
