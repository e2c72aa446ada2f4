//! In-memory fakes for the repository and notification ports.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use crate::domain::auth::{
  AuthError, RepositoryError, Session, SessionRepository, User, UserProfile, UserRepository,
};
use crate::domain::invoice::{
  Invoice, InvoiceDraft, InvoiceError, InvoiceRepository, InvoiceStatus, InvoiceSummary,
};
use crate::domain::notification::{
  EmailSender, NotificationError, NotificationPublisher, TemplatedEmail,
};

#[derive(Default)]
pub struct InMemoryUserRepository {
  users: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
  pub fn insert(&self, user: User) -> User {
    self.users.lock().unwrap().insert(user.id, user.clone());
    user
  }

  pub fn get(&self, id: Uuid) -> Option<User> {
    self.users.lock().unwrap().get(&id).cloned()
  }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
  async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
    Ok(self.get(id))
  }

  async fn update_profile(
    &self,
    id: Uuid,
    profile: &UserProfile,
  ) -> Result<Option<User>, AuthError> {
    let mut users = self.users.lock().unwrap();
    Ok(users.get_mut(&id).map(|user| {
      user.update_profile(profile.clone());
      user.clone()
    }))
  }
}

#[derive(Default)]
pub struct InMemorySessionRepository {
  sessions: Mutex<Vec<Session>>,
  fail: AtomicBool,
}

impl InMemorySessionRepository {
  pub fn insert(&self, session: Session) {
    self.sessions.lock().unwrap().push(session);
  }

  /// Makes every following lookup fail like a lost database connection
  pub fn fail_lookups(&self) {
    self.fail.store(true, Ordering::SeqCst);
  }

  pub fn len(&self) -> usize {
    self.sessions.lock().unwrap().len()
  }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
  async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, AuthError> {
    if self.fail.load(Ordering::SeqCst) {
      return Err(AuthError::Repository(RepositoryError::ConnectionFailed(
        "Pool timed out".to_string(),
      )));
    }
    let sessions = self.sessions.lock().unwrap();
    Ok(
      sessions
        .iter()
        .find(|s| s.session_token == token_hash)
        .cloned(),
    )
  }

  async fn delete(&self, session_id: Uuid) -> Result<(), AuthError> {
    self.sessions.lock().unwrap().retain(|s| s.id != session_id);
    Ok(())
  }
}

#[derive(Default)]
pub struct InMemoryInvoiceRepository {
  invoices: Mutex<Vec<Invoice>>,
  fail: AtomicBool,
}

impl InMemoryInvoiceRepository {
  pub fn len(&self) -> usize {
    self.invoices.lock().unwrap().len()
  }

  pub fn insert(&self, invoice: Invoice) -> Invoice {
    self.invoices.lock().unwrap().push(invoice.clone());
    invoice
  }

  /// Makes every following call fail like a lost database connection
  pub fn fail_queries(&self) {
    self.fail.store(true, Ordering::SeqCst);
  }

  fn check(&self) -> Result<(), InvoiceError> {
    if self.fail.load(Ordering::SeqCst) {
      return Err(InvoiceError::Database(sqlx::Error::PoolTimedOut));
    }
    Ok(())
  }
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
  async fn create(&self, invoice: Invoice) -> Result<Invoice, InvoiceError> {
    self.check()?;
    Ok(self.insert(invoice))
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError> {
    self.check()?;
    let invoices = self.invoices.lock().unwrap();
    Ok(invoices.iter().find(|i| i.id == id).cloned())
  }

  async fn find_for_owner(&self, id: Uuid, user_id: Uuid) -> Result<Option<Invoice>, InvoiceError> {
    self.check()?;
    let invoices = self.invoices.lock().unwrap();
    Ok(
      invoices
        .iter()
        .find(|i| i.id == id && i.user_id == user_id)
        .cloned(),
    )
  }

  async fn update_for_owner(
    &self,
    id: Uuid,
    user_id: Uuid,
    draft: &InvoiceDraft,
  ) -> Result<Option<Invoice>, InvoiceError> {
    self.check()?;
    let mut invoices = self.invoices.lock().unwrap();
    match invoices
      .iter_mut()
      .find(|i| i.id == id && i.user_id == user_id)
    {
      Some(invoice) if invoice.status.can_transition_to(draft.status) => {
        invoice.apply(draft.clone())?;
        Ok(Some(invoice.clone()))
      }
      _ => Ok(None),
    }
  }

  async fn mark_paid_for_owner(
    &self,
    id: Uuid,
    user_id: Uuid,
  ) -> Result<Option<Invoice>, InvoiceError> {
    self.check()?;
    let mut invoices = self.invoices.lock().unwrap();
    Ok(
      invoices
        .iter_mut()
        .find(|i| i.id == id && i.user_id == user_id)
        .map(|invoice| {
          invoice.status = InvoiceStatus::Paid;
          invoice.updated_at = Utc::now();
          invoice.clone()
        }),
    )
  }

  async fn delete_for_owner(&self, id: Uuid, user_id: Uuid) -> Result<bool, InvoiceError> {
    self.check()?;
    let mut invoices = self.invoices.lock().unwrap();
    let before = invoices.len();
    invoices.retain(|i| !(i.id == id && i.user_id == user_id));
    Ok(invoices.len() != before)
  }

  async fn list_summaries_for_owner(
    &self,
    user_id: Uuid,
  ) -> Result<Vec<InvoiceSummary>, InvoiceError> {
    self.check()?;
    let invoices = self.invoices.lock().unwrap();
    let mut owned: Vec<&Invoice> = invoices.iter().filter(|i| i.user_id == user_id).collect();
    owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(
      owned
        .into_iter()
        .map(|i| InvoiceSummary {
          id: i.id,
          client_name: i.client_name.clone(),
          total: i.total,
          status: i.status,
          invoice_number: i.invoice_number,
          currency: i.currency,
          created_at: i.created_at,
        })
        .collect(),
    )
  }
}

/// Publisher that keeps everything it is handed
#[derive(Default)]
pub struct RecordingPublisher {
  published: Mutex<Vec<TemplatedEmail>>,
}

impl RecordingPublisher {
  pub fn published(&self) -> Vec<TemplatedEmail> {
    self.published.lock().unwrap().clone()
  }
}

impl NotificationPublisher for RecordingPublisher {
  fn publish(&self, email: TemplatedEmail) -> Result<(), NotificationError> {
    self.published.lock().unwrap().push(email);
    Ok(())
  }
}

/// Sender that records deliveries, or fails every one of them
#[derive(Default)]
pub struct RecordingEmailSender {
  sent: Mutex<Vec<TemplatedEmail>>,
  fail: AtomicBool,
}

impl RecordingEmailSender {
  pub fn failing() -> Self {
    Self {
      sent: Mutex::new(Vec::new()),
      fail: AtomicBool::new(true),
    }
  }

  pub fn sent(&self) -> Vec<TemplatedEmail> {
    self.sent.lock().unwrap().clone()
  }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
  async fn send(&self, email: &TemplatedEmail) -> Result<(), NotificationError> {
    if self.fail.load(Ordering::SeqCst) {
      return Err(NotificationError::Transport("connection refused".to_string()));
    }
    self.sent.lock().unwrap().push(email.clone());
    Ok(())
  }
}
