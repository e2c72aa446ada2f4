use backoff::ExponentialBackoff;
use backoff::future::retry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::domain::notification::{EmailSender, NotificationError, NotificationPublisher, TemplatedEmail};
use crate::infrastructure::metrics::{EMAILS_DROPPED, EMAILS_FAILED, EMAILS_SENT};

/// Queues invoice emails and delivers them from a background worker, so
/// that request handlers never wait on the email provider.
#[derive(Clone)]
pub struct NotificationDispatcher {
  queue: mpsc::Sender<TemplatedEmail>,
}

impl NotificationDispatcher {
  /// Spawns the delivery worker. It stops once `shutdown` is cancelled or
  /// every dispatcher handle has been dropped and the queue is empty.
  pub fn start(
    sender: Arc<dyn EmailSender>,
    capacity: usize,
    retry_max_elapsed: Duration,
    shutdown: CancellationToken,
  ) -> (Self, JoinHandle<()>) {
    let (queue, rx) = mpsc::channel(capacity.max(1));
    let worker = DeliveryWorker {
      sender,
      retry_max_elapsed,
    };
    let handle = tokio::spawn(worker.run(rx, shutdown));
    (Self { queue }, handle)
  }
}

impl NotificationPublisher for NotificationDispatcher {
  fn publish(&self, email: TemplatedEmail) -> Result<(), NotificationError> {
    match self.queue.try_send(email) {
      Ok(()) => Ok(()),
      Err(TrySendError::Full(email)) => {
        EMAILS_DROPPED.inc();
        tracing::warn!(
          template = email.template.as_str(),
          to = %email.to.email,
          "Email queue full, dropping email"
        );
        Err(NotificationError::QueueFull)
      }
      Err(TrySendError::Closed(_)) => {
        EMAILS_DROPPED.inc();
        Err(NotificationError::QueueClosed)
      }
    }
  }
}

struct DeliveryWorker {
  sender: Arc<dyn EmailSender>,
  retry_max_elapsed: Duration,
}

impl DeliveryWorker {
  async fn run(self, mut rx: mpsc::Receiver<TemplatedEmail>, shutdown: CancellationToken) {
    tracing::info!("Email delivery worker started");

    loop {
      tokio::select! {
        biased;
        _ = shutdown.cancelled() => {
          tracing::info!("Email delivery worker shutting down");
          break;
        }
        email = rx.recv() => match email {
          Some(email) => self.deliver_with_retry(email).await,
          None => break,
        }
      }
    }

    // One last attempt for whatever is still queued
    rx.close();
    while let Some(email) = rx.recv().await {
      let result = self.sender.send(&email).await;
      self.record(&email, result);
    }

    tracing::info!("Email delivery worker stopped");
  }

  async fn deliver_with_retry(&self, email: TemplatedEmail) {
    let policy = ExponentialBackoff {
      max_elapsed_time: Some(self.retry_max_elapsed),
      ..Default::default()
    };

    let result = retry(policy, || async {
      self.sender.send(&email).await.map_err(|e| {
        if e.is_permanent() {
          backoff::Error::permanent(e)
        } else {
          tracing::debug!(error = %e, to = %email.to.email, "Email delivery attempt failed");
          backoff::Error::transient(e)
        }
      })
    })
    .await;

    self.record(&email, result);
  }

  fn record(&self, email: &TemplatedEmail, result: Result<(), NotificationError>) {
    let template = email.template.as_str();
    match result {
      Ok(()) => {
        EMAILS_SENT.with_label_values(&[template]).inc();
      }
      Err(e) => {
        EMAILS_FAILED.with_label_values(&[template]).inc();
        tracing::error!(
          template,
          to = %email.to.email,
          invoice_number = email.variables.invoice_number,
          error = %e,
          "Failed to deliver email"
        );
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::notification::{EmailTemplate, InvoiceEmailVariables, Mailbox};
  use crate::testing::RecordingEmailSender;
  use async_trait::async_trait;
  use std::sync::atomic::{AtomicUsize, Ordering};

  fn email(invoice_number: i32) -> TemplatedEmail {
    TemplatedEmail {
      template: EmailTemplate::InvoiceCreated,
      from: Mailbox::named("hello@invoicer.example", "Invoicer"),
      to: Mailbox::named("accounts@grace.example", "Grace Ltd"),
      variables: InvoiceEmailVariables {
        client_name: "Grace Ltd".to_string(),
        invoice_number,
        invoice_due_date: "February 4, 2025".to_string(),
        invoice_amount: "$3,000.00".to_string(),
        invoice_link: "http://localhost:8080/api/invoice/abc".to_string(),
        support_email: None,
      },
    }
  }

  /// Fails the first `failures` attempts with the given error kind
  struct FlakySender {
    failures: usize,
    permanent: bool,
    attempts: AtomicUsize,
  }

  #[async_trait]
  impl EmailSender for FlakySender {
    async fn send(&self, _email: &TemplatedEmail) -> Result<(), NotificationError> {
      let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
      if attempt < self.failures {
        if self.permanent {
          return Err(NotificationError::Rejected("422 Unprocessable".to_string()));
        }
        return Err(NotificationError::Transport("timeout".to_string()));
      }
      Ok(())
    }
  }

  #[tokio::test]
  async fn test_queued_emails_are_delivered() {
    let sender = Arc::new(RecordingEmailSender::default());
    let (dispatcher, handle) = NotificationDispatcher::start(
      sender.clone(),
      8,
      Duration::from_secs(5),
      CancellationToken::new(),
    );

    dispatcher.publish(email(1)).unwrap();
    dispatcher.publish(email(2)).unwrap();
    drop(dispatcher);
    handle.await.unwrap();

    let sent = sender.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].variables.invoice_number, 1);
    assert_eq!(sent[1].variables.invoice_number, 2);
  }

  #[tokio::test]
  async fn test_transient_failures_are_retried() {
    let sender = Arc::new(FlakySender {
      failures: 1,
      permanent: false,
      attempts: AtomicUsize::new(0),
    });
    let (dispatcher, handle) = NotificationDispatcher::start(
      sender.clone(),
      8,
      Duration::from_secs(30),
      CancellationToken::new(),
    );

    dispatcher.publish(email(1)).unwrap();
    drop(dispatcher);
    handle.await.unwrap();

    assert_eq!(sender.attempts.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_permanent_failures_are_not_retried() {
    let sender = Arc::new(FlakySender {
      failures: usize::MAX,
      permanent: true,
      attempts: AtomicUsize::new(0),
    });
    let (dispatcher, handle) = NotificationDispatcher::start(
      sender.clone(),
      8,
      Duration::from_secs(30),
      CancellationToken::new(),
    );

    dispatcher.publish(email(1)).unwrap();
    drop(dispatcher);
    handle.await.unwrap();

    assert_eq!(sender.attempts.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_publish_after_shutdown_reports_closed_queue() {
    let shutdown = CancellationToken::new();
    let (dispatcher, handle) = NotificationDispatcher::start(
      Arc::new(RecordingEmailSender::default()),
      8,
      Duration::from_secs(5),
      shutdown.clone(),
    );

    shutdown.cancel();
    handle.await.unwrap();

    let result = dispatcher.publish(email(1));
    assert!(matches!(result, Err(NotificationError::QueueClosed)));
  }
}
