use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::invoice::{
  Currency, Invoice, InvoiceDraft, InvoiceStatus, InvoiceSummary, errors::InvoiceError,
  ports::InvoiceRepository,
};

#[derive(Debug, FromRow)]
struct InvoiceRow {
  id: Uuid,
  user_id: Uuid,
  invoice_name: String,
  invoice_number: i32,
  currency: String,
  issue_date: NaiveDate,
  due_in_days: i32,
  item_description: String,
  item_quantity: i32,
  item_rate: Decimal,
  total: Decimal,
  note: Option<String>,
  from_name: String,
  from_email: String,
  from_address: String,
  client_name: String,
  client_email: String,
  client_address: String,
  status: String,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
  type Error = InvoiceError;

  fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
    let currency = Currency::from_str(&row.currency)?;
    let status = InvoiceStatus::from_str(&row.status)?;

    Ok(Invoice {
      id: row.id,
      user_id: row.user_id,
      invoice_name: row.invoice_name,
      invoice_number: row.invoice_number,
      currency,
      issue_date: row.issue_date,
      due_in_days: row.due_in_days,
      item_description: row.item_description,
      item_quantity: row.item_quantity,
      item_rate: row.item_rate,
      total: row.total,
      note: row.note,
      from_name: row.from_name,
      from_email: row.from_email,
      from_address: row.from_address,
      client_name: row.client_name,
      client_email: row.client_email,
      client_address: row.client_address,
      status,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

#[derive(Debug, FromRow)]
struct InvoiceSummaryRow {
  id: Uuid,
  client_name: String,
  total: Decimal,
  status: String,
  invoice_number: i32,
  currency: String,
  created_at: DateTime<Utc>,
}

impl TryFrom<InvoiceSummaryRow> for InvoiceSummary {
  type Error = InvoiceError;

  fn try_from(row: InvoiceSummaryRow) -> Result<Self, Self::Error> {
    Ok(InvoiceSummary {
      id: row.id,
      client_name: row.client_name,
      total: row.total,
      status: InvoiceStatus::from_str(&row.status)?,
      invoice_number: row.invoice_number,
      currency: Currency::from_str(&row.currency)?,
      created_at: row.created_at,
    })
  }
}

pub struct PostgresInvoiceRepository {
  pool: PgPool,
}

impl PostgresInvoiceRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl InvoiceRepository for PostgresInvoiceRepository {
  async fn create(&self, invoice: Invoice) -> Result<Invoice, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(
      r#"
            INSERT INTO invoices (
                id, user_id, invoice_name, invoice_number, currency, issue_date,
                due_in_days, item_description, item_quantity, item_rate, total, note,
                from_name, from_email, from_address, client_name, client_email,
                client_address, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21)
            RETURNING id, user_id, invoice_name, invoice_number, currency, issue_date,
                      due_in_days, item_description, item_quantity, item_rate, total, note,
                      from_name, from_email, from_address, client_name, client_email,
                      client_address, status, created_at, updated_at
            "#,
    )
    .bind(invoice.id)
    .bind(invoice.user_id)
    .bind(&invoice.invoice_name)
    .bind(invoice.invoice_number)
    .bind(invoice.currency.as_str())
    .bind(invoice.issue_date)
    .bind(invoice.due_in_days)
    .bind(&invoice.item_description)
    .bind(invoice.item_quantity)
    .bind(invoice.item_rate)
    .bind(invoice.total)
    .bind(&invoice.note)
    .bind(&invoice.from_name)
    .bind(&invoice.from_email)
    .bind(&invoice.from_address)
    .bind(&invoice.client_name)
    .bind(&invoice.client_email)
    .bind(&invoice.client_address)
    .bind(invoice.status.as_str())
    .bind(invoice.created_at)
    .bind(invoice.updated_at)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| {
      tracing::error!("Failed to create invoice: {}", e);
      InvoiceError::Database(e)
    })?;

    row.try_into()
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(
      r#"
            SELECT id, user_id, invoice_name, invoice_number, currency, issue_date,
                   due_in_days, item_description, item_quantity, item_rate, total, note,
                   from_name, from_email, from_address, client_name, client_email,
                   client_address, status, created_at, updated_at
            FROM invoices
            WHERE id = $1
            "#,
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await
    .map_err(InvoiceError::Database)?;

    row.map(Invoice::try_from).transpose()
  }

  async fn find_for_owner(&self, id: Uuid, user_id: Uuid) -> Result<Option<Invoice>, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(
      r#"
            SELECT id, user_id, invoice_name, invoice_number, currency, issue_date,
                   due_in_days, item_description, item_quantity, item_rate, total, note,
                   from_name, from_email, from_address, client_name, client_email,
                   client_address, status, created_at, updated_at
            FROM invoices
            WHERE id = $1 AND user_id = $2
            "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&self.pool)
    .await
    .map_err(InvoiceError::Database)?;

    row.map(Invoice::try_from).transpose()
  }

  async fn update_for_owner(
    &self,
    id: Uuid,
    user_id: Uuid,
    draft: &InvoiceDraft,
  ) -> Result<Option<Invoice>, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(
      r#"
            UPDATE invoices
            SET invoice_name = $3, invoice_number = $4, currency = $5, issue_date = $6,
                due_in_days = $7, item_description = $8, item_quantity = $9,
                item_rate = $10, total = $11, note = $12, from_name = $13,
                from_email = $14, from_address = $15, client_name = $16,
                client_email = $17, client_address = $18, status = $19,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND (status = 'PENDING' OR $19 = 'PAID')
            RETURNING id, user_id, invoice_name, invoice_number, currency, issue_date,
                      due_in_days, item_description, item_quantity, item_rate, total, note,
                      from_name, from_email, from_address, client_name, client_email,
                      client_address, status, created_at, updated_at
            "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&draft.invoice_name)
    .bind(draft.invoice_number)
    .bind(draft.currency.as_str())
    .bind(draft.issue_date)
    .bind(draft.due_in_days)
    .bind(&draft.item_description)
    .bind(draft.item_quantity)
    .bind(draft.item_rate)
    .bind(draft.total)
    .bind(&draft.note)
    .bind(&draft.from_name)
    .bind(&draft.from_email)
    .bind(&draft.from_address)
    .bind(&draft.client_name)
    .bind(&draft.client_email)
    .bind(&draft.client_address)
    .bind(draft.status.as_str())
    .fetch_optional(&self.pool)
    .await
    .map_err(|e| {
      tracing::error!("Failed to update invoice {}: {}", id, e);
      InvoiceError::Database(e)
    })?;

    row.map(Invoice::try_from).transpose()
  }

  async fn mark_paid_for_owner(
    &self,
    id: Uuid,
    user_id: Uuid,
  ) -> Result<Option<Invoice>, InvoiceError> {
    // Leaves updated_at alone when the invoice was already paid
    let row = sqlx::query_as::<_, InvoiceRow>(
      r#"
            UPDATE invoices
            SET status = 'PAID',
                updated_at = CASE WHEN status = 'PAID' THEN updated_at ELSE NOW() END
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, invoice_name, invoice_number, currency, issue_date,
                      due_in_days, item_description, item_quantity, item_rate, total, note,
                      from_name, from_email, from_address, client_name, client_email,
                      client_address, status, created_at, updated_at
            "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&self.pool)
    .await
    .map_err(|e| {
      tracing::error!("Failed to mark invoice {} paid: {}", id, e);
      InvoiceError::Database(e)
    })?;

    row.map(Invoice::try_from).transpose()
  }

  async fn delete_for_owner(&self, id: Uuid, user_id: Uuid) -> Result<bool, InvoiceError> {
    let result = sqlx::query("DELETE FROM invoices WHERE id = $1 AND user_id = $2")
      .bind(id)
      .bind(user_id)
      .execute(&self.pool)
      .await
      .map_err(|e| {
        tracing::error!("Failed to delete invoice {}: {}", id, e);
        InvoiceError::Database(e)
      })?;

    Ok(result.rows_affected() > 0)
  }

  async fn list_summaries_for_owner(
    &self,
    user_id: Uuid,
  ) -> Result<Vec<InvoiceSummary>, InvoiceError> {
    let rows = sqlx::query_as::<_, InvoiceSummaryRow>(
      r#"
            SELECT id, client_name, total, status, invoice_number, currency, created_at
            FROM invoices
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
    )
    .bind(user_id)
    .fetch_all(&self.pool)
    .await
    .map_err(InvoiceError::Database)?;

    rows.into_iter().map(InvoiceSummary::try_from).collect()
  }
}
