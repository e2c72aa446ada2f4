pub mod entities;
pub mod errors;
pub mod formatting;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{Invoice, InvoiceDraft, InvoiceSummary};
pub use errors::InvoiceError;
pub use formatting::{format_currency, format_long_date_ng, format_long_date_us};
pub use ports::{InvoiceListCache, InvoicePdfRenderer, InvoiceRepository};
pub use services::{DashboardStats, InvoiceService};
pub use value_objects::{Currency, InvoiceStatus, ValueObjectError};
