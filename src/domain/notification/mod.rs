pub mod entities;
pub mod errors;
pub mod ports;

pub use entities::{EmailTemplate, InvoiceEmailVariables, Mailbox, TemplatedEmail};
pub use errors::NotificationError;
pub use ports::{EmailSender, NotificationPublisher};
