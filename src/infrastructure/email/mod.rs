//! Email delivery: provider clients and the background dispatcher

pub mod dispatcher;
pub mod log_sender;
pub mod mailtrap;

pub use dispatcher::NotificationDispatcher;
pub use log_sender::LogEmailSender;
pub use mailtrap::MailtrapEmailSender;
