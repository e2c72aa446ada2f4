pub mod invoice_repository;
pub mod session_repository;
pub mod user_repository;

pub use invoice_repository::PostgresInvoiceRepository;
pub use session_repository::PostgresSessionRepository;
pub use user_repository::PostgresUserRepository;
