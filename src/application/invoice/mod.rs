pub mod create_invoice;
pub mod delete_invoice;
pub mod edit_invoice;
pub mod get_dashboard;
pub mod get_invoice;
pub mod invoice_list_view;
pub mod list_invoices;
pub mod mark_invoice_paid;
pub mod notifications;
pub mod render_invoice_pdf;
pub mod send_invoice_reminder;

pub use create_invoice::CreateInvoiceUseCase;
pub use delete_invoice::DeleteInvoiceUseCase;
pub use edit_invoice::EditInvoiceUseCase;
pub use get_dashboard::{DashboardResponse, GetDashboardUseCase};
pub use get_invoice::GetInvoiceUseCase;
pub use invoice_list_view::{InvoiceListViewUseCase, invalidate_list_view};
pub use list_invoices::ListInvoicesUseCase;
pub use mark_invoice_paid::MarkInvoicePaidUseCase;
pub use notifications::{InvoiceLinkBuilder, InvoiceMailer, resolve_recipient};
pub use render_invoice_pdf::{RenderInvoicePdfUseCase, RenderedInvoice};
pub use send_invoice_reminder::SendInvoiceReminderUseCase;
