pub mod printpdf_renderer;

pub use printpdf_renderer::PrintPdfInvoiceRenderer;
