use printpdf::path::PaintMode;
use printpdf::*;

use crate::domain::invoice::errors::InvoiceError;
use crate::domain::invoice::ports::InvoicePdfRenderer;
use crate::domain::invoice::{Invoice, format_currency, format_long_date_ng};
use crate::infrastructure::metrics::PDFS_RENDERED;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;

const PRIMARY: (f32, f32, f32) = (52.0, 152.0, 219.0);
const SECONDARY: (f32, f32, f32) = (44.0, 62.0, 80.0);
const LIGHT_GRAY: (f32, f32, f32) = (236.0, 240.0, 241.0);
const WHITE: (f32, f32, f32) = (255.0, 255.0, 255.0);

const NOTE_WIDTH_MM: f32 = 170.0;
const NOTE_FONT_SIZE: f32 = 10.0;
const NOTE_LINE_HEIGHT_MM: f32 = 4.5;
/// Last baseline a note line may use; below it the note is cut off
const NOTE_BOTTOM_MM: f32 = 280.0;
const PANEL_LINE_HEIGHT_MM: f32 = 5.0;

/// Average Helvetica glyph width as a fraction of the font size
const AVG_GLYPH_EM: f32 = 0.5;
const PT_TO_MM: f32 = 0.3528;

struct Fonts {
  regular: IndirectFontRef,
  bold: IndirectFontRef,
  italic: IndirectFontRef,
}

/// Draws with top-left page coordinates in millimetres
struct Canvas {
  layer: PdfLayerReference,
  fonts: Fonts,
}

impl Canvas {
  fn fill(&self, (r, g, b): (f32, f32, f32)) {
    self
      .layer
      .set_fill_color(Color::Rgb(Rgb::new(r / 255.0, g / 255.0, b / 255.0, None)));
  }

  fn rect(&self, x: f32, y: f32, w: f32, h: f32, color: (f32, f32, f32)) {
    self.fill(color);
    let rect = Rect::new(
      Mm(x),
      Mm(PAGE_HEIGHT - y - h),
      Mm(x + w),
      Mm(PAGE_HEIGHT - y),
    )
    .with_mode(PaintMode::Fill);
    self.layer.add_rect(rect);
  }

  fn text(&self, text: &str, size: f32, x: f32, y: f32, font: &IndirectFontRef) {
    self
      .layer
      .use_text(text, size, Mm(x), Mm(PAGE_HEIGHT - y), font);
  }

  fn lines(&self, lines: &[&str], size: f32, x: f32, y: f32) {
    for (i, line) in lines.iter().enumerate() {
      let baseline = y + i as f32 * PANEL_LINE_HEIGHT_MM;
      self.text(line, size, x, baseline, &self.fonts.regular);
    }
  }
}

/// Renders the single-page A4 invoice layout with printpdf's built-in fonts
#[derive(Debug, Default, Clone)]
pub struct PrintPdfInvoiceRenderer;

impl PrintPdfInvoiceRenderer {
  pub fn new() -> Self {
    Self
  }

  fn draw(&self, canvas: &Canvas, invoice: &Invoice) {
    let fonts = &canvas.fonts;

    // Header band
    canvas.rect(0.0, 0.0, PAGE_WIDTH, 30.0, PRIMARY);
    canvas.fill(WHITE);
    canvas.text(&invoice.invoice_name, 28.0, 20.0, 25.0, &fonts.bold);

    // Metadata
    canvas.fill(SECONDARY);
    canvas.text(
      &format!("Invoice #{}", invoice.invoice_number),
      12.0,
      20.0,
      50.0,
      &fonts.regular,
    );
    canvas.text(
      &format!("Date: {}", format_long_date_ng(invoice.issue_date)),
      12.0,
      20.0,
      57.0,
      &fonts.regular,
    );
    canvas.text(
      &format!("Due Date: Net {}", invoice.due_in_days),
      12.0,
      20.0,
      64.0,
      &fonts.regular,
    );

    // From / Bill to panels
    canvas.rect(20.0, 75.0, 80.0, 40.0, LIGHT_GRAY);
    canvas.rect(110.0, 75.0, 80.0, 40.0, LIGHT_GRAY);
    canvas.fill(SECONDARY);
    canvas.text("From", 14.0, 25.0, 85.0, &fonts.bold);
    canvas.lines(
      &[&invoice.from_name, &invoice.from_email, &invoice.from_address],
      10.0,
      25.0,
      92.0,
    );
    canvas.text("Bill to", 14.0, 115.0, 85.0, &fonts.bold);
    canvas.lines(
      &[
        &invoice.client_name,
        &invoice.client_email,
        &invoice.client_address,
      ],
      10.0,
      115.0,
      92.0,
    );

    // Item table
    canvas.rect(20.0, 125.0, 170.0, 10.0, PRIMARY);
    canvas.fill(WHITE);
    for (label, x) in [
      ("Description", 25.0),
      ("Quantity", 100.0),
      ("Rate", 130.0),
      ("Total", 160.0),
    ] {
      canvas.text(label, 11.0, x, 132.0, &fonts.bold);
    }

    let rate = format_currency(invoice.item_rate, invoice.currency);
    let total = format_currency(invoice.total, invoice.currency);
    canvas.fill(SECONDARY);
    canvas.text(&invoice.item_description, 11.0, 25.0, 145.0, &fonts.regular);
    canvas.text(
      &invoice.item_quantity.to_string(),
      11.0,
      100.0,
      145.0,
      &fonts.regular,
    );
    canvas.text(&rate, 11.0, 130.0, 145.0, &fonts.regular);
    canvas.text(&total, 11.0, 160.0, 145.0, &fonts.regular);

    // Total band
    canvas.rect(130.0, 155.0, 60.0, 10.0, LIGHT_GRAY);
    canvas.fill(SECONDARY);
    canvas.text(
      &format!("Total ({})", invoice.currency),
      11.0,
      135.0,
      162.0,
      &fonts.bold,
    );
    canvas.text(&total, 11.0, 160.0, 162.0, &fonts.bold);

    if let Some(note) = invoice.note.as_deref().filter(|n| !n.trim().is_empty()) {
      canvas.text("Note:", NOTE_FONT_SIZE, 20.0, 180.0, &fonts.regular);
      let max_chars = max_chars_for_width(NOTE_WIDTH_MM, NOTE_FONT_SIZE);
      for (i, line) in wrap_text(note, max_chars).iter().enumerate() {
        let baseline = 187.0 + i as f32 * NOTE_LINE_HEIGHT_MM;
        if baseline > NOTE_BOTTOM_MM {
          break;
        }
        canvas.text(line, NOTE_FONT_SIZE, 20.0, baseline, &fonts.regular);
      }
    }

    canvas.text(
      "Page 1",
      8.0,
      PAGE_WIDTH - 30.0,
      PAGE_HEIGHT - 10.0,
      &fonts.italic,
    );
  }
}

impl InvoicePdfRenderer for PrintPdfInvoiceRenderer {
  fn render(&self, invoice: &Invoice) -> Result<Vec<u8>, InvoiceError> {
    let (doc, page, layer) = PdfDocument::new(
      &invoice.invoice_name,
      Mm(PAGE_WIDTH),
      Mm(PAGE_HEIGHT),
      "Layer 1",
    );

    let font = |builtin: BuiltinFont| {
      doc
        .add_builtin_font(builtin)
        .map_err(|e| InvoiceError::PdfGenerationFailed(format!("Failed to load font: {}", e)))
    };
    let fonts = Fonts {
      regular: font(BuiltinFont::Helvetica)?,
      bold: font(BuiltinFont::HelveticaBold)?,
      italic: font(BuiltinFont::HelveticaOblique)?,
    };

    let canvas = Canvas {
      layer: doc.get_page(page).get_layer(layer),
      fonts,
    };
    self.draw(&canvas, invoice);

    let bytes = doc
      .save_to_bytes()
      .map_err(|e| InvoiceError::PdfGenerationFailed(e.to_string()))?;

    PDFS_RENDERED.inc();
    tracing::debug!(invoice_id = %invoice.id, size = bytes.len(), "Rendered invoice PDF");
    Ok(bytes)
  }
}

fn max_chars_for_width(width_mm: f32, font_size: f32) -> usize {
  let glyph_mm = font_size * PT_TO_MM * AVG_GLYPH_EM;
  ((width_mm / glyph_mm).floor() as usize).max(1)
}

/// Greedy word wrap. Explicit line breaks are kept and words longer than a
/// line are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
  let max_chars = max_chars.max(1);
  let mut lines = Vec::new();

  for paragraph in text.lines() {
    let mut current = String::new();
    for word in paragraph.split_whitespace() {
      let mut word: Vec<char> = word.chars().collect();

      while word.len() > max_chars {
        if !current.is_empty() {
          lines.push(std::mem::take(&mut current));
        }
        let rest = word.split_off(max_chars);
        lines.push(word.into_iter().collect());
        word = rest;
      }

      let current_len = current.chars().count();
      if current_len > 0 && current_len + 1 + word.len() > max_chars {
        lines.push(std::mem::take(&mut current));
      }
      if !current.is_empty() {
        current.push(' ');
      }
      current.extend(word);
    }
    lines.push(current);
  }

  lines
}
