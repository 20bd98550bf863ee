//! PDF report rendering via `printpdf`.
//!
//! One A4 page with a fixed layout: title, demographics, symptom text, the
//! reconciled diagnosis line, and the slide image when one is on file. A
//! missing or unreadable image is omitted rather than failing the render;
//! `RenderError` is reserved for document serialization itself.

use std::io::BufWriter;

use printpdf::{BuiltinFont, Image, ImageTransform, Mm, PdfDocument, PdfLayerReference};
use thiserror::Error;
use tracing::warn;

use crate::models::PatientRecord;
use crate::reconcile::reconcile;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("PDF font error: {0}")]
    Font(String),

    #[error("PDF save error: {0}")]
    Save(String),
}

/// Printed width of the embedded slide image.
const SLIDE_WIDTH_MM: f32 = 100.0;

/// Renders the diagnostic report for a record. Returns PDF bytes.
pub fn render_report(record: &PatientRecord) -> Result<Vec<u8>, RenderError> {
    let (doc, page1, layer1) =
        PdfDocument::new("Malaria Diagnostic Report", Mm(210.0), Mm(297.0), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| RenderError::Font(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| RenderError::Font(e.to_string()))?;

    let mut y = Mm(280.0);

    // Title, centered by fixed offset for the known string
    layer.use_text("Malaria Diagnostic Report", 14.0, Mm(70.0), y, &bold);
    y -= Mm(12.0);

    // Demographics
    layer.use_text(format!("Name: {}", record.name), 11.0, Mm(20.0), y, &font);
    y -= Mm(6.0);
    layer.use_text(format!("Age: {}", record.age), 11.0, Mm(20.0), y, &font);
    y -= Mm(6.0);
    layer.use_text(format!("Gender: {}", record.gender), 11.0, Mm(20.0), y, &font);
    y -= Mm(6.0);
    layer.use_text(format!("Contact: {}", record.contact), 11.0, Mm(20.0), y, &font);
    y -= Mm(10.0);

    // Symptoms
    layer.use_text("SYMPTOMS:", 11.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    for line in wrap_text(&record.symptoms, 80) {
        layer.use_text(&line, 9.0, Mm(25.0), y, &font);
        y -= Mm(4.5);
    }
    y -= Mm(8.0);

    // Diagnosis — slide verdict only, advisory text has no place here
    layer.use_text("Final Diagnosis (Slide Image):", 11.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    layer.use_text(reconcile(record).as_str(), 11.0, Mm(25.0), y, &font);
    y -= Mm(6.0);

    if let Some(path) = &record.image_path {
        embed_slide(&layer, path, &mut y);
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| RenderError::Save(e.to_string()))?;
    buf.into_inner()
        .map_err(|e| RenderError::Save(e.to_string()))
}

/// Draws the slide image below the diagnosis, anchored at the left margin.
/// Skips silently (with a log line) if the file is gone or undecodable.
fn embed_slide(layer: &PdfLayerReference, path: &str, y: &mut Mm) {
    let img = match image::open(path) {
        Ok(img) => img,
        Err(e) => {
            warn!(path = path, error = %e, "Slide image unreadable, omitting from report");
            return;
        }
    };

    // Strip any alpha channel before embedding
    let rgb = img.to_rgb8();
    let (px_w, px_h) = rgb.dimensions();

    // printpdf renders images at 300 dpi natural size; scale to a fixed
    // printed width with preserved aspect ratio.
    let natural_w_mm = px_w as f32 * 25.4 / 300.0;
    let natural_h_mm = px_h as f32 * 25.4 / 300.0;
    let scale = SLIDE_WIDTH_MM / natural_w_mm;
    let drawn_height = Mm(natural_h_mm * scale);

    // Images anchor at their bottom-left corner
    *y -= drawn_height + Mm(4.0);

    let slide = Image::from_dynamic_image(&image::DynamicImage::ImageRgb8(rgb));
    slide.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(20.0)),
            translate_y: Some(*y),
            scale_x: Some(scale),
            scale_y: Some(scale),
            ..Default::default()
        },
    );
}

/// Simple word-wrap helper for PDF text rendering.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

// ─── Tests ────────────────────────────────────────────────────────────────────
