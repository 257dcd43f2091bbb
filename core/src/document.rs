// core/src/document.rs

//! Fixed-layout PDF for a planilla.
//!
//! [`PlanillaDocument`] is the pure content model (every string that ends up on the
//! page); a [`PdfEngine`] turns it into bytes.

use crate::error::{CoreError, CoreResult};
use crate::models::Planilla;
use chrono::{DateTime, Duration, Timelike, Utc};
use genpdf::elements::{Break, Paragraph};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{Color, Style};
use genpdf::{Alignment, Element, Margins, SimplePageDecorator};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

pub const COMPANY_HEADER: &str = "MAM HARDSOFT NETWORK TECHNOLOGY C.A.";
pub const DOCUMENT_TITLE: &str = "Planilla de Consultoría (Oficial)";
pub const DOCUMENT_FOOTER: &str = "Documento generado por API (server-side PDF).";

/// Venezuelan civil time (UTC-4, no DST) used for the printed date.
const VE_OFFSET_SECS: i64 = -4 * 60 * 60;

/// One paragraph of the page, top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLine {
  pub text: String,
  pub font_size: u8,
  pub centered: bool,
  pub muted: bool,
  /// Vertical gap before the line, in lines.
  pub gap_before: f64,
}

impl DocumentLine {
  fn new(text: impl Into<String>, font_size: u8) -> Self {
    Self {
      text: text.into(),
      font_size,
      centered: false,
      muted: false,
      gap_before: 0.0,
    }
  }

  fn centered(mut self) -> Self {
    self.centered = true;
    self
  }

  fn muted(mut self) -> Self {
    self.muted = true;
    self
  }

  fn gap(mut self, lines: f64) -> Self {
    self.gap_before = lines;
    self
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanillaDocument {
  pub correlativo: String,
  /// Creation instant of the planilla; also stamped into the PDF metadata.
  pub issued_at: DateTime<Utc>,
  pub fecha: String,
  pub cliente: String,
  pub proyecto: String,
  pub monto: String,
}

fn or_dash(value: &str) -> String {
  if value.is_empty() {
    "-".to_string()
  } else {
    value.to_string()
  }
}

/// `dd/mm/yyyy, h:mm:ss a. m.` in Venezuelan time.
pub fn format_fecha(fecha: DateTime<Utc>) -> String {
  let local = fecha.naive_utc() + Duration::seconds(VE_OFFSET_SECS);
  let suffix = if local.hour() < 12 { "a. m." } else { "p. m." };
  format!("{}, {} {}", local.format("%d/%m/%Y"), local.format("%-I:%M:%S"), suffix)
}

impl PlanillaDocument {
  pub fn from_planilla(planilla: &Planilla) -> Self {
    Self {
      correlativo: format!("{:0>4}", planilla.correlativo),
      issued_at: planilla.fecha,
      fecha: format_fecha(planilla.fecha),
      cliente: or_dash(&planilla.cliente),
      proyecto: or_dash(&planilla.proyecto),
      monto: format!("{:.2}", planilla.monto_bruto_usd.round_dp(2)),
    }
  }

  pub fn lines(&self) -> Vec<DocumentLine> {
    vec![
      DocumentLine::new(COMPANY_HEADER, 18).centered(),
      DocumentLine::new(DOCUMENT_TITLE, 14).centered().gap(0.2),
      DocumentLine::new(format!("Correlativo: {}", self.correlativo), 11).gap(1.2),
      DocumentLine::new(format!("Fecha: {}", self.fecha), 11),
      DocumentLine::new(format!("Cliente: {}", self.cliente), 11),
      DocumentLine::new(format!("Proyecto: {}", self.proyecto), 11),
      DocumentLine::new(format!("Monto bruto (USD): {}", self.monto), 12).gap(0.8),
      DocumentLine::new(DOCUMENT_FOOTER, 9).muted().gap(1.2),
    ]
  }
}

/// Rendering primitive behind the generator.
pub trait PdfEngine: Send + Sync {
  fn render(&self, document: &PlanillaDocument) -> CoreResult<Vec<u8>>;
}

/// Font directories tried, in order, after the configured one.
pub const SYSTEM_FONT_DIRS: &[(&str, &str)] = &[
  ("/usr/share/fonts/truetype/liberation", "LiberationSans"),
  ("/usr/share/fonts/truetype/liberation2", "LiberationSans"),
  ("/usr/share/fonts/liberation-sans", "LiberationSans"),
];

/// `genpdf` engine over a font family loaded once, from
/// `<family>-{Regular,Bold,Italic,BoldItalic}.ttf`.
///
/// Output is byte-for-byte reproducible: the PDF dates are pinned to the
/// planilla's `fecha` and the trailer ids are derived from the content.
#[derive(Clone)]
pub struct GenpdfEngine {
  fonts: FontFamily<FontData>,
  source: PathBuf,
}

impl fmt::Debug for GenpdfEngine {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("GenpdfEngine").field("source", &self.source).finish_non_exhaustive()
  }
}

impl GenpdfEngine {
  /// Loads the family from `fonts_dir`.
  pub fn load(fonts_dir: impl AsRef<Path>, family: &str) -> CoreResult<Self> {
    let fonts_dir = fonts_dir.as_ref();
    let fonts = genpdf::fonts::from_files(fonts_dir, family, None).map_err(|e| {
      error!(fonts_dir = %fonts_dir.display(), family, "Error loading fonts: {}", e);
      CoreError::Render(format!("Error cargando fuentes: {}", e))
    })?;
    Ok(Self {
      fonts,
      source: fonts_dir.join(family),
    })
  }

  /// The configured family first, then [`SYSTEM_FONT_DIRS`]. Fails with the
  /// error of the configured location when nothing loads.
  pub fn discover(fonts_dir: impl AsRef<Path>, family: &str) -> CoreResult<Self> {
    let configured = Self::load(fonts_dir, family);
    if configured.is_ok() {
      return configured;
    }
    for (dir, candidate) in SYSTEM_FONT_DIRS {
      if !Path::new(dir).join(format!("{}-Regular.ttf", candidate)).exists() {
        continue;
      }
      if let Ok(engine) = Self::load(dir, candidate) {
        warn!(fonts = %engine.source.display(), "Configured PDF fonts unavailable; using system fonts.");
        return Ok(engine);
      }
    }
    configured
  }

  pub fn source(&self) -> &Path {
    &self.source
  }
}

impl PdfEngine for GenpdfEngine {
  fn render(&self, document: &PlanillaDocument) -> CoreResult<Vec<u8>> {
    let mut doc = genpdf::Document::new(self.fonts.clone());
    doc.set_title(format!("Planilla {}", document.correlativo));
    doc.set_paper_size(genpdf::PaperSize::A4);
    // No XMP packet: it would carry more timestamps and a random instance id.
    doc.set_minimal_conformance();
    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(Margins::trbl(17, 17, 17, 17));
    doc.set_page_decorator(decorator);

    for line in document.lines() {
      if line.gap_before > 0.0 {
        doc.push(Break::new(line.gap_before));
      }
      let mut style = Style::new().with_font_size(line.font_size);
      if line.muted {
        style = style.with_color(Color::Rgb(85, 85, 85));
      }
      let alignment = if line.centered { Alignment::Center } else { Alignment::Left };
      doc.push(Paragraph::new(line.text).aligned(alignment).styled(style));
    }

    let mut buffer = Vec::new();
    doc
      .render(&mut buffer)
      .map_err(|e| CoreError::Render(format!("Error generando PDF: {}", e)))?;
    pin_volatile_metadata(&mut buffer, &pdf_timestamp(document.issued_at), &document_id(document));
    Ok(buffer)
  }
}

/// Info-dictionary date form, `D:YYYYMMDDHHmmss+00'00'`.
pub fn pdf_timestamp(at: DateTime<Utc>) -> String {
  at.format("D:%Y%m%d%H%M%S+00'00'").to_string()
}

/// 32 hex digits derived from the document content.
fn document_id(document: &PlanillaDocument) -> String {
  let mut hasher = DefaultHasher::new();
  document.hash(&mut hasher);
  let first = hasher.finish();
  COMPANY_HEADER.hash(&mut hasher);
  format!("{:016X}{:016X}", first, hasher.finish())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  haystack.windows(needle.len()).rposition(|w| w == needle)
}

fn skip_whitespace(pdf: &[u8], mut at: usize) -> usize {
  while matches!(pdf.get(at), Some(b' ' | b'\n' | b'\r')) {
    at += 1;
  }
  at
}

/// Replaces the literal string starting at `at` when it is exactly as long as
/// `value`, so every xref offset stays valid. Returns the index past it.
fn overwrite_literal(pdf: &mut [u8], at: usize, value: &[u8]) -> Option<usize> {
  let open = skip_whitespace(pdf, at);
  if pdf.get(open) != Some(&b'(') {
    return None;
  }
  let body = open + 1;
  let close = body + pdf.get(body..)?.iter().position(|&b| b == b')')?;
  if close - body != value.len() {
    return None;
  }
  pdf[body..close].copy_from_slice(value);
  Some(close + 1)
}

/// Rewrites the render-time `/CreationDate`, `/ModDate` and trailer `/ID` values.
pub fn pin_volatile_metadata(pdf: &mut [u8], timestamp: &str, id: &str) {
  for key in [&b"/CreationDate"[..], &b"/ModDate"[..]] {
    if let Some(pos) = find(pdf, key) {
      if overwrite_literal(pdf, pos + key.len(), timestamp.as_bytes()).is_none() {
        debug!(key = %String::from_utf8_lossy(key), "PDF date left untouched.");
      }
    }
  }

  // The trailer comes last: `/ID[(<document id>)(<instance id>)]`.
  if let Some(pos) = rfind(pdf, b"/ID") {
    let open = skip_whitespace(pdf, pos + 3);
    if pdf.get(open) == Some(&b'[') {
      if let Some(next) = overwrite_literal(pdf, open + 1, id.as_bytes()) {
        overwrite_literal(pdf, next, id.as_bytes());
      }
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
  pub bytes: Vec<u8>,
  /// Zero-padded correlativo, used for file names.
  pub correlativo: String,
}

#[derive(Clone)]
pub struct DocumentGenerator {
  engine: Arc<dyn PdfEngine>,
}

impl DocumentGenerator {
  pub fn new(engine: Arc<dyn PdfEngine>) -> Self {
    Self { engine }
  }

  #[instrument(name = "document::render", skip(self, planilla), fields(planilla_id = %planilla.id))]
  pub fn render(&self, planilla: &Planilla) -> CoreResult<RenderedDocument> {
    let document = PlanillaDocument::from_planilla(planilla);
    let bytes = self.engine.render(&document)?;
    debug!(size = bytes.len(), "Planilla PDF rendered.");
    Ok(RenderedDocument {
      bytes,
      correlativo: document.correlativo,
    })
  }
}
