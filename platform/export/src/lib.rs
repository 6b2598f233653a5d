//! Writers for the rows currently shown in a record view.

use std::{
    fs::File,
    io::{self, BufWriter},
    path::Path,
};

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Pt};
use thiserror::Error;
use tracing::info;

/// A4 landscape, in points.
const PAGE_WIDTH_PT: f32 = 842.0;
const PAGE_HEIGHT_PT: f32 = 595.0;
const FONT_SIZE: f32 = 12.0;
const LEFT_PT: f32 = 50.0;
const TITLE_Y_PT: f32 = 560.0;
const FIRST_ROW_Y_PT: f32 = 520.0;
const LINE_STEP_PT: f32 = 18.0;
const COLUMN_STEP_PT: f32 = 180.0;
const BOTTOM_PT: f32 = 50.0;
const MAX_CELL_CHARS: usize = 30;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No data to export")]
    Empty,
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error("pdf: {0}")]
    Pdf(String),
}

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Csv,
    Pdf,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Pdf => "pdf",
        }
    }
}

/// Header row, then one record per row, columns in the given order.
pub fn write_csv(path: &Path, headers: &[String], rows: &[Vec<String>]) -> ExportResult<()> {
    if rows.is_empty() {
        return Err(ExportError::Empty);
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "csv exported");
    Ok(())
}

/// Plain landscape listing: title, header line, then rows, paging at the bottom margin.
pub fn write_pdf(
    path: &Path,
    title: &str,
    headers: &[String],
    rows: &[Vec<String>],
) -> ExportResult<()> {
    if rows.is_empty() {
        return Err(ExportError::Empty);
    }
    let (doc, page, layer) = PdfDocument::new(title, mm(PAGE_WIDTH_PT), mm(PAGE_HEIGHT_PT), "text");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|err| ExportError::Pdf(err.to_string()))?;
    let mut layer = doc.get_page(page).get_layer(layer);
    layer.use_text(title, FONT_SIZE, mm(LEFT_PT), mm(TITLE_Y_PT), &font);

    let mut y = FIRST_ROW_Y_PT;
    let mut pages = 1;
    for line in std::iter::once(headers).chain(rows.iter().map(Vec::as_slice)) {
        draw_line(&layer, &font, line, y);
        y -= LINE_STEP_PT;
        if y < BOTTOM_PT {
            let (page, next) = doc.add_page(mm(PAGE_WIDTH_PT), mm(PAGE_HEIGHT_PT), "text");
            layer = doc.get_page(page).get_layer(next);
            y = TITLE_Y_PT;
            pages += 1;
        }
    }

    let mut out = BufWriter::new(File::create(path)?);
    doc.save(&mut out)
        .map_err(|err| ExportError::Pdf(err.to_string()))?;
    info!(path = %path.display(), rows = rows.len(), pages, "pdf exported");
    Ok(())
}

fn draw_line(layer: &PdfLayerReference, font: &IndirectFontRef, cells: &[String], y: f32) {
    let mut x = LEFT_PT;
    for cell in cells {
        layer.use_text(truncate(cell), FONT_SIZE, mm(x), mm(y), font);
        x += COLUMN_STEP_PT;
    }
}

fn truncate(value: &str) -> String {
    value.chars().take(MAX_CELL_CHARS).collect()
}

fn mm(points: f32) -> Mm {
    Mm::from(Pt(points))
}
