use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::{BuiltinFont, Mm, PdfDocument, Pt};
use thiserror::Error;
use tracing::info;

pub const TITLE: &str = "MathSolver AI - Chat History";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No chat history to export!")]
    EmptyTranscript,
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to build PDF: {0}")]
    Pdf(#[from] printpdf::Error),
}

/// US Letter page geometry, in PDF points. Body lines advance by
/// `line_height` and break to a new page below the bottom margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_bottom: f32,
    pub title_y: f32,
    /// Baseline of the first body line on page one (below the title).
    pub first_page_top: f32,
    /// Baseline of the first body line on continuation pages.
    pub page_top: f32,
    pub line_height: f32,
    pub font_size: f32,
    pub title_size: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        let height = 792.0;
        Self {
            width: 612.0,
            height,
            margin_left: 50.0,
            margin_bottom: 50.0,
            title_y: height - 30.0,
            first_page_top: height - 70.0,
            page_top: height - 50.0,
            line_height: 15.0,
            font_size: 12.0,
            title_size: 16.0,
        }
    }
}

/// A body line placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine<'a> {
    pub text: &'a str,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportSummary {
    pub pages: usize,
    pub lines: usize,
}

/// Split `text` into pages of positioned lines. Every input line appears
/// exactly once, in order.
pub fn paginate<'a>(text: &'a str, layout: &PageLayout) -> Vec<Vec<PlacedLine<'a>>> {
    let mut pages = vec![Vec::new()];
    let mut y = layout.first_page_top;

    for line in text.split('\n') {
        if y < layout.margin_bottom {
            pages.push(Vec::new());
            y = layout.page_top;
        }
        if let Some(page) = pages.last_mut() {
            page.push(PlacedLine { text: line, y });
        }
        y -= layout.line_height;
    }

    pages
}

/// Write `text` to a PDF at `path`. Blank text is refused and no file is
/// created.
pub fn export_pdf(text: &str, path: &Path) -> Result<ExportSummary, ExportError> {
    if text.trim().is_empty() {
        return Err(ExportError::EmptyTranscript);
    }

    let layout = PageLayout::default();
    let pages = paginate(text, &layout);
    let page_width = Mm::from(Pt(layout.width));
    let page_height = Mm::from(Pt(layout.height));

    let (doc, first_page, first_layer) = PdfDocument::new(TITLE, page_width, page_height, "Layer 1");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let x = Mm::from(Pt(layout.margin_left));
    let mut lines = 0;
    for (i, page) in pages.iter().enumerate() {
        let layer = if i == 0 {
            let layer = doc.get_page(first_page).get_layer(first_layer);
            layer.use_text(TITLE, layout.title_size, x, Mm::from(Pt(layout.title_y)), &bold);
            layer
        } else {
            let (page_idx, layer_idx) = doc.add_page(page_width, page_height, "Layer 1");
            doc.get_page(page_idx).get_layer(layer_idx)
        };

        for placed in page {
            lines += 1;
            let text = latin1(placed.text);
            if text.is_empty() {
                continue;
            }
            layer.use_text(text, layout.font_size, x, Mm::from(Pt(placed.y)), &font);
        }
    }

    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    doc.save(&mut BufWriter::new(file))?;

    let summary = ExportSummary {
        pages: pages.len(),
        lines,
    };
    info!(path = %path.display(), pages = summary.pages, lines = summary.lines, "exported transcript");
    Ok(summary)
}

// The built-in fonts only cover Latin-1; emoji and other symbols are dropped.
fn latin1(text: &str) -> String {
    text.chars()
        .filter(|c| (*c as u32) < 0x100 && !c.is_control())
        .collect::<String>()
        .trim_end()
        .to_string()
}
