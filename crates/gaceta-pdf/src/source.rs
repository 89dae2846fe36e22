//! PDFium-backed page source.

use std::path::Path;

use image::RgbImage;
use pdfium_render::prelude::*;

use crate::error::PdfError;

/// One character of a page's embedded text layer.
///
/// `x`/`y` are the character's lower-left position in the page's native
/// coordinate space (bottom-left origin, PDF points).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharSpan {
    /// The character's unicode text.
    pub ch: char,
    /// Horizontal position in PDF points.
    pub x: f64,
    /// Vertical position in PDF points, measured from the page bottom.
    pub y: f64,
}

/// Read-only access to a PDF document's pages.
///
/// This is the seam between the pipeline and the PDF library; the pipeline
/// never touches PDFium types directly. All methods reopen the document
/// from `path`, keeping the source itself stateless across documents.
pub trait PageSource {
    /// Render every page to an RGB image at the given scale factor
    /// (1.0 = 72 DPI).
    fn render_pages(&self, path: &Path, scale: f32) -> Result<Vec<RgbImage>, PdfError>;

    /// Media-box `(width, height)` in PDF points for every page.
    fn page_sizes(&self, path: &Path) -> Result<Vec<(f64, f64)>, PdfError>;

    /// The character-level text layer of one page, in stream order.
    fn char_spans(&self, path: &Path, page_index: u32) -> Result<Vec<CharSpan>, PdfError>;
}

/// Creates a [`PageSource`] per pool worker.
///
/// PDFium is not thread-safe; every worker binds its own instance rather
/// than sharing one handle across threads.
pub trait PageSourceFactory: Sync {
    /// Bind a fresh page source for the calling worker.
    fn create(&self) -> Result<Box<dyn PageSource>, PdfError>;
}

/// Production [`PageSource`] backed by a PDFium binding.
pub struct PdfiumSource {
    pdfium: Pdfium,
}

impl PdfiumSource {
    /// Bind PDFium, preferring a library next to the executable and
    /// falling back to the system library path.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::LibraryBind`] when no PDFium library can be
    /// loaded; this aborts the run before any folder work starts.
    pub fn bind() -> Result<Self, PdfError> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| PdfError::LibraryBind {
                reason: format!("{e:?}"),
            })?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    fn open(&self, path: &Path) -> Result<PdfDocument<'_>, PdfError> {
        self.pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| PdfError::DocumentOpen {
                path: path.to_path_buf(),
                reason: format!("{e:?}"),
            })
    }
}

impl PageSource for PdfiumSource {
    fn render_pages(&self, path: &Path, scale: f32) -> Result<Vec<RgbImage>, PdfError> {
        let document = self.open(path)?;
        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let mut images = Vec::with_capacity(document.pages().len() as usize);
        for (index, page) in document.pages().iter().enumerate() {
            let bitmap = page
                .render_with_config(&config)
                .map_err(|e| PdfError::Page {
                    path: path.to_path_buf(),
                    page_index: index as u32,
                    reason: format!("render failed: {e:?}"),
                })?;
            images.push(bitmap.as_image().into_rgb8());
        }
        log::debug!("rendered {} pages from {}", images.len(), path.display());
        Ok(images)
    }

    fn page_sizes(&self, path: &Path) -> Result<Vec<(f64, f64)>, PdfError> {
        let document = self.open(path)?;
        Ok(document
            .pages()
            .iter()
            .map(|page| (f64::from(page.width().value), f64::from(page.height().value)))
            .collect())
    }

    fn char_spans(&self, path: &Path, page_index: u32) -> Result<Vec<CharSpan>, PdfError> {
        let document = self.open(path)?;
        let page = document
            .pages()
            .get(page_index as u16)
            .map_err(|e| PdfError::Page {
                path: path.to_path_buf(),
                page_index,
                reason: format!("page not found: {e:?}"),
            })?;
        let text = page.text().map_err(|e| PdfError::Page {
            path: path.to_path_buf(),
            page_index,
            reason: format!("text layer unavailable: {e:?}"),
        })?;

        let mut spans = Vec::new();
        for ch in text.chars().iter() {
            let Some(unicode) = ch.unicode_char() else {
                continue;
            };
            // Characters without geometry (rare in malformed PDFs) are
            // skipped rather than failing the whole page.
            let Ok(bounds) = ch.loose_bounds() else {
                continue;
            };
            spans.push(CharSpan {
                ch: unicode,
                x: f64::from(bounds.left.value),
                y: f64::from(bounds.bottom.value),
            });
        }
        Ok(spans)
    }
}

/// Factory binding a fresh PDFium instance per worker.
pub struct PdfiumSourceFactory;

impl PageSourceFactory for PdfiumSourceFactory {
    fn create(&self) -> Result<Box<dyn PageSource>, PdfError> {
        Ok(Box::new(PdfiumSource::bind()?))
    }
}
