//! # gaceta-pdf - PDF rendering and character-level text access
//!
//! Thin adapter over `PDFium` (via `pdfium-render`) exposing exactly what
//! the pipeline consumes:
//!
//! - [`PageSource::render_pages`]: every page rendered to an RGB image;
//! - [`PageSource::page_sizes`]: native media-box dimensions per page;
//! - [`PageSource::char_spans`]: the embedded character layer of one page,
//!   with positions in the page's native bottom-left coordinate space.
//!
//! The [`PageSource`] trait is the seam the rest of the pipeline depends
//! on; [`PdfiumSource`] is the production implementation. `PDFium` is not
//! thread-safe, so each pool worker binds its own instance through
//! [`PdfiumSourceFactory`] instead of sharing one across threads.
//!
//! [`positional`] holds the pure position-filtered extraction over a
//! parsed character stream.

pub mod error;
pub mod positional;
pub mod source;

pub use error::PdfError;
pub use positional::extract_in_rect;
pub use source::{CharSpan, PageSource, PageSourceFactory, PdfiumSource, PdfiumSourceFactory};
