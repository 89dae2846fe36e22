//! # gaceta-ocr - OCR text recovery
//!
//! Alternate text source for regions: where positional extraction reads
//! the PDF's embedded character layer, OCR reads the rendered crop image
//! instead. The two are mutually exclusive per region.
//!
//! The pipeline consumes OCR through the narrow [`OcrEngine`] trait;
//! [`TesseractOcr`] is the production adapter over Tesseract (leptess).

use image::GrayImage;
use leptess::LepTess;
use thiserror::Error;

/// OCR-specific errors.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Tesseract failed to initialize with the configured language.
    ///
    /// Fatal configuration error: language data is missing or the engine
    /// is not installed.
    #[error("failed to initialize Tesseract with language '{lang}': {reason}")]
    Init {
        /// Requested language code
        lang: String,
        /// Underlying initialization failure
        reason: String,
    },

    /// Recognition failed on one crop.
    ///
    /// Isolated to the owning region; the region keeps `text = None`.
    #[error("OCR recognition failed: {0}")]
    Recognition(String),
}

/// Narrow interface over the OCR engine.
pub trait OcrEngine: Send {
    /// Recognize the text of one region crop.
    fn image_to_text(&mut self, crop: &GrayImage) -> Result<String, OcrError>;
}

/// Creates an OCR engine per pool worker.
pub trait OcrFactory: Sync {
    /// Initialize a fresh engine for the calling worker.
    fn create(&self) -> Result<Box<dyn OcrEngine>, OcrError>;
}

/// Tesseract-backed [`OcrEngine`].
pub struct TesseractOcr {
    engine: LepTess,
    lang: String,
}

impl TesseractOcr {
    /// Initialize Tesseract for the given language (e.g. `"spa"`).
    ///
    /// # Errors
    ///
    /// Returns [`OcrError::Init`] when the language data cannot be loaded.
    pub fn new(lang: &str) -> Result<Self, OcrError> {
        let engine = LepTess::new(None, lang).map_err(|e| OcrError::Init {
            lang: lang.to_string(),
            reason: format!(
                "{e}. Make sure the '{lang}' traineddata is installed for Tesseract"
            ),
        })?;
        Ok(Self {
            engine,
            lang: lang.to_string(),
        })
    }
}

impl OcrEngine for TesseractOcr {
    fn image_to_text(&mut self, crop: &GrayImage) -> Result<String, OcrError> {
        let (width, height) = crop.dimensions();
        if width == 0 || height == 0 {
            return Ok(String::new());
        }

        // leptess expects encoded image data; hand it an in-memory PNG.
        let mut png = std::io::Cursor::new(Vec::new());
        crop.write_to(&mut png, image::ImageFormat::Png)
            .map_err(|e| OcrError::Recognition(format!("failed to encode crop: {e}")))?;
        self.engine
            .set_image_from_mem(png.get_ref())
            .map_err(|e| OcrError::Recognition(format!("failed to set crop image: {e}")))?;

        let text = self
            .engine
            .get_utf8_text()
            .map_err(|e| OcrError::Recognition(format!("recognition failed ({}): {e}", self.lang)))?;
        Ok(text.trim().to_string())
    }
}

/// Factory initializing a fresh Tesseract engine per worker.
pub struct TesseractFactory {
    lang: String,
}

impl TesseractFactory {
    /// Factory for the given language, validating eagerly that Tesseract
    /// can initialize with it so a missing language aborts the run before
    /// any folder work starts.
    ///
    /// # Errors
    ///
    /// Returns [`OcrError::Init`] when the language data cannot be loaded.
    pub fn new(lang: &str) -> Result<Self, OcrError> {
        drop(TesseractOcr::new(lang)?);
        Ok(Self {
            lang: lang.to_string(),
        })
    }
}

impl OcrFactory for TesseractFactory {
    fn create(&self) -> Result<Box<dyn OcrEngine>, OcrError> {
        Ok(Box::new(TesseractOcr::new(&self.lang)?))
    }
}
