//! Text extraction from documents using pdftotext and Tesseract.
//!
//! The pipeline only requires plain text; this module supplies it for
//! the formats legal documents usually arrive in. PDFs are extracted
//! with pdftotext and fall back to OCR when the embedded text layer is
//! sparse (scanned filings). DOCX and email are unpacked with their
//! container parsers; images go straight to Tesseract.

mod docx;
mod email;

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;
use thiserror::Error;

/// Handle command output, extracting stdout on success or returning appropriate error.
fn handle_cmd_output(
    result: std::io::Result<std::process::Output>,
    tool_name: &str,
    error_prefix: &str,
) -> Result<String, ExtractionError> {
    match result {
        Ok(output) => {
            if output.status.success() {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(ExtractionError::ExtractionFailed(format!(
                    "{}: {}",
                    error_prefix, stderr
                )))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ExtractionError::ToolNotFound(tool_name.to_string()))
        }
        Err(e) => Err(ExtractionError::Io(e)),
    }
}

/// Check command status, returning appropriate error on failure.
fn check_cmd_status(
    result: std::io::Result<std::process::ExitStatus>,
    tool_name: &str,
    error_msg: &str,
) -> Result<(), ExtractionError> {
    match result {
        Ok(s) if s.success() => Ok(()),
        Ok(_) => Err(ExtractionError::ExtractionFailed(error_msg.to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ExtractionError::ToolNotFound(tool_name.to_string()))
        }
        Err(e) => Err(ExtractionError::Io(e)),
    }
}

/// Errors that can occur during text extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of text extraction.
#[derive(Debug)]
pub struct ExtractionResult {
    /// Extracted text content.
    pub text: String,
    /// Method used for extraction.
    pub method: ExtractionMethod,
    /// Number of pages processed (for PDFs).
    pub page_count: Option<u32>,
}

/// Method used to extract text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    /// Direct text extraction from PDF.
    PdfToText,
    /// OCR using Tesseract.
    TesseractOcr,
    /// File read directly (plain text, HTML).
    DirectRead,
    /// DOCX container unpacked.
    Docx,
    /// Email body text.
    Email,
}

impl ExtractionMethod {
    pub fn describe(&self) -> &'static str {
        match self {
            ExtractionMethod::PdfToText => "pdftotext",
            ExtractionMethod::TesseractOcr => "tesseract OCR",
            ExtractionMethod::DirectRead => "direct read",
            ExtractionMethod::Docx => "docx container",
            ExtractionMethod::Email => "email body",
        }
    }
}

/// Text extractor that uses external tools.
pub struct TextExtractor {
    /// Minimum characters per page to consider text extraction successful.
    min_chars_per_page: usize,
    /// Tesseract language setting.
    tesseract_lang: String,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self {
            min_chars_per_page: 100,
            tesseract_lang: "eng".to_string(),
        }
    }
}

impl TextExtractor {
    /// Create a new text extractor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set minimum characters per page threshold.
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars_per_page = min_chars;
        self
    }

    /// Set Tesseract language.
    pub fn with_language(mut self, lang: &str) -> Self {
        self.tesseract_lang = lang.to_string();
        self
    }

    /// Extract text from a file, dispatching on its extension and
    /// falling back to content sniffing when the extension is missing
    /// or unknown.
    pub fn extract(&self, file_path: &Path) -> Result<ExtractionResult, ExtractionError> {
        let ext = file_path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => self.extract_pdf(file_path),
            "txt" | "text" | "md" | "html" | "htm" => self.extract_direct(file_path),
            "docx" => Ok(ExtractionResult {
                text: docx::extract_docx(file_path)?,
                method: ExtractionMethod::Docx,
                page_count: None,
            }),
            "eml" => Ok(ExtractionResult {
                text: email::extract_email(file_path)?,
                method: ExtractionMethod::Email,
                page_count: None,
            }),
            "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" | "gif" => {
                self.extract_image(file_path)
            }
            _ => self.extract_sniffed(file_path, &ext),
        }
    }

    /// Dispatch on content-detected MIME type when the extension told
    /// us nothing.
    fn extract_sniffed(
        &self,
        file_path: &Path,
        ext: &str,
    ) -> Result<ExtractionResult, ExtractionError> {
        let kind = infer::get_from_path(file_path)?;
        match kind.map(|k| k.mime_type()) {
            Some("application/pdf") => self.extract_pdf(file_path),
            Some("image/png" | "image/jpeg" | "image/tiff" | "image/gif" | "image/bmp") => {
                self.extract_image(file_path)
            }
            Some("application/zip") => Ok(ExtractionResult {
                text: docx::extract_docx(file_path)?,
                method: ExtractionMethod::Docx,
                page_count: None,
            }),
            Some(other) => Err(ExtractionError::UnsupportedFileType(other.to_string())),
            None => Err(ExtractionError::UnsupportedFileType(if ext.is_empty() {
                "unknown".to_string()
            } else {
                ext.to_string()
            })),
        }
    }

    fn extract_direct(&self, file_path: &Path) -> Result<ExtractionResult, ExtractionError> {
        let text = std::fs::read_to_string(file_path)?;
        Ok(ExtractionResult {
            text,
            method: ExtractionMethod::DirectRead,
            page_count: None,
        })
    }

    /// Extract text from a PDF, preferring the embedded text layer and
    /// switching to OCR when that layer is sparse.
    fn extract_pdf(&self, file_path: &Path) -> Result<ExtractionResult, ExtractionError> {
        let page_count = self.get_pdf_page_count(file_path).unwrap_or(1);
        let pdf_text = self.run_pdftotext(file_path)?;
        let pdf_chars: usize = pdf_text.chars().filter(|c| !c.is_whitespace()).count();

        // A text layer with fewer characters than a sparse page per
        // page is most likely a scan wrapper.
        if pdf_chars >= self.min_chars_per_page * page_count as usize {
            return Ok(ExtractionResult {
                text: pdf_text,
                method: ExtractionMethod::PdfToText,
                page_count: Some(page_count),
            });
        }

        match self.ocr_pdf(file_path) {
            Ok(ocr_text) => {
                let ocr_chars: usize = ocr_text.chars().filter(|c| !c.is_whitespace()).count();

                // Use OCR if it has significantly more content (>20% more chars)
                if ocr_chars > pdf_chars + (pdf_chars / 5) {
                    Ok(ExtractionResult {
                        text: ocr_text,
                        method: ExtractionMethod::TesseractOcr,
                        page_count: Some(page_count),
                    })
                } else {
                    Ok(ExtractionResult {
                        text: pdf_text,
                        method: ExtractionMethod::PdfToText,
                        page_count: Some(page_count),
                    })
                }
            }
            Err(e) => {
                tracing::debug!("OCR failed: {}, using pdftotext result", e);
                Ok(ExtractionResult {
                    text: pdf_text,
                    method: ExtractionMethod::PdfToText,
                    page_count: Some(page_count),
                })
            }
        }
    }

    /// Run pdftotext on a PDF file.
    fn run_pdftotext(&self, file_path: &Path) -> Result<String, ExtractionError> {
        let output = Command::new("pdftotext")
            .args(["-layout", "-enc", "UTF-8"])
            .arg(file_path)
            .arg("-") // Output to stdout
            .output();

        handle_cmd_output(output, "pdftotext (install poppler-utils)", "pdftotext failed")
    }

    /// Get the page count of a PDF.
    pub fn get_pdf_page_count(&self, file_path: &Path) -> Option<u32> {
        let output = Command::new("pdfinfo").arg(file_path).output().ok()?;

        if !output.status.success() {
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            if line.starts_with("Pages:") {
                return line.split_whitespace().nth(1).and_then(|s| s.parse().ok());
            }
        }
        None
    }

    /// OCR a PDF by converting pages to images and running Tesseract.
    fn ocr_pdf(&self, file_path: &Path) -> Result<String, ExtractionError> {
        let temp_dir = TempDir::new()?;
        let temp_path = temp_dir.path();

        // Convert PDF to images using pdftoppm
        let status = Command::new("pdftoppm")
            .args(["-png", "-r", "300"]) // 300 DPI
            .arg(file_path)
            .arg(temp_path.join("page"))
            .status();

        check_cmd_status(
            status,
            "pdftoppm (install poppler-utils)",
            "pdftoppm failed to convert PDF",
        )?;

        // Find all generated images
        let mut images: Vec<_> = std::fs::read_dir(temp_path)?
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "png")
                    .unwrap_or(false)
            })
            .map(|e| e.path())
            .collect();

        images.sort();

        if images.is_empty() {
            return Err(ExtractionError::ExtractionFailed(
                "No images generated from PDF".to_string(),
            ));
        }

        // OCR each image
        let mut all_text = String::new();
        for (i, image_path) in images.iter().enumerate() {
            match self.run_tesseract(image_path) {
                Ok(text) => {
                    if !all_text.is_empty() {
                        all_text.push_str("\n\n");
                    }
                    all_text.push_str(&text);
                }
                Err(e) => {
                    tracing::warn!("OCR failed for page {}: {}", i + 1, e);
                }
            }
        }

        Ok(all_text)
    }

    /// Extract text from an image file using Tesseract.
    fn extract_image(&self, file_path: &Path) -> Result<ExtractionResult, ExtractionError> {
        let text = self.run_tesseract(file_path)?;
        Ok(ExtractionResult {
            text,
            method: ExtractionMethod::TesseractOcr,
            page_count: Some(1),
        })
    }

    /// Run Tesseract OCR on an image.
    fn run_tesseract(&self, image_path: &Path) -> Result<String, ExtractionError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.tesseract_lang])
            .output();

        handle_cmd_output(output, "tesseract (install tesseract-ocr)", "tesseract failed")
    }

    /// Check if required external tools are available.
    pub fn check_tools() -> Vec<(String, bool)> {
        ["pdftotext", "pdftoppm", "pdfinfo", "tesseract"]
            .iter()
            .map(|tool| (tool.to_string(), which::which(tool).is_ok()))
            .collect()
    }
}
