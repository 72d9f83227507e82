//! Upload format detection.

use image::ImageFormat;

/// Kind of a document uploaded for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image(ImageFormat),
    Unknown,
}

impl DocumentKind {
    /// Detects the kind from the leading bytes of the upload.
    pub fn detect(bytes: &[u8]) -> Self {
        if is_pdf_bytes(bytes) {
            return DocumentKind::Pdf;
        }
        match image::guess_format(bytes) {
            Ok(format) => DocumentKind::Image(format),
            Err(_) => DocumentKind::Unknown,
        }
    }

    /// Whether the analysis service accepts this kind of document.
    pub fn is_supported(&self) -> bool {
        matches!(
            self,
            DocumentKind::Pdf
                | DocumentKind::Image(ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Tiff)
        )
    }

    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Image(ImageFormat::Png) => "png",
            DocumentKind::Image(ImageFormat::Jpeg) => "jpeg",
            DocumentKind::Image(ImageFormat::Tiff) => "tiff",
            DocumentKind::Image(_) => "image",
            DocumentKind::Unknown => "unknown",
        }
    }
}

/// Check if bytes represent a PDF file (magic bytes: %PDF)
pub fn is_pdf_bytes(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF")
}
