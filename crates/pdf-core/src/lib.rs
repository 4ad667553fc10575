//! PDF Core - Low-level PDF manipulation
//!
//! This crate provides functionality for:
//! - Opening and saving PDF documents
//! - Reading page sizes (with inherited MediaBox support)
//! - Drawing text runs with the 14 standard PDF fonts
//! - Embedding PNG images, including alpha as a soft mask
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Color, PdfDocument, StandardFont, TextStyle};
//!
//! let mut doc = PdfDocument::open_from_bytes(&bytes)?;
//! let font = doc.embed_standard_font(StandardFont::TimesItalic)?;
//! let style = TextStyle::new(font, 21.0, Color::black());
//! doc.draw_text(1, "Jane Doe", 105.3, 543.8, &style)?;
//! let signed = doc.to_bytes()?;
//! ```

mod document;
mod font;
mod image;
mod text;

pub use document::{Color, FontHandle, ImageHandle, PageSize, PdfDocument, TextStyle};
pub use font::{encode_win_ansi, StandardFont};
pub use image::{detect_png, generate_image_operators, ImageXObject};
pub use text::{generate_text_operators, to_hex_string, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("Font {font} cannot encode character {ch:?}")]
    EncodingError { font: &'static str, ch: char },

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;
