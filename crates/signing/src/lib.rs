//! Signing - place a signature on the first page of a PDF
//!
//! This crate provides:
//! - Viewport mapping between preview pixels and PDF points
//! - Freehand stroke capture onto a raster surface
//! - A drag controller for the signature placement box
//! - The signing session that embeds the signature and exports the PDF
//!
//! # Example
//!
//! ```ignore
//! use signing::{HeadlessRenderer, LopdfMutator, MemorySink, SelectedFile, SessionConfig, SigningSession};
//!
//! let mut session = SigningSession::new(
//!     SessionConfig::default(),
//!     HeadlessRenderer::default(),
//!     LopdfMutator::default(),
//!     MemorySink::default(),
//! );
//! session.load_document(SelectedFile::pdf("contract.pdf", bytes), 760.0)?;
//! session.set_typed_text("Jane Doe");
//! session.set_terms_accepted(true);
//! let signed = session.finish_signature()?;
//! ```

pub mod collaborator;
mod config;
mod content;
pub mod placement;
mod session;
pub mod stroke;
pub mod viewport;

pub use collaborator::{
    DownloadSink, HeadlessRenderer, LogNotifier, LopdfMutator, MemorySink, Notifier,
    PageRenderer, PdfMutator, PdfRect, SignedNotice, TextRun,
};
pub use config::{SessionConfig, TextFont, TextOffset};
pub use content::{SignatureContent, SignatureMode};
pub use placement::{ContainerRect, DragController, DragState, PlacementBox};
pub use session::{DocumentHandle, Phase, SelectedFile, SignedDocument, SigningSession};
pub use stroke::{InputEvent, InputPhase, InputResponse, InputSource, StrokeCapture, SurfacePoint};
pub use viewport::{compute_scale, to_pdf_coords, to_screen_coords, Scale, Viewport};

pub use pdf_core::{PageSize, StandardFont};

use thiserror::Error;

/// MIME type accepted for uploads and used for the signed output
pub const PDF_MIME: &str = "application/pdf";

/// Errors that can occur while signing a document
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("Please select a PDF file (got {0:?})")]
    NotPdf(String),

    #[error("Accept the terms before signing")]
    TermsNotAccepted,

    #[error("No document loaded")]
    NoDocument,

    #[error("Another operation is still in progress")]
    Busy,

    #[error("Invalid display scale: {0}")]
    InvalidScale(f64),

    #[error("Invalid drawing surface size: {0}x{1}")]
    InvalidSurface(u32, u32),

    #[error("Failed to load PDF: {0}")]
    Load(String),

    #[error("Failed to render page: {0}")]
    Render(String),

    #[error("Failed to export signed PDF: {0}")]
    Export(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] pdf_core::PdfError),
}

/// How an error should be recovered from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; the session is unchanged and the user can correct it
    InvalidInput,
    /// The document could not be read or shown; reset the session
    Load,
    /// Signing failed; the session is kept and the user can retry
    Export,
    /// A load or finalize is already running
    Busy,
}

impl SigningError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SigningError::NotPdf(_)
            | SigningError::TermsNotAccepted
            | SigningError::NoDocument
            | SigningError::InvalidSurface(..) => ErrorKind::InvalidInput,
            SigningError::Busy => ErrorKind::Busy,
            SigningError::InvalidScale(_) | SigningError::Load(_) | SigningError::Render(_) => {
                ErrorKind::Load
            }
            SigningError::Export(_) | SigningError::Pdf(_) => ErrorKind::Export,
        }
    }
}

/// Result type for signing operations
pub type Result<T> = std::result::Result<T, SigningError>;
