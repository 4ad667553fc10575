//! Seams between the signing session and the outside world
//!
//! The session never touches a PDF library, a canvas or a download API
//! directly. Hosts plug in a [`PageRenderer`] for the preview, a
//! [`PdfMutator`] for embedding, a [`DownloadSink`] for the result and a
//! [`Notifier`] for the post-signing hook.

use crate::session::SignedDocument;
use crate::viewport::Viewport;
use crate::{Result, SigningError};
use log::{debug, info};
use pdf_core::{Color, FontHandle, ImageHandle, PageSize, PdfDocument, StandardFont, TextStyle};
use std::cell::RefCell;
use std::rc::Rc;

/// Rasterizes pages for the on-screen preview
pub trait PageRenderer {
    /// Parse the document; replaces any previously loaded one
    fn load(&mut self, bytes: &[u8]) -> Result<()>;

    /// Native size of a page (1-indexed) in points
    fn page_size(&self, page: usize) -> Result<PageSize>;

    /// Paint a page at the viewport's scale
    fn render(&mut self, page: usize, viewport: &Viewport) -> Result<()>;
}

/// A rectangle in PDF user space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One line of text at a baseline position, in points
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: Color,
}

/// Loads a PDF, embeds fonts and images, draws them, and serializes the result
pub trait PdfMutator {
    type Font;
    type Image;

    fn load(&mut self, bytes: &[u8]) -> Result<()>;

    /// Sizes of all pages in points, in page order
    fn page_sizes(&self) -> Result<Vec<PageSize>>;

    fn embed_font(&mut self, font: StandardFont) -> Result<Self::Font>;

    fn embed_png(&mut self, png: &[u8]) -> Result<Self::Image>;

    fn draw_text(&mut self, page: usize, run: &TextRun, font: &Self::Font) -> Result<()>;

    fn draw_image(&mut self, page: usize, image: &Self::Image, rect: PdfRect) -> Result<()>;

    fn save(&mut self) -> Result<Vec<u8>>;
}

/// Receives the signed document (browser download, file write, ...)
pub trait DownloadSink {
    fn deliver(&mut self, document: &SignedDocument) -> Result<()>;
}

/// What a [`Notifier`] learns about a finished signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedNotice {
    pub document_id: String,
    pub filename: String,
    pub notify_email: Option<String>,
    /// Size of the signed PDF in bytes
    pub size: usize,
}

/// Hook called after the signed document was delivered
pub trait Notifier {
    fn document_signed(&mut self, notice: &SignedNotice);
}

/// Notifier that only writes a log line
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn document_signed(&mut self, notice: &SignedNotice) {
        match &notice.notify_email {
            Some(email) => info!(
                "document {} signed ({}); notification due to {}",
                notice.document_id, notice.filename, email
            ),
            None => info!(
                "document {} signed ({}); no notification address",
                notice.document_id, notice.filename
            ),
        }
    }
}

/// Sink that keeps delivered documents in memory
///
/// Clones share the same storage, so a host can keep one clone and hand the
/// other to the session.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    delivered: Rc<RefCell<Vec<SignedDocument>>>,
}

impl MemorySink {
    /// The most recently delivered document
    pub fn last(&self) -> Option<SignedDocument> {
        self.delivered.borrow().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.delivered.borrow().len()
    }
}

impl DownloadSink for MemorySink {
    fn deliver(&mut self, document: &SignedDocument) -> Result<()> {
        self.delivered.borrow_mut().push(document.clone());
        Ok(())
    }
}

/// Renderer without a display: parses page sizes and records what would be painted
#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    pages: Vec<PageSize>,
    last_render: Option<(usize, Viewport)>,
}

impl HeadlessRenderer {
    /// Page number and viewport of the last render call
    pub fn last_render(&self) -> Option<(usize, Viewport)> {
        self.last_render
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

impl PageRenderer for HeadlessRenderer {
    fn load(&mut self, bytes: &[u8]) -> Result<()> {
        let doc = PdfDocument::open_from_bytes(bytes).map_err(|e| SigningError::Load(e.to_string()))?;
        self.pages = doc
            .page_sizes()
            .map_err(|e| SigningError::Load(e.to_string()))?;
        self.last_render = None;
        debug!("renderer loaded {} page(s)", self.pages.len());
        Ok(())
    }

    fn page_size(&self, page: usize) -> Result<PageSize> {
        page.checked_sub(1)
            .and_then(|index| self.pages.get(index))
            .copied()
            .ok_or_else(|| SigningError::Render(format!("page {page} out of range")))
    }

    fn render(&mut self, page: usize, viewport: &Viewport) -> Result<()> {
        self.page_size(page)?;
        debug!(
            "render page {page} at {}x{} (scale {})",
            viewport.canvas_width(),
            viewport.canvas_height(),
            viewport.scale.get()
        );
        self.last_render = Some((page, *viewport));
        Ok(())
    }
}

/// [`PdfMutator`] backed by `pdf-core`
#[derive(Default)]
pub struct LopdfMutator {
    document: Option<PdfDocument>,
}

impl LopdfMutator {
    fn document(&mut self) -> Result<&mut PdfDocument> {
        self.document.as_mut().ok_or(SigningError::NoDocument)
    }
}

impl PdfMutator for LopdfMutator {
    type Font = FontHandle;
    type Image = ImageHandle;

    fn load(&mut self, bytes: &[u8]) -> Result<()> {
        let doc = PdfDocument::open_from_bytes(bytes).map_err(|e| SigningError::Load(e.to_string()))?;
        self.document = Some(doc);
        Ok(())
    }

    fn page_sizes(&self) -> Result<Vec<PageSize>> {
        let doc = self.document.as_ref().ok_or(SigningError::NoDocument)?;
        Ok(doc.page_sizes()?)
    }

    fn embed_font(&mut self, font: StandardFont) -> Result<FontHandle> {
        Ok(self.document()?.embed_standard_font(font)?)
    }

    fn embed_png(&mut self, png: &[u8]) -> Result<ImageHandle> {
        Ok(self.document()?.embed_png(png)?)
    }

    fn draw_text(&mut self, page: usize, run: &TextRun, font: &FontHandle) -> Result<()> {
        let style = TextStyle::new(*font, run.size, run.color);
        self.document()?
            .draw_text(page, &run.text, run.x, run.y, &style)?;
        Ok(())
    }

    fn draw_image(&mut self, page: usize, image: &ImageHandle, rect: PdfRect) -> Result<()> {
        self.document()?
            .draw_image(page, image, rect.x, rect.y, rect.width, rect.height)?;
        Ok(())
    }

    fn save(&mut self) -> Result<Vec<u8>> {
        Ok(self.document()?.to_bytes()?)
    }
}
