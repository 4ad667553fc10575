//! The signing session
//!
//! One `SigningSession` holds everything a signing flow needs: the loaded
//! document, the display scale, the chosen signature mode, the drawing
//! surface and the placement box. Hosts forward UI events to it and call
//! [`SigningSession::finish_signature`] when the user is done.

use crate::collaborator::{
    DownloadSink, LogNotifier, Notifier, PageRenderer, PdfMutator, PdfRect, SignedNotice, TextRun,
};
use crate::config::SessionConfig;
use crate::content::{SignatureContent, SignatureMode};
use crate::placement::{ContainerRect, DragController, DragState, PlacementBox};
use crate::stroke::{InputEvent, InputResponse, StrokeCapture};
use crate::viewport::{to_pdf_coords, Scale, Viewport};
use crate::{ErrorKind, Result, SigningError, PDF_MIME};
use log::{debug, info, warn};
use pdf_core::{Color, PageSize};

/// Preview text while nothing has been typed
const TYPE_PLACEHOLDER: &str = "Assinatura";
/// Preview text in draw mode
const DRAW_PLACEHOLDER: &str = "(Desenho)";
/// Largest side of the blank raster exported when the drawing surface was never sized
const MAX_BLANK_SIDE: f64 = 2048.0;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No document loaded
    #[default]
    Empty,
    Loading,
    /// A document is loaded and shown
    Ready,
    Finalizing,
}

impl Phase {
    fn is_busy(self) -> bool {
        matches!(self, Phase::Loading | Phase::Finalizing)
    }
}

/// A file picked by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// A file already known to be a PDF
    pub fn pdf(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(name, PDF_MIME, bytes)
    }
}

/// The loaded PDF: original bytes plus the first page's size
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentHandle {
    name: String,
    bytes: Vec<u8>,
    page_size: PageSize,
}

impl DocumentHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of page 1 in points
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }
}

/// The signed PDF, ready for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl SignedDocument {
    pub fn mime(&self) -> &'static str {
        PDF_MIME
    }
}

fn into_load(err: SigningError) -> SigningError {
    match err.kind() {
        ErrorKind::Load => err,
        _ => SigningError::Load(err.to_string()),
    }
}

fn into_export(err: SigningError) -> SigningError {
    match err.kind() {
        ErrorKind::Export => err,
        _ => SigningError::Export(err.to_string()),
    }
}

/// Context object for one signing flow
pub struct SigningSession<R: PageRenderer, M: PdfMutator> {
    config: SessionConfig,
    renderer: R,
    mutator: M,
    sink: Box<dyn DownloadSink>,
    notifier: Box<dyn Notifier>,
    phase: Phase,
    document: Option<DocumentHandle>,
    scale: Option<Scale>,
    mode: SignatureMode,
    typed_text: String,
    terms_accepted: bool,
    /// Created once the host reports the surface size
    drawing: Option<StrokeCapture>,
    drag: DragController,
}

impl<R: PageRenderer, M: PdfMutator> SigningSession<R, M> {
    pub fn new(config: SessionConfig, renderer: R, mutator: M, sink: impl DownloadSink + 'static) -> Self {
        let drag = DragController::new(PlacementBox::new(
            config.placement_width,
            config.placement_height,
        ));
        Self {
            config,
            renderer,
            mutator,
            sink: Box::new(sink),
            notifier: Box::new(LogNotifier),
            phase: Phase::Empty,
            document: None,
            scale: None,
            mode: SignatureMode::default(),
            typed_text: String::new(),
            terms_accepted: false,
            drawing: None,
            drag,
        }
    }

    /// Replace the default [`LogNotifier`]
    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.phase.is_busy() {
            warn!("rejected request while {:?}", self.phase);
            return Err(SigningError::Busy);
        }
        Ok(())
    }

    /// Load a PDF and render its first page to fit `container_width` pixels
    ///
    /// For renderers that paint synchronously. A wrong MIME type leaves the
    /// session untouched. Any other failure discards the previous document
    /// as well.
    pub fn load_document(&mut self, file: SelectedFile, container_width: f64) -> Result<Viewport> {
        let viewport = self.start_load(file, container_width)?;
        self.finish_load(Ok(()))?;
        Ok(viewport)
    }

    /// First half of a load: parse, size and start rendering page 1
    ///
    /// On success the session stays in [`Phase::Loading`], so it stays busy
    /// until [`SigningSession::finish_load`] reports how painting went.
    pub fn start_load(&mut self, file: SelectedFile, container_width: f64) -> Result<Viewport> {
        self.ensure_idle()?;

        if file.mime != PDF_MIME {
            warn!("rejected {} with type {:?}", file.name, file.mime);
            return Err(SigningError::NotPdf(file.mime));
        }

        self.phase = Phase::Loading;
        match self.open_first_page(&file.bytes, container_width) {
            Ok((page_size, viewport)) => {
                debug!(
                    "opened {} ({} bytes), page 1 is {}x{} pt at scale {}",
                    file.name,
                    file.bytes.len(),
                    page_size.width,
                    page_size.height,
                    viewport.scale.get()
                );
                self.document = Some(DocumentHandle {
                    name: file.name,
                    bytes: file.bytes,
                    page_size,
                });
                self.scale = Some(viewport.scale);
                Ok(viewport)
            }
            Err(err) => {
                warn!("failed to load {}: {err}", file.name);
                self.discard_document();
                Err(into_load(err))
            }
        }
    }

    /// Second half of a load: the outcome of painting page 1
    ///
    /// A painting failure discards the document like any other load error.
    /// Ignored when the load was superseded by [`SigningSession::reset`].
    pub fn finish_load(&mut self, painted: Result<()>) -> Result<()> {
        if self.phase != Phase::Loading {
            debug!("load finished after the session moved on to {:?}", self.phase);
            return Ok(());
        }

        match painted {
            Ok(()) => {
                if let Some(document) = &self.document {
                    info!("loaded {} ({} bytes)", document.name, document.bytes.len());
                }
                self.phase = Phase::Ready;
                Ok(())
            }
            Err(err) => {
                warn!("failed to paint page 1: {err}");
                self.discard_document();
                Err(into_load(err))
            }
        }
    }

    fn discard_document(&mut self) {
        self.document = None;
        self.scale = None;
        self.phase = Phase::Empty;
    }

    fn open_first_page(&mut self, bytes: &[u8], container_width: f64) -> Result<(PageSize, Viewport)> {
        self.renderer.load(bytes)?;
        let page = self.renderer.page_size(1)?;
        let scale = Scale::fit(page.width, container_width)?;
        debug!(
            "scale {} for page width {} in {}px",
            scale.get(),
            page.width,
            container_width
        );
        let viewport = Viewport::new(page, scale);
        self.renderer.render(1, &viewport)?;
        Ok((page, viewport))
    }

    /// Embed the signature on page 1 and deliver the signed PDF
    ///
    /// Nothing in the session changes on failure, so the user can fix the
    /// problem and try again.
    pub fn finish_signature(&mut self) -> Result<SignedDocument> {
        self.ensure_idle()?;

        if !self.terms_accepted {
            warn!("finish requested before the terms were accepted");
            return Err(SigningError::TermsNotAccepted);
        }
        let scale = self.scale.ok_or(SigningError::NoDocument)?;
        if self.document.is_none() {
            return Err(SigningError::NoDocument);
        }

        self.phase = Phase::Finalizing;
        let result = self.export(scale);
        self.phase = Phase::Ready;

        match &result {
            Ok(signed) => info!("signed {} ({} bytes)", signed.filename, signed.bytes.len()),
            Err(err) => warn!("signing failed: {err}"),
        }
        result
    }

    fn export(&mut self, scale: Scale) -> Result<SignedDocument> {
        let document = self.document.as_ref().ok_or(SigningError::NoDocument)?;
        self.mutator.load(&document.bytes).map_err(into_load)?;

        let content = self.resolve_content().map_err(into_export)?;

        let page = self
            .mutator
            .page_sizes()
            .map_err(into_load)?
            .first()
            .copied()
            .ok_or_else(|| SigningError::Load("Document has no pages".to_string()))?;

        let placement = self.drag.placement();
        let (x, y) = to_pdf_coords(
            placement.left,
            placement.top,
            placement.width,
            placement.height,
            page.height,
            scale.get(),
        );
        debug!("placement {placement:?} maps to ({x}, {y}) on a {}pt page", page.height);

        self.embed(&content, x, y, placement, scale).map_err(into_export)?;
        let bytes = self.mutator.save().map_err(into_export)?;

        let signed = SignedDocument {
            bytes,
            filename: self.config.filename(),
        };
        self.sink.deliver(&signed).map_err(into_export)?;

        self.notifier.document_signed(&SignedNotice {
            document_id: self.config.document_id.clone(),
            filename: signed.filename.clone(),
            notify_email: self.config.notify_email.clone(),
            size: signed.bytes.len(),
        });

        Ok(signed)
    }

    fn embed(
        &mut self,
        content: &SignatureContent,
        x: f64,
        y: f64,
        placement: PlacementBox,
        scale: Scale,
    ) -> Result<()> {
        match content {
            SignatureContent::Text(text) => {
                let font = self.mutator.embed_font(self.config.text_font.into())?;
                let run = TextRun {
                    text: text.clone(),
                    x: x + self.config.text_offset.dx,
                    y: y + self.config.text_offset.dy,
                    size: scale.to_points(self.config.text_size),
                    color: Color::black(),
                };
                self.mutator.draw_text(1, &run, &font)
            }
            SignatureContent::Drawing(png) => {
                let image = self.mutator.embed_png(png)?;
                let rect = PdfRect {
                    x,
                    y,
                    width: scale.to_points(placement.width),
                    height: scale.to_points(placement.height),
                };
                self.mutator.draw_image(1, &image, rect)
            }
        }
    }

    /// The signature that would be embedded right now
    pub fn resolve_content(&self) -> Result<SignatureContent> {
        match self.mode {
            SignatureMode::Type => {
                let text = if self.typed_text.is_empty() {
                    self.config.fallback_text.clone()
                } else {
                    self.typed_text.clone()
                };
                Ok(SignatureContent::Text(text))
            }
            SignatureMode::Draw => {
                let png = match &self.drawing {
                    Some(capture) => capture.export_png()?,
                    None => {
                        // Never shown: a blank raster shaped like the box
                        let b = self.drag.placement();
                        let side = |v: f64| v.clamp(1.0, MAX_BLANK_SIDE) as u32;
                        StrokeCapture::new(side(b.width), side(b.height))?.export_png()?
                    }
                };
                Ok(SignatureContent::Drawing(png))
            }
        }
    }

    /// Return to the empty state, keeping the configuration
    pub fn reset(&mut self) {
        self.discard_document();
        self.mode = SignatureMode::default();
        self.typed_text.clear();
        self.terms_accepted = false;
        if let Some(capture) = &mut self.drawing {
            capture.stop();
            capture.clear();
        }
        self.drag = DragController::new(PlacementBox::new(
            self.config.placement_width,
            self.config.placement_height,
        ));
        debug!("session reset");
    }

    pub fn set_mode(&mut self, mode: SignatureMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> SignatureMode {
        self.mode
    }

    pub fn set_typed_text(&mut self, text: impl Into<String>) {
        self.typed_text = text.into();
    }

    pub fn typed_text(&self) -> &str {
        &self.typed_text
    }

    /// Text shown inside the placement box
    pub fn placement_label(&self) -> &str {
        match self.mode {
            SignatureMode::Type if self.typed_text.is_empty() => TYPE_PLACEHOLDER,
            SignatureMode::Type => &self.typed_text,
            SignatureMode::Draw => DRAW_PLACEHOLDER,
        }
    }

    pub fn set_terms_accepted(&mut self, accepted: bool) {
        self.terms_accepted = accepted;
    }

    pub fn terms_accepted(&self) -> bool {
        self.terms_accepted
    }

    /// Size the drawing surface to its on-screen size
    ///
    /// Strokes are discarded. A zero size keeps the current surface.
    pub fn resize_drawing(&mut self, width: u32, height: u32) -> Result<()> {
        match &mut self.drawing {
            Some(capture) => capture.resize(width, height),
            None => {
                self.drawing = Some(StrokeCapture::new(width, height)?);
                Ok(())
            }
        }
    }

    pub fn clear_drawing(&mut self) {
        if let Some(capture) = &mut self.drawing {
            capture.clear();
        }
    }

    pub fn handle_drawing_input(&mut self, event: InputEvent) -> InputResponse {
        match &mut self.drawing {
            Some(capture) => capture.handle(event),
            None => InputResponse::default(),
        }
    }

    pub fn drawing(&self) -> Option<&StrokeCapture> {
        self.drawing.as_ref()
    }

    pub fn begin_drag(&mut self) {
        self.drag.begin();
    }

    pub fn drag_to(&mut self, client_x: f64, client_y: f64, container: ContainerRect) -> bool {
        self.drag.drag_to(client_x, client_y, container)
    }

    pub fn end_drag(&mut self) {
        self.drag.end();
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.state() == DragState::Dragging
    }

    pub fn set_placement_size(&mut self, width: f64, height: f64) {
        self.drag.set_size(width, height);
    }

    pub fn placement(&self) -> PlacementBox {
        self.drag.placement()
    }

    pub fn scale(&self) -> Option<Scale> {
        self.scale
    }

    pub fn document(&self) -> Option<&DocumentHandle> {
        self.document.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::{HeadlessRenderer, LopdfMutator, MemorySink};
    use crate::stroke::{InputPhase, InputSource};
    use lopdf::{dictionary, Document, Object, Stream};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn test_pdf(width: i64, height: i64) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, b"0 0 m 10 10 l S".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(width), Object::Integer(height)],
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => 1,
                "Kids" => vec![Object::Reference(page_id)],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    type TestSession = SigningSession<HeadlessRenderer, LopdfMutator>;

    fn session() -> (TestSession, MemorySink) {
        let sink = MemorySink::default();
        let session = SigningSession::new(
            SessionConfig::default(),
            HeadlessRenderer::default(),
            LopdfMutator::default(),
            sink.clone(),
        );
        (session, sink)
    }

    fn loaded() -> (TestSession, MemorySink) {
        let (mut session, sink) = session();
        session
            .load_document(SelectedFile::pdf("a.pdf", test_pdf(800, 792)), 760.0)
            .unwrap();
        (session, sink)
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier(Rc<RefCell<Vec<SignedNotice>>>);

    impl Notifier for RecordingNotifier {
        fn document_signed(&mut self, notice: &SignedNotice) {
            self.0.borrow_mut().push(notice.clone());
        }
    }

    #[test]
    fn test_load_document() {
        let (session, _) = loaded();

        assert_eq!(session.phase(), Phase::Ready);
        assert_eq!(session.scale().unwrap().get(), 0.95);
        let doc = session.document().unwrap();
        assert_eq!(doc.name(), "a.pdf");
        assert_eq!(doc.page_size().height, 792.0);

        let (page, viewport) = session.renderer().last_render().unwrap();
        assert_eq!(page, 1);
        assert_eq!(viewport.canvas_width(), 760);
    }

    #[test]
    fn test_load_rejects_non_pdf_without_state_change() {
        let (mut session, _) = loaded();
        let err = session
            .load_document(SelectedFile::new("a.png", "image/png", vec![1, 2, 3]), 760.0)
            .unwrap_err();

        assert!(matches!(err, SigningError::NotPdf(_)));
        assert_eq!(session.phase(), Phase::Ready);
        assert!(session.document().is_some());
    }

    #[test]
    fn test_failed_load_discards_document() {
        let (mut session, _) = loaded();
        let err = session
            .load_document(SelectedFile::pdf("broken.pdf", b"%PDF-1.4 junk".to_vec()), 760.0)
            .unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::Load);
        assert_eq!(session.phase(), Phase::Empty);
        assert!(session.document().is_none());
        assert!(session.scale().is_none());
    }

    #[test]
    fn test_zero_container_width_is_load_error() {
        let (mut session, _) = session();
        let err = session
            .load_document(SelectedFile::pdf("a.pdf", test_pdf(612, 792)), 0.0)
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Load);
        assert!(session.renderer().last_render().is_none());
    }

    #[test]
    fn test_busy_while_painting() {
        let (mut session, sink) = session();
        session.set_terms_accepted(true);

        let viewport = session
            .start_load(SelectedFile::pdf("a.pdf", test_pdf(800, 792)), 760.0)
            .unwrap();
        assert_eq!(viewport.scale.get(), 0.95);
        assert_eq!(session.phase(), Phase::Loading);

        assert!(matches!(session.finish_signature(), Err(SigningError::Busy)));
        assert!(matches!(
            session.start_load(SelectedFile::pdf("b.pdf", test_pdf(612, 792)), 612.0),
            Err(SigningError::Busy)
        ));
        assert_eq!(session.document().unwrap().name(), "a.pdf");

        session.finish_load(Ok(())).unwrap();
        assert_eq!(session.phase(), Phase::Ready);
        session.finish_signature().unwrap();
        assert_eq!(sink.count(), 1);
    }

    #[test]
    fn test_busy_while_finalizing() {
        let (mut session, sink) = loaded();
        session.set_terms_accepted(true);

        session.phase = Phase::Finalizing;
        assert!(matches!(session.finish_signature(), Err(SigningError::Busy)));
        assert_eq!(sink.count(), 0);
    }

    #[test]
    fn test_paint_failure_discards_document() {
        let (mut session, _) = loaded();
        session
            .start_load(SelectedFile::pdf("b.pdf", test_pdf(612, 792)), 612.0)
            .unwrap();

        let err = session
            .finish_load(Err(SigningError::Render("worker crashed".to_string())))
            .unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::Load);
        assert_eq!(session.phase(), Phase::Empty);
        assert!(session.document().is_none());
        assert!(session.scale().is_none());
    }

    #[test]
    fn test_finish_load_after_reset_is_ignored() {
        let (mut session, _) = session();
        session
            .start_load(SelectedFile::pdf("a.pdf", test_pdf(612, 792)), 612.0)
            .unwrap();
        session.reset();

        session
            .finish_load(Err(SigningError::Render("late".to_string())))
            .unwrap();
        assert_eq!(session.phase(), Phase::Empty);
        assert!(session.document().is_none());
    }

    #[test]
    fn test_terms_required() {
        let (mut session, sink) = loaded();
        let err = session.finish_signature().unwrap_err();

        assert!(matches!(err, SigningError::TermsNotAccepted));
        assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);
        assert_eq!(sink.count(), 0);
        assert_eq!(session.phase(), Phase::Ready);
    }

    #[test]
    fn test_finish_without_document() {
        let (mut session, _) = session();
        session.set_terms_accepted(true);
        assert!(matches!(
            session.finish_signature(),
            Err(SigningError::NoDocument)
        ));
    }

    #[test]
    fn test_finish_typed_signature() {
        let notices = RecordingNotifier::default();
        let (session, sink) = loaded();
        let mut session = session.with_notifier(notices.clone());

        session.set_typed_text("Jo");
        session.set_terms_accepted(true);
        let signed = session.finish_signature().unwrap();

        assert_eq!(signed.filename, "OS_000_Assinada.pdf");
        assert_eq!(signed.mime(), "application/pdf");
        assert_eq!(sink.last().unwrap(), signed);
        assert_eq!(session.phase(), Phase::Ready);

        let notices = notices.0.borrow();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].filename, "OS_000_Assinada.pdf");
        assert_eq!(notices[0].notify_email, None);
    }

    #[test]
    fn test_empty_text_uses_fallback() {
        let (mut session, _) = loaded();
        assert_eq!(
            session.resolve_content().unwrap(),
            SignatureContent::Text("Assinado".to_string())
        );
        session.set_typed_text("Maria");
        assert_eq!(
            session.resolve_content().unwrap(),
            SignatureContent::Text("Maria".to_string())
        );
    }

    #[test]
    fn test_draw_mode_without_surface_exports_blank_box() {
        let (mut session, _) = loaded();
        session.set_mode(SignatureMode::Draw);
        match session.resolve_content().unwrap() {
            SignatureContent::Drawing(png) => assert_eq!(&png[..4], b"\x89PNG"),
            other => panic!("expected drawing, got {other:?}"),
        }
    }

    #[test]
    fn test_placement_label() {
        let (mut session, _) = session();
        assert_eq!(session.placement_label(), "Assinatura");
        session.set_typed_text("Ana");
        assert_eq!(session.placement_label(), "Ana");
        session.set_mode(SignatureMode::Draw);
        assert_eq!(session.placement_label(), "(Desenho)");
    }

    #[test]
    fn test_drawing_passthroughs() {
        let (mut session, _) = session();
        let event = |phase: InputPhase, x: f64| InputEvent {
            source: InputSource::Touch,
            phase,
            client_x: x,
            client_y: 10.0,
            origin_x: 0.0,
            origin_y: 0.0,
        };

        // No surface yet: nothing happens
        assert!(!session.handle_drawing_input(event(InputPhase::Down, 5.0)).prevent_default);

        session.resize_drawing(200, 80).unwrap();
        assert!(session.handle_drawing_input(event(InputPhase::Down, 5.0)).prevent_default);
        session.handle_drawing_input(event(InputPhase::Move, 50.0));
        session.handle_drawing_input(event(InputPhase::Up, 50.0));
        assert!(!session.drawing().unwrap().is_blank());

        assert!(session.resize_drawing(0, 80).is_err());
        assert!(!session.drawing().unwrap().is_blank());

        session.clear_drawing();
        assert!(session.drawing().unwrap().is_blank());
    }

    #[test]
    fn test_drag_passthroughs() {
        let (mut session, _) = loaded();
        let container = ContainerRect {
            left: 20.0,
            top: 100.0,
            width: 760.0,
            height: 752.4,
        };
        session.begin_drag();
        assert!(session.is_dragging());
        assert!(session.drag_to(195.0, 325.0, container));
        session.end_drag();

        let b = session.placement();
        assert_eq!((b.left, b.top, b.width, b.height), (100.0, 200.0, 150.0, 50.0));
    }

    #[test]
    fn test_reset() {
        let (mut session, _) = loaded();
        session.set_typed_text("Ana");
        session.set_mode(SignatureMode::Draw);
        session.set_terms_accepted(true);
        session.set_placement_size(180.0, 60.0);

        session.reset();

        assert_eq!(session.phase(), Phase::Empty);
        assert!(session.document().is_none());
        assert_eq!(session.mode(), SignatureMode::Type);
        assert_eq!(session.typed_text(), "");
        assert!(!session.terms_accepted());
        assert_eq!(session.placement(), PlacementBox::new(150.0, 50.0));
    }

    #[test]
    fn test_oversized_box_caps_blank_raster() {
        let (mut session, _) = loaded();
        session.set_mode(SignatureMode::Draw);
        session.set_placement_size(1e12, 40.0);

        let png = match session.resolve_content().unwrap() {
            SignatureContent::Drawing(png) => png,
            other => panic!("expected drawing, got {other:?}"),
        };
        // IHDR width and height, big-endian
        let width = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
        let height = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
        assert_eq!((width, height), (2048, 40));

        session.set_terms_accepted(true);
        assert!(session.finish_signature().is_ok());
    }
}
