//! WASM bindings for pdfsign
//!
//! This crate provides a JavaScript-friendly API for:
//! - Loading a PDF and rendering its first page through a JS callback
//! - Capturing a typed or hand-drawn signature
//! - Dragging the placement box over the page
//! - Embedding the signature and downloading the signed PDF
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { SignaturePad } from 'pdfsign-wasm';
//!
//! await init();
//!
//! // Reads ?doc=...&email_dest=... from the page URL
//! const pad = SignaturePad.fromLocation();
//!
//! // Paint page 1 with pdf.js at the computed scale; a returned promise is awaited
//! pad.setRenderCallback((page, viewport) => renderWithPdfJs(page, viewport.scale));
//!
//! const viewport = await pad.loadPdf(bytes, file.type, container.clientWidth - 40);
//! pad.setTypedText("Jane Doe");
//! pad.setTermsAccepted(true);
//! pad.finishSignature();
//! ```

mod logger;

use signing::{
    ContainerRect, DownloadSink, HeadlessRenderer, InputEvent, InputPhase, InputSource,
    LopdfMutator, PageRenderer, PageSize, SelectedFile, SessionConfig, SignatureMode,
    SignedDocument, SigningError, SigningSession, Viewport,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use wasm_bindgen_futures::{future_to_promise, JsFuture};

/// Shown after the signed PDF was handed to the browser
const SUCCESS_MESSAGE: &str = "Documento assinado com sucesso!";

type Session = SigningSession<JsRenderer, LopdfMutator>;

// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logger::init(log::LevelFilter::Info);
}

fn js_error_message(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn to_js_error(err: SigningError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Alert text for an error; the technical detail goes to the console
fn alert_message(err: &SigningError) -> &'static str {
    match err {
        SigningError::NotPdf(_) => "Selecione um arquivo PDF.",
        SigningError::TermsNotAccepted => "Aceite os termos.",
        SigningError::NoDocument => "Carregue um documento PDF primeiro.",
        SigningError::Busy => "Aguarde a operação em andamento.",
        SigningError::InvalidSurface(..) => "A área de desenho ainda não está visível.",
        SigningError::InvalidScale(_) | SigningError::Load(_) | SigningError::Render(_) => {
            "Não foi possível abrir o PDF."
        }
        SigningError::Export(_) | SigningError::Pdf(_) => "Não foi possível assinar o documento.",
    }
}

fn report(err: &SigningError) {
    log::warn!("{err}");
    alert(alert_message(err));
}

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window available"))
}

fn alert(message: &str) {
    match window().and_then(|w| w.alert_with_message(message)) {
        Ok(()) => {}
        Err(err) => log::warn!("alert failed ({}): {message}", js_error_message(&err)),
    }
}

/// Page renderer that forwards the viewport to a JS painting callback
///
/// Page sizes come from parsing the PDF in Rust; the callback does the
/// actual rasterizing (e.g. with pdf.js). A promise it returns is kept in
/// `pending` for the caller to await.
#[derive(Default)]
struct JsRenderer {
    pages: HeadlessRenderer,
    paint: Option<js_sys::Function>,
    pending: Option<js_sys::Promise>,
}

impl PageRenderer for JsRenderer {
    fn load(&mut self, bytes: &[u8]) -> signing::Result<()> {
        self.pages.load(bytes)
    }

    fn page_size(&self, page: usize) -> signing::Result<PageSize> {
        self.pages.page_size(page)
    }

    fn render(&mut self, page: usize, viewport: &Viewport) -> signing::Result<()> {
        self.pending = None;
        self.pages.render(page, viewport)?;

        let Some(paint) = &self.paint else {
            log::warn!("no render callback set; page {page} not painted");
            return Ok(());
        };
        let viewport = serde_wasm_bindgen::to_value(viewport)
            .map_err(|e| SigningError::Render(e.to_string()))?;
        let returned = paint
            .call2(&JsValue::NULL, &JsValue::from(page as u32), &viewport)
            .map_err(|e| SigningError::Render(js_error_message(&e)))?;
        self.pending = returned.dyn_into::<js_sys::Promise>().ok();
        Ok(())
    }
}

/// Sink that triggers a browser download through a temporary object URL
struct BrowserDownload;

impl BrowserDownload {
    fn download(document: &SignedDocument) -> Result<(), JsValue> {
        let page = window()?
            .document()
            .ok_or_else(|| JsValue::from_str("No document available"))?;

        let parts = js_sys::Array::new();
        parts.push(&js_sys::Uint8Array::from(document.bytes.as_slice()));

        let options = web_sys::BlobPropertyBag::new();
        options.set_type(document.mime());
        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
        let url = web_sys::Url::create_object_url_with_blob(&blob)?;

        let link = page
            .create_element("a")?
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|_| JsValue::from_str("Failed to create download link"))?;
        link.set_href(&url);
        link.set_download(&document.filename);
        link.click();

        web_sys::Url::revoke_object_url(&url)?;
        Ok(())
    }
}

impl DownloadSink for BrowserDownload {
    fn deliver(&mut self, document: &SignedDocument) -> signing::Result<()> {
        Self::download(document).map_err(|e| SigningError::Export(js_error_message(&e)))
    }
}

fn parse_source(source: &str) -> Result<InputSource, JsValue> {
    match source {
        "pointer" | "mouse" | "pen" => Ok(InputSource::Pointer),
        "touch" => Ok(InputSource::Touch),
        other => Err(JsValue::from_str(&format!("Unknown input source: {other}"))),
    }
}

fn parse_phase(phase: &str) -> Result<InputPhase, JsValue> {
    match phase {
        "down" | "start" => Ok(InputPhase::Down),
        "move" => Ok(InputPhase::Move),
        "up" | "end" => Ok(InputPhase::Up),
        "leave" => Ok(InputPhase::Leave),
        "cancel" => Ok(InputPhase::Cancel),
        other => Err(JsValue::from_str(&format!("Unknown input phase: {other}"))),
    }
}

/// Signature placement widget state
#[wasm_bindgen]
pub struct SignaturePad {
    /// Shared with a pending `loadPdf`; never borrowed across an await
    session: Rc<RefCell<Session>>,
}

impl SignaturePad {
    fn with_config(config: SessionConfig) -> SignaturePad {
        SignaturePad {
            session: Rc::new(RefCell::new(SigningSession::new(
                config,
                JsRenderer::default(),
                LopdfMutator::default(),
                BrowserDownload,
            ))),
        }
    }

    /// Load and wait for the paint callback; the session stays busy meanwhile
    async fn load(
        session: &RefCell<Session>,
        file: SelectedFile,
        container_width: f64,
    ) -> signing::Result<Viewport> {
        let (viewport, pending) = {
            let mut session = session.borrow_mut();
            let viewport = session.start_load(file, container_width)?;
            (viewport, session.renderer_mut().pending.take())
        };

        let painted = match pending {
            Some(promise) => JsFuture::from(promise)
                .await
                .map(|_| ())
                .map_err(|e| SigningError::Render(js_error_message(&e))),
            None => Ok(()),
        };

        session.borrow_mut().finish_load(painted)?;
        Ok(viewport)
    }
}

#[wasm_bindgen]
impl SignaturePad {
    /// Create a pad from a config object
    ///
    /// @param config - Optional `{ documentId, notifyEmail, textFont, ... }`
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<SignaturePad, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            SessionConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(Self::with_config(config))
    }

    /// Create a pad configured from the page URL (`doc`, `email_dest`)
    #[wasm_bindgen(js_name = fromLocation)]
    pub fn from_location() -> Result<SignaturePad, JsValue> {
        let search = window()?.location().search()?;
        let params = web_sys::UrlSearchParams::new_with_str(&search)?;
        let pairs = ["doc", "email_dest"]
            .into_iter()
            .filter_map(|key| params.get(key).map(|value| (key, value)));
        Ok(Self::with_config(SessionConfig::from_query_pairs(pairs)))
    }

    /// Set the page painter
    ///
    /// The callback must not call back into the pad synchronously.
    ///
    /// @param callback - `(page, { width, height, scale }) => void | Promise`
    #[wasm_bindgen(js_name = setRenderCallback)]
    pub fn set_render_callback(&mut self, callback: js_sys::Function) {
        self.session.borrow_mut().renderer_mut().paint = Some(callback);
    }

    /// Load a PDF and render page 1 to fit the container
    ///
    /// Resolves once the render callback's promise settles. Any failure,
    /// including a rejected render, is alerted and leaves no document loaded.
    ///
    /// @param data - PDF file bytes (Uint8Array)
    /// @param mime - MIME type reported by the file input
    /// @param containerWidth - Display width for the page in pixels
    /// @returns Promise of the viewport `{ width, height, scale }`
    #[wasm_bindgen(js_name = loadPdf)]
    pub fn load_pdf(&self, data: Vec<u8>, mime: String, container_width: f64) -> js_sys::Promise {
        let session = Rc::clone(&self.session);
        let file = SelectedFile::new("document.pdf", mime, data);
        future_to_promise(async move {
            match Self::load(&session, file, container_width).await {
                Ok(viewport) => Ok(serde_wasm_bindgen::to_value(&viewport)?),
                Err(err) => {
                    report(&err);
                    Err(to_js_error(err))
                }
            }
        })
    }

    /// @param mode - "type" or "draw"
    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode: SignatureMode = mode.parse().map_err(|e: String| JsValue::from_str(&e))?;
        self.session.borrow_mut().set_mode(mode);
        Ok(())
    }

    pub fn mode(&self) -> String {
        match self.session.borrow().mode() {
            SignatureMode::Type => "type".to_string(),
            SignatureMode::Draw => "draw".to_string(),
        }
    }

    #[wasm_bindgen(js_name = setTypedText)]
    pub fn set_typed_text(&mut self, text: &str) {
        self.session.borrow_mut().set_typed_text(text);
    }

    /// Text to show inside the placement box
    #[wasm_bindgen(js_name = placementLabel)]
    pub fn placement_label(&self) -> String {
        self.session.borrow().placement_label().to_string()
    }

    /// Size the drawing surface to the canvas; strokes are discarded
    ///
    /// @returns false when the canvas is not visible yet (zero size)
    #[wasm_bindgen(js_name = resizeDrawing)]
    pub fn resize_drawing(&mut self, width: u32, height: u32) -> bool {
        let resized = self.session.borrow_mut().resize_drawing(width, height);
        match resized {
            Ok(()) => true,
            Err(err) => {
                log::debug!("drawing surface not resized: {err}");
                false
            }
        }
    }

    #[wasm_bindgen(js_name = clearDrawing)]
    pub fn clear_drawing(&mut self) {
        self.session.borrow_mut().clear_drawing();
    }

    /// Forward a mouse or touch event on the drawing canvas
    ///
    /// @param source - "pointer" or "touch"
    /// @param phase - "down", "move", "up", "leave" or "cancel"
    /// @returns true when the caller should call `preventDefault()`
    #[wasm_bindgen(js_name = drawingInput)]
    pub fn drawing_input(
        &mut self,
        source: &str,
        phase: &str,
        client_x: f64,
        client_y: f64,
        origin_x: f64,
        origin_y: f64,
    ) -> Result<bool, JsValue> {
        let event = InputEvent {
            source: parse_source(source)?,
            phase: parse_phase(phase)?,
            client_x,
            client_y,
            origin_x,
            origin_y,
        };
        Ok(self.session.borrow_mut().handle_drawing_input(event).prevent_default)
    }

    /// Copy the drawing surface onto a canvas
    #[wasm_bindgen(js_name = paintDrawing)]
    pub fn paint_drawing(&self, ctx: &web_sys::CanvasRenderingContext2d) -> Result<(), JsValue> {
        let session = self.session.borrow();
        let Some(capture) = session.drawing() else {
            return Ok(());
        };
        let (width, height) = capture.size();
        let pixels = capture.rgba_pixels();
        let image = web_sys::ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(pixels.as_slice()),
            width,
            height,
        )?;
        ctx.put_image_data(&image, 0.0, 0.0)
    }

    /// Report the rendered size of the placement box
    #[wasm_bindgen(js_name = setPlacementSize)]
    pub fn set_placement_size(&mut self, width: f64, height: f64) {
        self.session.borrow_mut().set_placement_size(width, height);
    }

    #[wasm_bindgen(js_name = beginDrag)]
    pub fn begin_drag(&mut self) {
        self.session.borrow_mut().begin_drag();
    }

    /// Move the placement box under the pointer
    ///
    /// The container rectangle is the page wrapper's `getBoundingClientRect()`.
    /// @returns true when the box moved
    #[wasm_bindgen(js_name = dragTo)]
    pub fn drag_to(
        &mut self,
        client_x: f64,
        client_y: f64,
        container_left: f64,
        container_top: f64,
        container_width: f64,
        container_height: f64,
    ) -> bool {
        let container = ContainerRect {
            left: container_left,
            top: container_top,
            width: container_width,
            height: container_height,
        };
        self.session.borrow_mut().drag_to(client_x, client_y, container)
    }

    #[wasm_bindgen(js_name = endDrag)]
    pub fn end_drag(&mut self) {
        self.session.borrow_mut().end_drag();
    }

    #[wasm_bindgen(js_name = isDragging)]
    pub fn is_dragging(&self) -> bool {
        self.session.borrow().is_dragging()
    }

    /// Current box `{ left, top, width, height }` in container pixels
    pub fn placement(&self) -> Result<JsValue, JsValue> {
        let placement = self.session.borrow().placement();
        Ok(serde_wasm_bindgen::to_value(&placement)?)
    }

    #[wasm_bindgen(js_name = setTermsAccepted)]
    pub fn set_terms_accepted(&mut self, accepted: bool) {
        self.session.borrow_mut().set_terms_accepted(accepted);
    }

    /// Display scale of the loaded page, if any
    pub fn scale(&self) -> Option<f64> {
        self.session.borrow().scale().map(|scale| scale.get())
    }

    /// Sign, download and report the outcome with an alert
    ///
    /// @returns true when the signed PDF was downloaded
    #[wasm_bindgen(js_name = finishSignature)]
    pub fn finish_signature(&mut self) -> bool {
        let result = self.session.borrow_mut().finish_signature();
        match result {
            Ok(_) => {
                alert(SUCCESS_MESSAGE);
                true
            }
            Err(err) => {
                report(&err);
                false
            }
        }
    }

    pub fn reset(&mut self) {
        self.session.borrow_mut().reset();
    }
}
