//! Freehand signature capture
//!
//! Pointer and touch input both drive the same three operations: `start`,
//! `extend` and `stop`. Every `extend` strokes one straight segment into the
//! raster surface right away, so the path stays continuous no matter how
//! sparsely the host samples move events.

use crate::{Result, SigningError};
use log::debug;
use tiny_skia::{Color, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Line width in surface pixels
pub const LINE_WIDTH: f32 = 2.0;

/// A point in surface-local pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub x: f32,
    pub y: f32,
}

impl SurfacePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Convert client (viewport) coordinates using the surface's bounding-box origin
    pub fn from_client(client_x: f64, client_y: f64, origin_x: f64, origin_y: f64) -> Self {
        Self {
            x: (client_x - origin_x) as f32,
            y: (client_y - origin_y) as f32,
        }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Where an input event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    /// Mouse or pen pointer events
    Pointer,
    /// Touch events; the first touch point is used
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPhase {
    Down,
    Move,
    Up,
    Leave,
    Cancel,
}

/// A host input event in client coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    pub source: InputSource,
    pub phase: InputPhase,
    pub client_x: f64,
    pub client_y: f64,
    /// Left edge of the surface's bounding box, in client coordinates
    pub origin_x: f64,
    /// Top edge of the surface's bounding box, in client coordinates
    pub origin_y: f64,
}

impl InputEvent {
    fn point(&self) -> SurfacePoint {
        SurfacePoint::from_client(self.client_x, self.client_y, self.origin_x, self.origin_y)
    }
}

/// What the host should do with the event after it was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputResponse {
    /// Suppress the platform's default gesture (scroll, zoom)
    pub prevent_default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum StrokeState {
    Idle,
    Drawing { last: SurfacePoint },
}

/// Raster drawing surface that records a freehand signature
pub struct StrokeCapture {
    pixmap: Pixmap,
    paint: Paint<'static>,
    stroke: Stroke,
    state: StrokeState,
    segments: usize,
}

impl StrokeCapture {
    /// Create a blank surface
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height).ok_or(SigningError::InvalidSurface(width, height))?;

        let mut paint = Paint::default();
        paint.set_color(Color::BLACK);
        paint.anti_alias = true;

        let stroke = Stroke {
            width: LINE_WIDTH,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };

        Ok(Self {
            pixmap,
            paint,
            stroke,
            state: StrokeState::Idle,
            segments: 0,
        })
    }

    /// Re-create the surface at a new size
    ///
    /// Existing strokes are discarded, not scaled. A zero dimension is
    /// rejected and the current surface is kept.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        *self = Self::new(width, height)?;
        debug!("drawing surface resized to {width}x{height}");
        Ok(())
    }

    /// Wipe the surface, keeping size and style
    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
        self.segments = 0;
    }

    /// Begin a stroke at `point`
    pub fn start(&mut self, point: SurfacePoint) {
        if !point.is_finite() {
            return;
        }
        self.state = StrokeState::Drawing { last: point };
    }

    /// Continue the active stroke to `point`; ignored when idle
    pub fn extend(&mut self, point: SurfacePoint) {
        let StrokeState::Drawing { last } = self.state else {
            return;
        };
        if !point.is_finite() {
            return;
        }

        let mut pb = PathBuilder::new();
        pb.move_to(last.x, last.y);
        pb.line_to(point.x, point.y);
        if let Some(path) = pb.finish() {
            self.pixmap
                .stroke_path(&path, &self.paint, &self.stroke, Transform::identity(), None);
            self.segments += 1;
        }

        self.state = StrokeState::Drawing { last: point };
    }

    /// End the active stroke
    pub fn stop(&mut self) {
        self.state = StrokeState::Idle;
    }

    /// Route a pointer or touch event to start/extend/stop
    pub fn handle(&mut self, event: InputEvent) -> InputResponse {
        let was_drawing = self.is_drawing();

        match event.phase {
            InputPhase::Down => self.start(event.point()),
            InputPhase::Move => self.extend(event.point()),
            InputPhase::Up | InputPhase::Leave | InputPhase::Cancel => self.stop(),
        }

        let prevent_default = event.source == InputSource::Touch
            && match event.phase {
                InputPhase::Down => self.is_drawing(),
                InputPhase::Move => was_drawing,
                _ => false,
            };

        InputResponse { prevent_default }
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, StrokeState::Drawing { .. })
    }

    /// Number of segments stroked since the surface was created or cleared
    pub fn segment_count(&self) -> usize {
        self.segments
    }

    /// True when no pixel has been painted
    pub fn is_blank(&self) -> bool {
        self.pixmap.data().iter().all(|byte| *byte == 0)
    }

    /// Surface size in pixels
    pub fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    /// Serialize the surface as PNG
    pub fn export_png(&self) -> Result<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| SigningError::Export(format!("Failed to encode drawing: {e}")))
    }

    /// Straight-alpha RGBA pixels, row-major, for painting a preview canvas
    pub fn rgba_pixels(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixmap.data().len());
        for pixel in self.pixmap.pixels() {
            let c = pixel.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }
}

impl std::fmt::Debug for StrokeCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrokeCapture")
            .field("size", &self.size())
            .field("state", &self.state)
            .field("segments", &self.segments)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn event(source: InputSource, phase: InputPhase, x: f64, y: f64) -> InputEvent {
        InputEvent {
            source,
            phase,
            client_x: x,
            client_y: y,
            origin_x: 10.0,
            origin_y: 20.0,
        }
    }

    fn draw_line(capture: &mut StrokeCapture) {
        capture.start(SurfacePoint::new(5.0, 5.0));
        capture.extend(SurfacePoint::new(40.0, 20.0));
        capture.extend(SurfacePoint::new(80.0, 10.0));
        capture.stop();
    }

    #[test]
    fn test_new_surface_is_blank() {
        let capture = StrokeCapture::new(100, 40).unwrap();
        assert!(capture.is_blank());
        assert_eq!(capture.size(), (100, 40));
        assert!(!capture.is_drawing());
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            StrokeCapture::new(0, 40),
            Err(SigningError::InvalidSurface(0, 40))
        ));
    }

    #[test]
    fn test_stroke_paints_segments() {
        let mut capture = StrokeCapture::new(100, 40).unwrap();
        draw_line(&mut capture);

        assert_eq!(capture.segment_count(), 2);
        assert!(!capture.is_blank());
        assert!(!capture.is_drawing());
    }

    #[test]
    fn test_extend_while_idle_is_ignored() {
        let mut capture = StrokeCapture::new(100, 40).unwrap();
        capture.extend(SurfacePoint::new(10.0, 10.0));
        capture.extend(SurfacePoint::new(50.0, 30.0));

        assert_eq!(capture.segment_count(), 0);
        assert!(capture.is_blank());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut capture = StrokeCapture::new(100, 40).unwrap();
        draw_line(&mut capture);

        capture.clear();
        let once = capture.rgba_pixels();
        capture.clear();
        let twice = capture.rgba_pixels();

        assert_eq!(once, twice);
        assert!(capture.is_blank());
        assert_eq!(capture.size(), (100, 40));
    }

    #[test]
    fn test_resize_discards_strokes() {
        let mut capture = StrokeCapture::new(100, 40).unwrap();
        draw_line(&mut capture);
        assert!(!capture.is_blank());

        capture.resize(300, 120).unwrap();
        assert!(capture.is_blank());
        assert_eq!(capture.size(), (300, 120));
        assert_eq!(capture.segment_count(), 0);
    }

    #[test]
    fn test_resize_to_zero_keeps_surface() {
        let mut capture = StrokeCapture::new(100, 40).unwrap();
        draw_line(&mut capture);

        assert!(capture.resize(0, 0).is_err());
        assert_eq!(capture.size(), (100, 40));
        assert!(!capture.is_blank());
    }

    #[test]
    fn test_handle_uses_surface_origin() {
        let mut capture = StrokeCapture::new(100, 40).unwrap();
        capture.handle(event(InputSource::Pointer, InputPhase::Down, 15.0, 25.0));
        assert_eq!(
            capture.state,
            StrokeState::Drawing {
                last: SurfacePoint::new(5.0, 5.0)
            }
        );
    }

    #[test]
    fn test_touch_and_pointer_share_transitions() {
        for source in [InputSource::Pointer, InputSource::Touch] {
            let mut capture = StrokeCapture::new(100, 40).unwrap();
            capture.handle(event(source, InputPhase::Down, 15.0, 25.0));
            capture.handle(event(source, InputPhase::Move, 60.0, 40.0));
            capture.handle(event(source, InputPhase::Up, 60.0, 40.0));
            capture.handle(event(source, InputPhase::Move, 90.0, 50.0));

            assert_eq!(capture.segment_count(), 1);
            assert!(!capture.is_drawing());
        }
    }

    #[test]
    fn test_leave_ends_stroke() {
        let mut capture = StrokeCapture::new(100, 40).unwrap();
        capture.handle(event(InputSource::Pointer, InputPhase::Down, 15.0, 25.0));
        capture.handle(event(InputSource::Pointer, InputPhase::Leave, 200.0, 25.0));
        assert!(!capture.is_drawing());
    }

    #[test]
    fn test_touch_suppresses_default_only_while_drawing() {
        let mut capture = StrokeCapture::new(100, 40).unwrap();

        let idle_move = capture.handle(event(InputSource::Touch, InputPhase::Move, 30.0, 30.0));
        assert!(!idle_move.prevent_default);

        let down = capture.handle(event(InputSource::Touch, InputPhase::Down, 30.0, 30.0));
        assert!(down.prevent_default);

        let active_move = capture.handle(event(InputSource::Touch, InputPhase::Move, 35.0, 32.0));
        assert!(active_move.prevent_default);

        let end = capture.handle(event(InputSource::Touch, InputPhase::Up, 35.0, 32.0));
        assert!(!end.prevent_default);

        let pointer = capture.handle(event(InputSource::Pointer, InputPhase::Down, 30.0, 30.0));
        assert!(!pointer.prevent_default);
    }

    #[test]
    fn test_non_finite_points_ignored() {
        let mut capture = StrokeCapture::new(100, 40).unwrap();
        capture.start(SurfacePoint::new(f32::NAN, 1.0));
        assert!(!capture.is_drawing());

        capture.start(SurfacePoint::new(1.0, 1.0));
        capture.extend(SurfacePoint::new(f32::INFINITY, 1.0));
        assert_eq!(capture.segment_count(), 0);
    }

    #[test]
    fn test_export_png() {
        let mut capture = StrokeCapture::new(64, 32).unwrap();
        draw_line(&mut capture);

        let png = capture.export_png().unwrap();
        assert_eq!(&png[..4], b"\x89PNG");
    }

    #[test]
    fn test_export_blank_png() {
        let capture = StrokeCapture::new(64, 32).unwrap();
        let png = capture.export_png().unwrap();
        assert!(pdf_core::detect_png(&png).is_ok());
    }

    #[test]
    fn test_rgba_pixels_straight_alpha() {
        let mut capture = StrokeCapture::new(20, 20).unwrap();
        capture.start(SurfacePoint::new(2.0, 10.0));
        capture.extend(SurfacePoint::new(18.0, 10.0));

        let pixels = capture.rgba_pixels();
        assert_eq!(pixels.len(), 20 * 20 * 4);
        // Middle of the line is solid black
        let idx = (10 * 20 + 10) * 4;
        assert_eq!(pixels[idx..idx + 3], [0, 0, 0]);
        assert!(pixels[idx + 3] > 0);
    }
}
