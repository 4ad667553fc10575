//! Mapping between preview pixels and PDF points
//!
//! The preview shows a page scaled to fit its container. Screen coordinates
//! are CSS pixels with the origin at the top-left of the rendered page; PDF
//! user space is points with the origin at the bottom-left of the page.
//! `point = pixel / scale`.

use crate::{PageSize, Result, SigningError};
use serde::{Deserialize, Serialize};

/// Ratio between the container width and the page's native width
///
/// Returns a degenerate (non-positive or non-finite) value when either input
/// is; use [`Scale::fit`] to reject those.
pub fn compute_scale(native_page_width: f64, container_width: f64) -> f64 {
    container_width / native_page_width
}

/// Convert a placement box from preview pixels to PDF points
///
/// Returns the box's bottom-left corner `(x, y)` in PDF user space.
pub fn to_pdf_coords(
    left_px: f64,
    top_px: f64,
    _width_px: f64,
    height_px: f64,
    page_height_pt: f64,
    scale: f64,
) -> (f64, f64) {
    let x = left_px / scale;
    let y = page_height_pt - (top_px + height_px) / scale;
    (x, y)
}

/// Inverse of [`to_pdf_coords`]: the box's top-left corner in preview pixels
pub fn to_screen_coords(
    x_pt: f64,
    y_pt: f64,
    _width_px: f64,
    height_px: f64,
    page_height_pt: f64,
    scale: f64,
) -> (f64, f64) {
    let left = x_pt * scale;
    let top = (page_height_pt - y_pt) * scale - height_px;
    (left, top)
}

/// A validated display scale: finite and strictly positive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Scale(f64);

impl Scale {
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(SigningError::InvalidScale(value))
        }
    }

    /// Scale that fits a page of `native_page_width` points into `container_width` pixels
    pub fn fit(native_page_width: f64, container_width: f64) -> Result<Self> {
        Self::new(compute_scale(native_page_width, container_width))
    }

    pub fn get(&self) -> f64 {
        self.0
    }

    /// Pixels to points
    pub fn to_points(&self, pixels: f64) -> f64 {
        pixels / self.0
    }

    /// Points to pixels
    pub fn to_pixels(&self, points: f64) -> f64 {
        points * self.0
    }
}

impl TryFrom<f64> for Scale {
    type Error = SigningError;

    fn try_from(value: f64) -> Result<Self> {
        Scale::new(value)
    }
}

impl From<Scale> for f64 {
    fn from(scale: Scale) -> f64 {
        scale.0
    }
}

/// The rendered size of a page at a given scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels
    pub width: f64,
    /// Height in pixels
    pub height: f64,
    pub scale: Scale,
}

impl Viewport {
    pub fn new(page: PageSize, scale: Scale) -> Self {
        Self {
            width: scale.to_pixels(page.width),
            height: scale.to_pixels(page.height),
            scale,
        }
    }

    /// Canvas width, truncated to whole pixels
    pub fn canvas_width(&self) -> u32 {
        self.width as u32
    }

    /// Canvas height, truncated to whole pixels
    pub fn canvas_height(&self) -> u32 {
        self.height as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn round1(v: f64) -> f64 {
        (v * 10.0).round() / 10.0
    }

    #[test]
    fn test_compute_scale() {
        assert_eq!(compute_scale(800.0, 760.0), 0.95);
        assert_eq!(compute_scale(612.0, 612.0), 1.0);
        assert_eq!(compute_scale(400.0, 800.0), 2.0);
    }

    #[test]
    fn test_compute_scale_positive_for_positive_inputs() {
        for native in [1.0, 72.0, 595.28, 612.0, 1224.0, 14400.0] {
            for container in [0.5, 1.0, 320.0, 760.0, 1920.0] {
                assert!(compute_scale(native, container) > 0.0);
            }
            assert_eq!(compute_scale(native, native), 1.0);
        }
    }

    #[test]
    fn test_scale_fit_rejects_degenerate() {
        assert!(matches!(
            Scale::fit(800.0, 0.0),
            Err(SigningError::InvalidScale(_))
        ));
        assert!(Scale::fit(800.0, -40.0).is_err());
        assert!(Scale::fit(0.0, 760.0).is_err());
        assert!(Scale::fit(800.0, f64::NAN).is_err());
    }

    #[test]
    fn test_to_pdf_coords_scenario() {
        let scale = Scale::fit(800.0, 760.0).unwrap();
        assert_eq!(scale.get(), 0.95);

        let (x, y) = to_pdf_coords(100.0, 200.0, 150.0, 50.0, 792.0, scale.get());
        assert_eq!(round1(x), 105.3);
        assert_eq!(round1(y), 528.8);
    }

    #[test]
    fn test_to_pdf_coords_identity_scale() {
        let (x, y) = to_pdf_coords(0.0, 0.0, 100.0, 40.0, 792.0, 1.0);
        assert_eq!((x, y), (0.0, 752.0));
    }

    #[test]
    fn test_to_pdf_coords_deterministic() {
        let a = to_pdf_coords(12.5, 33.25, 150.0, 50.0, 841.89, 0.731);
        let b = to_pdf_coords(12.5, 33.25, 150.0, 50.0, 841.89, 0.731);
        assert_eq!(a, b);
    }

    #[test]
    fn test_round_trip() {
        let cases = [
            (100.0, 200.0, 150.0, 50.0, 792.0, 0.95),
            (0.0, 0.0, 10.0, 10.0, 841.89, 1.27),
            (583.3, 702.1, 177.0, 60.0, 792.0, 0.5),
            (12.0, 1000.0, 150.0, 50.0, 1008.0, 2.0),
        ];
        for (left, top, w, h, page_h, scale) in cases {
            let (x, y) = to_pdf_coords(left, top, w, h, page_h, scale);
            let (l2, t2) = to_screen_coords(x, y, w, h, page_h, scale);
            assert!((l2 - left).abs() < 1e-9, "left {left} -> {l2}");
            assert!((t2 - top).abs() < 1e-9, "top {top} -> {t2}");
        }
    }

    #[test]
    fn test_viewport() {
        let page = PageSize {
            width: 800.0,
            height: 600.0,
        };
        let viewport = Viewport::new(page, Scale::fit(800.0, 760.0).unwrap());
        assert_eq!(viewport.width, 760.0);
        assert_eq!(viewport.canvas_width(), 760);
        assert_eq!(viewport.canvas_height(), 570);
    }

    #[test]
    fn test_scale_serde_validates() {
        let scale: Scale = serde_json::from_str("0.95").unwrap();
        assert_eq!(scale.get(), 0.95);
        assert!(serde_json::from_str::<Scale>("0").is_err());
        assert_eq!(serde_json::to_string(&scale).unwrap(), "0.95");
    }
}
