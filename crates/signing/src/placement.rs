//! Placement box drag controller
//!
//! The box lives in pixels relative to the rendered-page container and
//! follows the pointer centered under it. It never leaves the container.

use log::debug;
use serde::{Deserialize, Serialize};

/// Position and size of the signature placement box, in container pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlacementBox {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }
}

/// Bounding rectangle of the container in client coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

/// Tracks drag gestures on the placement box
#[derive(Debug, Clone)]
pub struct DragController {
    placement: PlacementBox,
    state: DragState,
}

/// Clamp one axis to `[0, container - size]`, collapsing to 0 when the
/// container is the smaller of the two
fn clamp_axis(value: f64, container: f64, size: f64) -> f64 {
    value.min(container - size).max(0.0)
}

impl DragController {
    pub fn new(placement: PlacementBox) -> Self {
        Self {
            placement,
            state: DragState::Idle,
        }
    }

    /// Drag started inside the box
    pub fn begin(&mut self) {
        self.state = DragState::Dragging;
    }

    /// Move the box so its center follows the pointer
    ///
    /// Returns `true` when the box moved. Ignored unless a drag is active.
    pub fn drag_to(&mut self, client_x: f64, client_y: f64, container: ContainerRect) -> bool {
        if self.state != DragState::Dragging {
            return false;
        }
        let inputs = [
            client_x,
            client_y,
            container.left,
            container.top,
            container.width,
            container.height,
        ];
        if inputs.iter().any(|v| !v.is_finite()) {
            return false;
        }

        let b = &self.placement;
        let left = clamp_axis(
            client_x - container.left - b.width / 2.0,
            container.width,
            b.width,
        );
        let top = clamp_axis(
            client_y - container.top - b.height / 2.0,
            container.height,
            b.height,
        );

        if left == b.left && top == b.top {
            return false;
        }
        self.placement.left = left;
        self.placement.top = top;
        true
    }

    /// Drag ended anywhere in the document
    pub fn end(&mut self) {
        if self.state == DragState::Dragging {
            debug!(
                "placement box dropped at ({}, {})",
                self.placement.left, self.placement.top
            );
        }
        self.state = DragState::Idle;
    }

    /// Record the box size as rendered by the host
    pub fn set_size(&mut self, width: f64, height: f64) {
        if width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0 {
            self.placement.width = width;
            self.placement.height = height;
        }
    }

    pub fn placement(&self) -> PlacementBox {
        self.placement
    }

    pub fn state(&self) -> DragState {
        self.state
    }
}
