//! Pointer-driven transform gestures: drag, corner resize, and rotation.
//!
//! A gesture is a session object: begun from a pointer-down, fed pointer
//! moves as unrecorded document updates, and finished on release with a
//! single history checkpoint. Pointer coordinates arrive in screen space;
//! the session divides by the viewport zoom to reach canvas space.

use crate::document::{Document, LayerPatch};
use crate::error::{DesignError, DesignResult};
use crate::layer::{Layer, LayerId, Rect};

/// Minimum layer width enforced during resize.
pub const MIN_LAYER_WIDTH: f32 = 40.0;
/// Minimum layer height enforced during resize.
pub const MIN_LAYER_HEIGHT: f32 = 40.0;

/// Corner being dragged during a resize gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom-right corner.
    BottomRight,
}

impl ResizeHandle {
    const fn affects_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    const fn affects_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }
}

#[derive(Debug, Clone, Copy)]
enum GestureKind {
    Drag {
        grab_dx: f32,
        grab_dy: f32,
    },
    Resize {
        handle: ResizeHandle,
        start: Rect,
        origin_x: f32,
        origin_y: f32,
    },
    Rotate {
        pivot_x: f32,
        pivot_y: f32,
        start_angle: f32,
        start_rotation: f32,
    },
}

/// An in-flight transform gesture on one layer.
#[derive(Debug, Clone, Copy)]
pub struct TransformSession {
    layer: LayerId,
    zoom: f32,
    kind: GestureKind,
}

impl TransformSession {
    fn target(doc: &Document, id: LayerId) -> DesignResult<&Layer> {
        let layer = doc
            .layer(id)
            .ok_or_else(|| DesignError::LayerNotFound(id.to_string()))?;
        if layer.locked {
            return Err(DesignError::InvalidOperation(format!(
                "Layer \"{}\" is locked",
                layer.name
            )));
        }
        Ok(layer)
    }

    /// Begin dragging a layer from a pointer-down at `(px, py)` screen
    /// coordinates.
    ///
    /// # Errors
    ///
    /// Fails when the layer does not exist or is locked.
    pub fn begin_drag(
        doc: &Document,
        id: LayerId,
        px: f32,
        py: f32,
        zoom: f32,
    ) -> DesignResult<Self> {
        let layer = Self::target(doc, id)?;
        Ok(Self {
            layer: id,
            zoom,
            kind: GestureKind::Drag {
                grab_dx: px / zoom - layer.x,
                grab_dy: py / zoom - layer.y,
            },
        })
    }

    /// Begin resizing a layer by one of its corner handles.
    ///
    /// # Errors
    ///
    /// Fails when the layer does not exist or is locked.
    pub fn begin_resize(
        doc: &Document,
        id: LayerId,
        handle: ResizeHandle,
        px: f32,
        py: f32,
        zoom: f32,
    ) -> DesignResult<Self> {
        let layer = Self::target(doc, id)?;
        Ok(Self {
            layer: id,
            zoom,
            kind: GestureKind::Resize {
                handle,
                start: layer.bounds(),
                origin_x: px,
                origin_y: py,
            },
        })
    }

    /// Begin rotating a layer about its center.
    ///
    /// # Errors
    ///
    /// Fails when the layer does not exist or is locked.
    pub fn begin_rotate(
        doc: &Document,
        id: LayerId,
        px: f32,
        py: f32,
        zoom: f32,
    ) -> DesignResult<Self> {
        let layer = Self::target(doc, id)?;
        let (pivot_x, pivot_y) = layer.center();
        let start_angle = (py / zoom - pivot_y)
            .atan2(px / zoom - pivot_x)
            .to_degrees();
        Ok(Self {
            layer: id,
            zoom,
            kind: GestureKind::Rotate {
                pivot_x,
                pivot_y,
                start_angle,
                start_rotation: layer.rotation,
            },
        })
    }

    /// Feed a pointer move. Applies an unrecorded update to the document;
    /// snapping and the locked guard are handled by the patch path.
    pub fn update(&self, doc: &mut Document, px: f32, py: f32) {
        let Some(layer) = doc.layer(self.layer) else {
            return;
        };

        #[allow(clippy::cast_precision_loss)]
        let (canvas_w, canvas_h) = (doc.width() as f32, doc.height() as f32);

        let patch = match self.kind {
            GestureKind::Drag { grab_dx, grab_dy } => {
                let x = (px / self.zoom - grab_dx).clamp(0.0, (canvas_w - layer.width).max(0.0));
                let y = (py / self.zoom - grab_dy).clamp(0.0, (canvas_h - layer.height).max(0.0));
                LayerPatch::position(x, y)
            }
            GestureKind::Resize {
                handle,
                start,
                origin_x,
                origin_y,
            } => {
                let dx = (px - origin_x) / self.zoom;
                let dy = (py - origin_y) / self.zoom;
                LayerPatch::bounds(resize_rect(handle, start, dx, dy, canvas_w, canvas_h))
            }
            GestureKind::Rotate {
                pivot_x,
                pivot_y,
                start_angle,
                start_rotation,
            } => {
                let angle = (py / self.zoom - pivot_y)
                    .atan2(px / self.zoom - pivot_x)
                    .to_degrees();
                let rotation = (start_rotation + angle - start_angle).rem_euclid(360.0);
                LayerPatch::rotation(rotation)
            }
        };
        doc.update_layer(self.layer, &patch, false);
    }

    /// Finish the gesture, recording the whole interaction as one
    /// checkpoint.
    pub fn finish(self, doc: &mut Document) {
        doc.commit();
    }
}

/// Compute the resized rectangle for a corner drag. The corner opposite the
/// handle stays fixed, including when the minimum size clamps the delta.
fn resize_rect(
    handle: ResizeHandle,
    start: Rect,
    dx: f32,
    dy: f32,
    canvas_w: f32,
    canvas_h: f32,
) -> Rect {
    let mut width = if handle.affects_left() {
        start.width - dx
    } else {
        start.width + dx
    };
    let mut height = if handle.affects_top() {
        start.height - dy
    } else {
        start.height + dy
    };
    width = width.max(MIN_LAYER_WIDTH);
    height = height.max(MIN_LAYER_HEIGHT);

    let mut x = if handle.affects_left() {
        start.right() - width
    } else {
        start.x
    };
    let mut y = if handle.affects_top() {
        start.bottom() - height
    } else {
        start.y
    };

    if x < 0.0 {
        width = (width + x).max(MIN_LAYER_WIDTH);
        x = 0.0;
    }
    if y < 0.0 {
        height = (height + y).max(MIN_LAYER_HEIGHT);
        y = 0.0;
    }
    width = width.min(canvas_w - x);
    height = height.min(canvas_h - y);

    Rect::new(x, y, width, height)
}
