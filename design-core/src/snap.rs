//! Grid snapping - pure geometry.

use serde::{Deserialize, Serialize};

use crate::layer::Rect;

/// Default distance within which a coordinate is pulled onto the grid.
pub const DEFAULT_SNAP_THRESHOLD: f32 = 10.0;

/// Result of snapping a single point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnappedPoint {
    /// Resulting x coordinate.
    pub x: f32,
    /// Resulting y coordinate.
    pub y: f32,
    /// Whether x was pulled onto the grid.
    pub snapped_x: bool,
    /// Whether y was pulled onto the grid.
    pub snapped_y: bool,
}

/// Snaps points, rectangles, and sizes to the nearest grid intersection
/// within a threshold. Pure and total: out-of-range inputs are left to the
/// caller to validate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSnapper {
    /// Grid cell size in pixels.
    pub cell_size: f32,
    /// Disabled snappers return inputs unchanged.
    pub enabled: bool,
    /// Maximum pull distance per axis.
    pub threshold: f32,
}

impl GridSnapper {
    /// Create a snapper with the default threshold.
    #[must_use]
    pub const fn new(cell_size: f32, enabled: bool) -> Self {
        Self {
            cell_size,
            enabled,
            threshold: DEFAULT_SNAP_THRESHOLD,
        }
    }

    /// Round each axis independently to the nearest grid multiple, accepting
    /// the rounded value only when the delta is within the threshold.
    #[must_use]
    pub fn snap_point(&self, x: f32, y: f32) -> SnappedPoint {
        if !self.enabled || self.cell_size <= 0.0 {
            return SnappedPoint {
                x,
                y,
                snapped_x: false,
                snapped_y: false,
            };
        }

        let grid_x = (x / self.cell_size).round() * self.cell_size;
        let grid_y = (y / self.cell_size).round() * self.cell_size;

        let delta_x = (x - grid_x).abs();
        let delta_y = (y - grid_y).abs();

        SnappedPoint {
            x: if delta_x <= self.threshold { grid_x } else { x },
            y: if delta_y <= self.threshold { grid_y } else { y },
            snapped_x: delta_x <= self.threshold,
            snapped_y: delta_y <= self.threshold,
        }
    }

    /// Snap a rectangle's position by trying three anchors (top-left, center,
    /// bottom-right) and keeping the one whose pre-snap point is closest to
    /// its own snapped candidate. Only the axes that actually snapped move;
    /// size is never changed.
    #[must_use]
    pub fn snap_rect(&self, rect: Rect) -> Rect {
        if !self.enabled || self.cell_size <= 0.0 {
            return rect;
        }

        let top_left = self.snap_point(rect.x, rect.y);

        let (center_x, center_y) = rect.center();
        let center = self.snap_point(center_x, center_y);

        let bottom_right = self.snap_point(rect.right(), rect.bottom());

        let top_left_dist = (top_left.x - rect.x).hypot(top_left.y - rect.y);
        let center_dist = (center.x - center_x).hypot(center.y - center_y);
        let bottom_right_dist =
            (bottom_right.x - rect.right()).hypot(bottom_right.y - rect.bottom());

        let mut x = rect.x;
        let mut y = rect.y;

        if top_left_dist <= center_dist && top_left_dist <= bottom_right_dist {
            if top_left.snapped_x {
                x = top_left.x;
            }
            if top_left.snapped_y {
                y = top_left.y;
            }
        } else if center_dist <= bottom_right_dist {
            if center.snapped_x {
                x = center.x - rect.width / 2.0;
            }
            if center.snapped_y {
                y = center.y - rect.height / 2.0;
            }
        } else {
            if bottom_right.snapped_x {
                x = bottom_right.x - rect.width;
            }
            if bottom_right.snapped_y {
                y = bottom_right.y - rect.height;
            }
        }

        Rect::new(x, y, rect.width, rect.height)
    }

    /// Snap a size to grid multiples under the same threshold rule, floored
    /// at one grid cell per dimension.
    #[must_use]
    pub fn snap_size(&self, width: f32, height: f32) -> (f32, f32) {
        if !self.enabled || self.cell_size <= 0.0 {
            return (width, height);
        }

        let grid_w = (width / self.cell_size).round() * self.cell_size;
        let grid_h = (height / self.cell_size).round() * self.cell_size;

        let delta_w = (width - grid_w).abs();
        let delta_h = (height - grid_h).abs();

        (
            if delta_w <= self.threshold {
                grid_w.max(self.cell_size)
            } else {
                width
            },
            if delta_h <= self.threshold {
                grid_h.max(self.cell_size)
            } else {
                height
            },
        )
    }
}
