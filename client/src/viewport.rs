use crate::projection::Bounds;

/// Viewport manages the pan/zoom transformation from world coordinates to screen coordinates.
#[derive(Debug, Clone)]
pub struct Viewport {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

/// Zoom level 0 to roughly zoom level 21.
const MIN_SCALE: f64 = 1.0;
const MAX_SCALE: f64 = 2_097_152.0;
const ZOOM_SENSITIVITY: f64 = 0.002;
/// Smallest extent a fit will zoom to, so a single point does not hit `MAX_SCALE`.
const MIN_FIT_SPAN: f64 = 0.005;
const FIT_PADDING: f64 = 0.05;

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 2.0,
        }
    }
}

impl Viewport {
    /// Convert world coordinates to screen coordinates.
    pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
        (
            wx * self.scale + self.offset_x,
            wy * self.scale + self.offset_y,
        )
    }

    /// Convert screen coordinates to world coordinates.
    pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
        (
            (sx - self.offset_x) / self.scale,
            (sy - self.offset_y) / self.scale,
        )
    }

    /// Zoom toward a focus point (screen coordinates).
    pub fn zoom_at(&mut self, delta: f64, screen_x: f64, screen_y: f64) {
        let factor = (-delta * ZOOM_SENSITIVITY).exp();
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let ratio = new_scale / self.scale;

        // Keep the point under the cursor fixed
        self.offset_x = screen_x - (screen_x - self.offset_x) * ratio;
        self.offset_y = screen_y - (screen_y - self.offset_y) * ratio;
        self.scale = new_scale;
    }

    /// Pan by screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// The world-coordinate box visible on a canvas of the given size.
    pub fn visible_bounds(&self, canvas_w: f64, canvas_h: f64) -> Bounds {
        let (min_x, min_y) = self.screen_to_world(0.0, 0.0);
        let (max_x, max_y) = self.screen_to_world(canvas_w, canvas_h);
        Bounds {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Fit the viewport to show the given world-coordinate bounds with padding.
    /// Returns `false` without touching the viewport when the canvas has no size yet.
    pub fn fit_bounds(&mut self, bounds: Bounds, canvas_w: f64, canvas_h: f64) -> bool {
        if canvas_w <= 0.0 || canvas_h <= 0.0 {
            return false;
        }

        let world_w = bounds.width().max(MIN_FIT_SPAN);
        let world_h = bounds.height().max(MIN_FIT_SPAN);
        let scale_x = canvas_w / (world_w * (1.0 + FIT_PADDING * 2.0));
        let scale_y = canvas_h / (world_h * (1.0 + FIT_PADDING * 2.0));
        self.scale = scale_x.min(scale_y).clamp(MIN_SCALE, MAX_SCALE);

        let center_x = (bounds.min_x + bounds.max_x) / 2.0;
        let center_y = (bounds.min_y + bounds.max_y) / 2.0;
        self.offset_x = canvas_w / 2.0 - center_x * self.scale;
        self.offset_y = canvas_h / 2.0 - center_y * self.scale;
        true
    }
}
