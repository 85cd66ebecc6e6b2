//! Camera transform: model coordinates ↔ screen pixels.

use cf_core::CameraFit;
use kurbo::{Affine, Point};

/// Wheel zoom bounds.
pub const MIN_SCALE: f64 = 0.3;
pub const MAX_SCALE: f64 = 3.0;
/// Multiplier applied per wheel notch.
pub const ZOOM_STEP: f64 = 1.1;

/// Uniform scale plus pan. Screen = model × scale + pan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub scale: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            scale: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl From<CameraFit> for Camera {
    fn from(fit: CameraFit) -> Self {
        Camera {
            scale: fit.scale,
            pan_x: fit.pan_x,
            pan_y: fit.pan_y,
        }
    }
}

impl Camera {
    pub fn to_screen(&self, model: Point) -> Point {
        Point::new(
            model.x * self.scale + self.pan_x,
            model.y * self.scale + self.pan_y,
        )
    }

    pub fn to_model(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan_x) / self.scale,
            (screen.y - self.pan_y) / self.scale,
        )
    }

    /// The affine applied to model-space paths before emitting paint ops.
    pub fn affine(&self) -> Affine {
        Affine::new([self.scale, 0.0, 0.0, self.scale, self.pan_x, self.pan_y])
    }

    /// Zoom in (`notches > 0`) or out (`notches < 0`) about a screen
    /// point: the model point under the cursor stays put. Scale clamps to
    /// [`MIN_SCALE`, `MAX_SCALE`].
    pub fn zoom_about(&mut self, anchor: Point, notches: i32) {
        let factor = ZOOM_STEP.powi(notches);
        let model = self.to_model(anchor);
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.pan_x = anchor.x - model.x * self.scale;
        self.pan_y = anchor.y - model.y * self.scale;
    }

    /// Pan by a screen-space delta (drag).
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    pub fn reset(&mut self) {
        *self = Camera::default();
    }
}
