pub mod camera;
pub mod hit;
pub mod paint;
pub mod shape;

pub use camera::{Camera, MAX_SCALE, MIN_SCALE};
pub use hit::node_at;
pub use paint::{CanvasTheme, DisplayList, PaintOp, RenderOptions, render};
pub use shape::{node_contains, node_fill, node_path};
