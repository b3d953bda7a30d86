//! Drag-and-drop placement: geometry, drop-target resolution, and the
//! pointer gesture state machine.

pub mod engine;
pub mod geometry;
pub mod gesture;

pub use engine::{HitTarget, Placement, SlotSnapshot, ViewLayout, compute_placement};
pub use geometry::{GridMetrics, Point, Rect, Size};
pub use gesture::{DragHost, GestureController};
