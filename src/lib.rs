//! zoomview - a fullscreen zoomable image overlay widget for egui.
//!
//! The interaction core is toolkit-agnostic: [`ZoomPanController`] owns the
//! zoom/pan/dismiss state machine, [`ScrollSync`] reconciles its declared
//! zoom state with any [`ZoomViewport`] implementation, and
//! [`OrientationMapper`] turns raw device orientation events into a
//! stabilized content rotation. [`ZoomImageOverlay`] wires all three to an
//! egui host.

mod anim;
mod config;
mod controller;
mod errors;
mod orientation;
mod overlay;
mod scroll_sync;
mod vector;

pub mod logging;

#[cfg(test)]
mod tests;

pub use anim::{Animated, Curve, Tween};
pub use config::{CloseButtonStyle, OverlayConfig, RotationConfig};
pub use controller::{DragSample, InteractionSnapshot, ZoomPanController, ZoomState};
pub use errors::{Result, ViewerError};
pub use orientation::{
    rotation_angle, swap_dimensions, Orientation, OrientationEvent, OrientationMapper,
    OrientationReading, OrientationState, RotationAngle,
};
pub use overlay::{EguiZoomViewport, ZoomImageOverlay};
pub use scroll_sync::{ScrollSync, ZoomViewport};
pub use vector::{fit_scale, scaled_to_fit, VecExt};
