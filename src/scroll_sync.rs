use crate::controller::ZoomState;
use crate::errors::Result;
use crate::vector::fit_scale;
use egui::{Pos2, Vec2};

/// Tolerance for float comparisons against the viewport's scale bounds.
const SCALE_EPSILON: f32 = 1e-4;

/// A zoomable viewport as the host toolkit exposes it.
///
/// ScrollSync depends only on this trait, never on a concrete widget.
/// `zoomview` ships one egui-backed implementation in `overlay`; any other
/// toolkit's native zoom surface can implement it the same way.
pub trait ZoomViewport {
    fn zoom_scale(&self) -> f32;
    fn set_zoom_scale(&mut self, scale: f32, animated: bool);
    fn zoom_scale_bounds(&self) -> (f32, f32);
    fn set_zoom_scale_bounds(&mut self, min: f32, max: f32);
    fn content_offset(&self) -> Vec2;
    fn set_content_offset(&mut self, offset: Vec2);
    fn content_size(&self) -> Vec2;
    fn viewport_size(&self) -> Vec2;
    /// Top/left inset keeping undersized content centered.
    fn set_content_inset(&mut self, inset: Vec2);
    /// Zooms to maximum scale anchored at `point` in content coordinates.
    fn zoom_to_point(&mut self, point: Pos2, animated: bool);
}

/// Bridges the controller's declared [`ZoomState`] to a [`ZoomViewport`].
///
/// Outbound, state transitions become concrete scale/offset commands;
/// inbound, raw viewport zoom deltas become updated zoom states.
pub struct ScrollSync {
    image_size: Vec2,
    max_zoom_multiplier: f32,
    reduce_motion: bool,
}

impl ScrollSync {
    pub fn new(max_zoom_multiplier: f32, reduce_motion: bool) -> Self {
        Self {
            image_size: Vec2::ZERO,
            max_zoom_multiplier,
            reduce_motion,
        }
    }

    pub fn set_image_size(&mut self, size: Vec2) {
        self.image_size = size;
    }

    pub fn image_size(&self) -> Vec2 {
        self.image_size
    }

    /// The fit scale: letterboxed or pillarboxed depending on which axis
    /// constrains.
    pub fn min_zoom_scale(&self, viewport_size: Vec2) -> Result<f32> {
        fit_scale(self.image_size, viewport_size)
    }

    pub fn max_zoom_scale(&self, viewport_size: Vec2) -> Result<f32> {
        Ok(self.min_zoom_scale(viewport_size)? * self.max_zoom_multiplier)
    }

    /// Reconciles the viewport with the declared zoom state. Run whenever
    /// the image, the viewport size, or the zoom state changes.
    pub fn sync(&mut self, viewport: &mut dyn ZoomViewport, zoom_state: ZoomState) -> Result<()> {
        let viewport_size = viewport.viewport_size();
        let min_scale = self.min_zoom_scale(viewport_size)?;
        let max_scale = min_scale * self.max_zoom_multiplier;
        let (bound_min, _) = viewport.zoom_scale_bounds();
        let animated = !self.reduce_motion;

        if (bound_min - min_scale).abs() > SCALE_EPSILON {
            // The fit scale moved: viewport resize or a new image, not a
            // user action, so scale snaps without animation.
            log::trace!("fit scale {bound_min} -> {min_scale}");
            viewport.set_zoom_scale_bounds(min_scale, max_scale);

            match zoom_state {
                ZoomState::Min => viewport.set_zoom_scale(min_scale, false),
                ZoomState::Max { .. } => viewport.set_zoom_scale(max_scale, false),
                ZoomState::Partial => {}
            }

            // Preserve the visual center across the resize: recompute the
            // offset against the re-centered content, then reapply inset.
            let offset =
                viewport.content_offset() - (viewport_size - viewport.content_size()) / 2.0;
            Self::update_inset(viewport);
            viewport.set_content_offset(offset);
        } else {
            match zoom_state {
                ZoomState::Min => {
                    if (viewport.zoom_scale() - min_scale).abs() > SCALE_EPSILON {
                        viewport.set_zoom_scale(min_scale, animated);
                    }
                }
                ZoomState::Max { center } => {
                    if (viewport.zoom_scale() - max_scale).abs() > SCALE_EPSILON {
                        // Without a recorded center (return-to-max after a
                        // resize) the viewport keeps its own anchoring.
                        if let Some(center) = center {
                            viewport.zoom_to_point(center, animated);
                        }
                    }
                }
                ZoomState::Partial => {}
            }
        }

        Ok(())
    }

    /// A pinch ended at `scale`; classify the resulting zoom state.
    pub fn on_zoom_ended(&self, viewport: &dyn ZoomViewport, scale: f32) -> ZoomState {
        let (min_scale, max_scale) = viewport.zoom_scale_bounds();
        if (scale - min_scale).abs() <= SCALE_EPSILON {
            ZoomState::Min
        } else if (scale - max_scale).abs() <= SCALE_EPSILON {
            ZoomState::Max { center: None }
        } else {
            ZoomState::Partial
        }
    }

    /// Continuous pinch progress: keep content centered, no state change.
    pub fn on_zoom_progress(&self, viewport: &mut dyn ZoomViewport) {
        Self::update_inset(viewport);
    }

    fn update_inset(viewport: &mut dyn ZoomViewport) {
        let slack = (viewport.viewport_size() - viewport.content_size()) / 2.0;
        viewport.set_content_inset(slack.max(Vec2::ZERO));
    }
}
