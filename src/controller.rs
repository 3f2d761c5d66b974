use crate::anim::{Animated, Curve, Tween};
use crate::config::OverlayConfig;
use crate::vector::VecExt;
use egui::{Pos2, Vec2};

/// Extra delay after the dismiss flight before the image is cleared,
/// so the clear never lands while the last frame of the fade is visible.
const CLEAR_GRACE: f32 = 0.1;

/// Tagged state of the zoom interaction.
///
/// `Min` is fit-to-view, `Partial` any intermediate pinch position, `Max`
/// fully zoomed, optionally anchored at the point that requested the zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomState {
    Min,
    Partial,
    Max { center: Option<Pos2> },
}

impl ZoomState {
    pub fn is_min(&self) -> bool {
        matches!(self, ZoomState::Min)
    }

    pub fn is_max(&self) -> bool {
        matches!(self, ZoomState::Max { .. })
    }
}

/// One sample of an in-progress drag gesture.
///
/// `velocity` is optional: not every input source can report it, and the
/// dismissal animation branches on its presence rather than on any
/// platform check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSample {
    pub translation: Vec2,
    pub predicted_end_translation: Vec2,
    pub velocity: Option<Vec2>,
}

/// The renderable projection of controller state at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionSnapshot {
    pub offset: Vec2,
    pub background_opacity: f32,
    pub image_opacity: f32,
    pub close_button_opacity: f32,
    pub is_interactive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredAction {
    ClearImage,
}

#[derive(Debug, Clone, Copy)]
struct Deferred {
    at: f64,
    action: DeferredAction,
}

/// The zoom/pan/dismiss interaction state machine.
///
/// Consumes raw drag samples and double-tap events; produces a continuous
/// offset/opacity snapshot for the rendering layer and a clear-image signal
/// the host consumes through [`take_clear_request`](Self::take_clear_request).
/// All timing is keyed to the `now` seconds value passed into each event,
/// never to a wall clock of its own.
pub struct ZoomPanController {
    config: OverlayConfig,
    zoom_state: ZoomState,
    offset: Animated<Vec2>,
    background_opacity: Animated<f32>,
    image_opacity: Animated<f32>,
    close_button_opacity: Animated<f32>,
    is_interactive: bool,
    is_dragging: bool,
    predicted_end: Vec2,
    velocity: Option<Vec2>,
    frame_size: Vec2,
    deferred: Vec<Deferred>,
    clear_requested: bool,
    visible: bool,
}

impl ZoomPanController {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            zoom_state: ZoomState::Min,
            offset: Animated::new(Vec2::ZERO),
            background_opacity: Animated::new(0.0),
            image_opacity: Animated::new(0.0),
            close_button_opacity: Animated::new(0.0),
            is_interactive: true,
            is_dragging: false,
            predicted_end: Vec2::ZERO,
            velocity: None,
            frame_size: Vec2::ZERO,
            deferred: Vec::new(),
            clear_requested: false,
            visible: false,
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Size of the frame the image flies out of; feeds the dismiss distance.
    pub fn set_frame_size(&mut self, size: Vec2) {
        self.frame_size = size;
    }

    pub fn zoom_state(&self) -> ZoomState {
        self.zoom_state
    }

    /// Updates the declared zoom state, normally from ScrollSync translating
    /// raw viewport zoom deltas back.
    pub fn set_zoom_state(&mut self, state: ZoomState) {
        if self.zoom_state != state {
            log::trace!("zoom state {:?} -> {:?}", self.zoom_state, state);
            self.zoom_state = state;
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    /// True while any tween or deferred action is outstanding; the widget
    /// layer uses this to keep requesting repaints.
    pub fn is_animating(&self) -> bool {
        self.offset.is_animating()
            || self.background_opacity.is_animating()
            || self.image_opacity.is_animating()
            || self.close_button_opacity.is_animating()
            || !self.deferred.is_empty()
    }

    /// A new image was assigned. Cancels every in-flight animation and
    /// pending deferred action first, so a dismissal that was mid-flight for
    /// the previous image can never clear this one.
    pub fn on_image_assigned(&mut self, now: f64) {
        log::debug!("image assigned, resetting interaction state");
        let speed = self.config.animation_speed;

        self.deferred.clear();
        self.clear_requested = false;
        self.visible = true;
        self.zoom_state = ZoomState::Min;
        self.is_interactive = true;
        self.is_dragging = false;
        self.predicted_end = Vec2::ZERO;
        self.velocity = None;

        self.offset.set(Vec2::ZERO);
        self.background_opacity.set(1.0);
        self.image_opacity.set(0.0);
        self.image_opacity
            .animate(Tween::new(0.0, 1.0, now, speed, Curve::EaseIn));
        self.close_button_opacity.set(0.0);
        self.close_button_opacity
            .animate(Tween::new(0.0, 1.0, now, speed, Curve::EaseIn).with_delay(speed));
    }

    /// The image was cleared. Everything resets immediately, no animation.
    pub fn on_image_cleared(&mut self) {
        log::debug!("image cleared, hiding overlay");
        self.deferred.clear();
        self.visible = false;
        self.zoom_state = ZoomState::Min;
        self.is_interactive = true;
        self.is_dragging = false;
        self.predicted_end = Vec2::ZERO;
        self.velocity = None;

        self.offset.set(Vec2::ZERO);
        self.background_opacity.set(0.0);
        self.image_opacity.set(0.0);
        self.close_button_opacity.set(0.0);
    }

    /// Toggles zoom. The controller only records the intended target;
    /// ScrollSync executes it against the viewport.
    pub fn on_double_tap(&mut self, location: Pos2) {
        self.zoom_state = match self.zoom_state {
            ZoomState::Max { .. } => ZoomState::Min,
            _ => ZoomState::Max {
                center: Some(location),
            },
        };
        log::trace!("double tap -> {:?}", self.zoom_state);
    }

    /// A drag sample arrived. Only consumed while the zoom state is `Min`;
    /// pan-to-dismiss must not fight with pinch-to-zoom.
    pub fn on_drag_changed(&mut self, sample: DragSample, _now: f64) {
        if !self.zoom_state.is_min() {
            return;
        }

        self.is_dragging = true;
        self.is_interactive = false;
        self.offset.set(sample.translation);

        let faded = (sample.translation.magnitude() / self.config.dismiss_threshold)
            * (1.0 - self.config.opacity_at_dismiss_threshold);
        self.background_opacity.set((1.0 - faded).clamp(0.0, 1.0));

        self.predicted_end = sample.predicted_end_translation;
        self.velocity = sample.velocity;
    }

    /// The drag's active flag dropped. Decides dismiss vs cancel from the
    /// predicted end translation recorded by the last sample.
    pub fn on_drag_ended(&mut self, now: f64) {
        if !self.is_dragging {
            return;
        }
        self.is_dragging = false;

        if self.predicted_end.magnitude() > self.config.dismiss_threshold {
            self.commit_dismissal(now);
        } else {
            self.cancel_drag(now);
        }
    }

    /// Close requested directly (close button). Fades everything out, then
    /// clears the image.
    pub fn request_close(&mut self, now: f64) {
        log::debug!("close requested");
        let speed = self.config.animation_speed;
        self.is_interactive = false;

        self.background_opacity.animate(Tween::new(
            self.background_opacity.get(),
            0.0,
            now,
            speed,
            Curve::EaseOut,
        ));
        self.image_opacity.animate(Tween::new(
            self.image_opacity.get(),
            0.0,
            now,
            speed,
            Curve::EaseOut,
        ));
        self.close_button_opacity.animate(Tween::new(
            self.close_button_opacity.get(),
            0.0,
            now,
            speed,
            Curve::EaseOut,
        ));
        self.deferred.push(Deferred {
            at: now + speed as f64,
            action: DeferredAction::ClearImage,
        });
    }

    fn commit_dismissal(&mut self, now: f64) {
        let speed = self.config.animation_speed;

        let mut dismiss_distance = 1.5 * self.frame_size.max_elem();
        if dismiss_distance <= 0.0 {
            // Frame never reported; fly exactly as far as the prediction.
            dismiss_distance = self.predicted_end.magnitude();
        }

        let direction = match self.predicted_end.try_normalized() {
            Ok(direction) => direction,
            // Unreachable while the threshold is positive, but a zero vector
            // must not take down the UI thread.
            Err(_) => {
                self.cancel_drag(now);
                return;
            }
        };

        let (end_offset, curve) = match self.velocity {
            Some(velocity) => (
                direction * dismiss_distance,
                Curve::Spring {
                    initial_velocity: velocity.magnitude() / dismiss_distance,
                },
            ),
            None => (
                self.predicted_end.longer(direction * dismiss_distance),
                Curve::default_spring(),
            ),
        };

        log::debug!(
            "dismiss committed: predicted {:.1}, flying to {:?}",
            self.predicted_end.magnitude(),
            end_offset
        );

        self.offset
            .animate(Tween::new(self.offset.get(), end_offset, now, speed, curve));
        // The close button must be fully gone before the image starts its
        // own fade at speed / 2.
        self.close_button_opacity.animate(Tween::new(
            self.close_button_opacity.get(),
            0.0,
            now,
            speed * 0.5,
            curve,
        ));
        self.background_opacity.animate(Tween::new(
            self.background_opacity.get(),
            0.0,
            now,
            speed,
            Curve::Linear,
        ));
        self.image_opacity.animate(
            Tween::new(
                self.image_opacity.get(),
                0.0,
                now,
                speed * 0.5,
                Curve::Linear,
            )
            .with_delay(speed * 0.5),
        );

        self.deferred.push(Deferred {
            at: now + (speed + CLEAR_GRACE) as f64,
            action: DeferredAction::ClearImage,
        });
        self.velocity = None;
    }

    fn cancel_drag(&mut self, now: f64) {
        let speed = self.config.animation_speed;
        self.is_interactive = true;

        self.offset.animate(Tween::new(
            self.offset.get(),
            Vec2::ZERO,
            now,
            speed,
            Curve::EaseOut,
        ));
        self.background_opacity.animate(Tween::new(
            self.background_opacity.get(),
            1.0,
            now,
            speed,
            Curve::EaseOut,
        ));
        self.velocity = None;
    }

    /// Advances tweens and fires due deferred actions. Call once per frame.
    pub fn tick(&mut self, now: f64) -> InteractionSnapshot {
        self.offset.tick(now);
        self.background_opacity.tick(now);
        self.image_opacity.tick(now);
        self.close_button_opacity.tick(now);

        let mut fired = false;
        self.deferred.retain(|deferred| {
            if deferred.at <= now {
                match deferred.action {
                    DeferredAction::ClearImage => fired = true,
                }
                false
            } else {
                true
            }
        });
        if fired {
            self.clear_requested = true;
        }

        self.snapshot()
    }

    pub fn snapshot(&self) -> InteractionSnapshot {
        InteractionSnapshot {
            offset: self.offset.get(),
            background_opacity: self.background_opacity.get(),
            image_opacity: self.image_opacity.get(),
            close_button_opacity: self.close_button_opacity.get(),
            is_interactive: self.is_interactive,
        }
    }

    /// Consumes the pending clear-image signal, if any. The host reacts by
    /// setting its image binding to `None`.
    pub fn take_clear_request(&mut self) -> bool {
        std::mem::take(&mut self.clear_requested)
    }
}
