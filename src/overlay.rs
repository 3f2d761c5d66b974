use crate::config::OverlayConfig;
use crate::controller::{DragSample, ZoomPanController};
use crate::errors::Result;
use crate::orientation::{OrientationEvent, OrientationMapper, OrientationState, RotationAngle};
use crate::scroll_sync::{ScrollSync, ZoomViewport};
use crate::vector::scaled_to_fit;
use egui::{
    Color32, CornerRadius, Pos2, Rect, Sense, Stroke, TextureHandle, Vec2, pos2, vec2,
};
use std::sync::mpsc::Receiver;

/// How far ahead of the finger the predicted end translation projects,
/// in seconds of current pointer velocity.
const PREDICTION_WINDOW: f32 = 0.25;

/// Convergence rate for the viewport's zoom/offset easing.
const VIEWPORT_ANIM_SPEED: f32 = 15.0;

fn exp_decay(value: &mut f32, target: f32, dt: f32, speed: f32) -> bool {
    let delta = target - *value;
    if delta.abs() < 1e-3 {
        *value = target;
        return false;
    }
    *value += delta * (1.0 - (-speed * dt).exp());
    true
}

fn exp_decay_vec2(value: &mut Vec2, target: Vec2, dt: f32, speed: f32) -> bool {
    let x = exp_decay(&mut value.x, target.x, dt, speed);
    let y = exp_decay(&mut value.y, target.y, dt, speed);
    x || y
}

/// An egui-backed [`ZoomViewport`].
///
/// Scale and offset ease toward their targets each frame; `animated: false`
/// commands snap both immediately (resizes must not animate).
pub struct EguiZoomViewport {
    scale: f32,
    scale_target: f32,
    min_scale: f32,
    max_scale: f32,
    offset: Vec2,
    offset_target: Vec2,
    inset: Vec2,
    image_size: Vec2,
    viewport_size: Vec2,
}

impl EguiZoomViewport {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            scale_target: 1.0,
            min_scale: 1.0,
            max_scale: 1.0,
            offset: Vec2::ZERO,
            offset_target: Vec2::ZERO,
            inset: Vec2::ZERO,
            image_size: Vec2::ZERO,
            viewport_size: Vec2::ZERO,
        }
    }

    pub fn set_image_size(&mut self, size: Vec2) {
        self.image_size = size;
    }

    pub fn set_viewport_size(&mut self, size: Vec2) {
        self.viewport_size = size;
    }

    pub fn inset(&self) -> Vec2 {
        self.inset
    }

    fn max_offset(&self) -> Vec2 {
        (self.image_size * self.scale - self.viewport_size).max(Vec2::ZERO)
    }

    fn clamp_offset(&self, offset: Vec2) -> Vec2 {
        offset.clamp(Vec2::ZERO, self.max_offset())
    }

    /// Pans by a raw drag delta (content follows the finger).
    pub fn pan_by(&mut self, delta: Vec2) {
        let offset = self.clamp_offset(self.offset - delta);
        self.offset = offset;
        self.offset_target = offset;
    }

    /// Applies a pinch factor anchored at `pointer` in viewport coordinates,
    /// keeping the content under the pointer stationary.
    pub fn pinch(&mut self, factor: f32, pointer: Pos2) {
        let old_scale = self.scale;
        let new_scale = (old_scale * factor).clamp(self.min_scale, self.max_scale);
        if new_scale == old_scale {
            return;
        }

        let pointer = pointer.to_vec2();
        let content_point = (pointer + self.offset - self.inset) / old_scale;
        self.scale = new_scale;
        self.scale_target = new_scale;
        let offset = self.clamp_offset(content_point * new_scale - pointer + self.inset);
        self.offset = offset;
        self.offset_target = offset;
    }

    /// Converts a viewport-space position to image-space.
    pub fn to_content(&self, position: Pos2) -> Pos2 {
        ((position.to_vec2() + self.offset - self.inset) / self.scale).to_pos2()
    }

    /// Eases scale and offset toward their targets. Returns true while still
    /// moving, so the caller keeps repainting.
    pub fn animate(&mut self, dt: f32) -> bool {
        let scale_moving = exp_decay(&mut self.scale, self.scale_target, dt, VIEWPORT_ANIM_SPEED);
        let offset_target = self.clamp_offset(self.offset_target);
        let offset_moving = exp_decay_vec2(&mut self.offset, offset_target, dt, VIEWPORT_ANIM_SPEED);
        scale_moving || offset_moving
    }
}

impl Default for EguiZoomViewport {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoomViewport for EguiZoomViewport {
    fn zoom_scale(&self) -> f32 {
        self.scale
    }

    fn set_zoom_scale(&mut self, scale: f32, animated: bool) {
        let scale = scale.clamp(self.min_scale, self.max_scale);
        self.scale_target = scale;
        if !animated {
            self.scale = scale;
        }
    }

    fn zoom_scale_bounds(&self) -> (f32, f32) {
        (self.min_scale, self.max_scale)
    }

    fn set_zoom_scale_bounds(&mut self, min: f32, max: f32) {
        self.min_scale = min;
        self.max_scale = max;
    }

    fn content_offset(&self) -> Vec2 {
        self.offset
    }

    fn set_content_offset(&mut self, offset: Vec2) {
        let offset = self.clamp_offset(offset);
        self.offset = offset;
        self.offset_target = offset;
    }

    fn content_size(&self) -> Vec2 {
        self.image_size * self.scale
    }

    fn viewport_size(&self) -> Vec2 {
        self.viewport_size
    }

    fn set_content_inset(&mut self, inset: Vec2) {
        self.inset = inset;
    }

    fn zoom_to_point(&mut self, point: Pos2, animated: bool) {
        self.scale_target = self.max_scale;
        let target = point.to_vec2() * self.max_scale - self.viewport_size / 2.0;
        self.offset_target = target;
        if !animated {
            self.scale = self.max_scale;
            self.offset = self.clamp_offset(target);
        }
    }
}

/// Fullscreen zoomable image overlay.
///
/// The host owns an `Option<TextureHandle>` binding; the overlay activates
/// while it is `Some` and sets it back to `None` when the image is
/// dismissed, which is also how the host observes dismissal.
pub struct ZoomImageOverlay {
    config: OverlayConfig,
    controller: ZoomPanController,
    scroll_sync: ScrollSync,
    viewport: EguiZoomViewport,
    orientation: OrientationMapper,
    drag_translation: Vec2,
    drag_accepted: bool,
    pinching: bool,
    had_image: bool,
}

impl ZoomImageOverlay {
    pub fn new(config: OverlayConfig, orientation_events: Receiver<OrientationEvent>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            scroll_sync: ScrollSync::new(config.max_zoom_multiplier, config.reduce_motion),
            orientation: OrientationMapper::new(orientation_events, &config.rotation),
            controller: ZoomPanController::new(config.clone()),
            viewport: EguiZoomViewport::new(),
            config,
            drag_translation: Vec2::ZERO,
            drag_accepted: false,
            pinching: false,
            had_image: false,
        })
    }

    pub fn controller(&self) -> &ZoomPanController {
        &self.controller
    }

    pub fn orientation_state(&self) -> OrientationState {
        self.orientation.state()
    }

    /// Renders the overlay and processes input for this frame.
    pub fn show(&mut self, ctx: &egui::Context, image: &mut Option<TextureHandle>) {
        let now = ctx.input(|i| i.time);

        self.orientation.poll();
        let orientation = self.orientation.state();

        let screen = ctx.screen_rect();
        let frame_size = if orientation.swap_dimensions {
            vec2(screen.height(), screen.width())
        } else {
            screen.size()
        };
        self.controller.set_frame_size(frame_size);
        self.viewport.set_viewport_size(frame_size);

        match (self.had_image, image.is_some()) {
            (false, true) => {
                let texture = image.as_ref().unwrap();
                self.controller.on_image_assigned(now);
                self.scroll_sync.set_image_size(texture.size_vec2());
                self.viewport = EguiZoomViewport::new();
                self.viewport.set_image_size(texture.size_vec2());
                self.viewport.set_viewport_size(frame_size);
                self.orientation.reapply();
            }
            (true, false) => self.controller.on_image_cleared(),
            _ => {}
        }
        self.had_image = image.is_some();

        let Some(texture) = image.clone() else {
            return;
        };

        // Reconcile the viewport with the declared zoom state before
        // painting. Skipped while a pinch is live: the viewport owns the
        // scale until the gesture ends and reports back.
        if !self.pinching {
            if let Err(err) = self
                .scroll_sync
                .sync(&mut self.viewport, self.controller.zoom_state())
            {
                log::error!("viewport sync failed: {err}");
            }
        }
        let dt = ctx.input(|i| i.stable_dt).min(0.1);
        let viewport_moving = self.viewport.animate(dt);

        egui::Area::new(egui::Id::new("zoomview_overlay"))
            .order(egui::Order::Foreground)
            .fixed_pos(Pos2::ZERO)
            .show(ctx, |ui| {
                let (response, painter) =
                    ui.allocate_painter(screen.size(), Sense::click_and_drag());

                self.handle_input(ui, &response, frame_size, now);
                let snapshot = self.controller.tick(now);

                // Backdrop, oversized so rotation never exposes the host.
                painter.rect_filled(
                    screen.expand(screen.width().max(screen.height())),
                    CornerRadius::ZERO,
                    Color32::BLACK.gamma_multiply(snapshot.background_opacity),
                );

                let image_rect = Rect::from_min_size(
                    screen.min + self.viewport.inset() - self.viewport.content_offset()
                        + snapshot.offset,
                    self.viewport.content_size(),
                );
                paint_rotated_image(
                    &painter,
                    &texture,
                    image_rect,
                    screen.center(),
                    orientation.rotation,
                    Color32::WHITE.gamma_multiply(snapshot.image_opacity),
                );

                self.show_close_button(ui, &painter, screen, snapshot.close_button_opacity, now);
            });

        if self.controller.take_clear_request() {
            *image = None;
            self.controller.on_image_cleared();
            self.had_image = false;
        }

        if self.controller.is_animating() || viewport_moving {
            ctx.request_repaint();
        }
    }

    fn handle_input(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        frame_size: Vec2,
        now: f64,
    ) {
        // Input is blocked while a dismissal or close is in flight, but an
        // in-progress drag keeps feeding samples until it releases.
        if !self.controller.snapshot().is_interactive && !self.controller.is_dragging() {
            return;
        }

        // Double tap toggles between fit and full zoom.
        if response.double_clicked() {
            if let Some(pointer) = response.interact_pointer_pos() {
                self.controller.on_double_tap(self.viewport.to_content(pointer));
            }
        }

        // Pinch zoom, anchored at the pointer.
        let zoom_delta = ui.input(|i| i.zoom_delta());
        if zoom_delta != 1.0 {
            let pointer = ui
                .input(|i| i.pointer.hover_pos())
                .unwrap_or_else(|| (frame_size / 2.0).to_pos2());
            self.viewport.pinch(zoom_delta, pointer);
            self.scroll_sync.on_zoom_progress(&mut self.viewport);
            self.pinching = true;
        } else if self.pinching {
            self.pinching = false;
            let state = self
                .scroll_sync
                .on_zoom_ended(&self.viewport, self.viewport.zoom_scale());
            self.controller.set_zoom_state(state);
        }

        // Drags either pan the zoomed content or, at fit scale, feed the
        // dismiss gesture.
        if response.drag_started() {
            self.drag_translation = Vec2::ZERO;
            self.drag_accepted = self.drag_hits_image(response, frame_size);
        }

        if response.dragged() && self.drag_accepted {
            if self.controller.zoom_state().is_min() {
                self.drag_translation += response.drag_delta();
                let velocity = ui.input(|i| i.pointer.velocity());
                self.controller.on_drag_changed(
                    DragSample {
                        translation: self.drag_translation,
                        predicted_end_translation: self.drag_translation
                            + velocity * PREDICTION_WINDOW,
                        velocity: Some(velocity),
                    },
                    now,
                );
            } else {
                self.viewport.pan_by(response.drag_delta());
            }
        }

        if response.drag_stopped() {
            self.drag_accepted = false;
            self.controller.on_drag_ended(now);
        }
    }

    /// At fit scale only the letterboxed image itself accepts the dismiss
    /// drag; presses in the surrounding padding are ignored.
    fn drag_hits_image(&self, response: &egui::Response, frame_size: Vec2) -> bool {
        if !self.controller.zoom_state().is_min() {
            return true;
        }
        let Some(press) = response.interact_pointer_pos() else {
            return false;
        };
        match scaled_to_fit(self.scroll_sync.image_size(), frame_size) {
            Ok(fitted) => {
                Rect::from_center_size(response.rect.center(), fitted).contains(press)
            }
            Err(_) => false,
        }
    }

    fn show_close_button(
        &mut self,
        ui: &egui::Ui,
        painter: &egui::Painter,
        screen: Rect,
        opacity: f32,
        now: f64,
    ) {
        let style = &self.config.close_button;
        let rect = Rect::from_min_size(
            screen.min + vec2(style.padding, style.padding),
            Vec2::splat(style.size),
        );

        let color = style.color.gamma_multiply(opacity);
        let stroke = Stroke::new(2.0, color);
        let glyph = rect.shrink(style.size * 0.2);
        painter.line_segment([glyph.left_top(), glyph.right_bottom()], stroke);
        painter.line_segment([glyph.right_top(), glyph.left_bottom()], stroke);

        let response = ui.interact(
            rect.expand(style.padding),
            egui::Id::new("zoomview_close"),
            Sense::click(),
        );
        if response.clicked() && opacity > 0.0 {
            self.controller.request_close(now);
        }
    }
}

/// Paints the image, rotated around `pivot` when the orientation helper
/// asks for it (mesh path mirrors the unrotated texture quad).
fn paint_rotated_image(
    painter: &egui::Painter,
    texture: &TextureHandle,
    rect: Rect,
    pivot: Pos2,
    rotation: RotationAngle,
    tint: Color32,
) {
    let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
    if rotation == RotationAngle::Zero {
        painter.image(texture.id(), rect, uv, tint);
        return;
    }

    let angle = rotation.radians();
    let cos_a = angle.cos();
    let sin_a = angle.sin();
    let rotate_point = |p: Pos2| -> Pos2 {
        let dx = p.x - pivot.x;
        let dy = p.y - pivot.y;
        pos2(pivot.x + dx * cos_a - dy * sin_a, pivot.y + dx * sin_a + dy * cos_a)
    };

    let corners = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
    ];
    let uvs = [
        uv.left_top(),
        uv.right_top(),
        uv.right_bottom(),
        uv.left_bottom(),
    ];

    let mut mesh = egui::Mesh::with_texture(texture.id());
    for (corner, uv) in corners.iter().zip(uvs) {
        mesh.vertices.push(egui::epaint::Vertex {
            pos: rotate_point(*corner),
            uv,
            color: tint,
        });
    }
    mesh.indices = vec![0, 1, 2, 0, 2, 3];
    painter.add(mesh);
}
