use crate::anim::{Animated, Curve, Tween};
use crate::config::{OverlayConfig, RotationConfig};
use crate::controller::{DragSample, ZoomPanController, ZoomState};
use crate::errors::ViewerError;
use crate::orientation::{
    rotation_angle, swap_dimensions, Orientation, OrientationEvent, OrientationMapper,
    OrientationReading, RotationAngle,
};
use crate::scroll_sync::{ScrollSync, ZoomViewport};
use crate::vector::{fit_scale, scaled_to_fit, VecExt};
use egui::{pos2, vec2, Pos2, Vec2};
use std::sync::mpsc::channel;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

// ---- vector math ----

#[test]
fn normalized_vectors_have_unit_magnitude_and_same_direction() {
    for v in [
        vec2(3.0, 4.0),
        vec2(-120.0, 5.0),
        vec2(0.001, -0.002),
        vec2(1000.0, 1000.0),
    ] {
        let n = v.try_normalized().unwrap();
        assert!(approx(n.magnitude(), 1.0), "magnitude of {n:?}");
        assert!(n.dot(v) > 0.0, "direction of {n:?}");
    }
}

#[test]
fn normalizing_zero_vector_is_an_error() {
    assert_eq!(Vec2::ZERO.try_normalized(), Err(ViewerError::ZeroVector));
}

#[test]
fn vector_addition_with_negation_cancels() {
    let v = vec2(17.5, -3.25);
    assert_eq!(v + (-v), Vec2::ZERO);
    assert_eq!(Vec2::ZERO.magnitude(), 0.0);
}

#[test]
fn longer_picks_by_magnitude() {
    let short = vec2(1.0, 1.0);
    let long = vec2(-10.0, 0.0);
    assert_eq!(short.longer(long), long);
    assert_eq!(long.longer(short), long);
}

#[test]
fn fit_scale_uses_constraining_axis() {
    // image aspect 2.0 > viewport aspect 1.0, so width constrains
    let scale = fit_scale(vec2(400.0, 200.0), vec2(300.0, 300.0)).unwrap();
    assert!(approx(scale, 0.75));

    // tall image, height constrains
    let scale = fit_scale(vec2(100.0, 400.0), vec2(300.0, 300.0)).unwrap();
    assert!(approx(scale, 0.75));
}

#[test]
fn fit_scale_rejects_degenerate_sizes() {
    assert!(fit_scale(vec2(0.0, 200.0), vec2(300.0, 300.0)).is_err());
    assert!(fit_scale(vec2(400.0, 200.0), vec2(300.0, 0.0)).is_err());
}

#[test]
fn scaled_to_fit_letterboxes() {
    let fitted = scaled_to_fit(vec2(400.0, 200.0), vec2(300.0, 300.0)).unwrap();
    assert!(approx(fitted.x, 300.0));
    assert!(approx(fitted.y, 150.0));
}

// ---- animation ----

#[test]
fn linear_tween_interpolates_and_snaps_to_target() {
    let tween = Tween::new(0.0_f32, 10.0, 1.0, 0.4, Curve::Linear);
    assert!(approx(tween.value_at(1.0), 0.0));
    assert!(approx(tween.value_at(1.2), 5.0));
    assert!(tween.finished(1.41));
    assert!(approx(tween.value_at(2.0), 10.0));
}

#[test]
fn delayed_tween_holds_initial_value() {
    let tween = Tween::new(1.0_f32, 0.0, 1.0, 0.2, Curve::Linear).with_delay(0.2);
    assert!(approx(tween.value_at(1.1), 1.0));
    assert!(approx(tween.value_at(1.3), 0.5));
    assert!(tween.finished(1.41));
}

#[test]
fn spring_starts_at_origin_and_settles_at_target() {
    for curve in [
        Curve::default_spring(),
        Curve::Spring {
            initial_velocity: 3.0,
        },
    ] {
        let tween = Tween::new(0.0_f32, 600.0, 0.0, 0.4, curve);
        assert!(approx(tween.value_at(0.0), 0.0));
        let mid = tween.value_at(0.2);
        assert!(mid > 0.0 && mid <= 600.0, "mid value {mid}");
        assert!(approx(tween.value_at(0.45), 600.0));
    }
}

#[test]
fn animated_value_last_write_wins() {
    let mut value = Animated::new(0.0_f32);
    value.animate(Tween::new(0.0, 1.0, 0.0, 1.0, Curve::Linear));
    value.tick(0.5);
    assert!(value.is_animating());

    // A direct set supersedes the running tween
    value.set(0.25);
    assert!(!value.is_animating());
    assert!(approx(value.tick(2.0), 0.25));
}

// ---- controller ----

fn assigned_controller() -> ZoomPanController {
    let mut controller = ZoomPanController::new(OverlayConfig::default());
    controller.set_frame_size(vec2(400.0, 300.0));
    controller.on_image_assigned(0.0);
    // run past the appear animations
    controller.tick(0.9);
    controller
}

fn drag(controller: &mut ZoomPanController, predicted: Vec2, velocity: Option<Vec2>, now: f64) {
    controller.on_drag_changed(
        DragSample {
            translation: predicted * 0.8,
            predicted_end_translation: predicted,
            velocity,
        },
        now,
    );
}

#[test]
fn appear_animation_fades_image_then_close_button() {
    let mut controller = ZoomPanController::new(OverlayConfig::default());
    controller.on_image_assigned(0.0);

    let early = controller.tick(0.2);
    assert!(approx(early.background_opacity, 1.0));
    assert!(early.image_opacity > 0.0 && early.image_opacity < 1.0);
    assert!(approx(early.close_button_opacity, 0.0));

    let settled = controller.tick(0.9);
    assert!(approx(settled.image_opacity, 1.0));
    assert!(approx(settled.close_button_opacity, 1.0));
    assert!(controller.is_visible());
}

#[test]
fn drag_below_threshold_cancels() {
    let mut controller = assigned_controller();

    drag(&mut controller, vec2(199.0, 0.0), Some(vec2(50.0, 0.0)), 1.0);
    let mid = controller.tick(1.0);
    assert!(!mid.is_interactive);
    controller.on_drag_ended(1.0);

    let settled = controller.tick(1.5);
    assert_eq!(settled.offset, Vec2::ZERO);
    assert!(approx(settled.background_opacity, 1.0));
    assert!(settled.is_interactive);
    assert!(!controller.take_clear_request());
}

#[test]
fn drag_beyond_threshold_dismisses() {
    let mut controller = assigned_controller();

    drag(&mut controller, vec2(201.0, 0.0), Some(vec2(800.0, 0.0)), 1.0);
    controller.on_drag_ended(1.0);

    // Flight distance is 1.5 x the longer frame edge = 600
    let flown = controller.tick(1.45);
    assert!(approx(flown.offset.x, 600.0));
    assert!(approx(flown.offset.y, 0.0));
    assert!(approx(flown.background_opacity, 0.0));
    assert!(approx(flown.image_opacity, 0.0));

    // The clear fires at ~0.5s after release, not before
    assert!(!controller.take_clear_request());
    controller.tick(1.51);
    assert!(controller.take_clear_request());
}

#[test]
fn dismissal_without_velocity_flies_the_longer_translation() {
    let mut controller = ZoomPanController::new(OverlayConfig::default());
    controller.set_frame_size(vec2(100.0, 100.0));
    controller.on_image_assigned(0.0);
    controller.tick(0.9);

    // Prediction (300) is longer than 1.5 x frame edge (150)
    drag(&mut controller, vec2(300.0, 0.0), None, 1.0);
    controller.on_drag_ended(1.0);

    let settled = controller.tick(1.45);
    assert!(approx(settled.offset.x, 300.0));
}

#[test]
fn dismissal_stages_fire_in_order() {
    let mut controller = assigned_controller();
    drag(&mut controller, vec2(0.0, 250.0), Some(vec2(0.0, 900.0)), 1.0);
    controller.on_drag_ended(1.0);

    // Close button is gone before the image starts fading at t+0.2
    let early = controller.tick(1.21);
    assert!(approx(early.close_button_opacity, 0.0));
    assert!(early.image_opacity > 0.9);
    assert!(early.background_opacity < 1.0);

    // Background and image are fully out at t+0.4, clear not yet fired
    let faded = controller.tick(1.45);
    assert!(approx(faded.background_opacity, 0.0));
    assert!(approx(faded.image_opacity, 0.0));
    assert!(!controller.take_clear_request());

    controller.tick(1.55);
    assert!(controller.take_clear_request());
}

#[test]
fn drag_fades_background_toward_threshold_opacity() {
    let mut controller = assigned_controller();

    controller.on_drag_changed(
        DragSample {
            translation: vec2(100.0, 0.0),
            predicted_end_translation: vec2(100.0, 0.0),
            velocity: None,
        },
        1.0,
    );
    // 1 - (100 / 200) * (1 - 0.8)
    let snapshot = controller.tick(1.0);
    assert!(approx(snapshot.background_opacity, 0.9));
    assert_eq!(snapshot.offset, vec2(100.0, 0.0));
}

#[test]
fn drag_is_ignored_outside_min_zoom() {
    let mut controller = assigned_controller();
    controller.set_zoom_state(ZoomState::Max { center: None });

    drag(&mut controller, vec2(300.0, 0.0), None, 1.0);
    controller.on_drag_ended(1.0);

    let snapshot = controller.tick(1.5);
    assert_eq!(snapshot.offset, Vec2::ZERO);
    assert!(!controller.take_clear_request());
}

#[test]
fn double_tap_toggles_zoom_state() {
    let mut controller = assigned_controller();
    assert_eq!(controller.zoom_state(), ZoomState::Min);

    controller.on_double_tap(pos2(120.0, 80.0));
    assert_eq!(
        controller.zoom_state(),
        ZoomState::Max {
            center: Some(pos2(120.0, 80.0))
        }
    );

    // Back to min regardless of the stored center
    controller.on_double_tap(pos2(10.0, 10.0));
    assert_eq!(controller.zoom_state(), ZoomState::Min);

    // Partial also zooms in
    controller.set_zoom_state(ZoomState::Partial);
    controller.on_double_tap(pos2(5.0, 5.0));
    assert!(controller.zoom_state().is_max());
}

#[test]
fn reassignment_cancels_pending_dismissal() {
    let mut controller = assigned_controller();
    drag(&mut controller, vec2(400.0, 0.0), Some(vec2(900.0, 0.0)), 1.0);
    controller.on_drag_ended(1.0);
    controller.tick(1.2);

    // A new image arrives while the old dismissal is mid-flight
    controller.on_image_assigned(1.3);

    let snapshot = controller.tick(2.0);
    assert!(!controller.take_clear_request());
    assert_eq!(snapshot.offset, Vec2::ZERO);
    assert!(approx(snapshot.background_opacity, 1.0));
    assert!(approx(snapshot.image_opacity, 1.0));
    assert!(controller.is_visible());
}

#[test]
fn clearing_resets_everything_without_animation() {
    let mut controller = assigned_controller();
    controller.on_image_cleared();

    let snapshot = controller.tick(1.0);
    assert!(!controller.is_visible());
    assert!(approx(snapshot.background_opacity, 0.0));
    assert!(approx(snapshot.image_opacity, 0.0));
    assert!(approx(snapshot.close_button_opacity, 0.0));
}

#[test]
fn close_request_fades_and_clears() {
    let mut controller = assigned_controller();
    controller.request_close(1.0);

    controller.tick(1.39);
    assert!(!controller.take_clear_request());

    let snapshot = controller.tick(1.41);
    assert!(approx(snapshot.background_opacity, 0.0));
    assert!(controller.take_clear_request());
}

// ---- scroll sync ----

struct MockViewport {
    scale: f32,
    min_scale: f32,
    max_scale: f32,
    offset: Vec2,
    inset: Vec2,
    image_size: Vec2,
    viewport_size: Vec2,
    zoomed_to: Option<(Pos2, bool)>,
    last_scale_animated: Option<bool>,
}

impl MockViewport {
    fn new(image_size: Vec2, viewport_size: Vec2) -> Self {
        Self {
            scale: 1.0,
            min_scale: 1.0,
            max_scale: 1.0,
            offset: Vec2::ZERO,
            inset: Vec2::ZERO,
            image_size,
            viewport_size,
            zoomed_to: None,
            last_scale_animated: None,
        }
    }
}

impl ZoomViewport for MockViewport {
    fn zoom_scale(&self) -> f32 {
        self.scale
    }

    fn set_zoom_scale(&mut self, scale: f32, animated: bool) {
        self.scale = scale;
        self.last_scale_animated = Some(animated);
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
        self.offset = offset;
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
        self.scale = self.max_scale;
        self.zoomed_to = Some((point, animated));
    }
}

fn synced_sync_and_viewport() -> (ScrollSync, MockViewport) {
    let mut sync = ScrollSync::new(2.0, false);
    sync.set_image_size(vec2(400.0, 200.0));
    let mut viewport = MockViewport::new(vec2(400.0, 200.0), vec2(300.0, 300.0));
    sync.sync(&mut viewport, ZoomState::Min).unwrap();
    (sync, viewport)
}

#[test]
fn min_zoom_scale_matches_fit() {
    let mut sync = ScrollSync::new(2.0, false);
    sync.set_image_size(vec2(400.0, 200.0));
    assert!(approx(sync.min_zoom_scale(vec2(300.0, 300.0)).unwrap(), 0.75));
    assert!(approx(sync.max_zoom_scale(vec2(300.0, 300.0)).unwrap(), 1.5));
}

#[test]
fn resize_snaps_scale_without_animation() {
    let (_, viewport) = synced_sync_and_viewport();
    assert!(approx(viewport.min_scale, 0.75));
    assert!(approx(viewport.max_scale, 1.5));
    assert!(approx(viewport.scale, 0.75));
    assert_eq!(viewport.last_scale_animated, Some(false));
    // fit-scale content is centered by inset: 300x150 inside 300x300
    assert!(approx(viewport.inset.y, 75.0));
    assert!(approx(viewport.inset.x, 0.0));
}

#[test]
fn resize_at_max_snaps_to_maximum() {
    let mut sync = ScrollSync::new(2.0, false);
    sync.set_image_size(vec2(400.0, 200.0));
    let mut viewport = MockViewport::new(vec2(400.0, 200.0), vec2(300.0, 300.0));
    sync.sync(&mut viewport, ZoomState::Max { center: None }).unwrap();
    assert!(approx(viewport.scale, 1.5));
    assert_eq!(viewport.last_scale_animated, Some(false));
}

#[test]
fn steady_state_animates_back_to_min() {
    let (mut sync, mut viewport) = synced_sync_and_viewport();
    viewport.scale = 1.2;
    viewport.last_scale_animated = None;

    sync.sync(&mut viewport, ZoomState::Min).unwrap();
    assert!(approx(viewport.scale, 0.75));
    assert_eq!(viewport.last_scale_animated, Some(true));
}

#[test]
fn steady_state_zooms_to_recorded_center() {
    let (mut sync, mut viewport) = synced_sync_and_viewport();

    let center = pos2(100.0, 50.0);
    sync.sync(&mut viewport, ZoomState::Max { center: Some(center) })
        .unwrap();
    assert_eq!(viewport.zoomed_to, Some((center, true)));
}

#[test]
fn returning_to_max_without_center_does_not_recenter() {
    let (mut sync, mut viewport) = synced_sync_and_viewport();

    sync.sync(&mut viewport, ZoomState::Max { center: None }).unwrap();
    assert_eq!(viewport.zoomed_to, None);
}

#[test]
fn reduced_motion_suppresses_zoom_animation() {
    let mut sync = ScrollSync::new(2.0, true);
    sync.set_image_size(vec2(400.0, 200.0));
    let mut viewport = MockViewport::new(vec2(400.0, 200.0), vec2(300.0, 300.0));
    sync.sync(&mut viewport, ZoomState::Min).unwrap();

    viewport.scale = 1.2;
    viewport.last_scale_animated = None;
    sync.sync(&mut viewport, ZoomState::Min).unwrap();
    assert_eq!(viewport.last_scale_animated, Some(false));
}

#[test]
fn zoom_end_classifies_state_from_scale() {
    let (sync, viewport) = synced_sync_and_viewport();

    assert_eq!(sync.on_zoom_ended(&viewport, 0.75), ZoomState::Min);
    assert_eq!(
        sync.on_zoom_ended(&viewport, 1.5),
        ZoomState::Max { center: None }
    );
    assert_eq!(sync.on_zoom_ended(&viewport, 1.1), ZoomState::Partial);
}

#[test]
fn degenerate_viewport_is_a_contained_error() {
    let mut sync = ScrollSync::new(2.0, false);
    sync.set_image_size(vec2(400.0, 200.0));
    let mut viewport = MockViewport::new(vec2(400.0, 200.0), vec2(300.0, 0.0));
    assert!(sync.sync(&mut viewport, ZoomState::Min).is_err());
}

// ---- orientation ----

fn mapper_with(
    allowed: Vec<Orientation>,
    supported: Vec<Orientation>,
) -> (std::sync::mpsc::Sender<OrientationEvent>, OrientationMapper) {
    let (tx, rx) = channel();
    let config = RotationConfig {
        enabled: true,
        allowed,
        supported,
    };
    (tx, OrientationMapper::new(rx, &config))
}

#[test]
fn content_orientation_is_sticky_outside_allowed_set() {
    let (tx, mut mapper) = mapper_with(
        vec![Orientation::Portrait, Orientation::LandscapeLeft],
        RotationConfig::default().supported,
    );

    tx.send(OrientationEvent::OrientationChanged(
        OrientationReading::LandscapeRight,
    ))
    .unwrap();
    mapper.poll();
    assert_eq!(mapper.content_orientation(), Orientation::Portrait);
    // the device itself did rotate
    assert_eq!(mapper.device_orientation(), Orientation::LandscapeRight);

    tx.send(OrientationEvent::OrientationChanged(
        OrientationReading::LandscapeLeft,
    ))
    .unwrap();
    mapper.poll();
    assert_eq!(mapper.content_orientation(), Orientation::LandscapeLeft);
}

#[test]
fn transient_readings_are_ignored() {
    let (tx, mut mapper) = mapper_with(
        RotationConfig::default().allowed,
        RotationConfig::default().supported,
    );

    for reading in [
        OrientationReading::Unknown,
        OrientationReading::FaceUp,
        OrientationReading::FaceDown,
    ] {
        tx.send(OrientationEvent::OrientationChanged(reading)).unwrap();
    }
    mapper.poll();

    assert_eq!(mapper.device_orientation(), Orientation::Portrait);
    assert_eq!(mapper.content_orientation(), Orientation::Portrait);
}

#[test]
fn unsupported_device_orientation_does_not_update_device() {
    let (tx, mut mapper) = mapper_with(
        vec![Orientation::Portrait, Orientation::LandscapeLeft],
        vec![Orientation::Portrait],
    );

    tx.send(OrientationEvent::OrientationChanged(
        OrientationReading::LandscapeLeft,
    ))
    .unwrap();
    mapper.poll();

    assert_eq!(mapper.device_orientation(), Orientation::Portrait);
    assert_eq!(mapper.content_orientation(), Orientation::LandscapeLeft);
}

#[test]
fn foreground_event_reapplies_last_reading() {
    let (tx, mut mapper) = mapper_with(
        vec![Orientation::LandscapeLeft],
        RotationConfig::default().supported,
    );

    tx.send(OrientationEvent::OrientationChanged(
        OrientationReading::LandscapeLeft,
    ))
    .unwrap();
    tx.send(OrientationEvent::WillEnterForeground).unwrap();
    mapper.poll();
    assert_eq!(mapper.content_orientation(), Orientation::LandscapeLeft);
}

#[test]
fn rotation_angles_follow_the_clockwise_cycle() {
    use Orientation::*;

    assert_eq!(rotation_angle(Portrait, Portrait), RotationAngle::Zero);
    assert_eq!(rotation_angle(Portrait, LandscapeLeft), RotationAngle::Clockwise90);
    assert_eq!(
        rotation_angle(Portrait, LandscapeRight),
        RotationAngle::CounterClockwise90
    );
    assert_eq!(rotation_angle(Portrait, PortraitUpsideDown), RotationAngle::Half);

    // cyclic from a landscape starting point too
    assert_eq!(
        rotation_angle(LandscapeLeft, PortraitUpsideDown),
        RotationAngle::Clockwise90
    );
    assert_eq!(
        rotation_angle(LandscapeLeft, Portrait),
        RotationAngle::CounterClockwise90
    );
    assert_eq!(
        rotation_angle(LandscapeLeft, LandscapeRight),
        RotationAngle::Half
    );

    assert!(approx(RotationAngle::CounterClockwise90.degrees(), -90.0));
    assert!(approx(RotationAngle::Half.degrees(), 180.0));
}

#[test]
fn dimension_swap_table_is_asymmetric() {
    use Orientation::*;

    assert!(swap_dimensions(Portrait, LandscapeLeft));
    assert!(swap_dimensions(Portrait, LandscapeRight));
    assert!(swap_dimensions(PortraitUpsideDown, LandscapeLeft));

    // the reverse pairing deliberately stays false
    assert!(!swap_dimensions(LandscapeLeft, Portrait));
    assert!(!swap_dimensions(LandscapeRight, PortraitUpsideDown));
    assert!(!swap_dimensions(Portrait, Portrait));
}

#[test]
fn disabled_rotation_helper_reports_no_rotation() {
    let (tx, rx) = channel();
    let config = RotationConfig {
        enabled: false,
        ..RotationConfig::default()
    };
    let mut mapper = OrientationMapper::new(rx, &config);

    tx.send(OrientationEvent::OrientationChanged(
        OrientationReading::LandscapeLeft,
    ))
    .unwrap();
    mapper.poll();

    let state = mapper.state();
    assert_eq!(state.rotation, RotationAngle::Zero);
    assert!(!state.swap_dimensions);
}

// ---- configuration ----

#[test]
fn default_config_is_valid() {
    let config = OverlayConfig::default();
    assert!(config.validate().is_ok());
    assert!(approx(config.max_zoom_multiplier, 2.0));
    assert!(approx(config.dismiss_threshold, 200.0));
    assert!(approx(config.animation_speed, 0.4));
}

#[test]
fn config_validation_rejects_bad_values() {
    let mut config = OverlayConfig::default();
    config.dismiss_threshold = 0.0;
    assert!(config.validate().is_err());

    let mut config = OverlayConfig::default();
    config.max_zoom_multiplier = 0.5;
    assert!(config.validate().is_err());

    let mut config = OverlayConfig::default();
    config.opacity_at_dismiss_threshold = 1.5;
    assert!(config.validate().is_err());
}

#[test]
fn config_round_trips_through_json() {
    let config = OverlayConfig {
        dismiss_threshold: 250.0,
        ..OverlayConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let parsed: OverlayConfig = serde_json::from_str(&json).unwrap();
    assert!(approx(parsed.dismiss_threshold, 250.0));
    assert_eq!(parsed.rotation.allowed, config.rotation.allowed);
}
