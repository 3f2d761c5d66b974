use crate::errors::{Result, ViewerError};
use crate::orientation::Orientation;
use egui::Color32;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    // Zoom behavior
    /// Maximum zoom scale as a multiple of the fit scale
    pub max_zoom_multiplier: f32,

    // Dismiss gesture
    /// Minimum predicted drag distance that commits to closing the overlay
    pub dismiss_threshold: f32,
    /// Background opacity when the drag reaches the dismiss threshold
    pub opacity_at_dismiss_threshold: f32,

    // Animation
    /// Base duration of the fade/fly animations, in seconds
    pub animation_speed: f32,
    /// Suppresses zoom animations (accessibility: reduced motion)
    pub reduce_motion: bool,

    // Appearance
    pub close_button: CloseButtonStyle,

    // Rotation helper
    pub rotation: RotationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseButtonStyle {
    pub color: Color32,
    pub size: f32,
    pub padding: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    pub enabled: bool,
    /// Orientations the content is allowed to rotate to. Portrait is always
    /// included even when absent from this list.
    pub allowed: Vec<Orientation>,
    /// Orientations the host itself supports
    pub supported: Vec<Orientation>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            max_zoom_multiplier: 2.0,
            dismiss_threshold: 200.0,
            opacity_at_dismiss_threshold: 0.8,
            animation_speed: 0.4,
            reduce_motion: false,
            close_button: CloseButtonStyle::default(),
            rotation: RotationConfig::default(),
        }
    }
}

impl Default for CloseButtonStyle {
    fn default() -> Self {
        Self {
            color: Color32::WHITE,
            size: 20.0,
            padding: 10.0,
        }
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed: vec![
                Orientation::Portrait,
                Orientation::LandscapeLeft,
                Orientation::LandscapeRight,
            ],
            supported: vec![
                Orientation::Portrait,
                Orientation::PortraitUpsideDown,
                Orientation::LandscapeLeft,
                Orientation::LandscapeRight,
            ],
        }
    }
}

impl OverlayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dismiss_threshold <= 0.0 {
            return Err(ViewerError::InvalidConfig {
                message: format!("dismiss_threshold must be positive, got {}", self.dismiss_threshold),
            });
        }
        if self.animation_speed <= 0.0 {
            return Err(ViewerError::InvalidConfig {
                message: format!("animation_speed must be positive, got {}", self.animation_speed),
            });
        }
        if self.max_zoom_multiplier < 1.0 {
            return Err(ViewerError::InvalidConfig {
                message: format!(
                    "max_zoom_multiplier must be at least 1.0, got {}",
                    self.max_zoom_multiplier
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.opacity_at_dismiss_threshold) {
            return Err(ViewerError::InvalidConfig {
                message: format!(
                    "opacity_at_dismiss_threshold must be within 0..=1, got {}",
                    self.opacity_at_dismiss_threshold
                ),
            });
        }
        Ok(())
    }
}
