use crate::errors::{Result, ViewerError};
use egui::Vec2;

/// Vector helpers for gesture and layout math on top of `egui::Vec2`.
///
/// `Vec2` already covers negation, addition, subtraction and scalar
/// multiply/divide; this trait adds the fallible and comparative operations
/// the dismiss physics needs. Normalizing a zero-length vector is an error
/// rather than a NaN, since a NaN offset would visibly corrupt layout.
pub trait VecExt: Sized {
    fn magnitude(&self) -> f32;
    fn try_normalized(&self) -> Result<Self>;
    fn longer(self, other: Self) -> Self;
    fn try_aspect_ratio(&self) -> Result<f32>;
}

impl VecExt for Vec2 {
    fn magnitude(&self) -> f32 {
        self.length()
    }

    fn try_normalized(&self) -> Result<Self> {
        let magnitude = self.length();
        if magnitude == 0.0 {
            return Err(ViewerError::ZeroVector);
        }
        Ok(*self / magnitude)
    }

    /// The longer of two vectors, compared by magnitude. Ties keep `self`.
    fn longer(self, other: Self) -> Self {
        if other.length() > self.length() {
            other
        } else {
            self
        }
    }

    fn try_aspect_ratio(&self) -> Result<f32> {
        if self.x == 0.0 || self.y == 0.0 {
            return Err(ViewerError::DegenerateSize {
                width: self.x,
                height: self.y,
            });
        }
        Ok(self.x / self.y)
    }
}

/// The zoom scale at which `content` exactly fills `viewport` on its
/// constraining axis (letterbox/pillarbox boundary).
pub fn fit_scale(content: Vec2, viewport: Vec2) -> Result<f32> {
    let content_aspect = content.try_aspect_ratio()?;
    let viewport_aspect = viewport.try_aspect_ratio()?;

    if content_aspect > viewport_aspect {
        Ok(viewport.x / content.x)
    } else {
        Ok(viewport.y / content.y)
    }
}

/// `size` scaled (up or down) to fit inside `bounds` while keeping its
/// aspect ratio.
pub fn scaled_to_fit(size: Vec2, bounds: Vec2) -> Result<Vec2> {
    Ok(size * fit_scale(size, bounds)?)
}
