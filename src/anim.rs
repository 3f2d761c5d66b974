use egui::Vec2;

/// Easing curves for property tweens.
///
/// All timing is keyed to an explicit `now` in seconds (egui's input clock),
/// so the curves stay deterministic under test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Linear,
    EaseIn,
    EaseOut,
    /// Critically damped spring. `initial_velocity` is normalized to the
    /// animated distance (fraction of the distance per second), which keeps
    /// the perceived speed consistent regardless of how far the value flies.
    Spring { initial_velocity: f32 },
}

impl Curve {
    pub fn default_spring() -> Self {
        Curve::Spring {
            initial_velocity: 0.0,
        }
    }

    /// Eased progress for normalized time `u` in [0, 1].
    fn apply(&self, u: f32, duration: f32) -> f32 {
        match *self {
            Curve::Linear => u,
            Curve::EaseIn => u * u,
            Curve::EaseOut => 1.0 - (1.0 - u) * (1.0 - u),
            Curve::Spring { initial_velocity } => {
                // Closed-form critically damped oscillator from 0 to 1.
                // DECAY is per normalized time unit; e^-6 leaves <0.3% residual
                // at u = 1, which the finished() snap absorbs.
                const DECAY: f32 = 6.0;
                let v0 = initial_velocity * duration;
                let x = 1.0 - (-DECAY * u).exp() * (1.0 + (DECAY - v0) * u);
                x.clamp(0.0, 1.0)
            }
        }
    }
}

pub trait Lerp: Copy {
    fn lerp(from: Self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(from: Self, to: Self, t: f32) -> Self {
        from + (to - from) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(from: Self, to: Self, t: f32) -> Self {
        from + (to - from) * t
    }
}

/// A single property tween between two values.
#[derive(Debug, Clone, Copy)]
pub struct Tween<T: Lerp> {
    from: T,
    to: T,
    start: f64,
    duration: f32,
    curve: Curve,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, now: f64, duration: f32, curve: Curve) -> Self {
        Self {
            from,
            to,
            start: now,
            duration: duration.max(0.0),
            curve,
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.start += delay.max(0.0) as f64;
        self
    }

    pub fn target(&self) -> T {
        self.to
    }

    pub fn value_at(&self, now: f64) -> T {
        if now <= self.start {
            return self.from;
        }
        if self.duration == 0.0 || self.finished(now) {
            return self.to;
        }
        let u = ((now - self.start) as f32 / self.duration).clamp(0.0, 1.0);
        T::lerp(self.from, self.to, self.curve.apply(u, self.duration))
    }

    pub fn finished(&self, now: f64) -> bool {
        now >= self.start + self.duration as f64
    }
}

/// A value that can either be set directly or driven by a tween.
///
/// Starting a new tween (or a direct set) supersedes whatever was running:
/// last write wins, there is no animation queue.
#[derive(Debug, Clone, Copy)]
pub struct Animated<T: Lerp> {
    value: T,
    tween: Option<Tween<T>>,
}

impl<T: Lerp> Animated<T> {
    pub fn new(value: T) -> Self {
        Self { value, tween: None }
    }

    pub fn get(&self) -> T {
        self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        self.tween = None;
    }

    pub fn animate(&mut self, tween: Tween<T>) {
        self.tween = Some(tween);
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    pub fn tick(&mut self, now: f64) -> T {
        if let Some(tween) = self.tween {
            self.value = tween.value_at(now);
            if tween.finished(now) {
                self.value = tween.target();
                self.tween = None;
            }
        }
        self.value
    }
}
