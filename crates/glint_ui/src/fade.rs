//! Hover highlight fading.
//!
//! A [`Fade`] lives in the state manager under a uid derived from its widget
//! and is driven once per frame towards the widget's current highlight level.

/// A value in `0..=1` easing towards a target with an exponential-out curve.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Fade {
    value: f32,
    from: f32,
    target: f32,
    elapsed: f32,
}

impl Fade {
    /// Seconds a transition takes.
    pub const DURATION: f32 = 0.15;

    /// Current value.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Value being faded towards.
    #[must_use]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Returns true once the value has reached its target.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.elapsed >= Self::DURATION || (self.from - self.target).abs() <= f32::EPSILON
    }

    /// Restarts the transition from the current value if `target` changed,
    /// advances it by `dt` seconds and returns the new value.
    pub fn drive(&mut self, target: f32, dt: f32) -> f32 {
        let target = target.clamp(0.0, 1.0);
        if (target - self.target).abs() > f32::EPSILON {
            self.from = self.value;
            self.target = target;
            self.elapsed = 0.0;
        }
        self.elapsed += dt.max(0.0);

        let t = (self.elapsed / Self::DURATION).min(1.0);
        let eased = if t >= 1.0 { 1.0 } else { 1.0 - 2.0_f32.powf(-10.0 * t) };
        self.value = self.from + (self.target - self.from) * eased;
        self.value
    }
}
