#![forbid(unsafe_code)]

//! Fixed-duration interpolation between two values.
//!
//! # Invariants
//!
//! - Progress is always in [0.0, 1.0].
//! - On completion the value is exactly `to`.
//! - Zero-duration tweens complete on the first `advance`, whatever its dt.

use web_time::Duration;

use super::easing::Easing;

/// Duration and curve of a timed motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingConfig {
    /// Total time from start to target.
    pub duration: Duration,
    /// Curve applied to normalized progress.
    pub easing: Easing,
}

impl TimingConfig {
    /// Timed motion with the default (ease-in-out) curve.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            easing: Easing::default(),
        }
    }

    /// Set the easing curve (builder pattern).
    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

/// A timed motion in flight.
#[derive(Debug, Clone)]
pub struct Tween {
    from: f64,
    to: f64,
    elapsed: Duration,
    config: TimingConfig,
    done: bool,
}

impl Tween {
    /// Start a tween from `from` to `to`.
    #[must_use]
    pub fn new(from: f64, to: f64, config: TimingConfig) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            config,
            done: false,
        }
    }

    /// Normalized progress in [0.0, 1.0].
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.done {
            return 1.0;
        }
        let total = self.config.duration.as_secs_f64();
        if total <= 0.0 {
            return 0.0;
        }
        (self.elapsed.as_secs_f64() / total).clamp(0.0, 1.0)
    }

    /// Current interpolated value.
    #[must_use]
    pub fn value(&self) -> f64 {
        if self.done {
            return self.to;
        }
        let eased = self.config.easing.apply(self.progress());
        self.from + (self.to - self.from) * eased
    }

    /// Final value.
    #[inline]
    #[must_use]
    pub fn target(&self) -> f64 {
        self.to
    }

    /// Whether the tween has reached its target.
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.done
    }

    /// Advance by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        if self.done {
            return;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed >= self.config.duration {
            self.done = true;
        }
    }
}
