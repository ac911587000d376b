#![forbid(unsafe_code)]

//! Damped harmonic oscillator driving a single scalar toward a target.
//!
//! Classical damped spring equation:
//!
//!   F = -stiffness × (position - target) - damping × velocity
//!
//! # Parameters
//!
//! - **stiffness** (k): restoring force. Higher settles faster.
//! - **damping** (c): velocity drag.
//!   - Underdamped (c < 2√k): overshoots, then settles
//!   - Critically damped (c ≈ 2√k): fastest settle without overshoot
//!   - Overdamped (c > 2√k): slow, no overshoot
//! - **rest_threshold**: position delta under which the spring may settle.
//! - **velocity_threshold**: speed (units/s) under which the spring may settle.
//!
//! # Invariants
//!
//! 1. A settled spring sits exactly on its target with zero velocity.
//! 2. A settled spring does not move again; a new target means a new
//!    [`Spring`].
//! 3. Stiffness is always >= 0.1 and damping >= 0.
//!
//! # Failure Modes
//!
//! - Large `dt` is subdivided into 4ms steps, so a stalled frame clock
//!   cannot blow up the integration.
//! - Zero damping never settles; callers must not rely on completion then.

use web_time::Duration;

/// Maximum dt per integration step (4ms).
const MAX_STEP_SECS: f64 = 0.004;

/// Minimum stiffness to prevent degenerate springs.
const MIN_STIFFNESS: f64 = 0.1;

/// Physical parameters of a spring motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    /// Restoring force strength.
    pub stiffness: f64,
    /// Velocity drag.
    pub damping: f64,
    /// Position delta below which the spring is considered at rest.
    pub rest_threshold: f64,
    /// Speed (units per second) below which the spring is considered at rest.
    pub velocity_threshold: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::sheet()
    }
}

impl SpringConfig {
    /// Construct with explicit stiffness and damping and default thresholds.
    #[must_use]
    pub fn new(stiffness: f64, damping: f64) -> Self {
        Self {
            stiffness: stiffness.max(MIN_STIFFNESS),
            damping: damping.max(0.0),
            rest_threshold: 0.01,
            velocity_threshold: 0.1,
        }
    }

    /// Panel spring: stiffness 260, damping 28. Slightly underdamped, so a
    /// flick lands with a small settle.
    #[must_use]
    pub fn sheet() -> Self {
        Self::new(260.0, 28.0)
    }

    /// Low stiffness, high damping. Smooth and slow.
    #[must_use]
    pub fn gentle() -> Self {
        Self::new(120.0, 20.0)
    }

    /// High stiffness, near-critical damping. Snappy.
    #[must_use]
    pub fn stiff() -> Self {
        Self::new(400.0, 38.0)
    }

    /// Critically damped spring for stiffness `k`.
    #[must_use]
    pub fn critical(k: f64) -> Self {
        let k = k.max(MIN_STIFFNESS);
        Self::new(k, 2.0 * k.sqrt())
    }

    /// Set rest threshold (builder pattern).
    #[must_use]
    pub fn with_rest_threshold(mut self, threshold: f64) -> Self {
        self.rest_threshold = threshold.abs();
        self
    }

    /// Set velocity threshold (builder pattern).
    #[must_use]
    pub fn with_velocity_threshold(mut self, threshold: f64) -> Self {
        self.velocity_threshold = threshold.abs();
        self
    }

    /// Damping coefficient at which this stiffness stops oscillating.
    #[must_use]
    pub fn critical_damping(&self) -> f64 {
        2.0 * self.stiffness.sqrt()
    }
}

/// A damped spring in flight.
#[derive(Debug, Clone)]
pub struct Spring {
    position: f64,
    velocity: f64,
    target: f64,
    config: SpringConfig,
    at_rest: bool,
}

impl Spring {
    /// Create a spring at `initial`, heading for `target`, at rest velocity.
    #[must_use]
    pub fn new(initial: f64, target: f64, config: SpringConfig) -> Self {
        Self {
            position: initial,
            velocity: 0.0,
            target,
            config: SpringConfig::new(config.stiffness, config.damping)
                .with_rest_threshold(config.rest_threshold)
                .with_velocity_threshold(config.velocity_threshold),
            at_rest: false,
        }
    }

    /// Seed the spring with an initial velocity (builder pattern).
    #[must_use]
    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = velocity;
        self
    }

    /// Current position (unclamped).
    #[inline]
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Current velocity in units per second.
    #[inline]
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Current target.
    #[inline]
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Physical parameters.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SpringConfig {
        &self.config
    }

    /// Whether the spring has settled on its target.
    #[inline]
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    /// One semi-implicit Euler step of `dt` seconds.
    fn step(&mut self, dt: f64) {
        let displacement = self.position - self.target;
        let acceleration =
            -self.config.stiffness * displacement - self.config.damping * self.velocity;

        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }

    /// Advance the spring by `dt`, subdividing for stability.
    pub fn advance(&mut self, dt: Duration) {
        if self.at_rest {
            return;
        }

        let mut remaining = dt.as_secs_f64();
        while remaining > 0.0 {
            let step_dt = remaining.min(MAX_STEP_SECS);
            self.step(step_dt);
            remaining -= step_dt;
        }

        if (self.position - self.target).abs() < self.config.rest_threshold
            && self.velocity.abs() < self.config.velocity_threshold
        {
            self.position = self.target;
            self.velocity = 0.0;
            self.at_rest = true;
        }
    }
}
