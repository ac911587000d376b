#![forbid(unsafe_code)]

//! Panel configuration and tuning as data.
//!
//! [`SheetConfig`] is the host-facing surface (snap points, initial index,
//! backdrop). [`SheetTuning`] gathers every tuned threshold and timing of the
//! interaction so none of them is a buried literal; the defaults reproduce
//! the stock panel feel exactly.
//!
//! # Loading
//!
//! With the `config` feature both structs can be read from TOML or JSON:
//!
//! ```toml
//! # sheet.toml
//! [sheet]
//! snap_points = [0.3, 0.9]
//! initial_snap_index = 0
//!
//! [tuning]
//! fast_dismiss_vy = 1.6
//! close_duration_ms = 220
//! ```
//!
//! ```rust,ignore
//! let file = SheetFile::from_toml_file("sheet.toml")?;
//! ```
//!
//! Missing fields fall back to their defaults.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};
use snapsheet_core::animation::SpringConfig;
use web_time::Duration;

use crate::error::SheetError;

// ---------------------------------------------------------------------------
// SheetConfig
// ---------------------------------------------------------------------------

/// Host-facing panel configuration. Immutable for one open session.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct SheetConfig {
    /// Visible fractions of container height, any order.
    pub snap_points: Vec<f64>,
    /// Snap index to open at; clamped into range.
    pub initial_snap_index: i64,
    /// Backdrop intensity at full openness, in [0, 1].
    pub backdrop_opacity: f64,
    /// Whether tapping outside the panel dismisses it.
    pub close_on_backdrop_press: bool,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            snap_points: vec![0.25, 0.6, 0.9],
            initial_snap_index: 1,
            backdrop_opacity: 0.35,
            close_on_backdrop_press: true,
        }
    }
}

impl SheetConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set snap points.
    #[must_use]
    pub fn snap_points(mut self, points: impl Into<Vec<f64>>) -> Self {
        self.snap_points = points.into();
        self
    }

    /// Set the initial snap index.
    #[must_use]
    pub fn initial_snap_index(mut self, index: i64) -> Self {
        self.initial_snap_index = index;
        self
    }

    /// Set the maximum backdrop intensity.
    #[must_use]
    pub fn backdrop_opacity(mut self, opacity: f64) -> Self {
        self.backdrop_opacity = opacity;
        self
    }

    /// Set whether a backdrop tap dismisses.
    #[must_use]
    pub fn close_on_backdrop_press(mut self, enabled: bool) -> Self {
        self.close_on_backdrop_press = enabled;
        self
    }

    /// Backdrop opacity clamped into [0, 1]. NaN reads as fully transparent.
    #[must_use]
    pub fn effective_backdrop_opacity(&self) -> f64 {
        if self.backdrop_opacity.is_nan() {
            return 0.0;
        }
        self.backdrop_opacity.clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// SheetTuning
// ---------------------------------------------------------------------------

/// Tuned constants of the drag interaction and its animations.
///
/// Velocities are in offset units per millisecond, matching what gesture
/// layers report.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct SheetTuning {
    /// Vertical dead-zone before the panel steals a gesture.
    pub capture_threshold: f64,
    /// Fraction of the way from the least-open snap to offscreen past which
    /// a release dismisses.
    pub dismiss_fraction: f64,
    /// Cumulative downward travel a flick needs to dismiss.
    pub fast_dismiss_dy: f64,
    /// Downward release velocity a flick needs to dismiss.
    pub fast_dismiss_vy: f64,
    /// How far ahead (ms of motion at release velocity) snap selection looks.
    pub velocity_lookahead_ms: f64,
    /// Gesture velocity to spring velocity (units/ms to units/s).
    pub release_velocity_scale: f64,
    /// Spring used for open and snap motion.
    #[cfg_attr(feature = "config", serde(with = "spring_serde"))]
    pub spring: SpringConfig,
    /// Backdrop fade-in when opening.
    #[cfg_attr(feature = "config", serde(rename = "open_backdrop_ms", with = "duration_ms"))]
    pub open_backdrop_duration: Duration,
    /// Backdrop restore after a snap release.
    #[cfg_attr(
        feature = "config",
        serde(rename = "restore_backdrop_ms", with = "duration_ms")
    )]
    pub restore_backdrop_duration: Duration,
    /// Offset and backdrop motion when dismissing.
    #[cfg_attr(feature = "config", serde(rename = "close_duration_ms", with = "duration_ms"))]
    pub close_duration: Duration,
}

impl Default for SheetTuning {
    fn default() -> Self {
        Self {
            capture_threshold: 4.0,
            dismiss_fraction: 0.35,
            fast_dismiss_dy: 30.0,
            fast_dismiss_vy: 1.3,
            velocity_lookahead_ms: 120.0,
            release_velocity_scale: 1000.0,
            spring: SpringConfig::sheet(),
            open_backdrop_duration: Duration::from_millis(220),
            restore_backdrop_duration: Duration::from_millis(140),
            close_duration: Duration::from_millis(180),
        }
    }
}

impl SheetTuning {
    /// Create the default tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate tuning values. Returns human-readable problems; empty means
    /// valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.capture_threshold.is_nan() || self.capture_threshold < 0.0 {
            errors.push(format!(
                "capture_threshold must be >= 0, got {}",
                self.capture_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.dismiss_fraction) {
            errors.push(format!(
                "dismiss_fraction must be in [0, 1], got {}",
                self.dismiss_fraction
            ));
        }
        if !self.fast_dismiss_dy.is_finite() || !self.fast_dismiss_vy.is_finite() {
            errors.push("fast dismiss thresholds must be finite".into());
        }
        if self.velocity_lookahead_ms.is_nan() || self.velocity_lookahead_ms < 0.0 {
            errors.push(format!(
                "velocity_lookahead_ms must be >= 0, got {}",
                self.velocity_lookahead_ms
            ));
        }
        if !self.release_velocity_scale.is_finite() {
            errors.push("release_velocity_scale must be finite".into());
        }
        if self.spring.damping <= 0.0 {
            errors.push("spring.damping must be > 0 or the panel never settles".into());
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// File loading
// ---------------------------------------------------------------------------

/// A configuration file: `[sheet]` plus optional `[tuning]`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct SheetFile {
    pub sheet: SheetConfig,
    pub tuning: SheetTuning,
}

impl SheetFile {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let file: Self = toml::from_str(s)?;
        file.checked()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let file: Self = serde_json::from_str(s)?;
        file.checked()
    }

    /// Serialize to pretty TOML.
    #[cfg(feature = "config")]
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    #[cfg(feature = "config")]
    fn checked(self) -> Result<Self, ConfigError> {
        crate::snap::resolve(&self.sheet.snap_points, 1.0)
            .inspect_err(|err| tracing::warn!(%err, "rejected snap points"))?;
        let errors = self.tuning.validate();
        if !errors.is_empty() {
            tracing::warn!(count = errors.len(), "rejected sheet tuning");
            return Err(ConfigError::Validation(errors));
        }
        Ok(self)
    }
}

/// Errors from loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// TOML serialize error.
    #[cfg(feature = "config")]
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// Tuning validation errors.
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
    /// The sheet configuration itself is unusable.
    #[error(transparent)]
    Sheet(#[from] SheetError),
}

#[cfg(feature = "config")]
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use web_time::Duration;

    pub(super) fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(feature = "config")]
mod spring_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use snapsheet_core::animation::SpringConfig;

    #[derive(Serialize, Deserialize)]
    #[serde(default)]
    struct SpringRepr {
        stiffness: f64,
        damping: f64,
        rest_threshold: f64,
        velocity_threshold: f64,
    }

    impl Default for SpringRepr {
        fn default() -> Self {
            let sheet = SpringConfig::sheet();
            Self {
                stiffness: sheet.stiffness,
                damping: sheet.damping,
                rest_threshold: sheet.rest_threshold,
                velocity_threshold: sheet.velocity_threshold,
            }
        }
    }

    pub(super) fn serialize<S: Serializer>(value: &SpringConfig, s: S) -> Result<S::Ok, S::Error> {
        SpringRepr {
            stiffness: value.stiffness,
            damping: value.damping,
            rest_threshold: value.rest_threshold,
            velocity_threshold: value.velocity_threshold,
        }
        .serialize(s)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SpringConfig, D::Error> {
        let repr = SpringRepr::deserialize(d)?;
        Ok(SpringConfig::new(repr.stiffness, repr.damping)
            .with_rest_threshold(repr.rest_threshold)
            .with_velocity_threshold(repr.velocity_threshold))
    }
}
