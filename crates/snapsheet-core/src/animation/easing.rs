#![forbid(unsafe_code)]

//! Easing curves for timed motion.

/// Easing function applied to normalized progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Linear interpolation.
    Linear,
    /// Cubic ease-in (accelerating). Good for exits.
    EaseIn,
    /// Cubic ease-out (decelerating). Good for entrances.
    EaseOut,
    /// Cubic S-curve.
    #[default]
    EaseInOut,
    /// Slight overshoot then settle.
    Back,
}

impl Easing {
    /// Apply the curve to a progress value. Input is clamped to [0.0, 1.0].
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t * t,
            Self::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv * inv / 2.0
                }
            }
            Self::Back => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                let t_minus_1 = t - 1.0;
                1.0 + c3 * t_minus_1 * t_minus_1 * t_minus_1 + c1 * t_minus_1 * t_minus_1
            }
        }
    }

    /// Whether this curve can leave [0.0, 1.0] mid-flight.
    #[must_use]
    pub fn can_overshoot(self) -> bool {
        matches!(self, Self::Back)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 5] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::Back,
    ];

    #[test]
    fn endpoints_are_fixed() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-9, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-9, "{easing:?} at 1");
        }
    }

    #[test]
    fn input_is_clamped() {
        assert_eq!(Easing::Linear.apply(-0.5), 0.0);
        assert_eq!(Easing::Linear.apply(1.5), 1.0);
    }

    #[test]
    fn ease_out_leads_linear() {
        assert!(Easing::EaseOut.apply(0.5) > Easing::Linear.apply(0.5));
        assert!(Easing::EaseIn.apply(0.5) < Easing::Linear.apply(0.5));
    }

    #[test]
    fn only_back_overshoots() {
        for easing in ALL {
            let peak = (0..=100)
                .map(|i| easing.apply(f64::from(i) / 100.0))
                .fold(f64::MIN, f64::max);
            assert_eq!(peak > 1.0 + 1e-9, easing.can_overshoot(), "{easing:?}");
        }
    }
}
