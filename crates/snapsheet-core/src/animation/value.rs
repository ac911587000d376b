#![forbid(unsafe_code)]

//! Default [`AnimationDriver`]: an owned scalar with one optional motion.

use web_time::Duration;

use super::spring::Spring;
use super::timed::Tween;
use super::{AnimationDriver, AnimationTicket, Completion, Motion};

#[derive(Debug, Clone)]
enum ActiveMotion {
    Spring(Spring),
    Timed(Tween),
}

impl ActiveMotion {
    fn value(&self) -> f64 {
        match self {
            Self::Spring(spring) => spring.position(),
            Self::Timed(tween) => tween.value(),
        }
    }

    fn advance(&mut self, dt: Duration) {
        match self {
            Self::Spring(spring) => spring.advance(dt),
            Self::Timed(tween) => tween.advance(dt),
        }
    }

    fn is_done(&self) -> bool {
        match self {
            Self::Spring(spring) => spring.is_at_rest(),
            Self::Timed(tween) => tween.is_complete(),
        }
    }

    fn target(&self) -> f64 {
        match self {
            Self::Spring(spring) => spring.target(),
            Self::Timed(tween) => tween.target(),
        }
    }
}

/// An animated scalar owned by exactly one controller.
///
/// Rendering code reads it; only the owning state machine writes it.
#[derive(Debug, Clone)]
pub struct AnimatedValue {
    value: f64,
    active: Option<(AnimationTicket, ActiveMotion)>,
    next_ticket: u64,
    pending: Vec<Completion>,
}

impl AnimatedValue {
    /// A settled scalar at `value`.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self {
            value,
            active: None,
            next_ticket: 0,
            pending: Vec::new(),
        }
    }

    /// Ticket of the active motion, if any.
    #[must_use]
    pub fn active_ticket(&self) -> Option<AnimationTicket> {
        self.active.as_ref().map(|(ticket, _)| *ticket)
    }

    /// Target of the active motion, if any.
    #[must_use]
    pub fn active_target(&self) -> Option<f64> {
        self.active.as_ref().map(|(_, motion)| motion.target())
    }

    fn issue_ticket(&mut self) -> AnimationTicket {
        self.next_ticket += 1;
        AnimationTicket::new(self.next_ticket)
    }

    fn cancel_active(&mut self) {
        if let Some((ticket, motion)) = self.active.take() {
            self.value = motion.value();
            self.pending.push(Completion::Interrupted(ticket));
        }
    }
}

impl Default for AnimatedValue {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl AnimationDriver for AnimatedValue {
    fn read(&self) -> f64 {
        self.active
            .as_ref()
            .map_or(self.value, |(_, motion)| motion.value())
    }

    fn animate_to(
        &mut self,
        target: f64,
        motion: Motion,
        initial_velocity: Option<f64>,
    ) -> AnimationTicket {
        self.cancel_active();
        let ticket = self.issue_ticket();
        let active = match motion {
            Motion::Spring(config) => ActiveMotion::Spring(
                Spring::new(self.value, target, config).with_velocity(initial_velocity.unwrap_or(0.0)),
            ),
            Motion::Timed(config) => ActiveMotion::Timed(Tween::new(self.value, target, config)),
        };
        self.active = Some((ticket, active));
        ticket
    }

    fn interrupt(&mut self) -> f64 {
        self.cancel_active();
        self.value
    }

    fn set(&mut self, value: f64) {
        self.cancel_active();
        self.value = value;
    }

    fn is_settled(&self) -> bool {
        self.active.is_none()
    }

    fn advance(&mut self, dt: Duration) -> Vec<Completion> {
        if let Some((ticket, motion)) = self.active.as_mut() {
            motion.advance(dt);
            self.value = motion.value();
            if motion.is_done() {
                self.value = motion.target();
                self.pending.push(Completion::Settled(*ticket));
                self.active = None;
            }
        }
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{SpringConfig, TimingConfig};

    const MS_16: Duration = Duration::from_millis(16);

    fn run(value: &mut AnimatedValue, frames: usize) -> Vec<Completion> {
        let mut out = Vec::new();
        for _ in 0..frames {
            out.extend(value.advance(MS_16));
        }
        out
    }

    #[test]
    fn new_value_is_settled() {
        let value = AnimatedValue::new(1000.0);
        assert!(value.is_settled());
        assert_eq!(value.read(), 1000.0);
        assert_eq!(value.active_ticket(), None);
    }

    #[test]
    fn spring_settles_and_reports_once() {
        let mut value = AnimatedValue::new(1000.0);
        let ticket = value.animate_to(400.0, Motion::spring(SpringConfig::sheet()), None);

        let completions = run(&mut value, 250);
        assert_eq!(completions, vec![Completion::Settled(ticket)]);
        assert_eq!(value.read(), 400.0);
        assert!(value.is_settled());
    }

    #[test]
    fn superseding_reports_interruption_then_settles_on_latest_target() {
        let mut value = AnimatedValue::new(0.0);
        let first = value.animate_to(100.0, Motion::timed(Duration::from_millis(200)), None);
        value.advance(MS_16);
        let second = value.animate_to(50.0, Motion::timed(Duration::from_millis(100)), None);
        assert_ne!(first, second);

        let completions = run(&mut value, 20);
        assert_eq!(
            completions,
            vec![Completion::Interrupted(first), Completion::Settled(second)]
        );
        assert_eq!(value.read(), 50.0);
    }

    #[test]
    fn interrupt_freezes_mid_flight() {
        let mut value = AnimatedValue::new(0.0);
        let config = TimingConfig::new(Duration::from_millis(100))
            .with_easing(crate::animation::Easing::Linear);
        let ticket = value.animate_to(100.0, Motion::Timed(config), None);
        value.advance(Duration::from_millis(50));

        let frozen = value.interrupt();
        assert!((frozen - 50.0).abs() < 1e-9);
        assert!(value.is_settled());

        let completions = run(&mut value, 10);
        assert_eq!(completions, vec![Completion::Interrupted(ticket)]);
        assert!((value.read() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn set_jumps_and_cancels() {
        let mut value = AnimatedValue::new(0.0);
        let ticket = value.animate_to(100.0, Motion::spring(SpringConfig::sheet()), None);
        value.set(1000.0);

        assert_eq!(value.read(), 1000.0);
        assert_eq!(value.advance(MS_16), vec![Completion::Interrupted(ticket)]);
        assert_eq!(value.read(), 1000.0);
    }

    #[test]
    fn initial_velocity_only_affects_springs() {
        let mut timed = AnimatedValue::new(400.0);
        timed.animate_to(400.0, Motion::timed(Duration::from_millis(100)), Some(-5000.0));
        timed.advance(MS_16);
        assert_eq!(timed.read(), 400.0);

        let mut sprung = AnimatedValue::new(400.0);
        sprung.animate_to(400.0, Motion::spring(SpringConfig::sheet()), Some(-5000.0));
        sprung.advance(MS_16);
        assert!(sprung.read() < 400.0);
    }

    #[test]
    fn tickets_are_monotonic() {
        let mut value = AnimatedValue::new(0.0);
        let a = value.animate_to(1.0, Motion::timed(Duration::ZERO), None);
        let b = value.animate_to(2.0, Motion::timed(Duration::ZERO), None);
        assert!(b > a);
    }
}
