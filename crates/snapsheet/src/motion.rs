#![forbid(unsafe_code)]

//! The two animated scalars that position a panel.
//!
//! `offset` is the panel's distance from the container top; `backdrop` is the
//! unscaled backdrop level in [0, 1]. Both are written only through
//! [`SheetMotion`]; every directive that moves the panel returns the ticket
//! of its *offset* motion, which is what callers sequence on. Backdrop
//! motions run alongside and are never awaited.

use snapsheet_core::animation::TimingConfig;
use snapsheet_core::{AnimatedValue, AnimationDriver, AnimationTicket, Completion, Motion};
use web_time::Duration;

use crate::config::SheetTuning;

/// Offset and backdrop drivers for one panel.
#[derive(Debug, Clone)]
pub struct SheetMotion<D: AnimationDriver = AnimatedValue> {
    offset: D,
    backdrop: D,
}

impl SheetMotion<AnimatedValue> {
    /// Default drivers resting in the closed position.
    #[must_use]
    pub fn closed(container_height: f64) -> Self {
        Self::with_drivers(AnimatedValue::new(container_height), AnimatedValue::new(0.0))
    }
}

impl<D: AnimationDriver> SheetMotion<D> {
    /// Wrap caller-supplied drivers.
    pub fn with_drivers(offset: D, backdrop: D) -> Self {
        Self { offset, backdrop }
    }

    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset.read()
    }

    #[inline]
    pub fn backdrop(&self) -> f64 {
        self.backdrop.read()
    }

    /// Whether neither scalar is moving.
    pub fn is_settled(&self) -> bool {
        self.offset.is_settled() && self.backdrop.is_settled()
    }

    /// Jump to the closed values with no animation.
    pub fn reset_closed(&mut self, container_height: f64) {
        self.offset.set(container_height);
        self.backdrop.set(0.0);
    }

    /// Spring to `target` while the backdrop fades in.
    pub fn open_to(&mut self, target: f64, tuning: &SheetTuning) -> AnimationTicket {
        self.backdrop
            .animate_to(1.0, timed(tuning.open_backdrop_duration), None);
        self.offset
            .animate_to(target, Motion::spring(tuning.spring), None)
    }

    /// Spring to `target` seeded with `velocity` (units/s) while the
    /// backdrop returns to full.
    pub fn snap_to(&mut self, target: f64, velocity: f64, tuning: &SheetTuning) -> AnimationTicket {
        self.backdrop
            .animate_to(1.0, timed(tuning.restore_backdrop_duration), None);
        self.offset
            .animate_to(target, Motion::spring(tuning.spring), Some(velocity))
    }

    /// Run offset to `container_height` and backdrop to zero, in parallel and
    /// over the same duration.
    pub fn dismiss(&mut self, container_height: f64, tuning: &SheetTuning) -> AnimationTicket {
        self.backdrop
            .animate_to(0.0, timed(tuning.close_duration), None);
        self.offset
            .animate_to(container_height, timed(tuning.close_duration), None)
    }

    /// Halt both scalars and return the offset at the moment of interruption.
    pub fn interrupt(&mut self) -> f64 {
        self.backdrop.interrupt();
        self.offset.interrupt()
    }

    /// Position the panel directly from a drag.
    pub fn drag_to(&mut self, offset: f64, openness: f64) {
        self.offset.set(offset);
        self.backdrop.set(openness);
    }

    /// Step both scalars; returns offset completions only.
    pub fn advance(&mut self, dt: Duration) -> Vec<Completion> {
        self.backdrop.advance(dt);
        self.offset.advance(dt)
    }
}

fn timed(duration: Duration) -> Motion {
    Motion::Timed(TimingConfig::new(duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_16: Duration = Duration::from_millis(16);

    fn run(motion: &mut SheetMotion, frames: usize) -> Vec<Completion> {
        (0..frames).flat_map(|_| motion.advance(MS_16)).collect()
    }

    #[test]
    fn open_springs_offset_and_fades_backdrop() {
        let tuning = SheetTuning::default();
        let mut motion = SheetMotion::closed(1000.0);
        let ticket = motion.open_to(400.0, &tuning);

        let completions = run(&mut motion, 200);
        assert_eq!(completions, vec![Completion::Settled(ticket)]);
        assert_eq!(motion.offset(), 400.0);
        assert_eq!(motion.backdrop(), 1.0);
        assert!(motion.is_settled());
    }

    #[test]
    fn dismiss_lands_offscreen_within_close_duration() {
        let tuning = SheetTuning::default();
        let mut motion = SheetMotion::closed(1000.0);
        motion.drag_to(400.0, 0.6);
        let ticket = motion.dismiss(1000.0, &tuning);

        // 180ms at 16ms frames settles on the 12th frame.
        let completions = run(&mut motion, 12);
        assert_eq!(completions, vec![Completion::Settled(ticket)]);
        assert_eq!(motion.offset(), 1000.0);
        assert_eq!(motion.backdrop(), 0.0);
    }

    #[test]
    fn interrupt_returns_mid_flight_offset() {
        let tuning = SheetTuning::default();
        let mut motion = SheetMotion::closed(1000.0);
        motion.open_to(400.0, &tuning);
        run(&mut motion, 3);

        let frozen = motion.interrupt();
        assert!(frozen < 1000.0 && frozen > 400.0, "frozen at {frozen}");
        assert!(motion.is_settled());
        assert_eq!(motion.offset(), frozen);
    }

    #[test]
    fn reset_closed_jumps_without_animating() {
        let mut motion = SheetMotion::closed(1000.0);
        motion.drag_to(200.0, 1.0);
        motion.reset_closed(1000.0);
        assert_eq!(motion.offset(), 1000.0);
        assert_eq!(motion.backdrop(), 0.0);
    }
}
