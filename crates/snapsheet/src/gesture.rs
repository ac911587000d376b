#![forbid(unsafe_code)]

//! Drag state machine: grant, move, release, terminate.
//!
//! # State Machine
//!
//! ```text
//!            grant                release (snap)
//!   Idle ───────────▶ Dragging ───────────────▶ SnappingBack ──settled──▶ Idle
//!     ▲                  │   │
//!     │                  │   └──terminate──────▶ SnappingBack
//!     │                  │
//!     │                  └──release (dismiss)─▶ Dismissing ──reset──▶ Idle
//!     └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Release Rule
//!
//! With `threshold = max_offset + dismiss_fraction * (h - max_offset)`, a
//! release dismisses when `current > threshold`, or when
//! `dy > fast_dismiss_dy && vy > fast_dismiss_vy`. All comparisons are strict.
//! Otherwise the panel snaps to the offset nearest
//! `current + vy * velocity_lookahead_ms`.
//!
//! The controller never animates a dismissal itself. It enters
//! [`DragState::Dismissing`] and the owner routes the close through the
//! lifecycle so that every dismissal shares one entry point.

use snapsheet_core::{AnimationDriver, AnimationTicket, Completion};

use crate::config::SheetTuning;
use crate::motion::SheetMotion;
use crate::snap::ResolvedOffsets;

/// One gesture report: cumulative travel since touch-down and the current
/// vertical velocity in units per millisecond (positive is downward).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragSample {
    pub dx: f64,
    pub dy: f64,
    pub vy: f64,
}

impl DragSample {
    #[must_use]
    pub const fn new(dx: f64, dy: f64, vy: f64) -> Self {
        Self { dx, dy, vy }
    }

    /// Vertical-only sample.
    #[must_use]
    pub const fn vertical(dy: f64, vy: f64) -> Self {
        Self { dx: 0.0, dy, vy }
    }
}

/// Drag bookkeeping, mutated only by the controller's event handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GestureState {
    pub is_dragging: bool,
    pub baseline_offset: f64,
    pub current_offset: f64,
    pub last_dy: f64,
    pub last_velocity_y: f64,
}

/// Where the controller is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
    /// Springing to `index`; ends when `ticket` completes.
    SnappingBack { ticket: AnimationTicket, index: usize },
    /// Handed to the lifecycle for closing.
    Dismissing,
}

/// Outcome of a release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleaseDecision {
    Snap { index: usize, target: f64 },
    Dismiss,
}

/// Offset past which a slow release dismisses.
#[must_use]
pub fn close_threshold(offsets: &ResolvedOffsets, tuning: &SheetTuning) -> f64 {
    let max = offsets.max_offset();
    max + tuning.dismiss_fraction * (offsets.container_height() - max)
}

/// Pure release rule.
#[must_use]
pub fn decide_release(
    current_offset: f64,
    dy: f64,
    vy: f64,
    offsets: &ResolvedOffsets,
    tuning: &SheetTuning,
) -> ReleaseDecision {
    let past_threshold = current_offset > close_threshold(offsets, tuning);
    let fast_down = dy > tuning.fast_dismiss_dy && vy > tuning.fast_dismiss_vy;
    if past_threshold || fast_down {
        return ReleaseDecision::Dismiss;
    }

    let projected = current_offset + vy * tuning.velocity_lookahead_ms;
    let (index, target) = offsets.find_nearest(projected);
    ReleaseDecision::Snap { index, target }
}

/// What a finished drag asks of its owner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// The panel is springing to a snap; nothing else to do.
    Snapping { index: usize, target: f64 },
    /// The owner must begin a dismissal.
    Dismiss,
}

/// The drag state machine.
#[derive(Debug, Clone, Default)]
pub struct GestureDragController {
    gesture: GestureState,
    state: DragState,
}

impl GestureDragController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn gesture_state(&self) -> GestureState {
        self.gesture
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> DragState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.state == DragState::Dragging
    }

    /// Drag begins: freeze whatever the panel was doing and take its offset
    /// as the baseline.
    pub fn on_grant<D: AnimationDriver>(&mut self, motion: &mut SheetMotion<D>) {
        let baseline = motion.interrupt();
        self.gesture = GestureState {
            is_dragging: true,
            baseline_offset: baseline,
            current_offset: baseline,
            last_dy: 0.0,
            last_velocity_y: 0.0,
        };
        self.state = DragState::Dragging;
        tracing::debug!(baseline, "drag granted");
    }

    /// Apply a move. Returns the clamped offset, or `None` when no drag is
    /// active.
    pub fn on_move<D: AnimationDriver>(
        &mut self,
        sample: DragSample,
        offsets: &ResolvedOffsets,
        motion: &mut SheetMotion<D>,
    ) -> Option<f64> {
        if !self.is_dragging() {
            return None;
        }
        let raw = self.gesture.baseline_offset + sample.dy;
        let current = raw.clamp(offsets.min_offset(), offsets.container_height());
        self.gesture.current_offset = current;
        self.gesture.last_dy = sample.dy;
        self.gesture.last_velocity_y = sample.vy;

        let openness = offsets.openness(current);
        motion.drag_to(current, openness);
        tracing::trace!(dy = sample.dy, current, openness, "drag moved");
        Some(current)
    }

    /// Finish a drag. Decides from the offset reached by the last move and
    /// the release sample's travel and velocity.
    pub fn on_release<D: AnimationDriver>(
        &mut self,
        sample: DragSample,
        offsets: &ResolvedOffsets,
        tuning: &SheetTuning,
        motion: &mut SheetMotion<D>,
    ) -> Option<DragOutcome> {
        if !self.is_dragging() {
            return None;
        }
        let current = self.gesture.current_offset;
        let decision = decide_release(current, sample.dy, sample.vy, offsets, tuning);
        self.finish_gesture();

        match decision {
            ReleaseDecision::Dismiss => {
                tracing::debug!(current, dy = sample.dy, vy = sample.vy, "release dismisses");
                self.state = DragState::Dismissing;
                Some(DragOutcome::Dismiss)
            }
            ReleaseDecision::Snap { index, target } => {
                let velocity = sample.vy * tuning.release_velocity_scale;
                let ticket = motion.snap_to(target, velocity, tuning);
                tracing::debug!(current, index, target, vy = sample.vy, "release snaps");
                self.state = DragState::SnappingBack { ticket, index };
                Some(DragOutcome::Snapping { index, target })
            }
        }
    }

    /// Gesture cancelled from outside. Settles on the nearest snap with no
    /// velocity and never dismisses.
    pub fn on_terminate<D: AnimationDriver>(
        &mut self,
        offsets: &ResolvedOffsets,
        tuning: &SheetTuning,
        motion: &mut SheetMotion<D>,
    ) -> Option<DragOutcome> {
        if !self.is_dragging() {
            return None;
        }
        let (index, target) = offsets.find_nearest(self.gesture.current_offset);
        self.finish_gesture();
        let ticket = motion.snap_to(target, 0.0, tuning);
        tracing::debug!(index, target, "drag terminated");
        self.state = DragState::SnappingBack { ticket, index };
        Some(DragOutcome::Snapping { index, target })
    }

    /// Spring to the snap at `index` with no velocity, e.g. after the offsets
    /// moved under a resting panel. Ignored mid-drag or mid-dismissal.
    pub fn snap_to_index<D: AnimationDriver>(
        &mut self,
        index: usize,
        offsets: &ResolvedOffsets,
        tuning: &SheetTuning,
        motion: &mut SheetMotion<D>,
    ) -> bool {
        if matches!(self.state, DragState::Dragging | DragState::Dismissing) {
            return false;
        }
        let Some(target) = offsets.get(index) else {
            return false;
        };
        let ticket = motion.snap_to(target, 0.0, tuning);
        self.state = DragState::SnappingBack { ticket, index };
        true
    }

    /// Feed an offset completion. Returns the snap index when a snap-back
    /// settles.
    pub fn on_completion(&mut self, completion: Completion) -> Option<usize> {
        let DragState::SnappingBack { ticket, index } = self.state else {
            return None;
        };
        if completion.ticket() != ticket {
            return None;
        }
        self.state = DragState::Idle;
        completion.is_settled().then_some(index)
    }

    /// Drop any in-progress cycle. Used when a dismissal or unmount takes
    /// over.
    pub fn reset(&mut self) {
        self.finish_gesture();
        self.state = DragState::Idle;
    }

    fn finish_gesture(&mut self) {
        self.gesture.is_dragging = false;
        self.gesture.last_dy = 0.0;
        self.gesture.last_velocity_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snap::resolve;
    use web_time::Duration;

    fn offsets() -> ResolvedOffsets {
        resolve(&[0.25, 0.6, 0.9], 1000.0).expect("valid")
    }

    fn open_at(offset: f64) -> SheetMotion {
        let mut motion = SheetMotion::closed(1000.0);
        motion.drag_to(offset, 1.0);
        motion
    }

    #[test]
    fn threshold_is_strict() {
        let offsets = offsets();
        let tuning = SheetTuning::default();
        let threshold = close_threshold(&offsets, &tuning);
        assert!((threshold - 837.5).abs() < 1e-9);

        assert!(matches!(
            decide_release(threshold, 0.0, 0.0, &offsets, &tuning),
            ReleaseDecision::Snap { index: 2, .. }
        ));
        assert_eq!(
            decide_release(threshold + 1e-6, 0.0, 0.0, &offsets, &tuning),
            ReleaseDecision::Dismiss
        );
    }

    #[test]
    fn fast_flick_thresholds_are_strict() {
        let offsets = offsets();
        let tuning = SheetTuning::default();
        assert!(matches!(
            decide_release(430.0, 30.0, 1.3, &offsets, &tuning),
            ReleaseDecision::Snap { .. }
        ));
        assert_eq!(
            decide_release(431.0, 31.0, 1.31, &offsets, &tuning),
            ReleaseDecision::Dismiss
        );
    }

    #[test]
    fn upward_flick_projects_to_more_open_snap() {
        let offsets = offsets();
        let tuning = SheetTuning::default();
        // 400 - 2.5 * 120 = 100.
        assert_eq!(
            decide_release(400.0, -20.0, -2.5, &offsets, &tuning),
            ReleaseDecision::Snap {
                index: 0,
                target: offsets.min_offset()
            }
        );
    }

    #[test]
    fn move_clamps_to_open_bound_and_offscreen() {
        let offsets = offsets();
        let mut motion = open_at(400.0);
        let mut controller = GestureDragController::new();
        controller.on_grant(&mut motion);

        let top = controller.on_move(DragSample::vertical(-900.0, 0.0), &offsets, &mut motion);
        assert!((top.expect("dragging") - 100.0).abs() < 1e-9);
        assert!((motion.backdrop() - 1.0).abs() < 1e-9);

        let bottom = controller.on_move(DragSample::vertical(900.0, 0.0), &offsets, &mut motion);
        assert_eq!(bottom, Some(1000.0));
        assert_eq!(motion.backdrop(), 0.0);
    }

    #[test]
    fn moves_outside_a_drag_are_ignored() {
        let offsets = offsets();
        let mut motion = open_at(400.0);
        let mut controller = GestureDragController::new();
        assert_eq!(controller.on_move(DragSample::vertical(50.0, 0.0), &offsets, &mut motion), None);
        assert_eq!(motion.offset(), 400.0);
    }

    #[test]
    fn slow_release_snaps_back_and_reports_index() {
        let offsets = offsets();
        let tuning = SheetTuning::default();
        let mut motion = open_at(400.0);
        let mut controller = GestureDragController::new();

        controller.on_grant(&mut motion);
        controller.on_move(DragSample::vertical(50.0, 0.0), &offsets, &mut motion);
        let outcome = controller.on_release(DragSample::vertical(50.0, 0.0), &offsets, &tuning, &mut motion);
        assert_eq!(outcome, Some(DragOutcome::Snapping { index: 1, target: 400.0 }));
        assert!(!controller.gesture_state().is_dragging);

        let mut snapped = None;
        for _ in 0..200 {
            for completion in motion.advance(Duration::from_millis(16)) {
                snapped = snapped.or(controller.on_completion(completion));
            }
        }
        assert_eq!(snapped, Some(1));
        assert_eq!(controller.state(), DragState::Idle);
        assert_eq!(motion.offset(), 400.0);
    }

    #[test]
    fn fast_release_hands_off_dismissal() {
        let offsets = offsets();
        let tuning = SheetTuning::default();
        let mut motion = open_at(400.0);
        let mut controller = GestureDragController::new();

        controller.on_grant(&mut motion);
        controller.on_move(DragSample::vertical(40.0, 2.0), &offsets, &mut motion);
        let outcome = controller.on_release(DragSample::vertical(40.0, 2.0), &offsets, &tuning, &mut motion);
        assert_eq!(outcome, Some(DragOutcome::Dismiss));
        assert_eq!(controller.state(), DragState::Dismissing);
    }

    #[test]
    fn terminate_never_dismisses() {
        let offsets = offsets();
        let tuning = SheetTuning::default();
        let mut motion = open_at(400.0);
        let mut controller = GestureDragController::new();

        controller.on_grant(&mut motion);
        controller.on_move(DragSample::vertical(500.0, 3.0), &offsets, &mut motion);
        let outcome = controller.on_terminate(&offsets, &tuning, &mut motion);
        assert_eq!(outcome, Some(DragOutcome::Snapping { index: 2, target: offsets.max_offset() }));
    }

    #[test]
    fn grant_mid_snap_interrupts_and_rebases() {
        let offsets = offsets();
        let tuning = SheetTuning::default();
        let mut motion = open_at(400.0);
        let mut controller = GestureDragController::new();

        controller.on_grant(&mut motion);
        controller.on_move(DragSample::vertical(200.0, 0.0), &offsets, &mut motion);
        controller.on_release(DragSample::vertical(200.0, 0.0), &offsets, &tuning, &mut motion);
        motion.advance(Duration::from_millis(16));

        controller.on_grant(&mut motion);
        let baseline = controller.gesture_state().baseline_offset;
        assert_eq!(baseline, motion.offset());
        assert_eq!(controller.state(), DragState::Dragging);

        // The superseded snap never reports as settled.
        let completions = motion.advance(Duration::from_millis(16));
        for completion in completions {
            assert_eq!(controller.on_completion(completion), None);
        }
    }
}
