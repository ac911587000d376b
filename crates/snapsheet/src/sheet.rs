#![forbid(unsafe_code)]

//! The [`BottomSheet`] facade.
//!
//! Owns configuration, resolved offsets, the two animated scalars, and the
//! three state machines, and routes host input between them:
//!
//! | input                                | handled by                      |
//! |--------------------------------------|---------------------------------|
//! | `should_capture`, `on_inner_scroll`  | [`ScrollCoordinator`]           |
//! | `on_grant` .. `on_terminate`         | [`GestureDragController`]       |
//! | `set_visible`, dismiss requests      | [`VisibilityLifecycle`]         |
//! | `tick`                               | drivers, then both machines     |
//!
//! Rendering code only reads: [`BottomSheet::offset`],
//! [`BottomSheet::backdrop_intensity`], [`BottomSheet::is_mounted`], and
//! friends.
//!
//! # Example
//!
//! ```
//! use snapsheet::{BottomSheet, DragSample, SheetConfig, SheetEvent};
//! use web_time::Duration;
//!
//! let mut sheet = BottomSheet::new(SheetConfig::default(), 1000.0)?;
//! sheet.set_visible(true);
//! while !sheet.tick(Duration::from_millis(16)).contains(&SheetEvent::Opened) {}
//! assert_eq!(sheet.offset(), 400.0);
//!
//! assert!(sheet.should_capture(0.0, 12.0));
//! sheet.on_grant();
//! sheet.on_move(DragSample::vertical(50.0, 0.0));
//! sheet.on_release(DragSample::vertical(50.0, 0.0));
//! # Ok::<(), snapsheet::SheetError>(())
//! ```

use std::fmt;

use snapsheet_core::{AnimatedValue, AnimationDriver};
use web_time::Duration;

use crate::config::{SheetConfig, SheetTuning};
use crate::error::Result;
use crate::gesture::{DragOutcome, DragSample, DragState, GestureDragController, GestureState};
use crate::lifecycle::{DismissReason, LifecycleEvent, PanelPhase, VisibilityLifecycle};
use crate::motion::SheetMotion;
use crate::scroll::{GestureDelta, ScrollCoordinator};
use crate::snap::{self, ResolvedOffsets};

/// Something the host may want to react to, reported from [`BottomSheet::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetEvent {
    /// The open motion settled on the initial snap.
    Opened,
    /// A snap motion settled.
    Snapped { index: usize },
    /// The panel finished closing and unmounted.
    Closed { reason: DismissReason },
}

/// Draggable snap-point panel.
pub struct BottomSheet<D: AnimationDriver = AnimatedValue> {
    config: SheetConfig,
    tuning: SheetTuning,
    offsets: ResolvedOffsets,
    motion: SheetMotion<D>,
    scroll: ScrollCoordinator,
    gesture: GestureDragController,
    lifecycle: VisibilityLifecycle,
    snap_index: usize,
    /// Events raised outside the frame clock, reported by the next tick.
    queued: Vec<SheetEvent>,
    on_close: Option<Box<dyn FnMut()>>,
}

impl BottomSheet<AnimatedValue> {
    /// Closed, unmounted panel with the default drivers.
    pub fn new(config: SheetConfig, container_height: f64) -> Result<Self> {
        Self::with_drivers(
            config,
            container_height,
            AnimatedValue::default(),
            AnimatedValue::default(),
        )
    }
}

impl<D: AnimationDriver> BottomSheet<D> {
    /// Closed, unmounted panel over caller-supplied drivers.
    ///
    /// Fails when the snap points are empty or non-finite, or the container
    /// height is unusable.
    pub fn with_drivers(config: SheetConfig, container_height: f64, offset: D, backdrop: D) -> Result<Self> {
        let offsets = snap::resolve(&config.snap_points, container_height)?;
        let tuning = SheetTuning::default();
        let mut motion = SheetMotion::with_drivers(offset, backdrop);
        motion.reset_closed(container_height);
        let snap_index = offsets.clamp_index(config.initial_snap_index);

        Ok(Self {
            scroll: ScrollCoordinator::new(tuning.capture_threshold),
            config,
            tuning,
            offsets,
            motion,
            gesture: GestureDragController::new(),
            lifecycle: VisibilityLifecycle::new(),
            snap_index,
            queued: Vec::new(),
            on_close: None,
        })
    }

    /// Replace the interaction tuning.
    #[must_use]
    pub fn with_tuning(mut self, tuning: SheetTuning) -> Self {
        self.scroll.set_threshold(tuning.capture_threshold);
        self.tuning = tuning;
        self
    }

    /// Install the close notification. Fires at most once per open session.
    #[must_use]
    pub fn on_close(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_close = Some(Box::new(callback));
        self
    }

    // --- gesture surface ---------------------------------------------------

    /// Whether the panel should claim a gesture with travel `(dx, dy)`.
    pub fn should_capture(&self, dx: f64, dy: f64) -> bool {
        self.accepts_drag() && self.scroll.should_capture(GestureDelta::new(dx, dy))
    }

    /// The gesture layer granted the panel a drag. Returns whether it took it.
    ///
    /// A grant while opening cuts the open short: the panel counts as open
    /// and [`SheetEvent::Opened`] is reported by the next [`tick`](Self::tick).
    pub fn on_grant(&mut self) -> bool {
        if !self.accepts_drag() {
            return false;
        }
        self.gesture.on_grant(&mut self.motion);
        if self.lifecycle.promote_open().is_some() {
            self.queued.push(SheetEvent::Opened);
        }
        self.lifecycle.begin_drag();
        self.scroll.set_panel_captured(true);
        true
    }

    /// Apply a move. Returns the new offset while dragging.
    pub fn on_move(&mut self, sample: DragSample) -> Option<f64> {
        self.gesture.on_move(sample, &self.offsets, &mut self.motion)
    }

    /// Drag released.
    pub fn on_release(&mut self, sample: DragSample) -> Option<DragOutcome> {
        let outcome = self
            .gesture
            .on_release(sample, &self.offsets, &self.tuning, &mut self.motion)?;
        self.after_drag(outcome);
        Some(outcome)
    }

    /// Drag cancelled by the gesture layer.
    pub fn on_terminate(&mut self) -> Option<DragOutcome> {
        let outcome = self
            .gesture
            .on_terminate(&self.offsets, &self.tuning, &mut self.motion)?;
        self.after_drag(outcome);
        Some(outcome)
    }

    /// Scrollable content reported its offset.
    pub fn on_inner_scroll(&mut self, offset: f64) {
        self.scroll.on_inner_scroll(offset);
    }

    // --- host surface ------------------------------------------------------

    /// Apply the host's visibility intent.
    pub fn set_visible(&mut self, visible: bool) {
        let was_opening = self.lifecycle.phase() == PanelPhase::Opening;
        self.lifecycle.on_visibility_change(
            visible,
            self.config.initial_snap_index,
            &self.offsets,
            &self.tuning,
            &mut self.motion,
        );
        match self.lifecycle.phase() {
            PanelPhase::Opening if !was_opening => {
                // A reopen may interrupt a close that a drag started.
                self.gesture.reset();
                self.snap_index = self.offsets.clamp_index(self.config.initial_snap_index);
            }
            PanelPhase::Closing => self.release_gesture(),
            _ => {}
        }
    }

    /// Tap outside the panel. Returns whether a close started.
    pub fn on_backdrop_press(&mut self) -> bool {
        if !self.config.close_on_backdrop_press {
            tracing::trace!("backdrop press ignored");
            return false;
        }
        self.dismiss(DismissReason::BackdropPress)
    }

    /// Host asked the panel to close (platform back, modal close request).
    pub fn request_close(&mut self) -> bool {
        self.dismiss(DismissReason::CloseRequest)
    }

    /// The container resized. Offsets are recomputed immediately.
    pub fn set_container_height(&mut self, container_height: f64) -> Result<()> {
        let offsets = snap::resolve(&self.config.snap_points, container_height).inspect_err(|err| {
            tracing::warn!(%err, container_height, "resize rejected");
        })?;
        self.apply_offsets(offsets);
        Ok(())
    }

    /// Swap in a new configuration. On error the previous one stays.
    pub fn update_config(&mut self, config: SheetConfig) -> Result<()> {
        let offsets = snap::resolve(&config.snap_points, self.offsets.container_height())
            .inspect_err(|err| tracing::warn!(%err, "configuration rejected"))?;
        self.config = config;
        self.apply_offsets(offsets);
        Ok(())
    }

    // --- frame clock -------------------------------------------------------

    /// Advance animations by `dt` and report what settled.
    pub fn tick(&mut self, dt: Duration) -> Vec<SheetEvent> {
        let mut events = std::mem::take(&mut self.queued);
        for completion in self.motion.advance(dt) {
            if let Some(index) = self.gesture.on_completion(completion) {
                self.snap_index = index;
                events.push(SheetEvent::Snapped { index });
            }
            match self.lifecycle.on_completion(completion) {
                Some(LifecycleEvent::Opened) => events.push(SheetEvent::Opened),
                Some(LifecycleEvent::Closed { reason, notify }) => {
                    self.gesture.reset();
                    self.scroll.reset();
                    if notify && let Some(callback) = self.on_close.as_mut() {
                        callback();
                    }
                    events.push(SheetEvent::Closed { reason });
                }
                None => {}
            }
        }
        events
    }

    // --- render surface ----------------------------------------------------

    #[inline]
    pub fn phase(&self) -> PanelPhase {
        self.lifecycle.phase()
    }

    /// Whether the panel and its children should be rendered.
    #[inline]
    pub fn is_mounted(&self) -> bool {
        self.lifecycle.is_mounted()
    }

    /// Distance from the container top to the panel top.
    pub fn offset(&self) -> f64 {
        self.motion.offset()
    }

    /// Geometric openness of the current offset, in [0, 1].
    pub fn openness(&self) -> f64 {
        self.offsets.openness(self.offset())
    }

    /// Unscaled backdrop level in [0, 1].
    pub fn backdrop_level(&self) -> f64 {
        self.motion.backdrop()
    }

    /// Backdrop as rendered: level times the configured opacity.
    pub fn backdrop_intensity(&self) -> f64 {
        self.motion.backdrop() * self.config.effective_backdrop_opacity()
    }

    /// Rendered panel height: the tallest snap.
    pub fn panel_height(&self) -> f64 {
        self.offsets.panel_height()
    }

    pub fn inner_scroll_enabled(&self) -> bool {
        self.scroll.inner_scroll_enabled()
    }

    pub fn offsets(&self) -> &ResolvedOffsets {
        &self.offsets
    }

    /// Snap index the panel rests at or is heading to.
    pub fn current_snap_index(&self) -> usize {
        self.snap_index
    }

    pub fn gesture_state(&self) -> GestureState {
        self.gesture.gesture_state()
    }

    pub fn drag_state(&self) -> DragState {
        self.gesture.state()
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn tuning(&self) -> &SheetTuning {
        &self.tuning
    }

    // --- internals ---------------------------------------------------------

    fn accepts_drag(&self) -> bool {
        matches!(self.lifecycle.phase(), PanelPhase::Open | PanelPhase::Opening)
    }

    fn dismiss(&mut self, reason: DismissReason) -> bool {
        let started = self
            .lifecycle
            .begin_dismiss(reason, &self.offsets, &self.tuning, &mut self.motion);
        if started {
            self.release_gesture();
        }
        started
    }

    fn after_drag(&mut self, outcome: DragOutcome) {
        self.scroll.set_panel_captured(false);
        match outcome {
            DragOutcome::Snapping { index, .. } => {
                self.snap_index = index;
                self.lifecycle.end_drag();
            }
            DragOutcome::Dismiss => {
                self.dismiss(DismissReason::Gesture);
            }
        }
    }

    /// A close took over: whatever the drag was doing no longer matters.
    fn release_gesture(&mut self) {
        if self.gesture.state() != DragState::Dismissing {
            self.gesture.reset();
        }
        self.scroll.set_panel_captured(false);
    }

    fn apply_offsets(&mut self, offsets: ResolvedOffsets) {
        self.offsets = offsets;
        self.scroll.set_threshold(self.tuning.capture_threshold);
        self.snap_index = self.offsets.clamp_index(i64::try_from(self.snap_index).unwrap_or(i64::MAX));
        tracing::debug!(
            container_height = self.offsets.container_height(),
            snaps = self.offsets.len(),
            phase = self.phase().as_str(),
            "offsets recomputed"
        );

        match self.lifecycle.phase() {
            PanelPhase::Open => {
                self.gesture
                    .snap_to_index(self.snap_index, &self.offsets, &self.tuning, &mut self.motion);
            }
            PanelPhase::Opening => {
                self.snap_index = self.offsets.clamp_index(self.config.initial_snap_index);
                self.lifecycle.retarget(
                    self.config.initial_snap_index,
                    &self.offsets,
                    &self.tuning,
                    &mut self.motion,
                );
            }
            PanelPhase::Closing | PanelPhase::Closed => {
                self.lifecycle.retarget(
                    self.config.initial_snap_index,
                    &self.offsets,
                    &self.tuning,
                    &mut self.motion,
                );
            }
            PanelPhase::Dragging => {}
        }
    }
}

impl<D: AnimationDriver + fmt::Debug> fmt::Debug for BottomSheet<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BottomSheet")
            .field("config", &self.config)
            .field("offsets", &self.offsets)
            .field("motion", &self.motion)
            .field("phase", &self.lifecycle.phase())
            .field("drag", &self.gesture.state())
            .field("snap_index", &self.snap_index)
            .field("queued", &self.queued)
            .field("on_close", &self.on_close.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    const FRAME: Duration = Duration::from_millis(16);

    fn settle(sheet: &mut BottomSheet) -> Vec<SheetEvent> {
        (0..300).flat_map(|_| sheet.tick(FRAME)).collect()
    }

    fn open_sheet(config: SheetConfig) -> (BottomSheet, Rc<Cell<u32>>) {
        let closes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&closes);
        let mut sheet = BottomSheet::new(config, 1000.0)
            .expect("valid")
            .on_close(move || counter.set(counter.get() + 1));
        sheet.set_visible(true);
        settle(&mut sheet);
        (sheet, closes)
    }

    #[test]
    fn unmounted_panel_rests_offscreen() {
        let sheet = BottomSheet::new(SheetConfig::default(), 1000.0).expect("valid");
        assert!(!sheet.is_mounted());
        assert_eq!(sheet.offset(), 1000.0);
        assert_eq!(sheet.backdrop_intensity(), 0.0);
        assert!(!sheet.should_capture(0.0, -20.0));
    }

    #[test]
    fn empty_snap_points_fail_construction() {
        let config = SheetConfig::default().snap_points(Vec::new());
        assert!(BottomSheet::new(config, 1000.0).is_err());
    }

    #[test]
    fn open_settles_at_initial_index() {
        let (sheet, _) = open_sheet(SheetConfig::default());
        assert_eq!(sheet.phase(), PanelPhase::Open);
        assert_eq!(sheet.offset(), 400.0);
        assert_eq!(sheet.current_snap_index(), 1);
        assert!((sheet.backdrop_intensity() - 0.35).abs() < 1e-9);
        assert!((sheet.panel_height() - 900.0).abs() < 1e-9);
    }

    #[test]
    fn backdrop_press_respects_config() {
        let (mut sheet, closes) = open_sheet(SheetConfig::default().close_on_backdrop_press(false));
        assert!(!sheet.on_backdrop_press());
        assert_eq!(sheet.phase(), PanelPhase::Open);

        assert!(sheet.request_close());
        let events = settle(&mut sheet);
        assert_eq!(
            events,
            vec![SheetEvent::Closed {
                reason: DismissReason::CloseRequest
            }]
        );
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn drag_locks_inner_scroll_until_release() {
        let (mut sheet, _) = open_sheet(SheetConfig::default());
        assert!(sheet.on_grant());
        assert!(!sheet.inner_scroll_enabled());
        assert_eq!(sheet.phase(), PanelPhase::Dragging);
        sheet.on_move(DragSample::vertical(-100.0, 0.0));
        sheet.on_release(DragSample::vertical(-100.0, 0.0));
        assert!(sheet.inner_scroll_enabled());
        assert_eq!(sheet.phase(), PanelPhase::Open);
    }

    #[test]
    fn resize_retargets_resting_panel() {
        let (mut sheet, _) = open_sheet(SheetConfig::default());
        sheet.set_container_height(2000.0).expect("valid");
        let events = settle(&mut sheet);
        assert_eq!(events, vec![SheetEvent::Snapped { index: 1 }]);
        assert!((sheet.offset() - 800.0).abs() < 1e-9);
    }

    #[test]
    fn bad_resize_keeps_previous_offsets() {
        let (mut sheet, _) = open_sheet(SheetConfig::default());
        assert!(sheet.set_container_height(0.0).is_err());
        assert_eq!(sheet.offsets().container_height(), 1000.0);
    }

    #[test]
    fn update_config_clamps_snap_index() {
        let (mut sheet, _) = open_sheet(SheetConfig::default());
        sheet
            .update_config(SheetConfig::default().snap_points(vec![0.5]))
            .expect("valid");
        assert_eq!(sheet.current_snap_index(), 0);
        settle(&mut sheet);
        assert_eq!(sheet.offset(), 500.0);
    }

    #[test]
    fn grant_refused_while_closing() {
        let (mut sheet, _) = open_sheet(SheetConfig::default());
        sheet.set_visible(false);
        assert!(!sheet.on_grant());
        assert_eq!(sheet.on_move(DragSample::vertical(10.0, 0.0)), None);
    }

    #[test]
    fn grant_while_opening_queues_opened() {
        let mut sheet = BottomSheet::new(SheetConfig::default(), 1000.0).expect("valid");
        sheet.set_visible(true);
        sheet.tick(FRAME);
        assert_eq!(sheet.phase(), PanelPhase::Opening);

        assert!(sheet.on_grant());
        assert_eq!(sheet.phase(), PanelPhase::Dragging);
        assert_eq!(sheet.tick(FRAME), vec![SheetEvent::Opened]);
        assert!(sheet.tick(FRAME).is_empty());
    }
}
