#![forbid(unsafe_code)]

//! Gesture arbitration between the panel and scrollable content inside it.
//!
//! A vertical drag either moves the panel or scrolls its content, never both.
//! The coordinator owns the last reported inner scroll offset and whether the
//! panel currently holds capture; the host reads
//! [`ScrollCoordinator::inner_scroll_enabled`] to lock content scrolling.

/// Cumulative gesture travel since touch-down.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GestureDelta {
    pub dx: f64,
    pub dy: f64,
}

impl GestureDelta {
    #[must_use]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

/// Capture decision for one gesture.
///
/// Rules, first match wins:
/// 1. `|dy| <= |dx|`: not vertical enough, leave it to content.
/// 2. `dy > threshold` with content at its top: the panel takes it.
/// 3. `dy < -threshold`: the panel takes it (expanding beats inner scroll).
/// 4. Anything else stays with content.
#[must_use]
pub fn should_capture_for_panel(delta: GestureDelta, inner_scroll_offset: f64, threshold: f64) -> bool {
    let GestureDelta { dx, dy } = delta;
    if dy.abs() <= dx.abs() {
        return false;
    }
    if dy > threshold && inner_scroll_offset <= 0.0 {
        return true;
    }
    dy < -threshold
}

/// Per-panel arbitration state.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollCoordinator {
    threshold: f64,
    inner_scroll_offset: f64,
    panel_captured: bool,
}

impl ScrollCoordinator {
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            inner_scroll_offset: 0.0,
            panel_captured: false,
        }
    }

    /// Decide against the most recently reported inner scroll offset.
    #[must_use]
    pub fn should_capture(&self, delta: GestureDelta) -> bool {
        should_capture_for_panel(delta, self.inner_scroll_offset, self.threshold)
    }

    /// Record the content's scroll position. Called on every scroll event.
    pub fn on_inner_scroll(&mut self, offset: f64) {
        self.inner_scroll_offset = offset;
    }

    /// Last reported inner scroll offset.
    #[must_use]
    pub fn inner_scroll_offset(&self) -> f64 {
        self.inner_scroll_offset
    }

    /// Mark the panel as holding (or releasing) gesture capture.
    pub fn set_panel_captured(&mut self, captured: bool) {
        if self.panel_captured != captured {
            tracing::trace!(captured, "panel capture changed");
        }
        self.panel_captured = captured;
    }

    #[must_use]
    pub fn is_panel_captured(&self) -> bool {
        self.panel_captured
    }

    /// Content may scroll only while the panel does not hold capture.
    #[must_use]
    pub fn inner_scroll_enabled(&self) -> bool {
        !self.panel_captured
    }

    pub fn set_threshold(&mut self, threshold: f64) {
        self.threshold = threshold;
    }

    /// Forget per-session state; used when the panel unmounts.
    pub fn reset(&mut self) {
        self.inner_scroll_offset = 0.0;
        self.panel_captured = false;
    }
}
