#![forbid(unsafe_code)]

//! Mount, open, close, and unmount sequencing.
//!
//! # State Machine
//!
//! ```text
//!                 visible                settled
//!   Closed ─────────────────▶ Opening ───────────▶ Open ◀──── end_drag ────┐
//!     ▲                         │                   ▲ │                    │
//!     │                         │ promote_open      │ │ begin_drag         │
//!     │                         └───────────────────┘ └────────▶ Dragging ─┘
//!     │                                             │                │
//!     │      settled (unmount)                      │ begin_dismiss  │ begin_dismiss
//!     └──────────────────────── Closing ◀───────────┴────────────────┘
//! ```
//!
//! `Dragging` is only entered from `Open`. A grant that lands while the
//! panel is still opening promotes it to `Open` first, which reports
//! [`LifecycleEvent::Opened`] just as a settled open would.
//!
//! `Opening` and `Closing` are transient. A dismissal from any cause goes
//! through [`VisibilityLifecycle::begin_dismiss`], which is a no-op when a
//! close is already in flight; together with a per-session latch this keeps
//! the close notification to at most one per session.

use snapsheet_core::{AnimationDriver, AnimationTicket, Completion};

use crate::config::SheetTuning;
use crate::motion::SheetMotion;
use crate::snap::ResolvedOffsets;

/// Coarse panel state, as a rendering host sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelPhase {
    #[default]
    Closed,
    Opening,
    Open,
    Dragging,
    Closing,
}

impl PanelPhase {
    /// Whether the panel's children are rendered.
    #[must_use]
    pub fn is_visible(self) -> bool {
        self != Self::Closed
    }

    /// Whether the panel is in a transient animated phase.
    #[must_use]
    pub fn is_animating(self) -> bool {
        matches!(self, Self::Opening | Self::Closing)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Open => "open",
            Self::Dragging => "dragging",
            Self::Closing => "closing",
        }
    }
}

/// What started a dismissal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    /// Released past the threshold or flicked down.
    Gesture,
    /// Tap outside the panel.
    BackdropPress,
    /// Host close request (platform back, modal close).
    CloseRequest,
    /// Visibility intent went false.
    Hidden,
}

impl DismissReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gesture => "gesture",
            Self::BackdropPress => "backdrop_press",
            Self::CloseRequest => "close_request",
            Self::Hidden => "hidden",
        }
    }
}

/// Sequencing results the owner acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The open motion settled.
    Opened,
    /// The close motion settled and the panel unmounted. `notify` is set the
    /// first time in a session, when the owner must fire its close callback.
    Closed { reason: DismissReason, notify: bool },
}

/// Visibility state machine.
#[derive(Debug, Clone, Default)]
pub struct VisibilityLifecycle {
    phase: PanelPhase,
    mounted: bool,
    intent: bool,
    pending: Option<AnimationTicket>,
    close_reason: Option<DismissReason>,
    close_notified: bool,
}

impl VisibilityLifecycle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> PanelPhase {
        self.phase
    }

    #[inline]
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Last visibility intent the host expressed.
    #[inline]
    #[must_use]
    pub fn intent(&self) -> bool {
        self.intent
    }

    /// Reason of the close in flight, if any.
    #[must_use]
    pub fn close_reason(&self) -> Option<DismissReason> {
        self.close_reason
    }

    /// Apply a visibility intent. Edge-triggered: repeating the current
    /// intent does nothing.
    pub fn on_visibility_change<D: AnimationDriver>(
        &mut self,
        visible: bool,
        initial_index: i64,
        offsets: &ResolvedOffsets,
        tuning: &SheetTuning,
        motion: &mut SheetMotion<D>,
    ) {
        if visible == self.intent {
            return;
        }
        self.intent = visible;

        if !visible {
            self.begin_dismiss(DismissReason::Hidden, offsets, tuning, motion);
            return;
        }

        if !self.mounted {
            self.mounted = true;
            self.close_notified = false;
            motion.reset_closed(offsets.container_height());
        } else if self.phase != PanelPhase::Closing {
            return;
        }

        let target = offsets.offset_at(initial_index);
        self.close_reason = None;
        self.phase = PanelPhase::Opening;
        self.pending = Some(motion.open_to(target, tuning));
        tracing::debug!(target, "panel opening");
    }

    /// Single dismissal entry point. Returns whether a close started.
    pub fn begin_dismiss<D: AnimationDriver>(
        &mut self,
        reason: DismissReason,
        offsets: &ResolvedOffsets,
        tuning: &SheetTuning,
        motion: &mut SheetMotion<D>,
    ) -> bool {
        if !self.mounted || matches!(self.phase, PanelPhase::Closing | PanelPhase::Closed) {
            tracing::trace!(reason = reason.as_str(), phase = self.phase.as_str(), "dismiss ignored");
            return false;
        }
        self.phase = PanelPhase::Closing;
        self.close_reason = Some(reason);
        self.pending = Some(motion.dismiss(offsets.container_height(), tuning));
        tracing::debug!(reason = reason.as_str(), "panel closing");
        true
    }

    /// Finish an open early. The caller has already stopped the open
    /// motion; its completion is ignored.
    pub fn promote_open(&mut self) -> Option<LifecycleEvent> {
        if self.phase != PanelPhase::Opening {
            return None;
        }
        self.pending = None;
        self.phase = PanelPhase::Open;
        tracing::debug!("panel open");
        Some(LifecycleEvent::Opened)
    }

    /// A drag took the panel. Only allowed from `Open`.
    pub fn begin_drag(&mut self) -> bool {
        if self.phase != PanelPhase::Open {
            return false;
        }
        self.phase = PanelPhase::Dragging;
        true
    }

    /// A drag ended in a snap.
    pub fn end_drag(&mut self) {
        if self.phase == PanelPhase::Dragging {
            self.phase = PanelPhase::Open;
        }
    }

    /// Re-aim the motion in flight after offsets changed.
    pub fn retarget<D: AnimationDriver>(
        &mut self,
        initial_index: i64,
        offsets: &ResolvedOffsets,
        tuning: &SheetTuning,
        motion: &mut SheetMotion<D>,
    ) {
        match self.phase {
            PanelPhase::Opening => {
                self.pending = Some(motion.open_to(offsets.offset_at(initial_index), tuning));
            }
            PanelPhase::Closing => {
                self.pending = Some(motion.dismiss(offsets.container_height(), tuning));
            }
            PanelPhase::Closed => motion.reset_closed(offsets.container_height()),
            PanelPhase::Open | PanelPhase::Dragging => {}
        }
    }

    /// Feed an offset completion.
    pub fn on_completion(&mut self, completion: Completion) -> Option<LifecycleEvent> {
        if self.pending != Some(completion.ticket()) {
            return None;
        }
        self.pending = None;
        if !completion.is_settled() {
            return None;
        }

        match self.phase {
            PanelPhase::Opening => {
                self.phase = PanelPhase::Open;
                tracing::debug!("panel open");
                Some(LifecycleEvent::Opened)
            }
            PanelPhase::Closing => {
                let reason = self.close_reason.take().unwrap_or(DismissReason::Hidden);
                self.phase = PanelPhase::Closed;
                self.mounted = false;
                if reason != DismissReason::Hidden {
                    self.intent = false;
                }
                let notify = !self.close_notified;
                self.close_notified = true;
                tracing::debug!(reason = reason.as_str(), notify, "panel closed");
                Some(LifecycleEvent::Closed { reason, notify })
            }
            _ => None,
        }
    }
}
