#![forbid(unsafe_code)]

//! Snapsheet
//!
//! A draggable panel that rests at discrete heights ("snap points"), follows
//! a vertical drag, and on release picks a snap, or dismisses, from the
//! release position and velocity.
//!
//! # Key Components
//!
//! - [`BottomSheet`] - Facade a host drives with gesture, scroll, visibility,
//!   and frame-clock input
//! - [`snap::resolve`] - Snap fractions to ascending panel offsets
//! - [`ScrollCoordinator`] - Panel vs. inner-content gesture arbitration
//! - [`GestureDragController`] - Grant / move / release / terminate machine
//! - [`VisibilityLifecycle`] - Mount, open, close, and unmount sequencing
//! - [`SheetConfig`] / [`SheetTuning`] - Host configuration and tuned constants
//!
//! # How it fits together
//! Offsets are resolved once per configuration or container change. The
//! gesture controller consumes them while dragging; the lifecycle and the
//! gesture controller both drive the two animated scalars in
//! [`SheetMotion`]; the scroll coordinator decides whether the gesture
//! controller sees a gesture at all. Everything runs on the caller's thread
//! and advances only when the host calls [`BottomSheet::tick`].

pub mod config;
pub mod error;
pub mod gesture;
pub mod lifecycle;
pub mod motion;
pub mod scroll;
pub mod sheet;
pub mod snap;

pub use config::{ConfigError, SheetConfig, SheetFile, SheetTuning};
pub use error::{Result, SheetError};
pub use gesture::{
    DragOutcome, DragSample, DragState, GestureDragController, GestureState, ReleaseDecision,
    decide_release,
};
pub use lifecycle::{DismissReason, LifecycleEvent, PanelPhase, VisibilityLifecycle};
pub use motion::SheetMotion;
pub use scroll::{GestureDelta, ScrollCoordinator};
pub use sheet::{BottomSheet, SheetEvent};
pub use snap::ResolvedOffsets;

pub use snapsheet_core::{AnimatedValue, AnimationDriver, AnimationTicket, Completion, Motion};
