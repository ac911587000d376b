#![forbid(unsafe_code)]

//! Scalar animation contract and its default implementation.
//!
//! A panel is positioned by exactly two scalars (offset and backdrop). Each
//! is owned by one [`AnimationDriver`], which runs at most one motion at a
//! time:
//!
//! - [`AnimationDriver::animate_to`] starts a motion and returns an
//!   [`AnimationTicket`]. Starting another motion supersedes the first.
//! - [`AnimationDriver::advance`] steps the motion on the host frame clock and
//!   reports every ticket exactly once, as [`Completion::Settled`] or
//!   [`Completion::Interrupted`].
//! - [`AnimationDriver::interrupt`] freezes the scalar mid-flight and returns
//!   its value, which is how a drag picks up a panel that is still moving.
//!
//! Everything runs on one thread; there are no locks and no wakers. A caller
//! that "awaits" a motion simply holds its ticket and reacts when `advance`
//! reports it.

pub mod easing;
pub mod spring;
pub mod timed;
pub mod value;

pub use easing::Easing;
pub use spring::{Spring, SpringConfig};
pub use timed::{TimingConfig, Tween};
pub use value::AnimatedValue;

use web_time::Duration;

/// Identity of one `animate_to` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationTicket(u64);

impl AnimationTicket {
    /// Wrap a raw id. Drivers hand these out monotonically.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw id.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// How a ticket ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The scalar reached the ticket's target.
    Settled(AnimationTicket),
    /// A later request or an explicit interrupt took over first.
    Interrupted(AnimationTicket),
}

impl Completion {
    /// The ticket this completion belongs to.
    #[must_use]
    pub fn ticket(self) -> AnimationTicket {
        match self {
            Self::Settled(ticket) | Self::Interrupted(ticket) => ticket,
        }
    }

    /// Whether the motion ran to its target.
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Settled(_))
    }
}

/// Shape of a motion toward a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Physically simulated; honours an initial velocity.
    Spring(SpringConfig),
    /// Fixed duration along an easing curve; ignores initial velocity.
    Timed(TimingConfig),
}

impl Motion {
    /// Spring motion with the given parameters.
    #[must_use]
    pub fn spring(config: SpringConfig) -> Self {
        Self::Spring(config)
    }

    /// Timed motion with the default curve.
    #[must_use]
    pub fn timed(duration: Duration) -> Self {
        Self::Timed(TimingConfig::new(duration))
    }
}

/// A single animated scalar.
///
/// Implementations guarantee at most one active motion; the latest request
/// always wins and the final settled value is the latest requested target.
pub trait AnimationDriver {
    /// Current value.
    fn read(&self) -> f64;

    /// Start moving toward `target`. `initial_velocity` is in units per
    /// second and only affects spring motion.
    fn animate_to(
        &mut self,
        target: f64,
        motion: Motion,
        initial_velocity: Option<f64>,
    ) -> AnimationTicket;

    /// Halt immediately and return the value at the moment of interruption.
    fn interrupt(&mut self) -> f64;

    /// Jump to `value` without animating. Interrupts any active motion.
    fn set(&mut self, value: f64);

    /// Whether no motion is active.
    fn is_settled(&self) -> bool;

    /// Step the active motion by `dt` and drain completions in the order
    /// they happened.
    fn advance(&mut self, dt: Duration) -> Vec<Completion>;
}
