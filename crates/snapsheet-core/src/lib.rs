#![forbid(unsafe_code)]

//! Core: animated scalars for snapsheet.
//!
//! # Role in snapsheet
//! `snapsheet-core` owns the motion layer. It knows nothing about panels,
//! gestures, or snap points; it moves one number toward a target, either
//! along a damped spring or a timed easing curve, and tells its owner when
//! the number got there (or was taken over by a newer request).
//!
//! # Primary responsibilities
//! - **AnimationDriver**: the contract every panel scalar is driven through.
//! - **AnimatedValue**: the default driver, stepped by a host frame clock.
//! - **Spring / Tween**: the two motion shapes, plus [`animation::Easing`].
//!
//! # How it fits in the system
//! The `snapsheet` crate owns two drivers per panel (offset and backdrop)
//! and is the only writer; rendering reads values through it.

pub mod animation;

pub use animation::{AnimatedValue, AnimationDriver, AnimationTicket, Completion, Motion};
