#![forbid(unsafe_code)]

//! Scenario replayer for snapsheet panels.
//!
//! Scripts describe host input (visibility, gestures, scroll, resize, frame
//! ticks) and optional expectations. The replayer feeds them to a
//! `BottomSheet` on a fixed frame clock and reports the panel state after
//! every step as one JSON line on stdout. Logs go to stderr.

pub mod cli;
pub mod error;
pub mod replay;
pub mod script;

pub use cli::{run, run_from_env};
pub use error::{HarnessError, Result};
