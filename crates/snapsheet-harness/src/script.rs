//! Scenario scripts.
//!
//! A script is a JSON document: the container height, optional `sheet` and
//! `tuning` sections (same shape as the snapsheet config file), the frame
//! interval, and a list of steps tagged by `op`.
//!
//! ```json
//! {
//!   "container_height": 1000,
//!   "steps": [
//!     { "op": "visible", "value": true },
//!     { "op": "tick", "frames": 30 },
//!     { "op": "grant" },
//!     { "op": "move", "dy": 40, "vy": 2.0 },
//!     { "op": "release", "dy": 40, "vy": 2.0 },
//!     { "op": "tick", "frames": 15 },
//!     { "op": "expect", "phase": "closed", "closes": 1 }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use snapsheet::{SheetConfig, SheetTuning};

use crate::error::{HarnessError, Result};

fn default_frame_ms() -> u64 {
    16
}

fn default_frames() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub container_height: f64,
    #[serde(default)]
    pub sheet: SheetConfig,
    #[serde(default)]
    pub tuning: SheetTuning,
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    pub steps: Vec<Step>,
}

/// One host input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Visible {
        value: bool,
    },
    /// Ask whether the panel would claim this gesture; grants it if so.
    Capture {
        #[serde(default)]
        dx: f64,
        dy: f64,
    },
    Grant,
    Move {
        #[serde(default)]
        dx: f64,
        dy: f64,
        #[serde(default)]
        vy: f64,
    },
    Release {
        #[serde(default)]
        dx: f64,
        dy: f64,
        #[serde(default)]
        vy: f64,
    },
    Terminate,
    Scroll {
        offset: f64,
    },
    Backdrop,
    RequestClose,
    Resize {
        height: f64,
    },
    Tick {
        #[serde(default = "default_frames")]
        frames: u32,
    },
    /// Assert on the current state. Absent fields are not checked.
    Expect {
        #[serde(default)]
        phase: Option<String>,
        #[serde(default)]
        offset: Option<f64>,
        #[serde(default)]
        snap_index: Option<usize>,
        #[serde(default)]
        closes: Option<u32>,
    },
}

impl Step {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Visible { .. } => "visible",
            Self::Capture { .. } => "capture",
            Self::Grant => "grant",
            Self::Move { .. } => "move",
            Self::Release { .. } => "release",
            Self::Terminate => "terminate",
            Self::Scroll { .. } => "scroll",
            Self::Backdrop => "backdrop",
            Self::RequestClose => "request_close",
            Self::Resize { .. } => "resize",
            Self::Tick { .. } => "tick",
            Self::Expect { .. } => "expect",
        }
    }
}

impl Script {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let script: Self = serde_json::from_str(s)?;
        script.validate()?;
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HarnessError::MissingScript {
                path: path.to_path_buf(),
            });
        }
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(HarnessError::InvalidScript {
                message: "script has no steps".into(),
            });
        }
        if self.frame_ms == 0 {
            return Err(HarnessError::InvalidScript {
                message: "frame_ms must be positive".into(),
            });
        }
        let errors = self.tuning.validate();
        if !errors.is_empty() {
            return Err(HarnessError::InvalidScript {
                message: errors.join("; "),
            });
        }
        Ok(())
    }
}
