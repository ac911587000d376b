//! Drives a `BottomSheet` through a script on a fixed frame clock.

use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;

use serde::Serialize;
use serde_json::{Value, json};
use snapsheet::{BottomSheet, DragOutcome, DragSample, SheetEvent};
use web_time::Duration;

use crate::error::{HarnessError, Result};
use crate::script::{Script, Step};

const OFFSET_TOLERANCE: f64 = 1e-6;

/// Totals after a replay.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Summary {
    pub steps: usize,
    pub frames: u64,
    pub closes: u32,
    pub final_phase: &'static str,
    pub final_offset: f64,
}

/// Replays one script against a fresh panel.
pub struct Replayer {
    sheet: BottomSheet,
    closes: Rc<Cell<u32>>,
    frame: Duration,
    frames: u64,
}

impl Replayer {
    pub fn new(script: &Script) -> Result<Self> {
        let closes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&closes);
        let sheet = BottomSheet::new(script.sheet.clone(), script.container_height)?
            .with_tuning(script.tuning.clone())
            .on_close(move || counter.set(counter.get() + 1));
        Ok(Self {
            sheet,
            closes,
            frame: Duration::from_millis(script.frame_ms),
            frames: 0,
        })
    }

    /// Run every step, writing one JSON line per step to `out`.
    pub fn run(mut self, script: &Script, out: &mut impl Write) -> Result<Summary> {
        for (index, step) in script.steps.iter().enumerate() {
            let (result, events) = self.apply(index, step)?;
            let line = json!({
                "step": index,
                "op": step.name(),
                "result": result,
                "events": events.iter().map(event_json).collect::<Vec<_>>(),
                "phase": self.sheet.phase().as_str(),
                "mounted": self.sheet.is_mounted(),
                "offset": self.sheet.offset(),
                "backdrop": self.sheet.backdrop_intensity(),
                "snap_index": self.sheet.current_snap_index(),
                "inner_scroll": self.sheet.inner_scroll_enabled(),
                "closes": self.closes.get(),
            });
            writeln!(out, "{line}")?;
        }

        Ok(Summary {
            steps: script.steps.len(),
            frames: self.frames,
            closes: self.closes.get(),
            final_phase: self.sheet.phase().as_str(),
            final_offset: self.sheet.offset(),
        })
    }

    fn apply(&mut self, index: usize, step: &Step) -> Result<(Value, Vec<SheetEvent>)> {
        tracing::debug!(step = index, op = step.name(), "apply");
        let mut events = Vec::new();
        let result = match *step {
            Step::Visible { value } => {
                self.sheet.set_visible(value);
                Value::Null
            }
            Step::Capture { dx, dy } => {
                let captured = self.sheet.should_capture(dx, dy) && self.sheet.on_grant();
                json!(captured)
            }
            Step::Grant => json!(self.sheet.on_grant()),
            Step::Move { dx, dy, vy } => json!(self.sheet.on_move(DragSample::new(dx, dy, vy))),
            Step::Release { dx, dy, vy } => {
                outcome_json(self.sheet.on_release(DragSample::new(dx, dy, vy)))
            }
            Step::Terminate => outcome_json(self.sheet.on_terminate()),
            Step::Scroll { offset } => {
                self.sheet.on_inner_scroll(offset);
                Value::Null
            }
            Step::Backdrop => json!(self.sheet.on_backdrop_press()),
            Step::RequestClose => json!(self.sheet.request_close()),
            Step::Resize { height } => {
                self.sheet.set_container_height(height)?;
                Value::Null
            }
            Step::Tick { frames } => {
                for _ in 0..frames {
                    events.extend(self.sheet.tick(self.frame));
                }
                self.frames += u64::from(frames);
                Value::Null
            }
            Step::Expect {
                ref phase,
                offset,
                snap_index,
                closes,
            } => {
                self.check(index, phase.as_deref(), offset, snap_index, closes)?;
                json!(true)
            }
        };
        Ok((result, events))
    }

    fn check(
        &self,
        step: usize,
        phase: Option<&str>,
        offset: Option<f64>,
        snap_index: Option<usize>,
        closes: Option<u32>,
    ) -> Result<()> {
        let fail = |message: String| Err(HarnessError::Expectation { step, message });

        if let Some(want) = phase
            && want != self.sheet.phase().as_str()
        {
            return fail(format!("phase {} != {want}", self.sheet.phase().as_str()));
        }
        if let Some(want) = offset
            && (self.sheet.offset() - want).abs() > OFFSET_TOLERANCE
        {
            return fail(format!("offset {} != {want}", self.sheet.offset()));
        }
        if let Some(want) = snap_index
            && want != self.sheet.current_snap_index()
        {
            return fail(format!("snap index {} != {want}", self.sheet.current_snap_index()));
        }
        if let Some(want) = closes
            && want != self.closes.get()
        {
            return fail(format!("close count {} != {want}", self.closes.get()));
        }
        Ok(())
    }
}

fn outcome_json(outcome: Option<DragOutcome>) -> Value {
    match outcome {
        None => Value::Null,
        Some(DragOutcome::Snapping { index, target }) => {
            json!({ "snap": { "index": index, "target": target } })
        }
        Some(DragOutcome::Dismiss) => json!("dismiss"),
    }
}

fn event_json(event: &SheetEvent) -> Value {
    match *event {
        SheetEvent::Opened => json!({ "opened": true }),
        SheetEvent::Snapped { index } => json!({ "snapped": index }),
        SheetEvent::Closed { reason } => json!({ "closed": reason.as_str() }),
    }
}
