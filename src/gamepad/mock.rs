//! Scripted transport doubles for testing
//!
//! These run the acquisition loop without hardware: a [`ScriptedSource`]
//! plays back a fixed sequence of reports, timeouts, and failures, and a
//! [`ScriptedOpener`] hands out sources in order so reconnect paths can be
//! exercised too. Opener clones share one queue, letting a test keep a
//! handle while the bridge owns another.

use crate::gamepad::device::{ReportSource, SourceOpener, TransportError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted transport outcome
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Deliver this raw report
    Report(Vec<u8>),
    /// Report a read timeout (no new input)
    Timeout,
    /// Fail the read with an I/O error
    Fail(String),
}

/// Report source that plays back a fixed script.
///
/// Once the script is exhausted the source keeps reporting timeouts; if a
/// stop flag was attached, it is cleared first so a loop driven by that
/// flag exits deterministically.
pub struct ScriptedSource {
    steps: VecDeque<ScriptStep>,
    stop_flag: Option<Arc<AtomicBool>>,
}

impl ScriptedSource {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps: steps.into(),
            stop_flag: None,
        }
    }

    /// Clear `flag` when the script runs out.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(flag);
        self
    }
}

impl ReportSource for ScriptedSource {
    fn read_report(&mut self, _timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
        match self.steps.pop_front() {
            Some(ScriptStep::Report(raw)) => Ok(Some(raw)),
            Some(ScriptStep::Timeout) => Ok(None),
            Some(ScriptStep::Fail(reason)) => Err(TransportError::Io(reason)),
            None => {
                if let Some(flag) = &self.stop_flag {
                    flag.store(false, Ordering::SeqCst);
                }
                Ok(None)
            }
        }
    }
}

/// Opener that hands out queued sources in order; when the queue is empty,
/// opens fail with `NotFound`.
#[derive(Clone, Default)]
pub struct ScriptedOpener {
    sources: Arc<Mutex<VecDeque<ScriptedSource>>>,
}

impl ScriptedOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next source to hand out.
    pub fn push(&self, source: ScriptedSource) {
        self.sources.lock().unwrap().push_back(source);
    }
}

impl SourceOpener for ScriptedOpener {
    type Source = ScriptedSource;

    fn open(&mut self) -> Result<ScriptedSource, TransportError> {
        self.sources
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(TransportError::NotFound { vendor_id: 0 })
    }
}
