//! Acquisition loop bridging the gamepad to the data layer
//!
//! One sequential worker owns the device handle and the last-published
//! state cache and drives the read → decode → diff → publish cycle. The
//! loop moves through Starting → Running → Stopping → Stopped, with an
//! error-backoff sub-state inside Running that re-opens the device after
//! transient read failures.

use crate::config::AcquisitionSettings;
use crate::datalayer::publisher::NodePublisher;
use crate::datalayer::{NodeStore, StoreError};
use crate::gamepad::device::{ReportSource, SourceOpener, TransportError};
use crate::gamepad::diff::diff;
use crate::gamepad::report::{decode_report, DecodeError};
use crate::gamepad::types::PadState;
use crossbeam_channel::{bounded, Receiver};
use log::{debug, error, info, trace, warn};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Lifecycle phase of the acquisition loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgePhase {
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl BridgePhase {
    fn as_u8(self) -> u8 {
        match self {
            BridgePhase::Starting => 0,
            BridgePhase::Running => 1,
            BridgePhase::Stopping => 2,
            BridgePhase::Stopped => 3,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => BridgePhase::Starting,
            1 => BridgePhase::Running,
            2 => BridgePhase::Stopping,
            _ => BridgePhase::Stopped,
        }
    }
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to open gamepad: {0}")]
    DeviceNotFound(#[source] TransportError),

    #[error("node registration failed: {0}")]
    Registration(#[from] StoreError),

    #[error("malformed input report: {0}")]
    Decode(#[from] DecodeError),

    #[error("gave up reopening the gamepad after {attempts} consecutive failures")]
    RecoveryExhausted { attempts: u32 },
}

/// The acquisition loop. Owns the transport opener, the publisher, and the
/// last-published cache; runs until a fatal error or a shutdown request.
pub struct Bridge<O, S>
where
    O: SourceOpener,
    S: NodeStore,
{
    opener: O,
    publisher: NodePublisher<S>,
    settings: AcquisitionSettings,
    running: Arc<AtomicBool>,
    phase: Arc<AtomicU8>,
    last_published: Option<PadState>,
}

impl<O, S> Bridge<O, S>
where
    O: SourceOpener,
    S: NodeStore,
{
    pub fn new(opener: O, publisher: NodePublisher<S>, settings: AcquisitionSettings) -> Self {
        Self {
            opener,
            publisher,
            settings,
            // Raised from construction so a stop request can never be lost
            // between spawn and the loop's first iteration
            running: Arc::new(AtomicBool::new(true)),
            phase: Arc::new(AtomicU8::new(BridgePhase::Starting.as_u8())),
            last_published: None,
        }
    }

    /// Cooperative shutdown flag. Clearing it makes [`Bridge::run`] return
    /// within one read timeout (or one backoff slice).
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> BridgePhase {
        BridgePhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    fn set_phase(&self, phase: BridgePhase) {
        self.phase.store(phase.as_u8(), Ordering::SeqCst);
        debug!("bridge phase: {:?}", phase);
    }

    /// Run the loop to completion on the current thread.
    ///
    /// Returns `Ok(())` on graceful shutdown; fatal errors (device missing
    /// at startup, registration rejected, report contract violation,
    /// recovery exhausted) are returned after resources are released.
    pub fn run(&mut self) -> Result<(), BridgeError> {
        self.set_phase(BridgePhase::Starting);

        let result = self.run_inner();

        // Terminal bookkeeping on every exit path
        if let Err(e) = self.publisher.set_connected(false) {
            debug!("could not clear presence node on shutdown: {}", e);
        }
        self.running.store(false, Ordering::SeqCst);
        self.set_phase(BridgePhase::Stopped);

        match &result {
            Ok(()) => info!("bridge stopped"),
            Err(e) => error!("bridge failed: {}", e),
        }
        result
    }

    fn run_inner(&mut self) -> Result<(), BridgeError> {
        info!("opening gamepad...");
        let mut source = self.opener.open().map_err(BridgeError::DeviceNotFound)?;

        self.publisher.register_all(&PadState::default())?;
        if let Err(e) = self.publisher.set_connected(true) {
            warn!("could not set presence node: {}", e);
        }

        self.set_phase(BridgePhase::Running);
        info!("acquisition loop running");

        let timeout = Duration::from_millis(self.settings.read_timeout_ms);

        while self.running.load(Ordering::SeqCst) {
            match source.read_report(timeout) {
                Ok(Some(raw)) => self.handle_report(&raw)?,
                Ok(None) => {
                    // Read timeout: no new input, nothing to do
                }
                Err(e) => {
                    warn!("gamepad read failed: {}", e);
                    match self.recover()? {
                        Some(reopened) => source = reopened,
                        // Shutdown was requested mid-recovery
                        None => break,
                    }
                }
            }
        }

        self.set_phase(BridgePhase::Stopping);
        info!("acquisition loop stopping");
        drop(source);
        Ok(())
    }

    /// One decode → diff → publish cycle.
    fn handle_report(&mut self, raw: &[u8]) -> Result<(), BridgeError> {
        let state = decode_report(raw)?;
        let changed = diff(self.last_published.as_ref(), &state);

        if !changed.is_empty() {
            trace!("{} field(s) changed", changed.len());
            if let Err(e) = self.publisher.publish(&changed, &state) {
                // Healthy nodes were already written; the failed ones are
                // retried when their values next change.
                warn!("{}", e);
            }
        }

        self.last_published = Some(state);
        Ok(())
    }

    /// Error-backoff sub-state: wait with exponentially growing delays and
    /// try to re-open the device.
    ///
    /// `Ok(None)` means shutdown was requested while recovering. More than
    /// `max_consecutive_failures` failed reopen attempts is fatal.
    fn recover(&mut self) -> Result<Option<O::Source>, BridgeError> {
        if let Err(e) = self.publisher.set_connected(false) {
            warn!("could not clear presence node: {}", e);
        }

        let max_delay = Duration::from_millis(self.settings.backoff_max_ms);
        let mut delay = Duration::from_millis(self.settings.backoff_initial_ms);
        let mut attempts: u32 = 0;

        while self.running.load(Ordering::SeqCst) {
            self.sleep_interruptible(delay);
            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            match self.opener.open() {
                Ok(source) => {
                    info!("gamepad reopened after {} failed attempt(s)", attempts);
                    // Force a full republish so consumers resynchronize
                    // after the gap
                    self.last_published = None;
                    if let Err(e) = self.publisher.set_connected(true) {
                        warn!("could not set presence node: {}", e);
                    }
                    return Ok(Some(source));
                }
                Err(e) => {
                    attempts += 1;
                    warn!(
                        "reopen attempt {}/{} failed: {}",
                        attempts, self.settings.max_consecutive_failures, e
                    );
                    if attempts >= self.settings.max_consecutive_failures {
                        return Err(BridgeError::RecoveryExhausted { attempts });
                    }
                    delay = (delay * 2).min(max_delay);
                }
            }
        }

        Ok(None)
    }

    /// Sleep in small slices so a shutdown request cuts the wait short.
    fn sleep_interruptible(&self, total: Duration) {
        const SLICE: Duration = Duration::from_millis(50);
        let mut remaining = total;
        while !remaining.is_zero() && self.running.load(Ordering::SeqCst) {
            let step = remaining.min(SLICE);
            thread::sleep(step);
            remaining -= step;
        }
    }
}

/// Handle to a bridge running on its own named thread.
pub struct BridgeHandle {
    running: Arc<AtomicBool>,
    phase: Arc<AtomicU8>,
    outcome: Receiver<Result<(), BridgeError>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl BridgeHandle {
    /// Spawn the loop on a dedicated thread. The terminal result is
    /// delivered through a bounded channel so callers can poll with
    /// [`BridgeHandle::wait_timeout`] instead of joining.
    pub fn spawn<O, S>(mut bridge: Bridge<O, S>) -> std::io::Result<Self>
    where
        O: SourceOpener + Send + 'static,
        O::Source: Send,
        S: NodeStore + Send + 'static,
    {
        let running = Arc::clone(&bridge.running);
        let phase = Arc::clone(&bridge.phase);
        let (outcome_sender, outcome) = bounded(1);

        let thread = thread::Builder::new()
            .name("acquisition".to_string())
            .spawn(move || {
                let result = bridge.run();
                let _ = outcome_sender.send(result);
            })?;

        Ok(Self {
            running,
            phase,
            outcome,
            thread: Some(thread),
        })
    }

    /// Request a cooperative shutdown.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Whether the loop is still running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> BridgePhase {
        BridgePhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    /// Wait up to `timeout` for the loop to finish; `None` if still running.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<(), BridgeError>> {
        self.outcome.recv_timeout(timeout).ok()
    }

    /// Wait for the loop to finish and return its result.
    pub fn join(mut self) -> Result<(), BridgeError> {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        match self.outcome.try_recv() {
            Ok(result) => result,
            // Result already collected via wait_timeout, or the thread died
            // without reporting
            Err(_) => Ok(()),
        }
    }
}

impl Drop for BridgeHandle {
    fn drop(&mut self) {
        // Request shutdown; the loop observes the flag within one read
        // timeout and releases the device itself
        self.running.store(false, Ordering::SeqCst);
    }
}
