//! Live parser polling.
//!
//! A background thread polls a [`LiveSource`] on a fixed cadence and
//! publishes each snapshot into a `watch` channel. The channel holds only
//! the newest tick: a snapshot the display thread has not picked up yet is
//! simply overwritten by the next one.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use oscr_types::{LiveGraphField, Settings};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::error::{BackgroundFailure, EngineError};
use crate::model::{LiveRow, LiveView};

/// Failures kept until the display thread takes them; later ones are dropped.
pub const FAILURE_BACKLOG: usize = 16;

/// Producer of live snapshots, polled from the worker thread.
pub trait LiveSource: Send + 'static {
    /// Current snapshot, or `None` when nothing changed since the last poll.
    fn poll(&mut self) -> Result<Option<Vec<LiveRow>>, EngineError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiveTick {
    /// Increases by one for every published snapshot.
    pub sequence: u64,
    pub rows: Vec<LiveRow>,
    pub graph_field: Option<LiveGraphField>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveConfig {
    pub interval: Duration,
    pub graph_field: Option<LiveGraphField>,
}

impl LiveConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            interval: Duration::from_millis(settings.live_poll_interval_ms.max(1)),
            graph_field: settings
                .live_graph_active
                .then_some(settings.live_graph_field),
        }
    }
}

pub struct LivePoller {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    ticks: Option<watch::Receiver<Option<LiveTick>>>,
    failures: mpsc::Receiver<BackgroundFailure>,
}

impl LivePoller {
    pub fn start<S: LiveSource>(mut source: S, config: LiveConfig) -> Self {
        let (tick_tx, tick_rx) = watch::channel(None);
        let (fail_tx, fail_rx) = mpsc::channel(FAILURE_BACKLOG);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        info!(interval_ms = config.interval.as_millis() as u64, "Live poller started");
        let handle = thread::spawn(move || {
            let mut sequence = 0u64;
            let mut dropped_failures = 0u64;
            while !stop_flag.load(Ordering::Acquire) && !tick_tx.is_closed() {
                match source.poll() {
                    Ok(Some(rows)) => {
                        sequence += 1;
                        let tick = LiveTick {
                            sequence,
                            rows,
                            graph_field: config.graph_field,
                        };
                        if tick_tx.send(Some(tick)).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        match fail_tx.try_send(BackgroundFailure::from(&err)) {
                            Ok(()) => warn!(error = %err, "Live poll failed"),
                            Err(TrySendError::Full(_)) => {
                                dropped_failures += 1;
                                debug!(
                                    error = %err,
                                    dropped_failures,
                                    "Live poll failed, backlog full"
                                );
                            }
                            Err(TrySendError::Closed(_)) => break,
                        }
                    }
                }
                thread::park_timeout(config.interval);
            }
            info!(ticks = sequence, dropped_failures, "Live poller stopped");
        });

        Self {
            stop,
            handle: Some(handle),
            ticks: Some(tick_rx),
            failures: fail_rx,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// The newest tick not yet taken, if any.
    pub fn take_latest(&mut self) -> Option<LiveTick> {
        let rx = self.ticks.as_mut()?;
        if !rx.has_changed().unwrap_or(false) {
            return None;
        }
        rx.borrow_and_update().clone()
    }

    /// Apply the newest tick to `view`. Returns `true` when one was applied.
    pub fn pump(&mut self, view: &mut LiveView) -> bool {
        let Some(tick) = self.take_latest() else {
            return false;
        };
        debug!(sequence = tick.sequence, rows = tick.rows.len(), "Applying live tick");
        view.apply_tick(tick.rows, tick.graph_field);
        true
    }

    /// Failures reported since the last call.
    pub fn take_failures(&mut self) -> Vec<BackgroundFailure> {
        let mut out = Vec::new();
        while let Ok(failure) = self.failures.try_recv() {
            out.push(failure);
        }
        out
    }

    /// Halt the poller and disconnect the tick channel. No tick can reach a
    /// view after this returns.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        self.ticks = None;
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}

impl Drop for LivePoller {
    fn drop(&mut self) {
        self.stop();
    }
}
