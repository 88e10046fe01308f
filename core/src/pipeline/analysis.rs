//! Background combat analysis.
//!
//! Each request runs on its own worker thread. Results travel back through a
//! single unbounded channel that only the display thread drains, so every
//! combat is applied exactly once and in the order its worker produced it.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use hashbrown::HashSet;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};

use super::error::{BackgroundFailure, EngineError};
use crate::analysis::CombatAnalysis;

/// What to analyze. The log path is the unit of mutual exclusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub log: PathBuf,
    /// Combats to skip, counted from the most recent one.
    pub skip: usize,
    pub max_combats: usize,
    /// Copied onto every event of this request so the receiver can drop
    /// results of runs it has abandoned.
    pub generation: u64,
}

impl AnalysisRequest {
    /// Only the most recent combat of a log.
    pub fn latest(log: impl Into<PathBuf>) -> Self {
        Self {
            log: log.into(),
            skip: 0,
            max_combats: 1,
            generation: 0,
        }
    }

    /// Up to `count` combats before the most recent one.
    pub fn older(log: impl Into<PathBuf>, count: usize) -> Self {
        Self {
            log: log.into(),
            skip: 1,
            max_combats: count,
            generation: 0,
        }
    }

    pub fn in_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }
}

/// Result of submitting a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Started,
    /// Analysis of the same log is already running; nothing was started.
    Skipped,
}

#[derive(Debug)]
pub enum AnalysisEvent {
    Combat {
        log: PathBuf,
        generation: u64,
        analysis: Box<CombatAnalysis>,
    },
    Failed {
        log: PathBuf,
        generation: u64,
        failure: BackgroundFailure,
    },
    /// The worker is gone and the log accepts new requests.
    Finished { log: PathBuf, generation: u64 },
}

impl AnalysisEvent {
    pub fn generation(&self) -> u64 {
        match self {
            AnalysisEvent::Combat { generation, .. }
            | AnalysisEvent::Failed { generation, .. }
            | AnalysisEvent::Finished { generation, .. } => *generation,
        }
    }
}

/// Worker-side handle used by an analyzer to hand out finished combats.
pub struct CombatSink {
    log: PathBuf,
    generation: u64,
    tx: UnboundedSender<AnalysisEvent>,
}

impl CombatSink {
    /// Hand a combat to the display thread. The analyzer must not touch it
    /// afterwards. Returns `false` once the display side has gone away.
    pub fn deliver(&self, analysis: CombatAnalysis) -> bool {
        self.tx
            .send(AnalysisEvent::Combat {
                log: self.log.clone(),
                generation: self.generation,
                analysis: Box::new(analysis),
            })
            .is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// The combat log analysis engine.
pub trait CombatAnalyzer: Send + Sync + 'static {
    /// Analyze the requested combats, delivering each one as soon as it is
    /// complete, most recent first.
    fn analyze(&self, request: &AnalysisRequest, sink: &CombatSink) -> Result<(), EngineError>;
}

pub struct AnalysisDispatcher {
    analyzer: Arc<dyn CombatAnalyzer>,
    tx: UnboundedSender<AnalysisEvent>,
    rx: UnboundedReceiver<AnalysisEvent>,
    in_flight: Arc<Mutex<HashSet<PathBuf>>>,
    workers: Vec<JoinHandle<()>>,
}

impl AnalysisDispatcher {
    pub fn new(analyzer: Arc<dyn CombatAnalyzer>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            analyzer,
            tx,
            rx,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            workers: Vec::new(),
        }
    }

    /// Start analyzing unless the same log is already being analyzed.
    pub fn request(&mut self, request: AnalysisRequest) -> RequestOutcome {
        {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            if !in_flight.insert(request.log.clone()) {
                info!(log = %request.log.display(), "Analysis already running, request skipped");
                return RequestOutcome::Skipped;
            }
        }
        info!(
            log = %request.log.display(),
            skip = request.skip,
            max = request.max_combats,
            generation = request.generation,
            "Starting analysis"
        );

        self.workers.retain(|h| !h.is_finished());
        let analyzer = Arc::clone(&self.analyzer);
        let in_flight = Arc::clone(&self.in_flight);
        let tx = self.tx.clone();
        let handle = thread::spawn(move || {
            let sink = CombatSink {
                log: request.log.clone(),
                generation: request.generation,
                tx: tx.clone(),
            };
            let result =
                panic::catch_unwind(AssertUnwindSafe(|| analyzer.analyze(&request, &sink)));

            let failure = match result {
                Ok(Ok(())) => None,
                Ok(Err(err)) => {
                    error!(log = %request.log.display(), error = %err, "Analysis failed");
                    Some(BackgroundFailure::from(err))
                }
                Err(payload) => {
                    let failure = BackgroundFailure::from_panic(payload.as_ref());
                    error!(
                        log = %request.log.display(),
                        detail = %failure.detail,
                        "Analysis worker panicked"
                    );
                    Some(failure)
                }
            };
            if let Some(failure) = failure {
                let _ = tx.send(AnalysisEvent::Failed {
                    log: request.log.clone(),
                    generation: request.generation,
                    failure,
                });
            }
            // Every result is queued before the log accepts a new request.
            in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&request.log);
            let _ = tx.send(AnalysisEvent::Finished {
                log: request.log,
                generation: request.generation,
            });
        });
        self.workers.push(handle);
        RequestOutcome::Started
    }

    pub fn is_running(&self, log: &Path) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(log)
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Next delivered event, without blocking.
    pub fn try_next(&mut self) -> Option<AnalysisEvent> {
        self.rx.try_recv().ok()
    }

    /// Every event delivered so far, in arrival order.
    pub fn drain(&mut self) -> Vec<AnalysisEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        if !events.is_empty() {
            debug!(count = events.len(), "Drained analysis events");
        }
        events
    }

    /// Wait for all workers to exit. Their events stay queued.
    pub fn join_workers(&mut self) {
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc as std_mpsc;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::analysis::CombatMeta;
    use crate::pipeline::error::FailureReason;

    fn make_combat(id: usize) -> CombatAnalysis {
        CombatAnalysis::new(CombatMeta {
            id,
            map: format!("map{id}"),
            difficulty: None,
            start_time: chrono::NaiveDateTime::default(),
        })
    }

    /// Delivers `request.max_combats` combats starting at `request.skip`.
    struct CountingAnalyzer;

    impl CombatAnalyzer for CountingAnalyzer {
        fn analyze(&self, request: &AnalysisRequest, sink: &CombatSink) -> Result<(), EngineError> {
            for id in request.skip..request.skip + request.max_combats {
                if !sink.deliver(make_combat(id)) {
                    break;
                }
            }
            Ok(())
        }
    }

    /// Blocks until released through the gate.
    struct GatedAnalyzer {
        gate: Mutex<std_mpsc::Receiver<()>>,
    }

    impl CombatAnalyzer for GatedAnalyzer {
        fn analyze(&self, _: &AnalysisRequest, sink: &CombatSink) -> Result<(), EngineError> {
            let gate = self.gate.lock().unwrap();
            let _ = gate.recv_timeout(Duration::from_secs(5));
            sink.deliver(make_combat(0));
            Ok(())
        }
    }

    struct FailingAnalyzer;

    impl CombatAnalyzer for FailingAnalyzer {
        fn analyze(&self, request: &AnalysisRequest, _: &CombatSink) -> Result<(), EngineError> {
            Err(EngineError::LogFileMissing(request.log.clone()))
        }
    }

    struct PanickingAnalyzer;

    impl CombatAnalyzer for PanickingAnalyzer {
        fn analyze(&self, _: &AnalysisRequest, _: &CombatSink) -> Result<(), EngineError> {
            panic!("corrupt combat");
        }
    }

    /// Drain until a `Finished` event for `log` shows up.
    fn collect_until_finished(
        dispatcher: &mut AnalysisDispatcher,
        log: &Path,
    ) -> Vec<AnalysisEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        while Instant::now() < deadline {
            while let Some(event) = dispatcher.try_next() {
                let done = matches!(&event, AnalysisEvent::Finished { log: l, .. } if l == log);
                events.push(event);
                if done {
                    return events;
                }
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("analysis of {log:?} did not finish");
    }

    #[test]
    fn test_results_arrive_in_order() {
        let mut dispatcher = AnalysisDispatcher::new(Arc::new(CountingAnalyzer));
        let log = PathBuf::from("combat.log");
        assert_eq!(
            dispatcher.request(AnalysisRequest::older(&log, 6)),
            RequestOutcome::Started
        );
        let events = collect_until_finished(&mut dispatcher, &log);
        let ids: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                AnalysisEvent::Combat { analysis, .. } => Some(analysis.meta.id),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
        assert!(dispatcher.drain().is_empty());
    }

    #[test]
    fn test_second_request_for_same_log_is_skipped() {
        let (release, gate) = std_mpsc::channel();
        let mut dispatcher = AnalysisDispatcher::new(Arc::new(GatedAnalyzer {
            gate: Mutex::new(gate),
        }));
        let log = PathBuf::from("busy.log");

        assert_eq!(dispatcher.request(AnalysisRequest::latest(&log)), RequestOutcome::Started);
        assert!(dispatcher.is_running(&log));
        assert_eq!(dispatcher.request(AnalysisRequest::latest(&log)), RequestOutcome::Skipped);
        assert_eq!(dispatcher.request(AnalysisRequest::older(&log, 3)), RequestOutcome::Skipped);

        release.send(()).unwrap();
        let events = collect_until_finished(&mut dispatcher, &log);
        let combats = events
            .iter()
            .filter(|e| matches!(e, AnalysisEvent::Combat { .. }))
            .count();
        assert_eq!(combats, 1);
        assert!(!dispatcher.is_running(&log));

        release.send(()).unwrap();
        assert_eq!(dispatcher.request(AnalysisRequest::latest(&log)), RequestOutcome::Started);
        collect_until_finished(&mut dispatcher, &log);
        dispatcher.join_workers();
        assert!(dispatcher.is_idle());
    }

    #[test]
    fn test_distinct_logs_run_concurrently() {
        let mut dispatcher = AnalysisDispatcher::new(Arc::new(CountingAnalyzer));
        assert_eq!(dispatcher.request(AnalysisRequest::latest("a.log")), RequestOutcome::Started);
        assert_eq!(dispatcher.request(AnalysisRequest::latest("b.log")), RequestOutcome::Started);
        dispatcher.join_workers();
        let finished = dispatcher
            .drain()
            .into_iter()
            .filter(|e| matches!(e, AnalysisEvent::Finished { .. }))
            .count();
        assert_eq!(finished, 2);
    }

    #[test]
    fn test_engine_error_is_surfaced() {
        let mut dispatcher = AnalysisDispatcher::new(Arc::new(FailingAnalyzer));
        let log = PathBuf::from("missing.log");
        dispatcher.request(AnalysisRequest::latest(&log));
        let events = collect_until_finished(&mut dispatcher, &log);
        let failure = events
            .iter()
            .find_map(|e| match e {
                AnalysisEvent::Failed { failure, .. } => Some(failure.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(failure.reason, FailureReason::LogFileMissing);
    }

    #[test]
    fn test_worker_panic_is_surfaced() {
        let mut dispatcher = AnalysisDispatcher::new(Arc::new(PanickingAnalyzer));
        let log = PathBuf::from("panic.log");
        dispatcher.request(AnalysisRequest::latest(&log));
        let events = collect_until_finished(&mut dispatcher, &log);
        assert!(events.iter().any(|e| matches!(
            e,
            AnalysisEvent::Failed { failure, .. }
                if failure.reason == FailureReason::WorkerPanicked
                    && failure.detail == "corrupt combat"
        )));
        assert!(!dispatcher.is_running(&log));
    }

    #[test]
    fn test_events_carry_request_generation() {
        let mut dispatcher = AnalysisDispatcher::new(Arc::new(CountingAnalyzer));
        let log = PathBuf::from("gen.log");
        dispatcher.request(AnalysisRequest::older(&log, 2).in_generation(7));
        let events = collect_until_finished(&mut dispatcher, &log);
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.generation() == 7));
    }
}
