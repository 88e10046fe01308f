//! Glue between the analysis workers and the [`AnalysisView`].
//!
//! Opening a log analyzes its most recent combat first. Once that combat is
//! on screen and its worker has exited, the older combats of the same log
//! are analyzed in the background and appended to the combat list as they
//! complete.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use oscr_types::Settings;
use tracing::{debug, error, info};

use crate::pipeline::{
    AnalysisDispatcher, AnalysisEvent, AnalysisRequest, BackgroundFailure, CombatAnalyzer,
    RequestOutcome,
};
use crate::view::AnalysisView;

pub struct ParserBridge {
    dispatcher: AnalysisDispatcher,
    view: AnalysisView,
    log: Option<PathBuf>,
    /// Bumped by every opened log; events of other generations are stale.
    generation: u64,
    /// Combat 0 is shown but the older combats have not been requested yet.
    older_pending: bool,
    /// A worker of the current generation has exited.
    first_finished: bool,
    failures: Vec<BackgroundFailure>,
}

impl ParserBridge {
    pub fn new(analyzer: Arc<dyn CombatAnalyzer>, settings: Settings) -> Self {
        Self {
            dispatcher: AnalysisDispatcher::new(analyzer),
            view: AnalysisView::new(settings),
            log: None,
            generation: 0,
            older_pending: false,
            first_finished: false,
            failures: Vec::new(),
        }
    }

    pub fn view(&self) -> &AnalysisView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut AnalysisView {
        &mut self.view
    }

    pub fn log(&self) -> Option<&Path> {
        self.log.as_deref()
    }

    /// Start analyzing a log file. Skipped while the same log is still
    /// being analyzed.
    pub fn open_log(&mut self, path: impl Into<PathBuf>) -> RequestOutcome {
        let path = path.into();
        let generation = self.generation + 1;
        let request = AnalysisRequest::latest(&path).in_generation(generation);
        let outcome = self.dispatcher.request(request);
        if outcome == RequestOutcome::Started {
            self.generation = generation;
            self.view.clear();
            self.older_pending = false;
            self.first_finished = false;
            self.log = Some(path);
        }
        outcome
    }

    /// Apply every event delivered so far. Returns the number of combats
    /// added to the combat list.
    pub fn pump(&mut self) -> usize {
        let mut added = 0;
        for event in self.dispatcher.drain() {
            if event.generation() != self.generation {
                debug!(
                    generation = event.generation(),
                    current = self.generation,
                    "Dropping event of an abandoned analysis"
                );
                continue;
            }
            match event {
                AnalysisEvent::Combat { analysis, .. } => {
                    let first = analysis.meta.id == 0 && self.view.current_position().is_none();
                    let position = self.view.insert_combat(*analysis);
                    added += 1;
                    if first {
                        self.view.show_combat(position);
                        self.older_pending = self.view.settings().combats_to_parse > 1;
                    }
                }
                AnalysisEvent::Failed { log, failure, .. } => {
                    error!(log = %log.display(), reason = ?failure.reason, "{}", failure.detail);
                    self.failures.push(failure);
                }
                AnalysisEvent::Finished { .. } => self.first_finished = true,
            }
        }
        self.request_older();
        added
    }

    /// Analyze the older combats once combat 0 is shown and its worker has
    /// exited. A skipped request stays pending and is retried on the next pump.
    fn request_older(&mut self) {
        if !(self.older_pending && self.first_finished) {
            return;
        }
        let Some(log) = self.log.clone() else {
            self.older_pending = false;
            return;
        };
        let count = self.view.settings().combats_to_parse - 1;
        let request = AnalysisRequest::older(log, count).in_generation(self.generation);
        match self.dispatcher.request(request) {
            RequestOutcome::Started => {
                info!(count, "Analyzing older combats");
                self.older_pending = false;
            }
            RequestOutcome::Skipped => debug!("Older combats deferred, log still in use"),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.older_pending || !self.dispatcher.is_idle()
    }

    /// Failures not yet shown to the user.
    pub fn take_failures(&mut self) -> Vec<BackgroundFailure> {
        std::mem::take(&mut self.failures)
    }
}
