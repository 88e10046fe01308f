//! Update pipeline between worker threads and the display thread.
//!
//! - **Analysis**: one worker per request, FIFO delivery, at most one
//!   analysis in flight per log file
//! - **Live**: one polling thread, last snapshot wins, disconnected on stop

mod analysis;
mod error;
mod live;

pub use analysis::{
    AnalysisDispatcher, AnalysisEvent, AnalysisRequest, CombatAnalyzer, CombatSink, RequestOutcome,
};
pub use error::{BackgroundFailure, EngineError, FailureReason};
pub use live::{FAILURE_BACKLOG, LiveConfig, LivePoller, LiveSource, LiveTick};
