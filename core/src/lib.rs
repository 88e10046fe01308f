pub mod analysis;
pub mod bridge;
pub mod cell;
pub mod columns;
pub mod config;
pub mod import;
pub mod model;
pub mod pipeline;
pub mod view;

// Re-exports for convenience
pub use analysis::{AnalysisTree, CombatAnalysis, CombatMeta, SharedTree};
pub use bridge::ParserBridge;
pub use cell::CellValue;
pub use columns::TreeVariant;
pub use import::{ExportAnalyzer, ReplaySource};
pub use view::{AnalysisView, TreeKind};
