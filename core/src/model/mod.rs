//! Display models
//!
//! Adapters between analysis results and a generic row/column display:
//! - **Tree**: hierarchical view of one analysis tree with recursive sort
//! - **Selection**: row-promoting selection policy and clipboard export
//! - **Table / Proxy**: flat overview and ladder tables, inverted sort + filter
//! - **Live**: per-tick snapshot table and rolling graph buffers
//! - **Graph**: plot-ready overview series (DPS lines, damage bars, ranking)
//! - **Visibility**: column show/hide flags applied to mirrored tables
//!
//! ```text
//!  AnalysisTree ──► TreeModel ──► SelectionModel ──► clipboard
//!                      ▲
//!  Settings ──► ColumnVisibility
//!
//!  overview rows ──► TableModel ──► SortFilterProxy
//!                └─► OverviewGraphs
//!  live tick     ──► LiveView (LiveTableModel + RollingBuffers)
//! ```

mod graph;
mod ladder;
mod live;
mod proxy;
mod selection;
mod table;
mod tree;
mod visibility;

#[cfg(test)]
mod tree_tests;

pub use graph::{
    BarSeries, GROUP_WIDTH, LineSeries, OverviewGraphs, RANKING_HEADROOM, RankingBar, group_offsets,
};
pub use ladder::{LADDER_PAGE_SIZE, LadderTable};
pub use live::{
    LiveRow, LiveTableModel, LiveView, MAX_GRAPH_SERIES, ROLLING_CAPACITY, RollingBuffers,
};
pub use proxy::SortFilterProxy;
pub use selection::{SelectionMode, SelectionModel, copy_selection_as_text};
pub use table::{TableModel, TableRow};
pub use tree::{ModelIndex, TreeModel};
pub use visibility::{ColumnVisibility, ColumnVisibilityTarget};

use oscr_types::SortOrder;

use crate::analysis::SharedTree;
use crate::columns::TreeVariant;

/// Build a tree adapter and its selection controller for one analysis tree.
pub fn build_adapter(tree: SharedTree, variant: TreeVariant) -> (TreeModel, SelectionModel) {
    (TreeModel::with_data(variant, tree), SelectionModel::new())
}

/// Sort a tree adapter by `column`.
pub fn sort_column(model: &mut TreeModel, column: usize, order: SortOrder) {
    model.sort(column, order);
}
