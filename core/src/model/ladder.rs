//! Paginated league ladder table.

use oscr_types::SortOrder;
use tracing::debug;

use super::proxy::SortFilterProxy;
use super::table::{TableModel, TableRow};
use crate::columns::LadderColumn;

/// Number of ladder entries returned per page.
pub const LADDER_PAGE_SIZE: usize = 50;

#[derive(Debug, Clone)]
pub struct LadderTable {
    proxy: SortFilterProxy,
    pages: usize,
    complete: bool,
}

impl Default for LadderTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LadderTable {
    pub fn new() -> Self {
        Self {
            proxy: SortFilterProxy::new(TableModel::new(LadderColumn::SPECS)),
            pages: 0,
            complete: false,
        }
    }

    /// Start a fresh ladder with its first page. Ranked by DPS, best first.
    pub fn load_first_page(&mut self, rows: Vec<TableRow>) {
        self.complete = rows.len() < LADDER_PAGE_SIZE;
        self.pages = 1;
        self.proxy.set_source_rows(rows);
        self.proxy.sort(LadderColumn::Dps.index(), SortOrder::Ascending);
    }

    /// Append the next page. Returns `false` once the ladder is complete.
    pub fn extend_page(&mut self, rows: Vec<TableRow>) -> bool {
        if self.complete {
            return false;
        }
        self.complete = rows.len() < LADDER_PAGE_SIZE;
        self.pages += 1;
        debug!(page = self.pages, rows = rows.len(), "Extended ladder");
        self.proxy.extend_source(rows);
        true
    }

    /// Offset of the next page to request.
    pub fn next_offset(&self) -> usize {
        self.pages * LADDER_PAGE_SIZE
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn proxy(&self) -> &SortFilterProxy {
        &self.proxy
    }

    pub fn proxy_mut(&mut self) -> &mut SortFilterProxy {
        &mut self.proxy
    }

    /// Combat log id behind a displayed row.
    pub fn combatlog_id(&self, row: usize) -> Option<&str> {
        self.proxy.row_key(row)
    }
}
