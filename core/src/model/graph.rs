//! Plot-ready series for the overview graphs.
//!
//! Three graphs accompany the overview table:
//! - DPS over time, one line per player
//! - damage per interval, bars grouped by sample time
//! - DPS ranking, one horizontal bar per player, best first
//!
//! Series keep the player's position in the overview rows as their legend
//! slot, so colors stay stable across the three graphs.

use crate::analysis::OverviewRow;
use crate::cell::CellValue;
use crate::columns::OverviewColumn;

/// Horizontal space one group of bars occupies around its sample time.
pub const GROUP_WIDTH: f64 = 0.18;
/// Ranking axis extends this far past the best DPS.
pub const RANKING_HEADROOM: f64 = 1.05;

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub label: String,
    pub slot: usize,
    /// `(time, dps)` pairs
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub label: String,
    pub slot: usize,
    /// `(bar center, damage)` pairs
    pub bars: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingBar {
    pub label: String,
    pub dps: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverviewGraphs {
    pub dps_lines: Vec<LineSeries>,
    pub damage_bars: Vec<BarSeries>,
    /// Width of a single bar in `damage_bars`
    pub bar_width: f64,
    pub ranking: Vec<RankingBar>,
    /// Upper end of the ranking axis
    pub ranking_max: f64,
}

/// Offset of each bar from its group center, for `count` bars per group.
///
/// ```
/// use oscr_core::model::group_offsets;
///
/// assert_eq!(group_offsets(1), vec![0.0]);
/// assert_eq!(group_offsets(0), Vec::<f64>::new());
/// ```
pub fn group_offsets(count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    let bar_width = GROUP_WIDTH / count as f64;
    (0..count)
        .map(|i| (i as f64 + 0.5) * bar_width - GROUP_WIDTH / 2.0)
        .collect()
}

fn dps_of(row: &OverviewRow) -> f64 {
    row.cells
        .get(OverviewColumn::Dps.index())
        .and_then(CellValue::as_number)
        .unwrap_or(0.0)
}

impl OverviewGraphs {
    pub fn from_rows(rows: &[OverviewRow]) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let offsets = group_offsets(rows.len());
        let mut graphs = Self {
            bar_width: GROUP_WIDTH / rows.len() as f64,
            ..Self::default()
        };

        for (slot, (row, offset)) in rows.iter().zip(offsets).enumerate() {
            let graph = &row.graph;
            if graph.time.is_empty() {
                continue;
            }
            graphs.dps_lines.push(LineSeries {
                label: row.label(),
                slot,
                points: graph.time.iter().copied().zip(graph.dps.iter().copied()).collect(),
            });
            graphs.damage_bars.push(BarSeries {
                label: row.label(),
                slot,
                bars: graph
                    .time
                    .iter()
                    .zip(&graph.damage)
                    .map(|(t, d)| (t - offset, *d))
                    .collect(),
            });
        }

        graphs.ranking = rows
            .iter()
            .map(|row| RankingBar {
                label: row.label(),
                dps: dps_of(row),
            })
            .collect();
        graphs.ranking.sort_by(|a, b| b.dps.total_cmp(&a.dps));
        graphs.ranking_max = graphs
            .ranking
            .first()
            .map_or(0.0, |best| best.dps * RANKING_HEADROOM);
        graphs
    }

    pub fn is_empty(&self) -> bool {
        self.ranking.is_empty()
    }
}
