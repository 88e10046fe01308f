use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDateTime;

use super::AnalysisTree;
use crate::cell::CellValue;
use crate::columns::TreeVariant;

/// Tree shared between the combat list and the adapters displaying it.
pub type SharedTree = Rc<RefCell<AnalysisTree>>;

/// Identification of one analyzed combat.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatMeta {
    /// Position of the combat in its log file, 0 being the most recent.
    pub id: usize,
    pub map: String,
    pub difficulty: Option<String>,
    pub start_time: NaiveDateTime,
}

impl CombatMeta {
    pub fn date(&self) -> String {
        self.start_time.format("%Y-%m-%d").to_string()
    }

    pub fn time(&self) -> String {
        self.start_time.format("%H:%M:%S").to_string()
    }
}

/// Per-player time series behind the overview graphs. `time` holds the
/// sample times in seconds; `dps` and `damage` share its indexing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerGraph {
    pub time: Vec<f64>,
    pub dps: Vec<f64>,
    /// Damage dealt in the interval ending at the matching time.
    pub damage: Vec<f64>,
}

/// One player's summary line in the overview table.
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewRow {
    pub name: String,
    pub handle: String,
    pub cells: Vec<CellValue>,
    pub graph: PlayerGraph,
}

impl OverviewRow {
    /// `name` + `handle`, the row label shown by the overview.
    pub fn label(&self) -> String {
        format!("{}{}", self.name, self.handle)
    }
}

/// Result of analyzing one combat, as produced by a worker thread.
#[derive(Debug, Clone)]
pub struct CombatAnalysis {
    pub meta: CombatMeta,
    pub overview: Vec<OverviewRow>,
    pub damage_out: AnalysisTree,
    pub damage_in: AnalysisTree,
    pub heal_out: AnalysisTree,
    pub heal_in: AnalysisTree,
}

/// The four trees of a combat after it reached the display thread.
#[derive(Debug, Clone)]
pub struct CombatTrees {
    pub damage_out: SharedTree,
    pub damage_in: SharedTree,
    pub heal_out: SharedTree,
    pub heal_in: SharedTree,
}

impl CombatAnalysis {
    /// A combat with no overview rows and four empty trees.
    pub fn new(meta: CombatMeta) -> Self {
        let damage = TreeVariant::Damage.column_count();
        let heal = TreeVariant::Heal.column_count();
        Self {
            meta,
            overview: Vec::new(),
            damage_out: AnalysisTree::new(damage),
            damage_in: AnalysisTree::new(damage),
            heal_out: AnalysisTree::new(heal),
            heal_in: AnalysisTree::new(heal),
        }
    }

    /// Split into metadata, overview rows and display-thread tree handles.
    pub fn into_shared(self) -> (CombatMeta, Vec<OverviewRow>, CombatTrees) {
        let share = |tree| Rc::new(RefCell::new(tree));
        let trees = CombatTrees {
            damage_out: share(self.damage_out),
            damage_in: share(self.damage_in),
            heal_out: share(self.heal_out),
            heal_in: share(self.heal_in),
        };
        (self.meta, self.overview, trees)
    }
}
