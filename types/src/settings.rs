//! Persisted user settings consumed by the display core.
//!
//! The core never owns these; it reads a snapshot whenever column
//! visibility, default sort order or live graph configuration is applied.

use serde::{Deserialize, Serialize};

/// Toggleable columns of the damage trees (every column except the name).
pub const DAMAGE_COLUMN_TOGGLES: usize = 21;
/// Toggleable columns of the heal trees (every column except the name).
pub const HEAL_COLUMN_TOGGLES: usize = 13;
/// Toggleable columns of the live table.
pub const LIVE_COLUMN_TOGGLES: usize = 7;

/// Sort direction as requested by the user or persisted in settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    pub fn is_descending(self) -> bool {
        self == SortOrder::Descending
    }
}

/// Live table field plotted by the rolling graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveGraphField {
    #[default]
    Dps,
    Debuff,
    AttacksIn,
    Hps,
}

impl LiveGraphField {
    pub const ALL: [LiveGraphField; 4] = [
        LiveGraphField::Dps,
        LiveGraphField::Debuff,
        LiveGraphField::AttacksIn,
        LiveGraphField::Hps,
    ];

    /// Index of the plotted value inside a live row.
    pub fn live_column(self) -> usize {
        match self {
            LiveGraphField::Dps => 0,
            LiveGraphField::Debuff => 2,
            LiveGraphField::AttacksIn => 3,
            LiveGraphField::Hps => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LiveGraphField::Dps => "DPS",
            LiveGraphField::Debuff => "Debuff",
            LiveGraphField::AttacksIn => "Attacks-in Share",
            LiveGraphField::Hps => "HPS",
        }
    }
}

/// Group of tables sharing one set of column visibility flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableFamily {
    Damage,
    Heal,
    Live,
}

impl TableFamily {
    pub const ALL: [TableFamily; 3] = [TableFamily::Damage, TableFamily::Heal, TableFamily::Live];

    /// Number of visibility flags stored for this family.
    pub fn toggle_count(self) -> usize {
        match self {
            TableFamily::Damage => DAMAGE_COLUMN_TOGGLES,
            TableFamily::Heal => HEAL_COLUMN_TOGGLES,
            TableFamily::Live => LIVE_COLUMN_TOGGLES,
        }
    }

    /// Display column controlled by flag 0. Tree tables never hide their
    /// name column; the live table keeps names in its row labels.
    pub fn first_toggled_column(self) -> usize {
        match self {
            TableFamily::Damage | TableFamily::Heal => 1,
            TableFamily::Live => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dmg_columns: Vec<bool>,
    pub heal_columns: Vec<bool>,
    pub live_columns: Vec<bool>,
    pub overview_sort_column: usize,
    pub overview_sort_order: SortOrder,
    pub live_graph_active: bool,
    pub live_graph_field: LiveGraphField,
    pub live_copy_kills: bool,
    pub live_poll_interval_ms: u64,
    pub combats_to_parse: usize,
    pub european_number_format: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dmg_columns: vec![true; DAMAGE_COLUMN_TOGGLES],
            heal_columns: vec![true; HEAL_COLUMN_TOGGLES],
            live_columns: vec![true, false, true, false, false, false, false],
            overview_sort_column: 1,
            overview_sort_order: SortOrder::Descending,
            live_graph_active: false,
            live_graph_field: LiveGraphField::Dps,
            live_copy_kills: false,
            live_poll_interval_ms: 1000,
            combats_to_parse: 10,
            european_number_format: false,
        }
    }
}

impl Settings {
    /// Visibility flags for a table family.
    pub fn columns(&self, family: TableFamily) -> &[bool] {
        match family {
            TableFamily::Damage => &self.dmg_columns,
            TableFamily::Heal => &self.heal_columns,
            TableFamily::Live => &self.live_columns,
        }
    }

    pub fn columns_mut(&mut self, family: TableFamily) -> &mut Vec<bool> {
        match family {
            TableFamily::Damage => &mut self.dmg_columns,
            TableFamily::Heal => &mut self.heal_columns,
            TableFamily::Live => &mut self.live_columns,
        }
    }

    /// Pad or truncate every column list to its family's flag count.
    /// Missing flags default to visible.
    pub fn normalize(&mut self) {
        for family in TableFamily::ALL {
            self.columns_mut(family).resize(family.toggle_count(), true);
        }
        if self.live_poll_interval_ms == 0 {
            self.live_poll_interval_ms = Settings::default().live_poll_interval_ms;
        }
    }
}
