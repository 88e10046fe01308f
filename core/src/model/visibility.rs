//! Column show/hide state shared by mirrored tables.

use oscr_types::{Settings, TableFamily};
use tracing::debug;

/// A display surface whose columns can be hidden.
pub trait ColumnVisibilityTarget {
    fn column_count(&self) -> usize;
    fn set_column_hidden(&mut self, column: usize, hidden: bool);
    fn is_column_hidden(&self, column: usize) -> bool;
}

/// Per-family visibility flags, copied from a settings snapshot.
///
/// Flag `i` of a family controls display column
/// `i + family.first_toggled_column()`. Tree families never touch column 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnVisibility {
    damage: Vec<bool>,
    heal: Vec<bool>,
    live: Vec<bool>,
}

impl Default for ColumnVisibility {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl ColumnVisibility {
    pub fn from_settings(settings: &Settings) -> Self {
        let flags = |family: TableFamily| {
            let mut v = settings.columns(family).to_vec();
            v.resize(family.toggle_count(), true);
            v
        };
        Self {
            damage: flags(TableFamily::Damage),
            heal: flags(TableFamily::Heal),
            live: flags(TableFamily::Live),
        }
    }

    pub fn flags(&self, family: TableFamily) -> &[bool] {
        match family {
            TableFamily::Damage => &self.damage,
            TableFamily::Heal => &self.heal,
            TableFamily::Live => &self.live,
        }
    }

    /// Change one flag. Out-of-range flags are ignored.
    pub fn set(&mut self, family: TableFamily, flag: usize, visible: bool) {
        let flags = match family {
            TableFamily::Damage => &mut self.damage,
            TableFamily::Heal => &mut self.heal,
            TableFamily::Live => &mut self.live,
        };
        if let Some(f) = flags.get_mut(flag) {
            *f = visible;
        }
    }

    /// Show or hide every toggled column on all `targets` of one family.
    ///
    /// Passing the outgoing and incoming tables together keeps the mirrored
    /// views in sync. Applying the same state again changes nothing.
    pub fn apply(&self, family: TableFamily, targets: &mut [&mut dyn ColumnVisibilityTarget]) {
        let offset = family.first_toggled_column();
        for target in targets.iter_mut() {
            for (i, visible) in self.flags(family).iter().enumerate() {
                let column = i + offset;
                if column < target.column_count() {
                    target.set_column_hidden(column, !visible);
                }
            }
        }
        debug!(?family, targets = targets.len(), "Applied column visibility");
    }
}
