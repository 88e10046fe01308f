//! Types shared between the OSCR core and its frontends.
//!
//! Everything in here is plain data: persisted settings and the number
//! formatting helpers used by every table adapter.

pub mod formatting;
pub mod settings;

pub use settings::{
    DAMAGE_COLUMN_TOGGLES, HEAL_COLUMN_TOGGLES, LIVE_COLUMN_TOGGLES, LiveGraphField, Settings,
    SortOrder, TableFamily,
};
