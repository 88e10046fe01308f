//! Column definitions for every table the core exposes.
//!
//! Each table has an explicit enumeration of its columns. The position of a
//! variant is its display column and each variant carries its header and its
//! format rule, so reordering columns never silently breaks formatting.

use oscr_types::formatting::{
    format_count, format_live_percent, format_magnitude, format_percent, format_ratio,
    format_seconds,
};

use crate::cell::CellValue;

/// How a raw cell value is turned into display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatRule {
    /// Name column: `(name, handle)` pairs are concatenated, text passes through.
    Name,
    /// Fraction rendered as percentage (`0.25` -> `25.00%`).
    Ratio,
    /// Already scaled percentage (`25.0` -> `25.00%`).
    Percent,
    /// Live percentage; exactly zero renders the no-data sentinel.
    LivePercent,
    Magnitude2,
    Magnitude0,
    Count,
    Seconds,
    Plain,
}

impl FormatRule {
    /// Format a value. Absent values render empty; values of a variant the
    /// rule does not expect fall back to their plain string form.
    pub fn apply(self, value: &CellValue, european: bool) -> String {
        let n = match value {
            CellValue::Absent => return String::new(),
            CellValue::Number(n) => *n,
            other => return other.to_string(),
        };
        match self {
            FormatRule::Name | FormatRule::Plain => value.to_string(),
            FormatRule::Ratio => format_ratio(n, european),
            FormatRule::Percent => format_percent(n, european),
            FormatRule::LivePercent => format_live_percent(n, european),
            FormatRule::Magnitude2 => format_magnitude(n, 2, european),
            FormatRule::Magnitude0 => format_magnitude(n, 0, european),
            FormatRule::Count => format_count(n, european),
            FormatRule::Seconds => format_seconds(n, european),
        }
    }
}

/// Header and format rule of one display column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub header: &'static str,
    pub rule: FormatRule,
}

macro_rules! column_set {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => ($header:expr, $rule:ident)),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            pub const SPECS: &'static [ColumnSpec] = &[
                $(ColumnSpec { header: $header, rule: FormatRule::$rule }),+
            ];

            pub fn index(self) -> usize {
                self as usize
            }

            pub fn header(self) -> &'static str {
                Self::SPECS[self as usize].header
            }

            pub fn rule(self) -> FormatRule {
                Self::SPECS[self as usize].rule
            }
        }
    };
}

column_set! {
    /// Columns of the damage-out and damage-taken trees.
    DamageColumn {
        Name => ("", Name),
        Dps => ("DPS", Magnitude2),
        TotalDamage => ("Total Damage", Magnitude2),
        Debuff => ("Debuff", Ratio),
        MaxOneHit => ("Max One Hit", Magnitude2),
        CritChance => ("Crit Chance", Ratio),
        Accuracy => ("Accuracy", Ratio),
        FlankRate => ("Flank Rate", Ratio),
        Kills => ("Kills", Count),
        Attacks => ("Attacks", Count),
        Misses => ("Misses", Count),
        CriticalHits => ("Critical Hits", Count),
        FlankHits => ("Flank Hits", Count),
        ShieldDamage => ("Shield Damage", Magnitude2),
        ShieldDps => ("Shield DPS", Magnitude2),
        HullDamage => ("Hull Damage", Magnitude2),
        HullDps => ("Hull DPS", Magnitude2),
        BaseDamage => ("Base Damage", Magnitude2),
        BaseDps => ("Base DPS", Magnitude2),
        CombatTime => ("Combat Time", Seconds),
        HullAttacks => ("Hull Attacks", Count),
        ShieldAttacks => ("Shield Attacks", Count),
    }
}

column_set! {
    /// Columns of the heal-out and heal-in trees.
    HealColumn {
        Name => ("", Name),
        Hps => ("HPS", Magnitude2),
        TotalHeal => ("Total Heal", Magnitude2),
        HullHeal => ("Hull Heal", Magnitude2),
        HullHps => ("Hull HPS", Magnitude2),
        ShieldHeal => ("Shield Heal", Magnitude2),
        ShieldHps => ("Shield HPS", Magnitude2),
        MaxOneHeal => ("Max One Heal", Magnitude2),
        CritChance => ("Crit Chance", Ratio),
        HealTicks => ("Heal Ticks", Count),
        CriticalHeals => ("Critical Heals", Count),
        CombatTime => ("Combat Time", Seconds),
        HullHealTicks => ("Hull Heal Ticks", Count),
        ShieldHealTicks => ("Shield Heal Ticks", Count),
    }
}

column_set! {
    /// Columns of the per-player overview table.
    OverviewColumn {
        CombatTime => ("Combat Time", Seconds),
        Dps => ("DPS", Magnitude2),
        TotalDamage => ("Total Damage", Magnitude2),
        Debuff => ("Debuff", Percent),
        AttacksInShare => ("Attacks-in Share", Percent),
        TakenDamageShare => ("Taken Damage Share", Percent),
        DamageShare => ("Damage Share", Percent),
        MaxOneHit => ("Max One Hit", Magnitude2),
        CritChance => ("Crit Chance", Percent),
        Deaths => ("Deaths", Count),
        TotalHeals => ("Total Heals", Magnitude2),
        HealShare => ("Heal Share", Percent),
        HealCritChance => ("Heal Crit Chance", Percent),
        TotalDamageTaken => ("Total Damage Taken", Magnitude2),
        TotalHullDamageTaken => ("Total Hull Damage Taken", Magnitude2),
        TotalShieldDamageTaken => ("Total Shield Damage Taken", Magnitude2),
        TotalAttacks => ("Total Attacks", Magnitude0),
        HullAttacks => ("Hull Attacks", Magnitude0),
        AttacksInNumber => ("Attacks-in Number", Magnitude0),
        HealCritNumber => ("Heal Crit Number", Magnitude0),
        HealNumber => ("Heal Number", Magnitude0),
        CritNumber => ("Crit Number", Magnitude0),
        Misses => ("Misses", Magnitude0),
    }
}

column_set! {
    /// Columns of the league ladder table.
    LadderColumn {
        Name => ("Name", Plain),
        Handle => ("Handle", Plain),
        Dps => ("DPS", Magnitude2),
        TotalDamage => ("Total Damage", Magnitude2),
        Deaths => ("Deaths", Count),
        CombatTime => ("Combat Time", Seconds),
        Date => ("Date", Plain),
        MaxOneHit => ("Max One Hit", Magnitude2),
        Debuff => ("Debuff", Percent),
        Build => ("Build", Plain),
    }
}

column_set! {
    /// Fields reported per entity on every live tick.
    LiveColumn {
        Dps => ("DPS", Magnitude2),
        CombatTime => ("Combat Time", Seconds),
        Debuff => ("Debuff", LivePercent),
        AttacksIn => ("Attacks-in", LivePercent),
        Hps => ("HPS", Magnitude2),
        Kills => ("Kills", Magnitude2),
        Deaths => ("Deaths", Magnitude2),
    }
}

/// Number of values in one live row.
pub const LIVE_COLUMN_COUNT: usize = 7;

/// Formatting rule set of a tree adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeVariant {
    Damage,
    Heal,
}

impl TreeVariant {
    pub fn specs(self) -> &'static [ColumnSpec] {
        match self {
            TreeVariant::Damage => DamageColumn::SPECS,
            TreeVariant::Heal => HealColumn::SPECS,
        }
    }

    pub fn column_count(self) -> usize {
        self.specs().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oscr_types::{DAMAGE_COLUMN_TOGGLES, HEAL_COLUMN_TOGGLES, LIVE_COLUMN_TOGGLES};

    #[test]
    fn test_column_counts_match_settings() {
        assert_eq!(DamageColumn::ALL.len(), DAMAGE_COLUMN_TOGGLES + 1);
        assert_eq!(HealColumn::ALL.len(), HEAL_COLUMN_TOGGLES + 1);
        assert_eq!(LiveColumn::ALL.len(), LIVE_COLUMN_TOGGLES);
        assert_eq!(LiveColumn::ALL.len(), LIVE_COLUMN_COUNT);
        assert_eq!(OverviewColumn::ALL.len(), 23);
        assert_eq!(LadderColumn::ALL.len(), 10);
    }

    #[test]
    fn test_index_matches_position() {
        for (i, col) in DamageColumn::ALL.iter().enumerate() {
            assert_eq!(col.index(), i);
        }
        assert_eq!(DamageColumn::CombatTime.index(), 19);
        assert_eq!(HealColumn::CombatTime.index(), 11);
        assert_eq!(HealColumn::CritChance.rule(), FormatRule::Ratio);
    }

    #[test]
    fn test_name_rule() {
        let name = CellValue::name("Kira", "@kira");
        assert_eq!(FormatRule::Name.apply(&name, false), "Kira@kira");
        assert_eq!(FormatRule::Name.apply(&CellValue::text("Phaser Beam"), false), "Phaser Beam");
    }

    #[test]
    fn test_numeric_rules() {
        let v = CellValue::Number(1234.5678);
        assert_eq!(FormatRule::Magnitude2.apply(&v, false), "1,234.57");
        assert_eq!(FormatRule::Magnitude0.apply(&v, false), "1,235");
        assert_eq!(FormatRule::Count.apply(&v, false), "1,235");
        assert_eq!(FormatRule::Seconds.apply(&CellValue::Number(42.0), false), "42.0s");
        assert_eq!(FormatRule::Ratio.apply(&CellValue::Number(0.5), false), "50.00%");
        assert_eq!(FormatRule::Percent.apply(&CellValue::Number(0.5), false), "0.50%");
    }

    #[test]
    fn test_format_fallback() {
        let text = CellValue::text("n/a");
        assert_eq!(FormatRule::Magnitude2.apply(&text, false), "n/a");
        assert_eq!(FormatRule::Seconds.apply(&CellValue::name("a", "@b"), false), "a@b");
        assert_eq!(FormatRule::Ratio.apply(&CellValue::Absent, false), "");
    }

    #[test]
    fn test_live_percent_sentinel() {
        assert_eq!(
            LiveColumn::Debuff.rule().apply(&CellValue::Number(0.0), false),
            "---.--%"
        );
        assert_eq!(
            LiveColumn::Debuff.rule().apply(&CellValue::Number(12.0), false),
            "12.00%"
        );
    }
}
