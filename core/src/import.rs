//! Reading analysis exports and live replay files.
//!
//! An export is a JSON document holding the analyzed combats of one log:
//!
//! ```json
//! { "combats": [ {
//!     "id": 0, "map": "Infected Space", "difficulty": "Elite",
//!     "start_time": "2024-05-01T20:00:00",
//!     "overview": [ { "name": "Kira", "handle": "@kira", "cells": [60.0, 1234.5],
//!                     "graph_time": [1.0, 2.0], "dps_graph": [900.0, 1234.5],
//!                     "damage_graph": [900.0, 1569.0] } ],
//!     "damage_out": { "children": [
//!         { "tag": "player", "cells": ["Player", 1234.5], "children": [] },
//!         { "tag": "npc", "cells": ["NPC", 99.0], "children": [] } ] },
//!     "damage_in": {}, "heal_out": {}, "heal_in": {}
//! } ] }
//! ```
//!
//! Cells are `null` (absent), numbers, strings or `[name, handle]` pairs.
//! Live replay files carry one tick per line:
//! `{"entries": [["Kira@kira", [dps, time, debuff, attacks_in, hps, kills, deaths]]]}`.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::analysis::{
    AnalysisTree, CombatAnalysis, CombatMeta, NodeId, NodeTag, OverviewRow, PlayerGraph,
};
use crate::cell::CellValue;
use crate::columns::{LIVE_COLUMN_COUNT, TreeVariant};
use crate::model::LiveRow;
use crate::pipeline::{AnalysisRequest, CombatAnalyzer, CombatSink, EngineError, LiveSource};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid export JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("combat {combat}: {message}")]
    Structure { combat: usize, message: String },
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire records
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellRecord {
    Absent,
    Number(f64),
    Text(String),
    Name(String, String),
}

impl From<CellRecord> for CellValue {
    fn from(record: CellRecord) -> Self {
        match record {
            CellRecord::Absent => CellValue::Absent,
            CellRecord::Number(n) => CellValue::Number(n),
            CellRecord::Text(s) => CellValue::Text(s),
            CellRecord::Name(name, handle) => CellValue::Name { name, handle },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagRecord {
    Player,
    Npc,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<TagRecord>,
    #[serde(default)]
    pub cells: Vec<CellRecord>,
    #[serde(default)]
    pub children: Vec<NodeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewRecord {
    pub name: String,
    pub handle: String,
    #[serde(default)]
    pub cells: Vec<CellRecord>,
    /// Sample times of the graph series, in seconds
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub graph_time: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dps_graph: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub damage_graph: Vec<f64>,
}

impl OverviewRecord {
    fn into_row(self, combat: usize) -> OverviewRow {
        let samples = self.graph_time.len();
        if self.dps_graph.len() != samples || self.damage_graph.len() != samples {
            warn!(
                combat,
                player = %self.name,
                samples,
                dps = self.dps_graph.len(),
                damage = self.damage_graph.len(),
                "Graph series lengths differ, extra samples ignored"
            );
        }
        OverviewRow {
            name: self.name,
            handle: self.handle,
            cells: self.cells.into_iter().map(CellValue::from).collect(),
            graph: PlayerGraph {
                time: self.graph_time,
                dps: self.dps_graph,
                damage: self.damage_graph,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatRecord {
    pub id: usize,
    pub map: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    pub start_time: NaiveDateTime,
    #[serde(default)]
    pub overview: Vec<OverviewRecord>,
    #[serde(default)]
    pub damage_out: NodeRecord,
    #[serde(default)]
    pub damage_in: NodeRecord,
    #[serde(default)]
    pub heal_out: NodeRecord,
    #[serde(default)]
    pub heal_in: NodeRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportFile {
    pub combats: Vec<CombatRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveTickRecord {
    pub entries: Vec<(String, [f64; LIVE_COLUMN_COUNT])>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversion
// ─────────────────────────────────────────────────────────────────────────────

/// Build an arena tree from a root record. The root must have either no
/// children or exactly the Player and NPC aggregates.
pub fn build_tree(
    root: NodeRecord,
    variant: TreeVariant,
    combat: usize,
) -> Result<AnalysisTree, ImportError> {
    let mut tree = AnalysisTree::new(variant.column_count());
    match root.children.len() {
        0 => return Ok(tree),
        2 => {}
        n => {
            return Err(ImportError::Structure {
                combat,
                message: format!("tree root has {n} children, expected 2"),
            });
        }
    }

    let mut stack: Vec<(NodeId, NodeRecord, bool)> = root
        .children
        .into_iter()
        .rev()
        .map(|child| (NodeId::ROOT, child, true))
        .collect();
    let mut first_group = None;
    while let Some((parent, record, top_level)) = stack.pop() {
        if record.cells.len() > variant.column_count() {
            warn!(combat, cells = record.cells.len(), "Row wider than column set, truncated");
        }
        let tag = match (top_level, record.tag) {
            (true, Some(TagRecord::Npc)) => NodeTag::Npc,
            (true, Some(TagRecord::Player)) => NodeTag::Player,
            // Untagged aggregates follow the Player-then-NPC convention.
            (true, None) if first_group.is_none() => NodeTag::Player,
            (true, None) => NodeTag::Npc,
            (false, _) => NodeTag::Row,
        };
        let cells = record.cells.into_iter().map(CellValue::from).collect();
        let id = tree
            .push_child(parent, tag, cells)
            .ok_or_else(|| ImportError::Structure {
                combat,
                message: "dangling parent".to_string(),
            })?;
        if top_level && first_group.is_none() {
            first_group = Some(tag);
        }
        stack.extend(
            record
                .children
                .into_iter()
                .rev()
                .map(|child| (id, child, false)),
        );
    }
    Ok(tree)
}

impl CombatRecord {
    pub fn into_analysis(self) -> Result<CombatAnalysis, ImportError> {
        let id = self.id;
        Ok(CombatAnalysis {
            meta: CombatMeta {
                id,
                map: self.map,
                difficulty: self.difficulty,
                start_time: self.start_time,
            },
            overview: self
                .overview
                .into_iter()
                .map(|r| r.into_row(id))
                .collect(),
            damage_out: build_tree(self.damage_out, TreeVariant::Damage, id)?,
            damage_in: build_tree(self.damage_in, TreeVariant::Damage, id)?,
            heal_out: build_tree(self.heal_out, TreeVariant::Heal, id)?,
            heal_in: build_tree(self.heal_in, TreeVariant::Heal, id)?,
        })
    }
}

pub fn parse_export(json: &str) -> Result<ExportFile, ImportError> {
    Ok(serde_json::from_str(json)?)
}

pub fn read_export(path: &Path) -> Result<ExportFile, ImportError> {
    let contents = fs::read_to_string(path).map_err(|e| ImportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let export = parse_export(&contents)?;
    debug!(path = %path.display(), combats = export.combats.len(), "Read analysis export");
    Ok(export)
}

pub fn parse_live_tick(line: &str) -> Result<Vec<LiveRow>, ImportError> {
    let record: LiveTickRecord = serde_json::from_str(line)?;
    Ok(record
        .entries
        .into_iter()
        .map(|(label, values)| LiveRow::new(label, values))
        .collect())
}

// ─────────────────────────────────────────────────────────────────────────────
// File-backed engine and live source
// ─────────────────────────────────────────────────────────────────────────────

/// Analyzer serving combats from export files instead of raw combat logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExportAnalyzer;

impl CombatAnalyzer for ExportAnalyzer {
    fn analyze(&self, request: &AnalysisRequest, sink: &CombatSink) -> Result<(), EngineError> {
        if !request.log.exists() {
            return Err(EngineError::LogFileMissing(request.log.clone()));
        }
        let export = read_export(&request.log).map_err(|e| match e {
            ImportError::Io { path, source } => EngineError::Io { path, source },
            other => EngineError::Parse(other.to_string()),
        })?;
        let mut records = export.combats;
        records.sort_by_key(|c| c.id);
        for record in records
            .into_iter()
            .skip(request.skip)
            .take(request.max_combats)
        {
            let analysis = record
                .into_analysis()
                .map_err(|e| EngineError::Parse(e.to_string()))?;
            if !sink.deliver(analysis) {
                break;
            }
        }
        Ok(())
    }
}

/// Replays a JSON-lines tick file, one line per poll.
pub struct ReplaySource {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
}

impl ReplaySource {
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        let file = File::open(path)
            .map_err(|e| EngineError::LiveLogUnavailable(format!("{}: {e}", path.display())))?;
        Ok(Self {
            path: path.to_path_buf(),
            lines: BufReader::new(file).lines(),
        })
    }
}

impl LiveSource for ReplaySource {
    fn poll(&mut self) -> Result<Option<Vec<LiveRow>>, EngineError> {
        loop {
            let Some(line) = self.lines.next() else {
                return Ok(None);
            };
            let line = line.map_err(|e| EngineError::Io {
                path: self.path.clone(),
                source: e,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            return parse_live_tick(&line)
                .map(Some)
                .map_err(|e| EngineError::Parse(e.to_string()));
        }
    }
}
