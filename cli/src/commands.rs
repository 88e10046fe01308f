use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::ValueEnum;
use oscr_core::config;
use oscr_core::import::{ExportAnalyzer, ReplaySource};
use oscr_core::model::{ColumnVisibility, LiveView, SelectionMode};
use oscr_core::pipeline::{LiveConfig, LivePoller, RequestOutcome};
use oscr_core::view::TreeKind;
use oscr_core::ParserBridge;
use oscr_types::{LiveGraphField, Settings, SortOrder, TableFamily};
use tracing::{info, warn};

use crate::render;

const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TreeArg {
    DamageOut,
    DamageIn,
    HealOut,
    HealIn,
}

impl From<TreeArg> for TreeKind {
    fn from(arg: TreeArg) -> Self {
        match arg {
            TreeArg::DamageOut => TreeKind::DamageOut,
            TreeArg::DamageIn => TreeKind::DamageIn,
            TreeArg::HealOut => TreeKind::HealOut,
            TreeArg::HealIn => TreeKind::HealIn,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FamilyArg {
    Damage,
    Heal,
    Live,
}

impl From<FamilyArg> for TableFamily {
    fn from(arg: FamilyArg) -> Self {
        match arg {
            FamilyArg::Damage => TableFamily::Damage,
            FamilyArg::Heal => TableFamily::Heal,
            FamilyArg::Live => TableFamily::Live,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GraphArg {
    Off,
    Dps,
    Debuff,
    AttacksIn,
    Hps,
}

fn order(descending: bool) -> SortOrder {
    if descending {
        SortOrder::Descending
    } else {
        SortOrder::Ascending
    }
}

struct LiveSession {
    poller: LivePoller,
    view: LiveView,
}

/// REPL state: the analysis bridge, an optional live session and the
/// settings file in use.
pub struct Session {
    bridge: ParserBridge,
    live: Option<LiveSession>,
    settings_path: Option<PathBuf>,
}

impl Session {
    pub fn new(settings: Settings, settings_path: Option<PathBuf>) -> Self {
        Self {
            bridge: ParserBridge::new(Arc::new(ExportAnalyzer), settings),
            live: None,
            settings_path,
        }
    }

    /// Apply background results and print failures. Called before every command.
    pub fn pump(&mut self) {
        self.bridge.pump();
        for failure in self.bridge.take_failures() {
            println!("Analysis failed ({:?}): {}", failure.reason, failure.detail);
        }
        if let Some(live) = &mut self.live {
            live.poller.pump(&mut live.view);
            for failure in live.poller.take_failures() {
                println!("Live update failed ({:?}): {}", failure.reason, failure.detail);
            }
        }
    }

    fn settings(&self) -> &Settings {
        self.bridge.view().settings()
    }

    fn update_settings(&mut self, settings: Settings) {
        if let Some(live) = &mut self.live {
            apply_live_settings(&mut live.view, &settings);
        }
        self.bridge.view_mut().update_settings(settings);
    }
}

fn apply_live_settings(view: &mut LiveView, settings: &Settings) {
    let table = view.table_mut();
    table.set_european(settings.european_number_format);
    ColumnVisibility::from_settings(settings).apply(TableFamily::Live, &mut [table]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Analysis
// ─────────────────────────────────────────────────────────────────────────────

/// Relative paths missing from the working directory are looked up in the
/// OSCR data directory.
fn resolve_data_path(path: &Path) -> PathBuf {
    if path.is_relative() && !path.exists() {
        if let Some(candidate) = config::default_data_dir().map(|dir| dir.join(path)) {
            if candidate.exists() {
                return candidate;
            }
        }
    }
    path.to_path_buf()
}

pub fn load(session: &mut Session, path: &Path) -> Result<(), String> {
    let path = resolve_data_path(path);
    let path = path.as_path();
    match session.bridge.open_log(path) {
        RequestOutcome::Skipped => {
            println!("{} is still being analyzed", path.display());
            return Ok(());
        }
        RequestOutcome::Started => info!(path = %path.display(), "Loading export"),
    }

    let deadline = Instant::now() + LOAD_TIMEOUT;
    while session.bridge.is_busy() {
        session.pump();
        if Instant::now() > deadline {
            warn!("Analysis still running, continuing in the background");
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    session.pump();
    print!(
        "{}",
        render::render_combat_list(
            &session.bridge.view().combat_list(),
            session.bridge.view().current_position()
        )
    );
    Ok(())
}

pub fn list(session: &Session) -> Result<(), String> {
    let view = session.bridge.view();
    print!(
        "{}",
        render::render_combat_list(&view.combat_list(), view.current_position())
    );
    Ok(())
}

pub fn show(session: &mut Session, position: usize) -> Result<(), String> {
    if !session.bridge.view_mut().show_combat(position) {
        return Err(format!("no combat at position {position}\n"));
    }
    summary(session)
}

pub fn tree(session: &Session, kind: TreeKind, depth: Option<usize>) -> Result<(), String> {
    print!("{}", render::render_tree(session.bridge.view(), kind, depth));
    Ok(())
}

pub fn sort(
    session: &mut Session,
    kind: TreeKind,
    column: usize,
    descending: bool,
) -> Result<(), String> {
    let width = session.bridge.view().pane(kind).model.column_count();
    if column >= width {
        return Err(format!("column must be below {width}\n"));
    }
    session.bridge.view_mut().sort_tree(kind, column, order(descending));
    tree(session, kind, Some(1))
}

pub fn select(
    session: &mut Session,
    kind: TreeKind,
    paths: &[String],
    column: usize,
    extend: bool,
) -> Result<(), String> {
    let model = &session.bridge.view().pane(kind).model;
    let indices = paths
        .iter()
        .map(|p| {
            render::resolve_path(model, p, column).ok_or_else(|| format!("no row at {p}\n"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let mode = if extend {
        SelectionMode::Extend
    } else {
        SelectionMode::Replace
    };
    session.bridge.view_mut().select(kind, &indices, mode);
    println!(
        "{} cell(s) selected",
        session.bridge.view().pane(kind).selection.len()
    );
    Ok(())
}

pub fn copy(session: &Session, kind: TreeKind) -> Result<(), String> {
    let text = session.bridge.view().copy_selection(kind);
    if text.is_empty() {
        println!("Nothing selected");
    } else {
        println!("{text}");
    }
    Ok(())
}

pub fn overview(session: &Session) -> Result<(), String> {
    print!("{}", render::render_overview(session.bridge.view().overview()));
    Ok(())
}

pub fn graphs(session: &Session) -> Result<(), String> {
    let graphs = session
        .bridge
        .view()
        .overview_graphs()
        .ok_or("No combat shown\n")?;
    print!("{}", render::render_graphs(&graphs));
    Ok(())
}

pub fn overview_sort(
    session: &mut Session,
    column: usize,
    descending: bool,
) -> Result<(), String> {
    // The proxy comparator is inverted: a descending view is an ascending request.
    let requested = order(descending).reversed();
    session.bridge.view_mut().overview_mut().sort(column, requested);
    overview(session)
}

pub fn filter(session: &mut Session, text: Option<&str>) -> Result<(), String> {
    session
        .bridge
        .view_mut()
        .overview_mut()
        .set_filter(text.unwrap_or(""));
    overview(session)
}

pub fn summary(session: &Session) -> Result<(), String> {
    match session.bridge.view().combat_summary() {
        Some(line) => println!("{line}"),
        None => println!("No combat shown"),
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

pub fn columns(
    session: &mut Session,
    family: TableFamily,
    flag: usize,
    visible: bool,
) -> Result<(), String> {
    let mut settings = session.settings().clone();
    let count = settings.columns(family).len();
    let Some(slot) = settings.columns_mut(family).get_mut(flag) else {
        return Err(format!("{family:?} has {count} column flags\n"));
    };
    *slot = visible;
    session.update_settings(settings);
    Ok(())
}

pub fn european(session: &mut Session, enabled: bool) -> Result<(), String> {
    let mut settings = session.settings().clone();
    settings.european_number_format = enabled;
    session.update_settings(settings);
    Ok(())
}

pub fn show_settings(session: &Session) -> Result<(), String> {
    if let Some(path) = &session.settings_path {
        println!("settings file: {}", path.display());
    }
    println!("{:#?}", session.settings());
    Ok(())
}

pub fn save_settings(session: &Session, path: Option<&Path>) -> Result<(), String> {
    let target = path.map(Path::to_path_buf).or_else(|| session.settings_path.clone());
    match target {
        Some(path) => {
            config::save_to_path(&path, session.settings()).map_err(|e| e.to_string())?
        }
        None => config::store_settings(session.settings()).map_err(|e| e.to_string())?,
    }
    println!("Settings saved");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Live
// ─────────────────────────────────────────────────────────────────────────────

pub fn live_start(
    session: &mut Session,
    path: &Path,
    graph: Option<GraphArg>,
) -> Result<(), String> {
    live_stop(session);

    let mut settings = session.settings().clone();
    if let Some(graph) = graph {
        let field = match graph {
            GraphArg::Off => None,
            GraphArg::Dps => Some(LiveGraphField::Dps),
            GraphArg::Debuff => Some(LiveGraphField::Debuff),
            GraphArg::AttacksIn => Some(LiveGraphField::AttacksIn),
            GraphArg::Hps => Some(LiveGraphField::Hps),
        };
        settings.live_graph_active = field.is_some();
        if let Some(field) = field {
            settings.live_graph_field = field;
        }
        session.update_settings(settings.clone());
    }

    let source = ReplaySource::open(&resolve_data_path(path)).map_err(|e| e.to_string())?;
    let mut view = LiveView::new();
    apply_live_settings(&mut view, &settings);
    session.live = Some(LiveSession {
        poller: LivePoller::start(source, LiveConfig::from_settings(&settings)),
        view,
    });
    println!("Live replay started");
    Ok(())
}

pub fn live_show(session: &Session) -> Result<(), String> {
    let live = session.live.as_ref().ok_or("live mode is not running\n")?;
    print!("{}", render::render_live(&live.view));
    Ok(())
}

pub fn live_copy(session: &Session) -> Result<(), String> {
    let live = session.live.as_ref().ok_or("live mode is not running\n")?;
    println!("{}", live.view.table().copy_text(session.settings().live_copy_kills));
    Ok(())
}

pub fn live_stop(session: &mut Session) {
    if let Some(mut live) = session.live.take() {
        live.poller.stop();
        println!("Live replay stopped");
    }
}

pub fn exit(session: &mut Session) {
    live_stop(session);
    println!("Exiting...");
}
