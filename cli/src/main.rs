use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use oscr_cli::commands::{self, FamilyArg, GraphArg, Session, TreeArg};
use oscr_cli::readline;
use oscr_core::config;
use oscr_types::Settings;
use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;

const LOG_FILES_KEPT: usize = 7;

#[derive(Parser)]
#[command(version, about = "Terminal viewer for OSCR analysis exports")]
struct Args {
    /// Settings file to use instead of the default location
    #[arg(short, long)]
    settings: Option<PathBuf>,
}

/// Initialize logging: a daily rolling file in OSCR_LOG_DIR if set, otherwise stderr.
fn init_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(dir) = std::env::var("OSCR_LOG_DIR") {
        let appender = BasicRollingFileAppender::new(
            PathBuf::from(dir).join("oscr.log"),
            RollingConditionBasic::new().daily(),
            LOG_FILES_KEPT,
        );
        if let Ok(appender) = appender {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            return Some(guard);
        }
    }

    // Fallback to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
    None
}

fn load_settings(path: Option<&PathBuf>) -> Settings {
    let loaded = match path {
        Some(path) if !path.exists() => return Settings::default(),
        Some(path) => config::load_from_path(path),
        None => config::load_settings(),
    };
    loaded.unwrap_or_else(|e| {
        warn!(error = %e, "Falling back to default settings");
        Settings::default()
    })
}

fn main() -> Result<(), String> {
    let _guard = init_logging();
    let args = Args::parse();
    let settings_path = args.settings.clone().or_else(|| config::settings_path().ok());
    let mut session = Session::new(load_settings(args.settings.as_ref()), settings_path);

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        session.pump();
        match respond(line, &mut session) {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                write!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about = "oscr")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze an export file; the newest combat is shown first
    Load { path: PathBuf },
    /// List analyzed combats
    List,
    /// Show the combat at a combat list position
    Show { position: usize },
    Tree {
        #[arg(value_enum)]
        kind: TreeArg,
        #[arg(short, long)]
        depth: Option<usize>,
    },
    /// Sort a tree below its Player and NPC rows
    Sort {
        #[arg(value_enum)]
        kind: TreeArg,
        column: usize,
        #[arg(short, long)]
        descending: bool,
    },
    /// Select rows by path (`0/1/2`); column 0 selects the whole row
    Select {
        #[arg(value_enum)]
        kind: TreeArg,
        paths: Vec<String>,
        #[arg(short, long, default_value_t = 0)]
        column: usize,
        #[arg(short, long)]
        extend: bool,
    },
    Copy {
        #[arg(value_enum)]
        kind: TreeArg,
    },
    Overview,
    /// DPS lines, damage per interval and DPS ranking of the shown combat
    Graphs,
    OverviewSort {
        column: usize,
        #[arg(short, long)]
        descending: bool,
    },
    Filter { text: Option<String> },
    Summary,
    /// Show or hide one toggleable column of a table family
    Columns {
        #[arg(value_enum)]
        family: FamilyArg,
        flag: usize,
        #[arg(action = clap::ArgAction::Set)]
        visible: bool,
    },
    European {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    Config,
    SaveConfig { path: Option<PathBuf> },
    /// Replay a live tick file (JSON lines)
    LiveStart {
        path: PathBuf,
        #[arg(short, long, value_enum)]
        graph: Option<GraphArg>,
    },
    LiveShow,
    LiveCopy,
    LiveStop,
    Exit,
}

fn respond(line: &str, session: &mut Session) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "oscr".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match cli.command {
        Some(Commands::Load { path }) => commands::load(session, &path)?,
        Some(Commands::List) => commands::list(session)?,
        Some(Commands::Show { position }) => commands::show(session, position)?,
        Some(Commands::Tree { kind, depth }) => commands::tree(session, kind.into(), depth)?,
        Some(Commands::Sort {
            kind,
            column,
            descending,
        }) => commands::sort(session, kind.into(), column, descending)?,
        Some(Commands::Select {
            kind,
            paths,
            column,
            extend,
        }) => commands::select(session, kind.into(), &paths, column, extend)?,
        Some(Commands::Copy { kind }) => commands::copy(session, kind.into())?,
        Some(Commands::Overview) => commands::overview(session)?,
        Some(Commands::Graphs) => commands::graphs(session)?,
        Some(Commands::OverviewSort { column, descending }) => {
            commands::overview_sort(session, column, descending)?
        }
        Some(Commands::Filter { text }) => commands::filter(session, text.as_deref())?,
        Some(Commands::Summary) => commands::summary(session)?,
        Some(Commands::Columns {
            family,
            flag,
            visible,
        }) => commands::columns(session, family.into(), flag, visible)?,
        Some(Commands::European { enabled }) => commands::european(session, enabled)?,
        Some(Commands::Config) => commands::show_settings(session)?,
        Some(Commands::SaveConfig { path }) => {
            commands::save_settings(session, path.as_deref())?
        }
        Some(Commands::LiveStart { path, graph }) => {
            commands::live_start(session, &path, graph)?
        }
        Some(Commands::LiveShow) => commands::live_show(session)?,
        Some(Commands::LiveCopy) => commands::live_copy(session)?,
        Some(Commands::LiveStop) => commands::live_stop(session),
        Some(Commands::Exit) => {
            commands::exit(session);
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
