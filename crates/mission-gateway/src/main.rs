use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

mod aggregate;
mod app;
mod http;

/// Mission-control gateway: one HTTP API over jobs, calendar, mail, notes and the activity log.
#[derive(Parser)]
#[command(name = "mission-gateway")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML config file (falls back to MISSION_CONFIG, then ~/.mission-control/mission.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the bind address
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mission_gateway=info,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();

    // load config: --config > MISSION_CONFIG env > ~/.mission-control/mission.toml
    let config_path = cli.config.or_else(|| std::env::var("MISSION_CONFIG").ok());
    let mut config = mission_core::MissionConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        mission_core::MissionConfig::default()
    });
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    let db_path = config.database.path.clone();
    ensure_parent_dir(&db_path);
    info!(path = %db_path, "opening SQLite database");

    let db = rusqlite::Connection::open(&db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL;")?;
    mission_scheduler::db::init_db(&db)?;
    mission_activity::db::init_db(&db)?;
    info!("database migrations complete");

    // each subsystem gets its own connection
    let tasks = mission_scheduler::LocalTaskStore::new(rusqlite::Connection::open(&db_path)?)?;
    let activity = Arc::new(mission_activity::ActivityLog::new(rusqlite::Connection::open(
        &db_path,
    )?)?);

    let tz = config.schedule.tz();
    let timeout = Duration::from_secs(config.sources.timeout_secs);
    let sources = &config.sources;
    let jobs = mission_sources::JobLister::new(&sources.jobs, timeout);
    let calendar = mission_sources::CalendarReader::new(&sources.calendar, tz, timeout);
    let mail = mission_sources::MailReader::new(&sources.mail, timeout);

    let notes = mission_search::NoteCorpus::new(
        &config.notes.dir,
        &config.notes.top_level,
        config.notes.path_prefix.clone(),
    );

    let aggregator = aggregate::Aggregator {
        jobs: Arc::new(jobs),
        calendar: Arc::new(calendar),
        tasks,
        activity,
        notes,
        tz,
        limits: mission_scheduler::BucketLimits {
            per_kind: config.schedule.bucket_per_kind,
        },
        upcoming_limit: config.schedule.upcoming_limit,
        engine: mission_search::SearchEngine::new(config.search.max_results),
        activity_limit: u32::try_from(config.search.activity_limit).unwrap_or(u32::MAX),
    };

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let state = Arc::new(app::AppState::new(config, aggregator, mail));
    let router = app::build_router(state);

    info!(timezone = %tz, "Mission gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
