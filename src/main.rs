// Life Calendar alarm daemon
// Loads the event snapshot, keeps habit instances rolled to the current week
// and polls for reminders until interrupted.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::watch;

use life_calendar::models::goal::GoalTree;
use life_calendar::services::alarm::{run_alarm_loop, AlarmRunner, AlarmScheduler, SqliteDedupStore};
use life_calendar::services::habit::WindowRoller;
use life_calendar::services::notification::DesktopNotifier;
use life_calendar::services::settings::{project_dirs, SettingsService};
use life_calendar::services::store::snapshot::load_snapshot;
use life_calendar::services::store::{EventStore, MemoryEventStore};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    log::info!("Starting Life Calendar alarm daemon");

    let settings_service = SettingsService::from_project_dirs()?;
    let settings = settings_service.load_or_default();

    let data_dir = project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    let snapshot_path = settings
        .snapshot_path
        .clone()
        .unwrap_or_else(|| data_dir.join("snapshot.json"));
    let dedup_path = settings
        .dedup_db_path
        .clone()
        .unwrap_or_else(|| data_dir.join("alarms.db"));

    let snapshot = load_snapshot(&snapshot_path)?;
    if snapshot.rejected_events > 0 {
        log::warn!("Skipped {} unreadable events", snapshot.rejected_events);
    }

    let goals = GoalTree::from_goals(snapshot.goals).context("Invalid goal hierarchy")?;
    let mut store = MemoryEventStore::with_events(snapshot.events);
    log::info!("Loaded {} events", store.len());
    let habit_goals = goals.habit_goals().into_iter().cloned().collect();
    let mut roller = WindowRoller::new(snapshot.habits, habit_goals);

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;
    let dedup = SqliteDedupStore::open(&dedup_path)?;
    let notifier = DesktopNotifier::new(settings.system_notifications);
    let mut runner = AlarmRunner::new(AlarmScheduler::from_settings(&settings), dedup, notifier);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Shutting down");
            let _ = shutdown_tx.send(true);
        }
    });

    let period = Duration::from_secs(settings.alarm_poll_seconds);
    let events = |today| {
        if let Some(report) = roller.roll(&mut store, today) {
            log::info!(
                "Habit window for {}: {} instances added, {} removed",
                today,
                report.added.len(),
                report.removed.len()
            );
        }
        store.events().to_vec()
    };
    run_alarm_loop(&mut runner, period, events, shutdown_rx).await;

    Ok(())
}
