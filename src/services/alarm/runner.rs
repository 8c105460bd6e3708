use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Local, NaiveDate};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use super::{AlarmScheduler, DedupStore, FiredAlarm};
use crate::models::event::Event;
use crate::services::notification::Notifier;

pub type NowProvider = Arc<dyn Fn() -> DateTime<Local> + Send + Sync>;

/// Scheduler plus the stores it writes to.
pub struct AlarmRunner<D, N> {
    scheduler: AlarmScheduler,
    dedup: D,
    notifier: N,
    now: NowProvider,
    pruned_through: Option<NaiveDate>,
}

impl<D: DedupStore, N: Notifier> AlarmRunner<D, N> {
    pub fn new(scheduler: AlarmScheduler, dedup: D, notifier: N) -> Self {
        Self::with_now_provider(scheduler, dedup, notifier, Arc::new(Local::now))
    }

    pub fn with_now_provider(
        scheduler: AlarmScheduler,
        dedup: D,
        notifier: N,
        now: NowProvider,
    ) -> Self {
        Self {
            scheduler,
            dedup,
            notifier,
            now,
            pruned_through: None,
        }
    }

    pub fn now(&self) -> DateTime<Local> {
        (self.now)()
    }

    /// One poll at the provider's current time.
    pub fn tick(&mut self, events: &[Event]) -> Vec<FiredAlarm> {
        let now = self.now();
        self.tick_at(now, events)
    }

    /// One poll at `now`. Markers from earlier days are pruned on the first
    /// tick of each day.
    pub fn tick_at(&mut self, now: DateTime<Local>, events: &[Event]) -> Vec<FiredAlarm> {
        let today = now.date_naive();

        if self.pruned_through != Some(today) {
            match self.dedup.prune_before(today) {
                Ok(0) => {}
                Ok(removed) => log::debug!("Pruned {} stale alarm markers", removed),
                Err(err) => log::warn!("Failed to prune alarm markers: {:#}", err),
            }
            self.pruned_through = Some(today);
        }

        self.scheduler
            .poll(events, now, &mut self.dedup, &mut self.notifier)
    }

    pub fn dedup(&self) -> &D {
        &self.dedup
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }
}

/// Poll every `period` until `shutdown` flips to true or its sender is
/// dropped. The first poll happens immediately. `events` is called on each
/// tick with the current local date and returns the collection to check,
/// which gives the caller a chance to roll materialized windows forward.
/// Returns the number of alarms fired.
pub async fn run_alarm_loop<D, N, F>(
    runner: &mut AlarmRunner<D, N>,
    period: StdDuration,
    mut events: F,
    mut shutdown: watch::Receiver<bool>,
) -> usize
where
    D: DedupStore,
    N: Notifier,
    F: FnMut(NaiveDate) -> Vec<Event>,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut fired = 0;

    log::info!("Alarm loop started, polling every {:?}", period);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = runner.now();
                let current = events(now.date_naive());
                fired += runner.tick_at(now, &current).len();
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    log::info!("Alarm loop stopped after {} alarms", fired);

    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::habit::Habit;
    use crate::services::alarm::MemoryDedupStore;
    use crate::services::habit::WindowRoller;
    use crate::services::notification::DesktopNotifier;
    use crate::services::store::{EventStore, MemoryEventStore};
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fixed(now: DateTime<Local>) -> NowProvider {
        Arc::new(move || now)
    }

    fn standup(start: DateTime<Local>) -> Event {
        Event::new("evt-1", "Standup", start, start + Duration::minutes(15)).unwrap()
    }

    #[test]
    fn test_tick_prunes_yesterday() {
        let now = Local.with_ymd_and_hms(2026, 6, 3, 8, 55, 0).unwrap();
        let mut dedup = MemoryDedupStore::new();
        dedup
            .mark("alarm:old:2026-06-02", now.date_naive() - Duration::days(1), "Old")
            .unwrap();

        let mut runner = AlarmRunner::with_now_provider(
            AlarmScheduler::default(),
            dedup,
            DesktopNotifier::new(false),
            fixed(now),
        );
        let fired = runner.tick(&[standup(now + Duration::minutes(5))]);

        assert_eq!(fired.len(), 1);
        assert_eq!(runner.dedup().len(), 1);
        assert!(runner.dedup().contains(&fired[0].key).unwrap());
    }

    #[tokio::test]
    async fn test_loop_polls_immediately_and_stops() {
        let start = Local::now() + Duration::minutes(5);
        let mut runner = AlarmRunner::new(
            AlarmScheduler::default(),
            MemoryDedupStore::new(),
            DesktopNotifier::new(false),
        );
        let (tx, rx) = watch::channel(false);

        let stopper = tokio::spawn(async move {
            tokio::time::sleep(StdDuration::from_millis(50)).await;
            let _ = tx.send(true);
        });

        let events = if start.date_naive() == Local::now().date_naive() {
            vec![standup(start)]
        } else {
            Vec::new()
        };
        let expected = events.len();

        let fired = run_alarm_loop(&mut runner, StdDuration::from_millis(10), |_| events.clone(), rx).await;
        stopper.await.unwrap();

        assert_eq!(fired, expected);
    }

    #[tokio::test]
    async fn test_loop_rolls_habits_into_new_week() {
        // First poll Sunday evening, every later poll Monday morning
        let sunday = Local.with_ymd_and_hms(2026, 6, 7, 20, 0, 0).unwrap();
        let monday = Local.with_ymd_and_hms(2026, 6, 8, 6, 55, 0).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let now: NowProvider = Arc::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                sunday
            } else {
                monday
            }
        });

        let mut runner = AlarmRunner::with_now_provider(
            AlarmScheduler::default(),
            MemoryDedupStore::new(),
            DesktopNotifier::new(false),
            now,
        );
        let mut store = MemoryEventStore::new();
        let mut roller = WindowRoller::new(
            vec![Habit::new("run", "Run").with_times("07:00", "07:30").with_days([1])],
            Vec::new(),
        );

        let (tx, rx) = watch::channel(false);
        let stopper = tokio::spawn(async move {
            tokio::time::sleep(StdDuration::from_millis(60)).await;
            let _ = tx.send(true);
        });

        let fired = run_alarm_loop(
            &mut runner,
            StdDuration::from_millis(10),
            |today| {
                roller.roll(&mut store, today);
                store.events().to_vec()
            },
            rx,
        )
        .await;
        stopper.await.unwrap();

        assert!(calls.load(Ordering::SeqCst) >= 2);
        assert_eq!(fired, 1);
        assert!(runner.dedup().contains("alarm:habit-run-2026-06-08:2026-06-08").unwrap());
        assert!(store.find("habit-run-2026-06-08").is_some());
    }
}
