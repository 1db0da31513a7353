//! The refresh cycle: fetch, evaluate, notify, persist, expire.
//!
//! A cycle runs `Idle -> Fetching -> Evaluating -> NotifyingAndPersisting ->
//! Idle`. Only one cycle runs at a time; a trigger that arrives while one is
//! in flight is dropped, not queued. The fetched holidays are published as an
//! immutable [`HolidaySnapshot`] that is swapped in whole after a successful
//! fetch, so readers never see a half-updated list.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use tokio::sync::{Mutex, mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::error::HolidayResult;
use crate::evaluator::{Classification, DEFAULT_WINDOW_DAYS, classify_within};
use crate::holiday::HolidayRecord;
use crate::ledger::NotificationLedger;
use crate::notification::{Notification, SchedulerEvent};
use crate::source::{HolidaySource, fetch_with_timeout};

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    #[default]
    Idle,
    Fetching,
    Evaluating,
    NotifyingAndPersisting,
}

/// Holidays loaded by the last successful fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HolidaySnapshot {
    /// (current year, next year), or `None` before the first fetch.
    pub years: Option<(i32, i32)>,
    pub holidays: Vec<HolidayRecord>,
    pub fetched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Completed {
        classification: Classification,
        notified: Vec<Notification>,
    },
    Failed(String),
    /// Another refresh was already in flight.
    Skipped,
}

/// Single-slot guard: holds the in-flight flag until dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct NotificationScheduler<S> {
    source: S,
    clock: Box<dyn Clock>,
    ledger: Mutex<NotificationLedger>,
    snapshot: watch::Sender<Arc<HolidaySnapshot>>,
    state: watch::Sender<SchedulerState>,
    in_flight: AtomicBool,
    events: mpsc::UnboundedSender<SchedulerEvent>,
    window_days: i64,
    fetch_timeout: Duration,
}

impl<S: HolidaySource> NotificationScheduler<S> {
    pub fn new(
        source: S,
        ledger: NotificationLedger,
        events: mpsc::UnboundedSender<SchedulerEvent>,
    ) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(HolidaySnapshot::default()));
        let (state, _) = watch::channel(SchedulerState::Idle);

        NotificationScheduler {
            source,
            clock: Box::new(SystemClock),
            ledger: Mutex::new(ledger),
            snapshot,
            state,
            in_flight: AtomicBool::new(false),
            events,
            window_days: DEFAULT_WINDOW_DAYS,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_window_days(mut self, days: i64) -> Self {
        self.window_days = days.max(0);
        self
    }

    /// Upper bound for fetching one year. A source that never answers is
    /// treated as a failed fetch once this elapses.
    pub fn with_fetch_timeout(mut self, limit: Duration) -> Self {
        self.fetch_timeout = limit;
        self
    }

    /// Apply the scheduler-related settings from `config`.
    pub fn configured(self, config: &AppConfig) -> Self {
        // Allow the source its own timeout plus a margin for both requests
        let limit = Duration::from_secs(config.request_timeout_secs.saturating_mul(3).max(1));
        self.with_window_days(config.notification_days_ahead)
            .with_fetch_timeout(limit)
    }

    pub fn snapshot(&self) -> Arc<HolidaySnapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe_snapshot(&self) -> watch::Receiver<Arc<HolidaySnapshot>> {
        self.snapshot.subscribe()
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Classify the current snapshot against today. Never touches the
    /// network, so it is safe to call on every UI tick.
    pub fn classify_now(&self) -> Classification {
        let snapshot = self.snapshot();
        classify_within(self.clock.today(), &snapshot.holidays, self.window_days)
    }

    /// A copy of the ledger as it stands.
    pub async fn ledger(&self) -> NotificationLedger {
        self.ledger.lock().await.clone()
    }

    /// Run one refresh cycle unless one is already in flight.
    pub async fn try_refresh(&self) -> RefreshOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("refresh already in flight, dropping trigger");
            return RefreshOutcome::Skipped;
        };

        let outcome = self.run_cycle().await;
        self.set_state(SchedulerState::Idle);
        outcome
    }

    async fn run_cycle(&self) -> RefreshOutcome {
        self.set_state(SchedulerState::Fetching);

        let today = self.clock.today();
        let years = (today.year(), today.year() + 1);

        let loaded = self.snapshot.borrow().years;
        if let Some(loaded) = loaded.filter(|loaded| *loaded != years) {
            tracing::info!(
                from = ?loaded,
                to = ?years,
                "year rolled over, discarding stale holidays"
            );
            self.snapshot
                .send_replace(Arc::new(HolidaySnapshot::default()));
        }

        let holidays = match self.fetch_years(years).await {
            Ok(holidays) => holidays,
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch holidays");
                self.emit(SchedulerEvent::FetchError(e.to_string()));
                return RefreshOutcome::Failed(e.to_string());
            }
        };

        let snapshot = Arc::new(HolidaySnapshot {
            years: Some(years),
            holidays,
            fetched_at: Some(self.clock.now()),
        });
        self.snapshot.send_replace(Arc::clone(&snapshot));

        self.set_state(SchedulerState::Evaluating);
        let classification = classify_within(today, &snapshot.holidays, self.window_days);
        self.emit(SchedulerEvent::HolidaysUpdated(classification.clone()));

        self.set_state(SchedulerState::NotifyingAndPersisting);
        let notified = self.notify_and_persist(&classification, today).await;

        RefreshOutcome::Completed {
            classification,
            notified,
        }
    }

    async fn fetch_years(&self, (current, next): (i32, i32)) -> HolidayResult<Vec<HolidayRecord>> {
        let mut holidays = fetch_with_timeout(&self.source, current, self.fetch_timeout).await?;
        holidays.extend(fetch_with_timeout(&self.source, next, self.fetch_timeout).await?);

        if holidays.is_empty() {
            tracing::warn!(current, next, "no holidays found for either year");
        } else {
            tracing::info!(count = holidays.len(), current, next, "holidays loaded");
        }

        Ok(holidays)
    }

    async fn notify_and_persist(
        &self,
        classification: &Classification,
        today: NaiveDate,
    ) -> Vec<Notification> {
        let now = self.clock.now();
        let mut ledger = self.ledger.lock().await;
        let mut notified = Vec::new();

        for record in classification.notification_candidates() {
            if !ledger.should_notify(record) {
                continue;
            }
            let Some(notification) = Notification::for_record(record, today) else {
                continue;
            };

            tracing::info!(holiday = %record, title = %notification.title(), "notifying");
            self.emit(SchedulerEvent::Notification(notification.clone()));
            ledger.record_notified(record, now);
            notified.push(notification);
        }

        ledger.prune_expired(now);

        // In-memory state stays authoritative if the write fails
        if let Err(e) = ledger.save() {
            tracing::warn!(error = %e, "failed to persist notification ledger");
        }

        notified
    }

    fn set_state(&self, state: SchedulerState) {
        tracing::debug!(?state, "scheduler state");
        self.state.send_replace(state);
    }

    fn emit(&self, event: SchedulerEvent) {
        // Nobody listening is fine
        let _ = self.events.send(event);
    }
}

impl<S: HolidaySource + 'static> NotificationScheduler<S> {
    /// Drive the scheduler: refresh immediately, then every `period`, and
    /// whenever a manual trigger arrives. Returns once `shutdown` resolves.
    pub async fn run(
        self: Arc<Self>,
        period: Duration,
        mut triggers: mpsc::Receiver<()>,
        shutdown: impl Future<Output = ()>,
    ) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("scheduler shutting down");
                    break;
                }
                _ = ticker.tick() => self.spawn_refresh("periodic"),
                Some(()) = triggers.recv() => self.spawn_refresh("manual"),
            }
        }
    }

    fn spawn_refresh(self: &Arc<Self>, reason: &'static str) {
        if self.is_fetching() {
            tracing::info!(reason, "refresh already in progress, ignoring trigger");
            return;
        }

        tracing::debug!(reason, "starting refresh");
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            scheduler.try_refresh().await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HolidayError;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use std::sync::Mutex as StdMutex;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Clock that tests can move forward.
    #[derive(Clone)]
    struct TestClock(Arc<StdMutex<NaiveDate>>);

    impl TestClock {
        fn at(day: NaiveDate) -> Self {
            TestClock(Arc::new(StdMutex::new(day)))
        }

        fn set(&self, day: NaiveDate) {
            *self.0.lock().unwrap() = day;
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> DateTime<Utc> {
            self.today().and_hms_opt(9, 0, 0).unwrap().and_utc()
        }

        fn today(&self) -> NaiveDate {
            *self.0.lock().unwrap()
        }
    }

    /// In-memory source that records every requested year.
    #[derive(Clone, Default)]
    struct TestSource {
        holidays: Arc<Vec<HolidayRecord>>,
        requested: Arc<StdMutex<Vec<i32>>>,
        failing: Arc<AtomicBool>,
        delay: Option<std::time::Duration>,
    }

    impl TestSource {
        fn with(holidays: Vec<HolidayRecord>) -> Self {
            TestSource {
                holidays: Arc::new(holidays),
                ..Default::default()
            }
        }

        fn requested(&self) -> Vec<i32> {
            self.requested.lock().unwrap().clone()
        }
    }

    impl HolidaySource for TestSource {
        async fn fetch(&self, year: i32) -> HolidayResult<Vec<HolidayRecord>> {
            self.requested.lock().unwrap().push(year);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(HolidayError::Network("connection refused".into()));
            }
            Ok(self
                .holidays
                .iter()
                .filter(|r| r.date.year() == year)
                .cloned()
                .collect())
        }
    }

    fn scenario_holidays() -> Vec<HolidayRecord> {
        vec![
            HolidayRecord::new(date(2025, 1, 1), "New Year"),
            HolidayRecord::new(date(2025, 1, 2), "Holiday B"),
            HolidayRecord::new(date(2025, 1, 10), "Holiday C"),
        ]
    }

    fn build(
        source: TestSource,
        clock: TestClock,
        ledger: NotificationLedger,
    ) -> (
        NotificationScheduler<TestSource>,
        mpsc::UnboundedReceiver<SchedulerEvent>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = NotificationScheduler::new(source, ledger, tx).with_clock(clock);
        (scheduler, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<SchedulerEvent>) -> Vec<SchedulerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_end_to_end_cycle() {
        let source = TestSource::with(scenario_holidays());
        let clock = TestClock::at(date(2025, 1, 1));
        let (scheduler, mut rx) = build(source, clock, NotificationLedger::in_memory());

        let outcome = scheduler.try_refresh().await;

        let RefreshOutcome::Completed { classification, notified } = outcome else {
            panic!("expected a completed cycle, got {outcome:?}");
        };
        assert_eq!(classification.today.len(), 1);
        assert_eq!(
            classification.next_upcoming.map(|r| r.name),
            Some("New Year".to_string())
        );
        assert_eq!(notified.len(), 2);

        let ledger = scheduler.ledger().await;
        let keys: Vec<&str> = ledger.keys().collect();
        assert_eq!(keys, vec!["2025-01-01|New Year", "2025-01-02|Holiday B"]);
        assert!(ledger.get("2025-01-10|Holiday C").is_none());

        let events = drain(&mut rx);
        assert!(matches!(events[0], SchedulerEvent::HolidaysUpdated(_)));
        let titles: Vec<String> = events
            .iter()
            .filter_map(|e| match e {
                SchedulerEvent::Notification(n) => Some(n.title()),
                _ => None,
            })
            .collect();
        assert_eq!(titles, vec!["Holiday Today!", "Holiday Tomorrow!"]);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[tokio::test]
    async fn test_second_cycle_does_not_renotify() {
        let source = TestSource::with(scenario_holidays());
        let clock = TestClock::at(date(2025, 1, 1));
        let (scheduler, mut rx) = build(source, clock, NotificationLedger::in_memory());

        scheduler.try_refresh().await;
        drain(&mut rx);

        let outcome = scheduler.try_refresh().await;
        assert!(matches!(
            outcome,
            RefreshOutcome::Completed { ref notified, .. } if notified.is_empty()
        ));
        assert!(
            drain(&mut rx)
                .iter()
                .all(|e| !matches!(e, SchedulerEvent::Notification(_)))
        );
        assert_eq!(scheduler.ledger().await.len(), 2);
    }

    #[tokio::test]
    async fn test_holiday_entering_window_is_notified_later() {
        let source = TestSource::with(scenario_holidays());
        let clock = TestClock::at(date(2025, 1, 1));
        let (scheduler, _rx) = build(source, clock.clone(), NotificationLedger::in_memory());

        scheduler.try_refresh().await;
        clock.set(date(2025, 1, 3));

        let outcome = scheduler.try_refresh().await;
        let RefreshOutcome::Completed { notified, .. } = outcome else {
            panic!("expected a completed cycle");
        };
        assert_eq!(notified.len(), 1);
        assert_eq!(notified[0].title(), "Upcoming Holiday in 7 days");
    }

    #[tokio::test]
    async fn test_fetch_failure_returns_to_idle_and_recovers() {
        let source = TestSource::with(scenario_holidays());
        source.failing.store(true, Ordering::SeqCst);
        let clock = TestClock::at(date(2025, 1, 1));
        let (scheduler, mut rx) = build(source.clone(), clock, NotificationLedger::in_memory());

        let outcome = scheduler.try_refresh().await;
        assert!(matches!(outcome, RefreshOutcome::Failed(_)));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(!scheduler.is_fetching());
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [SchedulerEvent::FetchError(reason)] if reason.contains("connection refused")
        ));
        assert!(scheduler.ledger().await.is_empty());

        source.failing.store(false, Ordering::SeqCst);
        let outcome = scheduler.try_refresh().await;
        assert!(matches!(outcome, RefreshOutcome::Completed { .. }));
        assert_eq!(scheduler.ledger().await.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_years_are_a_valid_fetch() {
        let source = TestSource::with(vec![]);
        let clock = TestClock::at(date(2025, 1, 1));
        let (scheduler, _rx) = build(source, clock, NotificationLedger::in_memory());

        let outcome = scheduler.try_refresh().await;
        assert!(matches!(outcome, RefreshOutcome::Completed { .. }));
        assert_eq!(scheduler.snapshot().years, Some((2025, 2026)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_triggers_collapse_into_one_fetch() {
        let mut source = TestSource::with(scenario_holidays());
        source.delay = Some(std::time::Duration::from_secs(1));
        let clock = TestClock::at(date(2025, 1, 1));
        let (scheduler, _rx) = build(source.clone(), clock, NotificationLedger::in_memory());

        let (a, b) = tokio::join!(scheduler.try_refresh(), scheduler.try_refresh());

        let skipped = [&a, &b]
            .iter()
            .filter(|o| matches!(o, RefreshOutcome::Skipped))
            .count();
        assert_eq!(skipped, 1);
        // One cycle fetches the current and the next year
        assert_eq!(source.requested(), vec![2025, 2026]);
    }

    #[tokio::test]
    async fn test_year_rollover_refetches_new_pair() {
        let mut holidays = scenario_holidays();
        holidays.push(HolidayRecord::new(date(2026, 1, 1), "New Year"));
        let source = TestSource::with(holidays);
        let clock = TestClock::at(date(2025, 12, 31));
        let (scheduler, _rx) = build(source.clone(), clock.clone(), NotificationLedger::in_memory());

        scheduler.try_refresh().await;
        assert_eq!(scheduler.snapshot().years, Some((2025, 2026)));

        clock.set(date(2026, 1, 1));
        scheduler.try_refresh().await;

        assert_eq!(source.requested(), vec![2025, 2026, 2026, 2027]);
        let snapshot = scheduler.snapshot();
        assert_eq!(snapshot.years, Some((2026, 2027)));
        assert!(snapshot.holidays.iter().all(|r| r.date.year() >= 2026));
    }

    #[tokio::test]
    async fn test_year_rollover_discards_stale_data_even_if_fetch_fails() {
        let source = TestSource::with(scenario_holidays());
        let clock = TestClock::at(date(2025, 1, 1));
        let (scheduler, _rx) = build(source.clone(), clock.clone(), NotificationLedger::in_memory());

        scheduler.try_refresh().await;
        assert!(!scheduler.snapshot().holidays.is_empty());

        clock.set(date(2026, 1, 1));
        source.failing.store(true, Ordering::SeqCst);
        scheduler.try_refresh().await;

        assert_eq!(*scheduler.snapshot(), HolidaySnapshot::default());
    }

    #[tokio::test]
    async fn test_cycle_prunes_and_persists_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notified_holidays.json");

        let clock = TestClock::at(date(2025, 1, 1));
        let mut ledger = NotificationLedger::load(&path);
        let stale = HolidayRecord::new(date(2024, 10, 1), "Stale");
        ledger.record_notified(&stale, clock.now() - ChronoDuration::days(61));
        ledger.save().unwrap();

        let (scheduler, _rx) = build(TestSource::with(scenario_holidays()), clock, ledger);
        scheduler.try_refresh().await;

        let reloaded = NotificationLedger::load(&path);
        let keys: Vec<&str> = reloaded.keys().collect();
        assert_eq!(keys, vec!["2025-01-01|New Year", "2025-01-02|Holiday B"]);
        assert_eq!(
            reloaded.get("2025-01-01|New Year").map(|e| e.notified_at),
            Some(Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_corrupt_ledger_bytes_survive_a_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notified_holidays.json");
        std::fs::write(&path, "{not json").unwrap();

        let ledger = NotificationLedger::load(&path);
        let clock = TestClock::at(date(2025, 1, 1));
        let (scheduler, _rx) = build(TestSource::with(scenario_holidays()), clock, ledger);
        scheduler.try_refresh().await;

        let copies = crate::paths::tests::corrupt_copies(dir.path(), "notified_holidays.json");
        assert_eq!(copies, vec!["{not json"]);
        assert_eq!(NotificationLedger::load(&path).len(), 2);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_memory_authoritative() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let ledger = NotificationLedger::load(blocker.join("notified_holidays.json"));

        let clock = TestClock::at(date(2025, 1, 1));
        let (scheduler, _rx) = build(TestSource::with(scenario_holidays()), clock, ledger);

        let first = scheduler.try_refresh().await;
        let RefreshOutcome::Completed { notified, .. } = first else {
            panic!("expected a completed cycle, got {first:?}");
        };
        assert_eq!(notified.len(), 2);

        let second = scheduler.try_refresh().await;
        let RefreshOutcome::Completed { notified, .. } = second else {
            panic!("expected a completed cycle, got {second:?}");
        };
        assert!(notified.is_empty());
        assert_eq!(scheduler.ledger().await.len(), 2);
    }

    #[tokio::test]
    async fn test_state_subscribers_see_cycle_end_idle() {
        let source = TestSource::with(scenario_holidays());
        let clock = TestClock::at(date(2025, 1, 1));
        let (scheduler, _rx) = build(source, clock, NotificationLedger::in_memory());
        let mut state = scheduler.subscribe_state();
        assert!(!state.has_changed().unwrap());

        scheduler.try_refresh().await;

        assert!(state.has_changed().unwrap());
        assert_eq!(*state.borrow_and_update(), SchedulerState::Idle);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[tokio::test]
    async fn test_classify_now_reads_snapshot_without_fetching() {
        let source = TestSource::with(scenario_holidays());
        let clock = TestClock::at(date(2025, 1, 1));
        let (scheduler, _rx) = build(source.clone(), clock.clone(), NotificationLedger::in_memory());

        assert!(scheduler.classify_now().next_upcoming.is_none());

        scheduler.try_refresh().await;
        clock.set(date(2025, 1, 5));

        let classification = scheduler.classify_now();
        assert_eq!(
            classification.next_upcoming.map(|r| r.name),
            Some("Holiday C".to_string())
        );
        assert_eq!(source.requested().len(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_subscribers_see_whole_swaps() {
        let source = TestSource::with(scenario_holidays());
        let clock = TestClock::at(date(2025, 1, 1));
        let (scheduler, _rx) = build(source, clock, NotificationLedger::in_memory());
        let mut snapshots = scheduler.subscribe_snapshot();

        scheduler.try_refresh().await;

        assert!(snapshots.has_changed().unwrap());
        let snapshot = snapshots.borrow_and_update().clone();
        assert_eq!(snapshot.holidays.len(), 3);
        assert!(snapshot.fetched_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_refreshes_at_start_and_on_manual_trigger() {
        let source = TestSource::with(scenario_holidays());
        let clock = TestClock::at(date(2025, 1, 1));
        let (scheduler, _rx) = build(source.clone(), clock, NotificationLedger::in_memory());
        let scheduler = Arc::new(scheduler);

        let (trigger_tx, trigger_rx) = mpsc::channel(4);
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(Arc::clone(&scheduler).run(
            std::time::Duration::from_secs(24 * 3600),
            trigger_rx,
            async move {
                let _ = stop_rx.await;
            },
        ));

        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        assert_eq!(source.requested().len(), 2);

        trigger_tx.send(()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        assert_eq!(source.requested().len(), 4);

        tokio::time::sleep(std::time::Duration::from_secs(24 * 3600)).await;
        assert_eq!(source.requested().len(), 6);

        stop_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[test]
    fn test_in_flight_guard_releases_on_drop() {
        let flag = AtomicBool::new(false);
        {
            let guard = InFlightGuard::acquire(&flag);
            assert!(guard.is_some());
            assert!(InFlightGuard::acquire(&flag).is_none());
        }
        assert!(InFlightGuard::acquire(&flag).is_some());
    }
}
