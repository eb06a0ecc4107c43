//! Background collector with three independent timers.
//!
//! Owns the sensor roster and drives polling, rediscovery, and retention
//! eviction. Started explicitly by the process entry point and stopped
//! cooperatively: cancellation stops arming new ticks, in-flight work
//! finishes before `stop` returns.

use crate::config::ScheduleConfig;
use crate::discovery::DiscoveryService;
use crate::error::{HubError, Result};
use crate::fetcher::fetch_reading;
use crate::model::Sensor;
use crate::source::TelemetrySource;
use crate::storage::ReadingStore;
use chrono::Utc;
use futures_util::future::join_all;
use log::{error, info, warn};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

struct Inner {
    source: Arc<dyn TelemetrySource>,
    store: Arc<dyn ReadingStore>,
    schedule: ScheduleConfig,
    /// The roster the collection timer reads and the discovery timer
    /// replaces. Replacement swaps the Arc; an in-flight pass keeps the
    /// snapshot it started with.
    roster: RwLock<Arc<Vec<Sensor>>>,
    running: AtomicBool,
    shutdown: CancellationToken,
}

impl Inner {
    fn roster_snapshot(&self) -> Arc<Vec<Sensor>> {
        self.roster.read().clone()
    }

    fn swap_roster(&self, sensors: Vec<Sensor>) {
        *self.roster.write() = Arc::new(sensors);
    }

    /// Persist sensor metadata for a fresh roster, then swap it in.
    /// Upsert failures are logged per sensor; the swap still happens so
    /// polling follows the latest snapshot.
    async fn install_roster(&self, sensors: Vec<Sensor>) {
        for sensor in &sensors {
            if let Err(e) = self.store.upsert_sensor(sensor).await {
                warn!("[Discovery] {}: sensor upsert failed: {}", sensor.id, e);
            }
        }
        info!("[Discovery] roster replaced: {} sensors", sensors.len());
        self.swap_roster(sensors);
    }

    /// One fan-out over the current roster. Fetches run in parallel and
    /// are individually isolated; every successful reading is persisted
    /// regardless of sibling failures.
    async fn collection_pass(&self) {
        let roster = self.roster_snapshot();
        if roster.is_empty() {
            info!("[Collect] roster empty, nothing to poll");
            return;
        }

        let fetches = roster
            .iter()
            .map(|sensor| fetch_reading(self.source.as_ref(), sensor));
        let results = join_all(fetches).await;

        let mut ok = 0usize;
        let mut failed = 0usize;
        for (sensor, reading) in roster.iter().zip(results) {
            match reading {
                Some(reading) => match self.store.insert_reading(&reading).await {
                    Ok(()) => ok += 1,
                    Err(e) => {
                        warn!("[Collect] {}: persist failed: {}", sensor.id, e);
                        failed += 1;
                    }
                },
                None => failed += 1,
            }
        }

        info!(
            "[Collect] pass complete: {} ok, {} failed, {} polled",
            ok,
            failed,
            roster.len()
        );
    }

    /// Re-discover and replace the roster. A failed snapshot keeps the
    /// old roster; the next tick retries.
    async fn discovery_tick(&self) {
        let discovery = DiscoveryService::new(self.source.clone());
        match discovery.discover().await {
            Ok(sensors) => self.install_roster(sensors).await,
            Err(e) => error!("[Discovery] refresh failed, keeping roster: {}", e),
        }
    }

    /// Evict readings older than the retention window. A failed delete is
    /// only logged; the next tick retries with a fresh cutoff.
    async fn retention_tick(&self) {
        let cutoff = Utc::now() - self.schedule.retention_window();
        match self.store.delete_readings_older_than(cutoff).await {
            Ok(count) => info!("[Retention] evicted {} readings older than {}", count, cutoff),
            Err(e) => warn!("[Retention] eviction failed, retrying next tick: {}", e),
        }
    }
}

/// Collection scheduler.
///
/// Lifecycle is `start` → running → `stop` (terminal); restarting requires
/// a new collector. `start` seeds the roster with one discovery and runs
/// one collection pass before arming the timers, so first data is
/// available immediately.
pub struct Collector {
    inner: Arc<Inner>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Collector {
    pub fn new(
        source: Arc<dyn TelemetrySource>,
        store: Arc<dyn ReadingStore>,
        schedule: ScheduleConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                store,
                schedule,
                roster: RwLock::new(Arc::new(Vec::new())),
                running: AtomicBool::new(false),
                shutdown: CancellationToken::new(),
            }),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Seed the roster, run the first collection pass, and arm the three
    /// timers. Fails when the seeding discovery fails, when already
    /// running, or after `stop` (the lifecycle is terminal).
    pub async fn start(&self) -> Result<()> {
        // The cancellation token cannot be re-armed; a stopped collector
        // must not come back as a zombie with dead timers
        if self.inner.shutdown.is_cancelled() {
            return Err(HubError::Terminated);
        }
        if self.inner.running.swap(true, Ordering::SeqCst) {
            return Err(HubError::AlreadyRunning);
        }

        let discovery = DiscoveryService::new(self.inner.source.clone());
        let sensors = match discovery.discover().await {
            Ok(sensors) => sensors,
            Err(e) => {
                self.inner.running.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };
        self.inner.install_roster(sensors).await;
        self.inner.collection_pass().await;

        let mut tasks = self.tasks.lock();

        let inner = self.inner.clone();
        tasks.push(tokio::spawn(async move {
            let mut ticker = interval(inner.schedule.collection_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The initial pass already ran; consume the immediate tick
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = inner.shutdown.cancelled() => break,
                    _ = ticker.tick() => inner.collection_pass().await,
                }
            }
        }));

        let inner = self.inner.clone();
        tasks.push(tokio::spawn(async move {
            let mut ticker = interval(inner.schedule.rediscovery_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = inner.shutdown.cancelled() => break,
                    _ = ticker.tick() => inner.discovery_tick().await,
                }
            }
        }));

        let inner = self.inner.clone();
        tasks.push(tokio::spawn(async move {
            let mut ticker = interval(inner.schedule.cleanup_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = inner.shutdown.cancelled() => break,
                    _ = ticker.tick() => inner.retention_tick().await,
                }
            }
        }));

        info!(
            "[Collector] started: collect every {:?}, rediscover every {:?}, clean up every {:?}",
            self.inner.schedule.collection_interval(),
            self.inner.schedule.rediscovery_interval(),
            self.inner.schedule.cleanup_interval()
        );
        Ok(())
    }

    /// Stop arming new ticks and wait for in-flight work to finish.
    pub async fn stop(&self) {
        if !self.inner.running.load(Ordering::SeqCst) {
            return;
        }

        self.inner.shutdown.cancel();
        let handles: Vec<JoinHandle<()>> = self.tasks.lock().drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }

        self.inner.running.store(false, Ordering::SeqCst);
        info!("[Collector] stopped");
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Current roster snapshot. Collection passes in flight keep the
    /// snapshot they started from.
    pub fn roster(&self) -> Arc<Vec<Sensor>> {
        self.inner.roster_snapshot()
    }

    /// Replace the roster, e.g. after an externally-triggered rediscovery.
    pub fn update_roster(&self, sensors: Vec<Sensor>) {
        info!("[Collector] roster updated externally: {} sensors", sensors.len());
        self.inner.swap_roster(sensors);
    }
}
