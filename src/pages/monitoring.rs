// src/pages/monitoring.rs

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::api::{as_json, get_as};
use crate::models::monitoring::MonitoringSnapshot;
use crate::routes;
use crate::state::AppState;

/// Live view of students currently taking exams.
///
/// Two background tasks: a poll of the monitoring endpoint every
/// `poll_interval` (first poll immediately) and a one-second tick that only
/// advances the on-screen clock. Both stop on `pause()` and on drop.
pub struct Monitor {
    state: AppState,
    snapshot: Arc<RwLock<MonitoringSnapshot>>,
    elapsed: Arc<AtomicU64>,
    polls: Arc<AtomicU64>,
    paused: AtomicBool,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Monitor {
    pub fn start(state: AppState) -> Self {
        let monitor = Self {
            state,
            snapshot: Arc::new(RwLock::new(MonitoringSnapshot::default())),
            elapsed: Arc::new(AtomicU64::new(0)),
            polls: Arc::new(AtomicU64::new(0)),
            paused: AtomicBool::new(false),
            tasks: Mutex::new(Vec::new()),
        };
        monitor.spawn_tasks();
        monitor
    }

    fn spawn_tasks(&self) {
        let backend = self.state.backend.clone();
        let snapshot = self.snapshot.clone();
        let polls = self.polls.clone();
        let every = self.state.config.poll_interval;

        let poll = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                match get_as::<MonitoringSnapshot>(
                    backend.as_ref(),
                    routes::EXAM_MONITORING,
                    &as_json(),
                )
                .await
                {
                    Ok(fresh) => {
                        tracing::debug!("{} active taker(s)", fresh.active.len());
                        *snapshot.write().await = fresh;
                    }
                    // Retried on the next tick.
                    Err(e) => tracing::warn!("Monitoring poll failed: {}", e),
                }
                polls.fetch_add(1, Ordering::SeqCst);
            }
        });

        let elapsed = self.elapsed.clone();
        let tick = tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                elapsed.fetch_add(1, Ordering::SeqCst);
            }
        });

        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.push(poll);
        tasks.push(tick);
    }

    fn abort_tasks(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        for task in tasks.drain(..) {
            task.abort();
        }
    }

    pub fn pause(&self) {
        if !self.paused.swap(true, Ordering::SeqCst) {
            self.abort_tasks();
            tracing::info!("Monitoring paused");
        }
    }

    pub fn resume(&self) {
        if self.paused.swap(false, Ordering::SeqCst) {
            self.spawn_tasks();
            tracing::info!("Monitoring resumed");
        }
    }

    /// Pause/resume toggle. Returns `true` when now paused.
    pub fn toggle_pause(&self) -> bool {
        if self.is_paused() {
            self.resume();
            false
        } else {
            self.pause();
            true
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> MonitoringSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Seconds counted by the cosmetic tick since start.
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed.load(Ordering::SeqCst)
    }

    /// Completed poll attempts, successful or not.
    pub fn poll_count(&self) -> u64 {
        self.polls.load(Ordering::SeqCst)
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}
