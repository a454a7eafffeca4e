use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fleetwatch_notify::Notifier;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::metrics::{MetricsReporter, STATUS_OK};
use crate::reconciler::{AlertReconciler, PassReport};

/// Whether this instance should do any work on a tick.
pub trait InstanceRole: Send + Sync {
    fn is_active(&self) -> bool;
}

/// Single-instance deployments.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysActive;

impl InstanceRole for AlwaysActive {
    fn is_active(&self) -> bool {
        true
    }
}

/// At most one holder at a time. The holder's [`RunPermit`] releases the
/// guard when dropped, including during a panic unwind.
#[derive(Debug, Default)]
pub struct RunGuard {
    running: AtomicBool,
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(self: &Arc<Self>) -> Option<RunPermit> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunPermit {
                guard: Arc::clone(self),
            })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct RunPermit {
    guard: Arc<RunGuard>,
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.guard.running.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A previous pass still held the guard.
    Skipped,
    /// This instance is not the active one; nothing was pulled.
    Follower,
    Completed(PassReport),
    Failed(String),
}

/// Drives [`AlertReconciler`] on a fixed interval with single-flight passes.
#[derive(Clone)]
pub struct AlertQueryScheduler {
    reconciler: Arc<AlertReconciler>,
    role: Arc<dyn InstanceRole>,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<dyn MetricsReporter>,
    guard: Arc<RunGuard>,
    interval: Duration,
    initial_delay: Duration,
}

impl AlertQueryScheduler {
    pub fn new(
        reconciler: Arc<AlertReconciler>,
        role: Arc<dyn InstanceRole>,
        notifier: Arc<dyn Notifier>,
        metrics: Arc<dyn MetricsReporter>,
        interval: Duration,
        initial_delay: Duration,
    ) -> Self {
        Self {
            reconciler,
            role,
            notifier,
            metrics,
            guard: Arc::new(RunGuard::new()),
            interval,
            initial_delay,
        }
    }

    pub fn guard(&self) -> &Arc<RunGuard> {
        &self.guard
    }

    pub async fn run(&self) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            initial_delay_secs = self.initial_delay.as_secs(),
            batch_size = self.reconciler.batch_size(),
            "Alert query scheduler started"
        );

        let mut tick = interval_at(Instant::now() + self.initial_delay, self.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tick.tick().await;
            // Not awaited: a slow pass makes later ticks skip instead of queueing
            self.spawn_tick();
        }
    }

    /// Run one pass now and wait for it.
    pub async fn run_once(&self) -> TickOutcome {
        match self.spawn_tick() {
            Some(handle) => handle
                .await
                .unwrap_or_else(|e| TickOutcome::Failed(e.to_string())),
            None => TickOutcome::Skipped,
        }
    }

    /// Start a pass on its own task if none is running. The returned handle
    /// resolves once the pass is over, even if it panicked.
    pub fn spawn_tick(&self) -> Option<JoinHandle<TickOutcome>> {
        let Some(permit) = self.guard.try_acquire() else {
            tracing::info!("Previous alert query pass still running, skipping tick");
            return None;
        };

        let this = self.clone();
        let pass = tokio::spawn(async move {
            let _permit = permit;
            this.execute().await
        });

        let metrics = Arc::clone(&self.metrics);
        Some(tokio::spawn(async move {
            match pass.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(error = %e, "Alert query pass task failed");
                    let message = format!("pass aborted: {e}");
                    metrics.set_status(&message);
                    TickOutcome::Failed(message)
                }
            }
        }))
    }

    async fn execute(&self) -> TickOutcome {
        if !self.role.is_active() {
            tracing::debug!("Not the active instance, skipping alert query pass");
            return TickOutcome::Follower;
        }

        // Own task so a panic in the pipeline still reaches the notifier
        let reconciler = Arc::clone(&self.reconciler);
        let pipeline = tokio::spawn(async move { reconciler.run_pass().await });
        let outcome = match pipeline.await {
            Ok(Ok(report)) => {
                self.metrics.set_status(STATUS_OK);
                TickOutcome::Completed(report)
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Alert query pass failed");
                let message = e.to_string();
                self.metrics.set_status(&message);
                TickOutcome::Failed(message)
            }
            Err(e) => {
                tracing::error!(error = %e, "Alert query pipeline aborted");
                let message = format!("pass aborted: {e}");
                self.metrics.set_status(&message);
                TickOutcome::Failed(message)
            }
        };

        if let Err(e) = self.notifier.send_notifications().await {
            tracing::error!(
                notifier = self.notifier.notifier_name(),
                error = %e,
                "Failed to send notifications"
            );
        }
        outcome
    }
}
