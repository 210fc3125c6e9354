//! The polling loop that ties config, stats, classification, throttling, and
//! the status sink together.
//!
//! Each tick reloads [`Config`](crate::config::Config) from the store, so the
//! store is the single source of truth and no snapshot is ever threaded in.
//! Errors and panics inside a tick are logged and the loop keeps its schedule.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::config::DEFAULT_CHECK_INTERVAL_SECS;
use crate::core::link_state::{classify, Classification, LinkState, LinkStateMachine};
use crate::core::throttle::NotificationThrottle;
use crate::error::AppError;
use crate::notify::{Alert, Notifier};
use crate::stats::InterfaceStatsProvider;
use crate::status::StatusSink;
use crate::store::ConfigStore;

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The configured interface was missing or unreadable; nothing changed.
    InterfaceAbsent,
    /// The interface is down; nothing changed.
    LinkDown,
    Evaluated {
        state: LinkState,
        /// The throttle let an alert through (delivery may still have failed).
        alerted: bool,
        transition: Option<LinkState>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub check_interval: Duration,
    pub outcome: TickOutcome,
}

pub struct MonitorLoop {
    store: Arc<dyn ConfigStore>,
    provider: Arc<dyn InterfaceStatsProvider>,
    notifier: Arc<dyn Notifier>,
    sink: Arc<dyn StatusSink>,
    machine: LinkStateMachine,
    throttle: NotificationThrottle,
    /// Last interval read from a good config; used after a failed tick.
    interval: Duration,
}

impl MonitorLoop {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        provider: Arc<dyn InterfaceStatsProvider>,
        notifier: Arc<dyn Notifier>,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            store,
            provider,
            notifier,
            sink,
            machine: LinkStateMachine::new(),
            throttle: NotificationThrottle::new(),
            interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
        }
    }

    pub fn state(&self) -> LinkState {
        self.machine.state()
    }

    /// Run one poll tick at `now`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<TickReport, AppError> {
        let config = self.store.load()?;
        let check_interval = config.check_interval();
        let report = |outcome| TickReport {
            check_interval,
            outcome,
        };

        let sample = match self.provider.sample(&config.interface_name) {
            Ok(Some(sample)) => sample,
            Ok(None) => {
                tracing::debug!(interface = %config.interface_name, "Interface not present; skipping tick");
                return Ok(report(TickOutcome::InterfaceAbsent));
            }
            Err(e) => {
                tracing::debug!(interface = %config.interface_name, "Interface unreadable, treating as absent: {e:#}");
                return Ok(report(TickOutcome::InterfaceAbsent));
            }
        };

        let classification = classify(sample.is_up, sample.speed_mbps, config.expected_speed_mbps);
        tracing::debug!(
            interface = %sample.name,
            is_up = sample.is_up,
            speed_mbps = sample.speed_mbps,
            expected_mbps = config.expected_speed_mbps,
            ?classification,
            "Link sampled"
        );
        if classification == Classification::Unchanged {
            return Ok(report(TickOutcome::LinkDown));
        }

        let mut alerted = false;
        if classification == Classification::Degraded
            && self.throttle.should_notify(
                sample.speed_mbps,
                now,
                config.notification_interval_seconds,
            )
        {
            alerted = true;
            let alert = Alert::degraded(
                &config.interface_name,
                sample.speed_mbps,
                config.expected_speed_mbps,
            );
            if let Err(err) = self.deliver(&alert) {
                tracing::warn!(kind = err.kind(), "Failed to show notification ({}): {err}", alert.message);
            }
        }

        let transition = self.machine.apply(classification);
        if let Some(state) = transition {
            tracing::info!(interface = %config.interface_name, ?state, "Link state changed");
            self.sink.set_status(state);
        }

        Ok(report(TickOutcome::Evaluated {
            state: self.machine.state(),
            alerted,
            transition,
        }))
    }

    fn deliver(&self, alert: &Alert) -> Result<(), AppError> {
        self.notifier
            .show(alert)
            .map_err(|e| AppError::Notify(format!("{e:#}")))
    }

    /// Run a tick, absorbing errors and panics so the loop survives them.
    fn run_tick(&mut self, now: DateTime<Utc>) {
        match panic::catch_unwind(AssertUnwindSafe(|| self.tick(now))) {
            Ok(Ok(report)) => self.interval = report.check_interval,
            Ok(Err(err)) => {
                if let AppError::Config(config_err) = &err {
                    self.sink.report_config_error(config_err);
                }
                tracing::error!(kind = err.kind(), "Monitor tick failed: {err}");
            }
            Err(_) => {
                tracing::error!("Monitor tick panicked; continuing on the next interval");
            }
        }
    }

    /// Poll until `cancel` fires. `wake` cuts the current wait short so a
    /// config change takes effect immediately instead of after a stale interval.
    ///
    /// Ticks run on the blocking pool since they read files and may spawn
    /// processes. Cancellation does not wait for an in-flight tick.
    pub async fn run(self, cancel: CancellationToken, wake: Arc<Notify>) {
        tracing::info!("Link monitor started");
        let mut monitor = self;
        loop {
            let tick = tokio::task::spawn_blocking(move || {
                monitor.run_tick(Utc::now());
                monitor
            });
            monitor = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Link monitor stopping with a tick in flight");
                    break;
                }
                joined = tick => match joined {
                    Ok(monitor) => monitor,
                    Err(e) => {
                        tracing::error!("Monitor tick task failed: {e}");
                        break;
                    }
                },
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Link monitor stopping");
                    break;
                }
                _ = wake.notified() => {
                    tracing::debug!("Config changed; re-evaluating now");
                }
                _ = tokio::time::sleep(monitor.interval) => {}
            }
        }
    }
}
