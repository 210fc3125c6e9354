//! Background service lifecycle management.
//!
//! `BackgroundServices` owns the monitor task spawned at startup, the token
//! that stops it, and the wake handle the foreground uses after changing config.

use std::sync::Arc;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::MonitorLoop;
use crate::notify::Notifier;
use crate::stats::InterfaceStatsProvider;
use crate::status::StatusSink;
use crate::store::ConfigStore;

pub struct BackgroundServices {
    cancel: CancellationToken,
    wake: Arc<Notify>,
    monitor: JoinHandle<()>,
}

impl BackgroundServices {
    /// Spawn the monitor loop on the current tokio runtime.
    pub fn start(
        store: Arc<dyn ConfigStore>,
        provider: Arc<dyn InterfaceStatsProvider>,
        notifier: Arc<dyn Notifier>,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let wake = Arc::new(Notify::new());
        let monitor = MonitorLoop::new(store, provider, notifier, sink);
        let monitor = tokio::spawn(monitor.run(cancel.clone(), Arc::clone(&wake)));

        Self {
            cancel,
            wake,
            monitor,
        }
    }

    /// Re-run the monitor now instead of at the end of the current interval.
    pub fn config_changed(&self) {
        self.wake.notify_one();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop the monitor and wait for its current tick to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.monitor.await {
            tracing::error!("Monitor task ended abnormally: {e}");
        }
    }
}
