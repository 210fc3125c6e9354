//! UI-status sink: how the background monitor tells the foreground about
//! link-state transitions and config problems.
//!
//! The monitor never touches UI state directly. [`ChannelStatusSink`] turns each
//! call into a [`UiEvent`] on an unbounded channel that the foreground drains.

use tokio::sync::mpsc;

use crate::core::LinkState;
use crate::error::ConfigError;

/// Message from the monitor task to the foreground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    StatusChanged(LinkState),
    ConfigError(String),
}

pub trait StatusSink: Send + Sync {
    /// Called once per genuine transition. Must be cheap and idempotent.
    fn set_status(&self, state: LinkState);

    /// Surface a config load failure to the operator.
    fn report_config_error(&self, _err: &ConfigError) {}
}

pub struct ChannelStatusSink {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl ChannelStatusSink {
    pub fn new(tx: mpsc::UnboundedSender<UiEvent>) -> Self {
        Self { tx }
    }

    /// Create a sink together with the receiver the foreground should drain.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn send(&self, event: UiEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("UI receiver dropped; status update discarded");
        }
    }
}

impl StatusSink for ChannelStatusSink {
    fn set_status(&self, state: LinkState) {
        self.send(UiEvent::StatusChanged(state));
    }

    fn report_config_error(&self, err: &ConfigError) {
        self.send(UiEvent::ConfigError(err.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_forwards_events_in_order() {
        let (sink, mut rx) = ChannelStatusSink::channel();
        sink.set_status(LinkState::Degraded);
        sink.report_config_error(&ConfigError::Invalid("bad".into()));
        sink.set_status(LinkState::Normal);

        assert_eq!(rx.try_recv().unwrap(), UiEvent::StatusChanged(LinkState::Degraded));
        assert_eq!(
            rx.try_recv().unwrap(),
            UiEvent::ConfigError("invalid config: bad".into())
        );
        assert_eq!(rx.try_recv().unwrap(), UiEvent::StatusChanged(LinkState::Normal));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_after_receiver_dropped_is_silent() {
        let (sink, rx) = ChannelStatusSink::channel();
        drop(rx);
        sink.set_status(LinkState::Degraded);
    }
}
