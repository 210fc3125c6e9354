//! Link classification and edge-triggered state tracking.

use serde::Serialize;

use crate::notify::Icon;

/// Last known health of the monitored link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LinkState {
    #[default]
    Normal,
    Degraded,
}

impl LinkState {
    /// Status icon that represents this state.
    pub fn icon(self) -> Icon {
        match self {
            LinkState::Normal => Icon::Normal,
            LinkState::Degraded => Icon::Warning,
        }
    }
}

/// Result of classifying one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Normal,
    Degraded,
    /// The link is down; this tick says nothing about speed.
    Unchanged,
}

/// Classify a sample against the expected speed.
///
/// A down link is out of scope for the tick rather than an alert condition.
pub fn classify(is_up: bool, speed_mbps: u64, expected_speed_mbps: u64) -> Classification {
    if !is_up {
        Classification::Unchanged
    } else if speed_mbps < expected_speed_mbps {
        Classification::Degraded
    } else {
        Classification::Normal
    }
}

/// Holds the current [`LinkState`] and reports only genuine transitions.
#[derive(Debug, Default)]
pub struct LinkStateMachine {
    state: LinkState,
}

impl LinkStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Apply a classification. Returns the new state only when it differs from
    /// the stored one, so steady-state ticks never reach the status sink.
    pub fn apply(&mut self, classification: Classification) -> Option<LinkState> {
        let next = match classification {
            Classification::Normal => LinkState::Normal,
            Classification::Degraded => LinkState::Degraded,
            Classification::Unchanged => return None,
        };
        if next == self.state {
            return None;
        }
        self.state = next;
        Some(next)
    }
}
