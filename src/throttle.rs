//! Adaptive inter-call pacing, one lane per provider.
//!
//! Keeps consecutive calls to the same upstream at least `current_delay`
//! apart, multiplying the delay on errors and decaying it back toward the
//! floor on sustained success. Advisory only: the hard daily ceiling lives
//! in the quota manager, this just shapes the call rate so upstreams don't
//! start throwing 429s.

use crate::providers::ProviderId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Minimum inter-call delay per provider
    pub floor: Duration,
    /// Delay never grows beyond this
    pub ceiling: Duration,
    /// Applied to the delay on every error
    pub error_multiplier: f64,
    /// Applied to the delay on success while healthy
    pub success_decay: f64,
    /// At or above this many consecutive errors the lane is considered
    /// unhealthy and a lone success does not yet shrink the delay
    pub error_threshold: u32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            floor: Duration::from_millis(100),
            ceiling: Duration::from_secs(5),
            error_multiplier: 2.0,
            success_decay: 0.75,
            error_threshold: 3,
        }
    }
}

#[derive(Debug)]
struct Lane {
    current_delay: Duration,
    consecutive_errors: u32,
    /// Earliest moment the next call on this lane may start
    next_slot: Instant,
}

/// Per-provider pacing state behind one short-critical-section mutex.
///
/// Check and reservation happen inside a single lock so two concurrent
/// aggregations cannot claim the same slot.
pub struct ThrottleController {
    config: ThrottleConfig,
    lanes: Mutex<HashMap<ProviderId, Lane>>,
}

impl ThrottleController {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            lanes: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(ThrottleConfig::default())
    }

    /// Wait until this provider's lane is free, reserving the next slot.
    pub async fn acquire(&self, id: ProviderId) {
        let slot = {
            let mut lanes = self.lanes.lock();
            let now = Instant::now();
            let lane = lanes.entry(id).or_insert_with(|| Lane {
                current_delay: self.config.floor,
                consecutive_errors: 0,
                next_slot: now,
            });

            let slot = lane.next_slot.max(now);
            lane.next_slot = slot + lane.current_delay;
            slot
        };

        let now = Instant::now();
        if slot > now {
            log::debug!("Throttling {} for {:?}", id, slot - now);
            tokio::time::sleep_until(slot).await;
        }
    }

    /// Record a successful call: reset the error run and, if the lane was
    /// already healthy, decay the delay toward the floor.
    pub fn on_success(&self, id: ProviderId) {
        let mut lanes = self.lanes.lock();
        let Some(lane) = lanes.get_mut(&id) else {
            return;
        };

        if lane.consecutive_errors < self.config.error_threshold {
            let decayed = lane.current_delay.mul_f64(self.config.success_decay);
            lane.current_delay = decayed.max(self.config.floor);
        }
        lane.consecutive_errors = 0;
    }

    /// Record a failed call: lengthen the delay toward the ceiling.
    pub fn on_error(&self, id: ProviderId) {
        let mut lanes = self.lanes.lock();
        let now = Instant::now();
        let lane = lanes.entry(id).or_insert_with(|| Lane {
            current_delay: self.config.floor,
            consecutive_errors: 0,
            next_slot: now,
        });

        lane.consecutive_errors += 1;
        let grown = lane.current_delay.mul_f64(self.config.error_multiplier);
        lane.current_delay = grown.min(self.config.ceiling);
        log::debug!(
            "Provider {} error #{}, delay now {:?}",
            id,
            lane.consecutive_errors,
            lane.current_delay
        );
    }

    /// Current delay for a provider (floor when the lane is untouched).
    pub fn current_delay(&self, id: ProviderId) -> Duration {
        let lanes = self.lanes.lock();
        lanes
            .get(&id)
            .map(|l| l.current_delay)
            .unwrap_or(self.config.floor)
    }

    pub fn consecutive_errors(&self, id: ProviderId) -> u32 {
        let lanes = self.lanes.lock();
        lanes.get(&id).map(|l| l.consecutive_errors).unwrap_or(0)
    }
}
