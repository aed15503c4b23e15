//! Daily unit budgets, one per rate-limited provider.
//!
//! The video index bills every search 100 units against a hard 10 000
//! units/day ceiling, so admission happens before the call is issued and
//! the counter can never cross the limit. The other catalogs get generous
//! budgets and a flat per-call cost; they share the same machinery so one
//! code path covers all four.

pub mod store;

pub use store::{MemoryQuotaStore, QuotaRecord, QuotaStore, SqliteQuotaStore};

use crate::providers::ProviderId;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Length of one quota window.
const QUOTA_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy)]
pub struct QuotaConfig {
    pub daily_limit: u64,
    /// Fixed unit cost of one search/browse operation
    pub search_cost: u64,
}

impl QuotaConfig {
    /// Default budgets per provider. YouTube's numbers mirror the Data API
    /// v3 pricing (search = 100 units, 10 000 units/day).
    pub fn defaults() -> HashMap<ProviderId, QuotaConfig> {
        let mut map = HashMap::new();
        map.insert(
            ProviderId::Youtube,
            QuotaConfig {
                daily_limit: 10_000,
                search_cost: 100,
            },
        );
        map.insert(
            ProviderId::Spotify,
            QuotaConfig {
                daily_limit: 100_000,
                search_cost: 1,
            },
        );
        map.insert(
            ProviderId::Deezer,
            QuotaConfig {
                daily_limit: 100_000,
                search_cost: 1,
            },
        );
        map.insert(
            ProviderId::Lastfm,
            QuotaConfig {
                daily_limit: 50_000,
                search_cost: 1,
            },
        );
        map
    }
}

#[derive(Debug, Clone)]
pub struct QuotaState {
    pub used_today: u64,
    pub daily_limit: u64,
    pub reset_at: DateTime<Utc>,
}

impl QuotaState {
    fn fresh(daily_limit: u64, now: DateTime<Utc>) -> Self {
        Self {
            used_today: 0,
            daily_limit,
            reset_at: now + TimeDelta::hours(QUOTA_WINDOW_HOURS),
        }
    }

    fn to_record(&self) -> QuotaRecord {
        QuotaRecord {
            used_today: self.used_today,
            reset_at: self.reset_at.to_rfc3339(),
        }
    }
}

/// Owns the per-provider counters. Constructed once at startup and shared
/// by `Arc` with the aggregation engine; all check-and-update sequences
/// run inside a single critical section.
pub struct QuotaManager {
    configs: HashMap<ProviderId, QuotaConfig>,
    states: Mutex<HashMap<ProviderId, QuotaState>>,
    store: Arc<dyn QuotaStore>,
}

impl QuotaManager {
    pub fn new(configs: HashMap<ProviderId, QuotaConfig>, store: Arc<dyn QuotaStore>) -> Self {
        let now = Utc::now();
        let states = configs
            .iter()
            .map(|(id, cfg)| (*id, QuotaState::fresh(cfg.daily_limit, now)))
            .collect();

        Self {
            configs,
            states: Mutex::new(states),
            store,
        }
    }

    pub fn with_defaults(store: Arc<dyn QuotaStore>) -> Self {
        Self::new(QuotaConfig::defaults(), store)
    }

    /// Restore persisted counters.
    ///
    /// A record whose usage exceeds its limit, whose reset has already
    /// elapsed, or whose timestamp does not parse is treated as corrupt
    /// and replaced with a zeroed state and a fresh 24 h window. Clock
    /// skew and torn writes both land here; the safe answer is the same.
    pub async fn restore(&self) {
        let now = Utc::now();

        for (id, cfg) in &self.configs {
            let record = match self.store.load(*id).await {
                Ok(Some(r)) => r,
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("Quota store read failed for {}: {}", id, e);
                    continue;
                }
            };

            let parsed = DateTime::parse_from_rfc3339(&record.reset_at)
                .map(|dt| dt.with_timezone(&Utc));

            let state = match parsed {
                Ok(reset_at) if record.used_today <= cfg.daily_limit && reset_at > now => {
                    QuotaState {
                        used_today: record.used_today,
                        daily_limit: cfg.daily_limit,
                        reset_at,
                    }
                }
                Ok(_) => {
                    log::warn!(
                        "Discarding stale/inconsistent quota state for {} (used {} / limit {})",
                        id,
                        record.used_today,
                        cfg.daily_limit
                    );
                    QuotaState::fresh(cfg.daily_limit, now)
                }
                Err(e) => {
                    log::warn!("Unparseable quota reset timestamp for {}: {}", id, e);
                    QuotaState::fresh(cfg.daily_limit, now)
                }
            };

            self.states.lock().insert(*id, state);
        }
    }

    /// Admit `cost` units against the provider's window, rolling the
    /// window first when the reset has passed. Returns false when the
    /// budget cannot cover the cost; rejected operations are not queued.
    pub async fn try_consume(&self, id: ProviderId, cost: u64) -> bool {
        let snapshot = {
            let mut states = self.states.lock();
            let Some(state) = states.get_mut(&id) else {
                // Unconfigured providers are not quota-governed.
                return true;
            };

            let now = Utc::now();
            if now >= state.reset_at {
                log::info!("Quota window reset for {}", id);
                *state = QuotaState::fresh(state.daily_limit, now);
            }

            if state.used_today + cost > state.daily_limit {
                log::warn!(
                    "Quota exhausted for {} ({} used + {} requested > {} limit)",
                    id,
                    state.used_today,
                    cost,
                    state.daily_limit
                );
                return false;
            }

            state.used_today += cost;
            state.to_record()
        };

        if let Err(e) = self.store.save(id, &snapshot).await {
            log::warn!("Quota persistence failed for {}: {}", id, e);
        }
        true
    }

    /// Units still available in the current window.
    pub fn remaining(&self, id: ProviderId) -> u64 {
        let states = self.states.lock();
        let Some(state) = states.get(&id) else {
            return u64::MAX;
        };
        if Utc::now() >= state.reset_at {
            state.daily_limit
        } else {
            state.daily_limit - state.used_today
        }
    }

    /// Whether one search-priced operation would currently be admitted.
    pub fn is_admissible(&self, id: ProviderId) -> bool {
        self.remaining(id) >= self.search_cost(id)
    }

    pub fn search_cost(&self, id: ProviderId) -> u64 {
        self.configs.get(&id).map(|c| c.search_cost).unwrap_or(0)
    }

    pub fn state(&self, id: ProviderId) -> Option<QuotaState> {
        self.states.lock().get(&id).cloned()
    }

    /// Persist every counter once.
    pub async fn persist_all(&self) {
        let snapshot: Vec<(ProviderId, QuotaRecord)> = {
            let states = self.states.lock();
            states.iter().map(|(id, s)| (*id, s.to_record())).collect()
        };

        for (id, record) in snapshot {
            if let Err(e) = self.store.save(id, &record).await {
                log::warn!("Quota persistence failed for {}: {}", id, e);
            }
        }
    }

    /// Background task writing all counters on a fixed interval, as a
    /// safety net alongside the per-mutation writes.
    pub fn spawn_periodic_persist(self: Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let manager = self;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                manager.persist_all().await;
            }
        })
    }
}
