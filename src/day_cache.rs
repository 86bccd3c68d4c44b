use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use chrono::NaiveDate;

use crate::pitch::PitchEvent;

pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    /// Entries older than this are refetched. `None` keeps them for the cache's lifetime.
    pub ttl: Option<Duration>,
    /// Oldest-fetched entries are evicted past this many days. `None` is unbounded.
    pub max_days: Option<usize>,
    /// Store a failed day as an empty result so it is never retried.
    pub cache_failures: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl: None,
            max_days: None,
            cache_failures: true,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    events: Arc<Vec<PitchEvent>>,
    fetched_at: SystemTime,
    failed: bool,
}

/// Day → pitch events memo shared by every fetch made through one fetcher.
pub struct DayCache {
    entries: Mutex<HashMap<NaiveDate, CacheEntry>>,
    policy: CachePolicy,
    clock: Arc<dyn Clock>,
}

impl DayCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: CachePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            policy,
            clock,
        }
    }

    pub fn get(&self, day: NaiveDate) -> Option<Arc<Vec<PitchEvent>>> {
        let mut guard = self.entries.lock().expect("day cache lock poisoned");
        let (events, fetched_at) = {
            let entry = guard.get(&day)?;
            (Arc::clone(&entry.events), entry.fetched_at)
        };
        if let Some(ttl) = self.policy.ttl {
            let age = self
                .clock
                .now()
                .duration_since(fetched_at)
                .unwrap_or_default();
            if age > ttl {
                guard.remove(&day);
                return None;
            }
        }
        Some(events)
    }

    pub fn is_failed(&self, day: NaiveDate) -> bool {
        let guard = self.entries.lock().expect("day cache lock poisoned");
        guard.get(&day).is_some_and(|e| e.failed)
    }

    /// Store a successful fetch (empty results included).
    pub fn insert(&self, day: NaiveDate, events: Vec<PitchEvent>) -> Arc<Vec<PitchEvent>> {
        let events = Arc::new(events);
        self.store(day, Arc::clone(&events), false);
        events
    }

    /// Record a failed fetch according to the failure policy.
    pub fn insert_failure(&self, day: NaiveDate) {
        if self.policy.cache_failures {
            self.store(day, Arc::new(Vec::new()), true);
        }
    }

    fn store(&self, day: NaiveDate, events: Arc<Vec<PitchEvent>>, failed: bool) {
        let mut guard = self.entries.lock().expect("day cache lock poisoned");
        guard.insert(
            day,
            CacheEntry {
                events,
                fetched_at: self.clock.now(),
                failed,
            },
        );
        if let Some(max) = self.policy.max_days {
            while guard.len() > max {
                let Some(oldest) = guard
                    .iter()
                    .filter(|(d, _)| **d != day)
                    .min_by_key(|(d, e)| (e.fetched_at, **d))
                    .map(|(d, _)| *d)
                else {
                    break;
                };
                guard.remove(&oldest);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("day cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().expect("day cache lock poisoned").clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ManualClock(Mutex<SystemTime>);

    impl ManualClock {
        fn advance(&self, by: Duration) {
            let mut now = self.0.lock().expect("clock lock");
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> SystemTime {
            *self.0.lock().expect("clock lock")
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).expect("valid date")
    }

    #[test]
    fn ttl_expires_entries() {
        let clock = Arc::new(ManualClock(Mutex::new(SystemTime::UNIX_EPOCH)));
        let cache = DayCache::with_clock(
            CachePolicy {
                ttl: Some(Duration::from_secs(60)),
                ..CachePolicy::default()
            },
            clock.clone(),
        );
        cache.insert(day(1), vec![PitchEvent::default()]);
        assert_eq!(cache.get(day(1)).map(|e| e.len()), Some(1));
        clock.advance(Duration::from_secs(61));
        assert!(cache.get(day(1)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn max_days_evicts_oldest() {
        let clock = Arc::new(ManualClock(Mutex::new(SystemTime::UNIX_EPOCH)));
        let cache = DayCache::with_clock(
            CachePolicy {
                max_days: Some(2),
                ..CachePolicy::default()
            },
            clock.clone(),
        );
        cache.insert(day(1), Vec::new());
        clock.advance(Duration::from_secs(1));
        cache.insert(day(2), Vec::new());
        clock.advance(Duration::from_secs(1));
        cache.insert(day(3), Vec::new());
        assert_eq!(cache.len(), 2);
        assert!(cache.get(day(1)).is_none());
        assert!(cache.get(day(3)).is_some());
    }

    #[test]
    fn failures_respect_policy() {
        let cache = DayCache::new(CachePolicy::default());
        cache.insert_failure(day(5));
        assert!(cache.is_failed(day(5)));
        assert_eq!(cache.get(day(5)).map(|e| e.len()), Some(0));

        let cache = DayCache::new(CachePolicy {
            cache_failures: false,
            ..CachePolicy::default()
        });
        cache.insert_failure(day(5));
        assert!(cache.get(day(5)).is_none());
    }
}
