use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::day_cache::DayCache;
use crate::pitch::PitchEvent;
use crate::upstream::{PageSource, Resource, fetch_all_pages};

pub const DAY_BATCH_SIZE: usize = 30;

/// Days the upstream is known to hold pitch data for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownDays(BTreeSet<NaiveDate>);

impl KnownDays {
    pub fn new(days: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self(days.into_iter().collect())
    }

    /// Parse ISO dates separated by commas, whitespace or newlines. `#` starts a comment.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut days = BTreeSet::new();
        for line in raw.lines() {
            let line = line.split('#').next().unwrap_or("");
            for token in line.split(|c: char| c == ',' || c.is_whitespace()) {
                let token = token.trim();
                if token.is_empty() {
                    continue;
                }
                let day = NaiveDate::parse_from_str(token, "%Y-%m-%d")
                    .with_context(|| format!("invalid known-data day '{token}'"))?;
                days.insert(day);
            }
        }
        Ok(Self(days))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read known-data days {}", path.display()))?;
        Self::parse(&raw)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.0.contains(&day)
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.0.last().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Every calendar day in `[start, end]`; empty when `start > end`.
pub fn calendar_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

#[derive(Debug, Clone, Default)]
pub struct RangeFetch {
    pub events: Vec<PitchEvent>,
    pub days_requested: usize,
    pub days_with_data: usize,
    pub failed_days: Vec<NaiveDate>,
}

enum DayOutcome {
    Cached(Arc<Vec<PitchEvent>>),
    Fetched(Arc<Vec<PitchEvent>>),
    Failed,
}

pub struct DateRangeFetcher {
    source: Arc<dyn PageSource>,
    known_days: KnownDays,
    cache: DayCache,
    batch_size: usize,
    pool: Option<rayon::ThreadPool>,
}

impl DateRangeFetcher {
    pub fn new(
        source: Arc<dyn PageSource>,
        known_days: KnownDays,
        cache: DayCache,
        batch_size: usize,
        parallelism: usize,
    ) -> Self {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(parallelism.max(1))
            .thread_name(|idx| format!("day-fetch-{idx}"))
            .build()
            .map_err(|err| warn!(error = %err, "fetch pool unavailable; using global pool"))
            .ok();
        Self {
            source,
            known_days,
            cache,
            batch_size: batch_size.max(1),
            pool,
        }
    }

    pub fn cache(&self) -> &DayCache {
        &self.cache
    }

    /// Calendar days in range that are also on the known-data allowlist.
    pub fn days_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        calendar_days(start, end)
            .into_iter()
            .filter(|d| self.known_days.contains(*d))
            .collect()
    }

    pub fn fetch(&self, start: NaiveDate, end: NaiveDate) -> Vec<PitchEvent> {
        self.fetch_with_report(start, end).events
    }

    /// Fetch the range in sequential batches; days inside a batch run concurrently.
    /// A failed day contributes no events and is reported, never raised.
    pub fn fetch_with_report(&self, start: NaiveDate, end: NaiveDate) -> RangeFetch {
        let days = self.days_in_range(start, end);
        let mut out = RangeFetch {
            days_requested: days.len(),
            ..RangeFetch::default()
        };
        if days.is_empty() {
            debug!(%start, %end, "no known-data days in range");
            return out;
        }

        let mut network_days = 0usize;
        for batch in days.chunks(self.batch_size) {
            let results: Vec<(NaiveDate, DayOutcome)> = self.with_pool(|| {
                batch
                    .par_iter()
                    .map(|day| (*day, self.load_day(*day)))
                    .collect()
            });

            for (day, outcome) in results {
                let events = match outcome {
                    DayOutcome::Cached(events) => events,
                    DayOutcome::Fetched(events) => {
                        network_days += 1;
                        events
                    }
                    DayOutcome::Failed => {
                        out.failed_days.push(day);
                        continue;
                    }
                };
                if !events.is_empty() {
                    out.days_with_data += 1;
                }
                out.events.extend(events.iter().cloned());
            }
        }

        info!(
            %start,
            %end,
            days = out.days_requested,
            fetched = network_days,
            failed = out.failed_days.len(),
            events = out.events.len(),
            "pitch range loaded"
        );
        out
    }

    /// Events for one day, from the cache when present.
    pub fn fetch_day(&self, day: NaiveDate) -> Arc<Vec<PitchEvent>> {
        match self.load_day(day) {
            DayOutcome::Cached(events) | DayOutcome::Fetched(events) => events,
            DayOutcome::Failed => Arc::new(Vec::new()),
        }
    }

    fn load_day(&self, day: NaiveDate) -> DayOutcome {
        if let Some(events) = self.cache.get(day) {
            debug!(%day, events = events.len(), "day cache hit");
            if self.cache.is_failed(day) {
                return DayOutcome::Failed;
            }
            return DayOutcome::Cached(events);
        }

        match fetch_all_pages::<PitchEvent>(self.source.as_ref(), Resource::Pitches, Some(day)) {
            Ok(events) => DayOutcome::Fetched(self.cache.insert(day, events)),
            Err(err) => {
                let err = format!("{err:#}");
                warn!(%day, error = %err, "day fetch failed; treating as empty");
                self.cache.insert_failure(day);
                DayOutcome::Failed
            }
        }
    }

    fn with_pool<T>(&self, action: impl FnOnce() -> T + Send) -> T
    where
        T: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(action),
            None => action(),
        }
    }
}
