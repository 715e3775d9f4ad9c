//! Single-pass accumulators
//!
//! Each accumulator consumes events incrementally so the aggregator can
//! derive every statistic from one pass over the windowed set.

use chrono::{DateTime, Utc};
use pulse_types::{HourBucket, UserValue};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::window::{trailing_hour_buckets, WindowBounds};

/// Counts events per type.
#[derive(Debug, Default)]
pub struct TypeCounter {
    counts: HashMap<String, u64>,
}

impl TypeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event_type: &str) {
        *self.counts.entry(event_type.to_string()).or_insert(0) += 1;
    }

    pub fn finalize(self) -> HashMap<String, u64> {
        self.counts
    }
}

/// Accumulates `value` per user, preserving first-encountered order so that
/// ties in the top-N ranking break deterministically.
#[derive(Debug, Default)]
pub struct UserValueTotals {
    index: HashMap<String, usize>,
    totals: Vec<UserValue>,
}

impl UserValueTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one event's contribution. Zero-valued events do not
    /// contribute.
    pub fn record(&mut self, user_id: &str, value: f64) {
        if value == 0.0 {
            return;
        }
        match self.index.get(user_id) {
            Some(&i) => self.totals[i].value += value,
            None => {
                self.index.insert(user_id.to_string(), self.totals.len());
                self.totals.push(UserValue {
                    user_id: user_id.to_string(),
                    value,
                });
            }
        }
    }

    /// The top `n` users by accumulated value, descending. The sort is
    /// stable, so equal values keep first-encountered order.
    pub fn top(mut self, n: usize) -> Vec<UserValue> {
        self.totals
            .sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
        self.totals.truncate(n);
        self.totals
    }
}

/// Mean over purchase values, guarded against an empty window.
#[derive(Debug, Default)]
pub struct TicketAverage {
    sum: f64,
    count: u64,
}

impl TicketAverage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// The mean, or 0 when nothing was recorded. Never divides by zero.
    pub fn finalize(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// The 24-bucket hourly histogram. Carries its own fixed trailing-24h
/// window, independent of the caller's aggregation window.
#[derive(Debug)]
pub struct HourHistogram {
    buckets: Vec<(WindowBounds, u64)>,
}

impl HourHistogram {
    /// Build empty clock-aligned buckets for the 24 hours ending at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            buckets: trailing_hour_buckets(now)
                .into_iter()
                .map(|bounds| (bounds, 0))
                .collect(),
        }
    }

    /// Count a timestamp into its bucket. Timestamps outside every bucket
    /// range are dropped; the ranges never overlap, so an event lands in at
    /// most one.
    pub fn record(&mut self, timestamp: DateTime<Utc>) {
        if let Some((_, count)) = self
            .buckets
            .iter_mut()
            .find(|(bounds, _)| bounds.contains(timestamp))
        {
            *count += 1;
        }
    }

    pub fn finalize(self) -> Vec<HourBucket> {
        self.buckets
            .into_iter()
            .map(|(bounds, count)| HourBucket {
                hour: chrono::Timelike::hour(&bounds.start),
                count,
                label: bounds.start.format("%H:00").to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_type_counter() {
        let mut counter = TypeCounter::new();
        counter.record("login");
        counter.record("purchase");
        counter.record("login");

        let counts = counter.finalize();
        assert_eq!(counts["login"], 2);
        assert_eq!(counts["purchase"], 1);
    }

    #[test]
    fn test_user_totals_sum_and_rank_descending() {
        let mut totals = UserValueTotals::new();
        totals.record("u1", 100.0);
        totals.record("u2", 30.0);
        totals.record("u1", 50.0);
        totals.record("u3", 80.0);

        let top = totals.top(5);
        assert_eq!(top[0], UserValue { user_id: "u1".into(), value: 150.0 });
        assert_eq!(top[1].user_id, "u3");
        assert_eq!(top[2].user_id, "u2");
    }

    #[test]
    fn test_user_totals_ignore_zero_values() {
        let mut totals = UserValueTotals::new();
        totals.record("u1", 0.0);
        assert!(totals.top(5).is_empty());
    }

    #[test]
    fn test_user_totals_break_ties_by_first_encountered() {
        let mut totals = UserValueTotals::new();
        totals.record("later", 50.0);
        totals.record("earlier", 50.0);
        // "later" was encountered first, so it wins the tie.
        let top = totals.top(5);
        assert_eq!(top[0].user_id, "later");
        assert_eq!(top[1].user_id, "earlier");
    }

    #[test]
    fn test_user_totals_bound() {
        let mut totals = UserValueTotals::new();
        for i in 0..10 {
            totals.record(&format!("u{i}"), (i + 1) as f64);
        }
        let top = totals.top(5);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].user_id, "u9");
    }

    #[test]
    fn test_ticket_average_zero_guard() {
        let average = TicketAverage::new();
        assert_eq!(average.finalize(), 0.0);
    }

    #[test]
    fn test_ticket_average_mean() {
        let mut average = TicketAverage::new();
        average.record(100.0);
        average.record(50.0);
        assert_eq!(average.finalize(), 75.0);
    }

    #[test]
    fn test_histogram_counts_into_exactly_one_bucket() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 12, 30, 0).unwrap();
        let mut histogram = HourHistogram::new(now);

        histogram.record(now); // newest bucket
        histogram.record(now - chrono::Duration::hours(3));
        histogram.record(now - chrono::Duration::hours(48)); // outside, dropped

        let buckets = histogram.finalize();
        assert_eq!(buckets.len(), 24);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<u64>(), 2);
        assert_eq!(buckets[23].count, 1);
        assert_eq!(buckets[23].hour, 12);
        assert_eq!(buckets[23].label, "12:00");
    }
}
