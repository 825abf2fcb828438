//! Per-node value statistics

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::SchemaValue;

/// Inclusive (min, max) pair over one value category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Range<T> {
    fn single(value: T) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Widen an optional range with a new observation.
    ///
    /// The first observation defines both bounds. After that the minimum is
    /// only replaced by strictly smaller values and the maximum only by
    /// strictly larger ones.
    pub fn widen(range: &mut Option<Range<T>>, value: T) {
        match range {
            None => *range = Some(Range::single(value)),
            Some(r) => {
                if value < r.min {
                    r.min = value;
                }
                if value > r.max {
                    r.max = value;
                }
            }
        }
    }
}

/// Counters and ranges accumulated for one node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueStats {
    /// Number of values recorded
    pub total: u64,
    /// Number of empty values recorded
    pub empty: u64,
    /// String length or array element count
    pub length: Option<Range<usize>>,
    /// Exact numeric bounds
    pub numeric: Option<Range<Decimal>>,
    pub date_time: Option<Range<DateTime<Utc>>>,
    pub time_span: Option<Range<TimeDelta>>,
}

impl ValueStats {
    /// Fold one observed value into the counters and ranges
    pub fn observe(&mut self, value: &SchemaValue) {
        self.total += 1;

        match value {
            SchemaValue::Empty => self.empty += 1,
            SchemaValue::String(text) => Range::widen(&mut self.length, text.chars().count()),
            SchemaValue::Integer(n) | SchemaValue::Decimal(n) => {
                Range::widen(&mut self.numeric, *n)
            }
            SchemaValue::DateTime(Some(instant)) => Range::widen(&mut self.date_time, *instant),
            SchemaValue::TimeSpan(span) => Range::widen(&mut self.time_span, *span),
            SchemaValue::Array(len) => Range::widen(&mut self.length, *len),
            SchemaValue::DateTime(None)
            | SchemaValue::Boolean(_)
            | SchemaValue::Object
            | SchemaValue::Root => {}
        }
    }

    /// Whether any counter or range carries information
    pub fn is_defined(&self) -> bool {
        self.total > 0
            || self.empty > 0
            || self.length.is_some()
            || self.numeric.is_some()
            || self.date_time.is_some()
            || self.time_span.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_widen_min_shrinks_max_grows() {
        let mut range = None;
        Range::widen(&mut range, 5);
        assert_eq!(range, Some(Range { min: 5, max: 5 }));

        Range::widen(&mut range, 2);
        Range::widen(&mut range, 9);
        Range::widen(&mut range, 4);
        assert_eq!(range, Some(Range { min: 2, max: 9 }));
    }

    #[test]
    fn test_widen_is_order_independent() {
        let values = [3.5, -1.0, 12.25, 0.0];
        let mut forward = None;
        let mut backward = None;
        for v in values {
            Range::widen(&mut forward, v);
        }
        for v in values.iter().rev() {
            Range::widen(&mut backward, *v);
        }
        assert_eq!(forward, backward);
        assert_eq!(forward, Some(Range { min: -1.0, max: 12.25 }));
    }

    #[test]
    fn test_empty_counts_without_ranges() {
        let mut stats = ValueStats::default();
        stats.observe(&SchemaValue::Empty);
        stats.observe(&SchemaValue::Empty);

        assert_eq!(stats.total, 2);
        assert_eq!(stats.empty, 2);
        assert!(stats.length.is_none());
        assert!(stats.numeric.is_none());
    }

    #[test]
    fn test_categories_update_their_own_range() {
        let mut stats = ValueStats::default();
        stats.observe(&SchemaValue::String("héllo".to_string()));
        stats.observe(&SchemaValue::Array(2));
        stats.observe(&SchemaValue::Integer(Decimal::from(7)));
        stats.observe(&SchemaValue::Decimal(Decimal::new(15, 1)));
        stats.observe(&SchemaValue::Boolean(true));
        stats.observe(&SchemaValue::Object);

        assert_eq!(stats.total, 6);
        assert_eq!(stats.empty, 0);
        assert_eq!(stats.length, Some(Range { min: 2, max: 5 }));
        assert_eq!(
            stats.numeric,
            Some(Range {
                min: Decimal::new(15, 1),
                max: Decimal::from(7)
            })
        );
        assert!(stats.date_time.is_none());
        assert!(stats.time_span.is_none());
    }

    #[test]
    fn test_temporal_ranges() {
        let early = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap();

        let mut stats = ValueStats::default();
        stats.observe(&SchemaValue::DateTime(Some(late)));
        stats.observe(&SchemaValue::DateTime(None));
        stats.observe(&SchemaValue::DateTime(Some(early)));
        stats.observe(&SchemaValue::TimeSpan(TimeDelta::hours(3)));
        stats.observe(&SchemaValue::TimeSpan(TimeDelta::minutes(5)));

        assert_eq!(stats.date_time, Some(Range { min: early, max: late }));
        assert_eq!(
            stats.time_span,
            Some(Range {
                min: TimeDelta::minutes(5),
                max: TimeDelta::hours(3)
            })
        );
    }

    #[test]
    fn test_numeric_range_keeps_large_integers_apart() {
        let low = Decimal::from(9_007_199_254_740_992_i64);
        let high = Decimal::from(9_007_199_254_740_993_i64);

        let mut stats = ValueStats::default();
        stats.observe(&SchemaValue::Integer(high));
        stats.observe(&SchemaValue::Integer(low));

        assert_eq!(stats.numeric, Some(Range { min: low, max: high }));
    }

    #[test]
    fn test_is_defined() {
        let mut stats = ValueStats::default();
        assert!(!stats.is_defined());
        stats.observe(&SchemaValue::Object);
        assert!(stats.is_defined());
    }
}
