//! Half-open interval algebra over UTC instants.
//!
//! Every interval is `[start, end)`. The operations here are pure: they never
//! validate, never log and never fail. Callers that accept untrusted input run
//! [`validate_intervals`] first.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Build an interval, rejecting `start > end`.
    pub fn try_new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(EngineError::InvalidInterval {
                field: "interval".to_string(),
                index: 0,
                start,
                end,
            });
        }
        Ok(Self { start, end })
    }

    /// The widest representable interval, identity element for intersection.
    pub fn everything() -> Self {
        Self {
            start: DateTime::<Utc>::MIN_UTC,
            end: DateTime::<Utc>::MAX_UTC,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Interval) -> bool {
        other.start >= self.start && other.end <= self.end
    }
}

/// Reject any interval with `start > end`, naming the offending field and index.
pub fn validate_intervals(field: &str, intervals: &[Interval]) -> Result<()> {
    for (index, interval) in intervals.iter().enumerate() {
        if interval.start > interval.end {
            return Err(EngineError::InvalidInterval {
                field: field.to_string(),
                index,
                start: interval.start,
                end: interval.end,
            });
        }
    }
    Ok(())
}

/// Sort and merge intervals into a canonical set.
///
/// The result is sorted by start, and no two members overlap or touch:
/// `[9,10)` and `[10,11)` collapse into `[9,11)`. Zero-length intervals carry
/// no time and are dropped.
pub fn normalize(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals.iter().copied().filter(|i| !i.is_empty()).collect();
    sorted.sort_by_key(|i| (i.start, i.end));

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        if let Some(last) = merged.last_mut() {
            if interval.start <= last.end {
                last.end = last.end.max(interval.end);
                continue;
            }
        }
        merged.push(interval);
    }

    merged
}

/// Clip intervals to `[window_start, window_end)` and normalize the result.
///
/// Intervals entirely outside the window are discarded.
pub fn clip_to_window(
    intervals: &[Interval],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<Interval> {
    let clipped: Vec<Interval> = intervals
        .iter()
        .filter(|i| i.start < window_end && i.end > window_start)
        .map(|i| Interval::new(i.start.max(window_start), i.end.min(window_end)))
        .collect();
    normalize(&clipped)
}

/// Compute the free time inside `[window_start, window_end)` left over by `busy`.
///
/// Busy intervals outside the window are ignored and partial overlaps are
/// clipped. An empty or inverted window yields no free time.
pub fn invert_busy_to_free(
    busy: &[Interval],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<Interval> {
    let merged = normalize(busy);

    let mut free = Vec::new();
    let mut cursor = window_start;

    for interval in &merged {
        if interval.end <= cursor {
            continue;
        }
        if interval.start >= window_end {
            break;
        }
        if cursor < interval.start {
            free.push(Interval::new(cursor, interval.start));
        }
        cursor = cursor.max(interval.end);
    }

    // Trailing free time after the last busy period.
    if cursor < window_end {
        free.push(Interval::new(cursor, window_end));
    }

    free
}

/// Intersect two interval sets with a linear two-pointer sweep.
///
/// Both inputs are normalized first. Zero-length overlaps (touching
/// intervals) are not emitted. On equal ends the left pointer advances.
pub fn intersect_intervals(a: &[Interval], b: &[Interval]) -> Vec<Interval> {
    let left = normalize(a);
    let right = normalize(b);

    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < left.len() && j < right.len() {
        let start = left[i].start.max(right[j].start);
        let end = left[i].end.min(right[j].end);
        if start < end {
            result.push(Interval::new(start, end));
        }
        if left[i].end <= right[j].end {
            i += 1;
        } else {
            j += 1;
        }
    }

    result
}

/// Fold [`intersect_intervals`] left-to-right across any number of sets.
///
/// No sets at all yields an empty result; a single set yields its normalized form.
pub fn intersect_all<I>(sets: I) -> Vec<Interval>
where
    I: IntoIterator,
    I::Item: AsRef<[Interval]>,
{
    let mut iter = sets.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut acc = normalize(first.as_ref());
    for set in iter {
        if acc.is_empty() {
            break;
        }
        acc = intersect_intervals(&acc, set.as_ref());
    }
    acc
}

/// Total minutes covered by a set of intervals after normalization.
pub fn total_minutes(intervals: &[Interval]) -> i64 {
    normalize(intervals)
        .iter()
        .map(Interval::duration_minutes)
        .sum()
}
