//! Discretize free time into fixed-duration meeting slots.
//!
//! Two generation modes are supported, selected by [`GenerationMode`]:
//!
//! - **Anchored**: walk every civil date covered by the free time (in the
//!   policy's timezone) and try each anchor whose weekday matches that date.
//!   The anchor's local time is converted to an instant with the offset in
//!   effect on that date, so a window spanning a DST change still lands
//!   "Saturday 10:00" on local 10:00 on both sides of it.
//! - **Continuous**: step through each free interval from its start and keep
//!   every candidate whose start falls on an allowed weekday.
//!
//! Either way a slot is only emitted if it fits entirely inside a single free
//! interval. Output is sorted by start and capped at `result_limit`; both modes
//! stop scanning once enough slots have been found.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::dst::DstPolicy;
use crate::error::Result;
use crate::interval::{normalize, Interval};
use crate::policy::{Anchor, GenerationMode, SlotPolicy};
use crate::zone::{civil_days, resolve_local, OffsetProvider};

/// A proposed meeting time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Slot {
    /// A slot of `duration` starting at `start`, or `None` when the end would
    /// fall outside chrono's representable range.
    pub fn new(start: DateTime<Utc>, duration: Duration) -> Option<Self> {
        let end = start.checked_add_signed(duration)?;
        Some(Self { start, end })
    }

    pub fn as_interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}

/// Validate `policy`, resolve its timezone, and generate slots from `free`.
///
/// # Errors
/// Returns `EngineError::InvalidPolicy` for a non-positive duration or step or
/// an out-of-range anchor, and `EngineError::InvalidTimezone` for an unknown zone.
pub fn propose_slots(free: &[Interval], policy: &SlotPolicy) -> Result<Vec<Slot>> {
    let zone = policy.validate()?;
    Ok(propose_slots_in(free, policy, &zone))
}

/// Generate slots against an explicit offset provider.
///
/// `policy.timezone` is ignored here; `zone` answers every civil-calendar
/// question instead. The policy is assumed to be valid: a non-positive
/// duration or step produces no slots rather than an error.
pub fn propose_slots_in<P: OffsetProvider + ?Sized>(
    free: &[Interval],
    policy: &SlotPolicy,
    zone: &P,
) -> Vec<Slot> {
    if policy.duration_minutes <= 0 || policy.result_limit == 0 {
        return Vec::new();
    }

    let free = normalize(free);
    if free.is_empty() {
        return Vec::new();
    }

    let duration = Duration::minutes(policy.duration_minutes);
    let mut slots = match &policy.mode {
        GenerationMode::Anchored { anchors } => {
            anchored_slots(
                &free,
                anchors,
                duration,
                policy.dst_policy,
                policy.result_limit,
                zone,
            )
        }
        GenerationMode::Continuous {
            step_minutes,
            allowed_days,
        } => {
            if *step_minutes <= 0 {
                return Vec::new();
            }
            continuous_slots(
                &free,
                Duration::minutes(*step_minutes),
                allowed_days,
                duration,
                policy.result_limit,
                zone,
            )
        }
    };

    let candidates = slots.len();
    slots.sort();
    slots.dedup();
    slots.truncate(policy.result_limit);

    tracing::debug!(
        free_intervals = free.len(),
        candidates,
        emitted = slots.len(),
        "generated slots"
    );

    slots
}

fn anchored_slots<P: OffsetProvider + ?Sized>(
    free: &[Interval],
    anchors: &[Anchor],
    duration: Duration,
    dst_policy: DstPolicy,
    limit: usize,
    zone: &P,
) -> Vec<Slot> {
    let (Some(first), Some(last)) = (free.first(), free.last()) else {
        return Vec::new();
    };

    let mut slots = Vec::new();
    let mut filled_on: Option<NaiveDate> = None;
    for day in civil_days(zone, first.start, last.end) {
        // A gap-shifted anchor can land after the next day's earliest anchor,
        // so one more day is collected once the limit is reached.
        if filled_on
            .and_then(|filled| filled.succ_opt())
            .is_some_and(|cutoff| day > cutoff)
        {
            break;
        }

        let weekday = day.weekday();
        for anchor in anchors.iter().filter(|a| a.weekday == weekday) {
            let Some(time) = NaiveTime::from_hms_opt(anchor.hour, anchor.minute, 0) else {
                continue;
            };
            let Some(start) = resolve_local(zone, day.and_time(time), dst_policy) else {
                continue;
            };
            let Some(slot) = Slot::new(start, duration) else {
                continue;
            };
            if fits_in_free(free, &slot) && !slots.contains(&slot) {
                slots.push(slot);
            }
        }

        if filled_on.is_none() && slots.len() >= limit {
            filled_on = Some(day);
        }
    }
    slots
}

fn continuous_slots<P: OffsetProvider + ?Sized>(
    free: &[Interval],
    step: Duration,
    allowed_days: &[Weekday],
    duration: Duration,
    limit: usize,
    zone: &P,
) -> Vec<Slot> {
    let mut slots = Vec::new();
    // Free intervals are sorted and disjoint, so candidates arrive in order
    // and the scan can stop as soon as the limit is reached.
    for interval in free {
        let mut cursor = interval.start;
        while let Some(slot) = Slot::new(cursor, duration) {
            if slot.end > interval.end {
                break;
            }
            if allowed_days.contains(&zone.weekday(cursor)) {
                slots.push(slot);
                if slots.len() >= limit {
                    return slots;
                }
            }
            let Some(next) = cursor.checked_add_signed(step) else {
                break;
            };
            cursor = next;
        }
    }
    slots
}

/// True when `slot` lies entirely inside one member of the normalized set `free`.
fn fits_in_free(free: &[Interval], slot: &Slot) -> bool {
    let idx = free.partition_point(|i| i.start <= slot.start);
    idx > 0 && free[idx - 1].contains(&slot.as_interval())
}
