//! Civil-calendar lookups in a target timezone.
//!
//! Slot generation never asks the host clock or a cached offset for anything.
//! Every question ("which weekday is this instant?", "which instant is Saturday
//! 10:00 on this date?") goes through an [`OffsetProvider`], which resolves the
//! UTC offset for the specific instant or local date-time being asked about.
//! That keeps the answers correct on both sides of a DST transition.
//!
//! Any `chrono::TimeZone` is an offset provider, so `chrono_tz::Tz`,
//! `chrono::Utc` and `chrono::FixedOffset` all plug in directly.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc,
    Weekday,
};
use chrono_tz::Tz;

use crate::dst::DstPolicy;
use crate::error::{EngineError, Result};

/// Longest gap scanned when shifting a nonexistent local time forward.
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// How a local date-time maps onto UTC instants in a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalResolution {
    /// Exactly one instant.
    Single(DateTime<Utc>),
    /// The local time occurs twice (fall-back overlap).
    Ambiguous {
        earliest: DateTime<Utc>,
        latest: DateTime<Utc>,
    },
    /// The local time does not exist (spring-forward gap).
    Gap,
}

/// Per-instant offset and civil-calendar resolution for one timezone.
pub trait OffsetProvider {
    /// UTC offset in effect at `instant`, in seconds east of UTC.
    fn offset_seconds(&self, instant: DateTime<Utc>) -> i32;

    /// Map a local wall-clock date-time onto UTC.
    fn resolve(&self, local: NaiveDateTime) -> LocalResolution;

    /// Civil date of `instant` in this zone.
    ///
    /// Local times past either end of chrono's range clamp to the UTC date.
    fn civil_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        let utc = instant.naive_utc();
        let offset = Duration::seconds(i64::from(self.offset_seconds(instant)));
        utc.checked_add_signed(offset).unwrap_or(utc).date()
    }

    /// Civil weekday of `instant` in this zone.
    fn weekday(&self, instant: DateTime<Utc>) -> Weekday {
        self.civil_date(instant).weekday()
    }
}

impl<T: TimeZone> OffsetProvider for T {
    fn offset_seconds(&self, instant: DateTime<Utc>) -> i32 {
        self.offset_from_utc_datetime(&instant.naive_utc())
            .fix()
            .local_minus_utc()
    }

    fn resolve(&self, local: NaiveDateTime) -> LocalResolution {
        match self.from_local_datetime(&local) {
            LocalResult::Single(dt) => LocalResolution::Single(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(a, b) => {
                let (a, b) = (a.with_timezone(&Utc), b.with_timezone(&Utc));
                LocalResolution::Ambiguous {
                    earliest: a.min(b),
                    latest: a.max(b),
                }
            }
            LocalResult::None => LocalResolution::Gap,
        }
    }
}

/// Parse an IANA timezone identifier such as `"America/Los_Angeles"` or `"UTC"`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| EngineError::InvalidTimezone(name.to_string()))
}

/// Convert a local date-time in the provider's zone to a UTC instant.
///
/// Ambiguous times take the earlier instant. Times inside a DST gap follow
/// `policy`; `None` is only returned for [`DstPolicy::Skip`] (or a gap longer
/// than a day, which no real zone has).
pub fn resolve_local<P: OffsetProvider + ?Sized>(
    provider: &P,
    local: NaiveDateTime,
    policy: DstPolicy,
) -> Option<DateTime<Utc>> {
    match provider.resolve(local) {
        LocalResolution::Single(instant) => Some(instant),
        LocalResolution::Ambiguous { earliest, .. } => Some(earliest),
        LocalResolution::Gap => match policy {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward => first_instant_after_gap(provider, local),
            DstPolicy::WallClock => {
                let transition = first_instant_after_gap(provider, local)?;
                let before =
                    provider.offset_seconds(transition.checked_sub_signed(Duration::seconds(1))?);
                local
                    .checked_sub_signed(Duration::seconds(i64::from(before)))
                    .map(|utc| utc.and_utc())
            }
        },
    }
}

/// The transition instant that ends the gap containing `local`.
///
/// Scans forward a minute at a time; transitions sit on minute boundaries in
/// every IANA zone, so for minute-aligned anchors the first local time that
/// exists maps exactly onto the transition.
fn first_instant_after_gap<P: OffsetProvider + ?Sized>(
    provider: &P,
    local: NaiveDateTime,
) -> Option<DateTime<Utc>> {
    (1..=MAX_GAP_MINUTES).find_map(|minutes| {
        let candidate = local.checked_add_signed(Duration::minutes(minutes))?;
        match provider.resolve(candidate) {
            LocalResolution::Single(instant) => Some(instant),
            LocalResolution::Ambiguous { earliest, .. } => Some(earliest),
            LocalResolution::Gap => None,
        }
    })
}

/// Every civil date from the date of `first` through the date of `last`, inclusive.
pub fn civil_days<P: OffsetProvider + ?Sized>(
    provider: &P,
    first: DateTime<Utc>,
    last: DateTime<Utc>,
) -> impl Iterator<Item = NaiveDate> {
    let from = provider.civil_date(first);
    let to = provider.civil_date(last);
    from.iter_days().take_while(move |day| *day <= to)
}
