//! Multi-participant availability at the engine boundary.
//!
//! Each participant contributes one busy list, fetched by an external
//! calendar provider. Busy time is inverted to free time per participant and
//! the free sets are intersected into the time everyone shares.
//!
//! A participant whose calendar cannot be read is reported as missing and left
//! out of the intersection. Feeding an empty free set for them instead would
//! erase everyone else's overlap.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{EngineError, Result};
use crate::interval::{intersect_all, invert_busy_to_free, validate_intervals, Interval};

/// Opaque participant identifier (typically an email address).
pub type ParticipantId = String;

/// Why a participant's free/busy data could not be obtained.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Unavailable {
    /// The participant has not signed up, so there is no account to look up.
    #[error("participant has no account")]
    NoAccount,

    /// The participant has an account but no connected calendar.
    #[error("no calendar connected")]
    NoCalendarLinked,

    /// The upstream calendar call failed or timed out.
    #[error("calendar lookup failed: {0}")]
    UpstreamFailed(String),
}

/// Source of busy intervals for one participant over a window.
///
/// Implementations do the I/O (OAuth, HTTP, caching, timeouts). The engine only
/// sees the outcome.
pub trait FreeBusyProvider {
    fn busy(
        &self,
        participant: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> std::result::Result<Vec<Interval>, Unavailable>;
}

impl FreeBusyProvider for BTreeMap<ParticipantId, Vec<Interval>> {
    fn busy(
        &self,
        participant: &str,
        _window_start: DateTime<Utc>,
        _window_end: DateTime<Utc>,
    ) -> std::result::Result<Vec<Interval>, Unavailable> {
        self.get(participant)
            .cloned()
            .ok_or(Unavailable::NoCalendarLinked)
    }
}

impl FreeBusyProvider for HashMap<ParticipantId, Vec<Interval>> {
    fn busy(
        &self,
        participant: &str,
        _window_start: DateTime<Utc>,
        _window_end: DateTime<Utc>,
    ) -> std::result::Result<Vec<Interval>, Unavailable> {
        self.get(participant)
            .cloned()
            .ok_or(Unavailable::NoCalendarLinked)
    }
}

/// A participant left out of the intersection, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingParticipant {
    pub participant: ParticipantId,
    pub reason: Unavailable,
}

/// Shared free time across every participant whose calendar was readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    /// Intersection of the counted participants' free time (sorted, disjoint).
    pub free: Vec<Interval>,
    /// Participants whose free time went into `free`, in input order.
    pub counted: Vec<ParticipantId>,
    /// Participants excluded for lack of data, in input order.
    pub missing: Vec<MissingParticipant>,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

impl Availability {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Reject an empty or inverted window.
pub fn validate_window(window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> Result<()> {
    if window_start >= window_end {
        return Err(EngineError::InvalidWindow {
            start: window_start,
            end: window_end,
        });
    }
    Ok(())
}

/// Invert each participant's busy list within the window and intersect the
/// resulting free sets.
///
/// With no participants at all the result is empty: there is nobody to meet.
///
/// # Errors
/// Returns `EngineError::InvalidWindow` if `window_start >= window_end` and
/// `EngineError::InvalidInterval` (naming the participant) for any busy
/// interval with `start > end`.
pub fn intersect_free_busy<I, K, V>(
    per_participant_busy: I,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Result<Vec<Interval>>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<[Interval]>,
{
    validate_window(window_start, window_end)?;

    let mut free_sets = Vec::new();
    for (participant, busy) in per_participant_busy {
        let busy = busy.as_ref();
        validate_intervals(&format!("busy[{}]", participant.as_ref()), busy)?;
        free_sets.push(invert_busy_to_free(busy, window_start, window_end));
    }

    Ok(intersect_all(&free_sets))
}

/// Build an [`Availability`] from lookups that were already performed.
///
/// This is the entry point for callers that fetch calendars concurrently:
/// gather every participant's outcome first, then hand the results over.
pub fn availability_from_lookups<I, K>(
    lookups: I,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Result<Availability>
where
    I: IntoIterator<Item = (K, std::result::Result<Vec<Interval>, Unavailable>)>,
    K: Into<ParticipantId>,
{
    validate_window(window_start, window_end)?;

    let mut counted = Vec::new();
    let mut missing = Vec::new();
    let mut free_sets = Vec::new();

    for (participant, lookup) in lookups {
        let participant: ParticipantId = participant.into();
        match lookup {
            Ok(busy) => {
                validate_intervals(&format!("busy[{}]", participant), &busy)?;
                let free = invert_busy_to_free(&busy, window_start, window_end);
                tracing::debug!(
                    participant = %participant,
                    busy = busy.len(),
                    free = free.len(),
                    "participant availability"
                );
                free_sets.push(free);
                counted.push(participant);
            }
            Err(reason) => {
                tracing::warn!(participant = %participant, %reason, "participant missing");
                missing.push(MissingParticipant {
                    participant,
                    reason,
                });
            }
        }
    }

    let free = intersect_all(&free_sets);
    tracing::debug!(
        counted = counted.len(),
        missing = missing.len(),
        free = free.len(),
        "intersected availability"
    );

    Ok(Availability {
        free,
        counted,
        missing,
        window_start,
        window_end,
    })
}

/// Look up every participant through `provider` and intersect their free time.
///
/// # Errors
/// Same as [`intersect_free_busy`]. Provider failures are never errors; they
/// show up in [`Availability::missing`].
pub fn collect_availability<P: FreeBusyProvider + ?Sized>(
    participants: &[ParticipantId],
    provider: &P,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Result<Availability> {
    validate_window(window_start, window_end)?;

    let lookups = participants.iter().map(|participant| {
        (
            participant.clone(),
            provider.busy(participant, window_start, window_end),
        )
    });

    availability_from_lookups(lookups, window_start, window_end)
}
