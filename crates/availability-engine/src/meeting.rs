//! Meeting-level scheduling: provider lookups, intersection and slot generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dst::DstPolicy;
use crate::error::Result;
use crate::interval::Interval;
use crate::participants::{
    collect_availability, FreeBusyProvider, MissingParticipant, ParticipantId,
};
use crate::policy::{GenerationMode, SlotPolicy, DEFAULT_RESULT_LIMIT};
use crate::slots::{propose_slots, Slot};

/// Meeting metadata as stored by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRequest {
    pub duration_minutes: i64,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub timezone: String,
    pub participants: Vec<ParticipantId>,
    #[serde(default)]
    pub mode: GenerationMode,
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
    /// How anchors inside a spring-forward gap are placed.
    #[serde(default)]
    pub dst_policy: DstPolicy,
}

fn default_result_limit() -> usize {
    DEFAULT_RESULT_LIMIT
}

impl MeetingRequest {
    /// The slot policy implied by this meeting's settings.
    pub fn slot_policy(&self) -> SlotPolicy {
        SlotPolicy {
            duration_minutes: self.duration_minutes,
            timezone: self.timezone.clone(),
            mode: self.mode.clone(),
            result_limit: self.result_limit,
            dst_policy: self.dst_policy,
        }
    }
}

/// Proposed slots for a meeting, plus whoever could not be taken into account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub slots: Vec<Slot>,
    /// Shared free time the slots were drawn from.
    pub free: Vec<Interval>,
    pub missing: Vec<MissingParticipant>,
}

/// Schedule `meeting` against busy data from `provider`.
///
/// Participants the provider cannot serve are listed in `missing` and do not
/// constrain the slots. When nobody could be counted the proposal is empty.
///
/// # Errors
/// Returns an `EngineError` for an invalid window, malformed busy intervals or
/// an invalid slot policy (non-positive duration, unknown timezone, ...).
pub fn schedule_meeting<P: FreeBusyProvider + ?Sized>(
    meeting: &MeetingRequest,
    provider: &P,
) -> Result<Proposal> {
    let policy = meeting.slot_policy();
    policy.validate()?;

    let availability = collect_availability(
        &meeting.participants,
        provider,
        meeting.window_start,
        meeting.window_end,
    )?;

    let slots = propose_slots(&availability.free, &policy)?;

    Ok(Proposal {
        slots,
        free: availability.free,
        missing: availability.missing,
    })
}
