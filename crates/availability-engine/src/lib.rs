//! # availability-engine
//!
//! Deterministic mutual-availability computation and meeting-slot proposal.
//!
//! The engine takes busy intervals that were already fetched for each
//! participant, turns them into free time, intersects the free time across
//! participants, and discretizes the result into concrete meeting slots in a
//! target timezone's civil calendar. It performs no I/O and keeps no state.
//!
//! ## Modules
//!
//! - [`interval`] — Half-open interval algebra: normalize, invert, intersect
//! - [`zone`] — Per-instant offset resolution and civil dates/weekdays
//! - [`dst`] — DST gap policies for slot anchors
//! - [`policy`] — Slot policy and generation modes (anchored, continuous)
//! - [`slots`] — Free time → ordered, capped slot proposals
//! - [`participants`] — Per-participant lookups, missing participants, intersection
//! - [`meeting`] — One-call scheduling for a stored meeting
//! - [`error`] — Error types

pub mod dst;
pub mod error;
pub mod interval;
pub mod meeting;
pub mod participants;
pub mod policy;
pub mod slots;
pub mod zone;

pub use dst::DstPolicy;
pub use error::EngineError;
pub use interval::{intersect_intervals, invert_busy_to_free, normalize, Interval};
pub use meeting::{schedule_meeting, MeetingRequest, Proposal};
pub use participants::{
    availability_from_lookups, collect_availability, intersect_free_busy, Availability,
    FreeBusyProvider, MissingParticipant, ParticipantId, Unavailable,
};
pub use policy::{Anchor, GenerationMode, SlotPolicy};
pub use slots::{propose_slots, propose_slots_in, Slot};
pub use zone::{parse_timezone, OffsetProvider};
