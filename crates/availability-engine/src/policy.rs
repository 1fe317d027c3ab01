//! Slot policy: how free time is discretized into proposed meetings.
//!
//! A policy is plain data and deserializes from JSON with every field
//! optional, falling back to the defaults below.

use chrono::Weekday;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::DstPolicy;
use crate::error::{EngineError, Result};
use crate::zone::parse_timezone;

pub const DEFAULT_DURATION_MINUTES: i64 = 60;
pub const DEFAULT_STEP_MINUTES: i64 = 30;
pub const DEFAULT_RESULT_LIMIT: usize = 10;
pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

/// A fixed local weekday and time at which a slot may start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    pub weekday: Weekday,
    pub hour: u32,
    #[serde(default)]
    pub minute: u32,
}

impl Anchor {
    pub fn new(weekday: Weekday, hour: u32) -> Self {
        Self {
            weekday,
            hour,
            minute: 0,
        }
    }

    pub fn at(weekday: Weekday, hour: u32, minute: u32) -> Self {
        Self {
            weekday,
            hour,
            minute,
        }
    }
}

/// Friday 17:00, Saturday 10:00 and Saturday 17:00.
pub fn default_anchors() -> Vec<Anchor> {
    vec![
        Anchor::new(Weekday::Fri, 17),
        Anchor::new(Weekday::Sat, 10),
        Anchor::new(Weekday::Sat, 17),
    ]
}

pub fn all_weekdays() -> Vec<Weekday> {
    vec![
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
}

/// Which candidate start times the generator considers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationMode {
    /// Only the listed local weekday/time anchors.
    Anchored { anchors: Vec<Anchor> },
    /// Every `step_minutes` from the start of each free interval, on allowed days.
    Continuous {
        step_minutes: i64,
        #[serde(default = "all_weekdays")]
        allowed_days: Vec<Weekday>,
    },
}

impl Default for GenerationMode {
    fn default() -> Self {
        GenerationMode::Anchored {
            anchors: default_anchors(),
        }
    }
}

impl GenerationMode {
    /// Continuous scan over every weekday at the default 30-minute step.
    pub fn continuous_default() -> Self {
        GenerationMode::Continuous {
            step_minutes: DEFAULT_STEP_MINUTES,
            allowed_days: all_weekdays(),
        }
    }
}

/// Everything the slot generator needs besides the free intervals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotPolicy {
    /// Length of each proposed slot.
    pub duration_minutes: i64,
    /// IANA timezone whose civil calendar anchors and weekdays are evaluated in.
    pub timezone: String,
    pub mode: GenerationMode,
    /// Maximum number of slots returned, applied after ordering.
    pub result_limit: usize,
    /// Resolution of anchors that land in a spring-forward gap.
    pub dst_policy: DstPolicy,
}

impl Default for SlotPolicy {
    fn default() -> Self {
        Self {
            duration_minutes: DEFAULT_DURATION_MINUTES,
            timezone: DEFAULT_TIMEZONE.to_string(),
            mode: GenerationMode::default(),
            result_limit: DEFAULT_RESULT_LIMIT,
            dst_policy: DstPolicy::default(),
        }
    }
}

impl SlotPolicy {
    pub fn anchored(duration_minutes: i64, timezone: &str, anchors: Vec<Anchor>) -> Self {
        Self {
            duration_minutes,
            timezone: timezone.to_string(),
            mode: GenerationMode::Anchored { anchors },
            ..Self::default()
        }
    }

    pub fn continuous(
        duration_minutes: i64,
        timezone: &str,
        step_minutes: i64,
        allowed_days: Vec<Weekday>,
    ) -> Self {
        Self {
            duration_minutes,
            timezone: timezone.to_string(),
            mode: GenerationMode::Continuous {
                step_minutes,
                allowed_days,
            },
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, result_limit: usize) -> Self {
        self.result_limit = result_limit;
        self
    }

    pub fn with_dst_policy(mut self, dst_policy: DstPolicy) -> Self {
        self.dst_policy = dst_policy;
        self
    }

    /// Check every field and return the parsed timezone.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidPolicy` naming the first offending field, or
    /// `EngineError::InvalidTimezone` if `timezone` is not a known IANA zone.
    pub fn validate(&self) -> Result<Tz> {
        if self.duration_minutes <= 0 {
            return Err(EngineError::InvalidPolicy {
                field: "duration_minutes",
                reason: format!("must be positive, got {}", self.duration_minutes),
            });
        }

        match &self.mode {
            GenerationMode::Anchored { anchors } => {
                for anchor in anchors {
                    if anchor.hour > 23 {
                        return Err(EngineError::InvalidPolicy {
                            field: "anchors.hour",
                            reason: format!("must be 0-23, got {}", anchor.hour),
                        });
                    }
                    if anchor.minute > 59 {
                        return Err(EngineError::InvalidPolicy {
                            field: "anchors.minute",
                            reason: format!("must be 0-59, got {}", anchor.minute),
                        });
                    }
                }
            }
            GenerationMode::Continuous { step_minutes, .. } => {
                if *step_minutes <= 0 {
                    return Err(EngineError::InvalidPolicy {
                        field: "step_minutes",
                        reason: format!("must be positive, got {}", step_minutes),
                    });
                }
            }
        }

        parse_timezone(&self.timezone)
    }
}
