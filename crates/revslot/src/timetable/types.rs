/// Types for parsed timetable data
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::TimetableError;

static TIME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01][0-9]|2[0-3]):([0-5][0-9])$").unwrap());

/// A weekday of the teaching week, in timetable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "MON")]
    Mon,
    #[serde(rename = "TUE")]
    Tue,
    #[serde(rename = "WED")]
    Wed,
    #[serde(rename = "THU")]
    Thu,
    #[serde(rename = "FRI")]
    Fri,
}

impl Weekday {
    /// The five teaching days in the order their rows appear in the grid.
    pub const ALL: [Weekday; 5] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];

    /// Returns the three-letter day code used on the wire and in the store.
    pub fn code(&self) -> &'static str {
        match self {
            Weekday::Mon => "MON",
            Weekday::Tue => "TUE",
            Weekday::Wed => "WED",
            Weekday::Thu => "THU",
            Weekday::Fri => "FRI",
        }
    }

    /// Parses a three-letter day code.
    pub fn from_code(code: &str) -> Option<Weekday> {
        match code {
            "MON" => Some(Weekday::Mon),
            "TUE" => Some(Weekday::Tue),
            "WED" => Some(Weekday::Wed),
            "THU" => Some(Weekday::Thu),
            "FRI" => Some(Weekday::Fri),
            _ => None,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A wall-clock time within one day, stored as minutes since midnight.
///
/// Serializes as zero-padded `HH:MM`, which keeps the numeric ordering here
/// identical to the lexicographic ordering the wire format has always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Builds a time from raw minutes since midnight.
    ///
    /// Callers are expected to stay within a single day; values are taken
    /// modulo 24 hours.
    pub const fn from_minutes(minutes: u16) -> Self {
        TimeOfDay(minutes % (24 * 60))
    }

    /// Returns minutes since midnight.
    pub fn minutes(&self) -> u16 {
        self.0
    }

    /// Returns this time shifted forward by `minutes`, if it stays within
    /// the same day.
    pub fn checked_add_minutes(&self, minutes: u16) -> Option<TimeOfDay> {
        let total = self.0.checked_add(minutes)?;
        if total >= 24 * 60 {
            return None;
        }
        Some(TimeOfDay(total))
    }
}

impl FromStr for TimeOfDay {
    type Err = TimetableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = TIME_REGEX.captures(s).ok_or_else(|| TimetableError::BadTime {
            value: s.to_string(),
            row: String::new(),
        })?;
        // Both captures are guaranteed two-digit numbers by the regex.
        let hours: u16 = caps[1].parse().unwrap();
        let minutes: u16 = caps[2].parse().unwrap();
        Ok(TimeOfDay(hours * 60 + minutes))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// The start/end boundary of one theory or lab period column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTiming {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

/// A contiguous bookable-candidate interval, before or after
/// duration-splitting.
///
/// `code` carries the theory class label occupying the period, if any; it is
/// diagnostic only and never gates candidacy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeSlot {
    pub day: Weekday,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub code: Option<String>,
}

impl fmt::Display for FreeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {} - {}", self.day, self.start, self.end)
    }
}

/// Per-day free slots derived from one parsed timetable.
///
/// Built fresh per parse and never persisted as a grid; only derived
/// candidate slots go to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    days: BTreeMap<Weekday, Vec<FreeSlot>>,
}

impl Schedule {
    pub(super) fn new(days: BTreeMap<Weekday, Vec<FreeSlot>>) -> Self {
        Schedule { days }
    }

    /// Returns the free slots for one day, sorted by start time.
    pub fn day(&self, day: Weekday) -> &[FreeSlot] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Flattens the per-day map into one list in weekday order.
    ///
    /// Every entry carries its own day stamp, so callers can consume either
    /// the grouped or the flat view.
    pub fn all_free_slots(&self) -> Vec<FreeSlot> {
        self.days.values().flatten().cloned().collect()
    }

    /// Total number of free slots across the week.
    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.values().all(Vec::is_empty)
    }
}
