//! Simulation Calendar Types
//!
//! Simulation time is an absolute hour counter. Dates (year, season, day) are
//! derived from it and render in the human-readable form used across logs.
//!
//! # Example
//!
//! ```
//! use pact_events::{Season, SimDate, SimTime};
//!
//! let now = SimTime::from_date(SimDate::new(1, Season::Summer, 15));
//! assert_eq!(now.day_of_year(), 45);
//! assert_eq!(now.date().to_string(), "year_1.summer.day_15");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Number of hours in a simulated day.
pub const HOURS_PER_DAY: u64 = 24;

/// Number of days in each season.
pub const DAYS_PER_SEASON: u8 = 30;

/// Number of days in a simulated year (four seasons).
pub const DAYS_PER_YEAR: u32 = DAYS_PER_SEASON as u32 * 4;

/// Length of the pruning week in days.
pub const DAYS_PER_WEEK: u64 = 7;

/// Season of the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Returns the next season in order.
    pub fn next(self) -> Self {
        match self {
            Season::Spring => Season::Summer,
            Season::Summer => Season::Autumn,
            Season::Autumn => Season::Winter,
            Season::Winter => Season::Spring,
        }
    }

    /// Returns true if this is the last season of the year.
    pub fn is_year_end(self) -> bool {
        matches!(self, Season::Winter)
    }

    /// Zero-based position of the season within the year.
    pub fn index(self) -> u32 {
        match self {
            Season::Spring => 0,
            Season::Summer => 1,
            Season::Autumn => 2,
            Season::Winter => 3,
        }
    }

    fn from_index(index: u32) -> Self {
        match index % 4 {
            0 => Season::Spring,
            1 => Season::Summer,
            2 => Season::Autumn,
            _ => Season::Winter,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Spring => write!(f, "spring"),
            Season::Summer => write!(f, "summer"),
            Season::Autumn => write!(f, "autumn"),
            Season::Winter => write!(f, "winter"),
        }
    }
}

impl FromStr for Season {
    type Err = ParseDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "autumn" => Ok(Season::Autumn),
            "winter" => Ok(Season::Winter),
            _ => Err(ParseDateError::InvalidSeason(s.to_string())),
        }
    }
}

/// Human-readable simulation date.
///
/// Serializes to strings like "year_3.winter.day_12".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimDate {
    pub year: u32,
    pub season: Season,
    pub day: u8,
}

impl SimDate {
    /// Creates a new SimDate.
    pub fn new(year: u32, season: Season, day: u8) -> Self {
        Self { year, season, day }
    }

    /// Creates a SimDate for the start of the simulation.
    pub fn start() -> Self {
        Self {
            year: 1,
            season: Season::Spring,
            day: 1,
        }
    }

    /// Builds the date for a zero-based absolute day index.
    pub fn from_day_index(index: u64) -> Self {
        let year = (index / DAYS_PER_YEAR as u64) as u32 + 1;
        let day_in_year = (index % DAYS_PER_YEAR as u64) as u32;
        let season = Season::from_index(day_in_year / DAYS_PER_SEASON as u32);
        let day = (day_in_year % DAYS_PER_SEASON as u32) as u8 + 1;
        Self { year, season, day }
    }

    /// Zero-based absolute day index since the start of the simulation.
    pub fn day_index(&self) -> u64 {
        let years = self.year.saturating_sub(1) as u64;
        years * DAYS_PER_YEAR as u64 + (self.day_of_year() as u64 - 1)
    }

    /// One-based day within the year (1..=DAYS_PER_YEAR).
    pub fn day_of_year(&self) -> u32 {
        self.season.index() * DAYS_PER_SEASON as u32 + self.day.max(1) as u32
    }

    /// Advances the date by one day, handling season and year rollovers.
    pub fn advance_day(&mut self) {
        self.day += 1;
        if self.day > DAYS_PER_SEASON {
            self.day = 1;
            let was_year_end = self.season.is_year_end();
            self.season = self.season.next();
            if was_year_end {
                self.year += 1;
            }
        }
    }
}

impl fmt::Display for SimDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "year_{}.{}.day_{}", self.year, self.season, self.day)
    }
}

/// Error type for parsing SimDate from strings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseDateError {
    #[error("invalid date format: '{0}', expected 'year_N.season.day_M'")]
    InvalidFormat(String),
    #[error("invalid year: '{0}'")]
    InvalidYear(String),
    #[error("invalid season: '{0}'")]
    InvalidSeason(String),
    #[error("invalid day: '{0}'")]
    InvalidDay(String),
}

impl FromStr for SimDate {
    type Err = ParseDateError;

    /// Parses a SimDate from a string like "year_3.winter.day_12".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        let [year_part, season_part, day_part] = parts.as_slice() else {
            return Err(ParseDateError::InvalidFormat(s.to_string()));
        };

        let year = year_part
            .strip_prefix("year_")
            .ok_or_else(|| ParseDateError::InvalidFormat(s.to_string()))?
            .parse::<u32>()
            .map_err(|_| ParseDateError::InvalidYear(year_part.to_string()))?;

        let season = season_part.parse::<Season>()?;

        let day = day_part
            .strip_prefix("day_")
            .ok_or_else(|| ParseDateError::InvalidFormat(s.to_string()))?
            .parse::<u8>()
            .map_err(|_| ParseDateError::InvalidDay(day_part.to_string()))?;
        if day == 0 || day > DAYS_PER_SEASON {
            return Err(ParseDateError::InvalidDay(day_part.to_string()));
        }

        Ok(SimDate { year, season, day })
    }
}

// Serialize SimDate as a plain string
impl Serialize for SimDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SimDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A span of simulated time, in hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimDuration {
    hours: u64,
}

impl SimDuration {
    pub const ZERO: SimDuration = SimDuration { hours: 0 };

    pub fn from_hours(hours: u64) -> Self {
        Self { hours }
    }

    pub fn from_days(days: u64) -> Self {
        Self {
            hours: days * HOURS_PER_DAY,
        }
    }

    pub fn as_hours(&self) -> u64 {
        self.hours
    }

    /// Whole days contained in this duration.
    pub fn whole_days(&self) -> u64 {
        self.hours / HOURS_PER_DAY
    }
}

impl Add for SimDuration {
    type Output = SimDuration;

    fn add(self, rhs: SimDuration) -> SimDuration {
        SimDuration::from_hours(self.hours + rhs.hours)
    }
}

/// A point in simulation time.
///
/// Stored as hours since the first hour of year 1; serialized as that
/// integer so persisted expiries restore exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimTime {
    hours: u64,
}

impl SimTime {
    /// The first hour of the simulation.
    pub fn start() -> Self {
        Self { hours: 0 }
    }

    pub fn from_hours(hours: u64) -> Self {
        Self { hours }
    }

    /// The first hour of the given date.
    pub fn from_date(date: SimDate) -> Self {
        Self {
            hours: date.day_index() * HOURS_PER_DAY,
        }
    }

    pub fn hours(&self) -> u64 {
        self.hours
    }

    /// Zero-based absolute day index.
    pub fn day_index(&self) -> u64 {
        self.hours / HOURS_PER_DAY
    }

    pub fn hour_of_day(&self) -> u64 {
        self.hours % HOURS_PER_DAY
    }

    pub fn date(&self) -> SimDate {
        SimDate::from_day_index(self.day_index())
    }

    pub fn year(&self) -> u32 {
        self.date().year
    }

    pub fn season(&self) -> Season {
        self.date().season
    }

    pub fn day_of_year(&self) -> u32 {
        self.date().day_of_year()
    }

    /// The instant `hours` hours after this one.
    pub fn hours_from_now(&self, hours: u64) -> SimTime {
        SimTime::from_hours(self.hours + hours)
    }

    /// The instant `days` days after this one.
    pub fn days_from_now(&self, days: u64) -> SimTime {
        *self + SimDuration::from_days(days)
    }

    /// Time elapsed since `earlier`; zero if `earlier` lies in the future.
    pub fn since(&self, earlier: SimTime) -> SimDuration {
        SimDuration::from_hours(self.hours.saturating_sub(earlier.hours))
    }

    /// True on the first day of every pruning week.
    pub fn is_week_boundary(&self) -> bool {
        self.day_index() % DAYS_PER_WEEK == 0
    }

    /// Moves to the same hour of the next day.
    pub fn advance_day(&mut self) {
        self.hours += HOURS_PER_DAY;
    }
}

impl Add<SimDuration> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimDuration) -> SimTime {
        SimTime::from_hours(self.hours + rhs.as_hours())
    }
}

impl Sub<SimDuration> for SimTime {
    type Output = SimTime;

    fn sub(self, rhs: SimDuration) -> SimTime {
        SimTime::from_hours(self.hours.saturating_sub(rhs.as_hours()))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:02}:00", self.date(), self.hour_of_day())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_parse() {
        assert_eq!("spring".parse::<Season>().unwrap(), Season::Spring);
        assert_eq!("AUTUMN".parse::<Season>().unwrap(), Season::Autumn);
        assert!("monsoon".parse::<Season>().is_err());
    }

    #[test]
    fn test_sim_date_roundtrip() {
        let original = SimDate::new(5, Season::Summer, 15);
        let parsed: SimDate = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_day_of_year() {
        assert_eq!(SimDate::new(1, Season::Spring, 1).day_of_year(), 1);
        assert_eq!(SimDate::new(1, Season::Summer, 15).day_of_year(), 45);
        assert_eq!(SimDate::new(2, Season::Winter, 30).day_of_year(), DAYS_PER_YEAR);
    }

    #[test]
    fn test_day_index_matches_advance_day() {
        let mut date = SimDate::start();
        for index in 0..(DAYS_PER_YEAR as u64 * 2 + 7) {
            assert_eq!(date.day_index(), index);
            assert_eq!(SimDate::from_day_index(index), date);
            date.advance_day();
        }
    }

    #[test]
    fn test_sim_date_year_rollover() {
        let mut date = SimDate::new(1, Season::Winter, 30);
        date.advance_day();
        assert_eq!(date, SimDate::new(2, Season::Spring, 1));
    }

    #[test]
    fn test_parse_date_error() {
        assert!("invalid".parse::<SimDate>().is_err());
        assert!("year_one.spring.day_1".parse::<SimDate>().is_err());
        assert!("year_1.invalid.day_1".parse::<SimDate>().is_err());
        assert!("year_1.spring.day_0".parse::<SimDate>().is_err());
        assert!("year_1.spring.day_31".parse::<SimDate>().is_err());
    }

    #[test]
    fn test_sim_time_from_date() {
        let now = SimTime::from_date(SimDate::new(2, Season::Spring, 1));
        assert_eq!(now.day_index(), DAYS_PER_YEAR as u64);
        assert_eq!(now.year(), 2);
        assert_eq!(now.day_of_year(), 1);
        assert_eq!(now.hour_of_day(), 0);
    }

    #[test]
    fn test_duration_arithmetic() {
        let now = SimTime::start().hours_from_now(5);
        let later = now.days_from_now(2);
        assert_eq!(later.since(now), SimDuration::from_days(2));
        assert_eq!(now.since(later), SimDuration::ZERO);
        assert_eq!((later - SimDuration::from_hours(5)).hours(), 48);
        assert_eq!(SimDuration::from_hours(50).whole_days(), 2);
    }

    #[test]
    fn test_week_boundary() {
        assert!(SimTime::start().is_week_boundary());
        assert!(!SimTime::start().days_from_now(3).is_week_boundary());
        assert!(SimTime::start().days_from_now(14).is_week_boundary());
    }

    #[test]
    fn test_sim_time_serializes_as_hours() {
        let t = SimTime::from_hours(84729);
        assert_eq!(serde_json::to_string(&t).unwrap(), "84729");
        let parsed: SimTime = serde_json::from_str("84729").unwrap();
        assert_eq!(parsed, t);
    }

    #[test]
    fn test_sim_time_display() {
        let t = SimTime::from_date(SimDate::new(3, Season::Winter, 12)).hours_from_now(8);
        assert_eq!(t.to_string(), "year_3.winter.day_12 08:00");
    }
}
