use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reserved pseudo-room marking the blocked lunch period.
pub const LUNCH_ROOM: &str = "LUNCH";
/// Subject label carried by the lunch marker.
pub const LUNCH_SUBJECT: &str = "Lunch Break";

/// Teaching day of the week. Only Monday through Friday are schedulable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Day {
    pub const ALL: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Day> for Weekday {
    fn from(day: Day) -> Self {
        match day {
            Day::Monday => Weekday::Mon,
            Day::Tuesday => Weekday::Tue,
            Day::Wednesday => Weekday::Wed,
            Day::Thursday => Weekday::Thu,
            Day::Friday => Weekday::Fri,
        }
    }
}

impl TryFrom<Weekday> for Day {
    type Error = UnknownDay;

    fn try_from(weekday: Weekday) -> Result<Self, Self::Error> {
        match weekday {
            Weekday::Mon => Ok(Day::Monday),
            Weekday::Tue => Ok(Day::Tuesday),
            Weekday::Wed => Ok(Day::Wednesday),
            Weekday::Thu => Ok(Day::Thursday),
            Weekday::Fri => Ok(Day::Friday),
            other => Err(UnknownDay(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a teaching day (expected Monday to Friday)")]
pub struct UnknownDay(pub String);

impl FromStr for Day {
    type Err = UnknownDay;

    /// Accepts full or abbreviated weekday names in any case ("Monday", "mon", "TUE").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let weekday = s
            .trim()
            .parse::<Weekday>()
            .map_err(|_| UnknownDay(s.to_string()))?;
        Day::try_from(weekday).map_err(|_| UnknownDay(s.to_string()))
    }
}

/// One class occupying a room: what is taught and by whom.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassInfo {
    pub subject: String,
    pub faculty: String,
}

impl ClassInfo {
    pub fn new(subject: impl Into<String>, faculty: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            faculty: faculty.into(),
        }
    }

    pub fn lunch() -> Self {
        Self::new(LUNCH_SUBJECT, "")
    }

    pub fn is_lunch_marker(&self) -> bool {
        self.subject == LUNCH_SUBJECT && self.faculty.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_and_short_day_names() {
        assert_eq!("Monday".parse::<Day>().unwrap(), Day::Monday);
        assert_eq!("wed".parse::<Day>().unwrap(), Day::Wednesday);
        assert_eq!(" FRIDAY ".parse::<Day>().unwrap(), Day::Friday);
    }

    #[test]
    fn rejects_weekend_and_garbage() {
        assert!("Saturday".parse::<Day>().is_err());
        assert!("Funday".parse::<Day>().is_err());
    }

    #[test]
    fn day_indices_follow_week_order() {
        for (idx, day) in Day::ALL.iter().enumerate() {
            assert_eq!(day.index(), idx);
            assert_eq!(Day::from_index(idx), Some(*day));
        }
        assert_eq!(Day::from_index(5), None);
    }
}
