use std::fmt::{Display, Formatter};

use time::{Date, Duration, Weekday};

use crate::FitbookUtilsError;

/// Weekday of a recurring availability template.
///
/// The numbering follows the calendar widgets of the booking screens:
/// 0 is Sunday and 6 is Saturday.
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Hash)]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    pub fn to_number(&self) -> u8 {
        match self {
            DayOfWeek::Sunday => 0,
            DayOfWeek::Monday => 1,
            DayOfWeek::Tuesday => 2,
            DayOfWeek::Wednesday => 3,
            DayOfWeek::Thursday => 4,
            DayOfWeek::Friday => 5,
            DayOfWeek::Saturday => 6,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            0 => Some(DayOfWeek::Sunday),
            1 => Some(DayOfWeek::Monday),
            2 => Some(DayOfWeek::Tuesday),
            3 => Some(DayOfWeek::Wednesday),
            4 => Some(DayOfWeek::Thursday),
            5 => Some(DayOfWeek::Friday),
            6 => Some(DayOfWeek::Saturday),
            _ => None,
        }
    }

    pub fn try_from_number(number: u8) -> Result<Self, FitbookUtilsError> {
        Self::from_number(number).ok_or(FitbookUtilsError::InvalidDayOfWeek(number))
    }

    pub fn of_date(date: Date) -> Self {
        date.weekday().into()
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Monday => Self::Monday,
            Weekday::Tuesday => Self::Tuesday,
            Weekday::Wednesday => Self::Wednesday,
            Weekday::Thursday => Self::Thursday,
            Weekday::Friday => Self::Friday,
            Weekday::Saturday => Self::Saturday,
            Weekday::Sunday => Self::Sunday,
        }
    }
}
impl From<DayOfWeek> for Weekday {
    fn from(day_of_week: DayOfWeek) -> Self {
        match day_of_week {
            DayOfWeek::Monday => Self::Monday,
            DayOfWeek::Tuesday => Self::Tuesday,
            DayOfWeek::Wednesday => Self::Wednesday,
            DayOfWeek::Thursday => Self::Thursday,
            DayOfWeek::Friday => Self::Friday,
            DayOfWeek::Saturday => Self::Saturday,
            DayOfWeek::Sunday => Self::Sunday,
        }
    }
}

impl Display for DayOfWeek {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DayOfWeek::Sunday => "Sunday",
                DayOfWeek::Monday => "Monday",
                DayOfWeek::Tuesday => "Tuesday",
                DayOfWeek::Wednesday => "Wednesday",
                DayOfWeek::Thursday => "Thursday",
                DayOfWeek::Friday => "Friday",
                DayOfWeek::Saturday => "Saturday",
            }
        )
    }
}

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Self {
        Self { start, end }
    }

    /// The seven days starting at `week_start`.
    pub fn week_from(week_start: Date) -> Result<Self, FitbookUtilsError> {
        let end = week_start
            .checked_add(Duration::days(6))
            .ok_or(FitbookUtilsError::DateOutOfRange)?;
        Ok(Self::new(week_start, end))
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Number of days in the range, zero if `end` lies before `start`.
    pub fn len(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            ((self.end - self.start).whole_days() + 1) as u32
        }
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn iter(&self) -> DateRangeIterator {
        DateRangeIterator {
            current: Some(self.start),
            end: self.end,
        }
    }
}

impl IntoIterator for &DateRange {
    type Item = Date;
    type IntoIter = DateRangeIterator;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct DateRangeIterator {
    current: Option<Date>,
    end: Date,
}

impl Iterator for DateRangeIterator {
    type Item = Date;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        if current > self.end {
            self.current = None;
            return None;
        }
        self.current = current.next_day();
        Some(current)
    }
}
