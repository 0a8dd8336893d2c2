use std::fmt::{Display, Formatter};

use time::{Duration, Time};

use crate::FitbookUtilsError;

const MINUTES_PER_DAY: i64 = 24 * 60;

fn minute_of_day(time: Time) -> i64 {
    time.hour() as i64 * 60 + time.minute() as i64
}

fn time_at_minute(minute: i64) -> Time {
    Time::MIDNIGHT + Duration::minutes(minute.rem_euclid(MINUTES_PER_DAY))
}

/// Adds minutes to a clock value, wrapping around midnight.
///
/// Seconds are dropped, the result never rolls into another date.
pub fn add_minutes(time: Time, minutes: i64) -> Time {
    time_at_minute(minute_of_day(time) + minutes)
}

/// Half-open window `[from, to)` on the local clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeWindow {
    pub from: Time,
    pub to: Time,
}

impl TimeWindow {
    pub fn new(from: Time, to: Time) -> Result<Self, FitbookUtilsError> {
        if from >= to {
            return Err(FitbookUtilsError::TimeOrderWrong(from, to));
        }
        Ok(Self { from, to })
    }

    pub fn duration_minutes(&self) -> i64 {
        minute_of_day(self.to) - minute_of_day(self.from)
    }

    pub fn intersects(&self, other: &TimeWindow) -> bool {
        self.from < other.to && other.from < self.to
    }

    pub fn contains(&self, other: &TimeWindow) -> bool {
        self.from <= other.from && other.to <= self.to
    }
}

impl Display for TimeWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.from.hour(),
            self.from.minute(),
            self.to.hour(),
            self.to.minute()
        )
    }
}

/// Tiling of a declared window into fixed-size sub-slots.
///
/// The range itself is a plain value: every call to [`SlotRange::iter`]
/// starts again from the beginning. A trailing remainder shorter than the
/// slot duration is not emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRange {
    window: TimeWindow,
    slot_duration_minutes: u16,
}

impl SlotRange {
    pub fn new(
        from: Time,
        to: Time,
        slot_duration_minutes: u16,
    ) -> Result<Self, FitbookUtilsError> {
        if slot_duration_minutes == 0 {
            return Err(FitbookUtilsError::ZeroSlotDuration);
        }
        Ok(Self {
            window: TimeWindow::new(from, to)?,
            slot_duration_minutes,
        })
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn slot_duration_minutes(&self) -> u16 {
        self.slot_duration_minutes
    }

    pub fn iter(&self) -> SlotRangeIterator {
        SlotRangeIterator {
            cursor: minute_of_day(self.window.from),
            end: minute_of_day(self.window.to),
            step: self.slot_duration_minutes as i64,
        }
    }
}

impl IntoIterator for &SlotRange {
    type Item = TimeWindow;
    type IntoIter = SlotRangeIterator;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct SlotRangeIterator {
    cursor: i64,
    end: i64,
    step: i64,
}

impl Iterator for SlotRangeIterator {
    type Item = TimeWindow;

    fn next(&mut self) -> Option<Self::Item> {
        let slot_end = self.cursor + self.step;
        if slot_end > self.end {
            return None;
        }
        let window = TimeWindow {
            from: time_at_minute(self.cursor),
            to: time_at_minute(slot_end),
        };
        self.cursor = slot_end;
        Some(window)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = ((self.end - self.cursor).max(0) / self.step) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SlotRangeIterator {}

/// Splits `[from, to)` into sub-slots of `slot_duration_minutes`.
pub fn range_to_slots(
    from: Time,
    to: Time,
    slot_duration_minutes: u16,
) -> Result<SlotRange, FitbookUtilsError> {
    SlotRange::new(from, to, slot_duration_minutes)
}
