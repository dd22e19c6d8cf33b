//! # Date and time
//! Calendar timestamp with second resolution, as read from and written to the
//! real time clock.

use crate::error::Error;
use core::fmt;

/// Earliest year the clock can hold.
pub const MIN_YEAR: u16 = 2000;

/// Latest year the clock can hold.
pub const MAX_YEAR: u16 = 2099;

/// A calendar timestamp. Constructing one with [`DateTime::new`] does not
/// validate, use [`DateTime::try_new`] or [`DateTime::is_valid`] for input
/// coming from the operator.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    /// 2000..=2099
    pub year: u16,
    /// 1..=12
    pub month: u8,
    /// 1..=31
    pub day: u8,
    /// 0..=23
    pub hour: u8,
    /// 0..=59
    pub minute: u8,
    /// 0..=59
    pub second: u8,
}

/// Day of the week, as the RTC stores it.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weekday {
    /// Sunday
    Sunday,
    /// Monday
    Monday,
    /// Tuesday
    Tuesday,
    /// Wednesday
    Wednesday,
    /// Thursday
    Thursday,
    /// Friday
    Friday,
    /// Saturday
    Saturday,
}

/// Whether `year` has a 29th of February.
pub const fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` of `year`, 0 for a month outside 1..=12.
pub const fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

impl DateTime {
    /// Creates a timestamp without validation.
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Creates a timestamp, rejecting anything outside the calendar.
    ///
    /// # Errors
    /// [`Error::InvalidDateTime`] if any field is out of range.
    pub const fn try_new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, Error> {
        let candidate = Self::new(year, month, day, hour, minute, second);
        if candidate.is_valid() {
            Ok(candidate)
        } else {
            Err(Error::InvalidDateTime)
        }
    }

    /// Checks the year range, the day count of the month including leap years,
    /// and the time of day.
    pub const fn is_valid(&self) -> bool {
        self.year >= MIN_YEAR
            && self.year <= MAX_YEAR
            && self.month >= 1
            && self.month <= 12
            && self.day >= 1
            && self.day <= days_in_month(self.year, self.month)
            && self.hour <= 23
            && self.minute <= 59
            && self.second <= 59
    }

    /// Time of day as `hour * 100 + minute`, the encoding the schedules use.
    pub const fn hhmm(&self) -> u16 {
        self.hour as u16 * 100 + self.minute as u16
    }

    /// Day of the week (Sakamoto's method), meaningful for valid dates only.
    pub const fn weekday(&self) -> Weekday {
        /// Month offsets of the method.
        const OFFSETS: [u16; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
        let month = if self.month >= 1 && self.month <= 12 {
            self.month
        } else {
            1
        };
        let year = if month < 3 {
            self.year.saturating_sub(1)
        } else {
            self.year
        };
        let index =
            (year + year / 4 - year / 100 + year / 400 + OFFSETS[month as usize - 1] + self.day as u16)
                % 7;
        match index {
            0 => Weekday::Sunday,
            1 => Weekday::Monday,
            2 => Weekday::Tuesday,
            3 => Weekday::Wednesday,
            4 => Weekday::Thursday,
            5 => Weekday::Friday,
            _ => Weekday::Saturday,
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}/{:02}/{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}
