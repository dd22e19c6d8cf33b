//! # Date and time menu
//! Shows the clock, or lets the operator type a new date and time into a
//! `YYYY/MM/DD HH:MM` field. The field accepts any digit; the date is only
//! checked against the calendar on OK, and a rejected date has to be
//! acknowledged before the field is offered again.

use crate::config::FALLBACK_DATETIME;
use crate::datetime::DateTime;
use crate::digit_editor::{DATE_TIME, EditSession};
use crate::error::ClockError;
use crate::event::{Button, InputFrame};
use crate::lcd::{line, show, show_editing};
use crate::navigation::{Flow, Menu, once_released};
use crate::traits::{Clock, TextDisplay};

/// Digits of `datetime` in the `YYYY/MM/DD HH:MM` layout.
#[allow(clippy::cast_possible_truncation)]
pub const fn to_digits(datetime: &DateTime) -> [u8; 16] {
    let y = datetime.year;
    [
        (y / 1000 % 10) as u8,
        (y / 100 % 10) as u8,
        (y / 10 % 10) as u8,
        (y % 10) as u8,
        0,
        datetime.month / 10,
        datetime.month % 10,
        0,
        datetime.day / 10,
        datetime.day % 10,
        0,
        datetime.hour / 10,
        datetime.hour % 10,
        0,
        datetime.minute / 10,
        datetime.minute % 10,
    ]
}

/// The candidate typed into the field, seconds set to 0. Not validated.
pub const fn from_digits(d: &[u8; 16]) -> DateTime {
    DateTime::new(
        d[0] as u16 * 1000 + d[1] as u16 * 100 + d[2] as u16 * 10 + d[3] as u16,
        d[5] * 10 + d[6],
        d[8] * 10 + d[9],
        d[11] * 10 + d[12],
        d[14] * 10 + d[15],
        0,
    )
}

/// Shows the running clock.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTimeView;

impl DateTimeView {
    /// Back leaves.
    pub fn step(self, input: &InputFrame) -> Flow {
        if input.first_press() == Some(Button::Back) {
            Flow::Exit(Menu::ViewDateTime)
        } else {
            Flow::Stay
        }
    }

    /// Draws `now`, called again every second.
    pub fn render<D: TextDisplay>(self, now: Result<DateTime, ClockError>, display: &mut D) {
        match now {
            Ok(now) => show(
                display,
                &line(format_args!("Date:{:02}/{:02}/{}", now.day, now.month, now.year)),
                &line(format_args!(
                    "Time:{:02}:{:02}:{:02}",
                    now.hour, now.minute, now.second
                )),
            ),
            Err(_) => show(display, "Clock error", ""),
        }
    }
}

/// The set date and time wizard.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetDateTime {
    /// Editing the field
    Entry(EditSession<16>),
    /// Clock written, waiting for OK to be released
    AwaitCommitRelease {
        /// Whether the clock accepted the value
        adjusted: bool,
    },
    /// The clock was set
    Adjusted,
    /// The clock refused the value
    AdjustFailed,
    /// Invalid date, waiting for OK to be released
    AwaitRejectRelease,
    /// Invalid date, waiting for an OK to start over
    Rejected,
}

impl SetDateTime {
    /// Opens the field seeded from the clock. A clock that cannot be read
    /// seeds the fallback date.
    pub fn snapshot<C: Clock>(clock: &mut C) -> Self {
        let now = clock.now().unwrap_or_else(|e| {
            warn!("Clock unreadable, seeding the fallback date: {:?}", e);
            FALLBACK_DATETIME
        });
        Self::Entry(EditSession::new(DATE_TIME, to_digits(&now)))
    }

    /// Advances the wizard by one tick.
    pub fn step<C: Clock>(&mut self, input: &InputFrame, clock: &mut C) -> Flow {
        let press = input.first_press();
        *self = match (*self, press) {
            (Self::Entry(_), Some(Button::Back)) => return Flow::Exit(Menu::DateTime),
            (Self::Entry(session), Some(Button::Ok)) => {
                let candidate = from_digits(session.digits());
                if candidate.is_valid() {
                    let adjusted = match clock.adjust(&candidate) {
                        Ok(()) => {
                            info!("Clock set to {:?}", candidate);
                            true
                        }
                        Err(e) => {
                            error!("Failed to set the clock: {:?}", e);
                            false
                        }
                    };
                    once_released(
                        input,
                        Self::AwaitCommitRelease { adjusted },
                        Self::finished(adjusted),
                    )
                } else {
                    warn!("Rejected date {:?}", candidate);
                    once_released(input, Self::AwaitRejectRelease, Self::Rejected)
                }
            }
            (Self::Entry(mut session), Some(button)) => {
                session.handle(button);
                Self::Entry(session)
            }
            (Self::AwaitCommitRelease { adjusted }, _) if input.fell(Button::Ok) => {
                Self::finished(adjusted)
            }
            (Self::AwaitRejectRelease, _) if input.fell(Button::Ok) => Self::Rejected,
            (Self::Rejected, Some(Button::Ok)) => Self::snapshot(clock),
            (state, _) => state,
        };
        Flow::Stay
    }

    /// Terminal state after writing the clock.
    const fn finished(adjusted: bool) -> Self {
        if adjusted {
            Self::Adjusted
        } else {
            Self::AdjustFailed
        }
    }

    /// Draws the current step. Release waits keep the previous screen.
    pub fn render<D: TextDisplay>(&self, display: &mut D) {
        match self {
            Self::Entry(session) => show_editing(
                display,
                "Set DATE & TIME",
                &session.text(),
                session.cursor(),
            ),
            Self::Adjusted => show(display, "New time set", "Going to idle"),
            Self::AdjustFailed => show(display, "Clock error", "Going to idle"),
            Self::Rejected => show(display, "Wrong datetime", "Press OK"),
            Self::AwaitCommitRelease { .. } | Self::AwaitRejectRelease => {}
        }
    }
}
