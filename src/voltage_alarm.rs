//! # Voltage alarm
//! One pair of thresholds forming a hysteresis band: at or below the ON
//! threshold the battery is charged, at or above the OFF threshold charging
//! stops, in between the relay keeps its state.
//!
//! The thresholds are not checked against each other. With ON above OFF the
//! band disappears and every reading switches the relay.

use crate::digit_editor::{EditSession, VOLTS};
use crate::event::{Button, InputFrame};
use crate::lcd::{line, show, show_editing};
use crate::navigation::{Flow, Menu, once_released};
use crate::persistence::Storage;
use crate::traits::{KeyValueStore, TextDisplay};
use core::fmt;

/// A voltage in tenths of a volt, 0.0..=99.9 V.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Tenths(u16);

impl Tenths {
    /// 0.0 V
    pub const ZERO: Self = Self(0);

    /// 99.9 V, the largest value the field can show.
    pub const MAX: Self = Self(999);

    /// Accepts `tenths` up to 999.
    pub const fn new(tenths: u16) -> Option<Self> {
        if tenths <= Self::MAX.0 {
            Some(Self(tenths))
        } else {
            None
        }
    }

    /// Like [`Tenths::new`], but clamps to 99.9 V.
    pub const fn saturating(tenths: u16) -> Self {
        if tenths <= Self::MAX.0 {
            Self(tenths)
        } else {
            Self::MAX
        }
    }

    /// The raw value.
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Digits in the `XX.X` layout, with 0 in the decimal point slot.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn digits(self) -> [u8; 4] {
        let v = self.0;
        [(v / 100) as u8, (v / 10 % 10) as u8, 0, (v % 10) as u8]
    }

    /// Re-encodes `XX.X` digits, ignoring the decimal point slot.
    pub const fn from_digits(digits: &[u8; 4]) -> Option<Self> {
        let [tens, ones, _, tenths] = *digits;
        if tens > 9 || ones > 9 || tenths > 9 {
            return None;
        }
        Self::new(tens as u16 * 100 + ones as u16 * 10 + tenths as u16)
    }
}

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{}", self.0 / 10, self.0 % 10)
    }
}

/// The committed thresholds.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThresholdPair {
    /// At or below: charge
    pub on: Tenths,
    /// At or above: stop charging
    pub off: Tenths,
    /// False until the thresholds were committed once
    pub active: bool,
}

impl ThresholdPair {
    /// Factory state: never configured.
    pub const UNSET: Self = Self {
        on: Tenths::ZERO,
        off: Tenths::ZERO,
        active: false,
    };

    /// The relay command for `reading`, `None` inside the band or while the
    /// thresholds were never set.
    pub fn evaluate(&self, reading: Tenths) -> Option<bool> {
        if !self.active {
            return None;
        }
        if reading <= self.on {
            Some(true)
        } else if reading >= self.off {
            Some(false)
        } else {
            None
        }
    }
}

/// Shows the thresholds and the latest reading.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoltageView;

impl VoltageView {
    /// Back leaves, nothing else to do.
    pub fn step(self, input: &InputFrame) -> Flow {
        if input.first_press() == Some(Button::Back) {
            Flow::Exit(Menu::ViewVoltAlarm)
        } else {
            Flow::Stay
        }
    }

    /// Draws thresholds and reading.
    pub fn render<D: TextDisplay>(self, thresholds: &ThresholdPair, reading: Tenths, display: &mut D) {
        show(
            display,
            &line(format_args!("ON {} OFF {}", thresholds.on, thresholds.off)),
            &line(format_args!("Voltage now:{reading}")),
        );
    }
}

/// The set-thresholds wizard. Back aborts at every edit step without touching
/// the committed thresholds.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetVoltage {
    /// Asking to continue
    Intro,
    /// Continuing, waiting for OK to be released
    AwaitIntroRelease,
    /// Showing the committed ON threshold
    ReviewOn,
    /// Editing the ON threshold
    EditOn(EditSession<4>),
    /// ON threshold taken, waiting for OK to be released
    AwaitOnRelease(Tenths),
    /// Showing the committed OFF threshold
    ReviewOff(Tenths),
    /// Editing the OFF threshold
    EditOff {
        /// Pending ON threshold
        on: Tenths,
        /// The OFF threshold digits
        session: EditSession<4>,
    },
    /// OFF threshold taken, waiting for OK to be released
    AwaitOffRelease {
        /// Pending ON threshold
        on: Tenths,
        /// Pending OFF threshold
        off: Tenths,
    },
    /// Showing both pending thresholds
    Confirm {
        /// Pending ON threshold
        on: Tenths,
        /// Pending OFF threshold
        off: Tenths,
    },
    /// Commit attempted, waiting for OK to be released
    AwaitCommitRelease {
        /// Whether the commit reached the store
        saved: bool,
    },
    /// The thresholds were stored
    Saved,
    /// The store refused the thresholds, nothing changed
    SaveFailed,
    /// Back pressed, waiting for it to be released
    AwaitAbortRelease,
    /// Aborted, nothing changed
    Aborted,
}

impl Default for SetVoltage {
    fn default() -> Self {
        Self::new()
    }
}

impl SetVoltage {
    /// Starts on the intro screen.
    pub const fn new() -> Self {
        Self::Intro
    }

    /// Whether Back aborts in this step.
    const fn is_abortable(self) -> bool {
        matches!(
            self,
            Self::ReviewOn | Self::EditOn(_) | Self::ReviewOff(_) | Self::EditOff { .. }
        )
    }

    /// Advances the wizard by one tick.
    pub fn step<S: KeyValueStore>(
        &mut self,
        input: &InputFrame,
        thresholds: &mut ThresholdPair,
        storage: &mut Storage<S>,
    ) -> Flow {
        let press = input.first_press();
        if press == Some(Button::Back) && self.is_abortable() {
            info!("Voltage threshold edit aborted");
            *self = if input.fell(Button::Back) {
                Self::Aborted
            } else {
                Self::AwaitAbortRelease
            };
            return Flow::Stay;
        }

        *self = match (*self, press) {
            (Self::Intro, Some(Button::Back)) => return Flow::Exit(Menu::SetVoltAlarm),
            (Self::Intro, Some(Button::Ok)) => {
                once_released(input, Self::AwaitIntroRelease, Self::ReviewOn)
            }
            (Self::AwaitIntroRelease, _) if input.fell(Button::Ok) => Self::ReviewOn,

            (Self::ReviewOn, Some(Button::Ok)) => once_released(
                input,
                Self::AwaitOnRelease(thresholds.on),
                Self::ReviewOff(thresholds.on),
            ),
            (Self::ReviewOn, Some(button)) if button.is_directional() => {
                let mut session = EditSession::new(VOLTS, thresholds.on.digits());
                session.handle(button);
                Self::EditOn(session)
            }
            (Self::EditOn(session), Some(Button::Ok)) => {
                let on = Tenths::from_digits(session.digits()).unwrap_or(thresholds.on);
                once_released(input, Self::AwaitOnRelease(on), Self::ReviewOff(on))
            }
            (Self::EditOn(mut session), Some(button)) => {
                session.handle(button);
                Self::EditOn(session)
            }
            (Self::AwaitOnRelease(on), _) if input.fell(Button::Ok) => Self::ReviewOff(on),

            (Self::ReviewOff(on), Some(Button::Ok)) => {
                let off = thresholds.off;
                once_released(
                    input,
                    Self::AwaitOffRelease { on, off },
                    Self::Confirm { on, off },
                )
            }
            (Self::ReviewOff(on), Some(button)) if button.is_directional() => {
                let mut session = EditSession::new(VOLTS, thresholds.off.digits());
                session.handle(button);
                Self::EditOff { on, session }
            }
            (Self::EditOff { on, session }, Some(Button::Ok)) => {
                let off = Tenths::from_digits(session.digits()).unwrap_or(thresholds.off);
                once_released(
                    input,
                    Self::AwaitOffRelease { on, off },
                    Self::Confirm { on, off },
                )
            }
            (Self::EditOff { on, mut session }, Some(button)) => {
                session.handle(button);
                Self::EditOff { on, session }
            }
            (Self::AwaitOffRelease { on, off }, _) if input.fell(Button::Ok) => {
                Self::Confirm { on, off }
            }

            (Self::Confirm { on, off }, Some(Button::Ok)) => {
                let saved = commit(thresholds, storage, ThresholdPair { on, off, active: true });
                once_released(
                    input,
                    Self::AwaitCommitRelease { saved },
                    Self::finished(saved),
                )
            }
            (Self::AwaitCommitRelease { saved }, _) if input.fell(Button::Ok) => {
                Self::finished(saved)
            }

            (Self::AwaitAbortRelease, _) if input.fell(Button::Back) => Self::Aborted,

            (state, _) => state,
        };
        Flow::Stay
    }

    /// Terminal state after a commit.
    const fn finished(saved: bool) -> Self {
        if saved { Self::Saved } else { Self::SaveFailed }
    }

    /// Draws the current step. Release waits keep the previous screen.
    pub fn render<D: TextDisplay>(&self, thresholds: &ThresholdPair, display: &mut D) {
        match self {
            Self::Intro => show(display, "Press OK to", "continue"),
            Self::ReviewOn => show(
                display,
                "Edit  ON volt",
                &line(format_args!("{}", thresholds.on)),
            ),
            Self::EditOn(session) => show_editing(
                display,
                "Edit  ON volt",
                &session.text(),
                session.cursor(),
            ),
            Self::ReviewOff(_) => show(
                display,
                "Edit OFF volt",
                &line(format_args!("{}", thresholds.off)),
            ),
            Self::EditOff { session, .. } => show_editing(
                display,
                "Edit OFF volt",
                &session.text(),
                session.cursor(),
            ),
            Self::Confirm { on, off } => show(
                display,
                &line(format_args!("ON {on} OFF {off}")),
                " Confirm?",
            ),
            Self::Saved => show(display, "New values set", "Going to idle"),
            Self::SaveFailed => show(display, "Save failed", "Going to idle"),
            Self::Aborted => show(display, "No values set", "Going to idle"),
            Self::AwaitIntroRelease
            | Self::AwaitOnRelease(_)
            | Self::AwaitOffRelease { .. }
            | Self::AwaitCommitRelease { .. }
            | Self::AwaitAbortRelease => {}
        }
    }
}

/// Stores `candidate`, then swaps it in. On failure `thresholds` is untouched.
fn commit<S: KeyValueStore>(
    thresholds: &mut ThresholdPair,
    storage: &mut Storage<S>,
    candidate: ThresholdPair,
) -> bool {
    match storage.save_thresholds(&candidate) {
        Ok(()) => {
            info!(
                "Voltage thresholds stored: on {} off {}",
                candidate.on.value(),
                candidate.off.value()
            );
            *thresholds = candidate;
            true
        }
        Err(e) => {
            error!("Failed to store voltage thresholds: {:?}", e);
            false
        }
    }
}
