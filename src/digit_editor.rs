//! # Digit editor
//! A cursor over a fixed-width numeric field. Up and Down change the digit
//! under the cursor within the bound of its position, Left and Right move the
//! cursor and skip the fixed separator slots, OK ends the edit.
//!
//! The same editor serves the schedule times (`HHMM`), the voltage thresholds
//! (`XX.X`) and the date-time field (`YYYY/MM/DD HH:MM`). It never checks the
//! field as a whole, a day 31 in April is the caller's problem.

use crate::event::Button;
use heapless::String;

/// What a single position of a field holds.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// An editable digit
    Digit,
    /// A separator that the cursor skips and that is never edited
    Fixed(char),
}

/// Upper bound rule applied to the digits of a field.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitBound {
    /// Every digit runs 0..=9
    AnyDigit,
    /// `HHMM` restricted to 00:00..=23:59
    ClockTime,
}

/// Layout of an editable field of `N` positions.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldFormat<const N: usize> {
    /// The positions, left to right
    slots: [Slot; N],
    /// The per position bound
    bound: DigitBound,
}

/// `HHMM`, four digits, 0000..=2359.
pub const CLOCK_TIME: FieldFormat<4> = FieldFormat {
    slots: [Slot::Digit; 4],
    bound: DigitBound::ClockTime,
};

/// `XX.X`, tenths of a volt with a fixed decimal point.
pub const VOLTS: FieldFormat<4> = FieldFormat {
    slots: [Slot::Digit, Slot::Digit, Slot::Fixed('.'), Slot::Digit],
    bound: DigitBound::AnyDigit,
};

/// `YYYY/MM/DD HH:MM`, digits bounded only to 0..=9.
pub const DATE_TIME: FieldFormat<16> = FieldFormat {
    slots: [
        Slot::Digit,
        Slot::Digit,
        Slot::Digit,
        Slot::Digit,
        Slot::Fixed('/'),
        Slot::Digit,
        Slot::Digit,
        Slot::Fixed('/'),
        Slot::Digit,
        Slot::Digit,
        Slot::Fixed(' '),
        Slot::Digit,
        Slot::Digit,
        Slot::Fixed(':'),
        Slot::Digit,
        Slot::Digit,
    ],
    bound: DigitBound::AnyDigit,
};

impl<const N: usize> FieldFormat<N> {
    /// Whether the cursor may stop at `position`.
    pub fn is_editable(&self, position: usize) -> bool {
        matches!(self.slots.get(position), Some(Slot::Digit))
    }

    /// Highest value the digit at `position` may take given the other digits.
    pub fn max_digit(&self, digits: &[u8; N], position: usize) -> u8 {
        match self.bound {
            DigitBound::AnyDigit => 9,
            DigitBound::ClockTime => match position {
                // 2x only while the low hour digit is at most 3
                0 => {
                    if digits[1] <= 3 {
                        2
                    } else {
                        1
                    }
                }
                1 => {
                    if digits[0] < 2 {
                        9
                    } else {
                        3
                    }
                }
                2 => 5,
                _ => 9,
            },
        }
    }

    /// Renders `digits` with the separators in place.
    pub fn render(&self, digits: &[u8; N]) -> String<N> {
        let mut text = String::new();
        for (slot, digit) in self.slots.iter().zip(digits) {
            let c = match slot {
                Slot::Digit => char::from(b'0' + digit % 10),
                Slot::Fixed(c) => *c,
            };
            // N positions of one ASCII byte each always fit
            let _ = text.push(c);
        }
        text
    }
}

/// Result of feeding one button to an [`EditSession`].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// A digit or the cursor changed
    Changed,
    /// The button hit a bound, nothing changed
    Unchanged,
    /// OK was pressed, the caller takes the value
    Done,
    /// The editor does not handle this button
    Ignored,
}

/// An in-progress edit of one field. Owned by the wizard step that runs it and
/// dropped with that step.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditSession<const N: usize> {
    /// Layout of the field
    format: FieldFormat<N>,
    /// Current digits, 0 in the fixed slots
    digits: [u8; N],
    /// Position of the cursor, always an editable slot
    cursor: usize,
}

impl<const N: usize> EditSession<N> {
    /// Starts an edit of `digits` with the cursor on the first position.
    pub fn new(format: FieldFormat<N>, digits: [u8; N]) -> Self {
        let cursor = (0..N).find(|p| format.is_editable(*p)).unwrap_or(0);
        Self {
            format,
            digits,
            cursor,
        }
    }

    /// Applies one button press.
    pub fn handle(&mut self, button: Button) -> EditOutcome {
        let changed = match button {
            Button::Up => self.increment(),
            Button::Down => self.decrement(),
            Button::Left => self.move_left(),
            Button::Right => self.move_right(),
            Button::Ok => return EditOutcome::Done,
            Button::Back => return EditOutcome::Ignored,
        };
        if changed {
            EditOutcome::Changed
        } else {
            EditOutcome::Unchanged
        }
    }

    /// The current digits.
    pub const fn digits(&self) -> &[u8; N] {
        &self.digits
    }

    /// The cursor position.
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// The field as shown on the display.
    pub fn text(&self) -> String<N> {
        self.format.render(&self.digits)
    }

    /// Up
    fn increment(&mut self) -> bool {
        let max = self.format.max_digit(&self.digits, self.cursor);
        let digit = &mut self.digits[self.cursor];
        if *digit < max {
            *digit += 1;
            true
        } else {
            false
        }
    }

    /// Down
    fn decrement(&mut self) -> bool {
        let digit = &mut self.digits[self.cursor];
        if *digit > 0 {
            *digit -= 1;
            true
        } else {
            false
        }
    }

    /// Left, to the nearest editable slot
    fn move_left(&mut self) -> bool {
        match (0..self.cursor).rev().find(|p| self.format.is_editable(*p)) {
            Some(position) => {
                self.cursor = position;
                true
            }
            None => false,
        }
    }

    /// Right, to the nearest editable slot
    fn move_right(&mut self) -> bool {
        match (self.cursor + 1..N).find(|p| self.format.is_editable(*p)) {
            Some(position) => {
                self.cursor = position;
                true
            }
            None => false,
        }
    }
}
