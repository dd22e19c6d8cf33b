//! Hardware abstractions. The firmware implements these over the RP2040
//! peripherals, the tests over plain memory.

use crate::datetime::DateTime;
use crate::error::{ClockError, StoreError};
use crate::voltage_alarm::Tenths;

/// Wall clock with second resolution.
pub trait Clock {
    /// Current date and time.
    ///
    /// # Errors
    /// [`ClockError`] if the clock is stopped or holds an unusable value.
    fn now(&mut self) -> Result<DateTime, ClockError>;

    /// Sets the clock. The caller has validated `datetime`.
    ///
    /// # Errors
    /// [`ClockError`] if the hardware rejects the value.
    fn adjust(&mut self, datetime: &DateTime) -> Result<(), ClockError>;
}

/// Source of the battery voltage, already averaged and calibrated.
pub trait VoltageSensor {
    /// Latest reading in tenths of a volt.
    fn read_voltage(&mut self) -> Tenths;
}

/// A 16x2 character display with a single cursor.
pub trait TextDisplay {
    /// Blanks every character.
    fn clear(&mut self);

    /// Writes `text` starting at `row`/`col`, clipped at the end of the row.
    fn render(&mut self, row: u8, col: u8, text: &str);

    /// Places the cursor.
    fn set_cursor(&mut self, row: u8, col: u8);

    /// Shows or hides the cursor.
    fn set_cursor_visible(&mut self, visible: bool);
}

/// The charging relay.
pub trait Relay {
    /// Energizes (`true`) or releases (`false`) the relay.
    fn set(&mut self, on: bool);
}

/// Byte records addressed by a one byte key.
pub trait KeyValueStore {
    /// Copies the record under `key` into `buf` and returns its length, or
    /// `None` if the key was never written.
    ///
    /// # Errors
    /// [`StoreError`] if the medium fails or `buf` is too small.
    fn read(&mut self, key: u8, buf: &mut [u8]) -> Result<Option<usize>, StoreError>;

    /// Replaces the record under `key` as a whole.
    ///
    /// # Errors
    /// [`StoreError`] if the record could not be stored, in which case the
    /// previous record stays in place.
    fn write(&mut self, key: u8, bytes: &[u8]) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn read(&mut self, key: u8, buf: &mut [u8]) -> Result<Option<usize>, StoreError> {
        (**self).read(key, buf)
    }

    fn write(&mut self, key: u8, bytes: &[u8]) -> Result<(), StoreError> {
        (**self).write(key, bytes)
    }
}
