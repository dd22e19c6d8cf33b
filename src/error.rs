//! Unified error type of the controller.
//!
//! All variants carry only fixed-size data and are `Copy`, there is no
//! allocator on the target.

/// Top-level error type used across the controller.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The record store failed to read or write.
    Store(StoreError),

    /// The real time clock failed.
    Clock(ClockError),

    /// A date or time outside the calendar was supplied.
    InvalidDateTime,

    /// A stored record has the wrong length, version or field range.
    CorruptRecord,
}

/// Failures of the key/value record store.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// The storage medium reported an error.
    Io,
    /// The record does not fit the buffer or the store.
    Overflow,
    /// The write queue to the storage medium is full.
    Busy,
}

/// Failures of the real time clock.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// The clock hardware is not running.
    NotRunning,
    /// The clock holds or was given a date it cannot represent.
    UnsupportedDateTime,
}

// Convenience conversions

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<ClockError> for Error {
    fn from(e: ClockError) -> Self {
        Self::Clock(e)
    }
}
