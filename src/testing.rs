//! In-memory stand-ins for the hardware, shared by the unit tests and the
//! scenarios under `tests/`. Fixed capacity, so they build without `std`.

use crate::config::MAX_RECORD_LEN;
use crate::datetime::DateTime;
use crate::error::{ClockError, StoreError};
use crate::traits::{Clock, KeyValueStore, Relay, VoltageSensor};
use crate::voltage_alarm::Tenths;
use heapless::{LinearMap, Vec};

/// One stored record.
type Record = Vec<u8, MAX_RECORD_LEN>;

/// Records in memory, optionally failing every access.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Stored records
    records: LinearMap<u8, Record, 4>,
    /// Whether every access fails
    failing: bool,
    /// Number of successful writes
    writes: usize,
}

impl MemoryStore {
    /// A store whose every access fails with [`StoreError::Io`].
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Number of successful writes.
    pub const fn writes(&self) -> usize {
        self.writes
    }

    /// The bytes stored under `key`.
    pub fn record(&self, key: u8) -> Option<&[u8]> {
        self.records.get(&key).map(Vec::as_slice)
    }

    /// Overwrites a record without going through the typed layer.
    ///
    /// # Panics
    /// If `bytes` is longer than a record or the store is full.
    #[allow(clippy::expect_used)]
    pub fn put_raw(&mut self, key: u8, bytes: &[u8]) {
        let record = Record::from_slice(bytes).ok().expect("record too long");
        self.records.insert(key, record).ok().expect("store full");
    }

    /// Makes every following access fail or succeed.
    pub const fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&mut self, key: u8, buf: &mut [u8]) -> Result<Option<usize>, StoreError> {
        if self.failing {
            return Err(StoreError::Io);
        }
        match self.records.get(&key) {
            Some(record) => {
                let target = buf.get_mut(..record.len()).ok_or(StoreError::Overflow)?;
                target.copy_from_slice(record);
                Ok(Some(record.len()))
            }
            None => Ok(None),
        }
    }

    fn write(&mut self, key: u8, bytes: &[u8]) -> Result<(), StoreError> {
        if self.failing {
            return Err(StoreError::Io);
        }
        let record = Record::from_slice(bytes).map_err(|_| StoreError::Overflow)?;
        self.records
            .insert(key, record)
            .map_err(|_| StoreError::Overflow)?;
        self.writes += 1;
        Ok(())
    }
}

/// A clock the test sets by hand.
#[derive(Debug, Clone)]
pub struct ManualClock {
    /// Current time, `None` while stopped
    now: Option<DateTime>,
    /// The first values passed to `adjust`
    adjustments: Vec<DateTime, 16>,
}

impl ManualClock {
    /// A running clock at `now`.
    pub const fn at(now: DateTime) -> Self {
        Self {
            now: Some(now),
            adjustments: Vec::new(),
        }
    }

    /// A clock that is not running.
    pub const fn stopped() -> Self {
        Self {
            now: None,
            adjustments: Vec::new(),
        }
    }

    /// Moves the clock.
    pub const fn set(&mut self, now: DateTime) {
        self.now = Some(now);
    }

    /// Values passed to `adjust`, oldest first.
    pub fn adjustments(&self) -> &[DateTime] {
        &self.adjustments
    }
}

impl Clock for ManualClock {
    fn now(&mut self) -> Result<DateTime, ClockError> {
        self.now.ok_or(ClockError::NotRunning)
    }

    fn adjust(&mut self, datetime: &DateTime) -> Result<(), ClockError> {
        // a test never adjusts more often than the log holds
        let _ = self.adjustments.push(*datetime);
        self.now = Some(*datetime);
        Ok(())
    }
}

/// A sensor returning whatever the test put in.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedVoltage(pub Tenths);

impl VoltageSensor for FixedVoltage {
    fn read_voltage(&mut self) -> Tenths {
        self.0
    }
}

/// A relay remembering its commands.
#[derive(Debug, Clone, Default)]
pub struct RecordingRelay {
    /// Commands in order
    history: Vec<bool, 64>,
}

impl RecordingRelay {
    /// Last command, `None` if never switched.
    pub fn state(&self) -> Option<bool> {
        self.history.last().copied()
    }

    /// Commands in order.
    pub fn history(&self) -> &[bool] {
        &self.history
    }
}

impl Relay for RecordingRelay {
    fn set(&mut self, on: bool) {
        let _ = self.history.push(on);
    }
}
