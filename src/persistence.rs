//! # Persistence
//! Typed records on top of a [`KeyValueStore`].
//!
//! Storage layout, one record per key, each written as a whole:
//!   - `KEY_SCHEDULES`: `[version]` then per schedule `[on lo][on hi][off lo][off hi][active]`
//!   - `KEY_THRESHOLDS`: `[version][on lo][on hi][off lo][off hi][active]`
//!
//! Times are `HHMM` and voltages tenths of a volt, both little endian `u16`.
//! A record with the wrong length, version or an out of range field is
//! rejected as a whole.

use crate::config::{KEY_SCHEDULES, KEY_THRESHOLDS, MAX_RECORD_LEN, SCHEDULE_COUNT};
use crate::error::Error;
use crate::time_alarm::{ClockCode, Schedule, ScheduleTable};
use crate::traits::KeyValueStore;
use crate::voltage_alarm::{Tenths, ThresholdPair};

/// Version byte leading every record.
const RECORD_VERSION: u8 = 1;

/// Bytes per schedule.
const SCHEDULE_LEN: usize = 5;

/// Length of the schedule record.
const SCHEDULES_RECORD_LEN: usize = 1 + SCHEDULE_COUNT * SCHEDULE_LEN;

/// Length of the threshold record.
const THRESHOLDS_RECORD_LEN: usize = 6;

const _: () = assert!(SCHEDULES_RECORD_LEN <= MAX_RECORD_LEN);

/// Reads a little endian `u16` at `at`.
fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

/// Decodes an active flag, only 0 and 1 are valid.
const fn read_flag(byte: u8) -> Option<bool> {
    match byte {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

/// Serializes one schedule into `buf`.
fn encode_schedule(schedule: &Schedule, buf: &mut [u8]) {
    buf[0..2].copy_from_slice(&schedule.on.value().to_le_bytes());
    buf[2..4].copy_from_slice(&schedule.off.value().to_le_bytes());
    buf[4] = u8::from(schedule.active);
}

/// Deserializes one schedule.
fn decode_schedule(bytes: &[u8]) -> Option<Schedule> {
    Some(Schedule {
        on: ClockCode::new(read_u16(bytes, 0))?,
        off: ClockCode::new(read_u16(bytes, 2))?,
        active: read_flag(bytes[4])?,
    })
}

/// Serializes the schedule table.
pub fn encode_schedules(table: &ScheduleTable) -> [u8; SCHEDULES_RECORD_LEN] {
    let mut record = [0; SCHEDULES_RECORD_LEN];
    record[0] = RECORD_VERSION;
    for (schedule, chunk) in table.iter().zip(record[1..].chunks_exact_mut(SCHEDULE_LEN)) {
        encode_schedule(schedule, chunk);
    }
    record
}

/// Deserializes the schedule table.
///
/// # Errors
/// [`Error::CorruptRecord`] on a malformed record.
pub fn decode_schedules(record: &[u8]) -> Result<ScheduleTable, Error> {
    if record.len() != SCHEDULES_RECORD_LEN || record[0] != RECORD_VERSION {
        return Err(Error::CorruptRecord);
    }
    let mut schedules = [Schedule::EMPTY; SCHEDULE_COUNT];
    for (schedule, chunk) in schedules.iter_mut().zip(record[1..].chunks_exact(SCHEDULE_LEN)) {
        *schedule = decode_schedule(chunk).ok_or(Error::CorruptRecord)?;
    }
    Ok(ScheduleTable::from_schedules(schedules))
}

/// Serializes the thresholds.
pub fn encode_thresholds(thresholds: &ThresholdPair) -> [u8; THRESHOLDS_RECORD_LEN] {
    let [on_lo, on_hi] = thresholds.on.value().to_le_bytes();
    let [off_lo, off_hi] = thresholds.off.value().to_le_bytes();
    [
        RECORD_VERSION,
        on_lo,
        on_hi,
        off_lo,
        off_hi,
        u8::from(thresholds.active),
    ]
}

/// Deserializes the thresholds.
///
/// # Errors
/// [`Error::CorruptRecord`] on a malformed record.
pub fn decode_thresholds(record: &[u8]) -> Result<ThresholdPair, Error> {
    if record.len() != THRESHOLDS_RECORD_LEN || record[0] != RECORD_VERSION {
        return Err(Error::CorruptRecord);
    }
    decode_threshold_fields(record).ok_or(Error::CorruptRecord)
}

/// Field decoding of a threshold record of the right length.
fn decode_threshold_fields(record: &[u8]) -> Option<ThresholdPair> {
    Some(ThresholdPair {
        on: Tenths::new(read_u16(record, 1))?,
        off: Tenths::new(read_u16(record, 3))?,
        active: read_flag(record[5])?,
    })
}

/// Typed access to the schedule and threshold records.
pub struct Storage<S> {
    /// The byte store underneath
    store: S,
}

impl<S: KeyValueStore> Storage<S> {
    /// Wraps a byte store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The byte store underneath.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the byte store underneath.
    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Loads the schedules, factory defaults if they were never stored.
    ///
    /// # Errors
    /// [`Error::Store`] if the store fails, [`Error::CorruptRecord`] on a
    /// malformed record.
    pub fn load_schedules(&mut self) -> Result<ScheduleTable, Error> {
        let mut buf = [0; MAX_RECORD_LEN];
        match self.store.read(KEY_SCHEDULES, &mut buf)? {
            Some(len) => decode_schedules(buf.get(..len).ok_or(Error::CorruptRecord)?),
            None => {
                info!("No schedules stored, using defaults");
                Ok(ScheduleTable::new())
            }
        }
    }

    /// Replaces the stored schedules as one record.
    ///
    /// # Errors
    /// [`Error::Store`] if the store rejects the record.
    pub fn save_schedules(&mut self, table: &ScheduleTable) -> Result<(), Error> {
        self.store.write(KEY_SCHEDULES, &encode_schedules(table))?;
        Ok(())
    }

    /// Loads the thresholds, unset if they were never stored.
    ///
    /// # Errors
    /// [`Error::Store`] if the store fails, [`Error::CorruptRecord`] on a
    /// malformed record.
    pub fn load_thresholds(&mut self) -> Result<ThresholdPair, Error> {
        let mut buf = [0; MAX_RECORD_LEN];
        match self.store.read(KEY_THRESHOLDS, &mut buf)? {
            Some(len) => decode_thresholds(buf.get(..len).ok_or(Error::CorruptRecord)?),
            None => {
                info!("No voltage thresholds stored, using defaults");
                Ok(ThresholdPair::UNSET)
            }
        }
    }

    /// Replaces the stored thresholds as one record.
    ///
    /// # Errors
    /// [`Error::Store`] if the store rejects the record.
    pub fn save_thresholds(&mut self, thresholds: &ThresholdPair) -> Result<(), Error> {
        self.store.write(KEY_THRESHOLDS, &encode_thresholds(thresholds))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::testing::MemoryStore;
    use crate::time_alarm::ScheduleIndex;

    /// A table with two distinct schedules.
    fn sample_table() -> ScheduleTable {
        ScheduleTable::new()
            .with(
                ScheduleIndex::new(0).unwrap(),
                Schedule {
                    on: ClockCode::new(730).unwrap(),
                    off: ClockCode::new(1830).unwrap(),
                    active: true,
                },
            )
            .with(
                ScheduleIndex::new(9).unwrap(),
                Schedule {
                    on: ClockCode::new(2359).unwrap(),
                    off: ClockCode::new(5).unwrap(),
                    active: false,
                },
            )
    }

    #[test]
    fn missing_records_fall_back_to_defaults() {
        let mut storage = Storage::new(MemoryStore::default());
        assert_eq!(storage.load_schedules(), Ok(ScheduleTable::new()));
        assert_eq!(storage.load_thresholds(), Ok(ThresholdPair::UNSET));
    }

    #[test]
    fn stored_records_load_back() {
        let mut storage = Storage::new(MemoryStore::default());
        let thresholds = ThresholdPair {
            on: Tenths::new(115).unwrap(),
            off: Tenths::new(130).unwrap(),
            active: true,
        };
        storage.save_schedules(&sample_table()).unwrap();
        storage.save_thresholds(&thresholds).unwrap();
        assert_eq!(storage.load_schedules(), Ok(sample_table()));
        assert_eq!(storage.load_thresholds(), Ok(thresholds));
        assert_eq!(storage.store().writes(), 2);
    }

    #[test]
    fn schedule_record_layout() {
        let record = encode_schedules(&sample_table());
        assert_eq!(record.len(), 51);
        assert_eq!(record[0], 1);
        // 0730 = 0x02DA, 1830 = 0x0726
        assert_eq!(&record[1..6], &[0xDA, 0x02, 0x26, 0x07, 1]);
        assert_eq!(&record[6..11], &[0, 0, 0, 0, 0]);
    }

    #[test]
    fn corrupt_records_are_rejected() {
        let mut record = encode_schedules(&sample_table());
        assert_eq!(decode_schedules(&record[..50]), Err(Error::CorruptRecord));

        record[0] = 7;
        assert_eq!(decode_schedules(&record), Err(Error::CorruptRecord));

        let mut record = encode_schedules(&sample_table());
        // ON time 2400
        record[1..3].copy_from_slice(&2400u16.to_le_bytes());
        assert_eq!(decode_schedules(&record), Err(Error::CorruptRecord));

        let mut record = encode_thresholds(&ThresholdPair::UNSET);
        record[5] = 2;
        assert_eq!(decode_thresholds(&record), Err(Error::CorruptRecord));
        let mut record = encode_thresholds(&ThresholdPair::UNSET);
        record[1..3].copy_from_slice(&1000u16.to_le_bytes());
        assert_eq!(decode_thresholds(&record), Err(Error::CorruptRecord));
    }

    #[test]
    fn store_failures_are_reported() {
        let mut storage = Storage::new(MemoryStore::failing());
        assert_eq!(
            storage.save_schedules(&sample_table()),
            Err(Error::Store(StoreError::Io))
        );
        assert_eq!(storage.load_schedules(), Err(Error::Store(StoreError::Io)));
    }
}
