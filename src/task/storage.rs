//! # Record storage
//! Persists the controller records in flash with `sequential-storage`.
//!
//! Flash access is async while the controller is not, so the records live in
//! a RAM mirror. The flash task fills the mirror once at boot; afterwards
//! every write updates the mirror and queues the record for the flash task.

use core::cell::RefCell;
use defmt::{Debug2Format, error, info, warn};
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::{LinearMap, Vec};
use pico_charge_relay::StoreError;
use pico_charge_relay::config::{FLASH_RANGE, FLASH_SIZE, KEY_SCHEDULES, KEY_THRESHOLDS, MAX_RECORD_LEN};
use pico_charge_relay::traits::KeyValueStore;
use sequential_storage::cache::NoCache;
use sequential_storage::map::{fetch_item, store_item};

/// One record as stored.
type Record = Vec<u8, MAX_RECORD_LEN>;

/// Every key the controller uses.
const KEYS: [u8; 2] = [KEY_SCHEDULES, KEY_THRESHOLDS];

/// The RAM copy of the stored records.
static MIRROR: Mutex<CriticalSectionRawMutex, RefCell<LinearMap<u8, Record, 2>>> =
    Mutex::new(RefCell::new(LinearMap::new()));

/// Signaled once the mirror holds what was in flash.
static MIRROR_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// A record waiting to be written to flash.
struct FlashWrite {
    /// Record key
    key: u8,
    /// Record bytes
    record: Record,
}

/// Channel for flash write commands
static FLASH_CHANNEL: Channel<CriticalSectionRawMutex, FlashWrite, 4> = Channel::new();

/// Waits until the flash task loaded the mirror.
pub async fn wait_for_mirror() {
    MIRROR_READY.wait().await;
}

/// [`KeyValueStore`] over the mirror. Writes are acknowledged once queued for
/// flash; a later flash failure is only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlashMirror;

impl KeyValueStore for FlashMirror {
    fn read(&mut self, key: u8, buf: &mut [u8]) -> Result<Option<usize>, StoreError> {
        MIRROR.lock(|mirror| match mirror.borrow().get(&key) {
            Some(record) => {
                let target = buf.get_mut(..record.len()).ok_or(StoreError::Overflow)?;
                target.copy_from_slice(record);
                Ok(Some(record.len()))
            }
            None => Ok(None),
        })
    }

    fn write(&mut self, key: u8, bytes: &[u8]) -> Result<(), StoreError> {
        let record = Record::from_slice(bytes).map_err(|_| StoreError::Overflow)?;
        // queue first, the mirror must not get ahead of a write that was refused
        FLASH_CHANNEL
            .try_send(FlashWrite {
                key,
                record: record.clone(),
            })
            .map_err(|_| StoreError::Busy)?;
        MIRROR.lock(|mirror| {
            mirror
                .borrow_mut()
                .insert(key, record)
                .map(|_| ())
                .map_err(|_| StoreError::Overflow)
        })
    }
}

/// Flash plus the scratch buffer `sequential-storage` works in.
pub struct PersistedRecords<'a> {
    /// The flash peripheral
    flash: Flash<'a, FLASH, Async, { FLASH_SIZE }>,
    /// Scratch buffer for reading and writing items
    data_buffer: [u8; 128],
}

impl<'a> PersistedRecords<'a> {
    /// Wraps the flash.
    pub const fn new(flash: Flash<'a, FLASH, Async, { FLASH_SIZE }>) -> Self {
        Self {
            flash,
            data_buffer: [0; 128],
        }
    }

    /// Reads the record under `key`, `None` if missing or unreadable.
    async fn fetch(&mut self, key: u8) -> Option<Record> {
        match fetch_item::<u8, &[u8], _>(
            &mut self.flash,
            FLASH_RANGE,
            &mut NoCache::new(),
            &mut self.data_buffer,
            &key,
        )
        .await
        {
            Ok(Some(bytes)) => Record::from_slice(bytes).ok(),
            Ok(None) => {
                info!("No record stored under key {}", key);
                None
            }
            Err(e) => {
                warn!("Failed to fetch key {}: {:?}", key, Debug2Format(&e));
                None
            }
        }
    }

    /// Writes one record.
    async fn store(&mut self, write: &FlashWrite) {
        match store_item::<u8, &[u8], _>(
            &mut self.flash,
            FLASH_RANGE,
            &mut NoCache::new(),
            &mut self.data_buffer,
            &write.key,
            &write.record.as_slice(),
        )
        .await
        {
            Ok(()) => info!("Key {} stored ({} bytes)", write.key, write.record.len()),
            Err(e) => error!("Failed to store key {}: {:?}", write.key, Debug2Format(&e)),
        }
    }
}

/// Loads every record into the mirror, then writes queued records forever.
#[embassy_executor::task]
pub async fn storage_handler(flash: Flash<'static, FLASH, Async, { FLASH_SIZE }>) {
    let mut records = PersistedRecords::new(flash);

    for key in KEYS {
        if let Some(record) = records.fetch(key).await {
            MIRROR.lock(|mirror| {
                if mirror.borrow_mut().insert(key, record).is_err() {
                    warn!("Mirror full, dropping key {}", key);
                }
            });
        }
    }
    MIRROR_READY.signal(());

    loop {
        let write = FLASH_CHANNEL.receive().await;
        records.store(&write).await;
    }
}
