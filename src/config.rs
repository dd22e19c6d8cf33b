//! # Configuration
//! Fixed dimensions of the controller plus the tunables generated by
//! `build.rs` from `config/controller.json`.
//!
//! # controller.json
//! Every key is optional:
//! ```json
//! {
//!     "idle_timeout_ms": 8500,
//!     "voltage_check_period_secs": 5,
//!     "button_debounce_ms": 50,
//!     "tick_interval_ms": 20,
//!     "adc_samples": 5,
//!     "divider_r_in_ohms": 2200,
//!     "divider_r_big_ohms": 10000,
//!     "adc_reference_millivolts": 3300,
//!     "fallback_datetime": "2022-01-01T00:00:00"
//! }
//! ```

include!(concat!(env!("OUT_DIR"), "/controller_config.rs"));

/// Number of time schedules.
pub const SCHEDULE_COUNT: usize = 10;

/// Characters per display row.
pub const LCD_COLS: usize = 16;

/// Rows of the display.
pub const LCD_ROWS: usize = 2;

/// Store key of the schedule table.
pub const KEY_SCHEDULES: u8 = 0x01;

/// Store key of the voltage thresholds.
pub const KEY_THRESHOLDS: u8 = 0x02;

/// Largest record the store has to hold, in bytes.
pub const MAX_RECORD_LEN: usize = 64;

/// Flash range reserved for the record store.
pub const FLASH_RANGE: core::ops::Range<u32> = 0x1F_9000..0x1F_C000;

/// Size of the flash memory in bytes.
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;
