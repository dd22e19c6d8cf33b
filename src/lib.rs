//! # Charge relay controller
//! Control logic of a battery charging relay: a six-button menu on a 16x2
//! text frame, ten daily time schedules, a voltage hysteresis band and the
//! persistence of both.
//!
//! The logic is hardware independent and runs on the host for tests. The
//! firmware in `main.rs` wires it to the RP2040 peripherals through the
//! traits in [`traits`].

#![cfg_attr(not(test), no_std)]

// must come first, the logging macros are used by every module below
#[macro_use]
mod fmt;

pub mod calibration;
pub mod config;
pub mod controller;
pub mod datetime;
pub mod datetime_menu;
pub mod digit_editor;
pub mod error;
pub mod event;
pub mod lcd;
pub mod navigation;
pub mod persistence;
pub mod time_alarm;
pub mod traits;
pub mod voltage_alarm;

#[doc(hidden)]
pub mod testing;

pub use controller::{Controller, Settings};
pub use error::{ClockError, Error, StoreError};
pub use event::{Button, ButtonEdge, Edge, HeldButtons, InputFrame};
