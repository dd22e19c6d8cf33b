//! # Peripherals
//! The RP2040 real time clock and the relay pin behind the controller traits.

use defmt::{Debug2Format, error, info, warn};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::RTC;
use embassy_rp::rtc::{DateTime as RtcDateTime, DayOfWeek, Rtc};
use pico_charge_relay::ClockError;
use pico_charge_relay::config::FALLBACK_DATETIME;
use pico_charge_relay::datetime::{DateTime, Weekday};
use pico_charge_relay::traits::{Clock, Relay};

/// Day of week as the RTC wants it.
const fn day_of_week(weekday: Weekday) -> DayOfWeek {
    match weekday {
        Weekday::Sunday => DayOfWeek::Sunday,
        Weekday::Monday => DayOfWeek::Monday,
        Weekday::Tuesday => DayOfWeek::Tuesday,
        Weekday::Wednesday => DayOfWeek::Wednesday,
        Weekday::Thursday => DayOfWeek::Thursday,
        Weekday::Friday => DayOfWeek::Friday,
        Weekday::Saturday => DayOfWeek::Saturday,
    }
}

/// The on-chip RTC. It keeps running across soft resets but loses the time
/// on power loss.
pub struct RtcClock {
    /// The RTC peripheral
    rtc: Rtc<'static, RTC>,
}

impl RtcClock {
    /// Wraps the RTC. A clock that is not running is started at the
    /// configured fallback date so the schedules keep firing; one that cannot
    /// be started halts the firmware.
    pub fn new(rtc: Rtc<'static, RTC>) -> Self {
        let mut clock = Self { rtc };
        if !clock.rtc.is_running() {
            info!("RTC not running, starting it at {}", FALLBACK_DATETIME);
            if let Err(e) = clock.adjust(&FALLBACK_DATETIME) {
                error!("Failed to start the RTC: {}", e);
                defmt::panic!("no clock, halting");
            }
        }
        clock
    }
}

impl Clock for RtcClock {
    fn now(&mut self) -> Result<DateTime, ClockError> {
        let now = self.rtc.now().map_err(|e| {
            warn!("RTC read failed: {:?}", Debug2Format(&e));
            ClockError::NotRunning
        })?;
        DateTime::try_new(now.year, now.month, now.day, now.hour, now.minute, now.second)
            .map_err(|_| ClockError::UnsupportedDateTime)
    }

    fn adjust(&mut self, datetime: &DateTime) -> Result<(), ClockError> {
        let value = RtcDateTime {
            year: datetime.year,
            month: datetime.month,
            day: datetime.day,
            day_of_week: day_of_week(datetime.weekday()),
            hour: datetime.hour,
            minute: datetime.minute,
            second: datetime.second,
        };
        self.rtc.set_datetime(value).map_err(|e| {
            warn!("RTC write failed: {:?}", Debug2Format(&e));
            ClockError::UnsupportedDateTime
        })
    }
}

/// The relay driver, energized on a high level.
pub struct GpioRelay {
    /// The driver pin
    pin: Output<'static>,
}

impl GpioRelay {
    /// Takes the pin, which should start low.
    pub const fn new(pin: Output<'static>) -> Self {
        Self { pin }
    }
}

impl Relay for GpioRelay {
    fn set(&mut self, on: bool) {
        info!("Relay {}", if on { "on" } else { "off" });
        self.pin.set_level(Level::from(on));
    }
}
