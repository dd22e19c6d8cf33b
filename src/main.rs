//! Firmware of the charge relay controller on a Raspberry Pi Pico.
//!
//! Every peripheral gets its own task; the controller logic from the library
//! runs in the orchestrator task. See [`task::resources`] for the pin map.

// we are in an environment with constrained resources, so we do not use the standard library and we define a different entry point.
#![no_std]
#![no_main]

use crate::task::resources::Irqs;
use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig};
use embassy_rp::flash::{Async, Flash};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::rtc::Rtc;
use pico_charge_relay::Button;
use pico_charge_relay::config::FLASH_SIZE;
use {defmt_rtt as _, panic_probe as _};

mod task;

// Entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Program start");

    // Initialize the peripherals for the RP2040
    let p = embassy_rp::init(Default::default());

    // the relay stays released until the first evaluation says otherwise
    let relay = task::peripherals::GpioRelay::new(Output::new(p.PIN_15, Level::Low));
    let clock = task::peripherals::RtcClock::new(Rtc::new(p.RTC));

    // flash first, the orchestrator waits for the stored records
    let flash = Flash::<_, Async, { FLASH_SIZE }>::new(p.FLASH, p.DMA_CH0);
    unwrap!(spawner.spawn(task::storage::storage_handler(flash)));

    let buttons = [
        (Input::new(p.PIN_2, Pull::Up), Button::Up),
        (Input::new(p.PIN_3, Pull::Up), Button::Down),
        (Input::new(p.PIN_4, Pull::Up), Button::Left),
        (Input::new(p.PIN_5, Pull::Up), Button::Right),
        (Input::new(p.PIN_6, Pull::Up), Button::Ok),
        (Input::new(p.PIN_7, Pull::Up), Button::Back),
    ];
    for (input, button) in buttons {
        unwrap!(spawner.spawn(task::buttons::button_handler(input, button)));
    }

    let adc = Adc::new(p.ADC, Irqs, AdcConfig::default());
    let channel = Channel::new_pin(p.PIN_26, Pull::None);
    unwrap!(spawner.spawn(task::voltage::voltage_sampler(adc, channel)));

    unwrap!(spawner.spawn(task::display::display(p.I2C0, p.PIN_13, p.PIN_12)));

    unwrap!(spawner.spawn(task::orchestrate::orchestrator(clock, relay)));
}
