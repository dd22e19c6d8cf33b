//! # Resources
//! Interrupt bindings and the pin map of the board.
//!
//! | Function       | Pin    |
//! |----------------|--------|
//! | Up button      | GP2    |
//! | Down button    | GP3    |
//! | Left button    | GP4    |
//! | Right button   | GP5    |
//! | OK button      | GP6    |
//! | Back button    | GP7    |
//! | OLED SDA (I2C0)| GP12   |
//! | OLED SCL (I2C0)| GP13   |
//! | Relay driver   | GP15   |
//! | Battery divider| GP26   |
//!
//! Buttons switch to ground against the internal pull-up.

use embassy_rp::adc::InterruptHandler as AdcInterruptHandler;
use embassy_rp::bind_interrupts;
use embassy_rp::i2c::InterruptHandler as I2cInterruptHandler;
use embassy_rp::peripherals::I2C0;

bind_interrupts!(pub struct Irqs {
    ADC_IRQ_FIFO => AdcInterruptHandler;
    I2C0_IRQ => I2cInterruptHandler<I2C0>;
});
