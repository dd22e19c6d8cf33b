//! # Display task
//! Paints the controller's 16x2 text frame onto the SSD1306 OLED.
//!
//! The control loop publishes a copy of the frame and signals; the task then
//! redraws the whole screen. 16 columns of the 8 pixel wide font fill the
//! 128 pixel width, the edit cursor is an underline below its cell.

use crate::task::resources::Irqs;
use core::cell::RefCell;
use defmt::{Debug2Format, error, info};
use embassy_rp::i2c::{Config, I2c};
use embassy_rp::peripherals::{I2C0, PIN_12, PIN_13};
use embassy_rp::Peri;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embedded_graphics::{
    mono_font::{MonoTextStyleBuilder, ascii::FONT_8X13},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PrimitiveStyle},
    text::{Baseline, Text},
};
use pico_charge_relay::config::LCD_ROWS;
use pico_charge_relay::lcd::LcdFrame;
use ssd1306_async::{I2CDisplayInterface, Ssd1306, prelude::*};

/// Width of one character cell in pixels.
const CELL_WIDTH: i32 = 8;

/// Height of one character cell in pixels.
const CELL_HEIGHT: i32 = 13;

/// Top edge of each text row, the rows are centered on the 64 pixel height.
const ROW_TOP: [i32; LCD_ROWS] = [14, 36];

/// The frame the display task paints.
static FRAME: Mutex<CriticalSectionRawMutex, RefCell<LcdFrame>> =
    Mutex::new(RefCell::new(LcdFrame::new()));

/// Signal for display updates
static DISPLAY_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Replaces the frame on screen with `frame`.
pub fn publish_frame(frame: &LcdFrame) {
    FRAME.lock(|shared| shared.borrow_mut().clone_from(frame));
    DISPLAY_SIGNAL.signal(());
}

/// Copy of the frame to paint.
fn snapshot() -> LcdFrame {
    FRAME.lock(|shared| shared.borrow().clone())
}

#[embassy_executor::task]
pub async fn display(i2c0: Peri<'static, I2C0>, scl: Peri<'static, PIN_13>, sda: Peri<'static, PIN_12>) {
    info!("Display task started");

    let mut config = Config::default();
    config.frequency = 400_000;
    let i2c = I2c::new_async(i2c0, scl, sda, Irqs, config);

    let interface = I2CDisplayInterface::new(i2c);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    if let Err(e) = display.init().await {
        error!("Failed to initialize display: {}", Debug2Format(&e));
        return;
    }

    let text_style = MonoTextStyleBuilder::new()
        .font(&FONT_8X13)
        .text_color(BinaryColor::On)
        .build();
    let cursor_style = PrimitiveStyle::with_stroke(BinaryColor::On, 1);

    loop {
        DISPLAY_SIGNAL.wait().await;
        let frame = snapshot();

        // nothing is sent to the display before flush()
        display.clear();
        for (row, top) in ROW_TOP.iter().enumerate() {
            // drawing into the buffer cannot fail
            let _ = Text::with_baseline(frame.row(row), Point::new(0, *top), text_style, Baseline::Top)
                .draw(&mut display);
        }
        if let Some((row, col)) = frame.cursor() {
            if let Some(top) = ROW_TOP.get(usize::from(row)) {
                let x = i32::from(col) * CELL_WIDTH;
                let y = top + CELL_HEIGHT;
                let _ = Line::new(Point::new(x, y), Point::new(x + CELL_WIDTH - 1, y))
                    .into_styled(cursor_style)
                    .draw(&mut display);
            }
        }

        if let Err(e) = display.flush().await {
            error!("Failed to flush display: {}", Debug2Format(&e));
        }
    }
}
