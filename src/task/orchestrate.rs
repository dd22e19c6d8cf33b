//! # Orchestrate Task
//! The control loop: every tick it collects the button edges queued since
//! the previous tick, advances the controller and hands a changed frame to
//! the display task.

use defmt::info;
use embassy_time::{Duration, Instant, Ticker};
use pico_charge_relay::config::TICK_INTERVAL_MS;
use pico_charge_relay::lcd::LcdFrame;
use pico_charge_relay::{Controller, InputFrame, Settings};

use crate::task::{
    buttons::try_receive_edge,
    display::publish_frame,
    peripherals::{GpioRelay, RtcClock},
    storage::{FlashMirror, wait_for_mirror},
    voltage::AdcVoltage,
};

/// The controller wired to the board.
type BoardController = Controller<RtcClock, AdcVoltage, LcdFrame, GpioRelay, FlashMirror>;

/// Edges queued since the previous tick.
fn collect_input() -> InputFrame {
    let mut frame = InputFrame::new();
    while let Some(edge) = try_receive_edge() {
        frame.record(edge);
    }
    frame
}

/// Runs the controller once the stored records are available.
#[embassy_executor::task]
pub async fn orchestrator(clock: RtcClock, relay: GpioRelay) {
    info!("Orchestrate task waiting for the stored records");
    wait_for_mirror().await;

    let mut controller: BoardController = Controller::new(
        clock,
        AdcVoltage,
        LcdFrame::new(),
        relay,
        FlashMirror,
        Settings::default(),
    );
    info!("Orchestrate task started");

    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));
    loop {
        let input = collect_input();
        controller.tick(&input, Instant::now().as_millis());
        if controller.display_mut().take_dirty() {
            publish_frame(controller.display());
        }
        ticker.next().await;
    }
}
