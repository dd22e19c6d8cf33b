//! # Button Tasks
//! One task per button. Each task debounces its pin and reports every stable
//! level change as a [`ButtonEdge`] to the control loop.

use defmt::info;
use embassy_rp::gpio::{Input, Level};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Timer};
use pico_charge_relay::config::BUTTON_DEBOUNCE_MS;
use pico_charge_relay::{Button, ButtonEdge};

/// Edges waiting for the next tick of the control loop. Six buttons pressed
/// and released within one tick fill it exactly.
static EDGE_CHANNEL: Channel<CriticalSectionRawMutex, ButtonEdge, 12> = Channel::new();

/// Queues an edge for the control loop.
async fn send_edge(edge: ButtonEdge) {
    EDGE_CHANNEL.sender().send(edge).await;
}

/// Takes the next queued edge without waiting.
pub fn try_receive_edge() -> Option<ButtonEdge> {
    EDGE_CHANNEL.try_receive().ok()
}

/// Debounces one active-low button.
pub struct ButtonManager<'a> {
    /// The input pin for the button
    input: Input<'a>,
    /// Time the level must hold before it counts
    debounce_duration: Duration,
    /// The button being managed
    button: Button,
}

impl<'a> ButtonManager<'a> {
    /// Create a new `ButtonManager`
    pub const fn new(input: Input<'a>, button: Button) -> Self {
        Self {
            input,
            debounce_duration: Duration::from_millis(BUTTON_DEBOUNCE_MS),
            button,
        }
    }

    /// Reports edges forever. The pin is pulled up, so a low level is a
    /// pressed button.
    pub async fn handle_button_edges(&mut self) {
        loop {
            let edge = match self.debounce().await {
                Level::Low => ButtonEdge::rose(self.button),
                Level::High => ButtonEdge::fell(self.button),
            };
            send_edge(edge).await;
        }
    }

    /// Waits for the level to change and stay changed for the debounce
    /// duration, then returns the new level.
    pub async fn debounce(&mut self) -> Level {
        loop {
            let l1 = self.input.get_level();

            self.input.wait_for_any_edge().await;

            Timer::after(self.debounce_duration).await;

            let l2 = self.input.get_level();
            if l1 != l2 {
                break l2;
            }
        }
    }
}

#[embassy_executor::task(pool_size = 6)]
pub async fn button_handler(input: Input<'static>, button: Button) {
    let mut btn = ButtonManager::new(input, button);
    info!("{} task started", button);
    btn.handle_button_edges().await;
}
