//! A button-level driver for the controller over the in-memory doubles.

#![allow(dead_code)]

use pico_charge_relay::controller::Screen;
use pico_charge_relay::datetime::DateTime;
use pico_charge_relay::lcd::LcdFrame;
use pico_charge_relay::testing::{FixedVoltage, ManualClock, MemoryStore, RecordingRelay};
use pico_charge_relay::time_alarm::ScheduleTable;
use pico_charge_relay::voltage_alarm::{Tenths, ThresholdPair};
use pico_charge_relay::{Button, Controller, InputFrame, Settings};

pub type TestController = Controller<ManualClock, FixedVoltage, LcdFrame, RecordingRelay, MemoryStore>;

/// Milliseconds between two ticks.
const TICK_MS: u64 = 20;

/// A controller plus a monotonic uptime, driven one button at a time.
pub struct Rig {
    pub controller: TestController,
    uptime_ms: u64,
}

impl Rig {
    /// A controller at `now` reading 12.5 V, on top of `store`.
    pub fn new(now: DateTime, store: MemoryStore) -> Self {
        let mut rig = Self {
            controller: Controller::new(
                ManualClock::at(now),
                FixedVoltage(Tenths::new(125).unwrap()),
                LcdFrame::new(),
                RecordingRelay::default(),
                store,
                Settings::default(),
            ),
            uptime_ms: 0,
        };
        rig.idle();
        rig
    }

    /// One tick with `input`.
    pub fn tick(&mut self, input: InputFrame) {
        self.uptime_ms += TICK_MS;
        self.controller.tick(&input, self.uptime_ms);
    }

    /// One tick without input.
    pub fn idle(&mut self) {
        self.tick(InputFrame::new());
    }

    /// Press then release.
    pub fn press(&mut self, button: Button) {
        self.tick(InputFrame::pressed(button));
        self.tick(InputFrame::released(button));
    }

    /// Presses `button` `times` times.
    pub fn repeat(&mut self, button: Button, times: usize) {
        for _ in 0..times {
            self.press(button);
        }
    }

    /// Moves the clock and lets the controller see it.
    pub fn set_time(&mut self, now: DateTime) {
        self.controller.clock_mut().set(now);
        self.idle();
    }

    /// Dials in a new voltage, read at the next new second.
    pub fn set_voltage(&mut self, tenths: u16) {
        self.controller.sensor_mut().0 = Tenths::new(tenths).unwrap();
    }

    /// Both display rows without trailing spaces.
    pub fn text(&self) -> (String, String) {
        let display = self.controller.display();
        (display.line(0).to_string(), display.line(1).to_string())
    }

    pub fn screen(&self) -> Screen {
        *self.controller.screen()
    }

    pub fn relay(&self) -> &[bool] {
        self.controller.relay().history()
    }

    pub fn schedules(&self) -> ScheduleTable {
        *self.controller.schedules()
    }

    pub fn thresholds(&self) -> ThresholdPair {
        *self.controller.thresholds()
    }

    pub fn store(&self) -> &MemoryStore {
        self.controller.storage().store()
    }

    /// The store underneath the running controller.
    pub fn store_mut(&mut self) -> &mut MemoryStore {
        self.controller.storage_mut().store_mut()
    }

    /// From idle into the set-timer wizard.
    pub fn open_set_timer(&mut self) {
        self.press(Button::Ok); // idle -> Time alarms
        self.press(Button::Ok); // -> View timer(s)
        self.press(Button::Down); // -> Set timer
        self.press(Button::Ok);
    }

    /// From idle into the delete-timer wizard.
    pub fn open_delete_timer(&mut self) {
        self.press(Button::Ok);
        self.press(Button::Ok);
        self.press(Button::Down);
        self.press(Button::Down); // -> Delete timer
        self.press(Button::Ok);
    }

    /// From idle into the set-thresholds wizard.
    pub fn open_set_voltage(&mut self) {
        self.press(Button::Ok);
        self.press(Button::Down); // -> Voltage alarm
        self.press(Button::Ok); // -> View volt alarm
        self.press(Button::Down); // -> Set volt alarm
        self.press(Button::Ok);
    }

    /// From idle into the set date and time wizard.
    pub fn open_set_datetime(&mut self) {
        self.press(Button::Ok);
        self.press(Button::Down);
        self.press(Button::Down); // -> Set/view time
        self.press(Button::Ok); // -> View datetime
        self.press(Button::Down); // -> Set datetime
        self.press(Button::Ok);
    }
}
