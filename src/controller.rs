//! # Controller
//! Owns the peripherals and every piece of state and advances them once per
//! tick: navigation first, then, whenever the clock shows a new second, the
//! live screens and the two evaluation passes.
//!
//! The evaluation passes only read the committed schedule table and
//! thresholds. Wizards keep their candidates inside their own state until a
//! commit, so an edit in progress never reaches the relay.

use crate::config::{IDLE_TIMEOUT_MS, VOLTAGE_CHECK_PERIOD_SECS};
use crate::datetime::DateTime;
use crate::datetime_menu::{DateTimeView, SetDateTime};
use crate::error::ClockError;
use crate::event::{HeldButtons, InputFrame};
use crate::lcd::{line, show};
use crate::navigation::{Flow, Launch, Menu, Transition};
use crate::persistence::Storage;
use crate::time_alarm::{ClockCode, DeleteTimer, ScheduleTable, SetTimer, TimerView};
use crate::traits::{Clock, KeyValueStore, Relay, TextDisplay, VoltageSensor};
use crate::voltage_alarm::{SetVoltage, Tenths, ThresholdPair, VoltageView};

/// Runtime tunables, defaulting to the generated configuration.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Inactivity after which the menu falls back to the idle screen
    pub idle_timeout_ms: u64,
    /// Period of the voltage pass in seconds, at least 1
    pub voltage_check_period_secs: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            idle_timeout_ms: IDLE_TIMEOUT_MS,
            voltage_check_period_secs: VOLTAGE_CHECK_PERIOD_SECS,
        }
    }
}

/// A running program and its state.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Program {
    /// Browsing the schedules
    TimerView(TimerView),
    /// Setting a schedule
    TimerSet(SetTimer),
    /// Deleting a schedule
    TimerDelete(DeleteTimer),
    /// Showing the thresholds and the voltage
    VoltView(VoltageView),
    /// Setting the thresholds
    VoltSet(SetVoltage),
    /// Showing the clock
    DateTimeView(DateTimeView),
    /// Setting the clock
    DateTimeSet(SetDateTime),
}

impl Program {
    /// Whether the screen shows the clock or the voltage and is redrawn
    /// every second.
    const fn is_live(&self) -> bool {
        matches!(self, Self::VoltView(_) | Self::DateTimeView(_))
    }
}

/// What the operator is looking at.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Time and voltage, waiting for any button
    Idle,
    /// A menu screen
    Menu(Menu),
    /// A program launched from a menu
    Program(Program),
}

/// The whole controller.
pub struct Controller<C, V, D, R, S> {
    /// Wall clock
    clock: C,
    /// Battery voltage
    sensor: V,
    /// Text frame
    display: D,
    /// Charging relay
    relay: R,
    /// Typed records
    storage: Storage<S>,
    /// Runtime tunables
    settings: Settings,
    /// Current screen and program state
    screen: Screen,
    /// Committed schedules, the only ones the time pass reads
    schedules: ScheduleTable,
    /// Committed thresholds, the only ones the voltage pass reads
    thresholds: ThresholdPair,
    /// Latest voltage reading
    reading: Tenths,
    /// Buttons down right now
    held: HeldButtons,
    /// Uptime of the latest button activity
    last_input_ms: u64,
    /// Wall-clock second handled last, as `(hour, minute, second)`
    last_second: Option<(u8, u8, u8)>,
    /// The screen has to be drawn on the next tick
    redraw: bool,
    /// The clock failed on the previous tick
    clock_fault: bool,
}

impl<C, V, D, R, S> Controller<C, V, D, R, S>
where
    C: Clock,
    V: VoltageSensor,
    D: TextDisplay,
    R: Relay,
    S: KeyValueStore,
{
    /// Loads the committed data from `store` and starts on the idle screen.
    /// Records that cannot be loaded are replaced by the factory defaults.
    pub fn new(clock: C, sensor: V, display: D, relay: R, store: S, settings: Settings) -> Self {
        let mut storage = Storage::new(store);
        let schedules = storage.load_schedules().unwrap_or_else(|e| {
            warn!("Failed to load the schedules, using defaults: {:?}", e);
            ScheduleTable::new()
        });
        let thresholds = storage.load_thresholds().unwrap_or_else(|e| {
            warn!("Failed to load the voltage thresholds, using defaults: {:?}", e);
            ThresholdPair::UNSET
        });
        info!("Controller started, thresholds {:?}", thresholds);
        Self {
            clock,
            sensor,
            display,
            relay,
            storage,
            settings,
            screen: Screen::Idle,
            schedules,
            thresholds,
            reading: Tenths::ZERO,
            held: HeldButtons::default(),
            last_input_ms: 0,
            last_second: None,
            redraw: true,
            clock_fault: false,
        }
    }

    /// One pass of the control loop. `input` holds the debounced edges seen
    /// since the previous tick, `uptime_ms` is a monotonic timestamp. A button
    /// held down counts as activity for the inactivity timeout.
    pub fn tick(&mut self, input: &InputFrame, uptime_ms: u64) {
        self.held.update(input);
        if !input.is_empty() || self.held.any() {
            self.last_input_ms = uptime_ms;
        } else if self.screen != Screen::Idle
            && uptime_ms.saturating_sub(self.last_input_ms) >= self.settings.idle_timeout_ms
        {
            info!("No input for {} ms, going to idle", self.settings.idle_timeout_ms);
            self.force_reset();
        }

        let now = self.read_clock();
        let before = self.screen;
        self.navigate(input);
        if self.screen != before {
            debug!("Screen {:?}", self.screen);
            self.redraw = true;
        }

        if let Ok(now) = now {
            let second = (now.hour, now.minute, now.second);
            if self.last_second != Some(second) {
                self.last_second = Some(second);
                self.on_new_second(&now);
            }
        }

        if self.redraw {
            self.redraw = false;
            self.render(now);
        }
    }

    /// Drops every menu and wizard state, discarding uncommitted edits, and
    /// returns to the idle screen. Committed data is untouched.
    pub fn force_reset(&mut self) {
        self.screen = Screen::Idle;
        self.redraw = true;
    }

    /// Reads the clock, logging only when it starts or stops failing.
    fn read_clock(&mut self) -> Result<DateTime, ClockError> {
        let now = self.clock.now();
        match (&now, self.clock_fault) {
            (Err(e), false) => {
                warn!("Clock unreadable, evaluations suspended: {:?}", e);
                self.clock_fault = true;
            }
            (Ok(_), true) => {
                info!("Clock readable again");
                self.clock_fault = false;
            }
            _ => {}
        }
        now
    }

    /// Routes the input to the idle screen, the menu or the running program.
    fn navigate(&mut self, input: &InputFrame) {
        self.screen = match self.screen {
            Screen::Idle => match input.first_press() {
                Some(_) => Screen::Menu(Menu::TimeAlarms),
                None => Screen::Idle,
            },
            Screen::Menu(menu) => match input.first_press().map(|button| menu.on_press(button)) {
                Some(Transition::Go(next)) => Screen::Menu(next),
                Some(Transition::Launch(launch)) => Screen::Program(self.launch(launch)),
                Some(Transition::Stay) | None => Screen::Menu(menu),
            },
            Screen::Program(mut program) => match self.step_program(&mut program, input) {
                Flow::Stay => Screen::Program(program),
                Flow::Exit(menu) => Screen::Menu(menu),
            },
        };
    }

    /// Fresh state of a launched program.
    fn launch(&mut self, launch: Launch) -> Program {
        info!("Launching {:?}", launch);
        match launch {
            Launch::TimerView => Program::TimerView(TimerView::new()),
            Launch::TimerSet => Program::TimerSet(SetTimer::new()),
            Launch::TimerDelete => Program::TimerDelete(DeleteTimer::new()),
            Launch::VoltView => Program::VoltView(VoltageView),
            Launch::VoltSet => Program::VoltSet(SetVoltage::new()),
            Launch::DateTimeView => Program::DateTimeView(DateTimeView),
            Launch::DateTimeSet => Program::DateTimeSet(SetDateTime::snapshot(&mut self.clock)),
        }
    }

    /// Advances the running program by one tick.
    fn step_program(&mut self, program: &mut Program, input: &InputFrame) -> Flow {
        match program {
            Program::TimerView(view) => view.step(input),
            Program::TimerSet(wizard) => wizard.step(input, &mut self.schedules, &mut self.storage),
            Program::TimerDelete(wizard) => {
                wizard.step(input, &mut self.schedules, &mut self.storage)
            }
            Program::VoltView(view) => view.step(input),
            Program::VoltSet(wizard) => wizard.step(input, &mut self.thresholds, &mut self.storage),
            Program::DateTimeView(view) => view.step(input),
            Program::DateTimeSet(wizard) => wizard.step(input, &mut self.clock),
        }
    }

    /// Samples the voltage, runs the passes due this second and refreshes the
    /// live screens.
    fn on_new_second(&mut self, now: &DateTime) {
        self.reading = self.sensor.read_voltage();
        let period = self.settings.voltage_check_period_secs.max(1);

        if now.second == 0 {
            if let Some(code) = ClockCode::new(now.hhmm()) {
                self.schedules.evaluate(code, &mut self.relay);
            }
        } else if now.second % period == 0 {
            if let Some(on) = self.thresholds.evaluate(self.reading) {
                debug!("Voltage {} switches the relay {}", self.reading.value(), on);
                self.relay.set(on);
            }
        }

        match self.screen {
            Screen::Idle => self.redraw = true,
            Screen::Program(program) if program.is_live() => self.redraw = true,
            _ => {}
        }
    }

    /// Draws the current screen.
    fn render(&mut self, now: Result<DateTime, ClockError>) {
        match self.screen {
            Screen::Idle => self.render_idle(now),
            Screen::Menu(menu) => menu.render(&mut self.display),
            Screen::Program(program) => match program {
                Program::TimerView(view) => view.render(&self.schedules, &mut self.display),
                Program::TimerSet(wizard) => wizard.render(&self.schedules, &mut self.display),
                Program::TimerDelete(wizard) => wizard.render(&self.schedules, &mut self.display),
                Program::VoltView(view) => {
                    view.render(&self.thresholds, self.reading, &mut self.display);
                }
                Program::VoltSet(wizard) => wizard.render(&self.thresholds, &mut self.display),
                Program::DateTimeView(view) => view.render(now, &mut self.display),
                Program::DateTimeSet(wizard) => wizard.render(&mut self.display),
            },
        }
    }

    /// Time and voltage.
    fn render_idle(&mut self, now: Result<DateTime, ClockError>) {
        let top = match now {
            Ok(now) => line(format_args!(
                "Time  {:02}:{:02}:{:02}",
                now.hour, now.minute, now.second
            )),
            Err(_) => line(format_args!("Time  --:--:--")),
        };
        show(
            &mut self.display,
            &top,
            &line(format_args!("Volt  {}V", self.reading)),
        );
    }

    /// What the operator is looking at.
    pub const fn screen(&self) -> &Screen {
        &self.screen
    }

    /// The committed schedules.
    pub const fn schedules(&self) -> &ScheduleTable {
        &self.schedules
    }

    /// The committed thresholds.
    pub const fn thresholds(&self) -> &ThresholdPair {
        &self.thresholds
    }

    /// Latest voltage reading.
    pub const fn reading(&self) -> Tenths {
        self.reading
    }

    /// The text frame.
    pub const fn display(&self) -> &D {
        &self.display
    }

    /// The text frame, for the display task to take its dirty flag.
    pub const fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// The charging relay.
    pub const fn relay(&self) -> &R {
        &self.relay
    }

    /// The wall clock.
    pub const fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// The voltage sensor.
    pub const fn sensor_mut(&mut self) -> &mut V {
        &mut self.sensor
    }

    /// The record storage.
    pub const fn storage(&self) -> &Storage<S> {
        &self.storage
    }

    /// The record storage, mutable.
    pub const fn storage_mut(&mut self) -> &mut Storage<S> {
        &mut self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KEY_SCHEDULES;
    use crate::event::Button;
    use crate::lcd::LcdFrame;
    use crate::testing::{FixedVoltage, ManualClock, MemoryStore, RecordingRelay};
    use crate::time_alarm::{Schedule, ScheduleIndex};

    type TestController = Controller<ManualClock, FixedVoltage, LcdFrame, RecordingRelay, MemoryStore>;

    fn controller_at(now: DateTime, store: MemoryStore) -> TestController {
        Controller::new(
            ManualClock::at(now),
            FixedVoltage(Tenths::new(125).unwrap()),
            LcdFrame::new(),
            RecordingRelay::default(),
            store,
            Settings {
                idle_timeout_ms: 1_000,
                voltage_check_period_secs: 5,
            },
        )
    }

    fn press(controller: &mut TestController, button: Button, uptime_ms: u64) {
        controller.tick(&InputFrame::pressed(button), uptime_ms);
        controller.tick(&InputFrame::released(button), uptime_ms + 10);
    }

    #[test]
    fn starts_on_the_idle_screen() {
        let mut controller = controller_at(DateTime::new(2024, 3, 1, 9, 15, 7), MemoryStore::default());
        controller.tick(&InputFrame::new(), 0);
        assert_eq!(controller.screen(), &Screen::Idle);
        assert_eq!(controller.display().line(0), "Time  09:15:07");
        assert_eq!(controller.display().line(1), "Volt  12.5V");
    }

    #[test]
    fn any_button_opens_the_menu() {
        let mut controller = controller_at(DateTime::new(2024, 3, 1, 9, 15, 7), MemoryStore::default());
        controller.tick(&InputFrame::new(), 0);
        press(&mut controller, Button::Left, 10);
        assert_eq!(controller.screen(), &Screen::Menu(Menu::TimeAlarms));
        assert_eq!(controller.display().line(0), ">Time alarms");
        assert_eq!(controller.display().line(1), " Voltage alarm");
    }

    #[test]
    fn inactivity_returns_to_idle() {
        let mut controller = controller_at(DateTime::new(2024, 3, 1, 9, 15, 7), MemoryStore::default());
        press(&mut controller, Button::Ok, 0);
        press(&mut controller, Button::Ok, 100);
        assert!(matches!(controller.screen(), Screen::Menu(_) | Screen::Program(_)));

        controller.tick(&InputFrame::new(), 500);
        assert_ne!(controller.screen(), &Screen::Idle);
        controller.tick(&InputFrame::new(), 1_110);
        assert_eq!(controller.screen(), &Screen::Idle);
        assert_eq!(controller.display().line(0), "Time  09:15:07");
    }

    #[test]
    fn held_button_keeps_the_menu_open() {
        let mut controller = controller_at(DateTime::new(2024, 3, 1, 9, 15, 7), MemoryStore::default());
        press(&mut controller, Button::Ok, 0);
        controller.tick(&InputFrame::pressed(Button::Down), 100);
        assert_eq!(controller.screen(), &Screen::Menu(Menu::VoltageAlarm));

        controller.tick(&InputFrame::new(), 1_500);
        controller.tick(&InputFrame::new(), 3_000);
        assert_eq!(controller.screen(), &Screen::Menu(Menu::VoltageAlarm));

        controller.tick(&InputFrame::released(Button::Down), 3_100);
        controller.tick(&InputFrame::new(), 3_500);
        assert_eq!(controller.screen(), &Screen::Menu(Menu::VoltageAlarm));
        controller.tick(&InputFrame::new(), 4_100);
        assert_eq!(controller.screen(), &Screen::Idle);
    }

    #[test]
    fn time_pass_runs_once_at_second_zero() {
        let mut store = MemoryStore::default();
        let table = ScheduleTable::new().with(
            ScheduleIndex::FIRST,
            Schedule {
                on: ClockCode::new(1000).unwrap(),
                off: ClockCode::new(1100).unwrap(),
                active: true,
            },
        );
        Storage::new(&mut store).save_schedules(&table).unwrap();

        let mut controller = controller_at(DateTime::new(2024, 3, 1, 9, 59, 59), store);
        controller.tick(&InputFrame::new(), 0);
        assert_eq!(controller.relay().history(), &[] as &[bool]);

        controller.clock_mut().set(DateTime::new(2024, 3, 1, 10, 0, 0));
        controller.tick(&InputFrame::new(), 20);
        controller.tick(&InputFrame::new(), 40);
        assert_eq!(controller.relay().history(), &[true]);
    }

    #[test]
    fn voltage_pass_follows_the_period() {
        let mut store = MemoryStore::default();
        let thresholds = ThresholdPair {
            on: Tenths::new(130).unwrap(),
            off: Tenths::new(140).unwrap(),
            active: true,
        };
        Storage::new(&mut store).save_thresholds(&thresholds).unwrap();

        let mut controller = controller_at(DateTime::new(2024, 3, 1, 10, 0, 4), store);
        controller.tick(&InputFrame::new(), 0);
        assert_eq!(controller.relay().history(), &[] as &[bool]);

        controller.clock_mut().set(DateTime::new(2024, 3, 1, 10, 0, 5));
        controller.tick(&InputFrame::new(), 1_000);
        controller.tick(&InputFrame::new(), 1_020);
        assert_eq!(controller.relay().history(), &[true]);

        controller.sensor_mut().0 = Tenths::new(135).unwrap();
        controller.clock_mut().set(DateTime::new(2024, 3, 1, 10, 0, 10));
        controller.tick(&InputFrame::new(), 6_000);
        assert_eq!(controller.relay().history(), &[true]);
    }

    #[test]
    fn stopped_clock_skips_evaluations() {
        let mut store = MemoryStore::default();
        let thresholds = ThresholdPair {
            on: Tenths::new(130).unwrap(),
            off: Tenths::new(140).unwrap(),
            active: true,
        };
        Storage::new(&mut store).save_thresholds(&thresholds).unwrap();
        let mut controller = Controller::new(
            ManualClock::stopped(),
            FixedVoltage(Tenths::new(100).unwrap()),
            LcdFrame::new(),
            RecordingRelay::default(),
            store,
            Settings::default(),
        );
        controller.tick(&InputFrame::new(), 0);
        assert!(controller.relay().history().is_empty());
        assert_eq!(controller.display().line(0), "Time  --:--:--");
    }

    #[test]
    fn corrupt_record_falls_back_to_defaults() {
        let thresholds = ThresholdPair {
            on: Tenths::new(118).unwrap(),
            off: Tenths::new(136).unwrap(),
            active: true,
        };
        let mut store = MemoryStore::default();
        Storage::new(&mut store).save_thresholds(&thresholds).unwrap();
        // wrong version and far too short
        store.put_raw(KEY_SCHEDULES, &[0xFF, 0x01, 0x02]);

        let controller = controller_at(DateTime::new(2024, 3, 1, 0, 0, 1), store);
        assert_eq!(controller.schedules(), &ScheduleTable::new());
        assert_eq!(controller.thresholds(), &thresholds);
    }

    #[test]
    fn unreadable_store_starts_with_defaults() {
        let controller = controller_at(DateTime::new(2024, 3, 1, 0, 0, 1), MemoryStore::failing());
        assert_eq!(controller.schedules(), &ScheduleTable::new());
        assert_eq!(controller.thresholds(), &ThresholdPair::UNSET);
    }
}
