//! # Menu navigation
//! The fixed menu tree. Each menu maps every button to either staying put,
//! another menu, or launching one of the seven programs (viewers and wizards)
//! that the controller then drives until they exit.
//!
//! ```text
//! Idle ─any─> TimeAlarms ── VoltageAlarm ── DateTime
//!                │               │              │
//!           ViewTimers     ViewVoltAlarm   ViewDateTime
//!           SetTimer       SetVoltAlarm    SetDateTime
//!           DeleteTimer
//! ```

use crate::event::{Button, InputFrame};
use crate::lcd::show;
use crate::traits::TextDisplay;

/// The menu screens.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    /// Home, time alarms highlighted
    TimeAlarms,
    /// Home, voltage alarm highlighted
    VoltageAlarm,
    /// Home, date and time highlighted
    DateTime,
    /// Time alarms, view highlighted
    ViewTimers,
    /// Time alarms, set highlighted
    SetTimer,
    /// Time alarms, delete highlighted
    DeleteTimer,
    /// Voltage alarm, view highlighted
    ViewVoltAlarm,
    /// Voltage alarm, set highlighted
    SetVoltAlarm,
    /// Date and time, view highlighted
    ViewDateTime,
    /// Date and time, set highlighted
    SetDateTime,
}

/// The programs a menu can launch.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    /// Browse the schedules
    TimerView,
    /// Set a schedule
    TimerSet,
    /// Delete a schedule
    TimerDelete,
    /// Show the thresholds and the voltage
    VoltView,
    /// Set the thresholds
    VoltSet,
    /// Show the clock
    DateTimeView,
    /// Set the clock
    DateTimeSet,
}

/// Where a button press on a menu leads.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The button has no meaning here
    Stay,
    /// Move to another menu
    Go(Menu),
    /// Hand control to a program
    Launch(Launch),
}

/// What a program asks of the navigation after one tick.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep running the program
    Stay,
    /// The program is done, show this menu
    Exit(Menu),
}

/// `released` if the button was already let go during this tick, `waiting`
/// otherwise. Steps that advance on OK wait for its release before moving on.
pub fn once_released<T>(input: &InputFrame, waiting: T, released: T) -> T {
    if input.fell(Button::Ok) {
        released
    } else {
        waiting
    }
}

impl Menu {
    /// The transition table.
    pub const fn on_press(self, button: Button) -> Transition {
        use Button::{Back, Down, Ok, Up};
        use Transition::{Go, Launch as Run, Stay};
        match (self, button) {
            (Self::TimeAlarms, Down) => Go(Self::VoltageAlarm),
            (Self::TimeAlarms, Ok) => Go(Self::ViewTimers),

            (Self::VoltageAlarm, Up) => Go(Self::TimeAlarms),
            (Self::VoltageAlarm, Down) => Go(Self::DateTime),
            (Self::VoltageAlarm, Ok) => Go(Self::ViewVoltAlarm),

            (Self::DateTime, Up | Back) => Go(Self::VoltageAlarm),
            (Self::DateTime, Ok) => Go(Self::ViewDateTime),

            (Self::ViewTimers, Down) => Go(Self::SetTimer),
            (Self::ViewTimers, Ok) => Run(Launch::TimerView),
            (Self::ViewTimers | Self::SetTimer | Self::DeleteTimer, Back) => Go(Self::TimeAlarms),

            (Self::SetTimer, Up) => Go(Self::ViewTimers),
            (Self::SetTimer, Down) => Go(Self::DeleteTimer),
            (Self::SetTimer, Ok) => Run(Launch::TimerSet),

            (Self::DeleteTimer, Up) => Go(Self::SetTimer),
            (Self::DeleteTimer, Ok) => Run(Launch::TimerDelete),

            (Self::ViewVoltAlarm, Down) => Go(Self::SetVoltAlarm),
            (Self::ViewVoltAlarm, Ok) => Run(Launch::VoltView),
            (Self::ViewVoltAlarm | Self::SetVoltAlarm, Back) => Go(Self::VoltageAlarm),

            (Self::SetVoltAlarm, Up) => Go(Self::ViewVoltAlarm),
            (Self::SetVoltAlarm, Ok) => Run(Launch::VoltSet),

            (Self::ViewDateTime, Down) => Go(Self::SetDateTime),
            (Self::ViewDateTime, Ok) => Run(Launch::DateTimeView),
            (Self::ViewDateTime | Self::SetDateTime, Back) => Go(Self::DateTime),

            (Self::SetDateTime, Up) => Go(Self::ViewDateTime),
            (Self::SetDateTime, Ok) => Run(Launch::DateTimeSet),

            _ => Stay,
        }
    }

    /// Static text of the menu, `>` marks the highlighted entry.
    pub const fn text(self) -> (&'static str, &'static str) {
        match self {
            Self::TimeAlarms => (">Time alarms", " Voltage alarm"),
            Self::VoltageAlarm => (" Time alarms", ">Voltage alarm"),
            Self::DateTime => (" Voltage alarm", ">Set/view time"),
            Self::ViewTimers => (">View timer(s)", " Set timer"),
            Self::SetTimer => (">Set timer", " Delete timer"),
            Self::DeleteTimer => (" Set timer", ">Delete timer"),
            Self::ViewVoltAlarm => (">View volt alarm", " Set volt alarm"),
            Self::SetVoltAlarm => (" View volt alarm", ">Set volt alarm"),
            Self::ViewDateTime => (">View datetime", " Set datetime"),
            Self::SetDateTime => (" View datetime", ">Set datetime"),
        }
    }

    /// Draws the menu.
    pub fn render<D: TextDisplay>(self, display: &mut D) {
        let (top, bottom) = self.text();
        show(display, top, bottom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Follows a path of presses from `start`, failing on anything but menus.
    fn walk(start: Menu, presses: &[Button]) -> Menu {
        presses.iter().fold(start, |menu, button| match menu.on_press(*button) {
            Transition::Go(next) => next,
            Transition::Stay => menu,
            Transition::Launch(program) => panic!("unexpected launch of {program:?}"),
        })
    }

    #[test]
    fn home_menu_scrolls_without_wrapping() {
        assert_eq!(Menu::TimeAlarms.on_press(Button::Up), Transition::Stay);
        assert_eq!(walk(Menu::TimeAlarms, &[Button::Down, Button::Down]), Menu::DateTime);
        assert_eq!(Menu::DateTime.on_press(Button::Down), Transition::Stay);
        assert_eq!(walk(Menu::DateTime, &[Button::Up, Button::Up]), Menu::TimeAlarms);
    }

    #[test]
    fn home_entries_have_no_way_back_except_date_time() {
        assert_eq!(Menu::TimeAlarms.on_press(Button::Back), Transition::Stay);
        assert_eq!(Menu::VoltageAlarm.on_press(Button::Back), Transition::Stay);
        assert_eq!(Menu::DateTime.on_press(Button::Back), Transition::Go(Menu::VoltageAlarm));
    }

    #[test]
    fn submenus_return_to_their_parent() {
        for menu in [Menu::ViewTimers, Menu::SetTimer, Menu::DeleteTimer] {
            assert_eq!(menu.on_press(Button::Back), Transition::Go(Menu::TimeAlarms));
        }
        for menu in [Menu::ViewVoltAlarm, Menu::SetVoltAlarm] {
            assert_eq!(menu.on_press(Button::Back), Transition::Go(Menu::VoltageAlarm));
        }
        for menu in [Menu::ViewDateTime, Menu::SetDateTime] {
            assert_eq!(menu.on_press(Button::Back), Transition::Go(Menu::DateTime));
        }
    }

    #[test]
    fn ok_launches_the_programs() {
        let expected = [
            (Menu::ViewTimers, Launch::TimerView),
            (Menu::SetTimer, Launch::TimerSet),
            (Menu::DeleteTimer, Launch::TimerDelete),
            (Menu::ViewVoltAlarm, Launch::VoltView),
            (Menu::SetVoltAlarm, Launch::VoltSet),
            (Menu::ViewDateTime, Launch::DateTimeView),
            (Menu::SetDateTime, Launch::DateTimeSet),
        ];
        for (menu, program) in expected {
            assert_eq!(menu.on_press(Button::Ok), Transition::Launch(program));
        }
    }

    #[test]
    fn left_and_right_do_nothing_on_menus() {
        let all = [
            Menu::TimeAlarms,
            Menu::VoltageAlarm,
            Menu::DateTime,
            Menu::ViewTimers,
            Menu::SetTimer,
            Menu::DeleteTimer,
            Menu::ViewVoltAlarm,
            Menu::SetVoltAlarm,
            Menu::ViewDateTime,
            Menu::SetDateTime,
        ];
        for menu in all {
            assert_eq!(menu.on_press(Button::Left), Transition::Stay);
            assert_eq!(menu.on_press(Button::Right), Transition::Stay);
            let (top, bottom) = menu.text();
            assert!(top.len() <= 16 && bottom.len() <= 16);
        }
    }

    #[test]
    fn once_released_checks_the_ok_release() {
        assert_eq!(once_released(&InputFrame::pressed(Button::Ok), 1, 2), 1);
        assert_eq!(once_released(&InputFrame::released(Button::Ok), 1, 2), 2);
    }
}
