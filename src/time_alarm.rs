//! # Time alarms
//! Ten daily schedules, each switching the relay on at one time of day and off
//! at another, plus the wizards that view, set and delete them.
//!
//! The evaluation pass runs once per minute, when the seconds roll over to 0,
//! and only ever reads the committed [`ScheduleTable`]. The wizards work on
//! their own copies until the operator confirms.

use crate::config::SCHEDULE_COUNT;
use crate::digit_editor::{CLOCK_TIME, EditSession};
use crate::event::{Button, InputFrame};
use crate::lcd::{line, show, show_editing};
use crate::navigation::{Flow, Menu, once_released};
use crate::persistence::Storage;
use crate::traits::{KeyValueStore, Relay, TextDisplay};
use core::fmt;

/// A time of day encoded as `hour * 100 + minute`, 0000..=2359.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockCode(u16);

impl ClockCode {
    /// 00:00
    pub const MIDNIGHT: Self = Self(0);

    /// Accepts `hhmm` if it is a valid time of day.
    pub const fn new(hhmm: u16) -> Option<Self> {
        if hhmm / 100 <= 23 && hhmm % 100 <= 59 {
            Some(Self(hhmm))
        } else {
            None
        }
    }

    /// The `HHMM` value.
    pub const fn value(self) -> u16 {
        self.0
    }

    /// The four digits, most significant first.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn digits(self) -> [u8; 4] {
        let v = self.0;
        [
            (v / 1000) as u8,
            (v / 100 % 10) as u8,
            (v / 10 % 10) as u8,
            (v % 10) as u8,
        ]
    }

    /// Re-encodes four digits, `None` if they do not form a time of day.
    pub const fn from_digits(digits: &[u8; 4]) -> Option<Self> {
        let [a, b, c, d] = *digits;
        if a > 9 || b > 9 || c > 9 || d > 9 {
            return None;
        }
        Self::new(a as u16 * 1000 + b as u16 * 100 + c as u16 * 10 + d as u16)
    }
}

impl fmt::Display for ClockCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// Position of a schedule in the table, 0..`SCHEDULE_COUNT`.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScheduleIndex(u8);

impl ScheduleIndex {
    /// The first schedule.
    pub const FIRST: Self = Self(0);

    /// The index `i`, if the table has it.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new(i: usize) -> Option<Self> {
        if i < SCHEDULE_COUNT {
            Some(Self(i as u8))
        } else {
            None
        }
    }

    /// Zero based position.
    pub const fn get(self) -> usize {
        self.0 as usize
    }

    /// One based number, as shown to the operator.
    pub const fn number(self) -> u8 {
        self.0 + 1
    }

    /// The following index, staying on the last one.
    const fn next(self) -> Self {
        if (self.0 as usize) + 1 < SCHEDULE_COUNT {
            Self(self.0 + 1)
        } else {
            self
        }
    }

    /// The preceding index, staying on the first one.
    const fn prev(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

/// One switching schedule.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Schedule {
    /// Time the relay is switched on
    pub on: ClockCode,
    /// Time the relay is switched off
    pub off: ClockCode,
    /// Only active schedules are evaluated
    pub active: bool,
}

impl Schedule {
    /// Factory state: 0000/0000, inactive.
    pub const EMPTY: Self = Self {
        on: ClockCode::MIDNIGHT,
        off: ClockCode::MIDNIGHT,
        active: false,
    };
}

/// The committed schedules.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleTable {
    /// Indexed by [`ScheduleIndex`]
    schedules: [Schedule; SCHEDULE_COUNT],
}

impl Default for ScheduleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleTable {
    /// All schedules empty and inactive.
    pub const fn new() -> Self {
        Self {
            schedules: [Schedule::EMPTY; SCHEDULE_COUNT],
        }
    }

    /// Builds a table from its schedules.
    pub const fn from_schedules(schedules: [Schedule; SCHEDULE_COUNT]) -> Self {
        Self { schedules }
    }

    /// The schedule at `index`.
    pub const fn get(&self, index: ScheduleIndex) -> &Schedule {
        &self.schedules[index.get()]
    }

    /// All schedules in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Schedule> {
        self.schedules.iter()
    }

    /// A copy of the table with `index` replaced.
    #[must_use]
    pub const fn with(&self, index: ScheduleIndex, schedule: Schedule) -> Self {
        let mut table = *self;
        table.schedules[index.get()] = schedule;
        table
    }

    /// Applies every active schedule matching `now` to the relay, in index
    /// order, and returns the last command given. A schedule whose ON and OFF
    /// times are equal switches on.
    pub fn evaluate<R: Relay>(&self, now: ClockCode, relay: &mut R) -> Option<bool> {
        let mut command = None;
        for (i, schedule) in self.schedules.iter().enumerate() {
            if !schedule.active {
                continue;
            }
            if now == schedule.on {
                info!("Schedule {} switches the relay on at {}", i + 1, now.value());
                relay.set(true);
                command = Some(true);
            } else if now == schedule.off {
                info!("Schedule {} switches the relay off at {}", i + 1, now.value());
                relay.set(false);
                command = Some(false);
            }
        }
        command
    }
}

/// Renders the `ON:hhmm OFF:hhmm` / `<-(n)->` browse screen.
fn show_browse<D: TextDisplay>(display: &mut D, table: &ScheduleTable, index: ScheduleIndex) {
    let schedule = table.get(index);
    show(
        display,
        &line(format_args!("ON:{} OFF:{}", schedule.on, schedule.off)),
        &line(format_args!("<-({})->", index.number())),
    );
}

/// Left and Right on a browse screen.
fn browse(index: ScheduleIndex, button: Button) -> ScheduleIndex {
    match button {
        Button::Right => index.next(),
        Button::Left => index.prev(),
        _ => index,
    }
}

/// Read-only browser over the schedules.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerView {
    /// Schedule on screen
    index: ScheduleIndex,
}

impl TimerView {
    /// Starts on the first schedule.
    pub const fn new() -> Self {
        Self {
            index: ScheduleIndex::FIRST,
        }
    }

    /// Left/Right scroll, Back leaves.
    pub fn step(&mut self, input: &InputFrame) -> Flow {
        match input.first_press() {
            Some(Button::Back) => return Flow::Exit(Menu::ViewTimers),
            Some(button) => self.index = browse(self.index, button),
            None => {}
        }
        Flow::Stay
    }

    /// Draws the schedule on screen.
    pub fn render<D: TextDisplay>(&self, table: &ScheduleTable, display: &mut D) {
        show_browse(display, table, self.index);
    }
}

/// The set-schedule wizard: select, edit ON, edit OFF, confirm.
///
/// Once a schedule is selected there is no way back, the operator either
/// confirms or lets the menu time out.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetTimer {
    /// Choosing the schedule
    Select(ScheduleIndex),
    /// Schedule chosen, waiting for OK to be released
    AwaitSelectRelease(ScheduleIndex),
    /// Showing the committed ON time
    ReviewOn(ScheduleIndex),
    /// Editing the ON time
    EditOn {
        /// Schedule being edited
        index: ScheduleIndex,
        /// The ON time digits
        session: EditSession<4>,
    },
    /// ON time taken, waiting for OK to be released
    AwaitOnRelease {
        /// Schedule being edited
        index: ScheduleIndex,
        /// Pending ON time
        on: ClockCode,
    },
    /// Showing the committed OFF time
    ReviewOff {
        /// Schedule being edited
        index: ScheduleIndex,
        /// Pending ON time
        on: ClockCode,
    },
    /// Editing the OFF time
    EditOff {
        /// Schedule being edited
        index: ScheduleIndex,
        /// Pending ON time
        on: ClockCode,
        /// The OFF time digits
        session: EditSession<4>,
    },
    /// OFF time taken, waiting for OK to be released
    AwaitOffRelease {
        /// Schedule being edited
        index: ScheduleIndex,
        /// Pending ON time
        on: ClockCode,
        /// Pending OFF time
        off: ClockCode,
    },
    /// Showing both pending times
    Confirm {
        /// Schedule being edited
        index: ScheduleIndex,
        /// Pending ON time
        on: ClockCode,
        /// Pending OFF time
        off: ClockCode,
    },
    /// Commit attempted, waiting for OK to be released
    AwaitCommitRelease {
        /// Schedule that was edited
        index: ScheduleIndex,
        /// Whether the commit reached the store
        saved: bool,
    },
    /// The schedule was stored
    Saved(ScheduleIndex),
    /// The store refused the schedule, nothing changed
    SaveFailed,
}

impl Default for SetTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl SetTimer {
    /// Starts on the selection of the first schedule.
    pub const fn new() -> Self {
        Self::Select(ScheduleIndex::FIRST)
    }

    /// Advances the wizard by one tick. Commits write the table through
    /// `storage` first and only then replace `table`.
    pub fn step<S: KeyValueStore>(
        &mut self,
        input: &InputFrame,
        table: &mut ScheduleTable,
        storage: &mut Storage<S>,
    ) -> Flow {
        let press = input.first_press();
        *self = match (*self, press) {
            (Self::Select(_), Some(Button::Back)) => return Flow::Exit(Menu::SetTimer),
            (Self::Select(index), Some(Button::Ok)) => once_released(
                input,
                Self::AwaitSelectRelease(index),
                Self::ReviewOn(index),
            ),
            (Self::Select(index), Some(button)) => Self::Select(browse(index, button)),
            (Self::AwaitSelectRelease(index), _) if input.fell(Button::Ok) => Self::ReviewOn(index),

            (Self::ReviewOn(index), Some(Button::Ok)) => {
                let on = table.get(index).on;
                once_released(
                    input,
                    Self::AwaitOnRelease { index, on },
                    Self::ReviewOff { index, on },
                )
            }
            (Self::ReviewOn(index), Some(button)) if button.is_directional() => {
                // the first key opens the editor and already counts
                let mut session = EditSession::new(CLOCK_TIME, table.get(index).on.digits());
                session.handle(button);
                Self::EditOn { index, session }
            }
            (Self::EditOn { index, session }, Some(Button::Ok)) => {
                let on = ClockCode::from_digits(session.digits()).unwrap_or(table.get(index).on);
                once_released(
                    input,
                    Self::AwaitOnRelease { index, on },
                    Self::ReviewOff { index, on },
                )
            }
            (Self::EditOn { index, mut session }, Some(button)) => {
                session.handle(button);
                Self::EditOn { index, session }
            }
            (Self::AwaitOnRelease { index, on }, _) if input.fell(Button::Ok) => {
                Self::ReviewOff { index, on }
            }

            (Self::ReviewOff { index, on }, Some(Button::Ok)) => {
                let off = table.get(index).off;
                once_released(
                    input,
                    Self::AwaitOffRelease { index, on, off },
                    Self::Confirm { index, on, off },
                )
            }
            (Self::ReviewOff { index, on }, Some(button)) if button.is_directional() => {
                let mut session = EditSession::new(CLOCK_TIME, table.get(index).off.digits());
                session.handle(button);
                Self::EditOff { index, on, session }
            }
            (Self::EditOff { index, on, session }, Some(Button::Ok)) => {
                let off = ClockCode::from_digits(session.digits()).unwrap_or(table.get(index).off);
                once_released(
                    input,
                    Self::AwaitOffRelease { index, on, off },
                    Self::Confirm { index, on, off },
                )
            }
            (
                Self::EditOff {
                    index,
                    on,
                    mut session,
                },
                Some(button),
            ) => {
                session.handle(button);
                Self::EditOff { index, on, session }
            }
            (Self::AwaitOffRelease { index, on, off }, _) if input.fell(Button::Ok) => {
                Self::Confirm { index, on, off }
            }

            (Self::Confirm { index, on, off }, Some(Button::Ok)) => {
                let saved = commit(table, storage, index, Schedule { on, off, active: true });
                once_released(
                    input,
                    Self::AwaitCommitRelease { index, saved },
                    Self::finished(index, saved),
                )
            }
            (Self::AwaitCommitRelease { index, saved }, _) if input.fell(Button::Ok) => {
                Self::finished(index, saved)
            }

            (state, _) => state,
        };
        Flow::Stay
    }

    /// Terminal state after a commit.
    const fn finished(index: ScheduleIndex, saved: bool) -> Self {
        if saved {
            Self::Saved(index)
        } else {
            Self::SaveFailed
        }
    }

    /// Draws the current step. Release waits keep the previous screen.
    pub fn render<D: TextDisplay>(&self, table: &ScheduleTable, display: &mut D) {
        match self {
            Self::Select(index) => show(
                display,
                "Select alarm:",
                &line(format_args!("Alarm {}", index.number())),
            ),
            Self::ReviewOn(index) => show(
                display,
                &line(format_args!("Edit {} ON time", index.number())),
                &line(format_args!("{}", table.get(*index).on)),
            ),
            Self::EditOn { index, session } => show_editing(
                display,
                &line(format_args!("Edit {} ON time", index.number())),
                &session.text(),
                session.cursor(),
            ),
            Self::ReviewOff { index, .. } => show(
                display,
                &line(format_args!("Edit {} OFF time", index.number())),
                &line(format_args!("{}", table.get(*index).off)),
            ),
            Self::EditOff { index, session, .. } => show_editing(
                display,
                &line(format_args!("Edit {} OFF time", index.number())),
                &session.text(),
                session.cursor(),
            ),
            Self::Confirm { on, off, .. } => show(
                display,
                &line(format_args!("ON {on} OFF {off}")),
                " Confirm?",
            ),
            Self::Saved(_) => show(display, "Alarm saved", "Going to idle"),
            Self::SaveFailed => show(display, "Save failed", "Going to idle"),
            Self::AwaitSelectRelease(_)
            | Self::AwaitOnRelease { .. }
            | Self::AwaitOffRelease { .. }
            | Self::AwaitCommitRelease { .. } => {}
        }
    }
}

/// Stores the table with `schedule` at `index`, then swaps it in. Returns
/// whether the store accepted it; on failure `table` is untouched.
fn commit<S: KeyValueStore>(
    table: &mut ScheduleTable,
    storage: &mut Storage<S>,
    index: ScheduleIndex,
    schedule: Schedule,
) -> bool {
    let candidate = table.with(index, schedule);
    match storage.save_schedules(&candidate) {
        Ok(()) => {
            info!(
                "Schedule {} stored: on {} off {} active {}",
                index.number(),
                schedule.on.value(),
                schedule.off.value(),
                schedule.active
            );
            *table = candidate;
            true
        }
        Err(e) => {
            error!("Failed to store schedule {}: {:?}", index.number(), e);
            false
        }
    }
}

/// The delete-schedule wizard: browse, confirm, delete.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTimer {
    /// Choosing the schedule
    Browse(ScheduleIndex),
    /// Asking for an explicit OK
    Confirm(ScheduleIndex),
    /// Delete attempted, waiting for OK to be released
    AwaitRelease {
        /// Schedule that was deleted
        index: ScheduleIndex,
        /// Whether the delete reached the store
        deleted: bool,
    },
    /// The schedule was cleared
    Deleted(ScheduleIndex),
    /// The store refused the delete, nothing changed
    DeleteFailed,
}

impl Default for DeleteTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl DeleteTimer {
    /// Starts browsing at the first schedule.
    pub const fn new() -> Self {
        Self::Browse(ScheduleIndex::FIRST)
    }

    /// Advances the wizard by one tick.
    pub fn step<S: KeyValueStore>(
        &mut self,
        input: &InputFrame,
        table: &mut ScheduleTable,
        storage: &mut Storage<S>,
    ) -> Flow {
        *self = match (*self, input.first_press()) {
            (Self::Browse(_), Some(Button::Back)) => return Flow::Exit(Menu::DeleteTimer),
            (Self::Browse(index), Some(Button::Ok)) => Self::Confirm(index),
            (Self::Browse(index), Some(button)) => Self::Browse(browse(index, button)),
            (Self::Confirm(index), Some(Button::Ok)) => {
                let deleted = commit(table, storage, index, Schedule::EMPTY);
                once_released(
                    input,
                    Self::AwaitRelease { index, deleted },
                    Self::finished(index, deleted),
                )
            }
            (Self::AwaitRelease { index, deleted }, _) if input.fell(Button::Ok) => {
                Self::finished(index, deleted)
            }
            (state, _) => state,
        };
        Flow::Stay
    }

    /// Terminal state after a delete.
    const fn finished(index: ScheduleIndex, deleted: bool) -> Self {
        if deleted {
            Self::Deleted(index)
        } else {
            Self::DeleteFailed
        }
    }

    /// Draws the current step.
    pub fn render<D: TextDisplay>(&self, table: &ScheduleTable, display: &mut D) {
        match self {
            Self::Browse(index) => show_browse(display, table, *index),
            Self::Confirm(index) => show(
                display,
                &line(format_args!("Del alarm {}?", index.number())),
                "Press OK to Del",
            ),
            Self::Deleted(index) => show(
                display,
                &line(format_args!("Alarm {} del", index.number())),
                "Going to idle",
            ),
            Self::DeleteFailed => show(display, "Delete failed", "Going to idle"),
            Self::AwaitRelease { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lcd::LcdFrame;
    use crate::testing::{MemoryStore, RecordingRelay};

    /// Runs one tick of the set wizard with a single press.
    fn press(
        wizard: &mut SetTimer,
        button: Button,
        table: &mut ScheduleTable,
        storage: &mut Storage<MemoryStore>,
    ) -> Flow {
        wizard.step(&InputFrame::pressed(button), table, storage)
    }

    /// Runs one tick of the set wizard with a single release.
    fn release(
        wizard: &mut SetTimer,
        button: Button,
        table: &mut ScheduleTable,
        storage: &mut Storage<MemoryStore>,
    ) {
        wizard.step(&InputFrame::released(button), table, storage);
    }

    #[test]
    fn clock_code_round_trips_through_digits() {
        let code = ClockCode::new(959).unwrap();
        assert_eq!(code.digits(), [0, 9, 5, 9]);
        assert_eq!(ClockCode::from_digits(&code.digits()), Some(code));
        assert_eq!(code.to_string(), "0959");
    }

    #[test]
    fn clock_code_rejects_invalid_times() {
        assert_eq!(ClockCode::new(2400), None);
        assert_eq!(ClockCode::new(1260), None);
        assert_eq!(ClockCode::from_digits(&[2, 4, 0, 0]), None);
        assert!(ClockCode::new(2359).is_some());
    }

    #[test]
    fn evaluation_switches_on_and_off_at_the_exact_minute() {
        let schedule = Schedule {
            on: ClockCode::new(730).unwrap(),
            off: ClockCode::new(1830).unwrap(),
            active: true,
        };
        let table = ScheduleTable::new().with(ScheduleIndex::new(4).unwrap(), schedule);
        let mut relay = RecordingRelay::default();

        assert_eq!(table.evaluate(ClockCode::new(730).unwrap(), &mut relay), Some(true));
        assert_eq!(relay.state(), Some(true));
        assert_eq!(table.evaluate(ClockCode::new(731).unwrap(), &mut relay), None);
        assert_eq!(relay.state(), Some(true));
        assert_eq!(table.evaluate(ClockCode::new(1830).unwrap(), &mut relay), Some(false));
        assert_eq!(relay.state(), Some(false));
    }

    #[test]
    fn inactive_schedules_are_ignored() {
        let schedule = Schedule {
            on: ClockCode::new(600).unwrap(),
            off: ClockCode::new(700).unwrap(),
            active: false,
        };
        let table = ScheduleTable::new().with(ScheduleIndex::FIRST, schedule);
        let mut relay = RecordingRelay::default();
        assert_eq!(table.evaluate(ClockCode::new(600).unwrap(), &mut relay), None);
        assert!(relay.history().is_empty());
    }

    #[test]
    fn later_schedules_win_within_one_minute() {
        let on_at_8 = Schedule {
            on: ClockCode::new(800).unwrap(),
            off: ClockCode::new(900).unwrap(),
            active: true,
        };
        let off_at_8 = Schedule {
            on: ClockCode::new(500).unwrap(),
            off: ClockCode::new(800).unwrap(),
            active: true,
        };
        let table = ScheduleTable::new()
            .with(ScheduleIndex::new(1).unwrap(), on_at_8)
            .with(ScheduleIndex::new(2).unwrap(), off_at_8);
        let mut relay = RecordingRelay::default();
        assert_eq!(table.evaluate(ClockCode::new(800).unwrap(), &mut relay), Some(false));
        assert_eq!(relay.history(), &[true, false]);
    }

    #[test]
    fn set_wizard_commits_edited_times() {
        let mut table = ScheduleTable::new();
        let mut storage = Storage::new(MemoryStore::default());
        let mut wizard = SetTimer::new();

        press(&mut wizard, Button::Right, &mut table, &mut storage);
        press(&mut wizard, Button::Right, &mut table, &mut storage);
        assert_eq!(wizard, SetTimer::Select(ScheduleIndex::new(2).unwrap()));
        press(&mut wizard, Button::Ok, &mut table, &mut storage);
        release(&mut wizard, Button::Ok, &mut table, &mut storage);
        let index = ScheduleIndex::new(2).unwrap();
        assert_eq!(wizard, SetTimer::ReviewOn(index));

        // 0000 -> 0730: the first Right opens the editor and moves the cursor
        press(&mut wizard, Button::Right, &mut table, &mut storage);
        for _ in 0..7 {
            press(&mut wizard, Button::Up, &mut table, &mut storage);
        }
        press(&mut wizard, Button::Right, &mut table, &mut storage);
        for _ in 0..3 {
            press(&mut wizard, Button::Up, &mut table, &mut storage);
        }
        press(&mut wizard, Button::Ok, &mut table, &mut storage);
        release(&mut wizard, Button::Ok, &mut table, &mut storage);
        let on = ClockCode::new(730).unwrap();
        assert_eq!(wizard, SetTimer::ReviewOff { index, on });

        // 0000 -> 1830
        press(&mut wizard, Button::Up, &mut table, &mut storage);
        press(&mut wizard, Button::Right, &mut table, &mut storage);
        for _ in 0..8 {
            press(&mut wizard, Button::Up, &mut table, &mut storage);
        }
        press(&mut wizard, Button::Right, &mut table, &mut storage);
        for _ in 0..3 {
            press(&mut wizard, Button::Up, &mut table, &mut storage);
        }
        press(&mut wizard, Button::Ok, &mut table, &mut storage);
        release(&mut wizard, Button::Ok, &mut table, &mut storage);
        let off = ClockCode::new(1830).unwrap();
        assert_eq!(wizard, SetTimer::Confirm { index, on, off });
        assert_eq!(table, ScheduleTable::new());

        press(&mut wizard, Button::Ok, &mut table, &mut storage);
        release(&mut wizard, Button::Ok, &mut table, &mut storage);
        assert_eq!(wizard, SetTimer::Saved(index));
        assert_eq!(*table.get(index), Schedule { on, off, active: true });
        assert_eq!(storage.load_schedules(), Ok(table));
    }

    #[test]
    fn ok_without_editing_keeps_the_committed_time() {
        let index = ScheduleIndex::FIRST;
        let existing = Schedule {
            on: ClockCode::new(615).unwrap(),
            off: ClockCode::new(2045).unwrap(),
            active: false,
        };
        let mut table = ScheduleTable::new().with(index, existing);
        let mut storage = Storage::new(MemoryStore::default());
        let mut wizard = SetTimer::ReviewOn(index);

        press(&mut wizard, Button::Ok, &mut table, &mut storage);
        release(&mut wizard, Button::Ok, &mut table, &mut storage);
        press(&mut wizard, Button::Ok, &mut table, &mut storage);
        release(&mut wizard, Button::Ok, &mut table, &mut storage);
        assert_eq!(
            wizard,
            SetTimer::Confirm {
                index,
                on: existing.on,
                off: existing.off
            }
        );
    }

    #[test]
    fn back_only_leaves_from_the_selection() {
        let mut table = ScheduleTable::new();
        let mut storage = Storage::new(MemoryStore::default());
        let mut wizard = SetTimer::ReviewOn(ScheduleIndex::FIRST);
        assert_eq!(press(&mut wizard, Button::Back, &mut table, &mut storage), Flow::Stay);
        assert_eq!(wizard, SetTimer::ReviewOn(ScheduleIndex::FIRST));

        let mut wizard = SetTimer::new();
        assert_eq!(
            press(&mut wizard, Button::Back, &mut table, &mut storage),
            Flow::Exit(Menu::SetTimer)
        );
    }

    #[test]
    fn failed_store_leaves_the_table_untouched() {
        let mut table = ScheduleTable::new();
        let mut storage = Storage::new(MemoryStore::failing());
        let index = ScheduleIndex::FIRST;
        let on = ClockCode::new(100).unwrap();
        let mut wizard = SetTimer::Confirm { index, on, off: on };

        press(&mut wizard, Button::Ok, &mut table, &mut storage);
        release(&mut wizard, Button::Ok, &mut table, &mut storage);
        assert_eq!(wizard, SetTimer::SaveFailed);
        assert_eq!(table, ScheduleTable::new());
    }

    #[test]
    fn delete_needs_a_second_ok() {
        let index = ScheduleIndex::new(3).unwrap();
        let schedule = Schedule {
            on: ClockCode::new(100).unwrap(),
            off: ClockCode::new(200).unwrap(),
            active: true,
        };
        let mut table = ScheduleTable::new().with(index, schedule);
        let mut storage = Storage::new(MemoryStore::default());
        let mut wizard = DeleteTimer::new();

        for _ in 0..3 {
            wizard.step(&InputFrame::pressed(Button::Right), &mut table, &mut storage);
        }
        wizard.step(&InputFrame::pressed(Button::Ok), &mut table, &mut storage);
        assert_eq!(wizard, DeleteTimer::Confirm(index));
        assert!(table.get(index).active);

        wizard.step(&InputFrame::pressed(Button::Back), &mut table, &mut storage);
        assert_eq!(wizard, DeleteTimer::Confirm(index));

        wizard.step(&InputFrame::pressed(Button::Ok), &mut table, &mut storage);
        wizard.step(&InputFrame::released(Button::Ok), &mut table, &mut storage);
        assert_eq!(wizard, DeleteTimer::Deleted(index));
        assert_eq!(*table.get(index), Schedule::EMPTY);

        let mut relay = RecordingRelay::default();
        assert_eq!(table.evaluate(ClockCode::new(100).unwrap(), &mut relay), None);
        assert_eq!(table.evaluate(ClockCode::new(200).unwrap(), &mut relay), None);
    }

    #[test]
    fn browse_screen_shows_both_times() {
        let schedule = Schedule {
            on: ClockCode::new(730).unwrap(),
            off: ClockCode::new(1830).unwrap(),
            active: true,
        };
        let table = ScheduleTable::new().with(ScheduleIndex::new(9).unwrap(), schedule);
        let mut view = TimerView::new();
        for _ in 0..12 {
            view.step(&InputFrame::pressed(Button::Right));
        }
        let mut frame = LcdFrame::new();
        view.render(&table, &mut frame);
        assert_eq!(frame.line(0), "ON:0730 OFF:1830");
        assert_eq!(frame.line(1), "<-(10)->");
        assert_eq!(view.step(&InputFrame::pressed(Button::Back)), Flow::Exit(Menu::ViewTimers));
    }

    #[test]
    fn editor_screen_shows_the_cursor() {
        let table = ScheduleTable::new();
        let mut storage = Storage::new(MemoryStore::default());
        let mut wizard = SetTimer::ReviewOn(ScheduleIndex::FIRST);
        let mut scratch = table;
        wizard.step(&InputFrame::pressed(Button::Up), &mut scratch, &mut storage);

        let mut frame = LcdFrame::new();
        wizard.render(&table, &mut frame);
        assert_eq!(frame.line(0), "Edit 1 ON time");
        assert_eq!(frame.line(1), "1000");
        assert_eq!(frame.cursor(), Some((1, 0)));
    }
}
