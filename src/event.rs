//! # Input events
//! The six logical buttons and the debounced edges the controller consumes.
//!
//! A button "rises" when it is pressed and "falls" when it is released. All
//! edges seen during one tick are collected into an [`InputFrame`].

/// The buttons of the control panel, in the priority order used when more than
/// one is pressed during the same tick.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Up, increments a digit or moves up a menu
    Up,
    /// Down, decrements a digit or moves down a menu
    Down,
    /// Left, moves the cursor or the selected schedule
    Left,
    /// Right, moves the cursor or the selected schedule
    Right,
    /// OK, selects and confirms
    Ok,
    /// Back, leaves a menu level or aborts
    Back,
}

impl Button {
    /// All buttons, highest priority first.
    pub const ALL: [Self; 6] = [
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::Ok,
        Self::Back,
    ];

    /// Bit of this button in an [`InputFrame`] mask.
    const fn mask(self) -> u8 {
        1 << self as u8
    }

    /// Whether the button moves a cursor or a digit.
    pub const fn is_directional(self) -> bool {
        matches!(self, Self::Up | Self::Down | Self::Left | Self::Right)
    }
}

/// Direction of a debounced level change.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// The button was pressed
    Rose,
    /// The button was released
    Fell,
}

/// One debounced edge of one button, as produced by the button tasks.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEdge {
    /// The button that changed
    pub button: Button,
    /// How it changed
    pub edge: Edge,
}

impl ButtonEdge {
    /// A press of `button`.
    pub const fn rose(button: Button) -> Self {
        Self {
            button,
            edge: Edge::Rose,
        }
    }

    /// A release of `button`.
    pub const fn fell(button: Button) -> Self {
        Self {
            button,
            edge: Edge::Fell,
        }
    }
}

/// The edges of all buttons observed during one tick.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputFrame {
    /// Buttons that were pressed
    rose: u8,
    /// Buttons that were released
    fell: u8,
}

impl InputFrame {
    /// A frame without any edge.
    pub const fn new() -> Self {
        Self { rose: 0, fell: 0 }
    }

    /// A frame holding only a press of `button`.
    pub const fn pressed(button: Button) -> Self {
        Self {
            rose: button.mask(),
            fell: 0,
        }
    }

    /// A frame holding only a release of `button`.
    pub const fn released(button: Button) -> Self {
        Self {
            rose: 0,
            fell: button.mask(),
        }
    }

    /// Adds an edge to the frame.
    pub const fn record(&mut self, edge: ButtonEdge) {
        match edge.edge {
            Edge::Rose => self.rose |= edge.button.mask(),
            Edge::Fell => self.fell |= edge.button.mask(),
        }
    }

    /// Whether `button` was pressed during the tick.
    pub const fn rose(&self, button: Button) -> bool {
        self.rose & button.mask() != 0
    }

    /// Whether `button` was released during the tick.
    pub const fn fell(&self, button: Button) -> bool {
        self.fell & button.mask() != 0
    }

    /// The pressed button with the highest priority, if any.
    pub fn first_press(&self) -> Option<Button> {
        Button::ALL.into_iter().find(|b| self.rose(*b))
    }

    /// Whether no edge at all was seen.
    pub const fn is_empty(&self) -> bool {
        self.rose == 0 && self.fell == 0
    }
}

/// Buttons currently held down, followed edge by edge.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldButtons(u8);

impl HeldButtons {
    /// Applies the edges of one tick. A press and release within the same tick
    /// leaves the button up.
    pub const fn update(&mut self, frame: &InputFrame) {
        self.0 = (self.0 | frame.rose) & !frame.fell;
    }

    /// Whether `button` is down.
    pub const fn is_held(self, button: Button) -> bool {
        self.0 & button.mask() != 0
    }

    /// Whether any button is down.
    pub const fn any(self) -> bool {
        self.0 != 0
    }
}

impl From<ButtonEdge> for InputFrame {
    fn from(edge: ButtonEdge) -> Self {
        let mut frame = Self::new();
        frame.record(edge);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_frame_has_no_press() {
        let frame = InputFrame::new();
        assert!(frame.is_empty());
        assert_eq!(frame.first_press(), None);
    }

    #[test]
    fn press_priority_follows_button_order() {
        let mut frame = InputFrame::new();
        frame.record(ButtonEdge::rose(Button::Back));
        frame.record(ButtonEdge::rose(Button::Ok));
        frame.record(ButtonEdge::rose(Button::Left));
        assert_eq!(frame.first_press(), Some(Button::Left));

        frame.record(ButtonEdge::rose(Button::Up));
        assert_eq!(frame.first_press(), Some(Button::Up));
    }

    #[test]
    fn releases_are_not_presses() {
        let frame = InputFrame::released(Button::Ok);
        assert!(!frame.is_empty());
        assert!(frame.fell(Button::Ok));
        assert!(!frame.rose(Button::Ok));
        assert_eq!(frame.first_press(), None);
    }

    #[test]
    fn held_buttons_follow_the_edges() {
        let mut held = HeldButtons::default();
        held.update(&InputFrame::pressed(Button::Up));
        assert!(held.is_held(Button::Up));
        held.update(&InputFrame::new());
        assert!(held.any());

        let mut frame = InputFrame::pressed(Button::Ok);
        frame.record(ButtonEdge::fell(Button::Up));
        held.update(&frame);
        assert!(!held.is_held(Button::Up));
        assert!(held.is_held(Button::Ok));

        held.update(&InputFrame::released(Button::Ok));
        assert!(!held.any());
    }

    #[test]
    fn press_and_release_in_one_tick() {
        let mut frame = InputFrame::from(ButtonEdge::rose(Button::Down));
        frame.record(ButtonEdge::fell(Button::Down));
        assert!(frame.rose(Button::Down));
        assert!(frame.fell(Button::Down));
        assert!(!frame.rose(Button::Up));
    }
}
