//! Reading the button register.

use bitflags::bitflags;

use crate::mmio::Mmio;

/// Tri-state enum. Allows for -1, 0 and +1, which is handy when checking
/// whether the D-Pad is pointing left, right, or is unpressed.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug)]
pub enum Tri {
    /// Right or down
    Positive = 1,
    /// Unpressed
    Zero = 0,
    /// Left or up
    Negative = -1,
}

impl From<(bool, bool)> for Tri {
    fn from(a: (bool, bool)) -> Tri {
        match a {
            (true, false) => Tri::Negative,
            (false, true) => Tri::Positive,
            _ => Tri::Zero,
        }
    }
}

bitflags! {
    /// Represents a button on the console
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct Button: u16 {
        /// The A button
        const A = 1 << 0;
        /// The B button
        const B = 1 << 1;
        /// The SELECT button
        const SELECT = 1 << 2;
        /// The START button
        const START = 1 << 3;
        /// The RIGHT button on the D-Pad
        const RIGHT = 1 << 4;
        /// The LEFT button on the D-Pad
        const LEFT = 1 << 5;
        /// The UP button on the D-Pad
        const UP = 1 << 6;
        /// The DOWN button on the D-Pad
        const DOWN = 1 << 7;
        /// The R shoulder button
        const R = 1 << 8;
        /// The L shoulder button
        const L = 1 << 9;
    }
}

/// Stores the currently pressed buttons in the (active low) button
/// register. The frontend calls this while it holds the frame clock.
pub fn set_pressed(mmio: &mut Mmio, pressed: Button) {
    mmio.set_keyinput(!pressed.bits());
}

/// Helper to make it easy to get the current state of the buttons.
///
/// Call [`update`](ButtonController::update) once per frame; the just
/// pressed queries compare against the previous frame's latch.
pub struct ButtonController {
    previous: u16,
    current: u16,
}

impl ButtonController {
    /// Creates the controller with both latches taken from the register's
    /// current state, so nothing reads as just pressed on the first frame.
    #[must_use]
    pub fn new(mmio: &Mmio) -> Self {
        let pressed = !mmio.keyinput() & 0x03ff;
        ButtonController {
            previous: pressed,
            current: pressed,
        }
    }

    /// Latches the state of the button register. Call this every frame;
    /// no query changes until you do.
    pub fn update(&mut self, mmio: &Mmio) {
        self.previous = self.current;
        self.current = !mmio.keyinput() & 0x03ff;
    }

    /// Returns [Tri::Positive] if right is pressed, [Tri::Negative] if left
    /// is pressed and [Tri::Zero] if neither or both are pressed.
    #[must_use]
    pub fn x_tri(&self) -> Tri {
        let left = self.is_pressed(Button::LEFT);
        let right = self.is_pressed(Button::RIGHT);

        (left, right).into()
    }

    /// Returns `true` if any of the buttons in `keys` are pressed.
    #[must_use]
    pub fn is_pressed(&self, keys: Button) -> bool {
        self.current & keys.bits() != 0
    }

    /// Returns `true` if any of the buttons in `keys` went from released to
    /// pressed in the last frame.
    #[must_use]
    pub fn is_just_pressed(&self, keys: Button) -> bool {
        let keys = keys.bits();
        (self.current & keys) != 0 && (self.previous & keys) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_active_low() {
        let mut mmio = Mmio::new();
        assert_eq!(mmio.keyinput(), 0x03ff);

        set_pressed(&mut mmio, Button::UP | Button::A);
        assert_eq!(mmio.keyinput(), 0x03ff & !(1 << 6) & !1);
    }

    #[test]
    fn just_pressed_is_edge_triggered() {
        let mut mmio = Mmio::new();
        let mut buttons = ButtonController::new(&mmio);

        set_pressed(&mut mmio, Button::UP);
        buttons.update(&mmio);
        assert!(buttons.is_pressed(Button::UP));
        assert!(buttons.is_just_pressed(Button::UP));

        buttons.update(&mmio);
        assert!(buttons.is_pressed(Button::UP));
        assert!(!buttons.is_just_pressed(Button::UP));
    }

    #[test]
    fn x_tri_resolves_conflicting_directions_to_zero() {
        let mut mmio = Mmio::new();
        let mut buttons = ButtonController::new(&mmio);

        set_pressed(&mut mmio, Button::LEFT | Button::RIGHT);
        buttons.update(&mmio);
        assert_eq!(buttons.x_tri(), Tri::Zero);

        set_pressed(&mut mmio, Button::LEFT);
        buttons.update(&mmio);
        assert_eq!(buttons.x_tri(), Tri::Negative);
    }
}
