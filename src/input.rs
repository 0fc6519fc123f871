use std::collections::HashMap;

/// The logical controls the simulation understands. The host maps its
/// keyboard/gamepad bindings onto these before each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Right,
    Jump,
    Run,
    Dash,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Down,
    Released,
    Up,
}

impl Default for ButtonState {
    fn default() -> Self {
        ButtonState::Up
    }
}

impl ButtonState {
    fn transition(&self, button_down: bool) -> ButtonState {
        if button_down {
            match self {
                ButtonState::Pressed => ButtonState::Down,
                ButtonState::Down => ButtonState::Down,
                ButtonState::Released => ButtonState::Pressed,
                ButtonState::Up => ButtonState::Pressed,
            }
        } else {
            match self {
                ButtonState::Pressed => ButtonState::Released,
                ButtonState::Down => ButtonState::Released,
                ButtonState::Released => ButtonState::Up,
                ButtonState::Up => ButtonState::Up,
            }
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ButtonState::Pressed | ButtonState::Down)
    }
}

#[derive(Default, Debug)]
pub struct InputState {
    buttons: HashMap<Button, ButtonState>,
}

impl InputState {
    pub fn button_state(&self, button: Button) -> ButtonState {
        self.buttons.get(&button).copied().unwrap_or_default()
    }

    /// True while the button is held.
    pub fn is_active(&self, button: Button) -> bool {
        self.button_state(button).is_active()
    }

    /// True only on the frame the button went down.
    pub fn was_pressed(&self, button: Button) -> bool {
        self.button_state(button) == ButtonState::Pressed
    }

    /// Feed the raw down/up state of a button; called by the host as its
    /// events arrive.
    pub fn process_button(&mut self, button: Button, down: bool) {
        let state = self.button_state(button).transition(down);
        self.buttons.insert(button, state);
    }

    /// Advance Pressed to Down and Released to Up. Call once per frame,
    /// after the simulation has consumed this frame's input.
    pub fn update(&mut self) {
        let previous_button_state = std::mem::take(&mut self.buttons);
        for (button, button_state) in previous_button_state {
            self.buttons
                .insert(button, button_state.transition(button_state.is_active()));
        }
    }
}

/// Helper function to process positive/negative button presses - e.g., left/right
/// into an accumulated value of -1 for negative, +1 for positive, and 0 if both or none are pressed.
pub fn input_accumulator(negative: ButtonState, positive: ButtonState) -> f32 {
    let mut acc = 0.0;
    match negative {
        ButtonState::Pressed | ButtonState::Down | ButtonState::Released => {
            acc -= 1.0;
        }
        ButtonState::Up => {}
    }
    match positive {
        ButtonState::Pressed | ButtonState::Down | ButtonState::Released => {
            acc += 1.0;
        }
        ButtonState::Up => {}
    }

    acc
}

#[cfg(test)]
mod input_tests {
    use super::*;

    #[test]
    fn button_state_reports_press_for_one_frame() {
        let mut input = InputState::default();
        input.process_button(Button::Jump, true);
        assert!(input.was_pressed(Button::Jump));
        assert!(input.is_active(Button::Jump));

        input.update();
        assert!(!input.was_pressed(Button::Jump));
        assert!(input.is_active(Button::Jump));

        input.process_button(Button::Jump, false);
        assert_eq!(input.button_state(Button::Jump), ButtonState::Released);

        input.update();
        assert_eq!(input.button_state(Button::Jump), ButtonState::Up);
    }

    #[test]
    fn accumulator_cancels_opposing_input() {
        assert_eq!(input_accumulator(ButtonState::Down, ButtonState::Down), 0.0);
        assert_eq!(input_accumulator(ButtonState::Down, ButtonState::Up), -1.0);
        assert_eq!(input_accumulator(ButtonState::Up, ButtonState::Pressed), 1.0);
    }
}
