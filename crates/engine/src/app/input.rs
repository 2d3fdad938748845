#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Quit,
}

const ACTION_COUNT: usize = 5;

/// Held-key resolution order when several directions are down at once.
/// Movement is single-axis per tick, never blended.
const DIRECTION_PRIORITY: [InputAction; 4] = [
    InputAction::MoveUp,
    InputAction::MoveDown,
    InputAction::MoveLeft,
    InputAction::MoveRight,
];

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    pub(crate) fn held_direction(&self) -> Option<InputAction> {
        DIRECTION_PRIORITY
            .into_iter()
            .find(|action| self.is_down(*action))
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Quit => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_direction_is_none_when_nothing_is_down() {
        let states = ActionStates::default();
        assert_eq!(states.held_direction(), None);
    }

    #[test]
    fn held_direction_prefers_up_then_down_then_left_then_right() {
        let mut states = ActionStates::default();
        states.set(InputAction::MoveRight, true);
        assert_eq!(states.held_direction(), Some(InputAction::MoveRight));

        states.set(InputAction::MoveLeft, true);
        assert_eq!(states.held_direction(), Some(InputAction::MoveLeft));

        states.set(InputAction::MoveDown, true);
        assert_eq!(states.held_direction(), Some(InputAction::MoveDown));

        states.set(InputAction::MoveUp, true);
        assert_eq!(states.held_direction(), Some(InputAction::MoveUp));
    }

    #[test]
    fn releasing_a_key_falls_back_to_the_next_priority() {
        let mut states = ActionStates::default();
        states.set(InputAction::MoveUp, true);
        states.set(InputAction::MoveLeft, true);
        states.set(InputAction::MoveUp, false);
        assert_eq!(states.held_direction(), Some(InputAction::MoveLeft));
    }
}
