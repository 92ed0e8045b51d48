//! Action vocabulary consumed from genomes and issued to environments.

use serde::{Deserialize, Serialize};

/// Controller buttons an environment understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    Left,
    Right,
    A,
}

/// A single input event sent to the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputEvent {
    Press(Button),
    Release(Button),
}

/// Decoded meaning of a gene's action id.
///
/// Ids 0-3 map to defined commands. Every other id decodes to
/// [`Action::Idle`], which presses nothing but still lets ticks elapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Hold left.
    MoveLeft,
    /// Hold right.
    MoveRight,
    /// Hold the primary action button (jump).
    Primary,
    /// Hold right and the primary action button together.
    JumpRight,
    /// Out-of-range id: no input.
    Idle,
}

impl Action {
    /// Number of action ids with a defined command.
    pub const DEFINED: u8 = 4;

    /// Decode a raw gene action id.
    pub fn from_id(id: u8) -> Self {
        match id {
            0 => Self::MoveLeft,
            1 => Self::MoveRight,
            2 => Self::Primary,
            3 => Self::JumpRight,
            _ => Self::Idle,
        }
    }

    /// Buttons held for the duration of the action.
    pub fn buttons(self) -> &'static [Button] {
        match self {
            Self::MoveLeft => &[Button::Left],
            Self::MoveRight => &[Button::Right],
            Self::Primary => &[Button::A],
            Self::JumpRight => &[Button::Right, Button::A],
            Self::Idle => &[],
        }
    }

    /// Events issued before the action's ticks elapse.
    pub fn press_events(self) -> impl Iterator<Item = InputEvent> {
        self.buttons().iter().copied().map(InputEvent::Press)
    }

    /// Events issued after the action's ticks elapse.
    pub fn release_events(self) -> impl Iterator<Item = InputEvent> {
        self.buttons().iter().copied().map(InputEvent::Release)
    }

    /// Whether the action counts toward the rightward movement bonus.
    pub fn is_rightward(self) -> bool {
        matches!(self, Self::MoveRight | Self::JumpRight)
    }

    /// Short human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            Self::MoveLeft => "left",
            Self::MoveRight => "right",
            Self::Primary => "A",
            Self::JumpRight => "right + A",
            Self::Idle => "idle",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defined_ids_decode() {
        assert_eq!(Action::from_id(0), Action::MoveLeft);
        assert_eq!(Action::from_id(1), Action::MoveRight);
        assert_eq!(Action::from_id(2), Action::Primary);
        assert_eq!(Action::from_id(3), Action::JumpRight);
    }

    #[test]
    fn test_out_of_range_ids_are_idle() {
        for id in 4..=u8::MAX {
            assert_eq!(Action::from_id(id), Action::Idle);
        }
        assert_eq!(Action::Idle.press_events().count(), 0);
        assert_eq!(Action::Idle.release_events().count(), 0);
    }

    #[test]
    fn test_jump_right_press_release_pair() {
        let press: Vec<_> = Action::JumpRight.press_events().collect();
        let release: Vec<_> = Action::JumpRight.release_events().collect();
        assert_eq!(
            press,
            vec![InputEvent::Press(Button::Right), InputEvent::Press(Button::A)]
        );
        assert_eq!(
            release,
            vec![
                InputEvent::Release(Button::Right),
                InputEvent::Release(Button::A)
            ]
        );
    }

    #[test]
    fn test_rightward() {
        assert!(Action::MoveRight.is_rightward());
        assert!(Action::JumpRight.is_rightward());
        assert!(!Action::MoveLeft.is_rightward());
        assert!(!Action::Primary.is_rightward());
        assert!(!Action::Idle.is_rightward());
    }
}
