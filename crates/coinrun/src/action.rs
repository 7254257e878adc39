//! # Actions
//!
//! The discrete action space and its mapping onto movement intent.
//!
//! | id   | horizontal | jump | down |
//! |------|------------|------|------|
//! | 0    | none       | no   | no   |
//! | 1    | left       | no   | no   |
//! | 2    | right      | no   | no   |
//! | 3    | none       | yes  | no   |
//! | 4    | left       | yes  | no   |
//! | 5    | right      | yes  | no   |
//! | 6    | none       | no   | yes  |
//! | 7    | left       | no   | yes  |
//! | 8    | right      | no   | yes  |
//! | 9-14 | none       | no   | no   |

/// Size of the discrete action space.
pub const ACTION_COUNT: u32 = 15;

/// Movement requested for one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Intent {
    /// `-1` left, `0` none, `1` right.
    pub horizontal: i8,
    /// Start a jump if possible.
    pub jump: bool,
    /// Fall faster while airborne.
    pub down: bool,
}

impl Intent {
    /// No movement.
    pub const IDLE: Self = Self {
        horizontal: 0,
        jump: false,
        down: false,
    };

    /// Decodes an action id; `None` if `action >= ACTION_COUNT`.
    #[must_use]
    pub const fn from_action(action: u32) -> Option<Self> {
        let (horizontal, jump, down) = match action {
            0 | 9..=14 => (0, false, false),
            1 => (-1, false, false),
            2 => (1, false, false),
            3 => (0, true, false),
            4 => (-1, true, false),
            5 => (1, true, false),
            6 => (0, false, true),
            7 => (-1, false, true),
            8 => (1, false, true),
            _ => return None,
        };
        Some(Self {
            horizontal,
            jump,
            down,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_total_below_count() {
        for action in 0..ACTION_COUNT {
            assert!(Intent::from_action(action).is_some(), "action {action}");
        }
        assert_eq!(Intent::from_action(ACTION_COUNT), None);
        assert_eq!(Intent::from_action(u32::MAX), None);
    }

    #[test]
    fn test_known_rows() {
        assert_eq!(Intent::from_action(0), Some(Intent::IDLE));
        assert_eq!(
            Intent::from_action(5),
            Some(Intent {
                horizontal: 1,
                jump: true,
                down: false
            })
        );
        assert_eq!(
            Intent::from_action(7),
            Some(Intent {
                horizontal: -1,
                jump: false,
                down: true
            })
        );
        assert_eq!(Intent::from_action(12), Some(Intent::IDLE));
    }
}
