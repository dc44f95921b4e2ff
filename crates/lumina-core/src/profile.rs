//! Streak fields stored on the user profile.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    /// Current run of met days
    pub streak_count: u32,
    /// Historical maximum of `streak_count`
    pub longest_streak: u32,
    /// Freeze credits available to absorb a miss
    pub streak_freezes: u32,
}

impl StreakState {
    pub fn new(streak_count: u32, longest_streak: u32, streak_freezes: u32) -> Self {
        Self {
            streak_count,
            longest_streak: longest_streak.max(streak_count),
            streak_freezes,
        }
    }
}

/// Partial profile update; `None` leaves a field untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub streak_count: Option<u32>,
    pub longest_streak: Option<u32>,
    pub streak_freezes: Option<u32>,
}

impl ProfilePatch {
    pub fn apply_to(&self, state: &mut StreakState) {
        if let Some(v) = self.streak_count {
            state.streak_count = v;
        }
        if let Some(v) = self.longest_streak {
            state.longest_streak = v;
        }
        if let Some(v) = self.streak_freezes {
            state.streak_freezes = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_touches_only_set_fields() {
        let mut target = StreakState::new(4, 9, 2);
        ProfilePatch {
            streak_freezes: Some(0),
            ..Default::default()
        }
        .apply_to(&mut target);
        assert_eq!(target, StreakState::new(4, 9, 0));
    }

    #[test]
    fn longest_never_below_current() {
        assert_eq!(StreakState::new(5, 2, 0).longest_streak, 5);
    }
}
