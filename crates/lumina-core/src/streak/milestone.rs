//! Streak milestones worth celebrating.
//!
//! Whether a milestone has already been shown is presentation state. This
//! module only hands out a stable key the caller can remember.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub streak: u32,
    pub title: &'static str,
    pub message: &'static str,
}

const MILESTONES: [Milestone; 5] = [
    Milestone {
        streak: 7,
        title: "7 Day Streak!",
        message: "One week of consistency! You've earned a freeze day.",
    },
    Milestone {
        streak: 14,
        title: "14 Day Streak!",
        message: "Two weeks strong! You're building lasting habits.",
    },
    Milestone {
        streak: 30,
        title: "30 Day Streak!",
        message: "One month of dedication! You've earned another freeze.",
    },
    Milestone {
        streak: 50,
        title: "50 Day Streak!",
        message: "Incredible consistency! You're unstoppable!",
    },
    Milestone {
        streak: 100,
        title: "100 Day Streak!",
        message: "Century milestone! You're a legend!",
    },
];

impl Milestone {
    pub fn for_streak(streak: u32) -> Option<Milestone> {
        MILESTONES.iter().copied().find(|m| m.streak == streak)
    }

    pub fn all() -> &'static [Milestone] {
        &MILESTONES
    }

    /// Idempotency key for "already shown to this user".
    pub fn seen_key(&self, user_id: &str) -> String {
        format!("milestone_{}_{}", self.streak, user_id)
    }
}
