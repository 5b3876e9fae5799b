//! Startup stage machine.
//!
//! # State Transitions
//! ```text
//! Init → DbReady → ServicesStarted → Listening → Registered → Running
//! (any stage except Failed) → Failed
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Init,
    DbReady,
    ServicesStarted,
    Listening,
    Registered,
    Running,
    Failed,
}

impl Stage {
    /// Position in the startup order, exported as a gauge.
    pub fn ordinal(self) -> u8 {
        match self {
            Stage::Init => 0,
            Stage::DbReady => 1,
            Stage::ServicesStarted => 2,
            Stage::Listening => 3,
            Stage::Registered => 4,
            Stage::Running => 5,
            Stage::Failed => 255,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Stage::Failed
    }

    /// Whether `self → to` is a legal transition.
    pub fn can_advance(self, to: Stage) -> bool {
        if to == Stage::Failed {
            return !self.is_terminal();
        }
        matches!(
            (self, to),
            (Stage::Init, Stage::DbReady)
                | (Stage::DbReady, Stage::ServicesStarted)
                | (Stage::ServicesStarted, Stage::Listening)
                | (Stage::Listening, Stage::Registered)
                | (Stage::Registered, Stage::Running)
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
