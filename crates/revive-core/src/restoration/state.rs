//! Controller state machine

use serde::{Deserialize, Serialize};

/// Restoration lifecycle
///
/// `Idle -> FileSelected -> Restoring -> {Done, Error}`; from `Done` or
/// `Error` a new file returns to `FileSelected` and a new attempt returns to
/// `Restoring`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RestorationState {
    #[default]
    Idle,
    FileSelected,
    Restoring,
    Done,
    Error,
}

impl RestorationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FileSelected => "file_selected",
            Self::Restoring => "restoring",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    /// A restoration call is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Restoring)
    }

    /// The last attempt has finished, successfully or not
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: RestorationState) -> bool {
        use RestorationState::*;
        matches!(
            (self, next),
            (Idle | FileSelected | Done | Error, FileSelected)
                | (FileSelected | Done | Error, Restoring)
                | (Restoring, Done | Error)
        )
    }
}

impl std::fmt::Display for RestorationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
