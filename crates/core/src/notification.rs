//! Out-of-band notifications delivered alongside a user message.

use serde::{Deserialize, Serialize};

/// The kind of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// The author changed since the last turn
    SwitchUser,
    /// The location descriptor changed since the last turn
    SwitchLocation,
    /// First turn of a new engine instance
    Reminder,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::SwitchUser => "switch_user",
            NotificationKind::SwitchLocation => "switch_location",
            NotificationKind::Reminder => "reminder",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification: a kind tag plus natural-language content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub content: String,
}

impl Notification {
    pub fn switch_user(author: &str) -> Self {
        Self {
            kind: NotificationKind::SwitchUser,
            content: format!(
                "The user that is talking to you has changed. The user that is now talking to you is called {author}"
            ),
        }
    }

    pub fn switch_location(location: &str) -> Self {
        Self {
            kind: NotificationKind::SwitchLocation,
            content: format!(
                "The location you are about to reply in (and receive messages in) has changed. The location you are in is now {location}"
            ),
        }
    }

    pub fn reminder(author: &str, location: &str) -> Self {
        Self {
            kind: NotificationKind::Reminder,
            content: format!(
                "Remember to check your scratchpad immediately before anything else (only required on this first message). \
                 The user talking to you is called {author}, and you are in {location}"
            ),
        }
    }
}
