//! User profile collected by the profile dialogs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::channels::Attachment;

/// User-state property the profile is stored under.
pub const USER_PROFILE_PROPERTY: &str = "UserProfile";

/// Marker for "the user declined to give an age".
pub const AGE_UNSET: i32 = -1;

/// Profile built on the first confirmed completion and overwritten on each one after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub transport: String,
    /// `AGE_UNSET` when not given.
    pub age: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            transport: String::new(),
            age: AGE_UNSET,
            picture: None,
            saved_at: None,
        }
    }
}

impl UserProfile {
    pub fn has_age(&self) -> bool {
        self.age != AGE_UNSET
    }

    /// The sentence read back to the user once the profile is confirmed.
    pub fn summary(&self) -> String {
        let mut msg = format!(
            "I have your mode of transport as {} and your name as {}",
            self.transport, self.name
        );
        if self.has_age() {
            msg.push_str(&format!(" and your age as {}", self.age));
        }
        msg.push('.');
        msg
    }
}
