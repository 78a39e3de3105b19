//! Turn context — the inbound activity plus everything the turn produces.
//!
//! Outbound activities are buffered here and only handed to the channel after
//! the turn's state has been committed.

use crate::channels::{Activity, OutgoingActivity};
use crate::store::StateScope;

/// Per-turn context handed to every step and validator.
#[derive(Debug)]
pub struct TurnContext {
    activity: Activity,
    responses: Vec<OutgoingActivity>,
    user_state: StateScope,
}

impl TurnContext {
    pub fn new(activity: Activity, user_state: StateScope) -> Self {
        Self {
            activity,
            responses: Vec::new(),
            user_state,
        }
    }

    /// The inbound activity being processed.
    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    /// Queue an outbound activity.
    pub fn send(&mut self, activity: OutgoingActivity) {
        self.responses.push(activity);
    }

    /// Queue a plain text message.
    pub fn send_text(&mut self, text: impl Into<String>) {
        self.send(OutgoingActivity::text(text));
    }

    /// Activities queued so far.
    pub fn responses(&self) -> &[OutgoingActivity] {
        &self.responses
    }

    pub fn user_state(&self) -> &StateScope {
        &self.user_state
    }

    pub fn user_state_mut(&mut self) -> &mut StateScope {
        &mut self.user_state
    }

    /// Split into the queued responses and the (possibly dirty) user state.
    pub fn into_parts(self) -> (Vec<OutgoingActivity>, StateScope) {
        (self.responses, self.user_state)
    }
}
