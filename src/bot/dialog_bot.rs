//! Turn handler: load state, dispatch the activity, commit, then respond.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::channels::{Activity, ActivityType, InvokeResponse, TurnResponse};
use crate::dialogs::{DIALOG_STATE_PROPERTY, DialogContext, DialogSet, DialogState, TurnContext};
use crate::error::{ConfigError, Result};
use crate::store::{StateScope, Storage, conversation_key, user_key};

use super::cards;
use super::task_module::{self, TASK_FETCH, TASK_SUBMIT};

/// Runs one conversation turn at a time against shared dialogs and storage.
pub struct DialogBot {
    dialogs: Arc<DialogSet>,
    storage: Arc<dyn Storage>,
    root_dialog: String,
    base_url: String,
    max_turn_attempts: u32,
}

impl DialogBot {
    /// Fails if `root_dialog` is not a registered waterfall.
    pub fn new(
        dialogs: Arc<DialogSet>,
        storage: Arc<dyn Storage>,
        root_dialog: impl Into<String>,
        base_url: impl Into<String>,
    ) -> std::result::Result<Self, ConfigError> {
        let root_dialog = root_dialog.into();
        dialogs.find_waterfall(&root_dialog)?;
        Ok(Self {
            dialogs,
            storage,
            root_dialog,
            base_url: base_url.into(),
            max_turn_attempts: 3,
        })
    }

    /// How many times a turn is replayed after a stale-write conflict.
    pub fn with_max_turn_attempts(mut self, attempts: u32) -> Self {
        self.max_turn_attempts = attempts.max(1);
        self
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Process one inbound activity.
    ///
    /// Responses are returned only once both state scopes have been written.
    /// A conflicting write replays the turn from a fresh load.
    pub async fn on_turn(&self, activity: &Activity) -> Result<TurnResponse> {
        let mut attempt = 1;
        loop {
            match self.try_turn(activity).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_conflict() && attempt < self.max_turn_attempts => {
                    warn!(
                        conversation_id = %activity.conversation.id,
                        attempt,
                        error = %e,
                        "State conflict, replaying turn"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_turn(&self, activity: &Activity) -> Result<TurnResponse> {
        let storage = self.storage.as_ref();
        let mut conversation = StateScope::load(storage, conversation_key(activity)).await?;
        let user = StateScope::load(storage, user_key(activity)).await?;
        let mut dialog_state: DialogState = conversation
            .get(DIALOG_STATE_PROPERTY)?
            .unwrap_or_default();

        let mut turn = TurnContext::new(activity.clone(), user);
        let invoke_response = self.dispatch(&mut turn, &mut dialog_state)?;
        let (activities, mut user) = turn.into_parts();

        user.save(storage).await?;
        conversation.set(DIALOG_STATE_PROPERTY, &dialog_state)?;
        conversation.save(storage).await?;

        info!(
            conversation_id = %activity.conversation.id,
            activity_type = %activity.activity_type,
            responses = activities.len(),
            depth = dialog_state.depth(),
            "Turn committed"
        );
        Ok(TurnResponse {
            activities,
            invoke_response,
        })
    }

    fn dispatch(
        &self,
        turn: &mut TurnContext,
        state: &mut DialogState,
    ) -> Result<Option<InvokeResponse>> {
        match turn.activity().activity_type {
            ActivityType::Message => {
                self.run_dialog(turn, state)?;
                Ok(None)
            }
            ActivityType::ConversationUpdate => {
                self.on_members_added(turn, state)?;
                Ok(None)
            }
            ActivityType::Invoke => self.on_invoke(turn).map(Some),
        }
    }

    fn run_dialog(&self, turn: &mut TurnContext, state: &mut DialogState) -> Result<()> {
        let status = DialogContext::new(&self.dialogs, state, turn).run(&self.root_dialog)?;
        debug!(?status, "Dialog turn finished");
        Ok(())
    }

    /// Welcome everyone who joined except the bot, then start the root dialog.
    fn on_members_added(&self, turn: &mut TurnContext, state: &mut DialogState) -> Result<()> {
        let recipient = turn.activity().recipient.id.clone();
        let greeted = turn
            .activity()
            .members_added
            .iter()
            .filter(|m| m.id != recipient)
            .count();
        if greeted == 0 {
            return Ok(());
        }

        for _ in 0..greeted {
            turn.send(cards::welcome_message()?);
        }
        info!(members = greeted, "Welcomed new members");
        self.run_dialog(turn, state)
    }

    fn on_invoke(&self, turn: &mut TurnContext) -> Result<InvokeResponse> {
        let name = turn.activity().name.clone();
        let value = turn.activity().value.clone().unwrap_or_default();
        match name.as_deref() {
            Some(TASK_FETCH) => {
                let response = task_module::fetch(&self.base_url, &value)?;
                Ok(InvokeResponse::ok(Some(serde_json::to_value(response)?)))
            }
            Some(TASK_SUBMIT) => {
                turn.send_text(task_module::submit_text(&value));
                Ok(InvokeResponse::ok(None))
            }
            other => {
                debug!(name = ?other, "Unhandled invoke");
                Ok(InvokeResponse::not_implemented())
            }
        }
    }
}
