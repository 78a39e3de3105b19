//! End-to-end conversations driven through `DialogBot::on_turn`.

use std::sync::Arc;

use serde_json::json;

use task_module_bot::bot::profile_dialog::{NOT_KEPT, PICTURE_FALLBACK};
use task_module_bot::bot::{DialogBot, USER_PROFILE_PROPERTY, UserProfile, build_dialogs, dialog_ids};
use task_module_bot::channels::{
    Activity, Attachment, ChannelAccount, HERO_CARD_CONTENT_TYPE, TurnResponse,
};
use task_module_bot::dialogs::{DIALOG_STATE_PROPERTY, DialogState};
use task_module_bot::store::{LibSqlStorage, MemoryStorage, StateScope, Storage};

const BASE_URL: &str = "https://bot.example.com/";
const FOLLOW_UP: &str = "What else can I do for you?";

// =============================================================================
// Helpers
// =============================================================================

struct Harness {
    bot: DialogBot,
    storage: Arc<dyn Storage>,
    channel: &'static str,
}

impl Harness {
    fn new(channel: &'static str) -> Self {
        Self::with_storage(channel, Arc::new(MemoryStorage::new()))
    }

    fn with_storage(channel: &'static str, storage: Arc<dyn Storage>) -> Self {
        let bot = DialogBot::new(
            Arc::new(build_dialogs().unwrap()),
            Arc::clone(&storage),
            dialog_ids::MAIN_DIALOG,
            BASE_URL,
        )
        .unwrap();
        Self {
            bot,
            storage,
            channel,
        }
    }

    async fn join(&self) -> TurnResponse {
        let activity =
            Activity::members_added(self.channel, "conv-1", vec![ChannelAccount::new("u1")]);
        self.bot.on_turn(&activity).await.unwrap()
    }

    async fn send(&self, activity: Activity) -> TurnResponse {
        self.bot.on_turn(&activity).await.unwrap()
    }

    async fn say(&self, text: &str) -> Vec<String> {
        let activity =
            Activity::message(self.channel, "conv-1", "u1", text).with_sender_name("Ada");
        texts(&self.send(activity).await)
    }

    async fn dialog_state(&self) -> DialogState {
        let key = format!("conversation/{}/conv-1", self.channel);
        let scope = StateScope::load(self.storage.as_ref(), key).await.unwrap();
        scope.get(DIALOG_STATE_PROPERTY).unwrap().unwrap_or_default()
    }

    async fn profile(&self) -> Option<UserProfile> {
        let key = format!("user/{}/u1", self.channel);
        let scope = StateScope::load(self.storage.as_ref(), key).await.unwrap();
        scope.get(USER_PROFILE_PROPERTY).unwrap()
    }
}

fn texts(response: &TurnResponse) -> Vec<String> {
    response
        .activities
        .iter()
        .filter_map(|a| a.text.clone())
        .collect()
}

// =============================================================================
// Welcome
// =============================================================================

#[tokio::test]
async fn joining_sends_one_welcome_card_and_starts_the_router() {
    let harness = Harness::new("test");
    let response = harness.join().await;

    assert_eq!(response.activities.len(), 2);
    assert_eq!(
        response.activities[0].speak.as_deref(),
        Some("Welcome to Bot Framework!")
    );
    let greeting = response.activities[1].text.as_deref().unwrap();
    assert!(greeting.starts_with("What can I help you with today?"));

    let state = harness.dialog_state().await;
    assert_eq!(state.depth(), 1);
    assert_eq!(state.top().unwrap().dialog_id, "MainDialog");
    assert!(state.top().unwrap().is_waiting());
}

// =============================================================================
// Router
// =============================================================================

#[tokio::test]
async fn test_command_shows_hero_card_then_loops() {
    let harness = Harness::new("test");
    harness.join().await;

    let activity = Activity::message("test", "conv-1", "u1", "test");
    let response = harness.send(activity).await;
    assert_eq!(response.activities.len(), 2);
    assert_eq!(
        response.activities[0].attachments[0].content_type,
        HERO_CARD_CONTENT_TYPE
    );
    assert_eq!(response.activities[1].text.as_deref(), Some(FOLLOW_UP));
}

#[tokio::test]
async fn unknown_text_falls_through_to_follow_up() {
    let harness = Harness::new("test");
    harness.join().await;
    assert_eq!(harness.say("hello there").await, vec![FOLLOW_UP]);

    let state = harness.dialog_state().await;
    assert_eq!(state.depth(), 1);
    assert_eq!(state.top().unwrap().step_index, 0);
}

// =============================================================================
// get profile2
// =============================================================================

#[tokio::test]
async fn task_module_profile_is_confirmed_and_saved() {
    let harness = Harness::new("test");
    harness.join().await;

    let launch = harness
        .send(Activity::message("test", "conv-1", "u1", "get profile2"))
        .await;
    assert_eq!(launch.activities.len(), 1);
    assert_eq!(
        launch.activities[0].attachments[0].content_type,
        HERO_CARD_CONTENT_TYPE
    );
    assert_eq!(harness.dialog_state().await.depth(), 2);

    assert_eq!(
        harness.say("YouTube").await,
        vec!["Result from Task Module: YouTube, Is this ok?"]
    );

    assert_eq!(
        harness.say("yes").await,
        vec![
            "I have your mode of transport as YouTube and your name as Ada.",
            FOLLOW_UP,
        ]
    );

    let profile = harness.profile().await.unwrap();
    assert_eq!(profile.transport, "YouTube");
    assert_eq!(profile.name, "Ada");
    assert_eq!(profile.age, -1);
    assert!(profile.saved_at.is_some());
    assert_eq!(harness.dialog_state().await.depth(), 1);
}

#[tokio::test]
async fn declining_the_task_result_keeps_nothing() {
    let harness = Harness::new("test");
    harness.join().await;
    harness.say("get profile2").await;
    harness.say("Custom Form").await;

    let reprompt = harness.say("maybe").await;
    assert_eq!(reprompt, vec!["Result from Task Module: Custom Form, Is this ok?"]);

    assert_eq!(harness.say("no").await, vec![NOT_KEPT, FOLLOW_UP]);
    assert!(harness.profile().await.is_none());
}

// =============================================================================
// get profile
// =============================================================================

#[tokio::test]
async fn full_profile_with_age_and_picture() {
    let harness = Harness::new("test");
    harness.join().await;

    assert_eq!(
        harness.say("get profile").await,
        vec!["Please enter your mode of transport."]
    );
    assert_eq!(harness.say("bus").await, vec!["Please enter your name."]);
    assert_eq!(
        harness.say("Ada").await,
        vec!["Thanks Ada.", "Would you like to give your age?"]
    );
    assert_eq!(harness.say("yes").await, vec!["Please enter your age."]);

    let depth_before = harness.dialog_state().await.depth();
    assert_eq!(
        harness.say("200").await,
        vec!["The value entered must be greater than 0 and less than 150."]
    );
    assert_eq!(harness.dialog_state().await.depth(), depth_before);

    assert_eq!(
        harness.say("36").await,
        vec![
            "I have your age as 36.",
            "Please attach a profile picture (or type any message to skip).",
        ]
    );

    let picture = Activity::message("test", "conv-1", "u1", "").with_attachments(vec![
        Attachment::file("text/plain", "https://x/notes.txt"),
        Attachment::file("image/png", "https://x/me.png"),
    ]);
    assert_eq!(texts(&harness.send(picture).await), vec!["Is this ok?"]);

    let done = harness
        .send(Activity::message("test", "conv-1", "u1", "yes"))
        .await;
    assert_eq!(
        texts(&done),
        vec![
            "I have your mode of transport as Bus and your name as Ada and your age as 36.",
            "This is your profile picture.",
            FOLLOW_UP,
        ]
    );
    assert_eq!(
        done.activities[1].attachments[0].content_url.as_deref(),
        Some("https://x/me.png")
    );

    let profile = harness.profile().await.unwrap();
    assert_eq!(profile.age, 36);
    assert_eq!(profile.picture.unwrap().content_type, "image/png");
}

#[tokio::test]
async fn teams_channel_skips_picture_prompt() {
    let harness = Harness::new("msteams");
    harness.join().await;
    harness.say("get profile").await;
    harness.say("2").await;
    harness.say("Ada").await;

    assert_eq!(
        harness.say("no").await,
        vec![
            "No age given.",
            "Skipping attachment prompt in Teams channel...",
            "Is this ok?",
        ]
    );
    assert_eq!(
        harness.say("yes").await,
        vec![
            "I have your mode of transport as Bus and your name as Ada.",
            FOLLOW_UP,
        ]
    );
    assert!(harness.profile().await.unwrap().picture.is_none());
}

#[tokio::test]
async fn skipping_the_picture_sends_a_notice() {
    let harness = Harness::new("test");
    harness.join().await;
    for text in ["get profile", "car", "Ada", "no"] {
        harness.say(text).await;
    }
    assert_eq!(
        harness.say("skip").await,
        vec![
            "No attachments received. Proceeding without a profile picture...",
            "Is this ok?",
        ]
    );
}

#[tokio::test]
async fn unrenderable_picture_degrades_to_text() {
    let harness = Harness::new("test");
    harness.join().await;
    for text in ["get profile", "car", "Ada", "no"] {
        harness.say(text).await;
    }

    let broken = Attachment {
        content_type: "image/jpeg".into(),
        content_url: None,
        content: None,
        name: None,
    };
    let picture = Activity::message("test", "conv-1", "u1", "").with_attachments(vec![broken]);
    harness.send(picture).await;

    assert_eq!(
        harness.say("yes").await,
        vec![
            "I have your mode of transport as Car and your name as Ada.",
            PICTURE_FALLBACK,
            FOLLOW_UP,
        ]
    );
    assert!(harness.profile().await.unwrap().picture.is_some());
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn conversation_resumes_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bot.db");

    {
        let storage = Arc::new(LibSqlStorage::new_local(&path).await.unwrap());
        let harness = Harness::with_storage("test", storage);
        harness.join().await;
        harness.say("get profile").await;
        assert_eq!(harness.say("Bicycle").await, vec!["Please enter your name."]);
    }

    let storage = Arc::new(LibSqlStorage::new_local(&path).await.unwrap());
    let harness = Harness::with_storage("test", storage);
    let state = harness.dialog_state().await;
    assert_eq!(state.depth(), 2);
    assert_eq!(state.top().unwrap().dialog_id, "UserProfileDialog");

    assert_eq!(
        harness.say("Ada").await,
        vec!["Thanks Ada.", "Would you like to give your age?"]
    );
}

// =============================================================================
// Invokes
// =============================================================================

#[tokio::test]
async fn youtube_fetch_returns_task_info() {
    let harness = Harness::new("msteams");
    let fetch = Activity::invoke(
        "msteams",
        "conv-1",
        "u1",
        "task/fetch",
        json!({"data": {"type": "task/fetch", "data": "youtube"}}),
    );
    let response = harness.send(fetch).await;
    assert!(response.activities.is_empty());

    let invoke = response.invoke_response.unwrap();
    assert_eq!(invoke.status, 200);
    let body = invoke.body.unwrap();
    assert_eq!(body["task"]["type"], "continue");
    let value = &body["task"]["value"];
    assert_eq!(value["url"], "https://bot.example.com/youtube");
    assert_eq!(value["fallbackUrl"], "https://bot.example.com/youtube");
    assert_eq!(value["title"], "YouTube Video");
    assert_eq!(value["width"], 1000);
    assert_eq!(value["height"], 700);
}

#[tokio::test]
async fn invoke_does_not_disturb_a_waiting_dialog() {
    let harness = Harness::new("msteams");
    harness.join().await;
    harness.say("get profile2").await;
    let before = harness.dialog_state().await;

    let fetch = Activity::invoke(
        "msteams",
        "conv-1",
        "u1",
        "task/fetch",
        json!({"data": {"data": "adaptivecard"}}),
    );
    harness.send(fetch).await;
    assert_eq!(harness.dialog_state().await, before);
}
