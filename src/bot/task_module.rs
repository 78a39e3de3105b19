//! Task-module invoke handling: `task/fetch` and `task/submit`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::channels::Attachment;
use crate::error::Result;

use super::cards;

/// Invoke name Teams sends when a task-module button is clicked.
pub const TASK_FETCH: &str = "task/fetch";
/// Invoke name Teams sends when a task module posts back.
pub const TASK_SUBMIT: &str = "task/submit";

/// Ids of the task modules the bot can open.
pub mod ids {
    pub const YOUTUBE: &str = "youtube";
    pub const CUSTOM_FORM: &str = "customform";
    pub const ADAPTIVE_CARD: &str = "adaptivecard";
}

/// Display settings for one task module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiSettings {
    pub id: &'static str,
    pub title: &'static str,
    pub width: u32,
    pub height: u32,
    pub button_title: &'static str,
}

pub const YOUTUBE: UiSettings = UiSettings {
    id: ids::YOUTUBE,
    title: "YouTube Video",
    width: 1000,
    height: 700,
    button_title: "YouTube",
};

pub const CUSTOM_FORM: UiSettings = UiSettings {
    id: ids::CUSTOM_FORM,
    title: "Custom Form",
    width: 510,
    height: 450,
    button_title: "Custom Form",
};

pub const ADAPTIVE_CARD: UiSettings = UiSettings {
    id: ids::ADAPTIVE_CARD,
    title: "Adaptive Card: Inputs",
    width: 400,
    height: 200,
    button_title: "Adaptive Card",
};

/// Button order on the hero card.
pub const HERO_CARD_MODULES: [UiSettings; 3] = [CUSTOM_FORM, ADAPTIVE_CARD, YOUTUBE];

/// What the client should render in the task module window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Attachment>,
}

impl TaskInfo {
    fn with_settings(mut self, ui: &UiSettings) -> Self {
        self.title = Some(ui.title.to_string());
        self.height = Some(ui.height);
        self.width = Some(ui.width);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskContinue {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: TaskInfo,
}

/// Body of a `task/fetch` invoke response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskModuleResponse {
    pub task: TaskContinue,
}

impl TaskModuleResponse {
    pub fn continue_with(value: TaskInfo) -> Self {
        Self {
            task: TaskContinue {
                kind: "continue".to_string(),
                value,
            },
        }
    }
}

/// Pull the module id out of a fetch payload: `{data: {data|Data: <id>}}`.
pub fn requested_module(value: &Value) -> Option<&str> {
    let data = value.get("data")?;
    data.get("data")
        .or_else(|| data.get("Data"))
        .and_then(Value::as_str)
}

/// Build the task info for a fetch. Unknown ids get an empty task info.
pub fn fetch(base_url: &str, value: &Value) -> Result<TaskModuleResponse> {
    let id = requested_module(value);
    let info = match id {
        Some(ids::YOUTUBE) => url_task(base_url, &YOUTUBE),
        Some(ids::CUSTOM_FORM) => url_task(base_url, &CUSTOM_FORM),
        Some(ids::ADAPTIVE_CARD) => TaskInfo {
            card: Some(cards::adaptive_card_task()?),
            ..Default::default()
        }
        .with_settings(&ADAPTIVE_CARD),
        other => {
            tracing::warn!(module = ?other, "Task fetch for unknown module");
            TaskInfo::default()
        }
    };
    Ok(TaskModuleResponse::continue_with(info))
}

fn url_task(base_url: &str, ui: &UiSettings) -> TaskInfo {
    let url = format!("{base_url}{}", ui.id);
    TaskInfo {
        url: Some(url.clone()),
        fallback_url: Some(url),
        ..Default::default()
    }
    .with_settings(ui)
}

/// Text echoed back when a task module submits.
pub fn submit_text(value: &Value) -> String {
    format!("Task module submitted: {value}")
}
