//! Prompts — the suspend points of a waterfall.
//!
//! A prompt renders a question, and on the following turn turns the raw
//! activity into a typed value (recognition) and checks it (validation).
//! Failures on either side are not errors: they simply re-prompt.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::channels::{Activity, InputHint, OutgoingActivity, SuggestedAction};

use super::state::PromptFrame;
use super::turn::TurnContext;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("number pattern is valid"));

const AFFIRMATIVE: &[&str] = &[
    "yes", "y", "yeah", "yep", "yup", "sure", "ok", "okay", "true", "affirmative",
];
const NEGATIVE: &[&str] = &["no", "n", "nope", "nah", "false", "negative"];

/// What shape of answer a prompt expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    /// Any non-empty text.
    Text,
    /// A whole number found in the text.
    Number,
    /// One of the offered choices, by value, synonym or 1-based index.
    Choice,
    /// Yes or no.
    Confirm,
    /// One or more attachments.
    Attachment,
}

impl std::fmt::Display for PromptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Choice => "choice",
            Self::Confirm => "confirm",
            Self::Attachment => "attachment",
        };
        write!(f, "{s}")
    }
}

/// A selectable answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
}

impl Choice {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            synonyms: Vec::new(),
        }
    }

    fn matches(&self, input: &str) -> bool {
        self.value.eq_ignore_ascii_case(input)
            || self.synonyms.iter().any(|s| s.eq_ignore_ascii_case(input))
    }
}

/// Build choices from plain strings.
pub fn choices(values: &[&str]) -> Vec<Choice> {
    values.iter().map(|v| Choice::new(*v)).collect()
}

/// What to show when prompting. Persisted in the `PromptFrame`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<OutgoingActivity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_prompt: Option<OutgoingActivity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
}

impl PromptOptions {
    /// Prompt with a text question.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self::activity(OutgoingActivity::text(prompt))
    }

    /// Prompt with an arbitrary activity (e.g. one carrying a card).
    pub fn activity(prompt: OutgoingActivity) -> Self {
        Self {
            prompt: Some(prompt),
            ..Default::default()
        }
    }

    pub fn with_retry_text(mut self, retry: impl Into<String>) -> Self {
        self.retry_prompt = Some(OutgoingActivity::text(retry));
        self
    }

    pub fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = choices;
        self
    }
}

/// Outcome of recognition, possibly rewritten by a validator.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognized {
    pub succeeded: bool,
    pub value: Value,
}

impl Recognized {
    fn success(value: Value) -> Self {
        Self {
            succeeded: true,
            value,
        }
    }

    fn failure() -> Self {
        Self {
            succeeded: false,
            value: Value::Null,
        }
    }
}

/// What a validator sees. It may replace `recognized.value` and send messages.
pub struct PromptValidatorContext<'a> {
    pub turn: &'a mut TurnContext,
    pub recognized: Recognized,
    pub options: &'a PromptOptions,
    pub attempt_count: u32,
}

/// Accept (`true`) or reject a recognized answer.
pub type PromptValidator = fn(&mut PromptValidatorContext<'_>) -> bool;

/// A registered prompt: its kind plus an optional validator.
#[derive(Debug, Clone)]
pub struct Prompt {
    id: String,
    kind: PromptKind,
    validator: Option<PromptValidator>,
}

impl Prompt {
    pub fn new(id: impl Into<String>, kind: PromptKind) -> Self {
        Self {
            id: id.into(),
            kind,
            validator: None,
        }
    }

    pub fn with_validator(mut self, validator: PromptValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    /// Render the question, or the retry message (falling back to the question).
    pub fn render(&self, options: &PromptOptions, retry: bool) -> OutgoingActivity {
        let base = if retry {
            options.retry_prompt.as_ref().or(options.prompt.as_ref())
        } else {
            options.prompt.as_ref()
        };
        let mut activity = base.cloned().unwrap_or_default();
        activity.input_hint = Some(InputHint::ExpectingInput);

        match self.kind {
            PromptKind::Choice => {
                activity.suggested_actions = options
                    .choices
                    .iter()
                    .map(|c| SuggestedAction {
                        title: c.value.clone(),
                        value: c.value.clone(),
                    })
                    .collect();
            }
            PromptKind::Confirm => {
                activity.suggested_actions = ["Yes", "No"]
                    .iter()
                    .map(|v| SuggestedAction {
                        title: v.to_string(),
                        value: v.to_string(),
                    })
                    .collect();
            }
            _ => {}
        }
        activity
    }

    /// Map the raw activity onto this prompt's expected shape.
    pub fn recognize(&self, activity: &Activity, options: &PromptOptions) -> Recognized {
        let text = activity.text().trim();
        match self.kind {
            PromptKind::Text => {
                if text.is_empty() {
                    Recognized::failure()
                } else {
                    Recognized::success(Value::String(text.to_string()))
                }
            }
            PromptKind::Number => recognize_integer(text)
                .map(|n| Recognized::success(Value::from(n)))
                .unwrap_or_else(Recognized::failure),
            PromptKind::Choice => recognize_choice(text, &options.choices)
                .map(|(index, choice)| {
                    Recognized::success(serde_json::json!({
                        "value": choice.value,
                        "index": index,
                    }))
                })
                .unwrap_or_else(Recognized::failure),
            PromptKind::Confirm => recognize_confirm(text)
                .map(|b| Recognized::success(Value::Bool(b)))
                .unwrap_or_else(Recognized::failure),
            PromptKind::Attachment => {
                if activity.attachments.is_empty() {
                    Recognized::failure()
                } else {
                    match serde_json::to_value(&activity.attachments) {
                        Ok(value) => Recognized::success(value),
                        Err(_) => Recognized::failure(),
                    }
                }
            }
        }
    }

    /// Recognize and validate the current activity against a suspended prompt.
    ///
    /// Returns the accepted value, or `None` if the user must be asked again.
    pub fn evaluate(&self, turn: &mut TurnContext, frame: &PromptFrame) -> Option<Value> {
        let recognized = self.recognize(turn.activity(), &frame.options);
        let (accepted, recognized) = match self.validator {
            Some(validator) => {
                let mut ctx = PromptValidatorContext {
                    turn,
                    recognized,
                    options: &frame.options,
                    attempt_count: frame.attempt_count,
                };
                let accepted = validator(&mut ctx);
                (accepted, ctx.recognized)
            }
            None => (recognized.succeeded, recognized),
        };

        debug!(
            prompt_id = %self.id,
            kind = %self.kind,
            succeeded = recognized.succeeded,
            accepted,
            "Prompt answer evaluated"
        );
        accepted.then_some(recognized.value)
    }
}

/// First whole number in the text. Fractions and overflow do not count.
pub fn recognize_integer(text: &str) -> Option<i64> {
    let found = NUMBER.find(text)?.as_str();
    if found.contains('.') {
        return None;
    }
    found.parse().ok()
}

/// Match by value or synonym (case-insensitive), then by 1-based position.
pub fn recognize_choice<'a>(text: &str, choices: &'a [Choice]) -> Option<(usize, &'a Choice)> {
    if text.is_empty() {
        return None;
    }
    if let Some(found) = choices.iter().enumerate().find(|(_, c)| c.matches(text)) {
        return Some(found);
    }
    let position: usize = text.parse().ok()?;
    let index = position.checked_sub(1)?;
    choices.get(index).map(|c| (index, c))
}

/// Yes/no words. Anything else is unrecognized.
pub fn recognize_confirm(text: &str) -> Option<bool> {
    let lower = text.trim_end_matches(['.', '!']).to_lowercase();
    if AFFIRMATIVE.contains(&lower.as_str()) {
        Some(true)
    } else if NEGATIVE.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}
