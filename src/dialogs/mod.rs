//! Dialog orchestration: a persisted stack of waterfalls that suspend on prompts.

pub mod context;
pub mod prompts;
pub mod registry;
pub mod state;
pub mod turn;
pub mod waterfall;

pub use context::{DialogContext, DialogTurnStatus};
pub use prompts::{
    Choice, Prompt, PromptKind, PromptOptions, PromptValidator, PromptValidatorContext,
    Recognized, choices,
};
pub use registry::{Dialog, DialogSet};
pub use state::{DIALOG_STATE_PROPERTY, DialogInstance, DialogState, PromptFrame};
pub use turn::TurnContext;
pub use waterfall::{StepContext, StepFn, StepResult, Waterfall};
