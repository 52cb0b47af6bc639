//! Agent endpoint protocol.
//!
//! `POST /agent/parse` takes `{text, context: {current_page}}` and answers
//! with an optional render instruction (what the guide says / plays) and an
//! optional UI action.

pub mod action;

pub use action::{Action, ActionKind};

use serde::{Deserialize, Serialize};

/// Page context sent with every utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    pub current_page: String,
}

impl PageContext {
    pub fn new(current_page: impl Into<String>) -> Self {
        Self {
            current_page: current_page.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentRequest {
    pub text: String,
    pub context: PageContext,
}

/// What the guide should say and show.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct RenderInstruction {
    pub text: String,
    /// Halt and rewind whatever is playing, even without a new video.
    pub stop_playback: bool,
    pub video_url: Option<String>,
    pub audio_url: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AgentResponse {
    pub render: Option<RenderInstruction>,
    pub action: Option<Action>,
    /// Speech-to-text result, only set by `/agent/audio`.
    pub transcript: Option<String>,
}
