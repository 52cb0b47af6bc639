//! Virtual guide: the floating conversational widget.
//!
//! States: `Closed` → `OpenIdle` ⇄ `OpenBusy`.
//! - `toggle()` opens/closes with no side effects.
//! - Submitting non-blank text appends a pending user turn and enters
//!   `OpenBusy` before any request is made.
//! - The reply (or transport failure) is applied and the guide returns to
//!   `OpenIdle`.
//!
//! Replies may say something (agent turn), stop or start the avatar video,
//! and carry a UI action that is either executed at once or held until the
//! user confirms it.

pub mod dispatch;
pub mod surface;
pub mod transcript;

pub use dispatch::execute_action;
pub use surface::{InMemoryMedia, InMemoryPage, MediaSurface, PageDriver, PlaybackError};
pub use transcript::{Speaker, Transcript, Turn, TurnId, TurnStatus};

use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::agent::{Action, AgentRequest, AgentResponse, PageContext};
use crate::sdk::{FileUpload, GuideBackend, SdkError};
use crate::utils::{resolve_media_url, safe_truncate};

/// Error turn appended when the agent cannot be reached.
pub const UNREACHABLE_MESSAGE: &str = "Could not reach agent.";

const LOG_PREVIEW_BYTES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideState {
    Closed,
    OpenIdle,
    OpenBusy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuideError {
    #[error("the guide is closed")]
    Closed,
    #[error("the guide is waiting for a reply")]
    Busy,
    #[error("nothing to send")]
    BlankUtterance,
    #[error("no exchange in flight")]
    NotInFlight,
}

/// How an exchange ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// Reply applied; any action has already run.
    Replied,
    /// Reply applied; its action waits for [`VirtualGuide::confirm_pending`].
    AwaitingConfirmation,
    /// Transport failure; an error turn was appended.
    Unreachable,
}

enum InFlight {
    Utterance(TurnId),
    Recording,
}

pub struct VirtualGuide<M: MediaSurface, P: PageDriver> {
    origin: Url,
    open: bool,
    in_flight: Option<InFlight>,
    transcript: Transcript,
    pending_action: Option<Action>,
    media: M,
    page: P,
}

impl<M: MediaSurface, P: PageDriver> VirtualGuide<M, P> {
    /// A closed guide. `origin` resolves relative video paths.
    pub fn new(origin: Url, media: M, page: P) -> Self {
        Self {
            origin,
            open: false,
            in_flight: None,
            transcript: Transcript::new(),
            pending_action: None,
            media,
            page,
        }
    }

    pub fn state(&self) -> GuideState {
        match (self.open, self.in_flight.is_some()) {
            (false, _) => GuideState::Closed,
            (true, false) => GuideState::OpenIdle,
            (true, true) => GuideState::OpenBusy,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Open or close the panel. An exchange in flight still lands in the
    /// transcript if the panel is closed meanwhile.
    pub fn toggle(&mut self) -> GuideState {
        self.open = !self.open;
        debug!(open = self.open, "Guide toggled");
        self.state()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn pending_action(&self) -> Option<&Action> {
        self.pending_action.as_ref()
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    fn ensure_ready(&self) -> Result<(), GuideError> {
        if !self.open {
            return Err(GuideError::Closed);
        }
        if self.in_flight.is_some() {
            return Err(GuideError::Busy);
        }
        Ok(())
    }

    fn context(&self) -> PageContext {
        PageContext::new(self.page.current_route())
    }

    /// Phase one of an utterance: record the user turn and go busy.
    pub fn begin_utterance(&mut self, text: &str) -> Result<AgentRequest, GuideError> {
        self.ensure_ready()?;
        if text.trim().is_empty() {
            return Err(GuideError::BlankUtterance);
        }

        let turn = self.transcript.push_pending(text);
        self.in_flight = Some(InFlight::Utterance(turn));
        let context = self.context();
        info!(
            text = safe_truncate(text, LOG_PREVIEW_BYTES),
            page = %context.current_page,
            "Sending utterance"
        );
        Ok(AgentRequest {
            text: text.to_string(),
            context,
        })
    }

    /// Phase two: apply the reply (or failure) and return to idle.
    pub fn finish_utterance(
        &mut self,
        result: Result<AgentResponse, SdkError>,
    ) -> Result<ExchangeOutcome, GuideError> {
        let turn = match self.in_flight.take() {
            Some(InFlight::Utterance(turn)) => turn,
            other => {
                self.in_flight = other;
                return Err(GuideError::NotInFlight);
            }
        };

        let status = if result.is_ok() {
            TurnStatus::Delivered
        } else {
            TurnStatus::Failed
        };
        self.transcript.resolve(turn, status);
        Ok(self.settle(result))
    }

    /// Send one typed utterance and apply the reply.
    pub async fn send_utterance(
        &mut self,
        backend: &dyn GuideBackend,
        text: &str,
    ) -> Result<ExchangeOutcome, GuideError> {
        let request = self.begin_utterance(text)?;
        let result = backend.agent_parse(request).await;
        self.finish_utterance(result)
    }

    /// Phase one of a voice message: go busy and capture the page context.
    ///
    /// No user turn is appended yet; its text is the server's transcription.
    pub fn begin_recording(&mut self) -> Result<PageContext, GuideError> {
        self.ensure_ready()?;
        self.in_flight = Some(InFlight::Recording);
        Ok(self.context())
    }

    pub fn finish_recording(
        &mut self,
        result: Result<AgentResponse, SdkError>,
    ) -> Result<ExchangeOutcome, GuideError> {
        match self.in_flight.take() {
            Some(InFlight::Recording) => {}
            other => {
                self.in_flight = other;
                return Err(GuideError::NotInFlight);
            }
        }

        if let Ok(response) = &result {
            if let Some(heard) = response.transcript.as_deref().filter(|t| !t.trim().is_empty()) {
                self.transcript.push(Speaker::User, heard);
            }
        }
        Ok(self.settle(result))
    }

    /// Send a recorded voice message and apply the reply.
    pub async fn send_recording(
        &mut self,
        backend: &dyn GuideBackend,
        audio: FileUpload,
    ) -> Result<ExchangeOutcome, GuideError> {
        let context = self.begin_recording()?;
        let result = backend.agent_audio(audio, context).await;
        self.finish_recording(result)
    }

    fn settle(&mut self, result: Result<AgentResponse, SdkError>) -> ExchangeOutcome {
        match result {
            Ok(response) => self.apply_response(response),
            Err(e) => {
                error!(error = %e, "Agent request failed");
                self.transcript.push(Speaker::Error, UNREACHABLE_MESSAGE);
                ExchangeOutcome::Unreachable
            }
        }
    }

    fn apply_response(&mut self, response: AgentResponse) -> ExchangeOutcome {
        if let Some(render) = response.render {
            if !render.text.trim().is_empty() {
                self.transcript.push(Speaker::Agent, render.text.as_str());
            }

            if render.stop_playback {
                debug!("Stopping playback");
                self.media.pause();
                self.media.rewind();
            }

            if let Some(path) = render.video_url.as_deref() {
                let url = resolve_media_url(&self.origin, path);
                debug!(%url, "Loading guide video");
                self.media.load(&url);
                self.media.show();
                if let Err(e) = self.media.play() {
                    debug!(error = %e, "Guide video did not autoplay");
                }
            }
        }

        match response.action {
            Some(action) if action.confirmation_required => {
                if let Some(previous) = self.pending_action.replace(action) {
                    debug!(
                        action_type = previous.kind.action_type(),
                        "Dropping unconfirmed action"
                    );
                }
                ExchangeOutcome::AwaitingConfirmation
            }
            Some(action) => {
                self.execute_action(&action);
                ExchangeOutcome::Replied
            }
            None => ExchangeOutcome::Replied,
        }
    }

    /// Run an action against the page right away.
    pub fn execute_action(&mut self, action: &Action) {
        execute_action(action, &mut self.page);
    }

    /// Run the action waiting for confirmation. Returns `false` if none was.
    pub fn confirm_pending(&mut self) -> bool {
        match self.pending_action.take() {
            Some(action) => {
                info!(action_type = action.kind.action_type(), "Action confirmed");
                self.execute_action(&action);
                true
            }
            None => false,
        }
    }

    /// Drop the action waiting for confirmation without running it.
    pub fn decline_pending(&mut self) -> bool {
        match self.pending_action.take() {
            Some(action) => {
                info!(action_type = action.kind.action_type(), "Action declined");
                true
            }
            None => false,
        }
    }
}
