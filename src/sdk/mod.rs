//! HTTP client for the InteractGEN backend.
//!
//! Routes under `api_base` (default `http://localhost:8000/v1`):
//! - `POST /tts` JSON `{text, ...options}`
//! - `POST /render` multipart `image`, `text`, `consent_confirmed`, `voice_profile_id?`
//! - `POST /animate` multipart `image`, `audio`, `consent_confirmed`
//! - `POST /clone-voice` multipart `file`
//!
//! Routes under `agent_base` (default `http://localhost:8000`):
//! - `POST /agent/parse` JSON `{text, context}`
//! - `POST /agent/audio` multipart `audio`, `context`
//!
//! The form and the guide depend on [`RenderBackend`] / [`GuideBackend`]
//! rather than on [`Client`] directly.

pub mod error;
pub mod types;

pub use error::SdkError;
pub use types::{
    AnimateRequest, CloneVoiceResponse, FileUpload, HealthStatus, RenderRequest, RenderResult,
    TtsOptions, TtsResponse,
};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::agent::{AgentRequest, AgentResponse, PageContext};
use crate::config::{Config, Endpoints};

/// Submits render jobs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RenderBackend: Send + Sync {
    async fn render(&self, request: RenderRequest) -> Result<RenderResult, SdkError>;
}

/// Sends utterances to the agent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GuideBackend: Send + Sync {
    async fn agent_parse(&self, request: AgentRequest) -> Result<AgentResponse, SdkError>;

    async fn agent_audio(
        &self,
        audio: FileUpload,
        context: PageContext,
    ) -> Result<AgentResponse, SdkError>;
}

/// Stateless client; cheap to clone.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    origin: Url,
    api_base: String,
    agent_base: String,
}

impl Client {
    pub fn new(endpoints: &Endpoints) -> Result<Self, SdkError> {
        let http = reqwest::Client::builder()
            .timeout(endpoints.timeout)
            .build()
            .map_err(SdkError::Build)?;
        Ok(Self {
            http,
            origin: endpoints.origin.clone(),
            api_base: endpoints.api_base.trim_end_matches('/').to_string(),
            agent_base: endpoints.agent_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let endpoints = config.endpoints()?;
        Ok(Self::new(&endpoints)?)
    }

    /// Origin that relative media paths resolve against.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Text to speech. The response shape is backend-defined; unknown keys
    /// are kept in [`TtsResponse::extra`].
    pub async fn tts(&self, text: &str, options: &TtsOptions) -> Result<TtsResponse, SdkError> {
        let url = format!("{}/tts", self.api_base);
        let body = options.to_body(text)?;
        debug!(%url, chars = text.chars().count(), "tts request");
        self.send_json(&url, self.http.post(&url).json(&body)).await
    }

    /// Full pipeline: portrait + text → video. Refuses to upload without consent.
    pub async fn render(&self, request: &RenderRequest) -> Result<RenderResult, SdkError> {
        if !request.consent_confirmed {
            return Err(SdkError::ConsentRequired);
        }
        let url = format!("{}/render", self.api_base);
        let mut form = Form::new()
            .part("image", file_part(&request.image)?)
            .text("text", request.text.clone())
            .text("consent_confirmed", "true");
        if let Some(voice) = &request.voice_profile_id {
            form = form.text("voice_profile_id", voice.clone());
        }

        debug!(
            %url,
            image = %request.image.file_name,
            image_bytes = request.image.bytes.len(),
            voice = request.voice_profile_id.as_deref().unwrap_or("default"),
            "render request"
        );
        self.send_json(&url, self.http.post(&url).multipart(form)).await
    }

    /// Portrait + recorded audio → video.
    pub async fn animate(&self, request: &AnimateRequest) -> Result<RenderResult, SdkError> {
        if !request.consent_confirmed {
            return Err(SdkError::ConsentRequired);
        }
        let url = format!("{}/animate", self.api_base);
        let form = Form::new()
            .part("image", file_part(&request.image)?)
            .part("audio", file_part(&request.audio)?)
            .text("consent_confirmed", "true");
        debug!(%url, image = %request.image.file_name, audio = %request.audio.file_name, "animate request");
        self.send_json(&url, self.http.post(&url).multipart(form)).await
    }

    /// Register a voice sample; the returned id can be passed to `tts` and `render`.
    pub async fn clone_voice(&self, sample: &FileUpload) -> Result<CloneVoiceResponse, SdkError> {
        let url = format!("{}/clone-voice", self.api_base);
        let form = Form::new().part("file", file_part(sample)?);
        debug!(%url, sample = %sample.file_name, "clone-voice request");
        self.send_json(&url, self.http.post(&url).multipart(form)).await
    }

    pub async fn health(&self) -> Result<HealthStatus, SdkError> {
        let url = format!("{}/health", self.origin.as_str().trim_end_matches('/'));
        self.send_json(&url, self.http.get(&url)).await
    }

    pub async fn agent_parse(&self, request: &AgentRequest) -> Result<AgentResponse, SdkError> {
        let url = format!("{}/agent/parse", self.agent_base);
        debug!(%url, page = %request.context.current_page, "agent parse request");
        self.send_json(&url, self.http.post(&url).json(request)).await
    }

    pub async fn agent_audio(
        &self,
        audio: &FileUpload,
        context: &PageContext,
    ) -> Result<AgentResponse, SdkError> {
        let url = format!("{}/agent/audio", self.agent_base);
        let context_json = serde_json::to_string(context).map_err(SdkError::Encode)?;
        let form = Form::new()
            .part("audio", file_part(audio)?)
            .text("context", context_json);
        debug!(%url, audio_bytes = audio.bytes.len(), "agent audio request");
        self.send_json(&url, self.http.post(&url).multipart(form)).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, SdkError> {
        let response = request.send().await.map_err(|source| SdkError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SdkError::Status {
                endpoint: endpoint.to_string(),
                status,
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|source| SdkError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;
        debug!(endpoint, status = status.as_u16(), bytes = bytes.len(), "response received");
        serde_json::from_slice(&bytes).map_err(|source| SdkError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

fn file_part(upload: &FileUpload) -> Result<Part, SdkError> {
    Part::bytes(upload.bytes.clone())
        .file_name(upload.file_name.clone())
        .mime_str(&upload.mime)
        .map_err(|e| SdkError::InvalidUpload(format!("bad MIME type {:?}: {}", upload.mime, e)))
}

#[async_trait]
impl RenderBackend for Client {
    async fn render(&self, request: RenderRequest) -> Result<RenderResult, SdkError> {
        Client::render(self, &request).await
    }
}

#[async_trait]
impl GuideBackend for Client {
    async fn agent_parse(&self, request: AgentRequest) -> Result<AgentResponse, SdkError> {
        Client::agent_parse(self, &request).await
    }

    async fn agent_audio(
        &self,
        audio: FileUpload,
        context: PageContext,
    ) -> Result<AgentResponse, SdkError> {
        Client::agent_audio(self, &audio, &context).await
    }
}
