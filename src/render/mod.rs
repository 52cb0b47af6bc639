//! Render form: portrait + text + consent → talking-head video.
//!
//! Holds the form's local state and issues one multipart request per submit.
//! Front ends that show a loading indicator use [`RenderForm::begin_submit`]
//! and [`RenderForm::finish_submit`] around their own call; everything else
//! uses [`RenderForm::submit`].

use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::sdk::{FileUpload, RenderBackend, RenderRequest, RenderResult, SdkError};
use crate::utils::resolve_media_url;

/// Shown for any transport or non-2xx failure.
pub const RENDER_FAILED_MESSAGE: &str = "Failed to generate video. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenderValidation {
    #[error("Please provide both an image and text.")]
    MissingInput,
    #[error("You must confirm consent to animate this face.")]
    MissingConsent,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] RenderValidation),
    #[error("render failed: {0}")]
    Failed(#[source] SdkError),
}

#[derive(Debug, Clone)]
pub struct RenderForm {
    origin: Url,
    image: Option<FileUpload>,
    text: String,
    consent: bool,
    voice_profile_id: Option<String>,
    loading: bool,
    video_url: Option<String>,
    error: Option<String>,
}

impl RenderForm {
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            image: None,
            text: String::new(),
            consent: false,
            voice_profile_id: None,
            loading: false,
            video_url: None,
            error: None,
        }
    }

    pub fn select_image(&mut self, image: FileUpload) {
        self.image = Some(image);
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_consent(&mut self, consent: bool) {
        self.consent = consent;
    }

    pub fn set_voice_profile(&mut self, voice_profile_id: Option<String>) {
        self.voice_profile_id = voice_profile_id;
    }

    pub fn image(&self) -> Option<&FileUpload> {
        self.image.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn consent(&self) -> bool {
        self.consent
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.loading && self.validate().is_ok()
    }

    fn validate(&self) -> Result<(), RenderValidation> {
        let has_image = self.image.as_ref().is_some_and(|i| !i.is_empty());
        if !has_image || self.text.trim().is_empty() {
            return Err(RenderValidation::MissingInput);
        }
        if !self.consent {
            return Err(RenderValidation::MissingConsent);
        }
        Ok(())
    }

    /// Validate and enter the loading state, returning the request to send.
    ///
    /// On a validation failure the message is shown and nothing else changes.
    pub fn begin_submit(&mut self) -> Result<RenderRequest, RenderValidation> {
        if let Err(invalid) = self.validate() {
            self.error = Some(invalid.to_string());
            return Err(invalid);
        }
        let Some(image) = self.image.clone() else {
            // validate() guarantees an image
            return Err(RenderValidation::MissingInput);
        };

        self.loading = true;
        self.error = None;
        self.video_url = None;

        Ok(RenderRequest {
            image,
            text: self.text.clone(),
            consent_confirmed: true,
            voice_profile_id: self.voice_profile_id.clone(),
        })
    }

    /// Apply the outcome of the request started by [`Self::begin_submit`].
    pub fn finish_submit(
        &mut self,
        result: Result<RenderResult, SdkError>,
    ) -> Result<String, SubmitError> {
        self.loading = false;
        match result {
            Ok(rendered) => {
                let url = resolve_media_url(&self.origin, &rendered.video_url);
                info!(video_url = %url, "render complete");
                self.video_url = Some(url.clone());
                Ok(url)
            }
            Err(e) => {
                error!(error = %e, "render failed");
                self.error = Some(RENDER_FAILED_MESSAGE.to_string());
                Err(SubmitError::Failed(e))
            }
        }
    }

    /// Validate, upload, and expose the playable video URL.
    pub async fn submit(&mut self, backend: &dyn RenderBackend) -> Result<String, SubmitError> {
        let request = self.begin_submit()?;
        let result = backend.render(request).await;
        self.finish_submit(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::MockRenderBackend;
    use reqwest::StatusCode;

    fn origin() -> Url {
        Url::parse("http://localhost:8000").unwrap()
    }

    fn portrait() -> FileUpload {
        FileUpload::new("face.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF])
    }

    fn filled_form() -> RenderForm {
        let mut form = RenderForm::new(origin());
        form.select_image(portrait());
        form.set_text("Hello, I am an AI generated avatar.");
        form.set_consent(true);
        form
    }

    fn never_called() -> MockRenderBackend {
        let mut backend = MockRenderBackend::new();
        backend.expect_render().never();
        backend
    }

    #[tokio::test]
    async fn missing_image_blocks_submit() {
        let mut form = filled_form();
        form.clear_image();
        let backend = never_called();

        let err = form.submit(&backend).await.unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Invalid(RenderValidation::MissingInput)
        ));
        assert_eq!(form.error(), Some("Please provide both an image and text."));
        assert!(!form.is_loading());
    }

    #[tokio::test]
    async fn missing_text_blocks_submit() {
        let mut form = filled_form();
        form.set_text("   ");
        let backend = never_called();

        assert!(form.submit(&backend).await.is_err());
        assert_eq!(form.error(), Some("Please provide both an image and text."));
    }

    #[tokio::test]
    async fn empty_image_counts_as_missing() {
        let mut form = filled_form();
        form.select_image(FileUpload::new("empty.png", "image/png", Vec::new()));
        let backend = never_called();

        assert!(form.submit(&backend).await.is_err());
        assert_eq!(form.error(), Some("Please provide both an image and text."));
    }

    #[tokio::test]
    async fn unchecked_consent_blocks_submit() {
        let mut form = filled_form();
        form.set_consent(false);
        let backend = never_called();

        let err = form.submit(&backend).await.unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Invalid(RenderValidation::MissingConsent)
        ));
        assert_eq!(
            form.error(),
            Some("You must confirm consent to animate this face.")
        );
    }

    #[tokio::test]
    async fn success_resolves_video_against_origin() {
        let mut form = filled_form();
        form.set_voice_profile(Some("vp_7".to_string()));
        let mut backend = MockRenderBackend::new();
        backend
            .expect_render()
            .times(1)
            .withf(|req| {
                req.consent_confirmed
                    && req.image.file_name == "face.jpg"
                    && req.voice_profile_id.as_deref() == Some("vp_7")
            })
            .returning(|_| {
                Ok(RenderResult {
                    video_url: "/static/x.mp4".to_string(),
                    status: Some("success".to_string()),
                    message: None,
                    metadata: None,
                })
            });

        let url = form.submit(&backend).await.unwrap();
        assert_eq!(url, "http://localhost:8000/static/x.mp4");
        assert_eq!(form.video_url(), Some("http://localhost:8000/static/x.mp4"));
        assert!(form.error().is_none());
        assert!(!form.is_loading());
    }

    #[tokio::test]
    async fn video_stays_under_origin_path_prefix() {
        let mut form = RenderForm::new(Url::parse("http://host:8000/app").unwrap());
        form.select_image(portrait());
        form.set_text("Hello");
        form.set_consent(true);
        let mut backend = MockRenderBackend::new();
        backend.expect_render().times(1).returning(|_| {
            Ok(RenderResult {
                video_url: "/static/x.mp4".to_string(),
                status: None,
                message: None,
                metadata: None,
            })
        });

        let url = form.submit(&backend).await.unwrap();
        assert_eq!(url, "http://host:8000/app/static/x.mp4");
    }

    #[tokio::test]
    async fn failure_shows_generic_message_and_clears_loading() {
        let mut form = filled_form();
        let mut backend = MockRenderBackend::new();
        backend.expect_render().times(1).returning(|_| {
            Err(SdkError::Status {
                endpoint: "http://localhost:8000/v1/render".to_string(),
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "boom".to_string(),
            })
        });

        let err = form.submit(&backend).await.unwrap_err();
        assert!(matches!(err, SubmitError::Failed(_)));
        assert_eq!(form.error(), Some(RENDER_FAILED_MESSAGE));
        assert!(!form.is_loading());
        assert!(form.video_url().is_none());
    }

    #[test]
    fn begin_submit_enters_loading_and_clears_previous_result() {
        let mut form = filled_form();
        form.finish_submit(Ok(RenderResult {
            video_url: "/static/old.mp4".to_string(),
            status: None,
            message: None,
            metadata: None,
        }))
        .unwrap();
        assert!(form.video_url().is_some());

        let request = form.begin_submit().unwrap();
        assert!(form.is_loading());
        assert!(!form.can_submit());
        assert!(form.video_url().is_none());
        assert_eq!(request.text, "Hello, I am an AI generated avatar.");
    }

    #[test]
    fn can_submit_tracks_preconditions() {
        let mut form = RenderForm::new(origin());
        assert!(!form.can_submit());
        form.select_image(portrait());
        form.set_text("Hi");
        assert!(!form.can_submit());
        form.set_consent(true);
        assert!(form.can_submit());
    }

    #[test]
    fn retry_after_failure_clears_error() {
        let mut form = filled_form();
        let _ = form.finish_submit(Err(SdkError::InvalidUpload("x".to_string())));
        assert_eq!(form.error(), Some(RENDER_FAILED_MESSAGE));

        form.begin_submit().unwrap();
        assert!(form.error().is_none());
    }
}
