//! Request and response bodies of the `/v1` API.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::SdkError;

/// A file sent as one multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, SdkError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| SdkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| SdkError::InvalidUpload(format!("no file name in {}", path.display())))?;
        let mime = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self::new(file_name, mime, bytes))
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Full pipeline input: portrait + text → lip-synced video.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub image: FileUpload,
    pub text: String,
    pub consent_confirmed: bool,
    pub voice_profile_id: Option<String>,
}

/// Portrait + pre-recorded audio → lip-synced video.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimateRequest {
    pub image: FileUpload,
    pub audio: FileUpload,
    pub consent_confirmed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderResult {
    /// Usually a path under the backend origin, e.g. `/static/sessions/<id>/final_video.mp4`.
    pub video_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Options merged into the `/tts` body next to `text`.
///
/// Known keys are typed; anything else goes through `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TtsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_profile_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TtsOptions {
    /// Build the request body. `text` and any typed field that is set win
    /// over a key of the same name in `extra`.
    pub fn to_body(&self, text: &str) -> Result<Value, SdkError> {
        let typed = TtsOptions {
            extra: Map::new(),
            ..self.clone()
        };
        let mut body = self.extra.clone();
        if let Value::Object(fields) = serde_json::to_value(&typed).map_err(SdkError::Encode)? {
            body.extend(fields);
        }
        body.insert("text".to_string(), Value::String(text.to_string()));
        Ok(Value::Object(body))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Timestamped visemes, shape defined by the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visemes: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloneVoiceResponse {
    pub voice_profile_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn tts_body_merges_options() {
        let options = TtsOptions {
            voice_profile_id: Some("vp_1".to_string()),
            speed: Some(1.25),
            ..Default::default()
        };
        assert_eq!(
            options.to_body("hello").unwrap(),
            json!({ "text": "hello", "voice_profile_id": "vp_1", "speed": 1.25 })
        );
    }

    #[test]
    fn tts_body_passes_extra_keys_but_keeps_text() {
        let mut extra = Map::new();
        extra.insert("sample_rate".to_string(), json!(24000));
        extra.insert("text".to_string(), json!("overridden"));
        let options = TtsOptions {
            extra,
            ..Default::default()
        };
        let body = options.to_body("hello").unwrap();
        assert_eq!(body["text"], "hello");
        assert_eq!(body["sample_rate"], 24000);
    }

    #[test]
    fn tts_body_typed_fields_win_over_extra() {
        let mut extra = Map::new();
        extra.insert("speed".to_string(), json!(3.0));
        extra.insert("emotion".to_string(), json!("angry"));
        let options = TtsOptions {
            speed: Some(1.1),
            extra,
            ..Default::default()
        };
        let body = options.to_body("hello").unwrap();
        assert_eq!(body["speed"], 1.1);
        // unset typed fields leave the extra value alone
        assert_eq!(body["emotion"], "angry");
    }

    #[test]
    fn tts_response_keeps_unknown_keys() {
        let response: TtsResponse = serde_json::from_value(json!({
            "status": "success",
            "audio_url": "/static/outputs/a.wav",
            "duration": 5.0,
            "visemes": [{"time": 0.1, "value": "A"}],
            "engine": "edge"
        }))
        .unwrap();
        assert_eq!(response.audio_url.as_deref(), Some("/static/outputs/a.wav"));
        assert_eq!(response.visemes.as_ref().map(Vec::len), Some(1));
        assert_eq!(response.extra["engine"], "edge");
    }

    #[test]
    fn render_result_minimal() {
        let result: RenderResult =
            serde_json::from_value(json!({ "video_url": "/static/x.mp4" })).unwrap();
        assert_eq!(result.video_url, "/static/x.mp4");
        assert!(result.metadata.is_none());
    }

    #[tokio::test]
    async fn upload_from_path_guesses_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portrait.png");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"\x89PNG fake").unwrap();

        let upload = FileUpload::from_path(&path).await.unwrap();
        assert_eq!(upload.file_name, "portrait.png");
        assert_eq!(upload.mime, "image/png");
        assert!(!upload.is_empty());
    }

    #[tokio::test]
    async fn upload_from_missing_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileUpload::from_path(&dir.path().join("missing.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Io { .. }));
    }
}
