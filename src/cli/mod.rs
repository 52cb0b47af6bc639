//! Command-line front end.

pub mod guide;
pub mod terminal;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, LogFormat};
use crate::render::{RenderForm, SubmitError};
use crate::sdk::{AnimateRequest, Client, FileUpload, TtsOptions};
use crate::utils::resolve_media_url;

#[derive(Debug, Parser)]
#[command(name = "interactgen", version, about = "Talking-head video and virtual guide client")]
pub struct Cli {
    /// Config file (default: <config dir>/interactgen/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Backend origin, overrides `backend.origin`
    #[arg(long, global = true, env = "INTERACTGEN_ORIGIN")]
    pub origin: Option<String>,

    /// Log filter, overrides `logging.level` (RUST_LOG wins over both)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render a talking-head video from a portrait and text
    Render {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        text: String,
        /// Confirm you have the rights to use this image and content
        #[arg(long)]
        consent: bool,
        #[arg(long)]
        voice_profile: Option<String>,
    },

    /// Synthesize speech
    Tts {
        text: String,
        #[arg(long)]
        voice_profile: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        speed: Option<f64>,
        #[arg(long)]
        pitch: Option<f64>,
        #[arg(long)]
        emotion: Option<String>,
    },

    /// Create a voice profile from an audio sample
    CloneVoice { sample: PathBuf },

    /// Lip-sync a portrait to recorded audio
    Animate {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        audio: PathBuf,
        #[arg(long)]
        consent: bool,
    },

    /// Check that the backend is up
    Health,

    /// Chat with the virtual guide
    Guide {
        /// Route reported as the current page
        #[arg(long)]
        page: Option<String>,
    },
}

impl Cli {
    /// Load the config file and apply command-line overrides.
    pub fn load_config(&self) -> Result<Config> {
        let path = self
            .config
            .as_deref()
            .map(|p| PathBuf::from(shellexpand::tilde(p).into_owned()));
        let mut config = Config::load(path.as_deref())?;
        if let Some(origin) = &self.origin {
            config.backend.origin = origin.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        Ok(config)
    }
}

pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let client = Client::from_config(&config)?;

    match cli.command {
        Commands::Render {
            image,
            text,
            consent,
            voice_profile,
        } => {
            let mut form = RenderForm::new(client.origin().clone());
            form.select_image(
                FileUpload::from_path(&image)
                    .await
                    .with_context(|| format!("failed to load image {}", image.display()))?,
            );
            form.set_text(text);
            form.set_consent(consent);
            form.set_voice_profile(voice_profile);

            if form.can_submit() {
                eprintln!("Synthesizing voice & lip-syncing...");
            }
            match form.submit(&client).await {
                Ok(url) => println!("{}", url),
                Err(SubmitError::Invalid(invalid)) => bail!("{}", invalid),
                Err(SubmitError::Failed(_)) => {
                    bail!("{}", form.error().unwrap_or("render failed"))
                }
            }
        }

        Commands::Tts {
            text,
            voice_profile,
            language,
            speed,
            pitch,
            emotion,
        } => {
            let options = TtsOptions {
                voice_profile_id: voice_profile,
                language,
                speed,
                pitch,
                emotion,
                ..Default::default()
            };
            let response = client.tts(&text, &options).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Commands::CloneVoice { sample } => {
            let upload = FileUpload::from_path(&sample).await?;
            let response = client.clone_voice(&upload).await?;
            println!("{}", response.voice_profile_id);
        }

        Commands::Animate {
            image,
            audio,
            consent,
        } => {
            let request = AnimateRequest {
                image: FileUpload::from_path(&image).await?,
                audio: FileUpload::from_path(&audio).await?,
                consent_confirmed: consent,
            };
            let result = client.animate(&request).await?;
            println!("{}", resolve_media_url(client.origin(), &result.video_url));
        }

        Commands::Health => {
            let health = client.health().await?;
            match health.version {
                Some(version) => println!("{} (v{})", health.status, version),
                None => println!("{}", health.status),
            }
        }

        Commands::Guide { page } => guide::run(&client, &config, page).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_render_command() {
        let cli = Cli::parse_from([
            "interactgen",
            "render",
            "--image",
            "face.png",
            "--text",
            "Hello",
            "--consent",
        ]);
        match cli.command {
            Commands::Render {
                image,
                text,
                consent,
                voice_profile,
            } => {
                assert_eq!(image, PathBuf::from("face.png"));
                assert_eq!(text, "Hello");
                assert!(consent);
                assert!(voice_profile.is_none());
            }
            other => panic!("expected Render, got {:?}", other),
        }
    }

    #[test]
    fn consent_defaults_to_false() {
        let cli = Cli::parse_from(["interactgen", "render", "--image", "a.png", "--text", "x"]);
        assert!(matches!(cli.command, Commands::Render { consent: false, .. }));
    }

    #[test]
    fn global_flags_override_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[backend]\norigin = \"http://from-file:8000\"").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::parse_from([
            "interactgen",
            "--config",
            path.as_str(),
            "--origin",
            "http://override:9000",
            "--log-level",
            "debug",
            "health",
        ]);
        let config = cli.load_config().unwrap();
        assert_eq!(config.backend.origin, "http://override:9000");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn tts_options_flags() {
        let cli = Cli::parse_from([
            "interactgen",
            "tts",
            "Hello",
            "--speed",
            "1.2",
            "--emotion",
            "happy",
        ]);
        match cli.command {
            Commands::Tts {
                text, speed, emotion, ..
            } => {
                assert_eq!(text, "Hello");
                assert_eq!(speed, Some(1.2));
                assert_eq!(emotion.as_deref(), Some("happy"));
            }
            other => panic!("expected Tts, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn render_without_consent_fails_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("face.png");
        std::fs::write(&image, b"png").unwrap();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/render")
            .expect(0)
            .create_async()
            .await;

        let origin = server.url();
        let cli = Cli::parse_from([
            "interactgen",
            "--origin",
            origin.as_str(),
            "render",
            "--image",
            image.to_str().unwrap(),
            "--text",
            "Hello",
        ]);
        let config = cli.load_config().unwrap();
        let err = run(cli, config).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "You must confirm consent to animate this face."
        );
        mock.assert_async().await;
    }
}
