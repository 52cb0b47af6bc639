//! InteractGEN - client for the talking-head video service
//!
//! This crate provides:
//! - A typed SDK over the render / tts / voice-cloning / agent endpoints
//! - A headless render form (portrait + text + consent → video URL)
//! - The virtual guide conversational widget and its action dispatch
//! - A terminal front end composing both

pub mod agent;
pub mod cli;
pub mod config;
pub mod guide;
pub mod render;
pub mod sdk;
pub mod utils;

pub use config::Config;
pub use sdk::Client;
