//! Terminal stand-ins for the guide's video element and host page.

use serde_json::{Map, Value};

use crate::guide::{MediaSurface, PageDriver, PlaybackError};

/// Prints what the video element would do.
#[derive(Debug, Default)]
pub struct TerminalMedia {
    source: Option<String>,
}

impl TerminalMedia {
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

impl MediaSurface for TerminalMedia {
    fn pause(&mut self) {
        if self.source.is_some() {
            println!("  ■ playback stopped");
        }
    }

    fn rewind(&mut self) {}

    fn load(&mut self, url: &str) {
        self.source = Some(url.to_string());
    }

    fn show(&mut self) {}

    fn play(&mut self) -> Result<(), PlaybackError> {
        match &self.source {
            Some(url) => {
                println!("  ▶ {}", url);
                Ok(())
            }
            None => Err(PlaybackError::Failed("no source loaded".to_string())),
        }
    }
}

/// Tracks the current route and prints every page effect.
#[derive(Debug)]
pub struct TerminalPage {
    route: String,
}

impl TerminalPage {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
        }
    }
}

impl PageDriver for TerminalPage {
    fn current_route(&self) -> String {
        self.route.clone()
    }

    fn navigate(&mut self, route: &str) {
        self.route = route.to_string();
        println!("  → navigated to {}", route);
    }

    fn fill_form(&mut self, fields: &Map<String, Value>) {
        if fields.is_empty() {
            return;
        }
        let rendered: Vec<String> = fields
            .iter()
            .map(|(name, value)| match value {
                Value::String(s) => format!("{}={}", name, s),
                other => format!("{}={}", name, other),
            })
            .collect();
        println!("  ✎ form filled: {}", rendered.join(", "));
    }

    fn click(&mut self, target: &str, target_name: Option<&str>) {
        println!("  ⌖ clicked {}", target_name.unwrap_or(target));
    }

    fn ensure_class(&mut self, target: &str, class_name: &str, target_name: Option<&str>) {
        println!(
            "  ◎ {} shown ({} +{})",
            target_name.unwrap_or(target),
            target,
            class_name
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_tracks_route() {
        let mut page = TerminalPage::new("/");
        page.navigate("/users/?agent_click=manage-student-link");
        assert_eq!(page.current_route(), "/users/?agent_click=manage-student-link");
    }

    #[test]
    fn play_without_source_fails() {
        let mut media = TerminalMedia::default();
        assert!(media.play().is_err());
        media.load("http://localhost:8000/static/v.mp4");
        assert!(media.play().is_ok());
        assert_eq!(media.source(), Some("http://localhost:8000/static/v.mp4"));
    }
}
