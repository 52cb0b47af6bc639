//! Handles the guide drives on the host page.
//!
//! The guide never reaches for globals: the video element and the page
//! (current route, navigation, form fields, clickable elements) are passed in.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The host refused to start playback without a user gesture.
    #[error("autoplay blocked: {0}")]
    AutoplayBlocked(String),
    #[error("playback failed: {0}")]
    Failed(String),
}

/// The guide's video element.
pub trait MediaSurface: Send {
    fn pause(&mut self);

    /// Seek back to the start.
    fn rewind(&mut self);

    fn load(&mut self, url: &str);

    /// Make the surface visible (it starts hidden behind the static avatar).
    fn show(&mut self);

    fn play(&mut self) -> Result<(), PlaybackError>;
}

/// The page hosting the guide.
pub trait PageDriver: Send {
    fn current_route(&self) -> String;

    fn navigate(&mut self, route: &str);

    fn fill_form(&mut self, fields: &Map<String, Value>);

    fn click(&mut self, target: &str, target_name: Option<&str>);

    fn ensure_class(&mut self, target: &str, class_name: &str, target_name: Option<&str>);
}

// ── In-memory implementations ────────────────────────────────────

/// Media surface that records its state instead of playing anything.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMedia {
    pub source: Option<String>,
    pub visible: bool,
    pub playing: bool,
    pub position_reset: bool,
    /// When set, `play()` fails with this error.
    pub reject_play: Option<PlaybackError>,
    pub play_attempts: usize,
}

impl InMemoryMedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface whose `play()` is always refused by autoplay policy.
    pub fn autoplay_blocked() -> Self {
        Self {
            reject_play: Some(PlaybackError::AutoplayBlocked(
                "user gesture required".to_string(),
            )),
            ..Self::default()
        }
    }

    /// Pretend a clip is already playing.
    pub fn playing(url: &str) -> Self {
        Self {
            source: Some(url.to_string()),
            visible: true,
            playing: true,
            ..Self::default()
        }
    }
}

impl MediaSurface for InMemoryMedia {
    fn pause(&mut self) {
        self.playing = false;
    }

    fn rewind(&mut self) {
        self.position_reset = true;
    }

    fn load(&mut self, url: &str) {
        self.source = Some(url.to_string());
        self.playing = false;
        self.position_reset = false;
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        self.play_attempts += 1;
        if let Some(err) = &self.reject_play {
            return Err(err.clone());
        }
        self.playing = true;
        self.position_reset = false;
        Ok(())
    }
}

/// One effect applied to an [`InMemoryPage`].
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    Navigated(String),
    Filled(Map<String, Value>),
    Clicked(String),
    ClassEnsured { target: String, class_name: String },
}

/// Page that records every effect in order.
#[derive(Debug, Clone)]
pub struct InMemoryPage {
    route: String,
    pub form: Map<String, Value>,
    pub events: Vec<PageEvent>,
}

impl InMemoryPage {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            form: Map::new(),
            events: Vec::new(),
        }
    }
}

impl PageDriver for InMemoryPage {
    fn current_route(&self) -> String {
        self.route.clone()
    }

    fn navigate(&mut self, route: &str) {
        self.route = route.to_string();
        self.events.push(PageEvent::Navigated(route.to_string()));
    }

    fn fill_form(&mut self, fields: &Map<String, Value>) {
        for (name, value) in fields {
            self.form.insert(name.clone(), value.clone());
        }
        self.events.push(PageEvent::Filled(fields.clone()));
    }

    fn click(&mut self, target: &str, _target_name: Option<&str>) {
        self.events.push(PageEvent::Clicked(target.to_string()));
    }

    fn ensure_class(&mut self, target: &str, class_name: &str, _target_name: Option<&str>) {
        self.events.push(PageEvent::ClassEnsured {
            target: target.to_string(),
            class_name: class_name.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn load_resets_playback_state() {
        let mut media = InMemoryMedia::playing("a.mp4");
        media.load("b.mp4");
        assert_eq!(media.source.as_deref(), Some("b.mp4"));
        assert!(!media.playing);
    }

    #[test]
    fn blocked_autoplay_counts_attempt() {
        let mut media = InMemoryMedia::autoplay_blocked();
        assert!(matches!(
            media.play(),
            Err(PlaybackError::AutoplayBlocked(_))
        ));
        assert_eq!(media.play_attempts, 1);
        assert!(!media.playing);
    }

    #[test]
    fn page_navigation_updates_route() {
        let mut page = InMemoryPage::new("/");
        page.navigate("/users/");
        assert_eq!(page.current_route(), "/users/");
        assert_eq!(page.events, [PageEvent::Navigated("/users/".to_string())]);
    }

    #[test]
    fn page_fill_merges_fields() {
        let mut page = InMemoryPage::new("/");
        let fields = json!({ "username": "bob" });
        page.fill_form(fields.as_object().unwrap());
        assert_eq!(page.form["username"], "bob");
    }
}
