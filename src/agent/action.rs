//! Server-directed UI actions.
//!
//! On the wire an action is a flat object keyed by `action_type`, with the
//! arguments spread over `payload`, `target`, `class_name` and `actions`
//! depending on the type. It is decoded once into the closed [`ActionKind`]
//! so dispatch is an exhaustive `match`.

use serde::Deserialize;
use serde_json::{Map, Value};

/// An instruction for the client UI, optionally gated behind confirmation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "WireAction")]
pub struct Action {
    pub confirmation_required: bool,
    pub confirm_message: Option<String>,
    pub kind: ActionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    /// Apply a mapping of field name → value to the visible form.
    FillForm { fields: Map<String, Value> },
    /// Move the current view to another route.
    Navigate { route: String },
    /// Click the element matched by `target`.
    Click {
        target: String,
        target_name: Option<String>,
    },
    /// Make sure `target` carries `class_name` (e.g. a modal is shown).
    EnsureOpen {
        target: String,
        class_name: String,
        target_name: Option<String>,
    },
    /// Run the contained actions in order.
    Chain { actions: Vec<Action> },
    /// A known type missing a required argument.
    Malformed { action_type: String, reason: String },
    /// A type this client does not implement.
    Unknown { action_type: String },
}

impl ActionKind {
    /// The wire tag this variant was decoded from.
    pub fn action_type(&self) -> &str {
        match self {
            ActionKind::FillForm { .. } => "fill_form",
            ActionKind::Navigate { .. } => "navigate",
            ActionKind::Click { .. } => "click",
            ActionKind::EnsureOpen { .. } => "ensure_open",
            ActionKind::Chain { .. } => "chain",
            ActionKind::Malformed { action_type, .. } | ActionKind::Unknown { action_type } => {
                action_type
            }
        }
    }
}

impl Action {
    /// An action that runs without confirmation.
    pub fn immediate(kind: ActionKind) -> Self {
        Self {
            confirmation_required: false,
            confirm_message: None,
            kind,
        }
    }

    /// Prompt shown before a gated action runs.
    pub fn confirmation_prompt(&self) -> String {
        match &self.confirm_message {
            Some(message) => message.clone(),
            None => format!(
                "Virtual Guide wants to {}. Allow?",
                self.kind.action_type()
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireAction {
    #[serde(default)]
    action_type: String,
    #[serde(default)]
    confirmation_required: Option<bool>,
    #[serde(default)]
    confirm_message: Option<String>,
    #[serde(default)]
    payload: Option<Value>,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    target_name: Option<String>,
    #[serde(default)]
    class_name: Option<String>,
    #[serde(default)]
    actions: Vec<WireAction>,
}

impl From<WireAction> for Action {
    fn from(wire: WireAction) -> Self {
        let malformed = |reason: &str| ActionKind::Malformed {
            action_type: wire.action_type.clone(),
            reason: reason.to_string(),
        };

        let kind = match wire.action_type.as_str() {
            "fill_form" => match &wire.payload {
                Some(Value::Object(fields)) => ActionKind::FillForm {
                    fields: fields.clone(),
                },
                None | Some(Value::Null) => ActionKind::FillForm { fields: Map::new() },
                Some(_) => malformed("payload is not an object"),
            },
            "navigate" => match wire
                .payload
                .as_ref()
                .and_then(|p| p.get("route"))
                .and_then(Value::as_str)
            {
                Some(route) => ActionKind::Navigate {
                    route: route.to_string(),
                },
                None => malformed("payload.route is missing"),
            },
            "click" => match &wire.target {
                Some(target) => ActionKind::Click {
                    target: target.clone(),
                    target_name: wire.target_name.clone(),
                },
                None => malformed("target is missing"),
            },
            "ensure_open" => match (&wire.target, &wire.class_name) {
                (Some(target), Some(class_name)) => ActionKind::EnsureOpen {
                    target: target.clone(),
                    class_name: class_name.clone(),
                    target_name: wire.target_name.clone(),
                },
                _ => malformed("target or class_name is missing"),
            },
            "chain" => ActionKind::Chain {
                actions: wire.actions.into_iter().map(Action::from).collect(),
            },
            _ => ActionKind::Unknown {
                action_type: wire.action_type.clone(),
            },
        };

        Action {
            confirmation_required: wire.confirmation_required.unwrap_or(false),
            confirm_message: wire.confirm_message,
            kind,
        }
    }
}
