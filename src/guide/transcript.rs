//! Ordered log of guide turns.
//!
//! Turns are append-only: speaker and text never change. A user turn is
//! appended as [`TurnStatus::Pending`] before its request is sent and is
//! resolved to `Delivered` or `Failed` once the reply arrives.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Agent,
    Error,
}

impl Speaker {
    pub fn label(self) -> &'static str {
        match self {
            Speaker::User => "User",
            Speaker::Agent => "Agent",
            Speaker::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    Pending,
    Delivered,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    pub status: TurnStatus,
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.speaker.label(), self.text)
    }
}

/// Index of a turn in its transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnId(usize);

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn that is still waiting for its reply.
    pub fn push_pending(&mut self, text: impl Into<String>) -> TurnId {
        self.turns.push(Turn {
            speaker: Speaker::User,
            text: text.into(),
            status: TurnStatus::Pending,
        });
        TurnId(self.turns.len() - 1)
    }

    /// Append a settled turn.
    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) -> TurnId {
        self.turns.push(Turn {
            speaker,
            text: text.into(),
            status: TurnStatus::Delivered,
        });
        TurnId(self.turns.len() - 1)
    }

    /// Settle a pending turn. Already settled turns are left alone.
    pub fn resolve(&mut self, id: TurnId, status: TurnStatus) {
        if let Some(turn) = self.turns.get_mut(id.0) {
            if turn.status == TurnStatus::Pending {
                turn.status = status;
            }
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn get(&self, id: TurnId) -> Option<&Turn> {
        self.turns.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Turns appended at or after `from`, for incremental rendering.
    pub fn since(&self, from: usize) -> &[Turn] {
        &self.turns[from.min(self.turns.len())..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_then_resolved() {
        let mut transcript = Transcript::new();
        let id = transcript.push_pending("Log in");
        assert_eq!(transcript.get(id).unwrap().status, TurnStatus::Pending);

        transcript.resolve(id, TurnStatus::Delivered);
        assert_eq!(transcript.get(id).unwrap().status, TurnStatus::Delivered);
    }

    #[test]
    fn resolve_does_not_reopen_settled_turns() {
        let mut transcript = Transcript::new();
        let id = transcript.push_pending("hi");
        transcript.resolve(id, TurnStatus::Failed);
        transcript.resolve(id, TurnStatus::Delivered);
        assert_eq!(transcript.get(id).unwrap().status, TurnStatus::Failed);
    }

    #[test]
    fn display_uses_speaker_label() {
        let mut transcript = Transcript::new();
        transcript.push(Speaker::Agent, "Going Home.");
        transcript.push(Speaker::Error, "Could not reach agent.");
        let lines: Vec<String> = transcript.turns().iter().map(Turn::to_string).collect();
        assert_eq!(lines, ["Agent: Going Home.", "Error: Could not reach agent."]);
    }

    #[test]
    fn since_clamps_out_of_range() {
        let mut transcript = Transcript::new();
        transcript.push(Speaker::User, "a");
        transcript.push(Speaker::Agent, "b");
        assert_eq!(transcript.since(1).len(), 1);
        assert!(transcript.since(10).is_empty());
    }
}
