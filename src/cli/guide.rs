//! Interactive guide session on the terminal.

use std::path::PathBuf;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::warn;

use super::terminal::{TerminalMedia, TerminalPage};
use crate::config::Config;
use crate::guide::{ExchangeOutcome, GuideError, GuideState, Speaker, VirtualGuide};
use crate::sdk::{Client, FileUpload};

#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Empty,
    Quit,
    Toggle,
    Audio(PathBuf),
    Say(String),
}

fn parse_command(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    match line.split_once(char::is_whitespace) {
        Some(("/audio", path)) if !path.trim().is_empty() => {
            ReplCommand::Audio(PathBuf::from(shellexpand::tilde(path.trim()).into_owned()))
        }
        _ => match line {
            "/quit" | "/exit" => ReplCommand::Quit,
            "/toggle" => ReplCommand::Toggle,
            _ => ReplCommand::Say(line.to_string()),
        },
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

type TerminalGuide = VirtualGuide<TerminalMedia, TerminalPage>;

/// Print turns appended since `shown`, returning the new count. Typed user
/// lines are already on screen, so they are only echoed for voice messages.
fn print_new_turns(guide: &TerminalGuide, shown: usize, echo_user: bool) -> usize {
    for turn in guide.transcript().since(shown) {
        if turn.speaker == Speaker::User && !echo_user {
            continue;
        }
        println!("{}", turn);
    }
    guide.transcript().len()
}

fn report(result: Result<ExchangeOutcome, GuideError>) {
    match result {
        Ok(_) => {}
        Err(GuideError::Closed) => println!("The guide is closed. Type /toggle to open it."),
        Err(GuideError::BlankUtterance) => {}
        Err(e) => warn!(error = %e, "Guide rejected input"),
    }
}

pub async fn run(client: &Client, config: &Config, page: Option<String>) -> Result<()> {
    let start = page.unwrap_or_else(|| config.guide.start_page.clone());
    let mut guide = VirtualGuide::new(
        client.origin().clone(),
        TerminalMedia::default(),
        TerminalPage::new(start),
    );
    guide.toggle();

    println!("InteractGEN Guide (online) - /toggle, /audio <file>, /quit");
    println!("{}", config.guide.greeting);

    let mut editor = DefaultEditor::new()?;
    let mut shown = 0;

    loop {
        let prompt = match guide.state() {
            GuideState::Closed => "(closed)> ",
            _ => "you> ",
        };
        let line = match editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        match parse_command(&line) {
            ReplCommand::Empty => continue,
            ReplCommand::Quit => break,
            ReplCommand::Toggle => {
                let state = guide.toggle();
                println!("Guide {:?}", state);
                continue;
            }
            ReplCommand::Audio(path) => match FileUpload::from_path(&path).await {
                Ok(clip) => {
                    println!("Thinking...");
                    report(guide.send_recording(client, clip).await);
                    shown = print_new_turns(&guide, shown, true);
                }
                Err(e) => println!("Could not read {}: {}", path.display(), e),
            },
            ReplCommand::Say(text) => {
                let _ = editor.add_history_entry(text.as_str());
                if guide.is_open() {
                    println!("Thinking...");
                }
                report(guide.send_utterance(client, &text).await);
                shown = print_new_turns(&guide, shown, false);
            }
        }

        if let Some(action) = guide.pending_action() {
            let question = format!("{} [y/N] ", action.confirmation_prompt());
            let answer = editor.readline(&question).unwrap_or_default();
            if is_yes(&answer) {
                guide.confirm_pending();
            } else {
                guide.decline_pending();
                println!("Skipped.");
            }
        }
    }

    Ok(())
}
