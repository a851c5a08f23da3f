//! Interactive chat session on stdin/stdout.
//!
//! Plain lines are sent to the assistant. Lines starting with `/` are
//! commands:
//!
//! | Command | Effect |
//! |---------|--------|
//! | `/1` `/2` `/3` | Send the numbered suggestion |
//! | `/end [mood]` | Summarize and save the conversation |
//! | `/save` | Save the raw conversation after a failed summary |
//! | `/cancel` | Keep chatting after a failed summary |
//! | `/mode <default\|gratitude\|reflection>` | Change the greeting prompt |
//! | `/moods` | List the suggested moods |
//! | `/quit` | Leave without saving |

use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use solace_core::models::MOODS;
use solace_core::session::{EndOutcome, SendOutcome, SessionEngine, SessionState};
use solace_core::settings::Mode;

use crate::app::AppContext;
use crate::presenter::TerminalPresenter;

/// A parsed line of chat input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Message(String),
    Suggestion(usize),
    End(Option<String>),
    Save,
    Cancel,
    Mode(String),
    Moods,
    Help,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return Input::Message(line.to_string());
    };
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim().to_string()).filter(|a| !a.is_empty())),
        None => (command, None),
    };
    match name {
        "end" => Input::End(arg),
        "save" => Input::Save,
        "cancel" => Input::Cancel,
        "mode" => Input::Mode(arg.unwrap_or_default()),
        "moods" => Input::Moods,
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        n => match n.parse::<usize>() {
            Ok(i) if i >= 1 => Input::Suggestion(i),
            _ => Input::Unknown(n.to_string()),
        },
    }
}

pub async fn run_chat(ctx: &AppContext) -> Result<()> {
    let engine = ctx.session(Arc::new(TerminalPresenter::new()));
    engine.start();

    let mut suggestions: Vec<String> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let text = match parse_input(&line) {
            Input::Message(text) => text,
            Input::Suggestion(i) => match suggestions.get(i - 1) {
                Some(s) => {
                    println!("Me: {}", s);
                    s.clone()
                }
                None => {
                    eprintln!("No suggestion #{}.", i);
                    continue;
                }
            },
            Input::End(mood) => {
                end(&engine, mood).await;
                suggestions.clear();
                continue;
            }
            Input::Save => {
                if let Err(e) = engine.confirm_fallback().await {
                    eprintln!("Error: {}", e);
                }
                continue;
            }
            Input::Cancel => {
                match engine.cancel_fallback() {
                    Ok(()) => println!("Okay, let's keep talking."),
                    Err(e) => eprintln!("Error: {}", e),
                }
                continue;
            }
            Input::Mode(name) => {
                match name.parse::<Mode>() {
                    Ok(mode) => {
                        if let Err(e) = engine.set_mode(mode) {
                            eprintln!("Error: {}", e);
                        }
                    }
                    Err(e) => eprintln!("{}", e),
                }
                continue;
            }
            Input::Moods => {
                println!("{}", MOODS.join(", "));
                continue;
            }
            Input::Help => {
                print_help();
                continue;
            }
            Input::Quit => break,
            Input::Unknown(name) => {
                eprintln!("Unknown command /{}. Type /help for commands.", name);
                continue;
            }
        };

        match engine.send_message(&text).await {
            Ok(SendOutcome::Replied(reply)) => suggestions = reply.suggestions,
            Ok(SendOutcome::Failed(_)) => suggestions.clear(),
            Ok(SendOutcome::Ignored) => {}
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    if matches!(
        engine.state(),
        SessionState::Active | SessionState::AwaitingFallback
    ) {
        eprintln!("Conversation ended without saving.");
    }
    debug!("chat closed");
    Ok(())
}

async fn end(engine: &SessionEngine, mood: Option<String>) {
    match engine.end_conversation(mood).await {
        Ok(EndOutcome::NothingToSave) => println!("Nothing to save yet."),
        Ok(EndOutcome::AwaitingConfirmation { .. }) => {
            println!("Type /save to keep the raw conversation or /cancel to keep talking.")
        }
        Ok(EndOutcome::Saved { .. }) | Ok(EndOutcome::SavedRaw { .. }) => {}
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn print_help() {
    println!("/1 /2 /3            send a suggestion");
    println!("/end [mood]         save the conversation to your journal");
    println!("/save               save the raw conversation after a failed summary");
    println!("/cancel             keep talking after a failed summary");
    println!("/mode <name>        default, gratitude, or reflection");
    println!("/moods              list suggested moods");
    println!("/quit               leave without saving");
}
