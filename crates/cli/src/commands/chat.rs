//! `parley chat`: the terminal transport.
//!
//! Every line read from stdin is one inbound message from the local user.
//! Replies go to stdout; silence prints nothing; failures print the
//! generic apology.

use parley_agent::Assistant;
use parley_core::model::StreamCallbacks;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::info;

/// A line the transport handles itself instead of sending it on.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Skip,
    Exit,
    Reset,
    Message(String),
}

fn classify(line: &str) -> Input {
    let line = line.trim();
    match line {
        "" => Input::Skip,
        "exit" | "quit" | "/exit" | "/quit" | ":q" => Input::Exit,
        "/reset" => Input::Reset,
        _ => Input::Message(line.to_string()),
    }
}

fn hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".into())
}

/// The location descriptor for a terminal session.
fn terminal_location(host: &str, cwd: &str) -> String {
    format!("Terminal(host='{host}', cwd='{cwd}')")
}

fn default_author() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "user".into())
}

/// Progress dots on stderr while the model streams its step.
fn progress_callbacks() -> StreamCallbacks {
    StreamCallbacks::new(
        || {
            eprint!("\r  thinking");
            let _ = std::io::stderr().flush();
        },
        |_| {
            eprint!(".");
            let _ = std::io::stderr().flush();
        },
    )
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

pub async fn run(config: Option<PathBuf>, author: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let builder = super::agent_builder(config).with_stream(progress_callbacks());
    let assistant = Assistant::from_builder(builder).map_err(|e| format!("Failed to load config: {e}"))?;

    let author = author.unwrap_or_else(default_author);
    let cwd = std::env::current_dir().unwrap_or_default();
    let location = terminal_location(&hostname(), &cwd.display().to_string());
    info!(author = %author, location = %location, "Starting terminal chat");

    println!();
    println!("  Parley — talking as {author}");
    println!("  Type '/reset' for a fresh session, 'exit' or Ctrl+D to quit.");
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        match classify(&line) {
            Input::Skip => {}
            Input::Exit => break,
            Input::Reset => match assistant.runtime().reset().await {
                Ok(()) => println!("  (session reset)"),
                Err(e) => eprintln!("  [Error] {e}"),
            },
            Input::Message(message) => {
                let reply = assistant.respond(&message, &author, &location).await;
                eprint!("\r                                        \r");
                if let Some(reply) = reply {
                    println!();
                    for line in reply.lines() {
                        println!("  Parley > {line}");
                    }
                    println!();
                }
            }
        }
        prompt()?;
    }

    println!();
    Ok(())
}
