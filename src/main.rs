//! drivup-chat - prints the chat view of a conversation dump
//!
//! Usage: `drivup-chat <messages.json> [--json] [--highlight <id>]...`
//!
//! The file holds a JSON array of messages as the API returns them. The
//! output is the sequence of day separators and messages the chat screen
//! would render, with highlighted messages marked.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use drivup_chat::clock::SystemClock;
use drivup_chat::config::{load_settings, Settings};
use drivup_chat::logging;
use drivup_chat::message::{ChatMessage, MessageStatus};
use drivup_chat::timeline::{self, HighlightRequest, TimelineEntry};

#[derive(Parser)]
#[command(name = "drivup-chat", about = "Print the chat view of a conversation dump")]
struct Args {
    /// JSON array of messages as the API returns them
    path: PathBuf,

    /// Print the timeline as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Message id to highlight ("last" for the final message); repeatable
    #[arg(long = "highlight", value_name = "ID")]
    highlights: Vec<String>,
}

fn status_mark(status: Option<MessageStatus>) -> &'static str {
    match status {
        None => "",
        Some(MessageStatus::Sent) => " ✓",
        Some(MessageStatus::Delivered) => " ✓✓",
        Some(MessageStatus::Read) => " ✓✓ (read)",
    }
}

fn print_timeline(entries: &[TimelineEntry], user_id: &str) {
    for entry in entries {
        match entry {
            TimelineEntry::Separator(sep) => println!("──── {} ────", sep.label),
            TimelineEntry::Message(m) => {
                let msg = &m.message;
                let marker = if m.highlighted { "▶" } else { " " };
                let who = if msg.sender_id == user_id { "you" } else { msg.sender_id.as_str() };
                let pending = if msg.is_provisional() { " (sending)" } else { "" };
                println!(
                    "{} [{}] {}: {}{}{}",
                    marker,
                    msg.timestamp,
                    who,
                    msg.text,
                    status_mark(msg.status),
                    pending
                );
            }
        }
    }
}

/// Timeline of the dump exactly as loaded: no buffer cap, no merging of
/// duplicate ids, so `last` is the final message in the file.
fn dump_timeline(
    messages: &[ChatMessage],
    highlights: Vec<String>,
    settings: &Settings,
) -> Vec<TimelineEntry> {
    let highlights = HighlightRequest::explicit(highlights);
    timeline::build_timeline(messages, &highlights, &SystemClock, settings.locale)
}

fn run(args: Args, settings: &Settings) -> Result<(), String> {
    let raw = fs::read_to_string(&args.path)
        .map_err(|e| format!("Failed to read {}: {}", args.path.display(), e))?;
    let messages: Vec<ChatMessage> =
        serde_json::from_str(&raw).map_err(|e| format!("Invalid message list: {}", e))?;
    tracing::info!(count = messages.len(), path = %args.path.display(), "loaded conversation");

    let entries = dump_timeline(&messages, args.highlights, settings);

    if args.json {
        let out = serde_json::to_string_pretty(&entries)
            .map_err(|e| format!("Failed to serialize timeline: {}", e))?;
        println!("{}", out);
    } else {
        print_timeline(&entries, &settings.user_id);
    }
    Ok(())
}

fn main() -> ExitCode {
    let settings = load_settings().unwrap_or_default();
    if let Err(e) = logging::init(&settings.log_filter) {
        eprintln!("{}", e);
    }

    let args = Args::parse();

    match run(args, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e);
            ExitCode::from(1)
        }
    }
}
