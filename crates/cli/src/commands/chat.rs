//! `cardchat chat` — Interactive chat with the sales assistant.

use std::io::Write;
use std::path::Path;

use cardchat_agent::OutputSink;
use cardchat_core::FailureKind;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::CommandResult;

/// Prints replies with a visible assistant prefix. The user's own input is
/// already on screen, so it is not echoed.
struct InteractiveSink;

impl InteractiveSink {
    fn print_block(text: &str) {
        eprint!("\r     \r");
        println!();
        for line in text.lines() {
            println!("  Asistente > {line}");
        }
        println!();
    }
}

impl OutputSink for InteractiveSink {
    fn user(&mut self, _text: &str) {
        eprint!("  ...");
    }

    fn assistant(&mut self, text: &str) {
        Self::print_block(text);
    }

    fn notice(&mut self, kind: FailureKind, text: &str) {
        tracing::debug!(kind = kind.label(), "Exchange failed");
        Self::print_block(text);
    }
}

/// What a line of input asks for.
#[derive(Debug, PartialEq, Eq)]
enum LineCommand<'a> {
    Skip,
    Exit,
    Reset,
    Send(&'a str),
}

fn parse_line(line: &str) -> LineCommand<'_> {
    let trimmed = line.trim();
    match trimmed {
        "" => LineCommand::Skip,
        "exit" | "quit" | "salir" => LineCommand::Exit,
        "/reset" => LineCommand::Reset,
        text => LineCommand::Send(text),
    }
}

pub async fn run(config_path: Option<&Path>) -> CommandResult {
    let config = super::load_config(config_path)?;
    super::require_api_key(&config, config_path)?;

    let mut session = super::build_session(&config, InteractiveSink)?;

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║     cardchat — Asistente de ventas           ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", session.provider_name());
    println!("  Model:     {}", session.model());
    println!("  History:   last {} turns", session.history().max_turns());
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type '/reset' to forget the conversation, 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("  Usuario > ");
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            LineCommand::Skip => {}
            LineCommand::Exit => break,
            LineCommand::Reset => {
                session.reset();
                println!("  (conversation cleared)");
                println!();
            }
            LineCommand::Send(text) => {
                session.converse(text).await;
            }
        }

        print!("  Usuario > ");
        std::io::stdout().flush()?;
    }

    println!();
    println!("  ¡Hasta luego! 👋");
    println!();

    Ok(())
}
