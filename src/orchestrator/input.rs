//! Line-oriented stdin driver for the interactive trigger.

use super::controller::TriggerCommand;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;

pub(crate) const HELP: &str =
    "Enter or 'launch' to activate, 'disable' / 'enable' to toggle the trigger, 'quit' to exit";

/// Map one input line to a command. Unknown input yields `None`.
pub(crate) fn parse_command(line: &str) -> Option<TriggerCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "l" | "launch" => Some(TriggerCommand::Activate),
        "d" | "disable" => Some(TriggerCommand::SetDisabled(true)),
        "e" | "enable" => Some(TriggerCommand::SetDisabled(false)),
        "q" | "quit" | "exit" => Some(TriggerCommand::Quit),
        _ => None,
    }
}

/// Forward stdin lines as commands until quit, EOF or Ctrl-C.
pub(crate) async fn forward_stdin(cmd_tx: UnboundedSender<TriggerCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => match parse_command(&line) {
                        Some(cmd) => {
                            let quit = cmd == TriggerCommand::Quit;
                            if cmd_tx.send(cmd).is_err() || quit {
                                break;
                            }
                        }
                        None => tracing::warn!(input = %line.trim(), "unknown command; {}", HELP),
                    },
                    Ok(None) => {
                        let _ = cmd_tx.send(TriggerCommand::Quit);
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "stdin read failed");
                        let _ = cmd_tx.send(TriggerCommand::Quit);
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                let _ = cmd_tx.send(TriggerCommand::Quit);
                break;
            }
        }
    }
}
