//! Interactive console for a running sampler

use crate::input::gamepad::provider::SessionCommand;
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::mpsc;

/// A parsed console line
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    /// Forwarded to the sampler thread
    Session(SessionCommand),
    Stats,
    History,
    Export,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  deadzone <0-30>  set the axis deadzone in percent
  arm              start a reaction-time trial (press any button)
  reset            zero all statistics
  clear            clear the recent-edge history
  stats            print session statistics
  history          print recent button edges
  rumble <index>   vibrate a controller
  export           write a JSON report
  help             show this text
  quit             exit";

/// Parse one console line. Empty lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ConsoleInput>> {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Ok(None);
    };
    let arg = parts.next();

    let input = match command.to_ascii_lowercase().as_str() {
        "deadzone" | "dz" => {
            let value = arg.ok_or_else(|| anyhow::anyhow!("usage: deadzone <0-30>"))?;
            let percent: u8 = value
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid deadzone: {}", value))?;
            if percent > 30 {
                anyhow::bail!("deadzone must be between 0 and 30");
            }
            ConsoleInput::Session(SessionCommand::SetDeadzone(percent))
        },
        "arm" | "latency" => ConsoleInput::Session(SessionCommand::ArmLatencyTrial),
        "reset" => ConsoleInput::Session(SessionCommand::Reset),
        "clear" => ConsoleInput::Session(SessionCommand::ClearHistory),
        "rumble" | "vibrate" => {
            let index = match arg {
                Some(value) => value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("invalid controller index: {}", value))?,
                None => 0,
            };
            ConsoleInput::Session(SessionCommand::Rumble(index))
        },
        "stats" => ConsoleInput::Stats,
        "history" => ConsoleInput::History,
        "export" => ConsoleInput::Export,
        "help" | "?" => ConsoleInput::Help,
        "exit" | "quit" | "q" => ConsoleInput::Quit,
        other => anyhow::bail!("unknown command '{}' (type 'help')", other),
    };

    Ok(Some(input))
}

/// Read console lines on a blocking thread and forward parsed input.
///
/// Returns when the user quits, input ends, or the receiver is dropped.
pub fn run_repl(tx: mpsc::UnboundedSender<ConsoleInput>) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline("gamepad> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                match parse_line(&line) {
                    Ok(Some(input)) => {
                        let quit = input == ConsoleInput::Quit;
                        if tx.send(input).is_err() || quit {
                            break;
                        }
                    },
                    Ok(None) => {},
                    Err(e) => println!("{}", e),
                }
            },
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                let _ = tx.send(ConsoleInput::Quit);
                break;
            },
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
