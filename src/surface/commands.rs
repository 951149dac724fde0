//! Manual control from stdin
//!
//! One command per line. This is the only control path when the global
//! hotkeys are unavailable.

use std::io::{BufRead, Write};
use std::str::FromStr;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::lifecycle::StopSignal;
use crate::state::StepDirection;

use super::{ControlError, ControlHandle};

pub const HELP: &str = "\
commands:
  on | ] | +      start clicking
  off | [ | -     stop clicking
  rate <cpm>      set clicks per minute (1-3000)
  up | >          raise the rate one step
  down | <        lower the rate one step
  status          print the current state as JSON
  quit            exit";

/// A parsed console command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Activate,
    Deactivate,
    SetRate(i64),
    Step(StepDirection),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),

    #[error("`rate` needs a value")]
    MissingRate,

    #[error("`rate` needs a whole number, got `{0}`")]
    InvalidRate(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandError::Empty);
        };

        let command = match head.to_ascii_lowercase().as_str() {
            "on" | "]" | "+" => Command::Activate,
            "off" | "[" | "-" => Command::Deactivate,
            "up" | ">" => Command::Step(StepDirection::Up),
            "down" | "<" => Command::Step(StepDirection::Down),
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "rate" | "cpm" => {
                let value = words.next().ok_or(CommandError::MissingRate)?;
                let rate = value
                    .parse::<i64>()
                    .map_err(|_| CommandError::InvalidRate(value.to_string()))?;
                Command::SetRate(rate)
            }
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

/// Read commands from stdin on a dedicated thread.
///
/// The thread is never joined: a blocking stdin read cannot be
/// interrupted, and it holds nothing that needs cleanup.
pub fn spawn_reader(control: ControlHandle, stop: StopSignal) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("console-commands".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            run_reader(stdin.lock(), stdout.lock(), &control, &stop);
        })
}

/// Execute commands from `input` until EOF, `quit`, or the stop signal
pub fn run_reader<R: BufRead, W: Write>(
    input: R,
    mut out: W,
    control: &ControlHandle,
    stop: &StopSignal,
) {
    for line in input.lines() {
        if stop.is_stopped() {
            break;
        }

        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(?e, "failed to read console input");
                break;
            }
        };

        match line.parse::<Command>() {
            Ok(command) => {
                if !execute(command, control, stop, &mut out) {
                    break;
                }
            }
            Err(CommandError::Empty) => {}
            Err(e) => warn!("{e}"),
        }
    }
    debug!("console command reader finished");
}

/// Returns false once reading should stop
fn execute<W: Write>(
    command: Command,
    control: &ControlHandle,
    stop: &StopSignal,
    out: &mut W,
) -> bool {
    debug!(?command, "console command");
    let sent = match command {
        Command::Activate => control.activate(),
        Command::Deactivate => control.deactivate(),
        Command::SetRate(rate) => control.set_rate(rate),
        Command::Step(direction) => control.step(direction),
        Command::Status => {
            write_status(control, out);
            Ok(())
        }
        Command::Help => {
            if let Err(e) = writeln!(out, "{HELP}") {
                warn!(?e, "failed to write help");
            }
            Ok(())
        }
        Command::Quit => {
            info!("quit requested from console");
            stop.stop();
            return false;
        }
    };

    match sent {
        Ok(()) => true,
        Err(ControlError::Full) => {
            warn!(?command, "{}", ControlError::Full);
            true
        }
        Err(ControlError::Closed) => false,
    }
}

fn write_status<W: Write>(control: &ControlHandle, out: &mut W) {
    let result = serde_json::to_string(&control.snapshot())
        .map_err(std::io::Error::from)
        .and_then(|json| writeln!(out, "{json}"));
    if let Err(e) = result {
        warn!(?e, "failed to write status");
    }
}
