//! Text commands entered on an officials' console.
//!
//! One command per line, for instance `vote 2 good`, `weight 14 112` or
//! `break snatch 10`.

use barbell_core::{BreakType, CountdownType, Event, Origin};
use barbell_types::{AthleteId, Group};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("{command}: missing {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("{command}: invalid argument {value:?}")]
    InvalidArgument { command: &'static str, value: String },
}

/// A parsed console command.
#[derive(Debug, Clone)]
pub enum ConsoleCommand {
    /// Forward the event to the field of play.
    Event(Event),
    /// Change the requested weight of an athlete of the current group.
    ChangeWeight { athlete: AthleteId, weight: u32 },
}

fn next<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    words
        .next()
        .ok_or(CommandError::MissingArgument { command, argument })
}

fn number<T: std::str::FromStr>(value: &str, command: &'static str) -> Result<T, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidArgument {
        command,
        value: value.to_string(),
    })
}

fn verdict(value: &str, command: &'static str) -> Result<bool, CommandError> {
    match value {
        "good" | "white" | "yes" => Ok(true),
        "bad" | "red" | "no" => Ok(false),
        other => Err(CommandError::InvalidArgument {
            command,
            value: other.to_string(),
        }),
    }
}

fn break_type(value: &str) -> Result<BreakType, CommandError> {
    Ok(match value {
        "intro" => BreakType::BeforeIntroduction,
        "snatch" => BreakType::FirstSnatch,
        "cj" => BreakType::FirstCleanJerk,
        "technical" => BreakType::Technical,
        "jury" => BreakType::Jury,
        "marshal" => BreakType::Marshal,
        other => {
            return Err(CommandError::InvalidArgument {
                command: "break",
                value: other.to_string(),
            })
        }
    })
}

/// Parse one console line. The origin identifies the console.
pub fn parse_command(line: &str, origin: Origin) -> Result<ConsoleCommand, CommandError> {
    let mut words = line.split_whitespace();
    let command = words.next().ok_or(CommandError::Empty)?;

    let event = match command {
        "start" => Event::TimeStarted { origin },
        "stop" => Event::TimeStopped { origin },
        "timeover" => Event::TimeOver { origin },
        "down" => Event::DownSignal { origin },
        "reset" => Event::DecisionReset { origin },
        "pause" => Event::BreakPaused { origin },
        "lift" => Event::StartLifting { origin },
        "vote" => {
            let referee: usize = number(next(&mut words, "vote", "referee")?, "vote")?;
            if !(1..=3).contains(&referee) {
                return Err(CommandError::InvalidArgument {
                    command: "vote",
                    value: referee.to_string(),
                });
            }
            let decision = verdict(next(&mut words, "vote", "decision")?, "vote")?;
            Event::DecisionUpdate {
                referee: referee - 1,
                decision,
                origin,
            }
        }
        "decide" => Event::ExplicitDecision {
            success: verdict(next(&mut words, "decide", "decision")?, "decide")?,
            referees: [None; 3],
            origin,
        },
        "force" => {
            let secs: u64 = number(next(&mut words, "force", "seconds")?, "force")?;
            Event::ForceTime {
                time_allowed: Duration::from_secs(secs),
                origin,
            }
        }
        "break" => {
            let break_type = break_type(next(&mut words, "break", "type")?)?;
            let countdown = match words.next() {
                Some(minutes) => {
                    CountdownType::Duration(Duration::from_secs(60 * number::<u64>(minutes, "break")?))
                }
                None => CountdownType::Indefinite,
            };
            Event::BreakStarted {
                break_type,
                countdown,
                target: None,
                indefinite: countdown == CountdownType::Indefinite,
                origin,
            }
        }
        "group" => {
            let group = match next(&mut words, "group", "name")? {
                "none" => None,
                name => Some(Group::new(name)),
            };
            Event::SwitchGroup { group, origin }
        }
        "weight" => {
            let athlete = AthleteId(number(next(&mut words, "weight", "athlete")?, "weight")?);
            let weight = number(next(&mut words, "weight", "kg")?, "weight")?;
            return Ok(ConsoleCommand::ChangeWeight { athlete, weight });
        }
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(ConsoleCommand::Event(event))
}
