//! Line-oriented front end for tracking a live game.

use std::io::{self, BufRead, Write};

use potion_core::AppInfo;
use potion_core::game::session::Selection;
use potion_core::model::card::{CardKind, UnknownCard};
use potion_core::stats::StatsGateway;
use thiserror::Error;
use tracing::{Level, event};

use crate::controller::Tracker;
use crate::presenter;

const HELP: &str = "\
Commands:
  select <card>      choose the card the opponent played (or just type its name)
  attacked yes|no    answer the Iron Wall question
  confirm            record the round
  cancel             drop the current selection
  reset              start a new game (statistics are kept)
  stats              show overall and current-energy statistics
  history [json]     list the rounds of this game
  clear-stats        erase all statistics (asks first)
  help               show this text
  quit               leave";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Select(CardKind),
    Attacked(bool),
    Confirm,
    Cancel,
    Reset,
    ClearStats,
    Stats,
    History { json: bool },
    Help,
    Quit,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("expected yes or no, got '{0}'")]
    InvalidAnswer(String),
    #[error(transparent)]
    Card(#[from] UnknownCard),
}

impl Command {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        let command = match head.to_ascii_lowercase().as_str() {
            "select" | "play" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument("card"));
                }
                Command::Select(rest.parse()?)
            }
            "attacked" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument("yes|no"));
                }
                Command::Attacked(parse_answer(rest)?)
            }
            "yes" | "y" if rest.is_empty() => Command::Attacked(true),
            "no" | "n" if rest.is_empty() => Command::Attacked(false),
            "confirm" => Command::Confirm,
            "cancel" => Command::Cancel,
            "reset" => Command::Reset,
            "clear-stats" => Command::ClearStats,
            "stats" => Command::Stats,
            "history" => match rest.to_ascii_lowercase().as_str() {
                "" => Command::History { json: false },
                "json" => Command::History { json: true },
                _ => return Err(CommandError::Unknown(line.to_string())),
            },
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => match line.parse::<CardKind>() {
                Ok(card) => Command::Select(card),
                Err(_) => return Err(CommandError::Unknown(line.to_string())),
            },
        };
        Ok(Some(command))
    }
}

fn parse_answer(value: &str) -> Result<bool, CommandError> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" => Ok(true),
        "no" | "n" | "false" => Ok(false),
        _ => Err(CommandError::InvalidAnswer(value.to_string())),
    }
}

/// Drives `tracker` from `input` until `quit` or end of input.
pub fn run<G, R, W>(tracker: &mut Tracker<G>, input: R, mut output: W) -> io::Result<()>
where
    G: StatsGateway,
    R: BufRead,
    W: Write,
{
    writeln!(output, "{} tracker {}", AppInfo::game(), AppInfo::version())?;
    for warning in presenter::load_warnings(tracker.load_anomalies(), tracker.total_repair()) {
        writeln!(output, "{warning}")?;
    }
    show_round(tracker, &mut output)?;

    let mut lines = input.lines();
    loop {
        write!(output, "> ")?;
        output.flush()?;
        let Some(line) = lines.next() else {
            writeln!(output)?;
            break;
        };
        let line = line?;

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                writeln!(output, "{err}")?;
                continue;
            }
        };
        event!(target: "potion_tracker::repl", Level::DEBUG, ?command, "command");

        match command {
            Command::Select(card) => match tracker.select(card) {
                Ok(Selection::Ready) => {
                    writeln!(output, "Selected '{card}'. Type 'confirm' to record the round.")?;
                }
                Ok(Selection::NeedsAttackFlag) => {
                    writeln!(
                        output,
                        "Selected '{card}'. Did you attack the opponent this round? (attacked yes|no)"
                    )?;
                }
                Err(err) => writeln!(output, "{err}")?,
            },
            Command::Attacked(attacked) => match tracker.answer_attack(attacked) {
                Ok(()) => writeln!(output, "Noted. Type 'confirm' to record the round.")?,
                Err(err) => writeln!(output, "{err}")?,
            },
            Command::Confirm => match tracker.confirm() {
                Ok(resolution) => {
                    writeln!(output, "{}", presenter::resolution(&resolution))?;
                    show_round(tracker, &mut output)?;
                }
                Err(err) => writeln!(output, "{err}")?,
            },
            Command::Cancel => {
                tracker.cancel();
                writeln!(output, "Selection cleared.")?;
            }
            Command::Reset => {
                tracker.reset_game();
                writeln!(output, "New game started.")?;
                show_round(tracker, &mut output)?;
            }
            Command::ClearStats => {
                write!(
                    output,
                    "This erases every recorded play for good. Type 'yes' to confirm: "
                )?;
                output.flush()?;
                let answer = match lines.next() {
                    Some(line) => line?,
                    None => String::new(),
                };
                if answer.trim().eq_ignore_ascii_case("yes") {
                    match tracker.clear_stats() {
                        Ok(()) => writeln!(output, "Statistics cleared.")?,
                        Err(err) => {
                            writeln!(output, "Statistics cleared for this session.")?;
                            writeln!(output, "{}", presenter::persistence_warning(&err))?;
                        }
                    }
                } else {
                    writeln!(output, "Statistics kept.")?;
                }
            }
            Command::Stats => {
                writeln!(output, "{}", presenter::global_table(tracker.stats()))?;
                writeln!(
                    output,
                    "{}",
                    presenter::conditional_table(
                        tracker.stats(),
                        tracker.session().available_energy()
                    )
                )?;
            }
            Command::History { json: true } => match tracker.session().history().to_json() {
                Ok(json) => writeln!(output, "{json}")?,
                Err(err) => writeln!(output, "could not export history: {err}")?,
            },
            Command::History { json: false } => {
                let rounds = presenter::history_lines(tracker.session().history());
                if rounds.is_empty() {
                    writeln!(output, "No rounds played yet.")?;
                }
                for line in rounds {
                    writeln!(output, "{line}")?;
                }
            }
            Command::Help => writeln!(output, "{HELP}")?,
            Command::Quit => break,
        }
    }
    Ok(())
}

fn show_round<G: StatsGateway, W: Write>(tracker: &Tracker<G>, output: &mut W) -> io::Result<()> {
    let session = tracker.session();
    writeln!(output, "{}", presenter::status_line(session))?;
    if session.is_game_over() {
        return Ok(());
    }
    writeln!(
        output,
        "{}",
        presenter::conditional_table(tracker.stats(), session.available_energy())
    )?;
    writeln!(output, "{}", presenter::card_menu(&tracker.card_options()))
}
