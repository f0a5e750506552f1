//! Command-line parsing.
//!
//! A line either drives the calculator (`12 + 7 =`, `sin`, `m+`) or, when it
//! starts with `:`, runs a notes/history/vault command (`:note add t | c`).

use crate::error::{AppError, Result};
use calcvault_engine::{Input, RecordId};
use std::path::PathBuf;
use std::str::FromStr;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Calculator inputs, applied in order
    Keys(Vec<Input>),
    Notes,
    AddNote { title: String, content: String },
    EditNote { id: RecordId, title: String, content: String },
    DeleteNote(RecordId),
    History,
    ClearHistory,
    ReuseHistory(RecordId),
    Unlock(String),
    Lock,
    ChangePassword { current: String, new: String, confirm: String },
    AddFile(PathBuf),
    ListFiles,
    ExportFile { id: RecordId, dest: PathBuf },
    DeleteFile(RecordId),
    /// Write the whole state as JSON
    Export(PathBuf),
    /// Replace the whole state from a JSON backup
    Import(PathBuf),
    State,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        match line.strip_prefix(':') {
            Some(rest) => parse_command(rest.trim()),
            None => parse_keys(line).map(Command::Keys),
        }
    }
}

fn parse_command(line: &str) -> Result<Command> {
    let (verb, rest) = split_word(line);
    let (sub, args) = split_word(rest);

    let command = match (verb, sub) {
        ("help" | "h" | "?", _) => Command::Help,
        ("quit" | "q" | "exit", _) => Command::Quit,
        ("state", _) => Command::State,
        ("export", _) => Command::Export(PathBuf::from(required(rest, "path")?)),
        ("import", _) => Command::Import(PathBuf::from(required(rest, "path")?)),
        ("notes", _) | ("note", "" | "ls" | "list") => Command::Notes,
        ("note", "add") => {
            let (title, content) = split_note(args)?;
            Command::AddNote { title, content }
        }
        ("note", "edit") => {
            let (id, body) = split_word(args);
            let (title, content) = split_note(body)?;
            Command::EditNote {
                id: parse_id(id)?,
                title,
                content,
            }
        }
        ("note", "rm" | "delete") => Command::DeleteNote(parse_id(args)?),
        ("history", "") => Command::History,
        ("history", "clear") => Command::ClearHistory,
        ("history", "use") => Command::ReuseHistory(parse_id(args)?),
        ("vault", "unlock") => Command::Unlock(required(args, "password")?.to_string()),
        ("vault", "lock") => Command::Lock,
        ("vault", "passwd") => {
            let parts: Vec<&str> = args.split_whitespace().collect();
            match parts.as_slice() {
                [current, new, confirm] => Command::ChangePassword {
                    current: current.to_string(),
                    new: new.to_string(),
                    confirm: confirm.to_string(),
                },
                _ => {
                    return Err(AppError::Command(
                        "usage: :vault passwd <current> <new> <confirm>".into(),
                    ))
                }
            }
        }
        ("vault", "add") => Command::AddFile(PathBuf::from(required(args, "path")?)),
        ("vault", "" | "ls" | "list") => Command::ListFiles,
        ("vault", "open" | "export") => {
            let (id, dest) = split_word(args);
            Command::ExportFile {
                id: parse_id(id)?,
                dest: PathBuf::from(required(dest, "destination")?),
            }
        }
        ("vault", "rm" | "delete") => Command::DeleteFile(parse_id(args)?),
        _ => return Err(AppError::Command(format!("unknown command: :{}", line))),
    };
    Ok(command)
}

/// Turn a calculator line into inputs.
///
/// Tokens are separated by whitespace. Number tokens expand to digit and
/// decimal-point inputs; everything else must be a keypad action or a key.
pub fn parse_keys(line: &str) -> Result<Vec<Input>> {
    let mut inputs = Vec::new();
    for token in line.split_whitespace() {
        if is_number(token) {
            inputs.extend(token.chars().filter_map(|c| Input::from_key(&c.to_string())));
            continue;
        }
        let input = Input::from_action(token)
            .or_else(|| Input::from_key(token))
            .ok_or_else(|| AppError::Command(format!("unknown key: {}", token)))?;
        inputs.push(input);
    }
    Ok(inputs)
}

fn is_number(token: &str) -> bool {
    token.len() > 1 && token.chars().all(|c| c.is_ascii_digit() || c == '.')
}

fn split_word(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (s, ""),
    }
}

fn split_note(s: &str) -> Result<(String, String)> {
    let (title, content) = s
        .split_once('|')
        .ok_or_else(|| AppError::Command("expected <title> | <content>".into()))?;
    // Literal "\n" in the content becomes a line break.
    Ok((title.trim().to_string(), content.trim().replace("\\n", "\n")))
}

fn parse_id(s: &str) -> Result<RecordId> {
    s.trim()
        .trim_start_matches('#')
        .parse()
        .map_err(|_| AppError::Command(format!("invalid id: {:?}", s)))
}

fn required<'a>(s: &'a str, what: &str) -> Result<&'a str> {
    if s.is_empty() {
        Err(AppError::Command(format!("missing {}", what)))
    } else {
        Ok(s)
    }
}

pub const HELP: &str = "\
Calculator: type keys separated by spaces, e.g. `12 + 7 =`, `2 power 10 =`, `9 sqrt`
  operators  + - * / power mod ( )      memory  mc mr m+ m-
  functions  sin cos tan asin acos atan sinh cosh tanh log ln log2
             sqrt cbrt square cube factorial pow10 exp negate percent
             random abs reciprocal floor ceil round
  constants  pi e      angle  rad deg drg      edit  clear backspace =
Commands:
  :notes                          list notes
  :note add <title> | <content>   add a note
  :note edit <id> <title> | <content>
  :note rm <id>
  :history                        list calculations
  :history use <id>               load a result into the calculator
  :history clear
  :vault unlock <password>        :vault lock
  :vault passwd <current> <new> <confirm>
  :vault add <path>               :vault ls
  :vault open <id> <dest>         :vault rm <id>
  :export <path>  :import <path>  whole-state JSON backup
  :state  :help  :quit";

#[cfg(test)]
mod tests {
    use super::*;
    use calcvault_engine::{BinaryOperator, MemoryAction, UnaryFunction};

    #[test]
    fn calculator_line() {
        let command: Command = "12 + 7.5 =".parse().unwrap();
        assert_eq!(
            command,
            Command::Keys(vec![
                Input::digit(1),
                Input::digit(2),
                Input::operator(BinaryOperator::Add),
                Input::digit(7),
                Input::DecimalPoint,
                Input::digit(5),
                Input::Calculate,
            ])
        );
    }

    #[test]
    fn action_names() {
        let inputs = parse_keys("2 power 10 = sqrt m+ pi").unwrap();
        assert_eq!(inputs[1], Input::operator(BinaryOperator::Pow));
        assert_eq!(inputs[5], Input::function(UnaryFunction::Sqrt));
        assert_eq!(inputs[6], Input::memory(MemoryAction::Add));
    }

    #[test]
    fn unknown_key() {
        assert!(matches!(
            parse_keys("2 frobnicate"),
            Err(AppError::Command(_))
        ));
    }

    #[test]
    fn note_commands() {
        assert_eq!(
            ":note add Groceries | milk\\neggs".parse::<Command>().unwrap(),
            Command::AddNote {
                title: "Groceries".into(),
                content: "milk\neggs".into()
            }
        );
        assert_eq!(
            ":note edit #42 New | body".parse::<Command>().unwrap(),
            Command::EditNote {
                id: 42,
                title: "New".into(),
                content: "body".into()
            }
        );
        assert_eq!(
            ":note rm 7".parse::<Command>().unwrap(),
            Command::DeleteNote(7)
        );
        assert!(":note add no separator".parse::<Command>().is_err());
    }

    #[test]
    fn vault_commands() {
        assert_eq!(
            ":vault unlock s3cret".parse::<Command>().unwrap(),
            Command::Unlock("s3cret".into())
        );
        assert_eq!(
            ":vault passwd a b b".parse::<Command>().unwrap(),
            Command::ChangePassword {
                current: "a".into(),
                new: "b".into(),
                confirm: "b".into()
            }
        );
        assert_eq!(
            ":vault open 3 /tmp/out.png".parse::<Command>().unwrap(),
            Command::ExportFile {
                id: 3,
                dest: PathBuf::from("/tmp/out.png")
            }
        );
        assert!(":vault passwd a b".parse::<Command>().is_err());
        assert!(":vault unlock".parse::<Command>().is_err());
    }

    #[test]
    fn misc_commands() {
        assert_eq!(":q".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!(":history".parse::<Command>().unwrap(), Command::History);
        assert_eq!(
            ":history use 5".parse::<Command>().unwrap(),
            Command::ReuseHistory(5)
        );
        assert_eq!(
            ":export /tmp/backup.json".parse::<Command>().unwrap(),
            Command::Export(PathBuf::from("/tmp/backup.json"))
        );
        assert!(":import".parse::<Command>().is_err());
        assert!(":bogus".parse::<Command>().is_err());
    }
}
