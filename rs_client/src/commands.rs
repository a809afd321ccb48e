use std::fmt;
use std::path::PathBuf;

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { email: String, password: String },
    SignUp { email: String, password: String, confirm: String },
    /// Request a password-reset email.
    Forgot { email: String },
    /// Set a new password during recovery.
    NewPassword { password: String, confirm: String },
    /// Replace the job description with the rest of the line.
    JobDescription(String),
    /// Replace the file selection.
    Select(Vec<PathBuf>),
    Files,
    Analyze,
    Results,
    History,
    Refresh,
    Logout,
    Status,
    Help,
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Blank input line.
    Empty,
    /// Command recognized but required arguments are missing.
    MissingArgument { usage: &'static str },
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Type 'help' to see available commands"),
            Self::MissingArgument { usage } => write!(f, "Usage: {}", usage),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Type 'help' to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

pub const HELP: &str = "\
Account:
  login EMAIL PASSWORD             Sign in
  signup EMAIL PASSWORD CONFIRM    Create an account
  forgot EMAIL                     Send a password-reset email
  new-password PASSWORD CONFIRM    Set a new password (reset link only)
  logout                           Sign out

Screening:
  jd TEXT...                       Set the job description
  select FILE...                   Choose résumé files (PDF only)
  files                            Show the current selection
  analyze                          Score the selection against the job description
  results                          Show the latest results
  history                          Show accumulated eligible matches
  refresh                          Re-fetch eligible matches

  status                           Show session state
  help                             Show this help
  quit                             Exit";

/// Parse one input line into a [`Command`].
///
/// # Examples
///
/// ```
/// use rs_client::commands::{Command, parse_command};
///
/// assert_eq!(parse_command("analyze"), Ok(Command::Analyze));
/// assert_eq!(
///     parse_command("jd Senior Rust engineer"),
///     Ok(Command::JobDescription("Senior Rust engineer".to_string()))
/// );
/// ```
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();
    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed, ""),
    };
    let args: Vec<&str> = rest.split_ascii_whitespace().collect();

    match name.to_ascii_lowercase().as_str() {
        "" => Err(ParseError::Empty),
        "login" => match args.as_slice() {
            [email, password] => Ok(Command::Login {
                email: email.to_string(),
                password: password.to_string(),
            }),
            _ => Err(missing("login EMAIL PASSWORD")),
        },
        "signup" => match args.as_slice() {
            [email, password, confirm] => Ok(Command::SignUp {
                email: email.to_string(),
                password: password.to_string(),
                confirm: confirm.to_string(),
            }),
            _ => Err(missing("signup EMAIL PASSWORD CONFIRM")),
        },
        "forgot" => match args.as_slice() {
            [email] => Ok(Command::Forgot {
                email: email.to_string(),
            }),
            _ => Err(missing("forgot EMAIL")),
        },
        "new-password" => match args.as_slice() {
            [password, confirm] => Ok(Command::NewPassword {
                password: password.to_string(),
                confirm: confirm.to_string(),
            }),
            _ => Err(missing("new-password PASSWORD CONFIRM")),
        },
        // The text is kept verbatim; emptiness is judged at submission.
        "jd" => {
            if rest.is_empty() {
                Err(missing("jd TEXT..."))
            } else {
                Ok(Command::JobDescription(rest.to_string()))
            }
        }
        "select" => {
            if args.is_empty() {
                Err(missing("select FILE..."))
            } else {
                Ok(Command::Select(args.into_iter().map(PathBuf::from).collect()))
            }
        }
        "files" => Ok(Command::Files),
        "analyze" => Ok(Command::Analyze),
        "results" => Ok(Command::Results),
        "history" => Ok(Command::History),
        "refresh" => Ok(Command::Refresh),
        "logout" => Ok(Command::Logout),
        "status" => Ok(Command::Status),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        _ => Err(ParseError::UnrecognizedCommand(name.to_string())),
    }
}

fn missing(usage: &'static str) -> ParseError {
    ParseError::MissingArgument { usage }
}
