use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::app::App;
use crate::error::AppError;

pub const HELP: &str = "\
Commands:
  open <path> [<path>...]  upload a file (only the first one is used)
  copy                     copy the extracted text to the clipboard
  download [dir]           save the extracted text as a .txt file
  full                     show or hide the complete text
  reset                    start a new upload
  dismiss                  close the error panel
  health                   test the API connection
  show                     print the current screen
  help                     print this help
  quit                     leave
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(Vec<PathBuf>),
    Copy,
    Download(Option<PathBuf>),
    ToggleFullText,
    Reset,
    Dismiss,
    Health,
    Show,
    Help,
    Quit,
    Empty,
    Unknown(String),
    Malformed(String),
}

impl Command {
    /// Arguments are split shell-style, so quoted and backslash-escaped
    /// paths (what terminals paste on drag and drop) stay whole.
    pub fn parse(line: &str) -> Self {
        let Some(words) = shlex::split(line) else {
            return Command::Malformed(line.trim().to_string());
        };
        let mut words = words.into_iter();
        let Some(verb) = words.next() else {
            return Command::Empty;
        };
        let args: Vec<String> = words.collect();

        match verb.to_lowercase().as_str() {
            "open" | "upload" => Command::Open(args.into_iter().map(PathBuf::from).collect()),
            "copy" => Command::Copy,
            "download" | "save" => Command::Download(args.into_iter().next().map(PathBuf::from)),
            "full" | "toggle" => Command::ToggleFullText,
            "reset" | "new" => Command::Reset,
            "dismiss" => Command::Dismiss,
            "health" | "test" => Command::Health,
            "show" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        }
    }
}

#[derive(Debug, Default)]
pub struct Reply {
    pub output: String,
    pub quit: bool,
}

impl Reply {
    fn text(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            quit: false,
        }
    }
}

pub async fn handle_line(app: &mut App, line: &str) -> Reply {
    let command = Command::parse(line);
    debug!(command = ?command, "Handling command");
    handle_command(app, command).await
}

pub async fn handle_command(app: &mut App, command: Command) -> Reply {
    match command {
        Command::Open(paths) => match app.submit(&paths).await {
            Ok(()) => Reply::text(app.render()),
            Err(AppError::Busy) => {
                Reply::text("A file is already being processed. Please wait.\n")
            }
            Err(e) => {
                warn!(error_code = e.error_code(), "Selection not uploaded: {}", e);
                Reply::text(format!("File rejected: {}\n", e))
            }
        },
        Command::Copy => match app.copy() {
            Some(_) => Reply::text(app.render()),
            None => Reply::text("Nothing to copy yet.\n"),
        },
        Command::Download(dir) => match app.download(dir.as_deref()).await {
            Ok(path) => Reply::text(format!("Saved to {}\n", path.display())),
            Err(e) => Reply::text(format!("Download failed: {}\n", e)),
        },
        Command::ToggleFullText => match app.toggle_full_text() {
            Some(_) => Reply::text(app.render()),
            None => Reply::text("No results to display\n"),
        },
        Command::Reset => match app.reset() {
            Ok(()) => Reply::text(app.render()),
            Err(_) => Reply::text("An upload is in progress and cannot be cancelled.\n"),
        },
        Command::Dismiss => {
            app.dismiss_error();
            Reply::text(app.render())
        }
        Command::Health => Reply::text(super::health::health_handler(app).await),
        Command::Show => Reply::text(app.render()),
        Command::Help => Reply::text(HELP),
        Command::Unknown(verb) => {
            info!(verb = %verb, "Unknown command");
            Reply::text(format!("Unknown command: {}\n{}", verb, HELP))
        }
        Command::Malformed(line) => {
            info!(line = %line, "Unbalanced quote or trailing escape");
            Reply::text(format!("Could not parse: {} (check quotes)\n", line))
        }
        Command::Empty => Reply::default(),
        Command::Quit => Reply {
            output: String::new(),
            quit: true,
        },
    }
}
