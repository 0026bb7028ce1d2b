use std::path::PathBuf;

pub const HELP: &str = "\
commands:
  <text>          send a message (uses the active file if one is attached)
  /upload <path>  attach a pdf, png, jpg or jpeg file
  /clear          detach the active file
  /close          hide the file preview
  /help           show this help
  /quit           exit";

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Upload(PathBuf),
    Clear,
    ClosePreview,
    Help,
    Quit,
    /// A slash command we do not know, or one missing its argument.
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Self::Send(trimmed.to_string());
        };

        let (name, argument) = match rest.split_once(char::is_whitespace) {
            Some((name, argument)) => (name, argument.trim()),
            None => (rest, ""),
        };

        match name {
            "upload" if !argument.is_empty() => Self::Upload(PathBuf::from(argument)),
            "upload" => Self::Invalid("usage: /upload <path>".to_string()),
            "clear" => Self::Clear,
            "close" => Self::ClosePreview,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => Self::Invalid(format!("unknown command `/{other}`, try /help")),
        }
    }
}
