//! Shell arguments and line grammar

use clap::Args;

/// Arguments for `jotter shell`
#[derive(Debug, Clone, Args)]
pub struct ShellArgs {
    /// Name the development identity provider logs in as
    #[arg(long = "as", default_value = "demo")]
    pub identity: String,
}

/// One line typed into the shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Blank line
    Empty,
    /// List commands
    Help,
    /// Interactive login
    Login,
    /// Log out
    Logout,
    /// Session summary
    Status,
    /// Refresh and print the notes
    List,
    /// `add <title> | <content>`, or `add` alone to submit the draft
    Add(Option<(String, String)>),
    /// Open an edit of the note at a position
    Edit(i64),
    /// Set the draft title
    Title(String),
    /// Set the draft content
    Content(String),
    /// Commit the open edit
    Save,
    /// Discard the open edit
    Cancel,
    /// Delete the note at a position
    Delete(i64),
    /// Leave the shell
    Quit,
}

/// Lines the shell cannot interpret
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// First word is not a command
    #[error("unknown command '{0}'; type 'help'")]
    Unknown(String),
    /// Right command, wrong arguments
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Help text listing every command
pub const HELP: &str = "\
commands:
  login                    log in through the identity provider
  logout                   log out
  status                   show session state
  list                     refresh and list notes
  add <title> | <content>  add a note
  add                      add the draft built with title/content
  edit <index>             start editing a note
  title <text>             set the draft title
  content <text>           set the draft content
  save                     save the open edit
  cancel                   discard the open edit
  delete <index>           delete a note
  quit                     leave the shell";

impl ShellCommand {
    /// Parse one input line
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "" => Self::Empty,
            "help" | "?" => Self::Help,
            "login" => Self::Login,
            "logout" => Self::Logout,
            "status" => Self::Status,
            "list" | "ls" => Self::List,
            "add" if rest.is_empty() => Self::Add(None),
            "add" => {
                let (title, content) = rest
                    .split_once('|')
                    .ok_or(ParseError::Usage("add <title> | <content>"))?;
                Self::Add(Some((title.trim().to_string(), content.trim().to_string())))
            }
            "edit" => Self::Edit(index(rest, "edit <index>")?),
            "title" => Self::Title(rest.to_string()),
            "content" => Self::Content(rest.to_string()),
            "save" => Self::Save,
            "cancel" => Self::Cancel,
            "delete" | "rm" => Self::Delete(index(rest, "delete <index>")?),
            "quit" | "exit" => Self::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

fn index(text: &str, usage: &'static str) -> Result<i64, ParseError> {
    text.parse().map_err(|_| ParseError::Usage(usage))
}
