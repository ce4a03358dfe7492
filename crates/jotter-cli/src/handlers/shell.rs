//! Interactive shell
//!
//! Reads commands from stdin, runs them through the app workflows, and
//! prints results. Typed errors are printed with their code; none of them
//! end the shell.

use crate::commands::shell::{ShellCommand, HELP};
use anyhow::Result;
use jotter_app::workflows::{auth, notes};
use jotter_app::{AppCore, AppEffects, DraftField, JotterError, SessionState};
use jotter_core::NetworkConfig;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

const PROMPT: &str = "jotter> ";

/// Output of one command
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reply {
    /// Lines to print
    pub lines: Vec<String>,
    /// Whether the shell should exit
    pub quit: bool,
}

impl Reply {
    fn line(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            quit: false,
        }
    }

    fn error(err: &JotterError) -> Self {
        Self::line(describe(err))
    }
}

/// Run the shell until `quit` or end of input
pub async fn run(config: NetworkConfig, effects: AppEffects) -> Result<()> {
    let app = AppCore::new(config, effects)?;
    let state = auth::initialize(&app).await;
    println!("Jotter shell ({state}). Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{PROMPT}");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let reply = match ShellCommand::parse(&line) {
            Ok(command) => execute(&app, command).await,
            Err(err) => Reply::line(err.to_string()),
        };
        for line in &reply.lines {
            println!("{line}");
        }
        if reply.quit {
            break;
        }
    }

    tracing::debug!("shell finished");
    Ok(())
}

/// Run one command against `app`
pub async fn execute(app: &AppCore, command: ShellCommand) -> Reply {
    match command {
        ShellCommand::Empty => Reply::default(),
        ShellCommand::Help => Reply::line(HELP),
        ShellCommand::Quit => Reply {
            lines: Vec::new(),
            quit: true,
        },
        ShellCommand::Login => {
            let state = auth::login(app).await;
            session_reply(app, state)
        }
        ShellCommand::Logout => {
            let state = auth::logout(app).await;
            Reply::line(format!("session {state}"))
        }
        ShellCommand::Status => status(app).await,
        ShellCommand::List => match notes::refresh(app).await {
            Ok(_) => listing(app),
            Err(err) => Reply::error(&err),
        },
        ShellCommand::Add(Some((title, content))) => {
            written(app, notes::add_note(app, &title, &content).await.map(drop))
        }
        ShellCommand::Add(None) => written(app, notes::submit_compose(app).await.map(drop)),
        ShellCommand::Edit(index) => match notes::begin_edit(app, index).await {
            Ok(edit) => Reply::line(format!(
                "editing {index}: {} | {}",
                edit.draft_title(),
                edit.draft_content()
            )),
            Err(err) => Reply::error(&err),
        },
        ShellCommand::Title(text) => set_draft(app, DraftField::Title, text).await,
        ShellCommand::Content(text) => set_draft(app, DraftField::Content, text).await,
        ShellCommand::Save => written(app, notes::save_edit(app).await),
        ShellCommand::Cancel => {
            notes::cancel_edit(app).await;
            Reply::line("edit discarded")
        }
        ShellCommand::Delete(index) => {
            written(app, notes::delete_note(app, index).await.map(drop))
        }
    }
}

/// Edit draft when an edit is open, otherwise the add draft
async fn set_draft(app: &AppCore, field: DraftField, text: String) -> Reply {
    let edit = notes::edit_session(app).await;
    if edit.is_open() {
        if let Err(err) = notes::update_draft(app, field, text).await {
            return Reply::error(&err);
        }
        let edit = notes::edit_session(app).await;
        return Reply::line(format!(
            "draft for {}: {} | {}",
            edit.target().unwrap_or_default(),
            edit.draft_title(),
            edit.draft_content()
        ));
    }

    notes::update_compose(app, field, text).await;
    let draft = notes::compose_draft(app).await;
    let mut reply = Reply::line(format!("new note: {} | {}", draft.title, draft.content));
    if draft.is_submittable() {
        reply.lines.push("type 'add' to save it".to_string());
    }
    reply
}

fn written(app: &AppCore, result: jotter_app::Result<()>) -> Reply {
    match result {
        Ok(()) => listing(app),
        Err(err) => Reply::error(&err),
    }
}

fn listing(app: &AppCore) -> Reply {
    let notes = notes::notes(app);
    if notes.is_empty() {
        return Reply::line("(no notes)");
    }
    Reply {
        lines: notes
            .iter()
            .enumerate()
            .map(|(index, note)| format!("{index}: {} | {}", note.title, note.content))
            .collect(),
        quit: false,
    }
}

fn session_reply(app: &AppCore, state: SessionState) -> Reply {
    let status = auth::status(app);
    let mut reply = match &status.principal {
        Some(principal) => Reply::line(format!("session {state} as {}", principal.short())),
        None => Reply::line(format!("session {state}")),
    };
    if state == SessionState::Unauthenticated {
        if let Some(err) = &status.last_error {
            reply.lines.push(describe(err));
        }
    }
    reply
}

async fn status(app: &AppCore) -> Reply {
    let status = auth::status(app);
    let mut lines = vec![format!("state: {}", status.state)];
    if let Some(principal) = &status.principal {
        lines.push(format!("principal: {}", principal.short()));
    }
    lines.push(format!("notes: {}", status.note_count));
    if status.pending {
        lines.push("a change is in flight".to_string());
    }
    if let Some(target) = notes::edit_session(app).await.target() {
        lines.push(format!("editing: {target}"));
    }
    if let Some(err) = &status.last_error {
        lines.push(format!("last error: {}", describe(err)));
    }
    Reply { lines, quit: false }
}

fn describe(err: &JotterError) -> String {
    let category = err.category();
    format!(
        "error[{}] {err} ({}: {})",
        err.code(),
        category.label(),
        category.resolution_hint()
    )
}
