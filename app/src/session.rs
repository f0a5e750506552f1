//! Interactive session: one workspace, its on-disk store, and the error
//! reset timer.
//!
//! The engine never sleeps. When it schedules a reset the session spawns a
//! sleeper task that sends the token back through a channel; the run loop
//! feeds it to [`Session::on_timeout`]. A cancelled reset aborts the task.

use crate::command::{self, Command};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::render;
use crate::storage::FileStore;
use calcvault_engine::format::format_result;
use calcvault_engine::{
    format_file_size, Calculator, Event, FileKind, Input, RecordId, Snapshot, Timestamp, Vault, Workspace,
};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// What the caller should do after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Lines(Vec<String>),
    Quit,
}

struct ResetTimer {
    token: u64,
    handle: JoinHandle<()>,
}

pub struct Session {
    workspace: Workspace,
    store: FileStore,
    timer: Option<ResetTimer>,
    timeouts: UnboundedSender<u64>,
}

impl Session {
    /// Open the data directory and restore the last saved state.
    ///
    /// Returns the session and the receiver on which reset tokens arrive.
    pub fn open(config: &Config) -> Result<(Self, UnboundedReceiver<u64>)> {
        let store = FileStore::open(&config.data_dir)?;

        let calculator = Calculator::new()
            .with_angle_mode(config.angle_mode)
            .with_error_display_ms(config.error_reset_ms);
        let vault = Vault::new()
            .with_fallback_password(config.fallback_password.clone())
            .with_max_file_bytes(config.max_file_bytes);
        let mut workspace = Workspace::new(calculator, vault);

        if workspace.load(&store)? {
            tracing::info!(
                notes = workspace.notes().len(),
                history = workspace.history().len(),
                "Restored state from {}",
                store.root().display()
            );
        } else {
            tracing::info!("No saved state in {}", store.root().display());
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let session = Self {
            workspace,
            store,
            timer: None,
            timeouts: tx,
        };
        Ok((session, rx))
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn display(&self) -> &str {
        self.workspace.calculator().display()
    }

    /// The reset token currently waiting on a timer, if any.
    pub fn armed_reset(&self) -> Option<u64> {
        self.timer.as_ref().map(|t| t.token)
    }

    /// Parse and execute one input line.
    pub async fn handle_line(&mut self, line: &str) -> Result<Reply> {
        let command: Command = line.parse()?;
        self.execute(command).await
    }

    /// Feed a single input to the calculator and arm or disarm the timer.
    pub fn press(&mut self, input: Input) -> Result<Vec<Event>> {
        let before = self.workspace.history().first().map(|e| e.id);
        let events = self.workspace.press(input, now_ms());
        self.sync_timer(&events);

        if self.workspace.history().first().map(|e| e.id) != before {
            self.persist()?;
        }
        Ok(events)
    }

    /// A reset timer fired. Stale tokens are ignored by the engine.
    pub fn on_timeout(&mut self, token: u64) -> Vec<Event> {
        if self.armed_reset() == Some(token) {
            self.timer = None;
        }
        let events = self.workspace.press(Input::ErrorTimeout { token }, now_ms());
        tracing::debug!(token, changed = !events.is_empty(), "Error reset timer fired");
        events
    }

    pub async fn execute(&mut self, command: Command) -> Result<Reply> {
        let lines = match command {
            Command::Keys(inputs) => {
                let mut notices = Vec::new();
                for input in inputs {
                    let events = self.press(input)?;
                    notices.extend(render::event_notices(&events));
                }
                notices.push(render::screen(self.workspace.calculator().state()));
                notices
            }
            Command::Export(path) => {
                let json = self.workspace.export_state().to_json_pretty()?;
                tokio::fs::write(&path, json).await?;
                tracing::info!(path = %path.display(), "State exported");
                vec![format!("Exported to {}", path.display())]
            }
            Command::Import(path) => {
                let json = tokio::fs::read_to_string(&path).await?;
                self.workspace.import_state(Snapshot::from_json(&json)?)?;
                tracing::info!(path = %path.display(), "State imported");
                self.persist()?;
                vec![format!(
                    "Imported {} notes, {} history entries.",
                    self.workspace.notes().len(),
                    self.workspace.history().len()
                )]
            }
            Command::State => self.state_lines(),
            Command::Help => command::HELP.lines().map(str::to_string).collect(),
            Command::Quit => return Ok(Reply::Quit),

            Command::Notes => render::notes(self.workspace.notes()),
            Command::AddNote { title, content } => {
                let id = self.workspace.add_note(&title, &content, now_ms())?.id;
                tracing::info!(note_id = id, "Note added");
                self.persist()?;
                vec![format!("Added note #{}", id)]
            }
            Command::EditNote { id, title, content } => {
                self.workspace.edit_note(id, &title, &content, now_ms())?;
                tracing::info!(note_id = id, "Note edited");
                self.persist()?;
                vec![format!("Updated note #{}", id)]
            }
            Command::DeleteNote(id) => {
                let note = self.workspace.delete_note(id)?;
                tracing::info!(note_id = id, "Note deleted");
                self.persist()?;
                vec![format!("Deleted note #{} {}", note.id, note.title)]
            }

            Command::History => render::history(self.workspace.history()),
            Command::ClearHistory => {
                self.workspace.clear_history();
                tracing::info!("History cleared");
                self.persist()?;
                vec!["History cleared.".to_string()]
            }
            Command::ReuseHistory(id) => {
                let events = self
                    .workspace
                    .reuse_history(id, now_ms())
                    .ok_or(calcvault_engine::Error::RecordNotFound(id))?;
                self.sync_timer(&events);
                vec![render::screen(self.workspace.calculator().state())]
            }

            Command::Unlock(password) => {
                let enrolling = !self.workspace.vault().has_password();
                if let Err(e) = self.workspace.vault_mut().unlock(&password) {
                    tracing::warn!("Vault unlock rejected");
                    return Err(e.into());
                }
                tracing::info!(enrolling, "Vault unlocked");
                if enrolling {
                    self.persist()?;
                }
                vec!["Vault unlocked.".to_string()]
            }
            Command::Lock => {
                self.workspace.vault_mut().lock();
                tracing::info!("Vault locked");
                vec!["Vault locked.".to_string()]
            }
            Command::ChangePassword {
                current,
                new,
                confirm,
            } => {
                self.workspace
                    .vault_mut()
                    .change_password(&current, &new, &confirm)?;
                tracing::info!("Vault password changed");
                self.persist()?;
                vec!["Password changed.".to_string()]
            }
            Command::AddFile(path) => self.add_file(&path).await?,
            Command::ListFiles => render::files(self.workspace.vault().list_files()?),
            Command::ExportFile { id, dest } => self.export_file(id, &dest).await?,
            Command::DeleteFile(id) => {
                let file = self.workspace.delete_vault_file(&mut self.store, id)?;
                tracing::info!(file_id = id, "Vault file deleted");
                self.persist()?;
                vec![format!("Deleted {}", file.name)]
            }
        };
        Ok(Reply::Lines(lines))
    }

    async fn add_file(&mut self, path: &Path) -> Result<Vec<String>> {
        // Reject a locked vault before touching the disk.
        self.workspace.vault().list_files()?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| AppError::Command(format!("not a file: {}", path.display())))?;

        let limit = self.workspace.vault().max_file_bytes();
        let size = tokio::fs::metadata(path).await?.len();
        if size > limit {
            tracing::warn!(size, limit, "Vault file rejected before reading");
            return Err(calcvault_engine::Error::FileTooLarge {
                name,
                limit: format_file_size(limit),
            }
            .into());
        }
        let bytes = tokio::fs::read(path).await?;

        let file = self.workspace.add_vault_file(
            &mut self.store,
            &name,
            guess_mime(path),
            &bytes,
            now_ms(),
        )?;
        let line = format!("Added #{} {} ({} bytes)", file.id, file.name, file.size);
        tracing::info!(file_id = file.id, size = file.size, "Vault file added");

        self.persist()?;
        Ok(vec![line])
    }

    async fn export_file(&mut self, id: RecordId, dest: &Path) -> Result<Vec<String>> {
        let file = self.workspace.vault().get_file(id)?.clone();
        let bytes = self.workspace.vault().read_file(&self.store, id)?;
        tokio::fs::write(dest, &bytes).await?;

        let kind = FileKind::from_mime(&file.mime_type);
        tracing::debug!(file_id = id, dest = %dest.display(), "Vault file exported");
        let mut lines = vec![format!("Saved {} to {}", file.name, dest.display())];
        if !kind.is_previewable() {
            lines.push(format!("No preview for {} files.", kind.label()));
        }
        Ok(lines)
    }

    fn state_lines(&self) -> Vec<String> {
        let state = self.workspace.calculator().state();
        let mut lines = vec![
            render::screen(state),
            format!("memory: {}", format_result(state.memory())),
        ];
        lines.extend(state.recent_log().map(|l| format!("  {}", l)));
        lines
    }

    fn sync_timer(&mut self, events: &[Event]) {
        for event in events {
            match *event {
                Event::ResetScheduled { token, after_ms } => self.arm(token, after_ms),
                Event::ResetCancelled { token } => self.disarm(token),
                _ => {}
            }
        }
    }

    fn arm(&mut self, token: u64, after_ms: u64) {
        if let Some(previous) = self.timer.take() {
            previous.handle.abort();
        }
        let tx = self.timeouts.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(after_ms)).await;
            // The session may already be gone.
            let _ = tx.send(token);
        });
        tracing::debug!(token, after_ms, "Error reset armed");
        self.timer = Some(ResetTimer { token, handle });
    }

    fn disarm(&mut self, token: u64) {
        if self.armed_reset() == Some(token) {
            if let Some(timer) = self.timer.take() {
                timer.handle.abort();
                tracing::debug!(token, "Error reset cancelled");
            }
        }
    }

    fn persist(&mut self) -> Result<()> {
        self.workspace.save(&mut self.store)?;
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.handle.abort();
        }
    }
}

/// Read commands from `reader` until EOF or `:quit`, writing replies to
/// `writer` and applying reset timeouts as they arrive.
pub async fn run<R, W>(
    mut session: Session,
    mut timeouts: UnboundedReceiver<u64>,
    reader: R,
    mut writer: W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let screen = render::screen(session.workspace().calculator().state());
    write_lines(&mut writer, &[screen]).await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match session.handle_line(&line).await {
                    Ok(Reply::Lines(out)) => write_lines(&mut writer, &out).await?,
                    Ok(Reply::Quit) => break,
                    Err(e) => {
                        tracing::debug!(error = %e, "Command failed");
                        write_lines(&mut writer, &[format!("error: {}", e)]).await?;
                    }
                }
            }
            Some(token) = timeouts.recv() => {
                if !session.on_timeout(token).is_empty() {
                    let screen = render::screen(session.workspace().calculator().state());
                    write_lines(&mut writer, &[screen]).await?;
                }
            }
        }
    }

    tracing::info!("Session closed");
    Ok(())
}

async fn write_lines<W: AsyncWrite + Unpin>(writer: &mut W, lines: &[String]) -> Result<()> {
    for line in lines {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    writer.flush().await?;
    Ok(())
}

fn now_ms() -> Timestamp {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

/// MIME type from the file extension. Unknown extensions give `""`, which
/// the vault stores as `application/octet-stream`.
pub fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "json" => "application/json",
        "zip" => "application/zip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "",
    }
}
