//! The password-gated file vault.
//!
//! The gate is a UI deterrent only. Passwords are stored and compared in
//! plain text and file bytes are kept unencrypted in the blob store; do not
//! treat an unlocked check as an access-control decision.

use crate::storage::BlobStore;
use crate::{error::Result, Error, IdClock, OpenedFile, RecordId, Timestamp, VaultFile};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Default per-file size limit: 500 MiB.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 500 * 1024 * 1024;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// The persisted part of the vault.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultState {
    /// The stored password, once one has been set
    pub password: Option<String>,
    /// File metadata in upload order
    pub files: Vec<VaultFile>,
}

/// Vault metadata plus the lock gate.
#[derive(Debug, Clone)]
pub struct Vault {
    state: VaultState,
    fallback_password: Option<String>,
    max_file_bytes: u64,
    unlocked: bool,
}

impl Default for Vault {
    fn default() -> Self {
        Self::new()
    }
}

impl Vault {
    /// Create an empty, locked vault with no password set.
    pub fn new() -> Self {
        Self::from_state(VaultState::default())
    }

    /// Restore a locked vault from persisted state.
    pub fn from_state(state: VaultState) -> Self {
        Self {
            state,
            fallback_password: None,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            unlocked: false,
        }
    }

    /// A password that is always accepted, in addition to the stored one.
    pub fn with_fallback_password(mut self, password: Option<String>) -> Self {
        self.fallback_password = password.filter(|p| !p.is_empty());
        self
    }

    pub fn with_max_file_bytes(mut self, limit: u64) -> Self {
        self.max_file_bytes = limit;
        self
    }

    pub fn state(&self) -> &VaultState {
        &self.state
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn has_password(&self) -> bool {
        self.state.password.is_some()
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }

    pub fn fallback_password(&self) -> Option<&str> {
        self.fallback_password.as_deref()
    }

    /// Open the gate.
    ///
    /// Accepts the stored password or the fallback. With no stored password
    /// the accepted password is adopted: the fallback if one is configured,
    /// otherwise whatever non-empty password is entered first.
    pub fn unlock(&mut self, password: &str) -> Result<()> {
        if password.is_empty() {
            return Err(Error::IncorrectPassword);
        }

        let accepted = match &self.state.password {
            Some(stored) => stored == password || self.is_fallback(password),
            None => match &self.fallback_password {
                Some(fallback) => fallback == password,
                None => true,
            },
        };
        if !accepted {
            return Err(Error::IncorrectPassword);
        }

        if self.state.password.is_none() {
            self.state.password = Some(password.to_string());
        }
        self.unlocked = true;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.unlocked = false;
    }

    /// Replace the stored password.
    ///
    /// `current` must match the stored password (or the fallback); with no
    /// stored password the fallback is the current one.
    pub fn change_password(&mut self, current: &str, new: &str, confirm: &str) -> Result<()> {
        let current_ok = match &self.state.password {
            Some(stored) => stored == current,
            None => false,
        } || self.is_fallback(current);
        if !current_ok {
            return Err(Error::IncorrectPassword);
        }
        if new.is_empty() {
            return Err(Error::EmptyPassword);
        }
        if new != confirm {
            return Err(Error::PasswordMismatch);
        }

        self.state.password = Some(new.to_string());
        Ok(())
    }

    /// Store a file. The bytes go to `blobs`, the metadata stays here.
    pub fn add_file(
        &mut self,
        blobs: &mut dyn BlobStore,
        ids: &mut IdClock,
        name: &str,
        mime_type: &str,
        bytes: &[u8],
        now: Timestamp,
    ) -> Result<&VaultFile> {
        self.ensure_unlocked()?;

        let size = bytes.len() as u64;
        if size > self.max_file_bytes {
            return Err(Error::FileTooLarge {
                name: name.to_string(),
                limit: format_file_size(self.max_file_bytes),
            });
        }

        let id = ids.next(now);
        blobs.put(id, bytes)?;

        let mime_type = if mime_type.is_empty() {
            "application/octet-stream"
        } else {
            mime_type
        };
        self.state.files.push(VaultFile {
            id,
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size,
            upload_date: now,
        });
        Ok(&self.state.files[self.state.files.len() - 1])
    }

    pub fn get_file(&self, id: RecordId) -> Result<&VaultFile> {
        self.ensure_unlocked()?;
        self.state
            .files
            .iter()
            .find(|f| f.id == id)
            .ok_or(Error::RecordNotFound(id))
    }

    /// Metadata plus the bytes as a `data:<mime>;base64,...` URL.
    pub fn open_file(&self, blobs: &dyn BlobStore, id: RecordId) -> Result<OpenedFile> {
        let file = self.get_file(id)?.clone();
        let bytes = blobs.get(id)?;
        let payload = data_url(&file.mime_type, &bytes);
        Ok(OpenedFile { file, payload })
    }

    /// Raw bytes of a stored file.
    pub fn read_file(&self, blobs: &dyn BlobStore, id: RecordId) -> Result<Vec<u8>> {
        self.get_file(id)?;
        blobs.get(id)
    }

    pub fn delete_file(&mut self, blobs: &mut dyn BlobStore, id: RecordId) -> Result<VaultFile> {
        self.ensure_unlocked()?;
        let index = self
            .state
            .files
            .iter()
            .position(|f| f.id == id)
            .ok_or(Error::RecordNotFound(id))?;
        blobs.delete(id)?;
        Ok(self.state.files.remove(index))
    }

    /// All files in upload order.
    pub fn list_files(&self) -> Result<&[VaultFile]> {
        self.ensure_unlocked()?;
        Ok(&self.state.files)
    }

    fn ensure_unlocked(&self) -> Result<()> {
        if self.unlocked {
            Ok(())
        } else {
            Err(Error::VaultLocked)
        }
    }

    fn is_fallback(&self, password: &str) -> bool {
        self.fallback_password.as_deref() == Some(password)
    }
}

/// Encode bytes as a `data:` URL.
pub fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Human readable size in base 1024 with at most two decimals:
/// `0 Bytes`, `1.5 KB`, `500 MB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

/// Broad category of a file, derived from its MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Video,
    Audio,
    Pdf,
    Document,
    Spreadsheet,
    Text,
    Archive,
    Other,
}

impl FileKind {
    pub fn from_mime(mime_type: &str) -> Self {
        let mime = mime_type.to_ascii_lowercase();
        if mime.starts_with("image/") {
            FileKind::Image
        } else if mime.starts_with("video/") {
            FileKind::Video
        } else if mime.starts_with("audio/") {
            FileKind::Audio
        } else if mime.contains("pdf") {
            FileKind::Pdf
        } else if mime.contains("spreadsheet") || mime.contains("excel") {
            FileKind::Spreadsheet
        } else if mime.contains("document") || mime.contains("word") {
            FileKind::Document
        } else if mime.contains("text") {
            FileKind::Text
        } else if mime.contains("zip") || mime.contains("archive") {
            FileKind::Archive
        } else {
            FileKind::Other
        }
    }

    /// Whether a viewer can show the file inline.
    pub fn is_previewable(self) -> bool {
        matches!(
            self,
            FileKind::Image | FileKind::Video | FileKind::Audio | FileKind::Pdf | FileKind::Text
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Video => "video",
            FileKind::Audio => "audio",
            FileKind::Pdf => "pdf",
            FileKind::Document => "document",
            FileKind::Spreadsheet => "spreadsheet",
            FileKind::Text => "text",
            FileKind::Archive => "archive",
            FileKind::Other => "file",
        }
    }
}
