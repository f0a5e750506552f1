//! # CalcVault Engine
//!
//! A deterministic scientific calculator engine with local record stores.
//!
//! This crate provides the core logic of CalcVault: the calculator state
//! machine, its numeric formatting, and the notes, history and vault stores
//! that sit next to it. Hosts (the terminal app, a WebView shell through
//! [`ffi`]) feed inputs in and render the events that come out.
//!
//! ## Design Principles
//!
//! - **No IO**: Engine has no knowledge of files, terminals, or timers
//! - **Deterministic**: Same state and input always produce the same output
//!   (the random function draws from an injected source)
//! - **Testable**: Pure logic, no mocks needed
//! - **Portable**: Runs anywhere Rust runs (native, WASM, embedded)
//!
//! ## Core Concepts
//!
//! ### Calculator
//!
//! The [`CalculatorState`] holds the operand being typed, a pending operand
//! and at most one pending [`BinaryOperator`]. Evaluation is immediate and
//! strictly left to right: `2 + 3 × 4 =` is `20`. Every keystroke is an
//! [`Input`]; every visible change is an [`Event`].
//!
//! ### Errors and the reset timer
//!
//! A failed calculation shows `"Error"` and emits
//! [`Event::ResetScheduled`]. The host waits and feeds back
//! [`Input::ErrorTimeout`] with the same token; a stale token is ignored,
//! and any user input cancels the reset and clears first.
//!
//! ### Stores
//!
//! - [`Notebook`] - notes, newest first
//! - [`HistoryLog`] - the last 50 calculation lines
//! - [`Vault`] - file metadata behind a password gate (a UI deterrent, not
//!   a security boundary)
//!
//! Ids come from a shared [`IdClock`].
//!
//! ## Quick Start
//!
//! ```rust
//! use calcvault_engine::{BinaryOperator, Calculator, Input};
//!
//! let mut calc = Calculator::seeded(7);
//! calc.apply(Input::digit(3));
//! calc.apply(Input::operator(BinaryOperator::Add));
//! calc.apply(Input::digit(4));
//! calc.apply(Input::operator(BinaryOperator::Add));
//! assert_eq!(calc.display(), "7");
//!
//! calc.apply(Input::digit(5));
//! calc.apply(Input::Calculate);
//! assert_eq!(calc.display(), "12");
//! ```
//!
//! ## Persistence
//!
//! Use [`Workspace::export_state`] and [`Workspace::import_state`] with
//! [`Snapshot`], or [`Workspace::save`] / [`Workspace::load`] against any
//! [`KeyValueStore`]. Vault file bytes go through a [`BlobStore`].

pub mod calculator;
pub mod error;
pub mod event;
pub mod ffi;
pub mod format;
pub mod function;
pub mod history;
pub mod ids;
pub mod input;
pub mod notes;
pub mod operator;
pub mod record;
pub mod snapshot;
pub mod storage;
pub mod vault;
pub mod workspace;

// Re-export main types at crate root
pub use calculator::{step, Calculator, CalculatorState, RECENT_LOG_CAPACITY};
pub use error::{CalcError, Error};
pub use event::Event;
pub use format::format_result;
pub use function::{AngleMode, UnaryFunction};
pub use history::{HistoryLog, HISTORY_CAPACITY};
pub use ids::IdClock;
pub use input::{Constant, Input, MemoryAction};
pub use notes::Notebook;
pub use operator::{BinaryOperator, Paren};
pub use record::{HistoryEntry, Note, OpenedFile, VaultFile};
pub use snapshot::{Snapshot, SNAPSHOT_FORMAT_VERSION, SNAPSHOT_KEY};
pub use storage::{BlobStore, KeyValueStore, MemoryBlobStore, MemoryStore};
pub use vault::{format_file_size, FileKind, Vault, VaultState, DEFAULT_MAX_FILE_BYTES};
pub use workspace::Workspace;

/// Type aliases for clarity
pub type RecordId = u64;
pub type Timestamp = u64;
