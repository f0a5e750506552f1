//! CalcVault terminal app.
//!
//! Drives a [`calcvault_engine::Workspace`] from line-based input, keeps its
//! state in a data directory, and runs the calculator's error reset timer.

pub mod command;
pub mod config;
pub mod error;
pub mod render;
pub mod session;
pub mod storage;

pub use config::Config;
pub use error::{AppError, Result};
pub use session::{run, Reply, Session};
