//! SQLite-backed persistence for leads, projects, chat memory, and the
//! Telegram identity mapping.
//!
//! Every operation takes an explicit caller user id; the store itself has no
//! ambient session state, so privileged paths (Telegram webhook, sync) scope
//! their queries the same way ordinary ones do.

mod db;
mod leads;
mod memory;
mod projects;
mod users;

pub use db::Store;
pub use projects::{AnalysisUpdate, ProjectDetailsUpdate};
