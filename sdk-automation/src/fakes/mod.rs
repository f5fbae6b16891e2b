//! In-memory capability implementations for tests.
//!
//! Each fake records what it was asked to do and can be scripted to return
//! canned output or fail, so the whole engine can run without git, GitHub or
//! a network.

mod commands;
mod git;
mod host;
mod http;

pub use commands::{RecordingCommandRunner, ScriptedGenerator};
pub use git::RecordingGitExecutor;
pub use host::InMemoryHost;
pub use http::StaticHttpClient;
