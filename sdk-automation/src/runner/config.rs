//! Runner configuration.

use crate::diff_engine::CommitIdentity;
use std::path::{Path, PathBuf};

/// Configuration for handling specification pull request events.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Folder SDK repositories are cloned below, one numbered subfolder each.
    working_folder: PathBuf,
    /// GitHub token used for clones and pushes.
    token: Option<String>,
    /// Maximum SDK repositories processed at once.
    concurrency: usize,
    /// Prefix all blob paths are placed below.
    blob_prefix: String,
    /// Whether clone folders survive processing.
    keep_clones: bool,
    /// Identity generated commits are authored with.
    identity: CommitIdentity,
}

impl RunnerConfig {
    /// Creates a new configuration for a run.
    ///
    /// A concurrency of zero is treated as one.
    pub fn new(working_folder: PathBuf, token: Option<String>, concurrency: usize) -> Self {
        Self {
            working_folder,
            token: token.filter(|t| !t.is_empty()),
            concurrency: concurrency.max(1),
            blob_prefix: String::new(),
            keep_clones: false,
            identity: CommitIdentity::default(),
        }
    }

    /// Sets the blob prefix.
    pub fn with_blob_prefix(mut self, blob_prefix: impl Into<String>) -> Self {
        self.blob_prefix = blob_prefix.into();
        self
    }

    /// Keeps clone folders after processing.
    pub fn with_keep_clones(mut self, keep_clones: bool) -> Self {
        self.keep_clones = keep_clones;
        self
    }

    /// Sets the commit identity.
    pub fn with_identity(mut self, identity: CommitIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Returns the working folder.
    pub fn working_folder(&self) -> &Path {
        &self.working_folder
    }

    /// Returns the configured GitHub token.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the max concurrent SDK repositories.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns the blob prefix.
    pub fn blob_prefix(&self) -> &str {
        &self.blob_prefix
    }

    /// Returns whether clone folders are kept.
    pub fn keep_clones(&self) -> bool {
        self.keep_clones
    }

    /// Returns the commit identity.
    pub fn identity(&self) -> &CommitIdentity {
        &self.identity
    }
}
