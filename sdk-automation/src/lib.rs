#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod activity_log;
pub mod commands;
pub mod config;
pub mod diff_engine;
pub mod fakes;
pub mod generation;
pub mod generator;
pub mod git;
pub mod host;
pub mod http;
pub mod labels;
pub mod packages;
pub mod pull_requests;
pub mod reconciler;
pub mod repository;
pub mod runner;
pub mod sdk_repository;
pub mod status;
pub mod storage;
pub mod summary;
pub mod templates;
pub mod topology;

pub use activity_log::ActivityLog;
pub use commands::{CommandRunner, ProcessCommandRunner};
pub use config::{
    load_language_registry, load_specification_configuration, ConfigError, LanguageRegistry,
    PullRequestBase, SpecificationRepositoryConfiguration,
};
pub use diff_engine::CommitIdentity;
pub use generation::{
    Generation, GenerationRecord, SpecificationPullRequest, SpecificationPullRequestEvent,
};
pub use generator::{CommandGenerator, Generator};
pub use git::{GitExecutor, ProcessGit};
pub use host::{GitHubHost, HostError, SourceControlHost};
pub use http::{HttpClient, ReqwestHttpClient};
pub use labels::{compute_label_delta, Label, LabelDelta, PullRequestRole, SpecPhase};
pub use pull_requests::{PrError, PrStatus, PullRequestTarget};
pub use reconciler::Reconciler;
pub use repository::RepositoryName;
pub use runner::{load_event, Runner, RunnerConfig, RunnerError};
pub use sdk_repository::Services;
pub use status::AutomationStatus;
pub use storage::{BlobLayout, BlobStorage, FilesystemBlobStorage, InMemoryBlobStorage};
pub use summary::{ProcessingResult, RunSummary};
pub use templates::{TemplateError, TemplateRenderer};
pub use topology::RepositoryTopology;
