//! Pull request error types.

use crate::host::HostError;
use crate::templates::TemplateError;
use thiserror::Error;

/// Errors that can occur during PR operations.
#[derive(Debug, Error)]
pub enum PrError {
    /// Source control host error.
    #[error(transparent)]
    Host(#[from] HostError),

    /// Body or comment rendering failed.
    #[error(transparent)]
    Template(#[from] TemplateError),
}
