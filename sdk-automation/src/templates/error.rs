//! Template rendering error types.

/// Template rendering error.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Handlebars rendering error.
    #[error("Template rendering error: {0}")]
    RenderError(#[from] handlebars::RenderError),

    /// Template registration error.
    #[error("Template registration error: {0}")]
    RegistrationError(#[from] handlebars::TemplateError),

    /// Template data could not be serialized.
    #[error("Template data serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A generated branch name is not a valid git reference.
    #[error("Invalid branch name '{name}': {message}")]
    InvalidBranchName { name: String, message: String },
}
