//! Template renderer.

use super::TemplateError;
use handlebars::{no_escape, Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde::Serialize;
use serde_json::{json, Value};

/// Marks the engine's installation-instructions comment on a generation PR.
pub const INSTRUCTIONS_COMMENT_MARKER: &str = "<!-- sdk-automation:instructions -->";

const DEFAULT_INSTRUCTIONS_TEMPLATE: &str = r#"# Installation instructions for {{package_name}}

{{#if artifacts}}
You can install the package `{{package_name}}` generated for this pull request from the following {{language}} artifacts:

{{#each artifacts}}
- [{{name}}]({{url}})
{{/each}}
{{else}}
No installable artifacts were produced for `{{package_name}}`.
{{/if}}"#;

const GENERATION_PR_BODY_TEMPLATE: &str = r#"Created to sync {{specification_url}}.
{{#if instructions}}

{{instructions}}
{{/if}}"#;

const INSTRUCTIONS_COMMENT_TEMPLATE: &str = r#"{{marker}}
{{instructions}}
{{#each integration_links}}

Integration pull request: {{this}}
{{/each}}"#;

const COMMENT_TEMPLATE: &str = r#"<h3>SDK generation for <a href="{{specification_url}}">#{{specification_number}}</a> (iteration {{iteration}})</h3>
<ul>
{{#each sdk_repositories}}
<li>{{#if (eq status "succeeded")}}&#x2705;{{else}}{{#if (eq status "warning")}}&#x26A0;&#xFE0F;{{else}}{{#if (eq status "failed")}}&#x274C;{{else}}&#x231B;{{/if}}{{/if}}{{/if}} <b>{{main_repository}}</b> ({{language}}): {{status}}
{{#if packages}}
<ul>
{{#each packages}}
<li>{{name}}: {{status}}{{#if pull_request_url}} - <a href="{{pull_request_url}}">pull request</a>{{/if}}{{#if instructions_url}} - <a href="{{instructions_url}}">installation instructions</a>{{/if}}
{{#each artifacts}}
  <a href="{{url}}">{{name}}</a>
{{/each}}
</li>
{{/each}}
</ul>
{{/if}}
</li>
{{/each}}
</ul>"#;

/// Creates a configured Handlebars registry with custom helpers.
///
/// The registry is configured with:
/// - No HTML escaping (for markdown output)
/// - Strict mode (catches missing variables)
/// - `eq` helper for equality comparisons
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(no_escape);
    hbs.set_strict_mode(true);
    hbs.register_helper("eq", Box::new(eq_helper));
    hbs
}

/// Usage: `{{#if (eq variable "value")}}...{{/if}}`
fn eq_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param1 = h.param(0).and_then(|v| v.value().as_str());
    let param2 = h.param(1).and_then(|v| v.value().as_str());

    let result = match (param1, param2) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };

    out.write(if result { "true" } else { "" })?;
    Ok(())
}

/// An uploaded artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct ArtifactLink {
    /// File name.
    pub name: String,
    /// Download URL.
    pub url: String,
}

/// Renders pull request bodies, installation instructions and comments.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Creates a new template renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlebars: create_handlebars_registry(),
        }
    }

    /// Renders the installation instructions for a package.
    ///
    /// # Arguments
    ///
    /// * `template` - Language-specific template, or `None` for the generic one
    /// * `language` - Language name
    /// * `package_name` - Package name
    /// * `artifacts` - Uploaded artifacts
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_instructions(
        &self,
        template: Option<&str>,
        language: &str,
        package_name: &str,
        artifacts: &[ArtifactLink],
    ) -> Result<String, TemplateError> {
        let data = json!({
            "language": language,
            "package_name": package_name,
            "artifacts": artifacts,
        });
        self.render_template(template.unwrap_or(DEFAULT_INSTRUCTIONS_TEMPLATE), &data)
    }

    /// Renders the body of a generation pull request.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_generation_pr_body(
        &self,
        specification_url: &str,
        instructions: Option<&str>,
    ) -> Result<String, TemplateError> {
        let data = json!({
            "specification_url": specification_url,
            "instructions": instructions.unwrap_or(""),
        });
        self.render_template(GENERATION_PR_BODY_TEMPLATE, &data)
    }

    /// Renders the marked instructions comment of a generation pull request.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_instructions_comment(
        &self,
        instructions: &str,
        integration_links: &[String],
    ) -> Result<String, TemplateError> {
        let data = json!({
            "marker": INSTRUCTIONS_COMMENT_MARKER,
            "instructions": instructions,
            "integration_links": integration_links,
        });
        self.render_template(INSTRUCTIONS_COMMENT_TEMPLATE, &data)
    }

    /// Renders the per-iteration `comment.html`.
    ///
    /// # Errors
    ///
    /// Returns an error if the view cannot be serialized or rendered.
    pub fn render_comment<T: Serialize>(&self, view: &T) -> Result<String, TemplateError> {
        let data = serde_json::to_value(view)?;
        self.render_template(COMMENT_TEMPLATE, &data)
    }

    fn render_template(&self, template: &str, data: &Value) -> Result<String, TemplateError> {
        Ok(self.handlebars.render_template(template, data)?)
    }
}
