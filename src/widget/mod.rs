//! Widgets: schema-validated tools paired with a compiled HTML template.
//!
//! A [`Widget`] supplies the variant behaviour (its [`WidgetSpec`] and an async
//! `execute`). Binding a widget to the [`Artifact`] produced by the UI build
//! step yields an [`ExecutionUnit`], the immutable value stored in the
//! [`Catalog`](crate::catalog::Catalog).
//!
//! # Modules
//!
//! - [`schema`] — input schemas and argument validation
//! - [`meta`] — `_meta` composition for listings and call results

pub mod meta;
pub mod schema;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ToolError;
pub use schema::{Arguments, FieldError, FieldKind, FieldSpec, InputSchema, ValidationError};

/// MIME type of every widget template.
pub const WIDGET_MIME_TYPE: &str = "text/html+skybridge";

/// Returns the resource URI of the widget with the given identifier.
#[must_use]
pub fn template_uri(identifier: &str) -> String {
    format!("ui://widget/{identifier}.html")
}

/// Content-security-policy allow-lists for a widget's iframe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetCsp {
    /// Origins the widget may fetch from.
    pub connect_domains: Vec<String>,
    /// Origins the widget may load scripts, styles and images from.
    pub resource_domains: Vec<String>,
}

/// Static description of a widget: identity, schema and presentation hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetSpec {
    /// Tool name; also names the template URI.
    pub identifier: String,
    /// Display title.
    pub title: String,
    /// Tool description. Listings fall back to the title when empty.
    pub description: String,
    /// Accepted arguments.
    pub input_schema: InputSchema,
    /// Status line shown while the tool runs.
    pub invoking: String,
    /// Status line shown once the tool has run; also the call result text.
    pub invoked: String,
    /// Whether the widget may call tools itself.
    pub widget_accessible: bool,
    /// Long-form description for the model; resource metadata only.
    pub widget_description: Option<String>,
    /// Content-security-policy domains.
    pub csp: Option<WidgetCsp>,
    /// Whether the host should draw a border around the widget.
    pub prefers_border: bool,
    /// Whether the tool only reads data.
    pub read_only: bool,
}

impl WidgetSpec {
    /// Creates a spec with default hints and no inputs.
    #[must_use]
    pub fn new(identifier: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            description: String::new(),
            input_schema: InputSchema::empty(),
            invoking: "Processing...".to_string(),
            invoked: "Completed".to_string(),
            widget_accessible: true,
            widget_description: None,
            csp: None,
            prefers_border: false,
            read_only: true,
        }
    }

    /// Sets the tool description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the input schema.
    #[must_use]
    pub fn input_schema(mut self, schema: InputSchema) -> Self {
        self.input_schema = schema;
        self
    }

    /// Sets the status lines shown before and after invocation.
    #[must_use]
    pub fn invocation(mut self, invoking: impl Into<String>, invoked: impl Into<String>) -> Self {
        self.invoking = invoking.into();
        self.invoked = invoked.into();
        self
    }

    /// Sets the content-security-policy domains.
    #[must_use]
    pub fn csp<C, R>(mut self, connect_domains: C, resource_domains: R) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        self.csp = Some(WidgetCsp {
            connect_domains: connect_domains.into_iter().map(Into::into).collect(),
            resource_domains: resource_domains.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Asks the host to draw a border around the widget.
    #[must_use]
    pub fn prefers_border(mut self) -> Self {
        self.prefers_border = true;
        self
    }

    /// Sets the long-form widget description.
    #[must_use]
    pub fn widget_description(mut self, description: impl Into<String>) -> Self {
        self.widget_description = Some(description.into());
        self
    }

    /// Sets whether the widget may call tools itself.
    #[must_use]
    pub fn widget_accessible(mut self, accessible: bool) -> Self {
        self.widget_accessible = accessible;
        self
    }

    /// Sets the read-only annotation.
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

/// Variant behaviour of a tool.
#[async_trait]
pub trait Widget: Send + Sync {
    /// The widget's static description.
    fn spec(&self) -> &WidgetSpec;

    /// Runs the tool with validated arguments.
    ///
    /// The returned value becomes the call's `structuredContent`.
    async fn execute(&self, args: Arguments) -> Result<Value, ToolError>;
}

/// Compiled widget markup produced by the UI build step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Widget name the build step compiled.
    pub name: String,
    /// Four lowercase hex characters identifying the build.
    pub content_hash: String,
    /// The HTML document.
    pub markup: Arc<str>,
}

impl Artifact {
    /// Creates an artifact.
    #[must_use]
    pub fn new(name: impl Into<String>, content_hash: impl Into<String>, markup: &str) -> Self {
        Self {
            name: name.into(),
            content_hash: content_hash.into(),
            markup: Arc::from(markup),
        }
    }
}

/// A widget bound to its artifact.
///
/// Immutable after construction and cheap to share between tasks.
pub struct ExecutionUnit {
    widget: Arc<dyn Widget>,
    template_uri: String,
    artifact: Artifact,
}

impl ExecutionUnit {
    /// Binds a widget to its compiled artifact.
    #[must_use]
    pub fn new(widget: Arc<dyn Widget>, artifact: Artifact) -> Self {
        let template_uri = template_uri(&widget.spec().identifier);
        Self {
            widget,
            template_uri,
            artifact,
        }
    }

    /// The widget's static description.
    #[must_use]
    pub fn spec(&self) -> &WidgetSpec {
        self.widget.spec()
    }

    /// The unique tool name.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.spec().identifier
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.spec().title
    }

    /// Description for listings, falling back to the title.
    #[must_use]
    pub fn display_description(&self) -> &str {
        let spec = self.spec();
        if spec.description.is_empty() {
            &spec.title
        } else {
            &spec.description
        }
    }

    /// `ui://widget/{identifier}.html`.
    #[must_use]
    pub fn template_uri(&self) -> &str {
        &self.template_uri
    }

    /// The bound artifact.
    #[must_use]
    pub const fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    /// Validates raw arguments against the widget's schema.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every failing field.
    pub fn validate(&self, raw: &Value) -> Result<Arguments, ValidationError> {
        self.spec().input_schema.validate(raw)
    }

    /// Runs the widget.
    ///
    /// # Errors
    ///
    /// Propagates the widget's [`ToolError`].
    pub async fn execute(&self, args: Arguments) -> Result<Value, ToolError> {
        self.widget.execute(args).await
    }
}

impl fmt::Debug for ExecutionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionUnit")
            .field("identifier", &self.identifier())
            .field("template_uri", &self.template_uri)
            .field("artifact", &self.artifact.name)
            .field("hash", &self.artifact.content_hash)
            .finish()
    }
}
