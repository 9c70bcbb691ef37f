//! MCP result and parameter types.
//!
//! These are the protocol-boundary shapes the dispatcher produces and
//! consumes. Field names follow the MCP wire format (`camelCase`, `_meta`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::mcp::protocol::{MCP_PROTOCOL_VERSION, SERVER_NAME};

/// Ordered `_meta` mapping.
pub type Meta = Map<String, Value>;

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if requires a predicate fn(&T) -> bool, so we must take &bool here
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    pub tools: ListCapabilities,
    /// Resource-related capabilities.
    pub resources: ResourceCapabilities,
}

/// Capabilities of a fixed list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListCapabilities {
    /// Whether the list can change during the session.
    #[serde(rename = "listChanged", skip_serializing_if = "is_false")]
    pub list_changed: bool,
}

/// Resource-specific capabilities.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCapabilities {
    /// Whether clients may subscribe to resource updates.
    #[serde(skip_serializing_if = "is_false")]
    pub subscribe: bool,
    /// Whether the resource list can change during the session.
    #[serde(skip_serializing_if = "is_false")]
    pub list_changed: bool,
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Client information received during initialisation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for the initialize request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client.
    pub protocol_version: String,
    /// Client capabilities.
    #[serde(default)]
    pub capabilities: Value,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// Result of the initialize request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Negotiated protocol version.
    pub protocol_version: String,
    /// What this server supports.
    pub capabilities: ServerCapabilities,
    /// Who this server is.
    pub server_info: ServerInfo,
}

impl InitializeResult {
    /// Builds the result for the given server.
    #[must_use]
    pub fn new(server_info: ServerInfo) -> Self {
        Self {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities::default(),
            server_info,
        }
    }
}

/// A tool entry in the tools/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Display title.
    pub title: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
    /// Tool invocation metadata.
    #[serde(rename = "_meta")]
    pub meta: Meta,
}

/// A resource entry in the resources/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    /// Resource name.
    pub name: String,
    /// Display title.
    pub title: String,
    /// Concrete resource URI.
    pub uri: String,
    /// Human-readable description.
    pub description: String,
    /// Content type.
    pub mime_type: String,
    /// Resource presentation metadata; omitted when empty.
    #[serde(rename = "_meta", skip_serializing_if = "Map::is_empty")]
    pub meta: Meta,
}

/// A template entry in the resources/templates/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplateDefinition {
    /// Template name.
    pub name: String,
    /// Display title.
    pub title: String,
    /// URI template.
    pub uri_template: String,
    /// Human-readable description.
    pub description: String,
    /// Content type.
    pub mime_type: String,
    /// Resource presentation metadata; omitted when empty.
    #[serde(rename = "_meta", skip_serializing_if = "Map::is_empty")]
    pub meta: Meta,
}

/// Result of the tools/list request.
#[derive(Debug, Clone, Serialize)]
pub struct ListToolsResult {
    /// Every tool, in catalog order.
    pub tools: Vec<ToolDefinition>,
}

/// Result of the resources/list request.
#[derive(Debug, Clone, Serialize)]
pub struct ListResourcesResult {
    /// Every widget template.
    pub resources: Vec<ResourceDefinition>,
}

/// Result of the resources/templates/list request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResourceTemplatesResult {
    /// Every widget template.
    pub resource_templates: Vec<ResourceTemplateDefinition>,
}

/// Text contents of a resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    /// Resource URI.
    pub uri: String,
    /// Content type.
    pub mime_type: String,
    /// The resource text.
    pub text: String,
    /// Display title (embedded resources only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Resource presentation metadata; omitted when empty.
    #[serde(rename = "_meta", skip_serializing_if = "Map::is_empty")]
    pub meta: Meta,
}

/// Result of the resources/read request.
#[derive(Debug, Clone, Serialize)]
pub struct ReadResourceResult {
    /// Zero or one entries.
    pub contents: Vec<ResourceContents>,
    /// Error note for unknown resources.
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

/// Parameters for the resources/read request.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadResourceParams {
    /// URI of the resource to read.
    pub uri: String,
}

/// Parameters for tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
    /// An embedded resource.
    Resource {
        /// The resource contents.
        resource: ResourceContents,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Machine-readable result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    /// Tool and widget metadata.
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    /// Whether the tool call resulted in an error.
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(text: impl Into<String>, structured_content: Value, meta: Meta) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            structured_content: Some(structured_content),
            meta: Some(meta),
            is_error: false,
        }
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            structured_content: None,
            meta: None,
            is_error: true,
        }
    }

    /// Returns the text of the first content item, if it is text.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        match self.content.first() {
            Some(ToolContent::Text { text }) => Some(text),
            _ => None,
        }
    }
}
