//! Request dispatch.
//!
//! The [`Dispatcher`] owns the mapping from MCP methods to handlers and is the
//! single integration surface for transports. It holds nothing but a shared,
//! immutable [`Catalog`], so every method takes `&self` and any number of
//! requests may be in flight at once.
//!
//! Per-request failures (unknown tool, bad arguments, a tool that errors) are
//! turned into well-formed results here and never escape to the transport.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;
use serde_json::{json, Value};

use crate::catalog::Catalog;
use crate::mcp::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, Reply};
use crate::mcp::types::{
    InitializeParams, InitializeResult, ListResourceTemplatesResult, ListResourcesResult,
    ListToolsResult, Meta, ReadResourceParams, ReadResourceResult, ResourceDefinition,
    ResourceTemplateDefinition, ServerInfo, ToolCallParams, ToolCallResult, ToolDefinition,
};
use crate::widget::meta::{call_result_meta, resource_contents, resource_meta, tool_meta};
use crate::widget::{ExecutionUnit, WIDGET_MIME_TYPE};

/// Routes MCP requests to the catalog.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    catalog: Arc<Catalog>,
    server_info: ServerInfo,
}

impl Dispatcher {
    /// Creates a dispatcher over `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            server_info: ServerInfo::default(),
        }
    }

    /// The catalog being served.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Answers a JSON-RPC request.
    ///
    /// Lifecycle gating (initialise before use) is the transport's concern;
    /// this method answers any known method at any time.
    pub async fn handle_request(&self, req: &JsonRpcRequest) -> Reply {
        tracing::debug!(id = %req.id, method = %req.method, "Dispatching request");

        match req.method.as_str() {
            "initialize" => self.handle_initialize(req),
            "ping" => Ok(JsonRpcResponse::success(req.id.clone(), json!({}))),
            "tools/list" => respond(
                req,
                &ListToolsResult {
                    tools: self.list_tools(),
                },
            ),
            "resources/list" => respond(
                req,
                &ListResourcesResult {
                    resources: self.list_resources(),
                },
            ),
            "resources/templates/list" => respond(
                req,
                &ListResourceTemplatesResult {
                    resource_templates: self.list_resource_templates(),
                },
            ),
            "resources/read" => {
                let params: ReadResourceParams = req.parse_params("resource read")?;
                respond(req, &self.read_resource(&params.uri))
            }
            "tools/call" => {
                let params: ToolCallParams = req.parse_params("tool call")?;
                let result = self.call_tool(&params.name, &params.arguments).await;
                respond(req, &result)
            }
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(&self, req: &JsonRpcRequest) -> Reply {
        let params: InitializeParams = req.parse_params("initialize")?;
        if let Some(ref client) = params.client_info {
            tracing::info!(
                client = %client.name,
                client_version = client.version.as_deref().unwrap_or("unknown"),
                requested_version = %params.protocol_version,
                "Client initialising"
            );
        }
        respond(req, &self.initialize_result())
    }

    /// The initialize result advertised by this server.
    #[must_use]
    pub fn initialize_result(&self) -> InitializeResult {
        InitializeResult::new(self.server_info.clone())
    }

    /// Lists every tool in catalog order.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.catalog
            .all()
            .map(|unit| ToolDefinition {
                name: unit.identifier().to_string(),
                title: unit.title().to_string(),
                description: unit.display_description().to_string(),
                input_schema: unit.spec().input_schema.to_json_schema(),
                meta: tool_meta(unit),
            })
            .collect()
    }

    /// Lists every widget template as a concrete resource.
    #[must_use]
    pub fn list_resources(&self) -> Vec<ResourceDefinition> {
        self.catalog
            .all()
            .map(|unit| ResourceDefinition {
                name: unit.title().to_string(),
                title: unit.title().to_string(),
                uri: unit.template_uri().to_string(),
                description: resource_description(unit),
                mime_type: WIDGET_MIME_TYPE.to_string(),
                meta: resource_meta(unit),
            })
            .collect()
    }

    /// Lists every widget template as a resource template.
    ///
    /// Templates carry no parameters, so each resolves to the same URI as its
    /// resource listing.
    #[must_use]
    pub fn list_resource_templates(&self) -> Vec<ResourceTemplateDefinition> {
        self.catalog
            .all()
            .map(|unit| ResourceTemplateDefinition {
                name: unit.title().to_string(),
                title: unit.title().to_string(),
                uri_template: unit.template_uri().to_string(),
                description: resource_description(unit),
                mime_type: WIDGET_MIME_TYPE.to_string(),
                meta: resource_meta(unit),
            })
            .collect()
    }

    /// Reads a widget template by URI.
    ///
    /// Unknown URIs yield an empty content list with an error note rather
    /// than a protocol error.
    #[must_use]
    pub fn read_resource(&self, uri: &str) -> ReadResourceResult {
        let Some(unit) = self.catalog.by_uri(uri) else {
            tracing::warn!(uri = %uri, "Unknown resource requested");
            let mut meta = Meta::new();
            meta.insert(
                "error".to_string(),
                Value::String(format!("Unknown resource: {uri}")),
            );
            return ReadResourceResult {
                contents: Vec::new(),
                meta: Some(meta),
            };
        };

        ReadResourceResult {
            contents: vec![resource_contents(unit, None)],
            meta: None,
        }
    }

    /// Invokes a tool.
    ///
    /// The arguments are validated before the tool runs; a validation failure
    /// means the tool is never executed. Every failure, a panicking tool
    /// included, is reported as an `isError` result without
    /// `structuredContent` or `_meta`.
    pub async fn call_tool(&self, name: &str, arguments: &Value) -> ToolCallResult {
        let Some(unit) = self.catalog.by_id(name) else {
            tracing::warn!(tool = %name, "Unknown tool requested");
            return ToolCallResult::error(format!("Unknown tool: {name}"));
        };

        let args = match unit.validate(arguments) {
            Ok(args) => args,
            Err(e) => {
                tracing::info!(tool = %name, error = %e, "Rejected tool arguments");
                return ToolCallResult::error(format!("Validation error: {}", e.to_json()));
            }
        };

        let outcome = AssertUnwindSafe(unit.execute(args)).catch_unwind().await;
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(panic) => {
                let reason = panic_message(&*panic);
                tracing::error!(tool = %name, panic = %reason, "Tool panicked");
                return ToolCallResult::error(format!("Error: tool panicked: {reason}"));
            }
        };

        match outcome {
            Ok(structured) => {
                tracing::debug!(tool = %name, "Tool call succeeded");
                ToolCallResult::success(
                    unit.spec().invoked.clone(),
                    structured,
                    call_result_meta(unit),
                )
            }
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "Tool call failed");
                ToolCallResult::error(format!("Error: {e}"))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

fn resource_description(unit: &ExecutionUnit) -> String {
    format!("{} widget markup", unit.title())
}

/// Wraps a serialisable result in a response.
fn respond<T: Serialize>(req: &JsonRpcRequest, result: &T) -> Reply {
    let value = serde_json::to_value(result).map_err(|e| {
        tracing::error!(error = %e, method = %req.method, "Failed to serialise result");
        JsonRpcError::internal_error(req.id.clone(), "Internal error: failed to serialise result")
    })?;
    Ok(JsonRpcResponse::success(req.id.clone(), value))
}
