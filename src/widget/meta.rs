//! `_meta` composition.
//!
//! Two disjoint bags are derived from every unit:
//!
//! - **tool meta** travels with `tools/list` entries and call results
//!   (`openai/...` invocation keys and `annotations`);
//! - **resource meta** travels with resource listings, reads and the embedded
//!   widget (CSP, border preference, widget description).
//!
//! The widget description is deliberately resource-only so that long-form
//! text is not repeated in every tool listing.

use serde_json::{json, Value};

use crate::mcp::types::{Meta, ResourceContents, ToolContent};
use crate::widget::{ExecutionUnit, WIDGET_MIME_TYPE};

/// Resource URI of the widget rendering a tool's output.
pub const OUTPUT_TEMPLATE: &str = "openai/outputTemplate";
/// Status line while the tool runs.
pub const INVOKING: &str = "openai/toolInvocation/invoking";
/// Status line after the tool ran.
pub const INVOKED: &str = "openai/toolInvocation/invoked";
/// Whether the widget may call tools.
pub const WIDGET_ACCESSIBLE: &str = "openai/widgetAccessible";
/// Always `true`: every tool here renders a widget.
pub const RESULT_CAN_PRODUCE_WIDGET: &str = "openai/resultCanProduceWidget";
/// Nested tool annotations (`readOnlyHint`).
pub const ANNOTATIONS: &str = "annotations";
/// Content-security-policy domains.
pub const WIDGET_CSP: &str = "openai/widgetCSP";
/// Border preference.
pub const WIDGET_PREFERS_BORDER: &str = "openai/widgetPrefersBorder";
/// Long-form widget description.
pub const WIDGET_DESCRIPTION: &str = "openai/widgetDescription";
/// Call-result key holding the embedded widget resource.
pub const EMBEDDED_WIDGET: &str = "openai.com/widget";

/// Builds the tool invocation metadata for a unit.
#[must_use]
pub fn tool_meta(unit: &ExecutionUnit) -> Meta {
    let spec = unit.spec();
    let mut meta = Meta::new();
    meta.insert(OUTPUT_TEMPLATE.to_string(), json!(unit.template_uri()));
    meta.insert(INVOKING.to_string(), json!(spec.invoking));
    meta.insert(INVOKED.to_string(), json!(spec.invoked));
    meta.insert(WIDGET_ACCESSIBLE.to_string(), json!(spec.widget_accessible));
    meta.insert(RESULT_CAN_PRODUCE_WIDGET.to_string(), Value::Bool(true));
    meta.insert(
        ANNOTATIONS.to_string(),
        json!({ "readOnlyHint": spec.read_only }),
    );
    meta
}

/// Builds the resource presentation metadata for a unit.
///
/// Only hints the unit actually declares are present.
#[must_use]
pub fn resource_meta(unit: &ExecutionUnit) -> Meta {
    let spec = unit.spec();
    let mut meta = Meta::new();
    if let Some(ref csp) = spec.csp {
        meta.insert(
            WIDGET_CSP.to_string(),
            json!({
                "connect_domains": csp.connect_domains,
                "resource_domains": csp.resource_domains,
            }),
        );
    }
    if spec.prefers_border {
        meta.insert(WIDGET_PREFERS_BORDER.to_string(), Value::Bool(true));
    }
    if let Some(ref description) = spec.widget_description {
        meta.insert(WIDGET_DESCRIPTION.to_string(), json!(description));
    }
    meta
}

/// Resource contents carrying the unit's markup.
///
/// `title` is set only for the embedded form used in call results.
#[must_use]
pub fn resource_contents(unit: &ExecutionUnit, title: Option<&str>) -> ResourceContents {
    ResourceContents {
        uri: unit.template_uri().to_string(),
        mime_type: WIDGET_MIME_TYPE.to_string(),
        text: unit.artifact().markup.to_string(),
        title: title.map(str::to_string),
        meta: resource_meta(unit),
    }
}

/// The unit's artifact wrapped as an embedded resource.
#[must_use]
pub fn embedded_resource(unit: &ExecutionUnit) -> ToolContent {
    ToolContent::Resource {
        resource: resource_contents(unit, Some(unit.title())),
    }
}

/// `_meta` for a successful call: the embedded widget first, then every
/// tool meta key.
///
/// The embedded key uses the `openai.com/` prefix and tool keys use
/// `openai/` or `annotations`, so the two never collide.
#[must_use]
pub fn call_result_meta(unit: &ExecutionUnit) -> Meta {
    let mut meta = Meta::new();
    let widget = serde_json::to_value(embedded_resource(unit)).unwrap_or_else(|e| {
        tracing::error!(error = %e, tool = unit.identifier(), "Failed to serialise embedded widget");
        Value::Null
    });
    meta.insert(EMBEDDED_WIDGET.to_string(), widget);
    meta.extend(tool_meta(unit));
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::error::ToolError;
    use crate::widget::{Arguments, Artifact, Widget, WidgetSpec};

    struct Fixed(WidgetSpec);

    #[async_trait]
    impl Widget for Fixed {
        fn spec(&self) -> &WidgetSpec {
            &self.0
        }

        async fn execute(&self, _args: Arguments) -> Result<Value, ToolError> {
            Ok(Value::Null)
        }
    }

    fn unit(spec: WidgetSpec) -> ExecutionUnit {
        ExecutionUnit::new(
            Arc::new(Fixed(spec)),
            Artifact::new("map", "0f3a", "<div id=\"map-root\"></div>"),
        )
    }

    fn full_spec() -> WidgetSpec {
        WidgetSpec::new("map", "Map")
            .invocation("Loading...", "Loaded")
            .csp(["https://api.mapbox.com"], ["https://cdn.test"])
            .prefers_border()
            .widget_description("A map of places")
    }

    #[test]
    fn tool_meta_keys() {
        let meta = tool_meta(&unit(full_spec()));
        assert_eq!(meta[OUTPUT_TEMPLATE], "ui://widget/map.html");
        assert_eq!(meta[INVOKING], "Loading...");
        assert_eq!(meta[INVOKED], "Loaded");
        assert_eq!(meta[WIDGET_ACCESSIBLE], true);
        assert_eq!(meta[RESULT_CAN_PRODUCE_WIDGET], true);
        assert_eq!(meta[ANNOTATIONS]["readOnlyHint"], true);
        assert_eq!(meta.len(), 6);
    }

    #[test]
    fn tool_meta_never_has_widget_description() {
        let meta = tool_meta(&unit(full_spec()));
        assert!(!meta.contains_key(WIDGET_DESCRIPTION));
    }

    #[test]
    fn resource_meta_with_all_hints() {
        let meta = resource_meta(&unit(full_spec()));
        assert_eq!(
            meta[WIDGET_CSP],
            json!({
                "connect_domains": ["https://api.mapbox.com"],
                "resource_domains": ["https://cdn.test"],
            })
        );
        assert_eq!(meta[WIDGET_PREFERS_BORDER], true);
        assert_eq!(meta[WIDGET_DESCRIPTION], "A map of places");
    }

    #[test]
    fn resource_meta_omits_absent_hints() {
        let meta = resource_meta(&unit(WidgetSpec::new("map", "Map")));
        assert!(meta.is_empty());
    }

    #[test]
    fn composition_is_stable() {
        let unit = unit(full_spec());
        assert_eq!(tool_meta(&unit), tool_meta(&unit));
        assert_eq!(resource_meta(&unit), resource_meta(&unit));
    }

    #[test]
    fn call_result_meta_puts_widget_first() {
        let unit = unit(full_spec());
        let meta = call_result_meta(&unit);
        let keys: Vec<&str> = meta.keys().map(String::as_str).collect();
        assert_eq!(keys[0], EMBEDDED_WIDGET);
        for key in tool_meta(&unit).keys() {
            assert!(meta.contains_key(key), "missing {key}");
        }

        let widget = &meta[EMBEDDED_WIDGET];
        assert_eq!(widget["type"], "resource");
        assert_eq!(widget["resource"]["uri"], "ui://widget/map.html");
        assert_eq!(widget["resource"]["mimeType"], WIDGET_MIME_TYPE);
        assert_eq!(widget["resource"]["text"], "<div id=\"map-root\"></div>");
        assert_eq!(widget["resource"]["title"], "Map");
        assert_eq!(widget["resource"]["_meta"][WIDGET_PREFERS_BORDER], true);
    }
}
