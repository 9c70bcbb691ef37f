//! A widget with no inputs, useful for checking a client connection.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::ToolError;
use crate::widget::{Arguments, Widget, WidgetSpec};

/// Greets the user with today's date.
#[derive(Debug)]
pub struct HelloWorld {
    spec: WidgetSpec,
}

impl HelloWorld {
    /// Creates the widget.
    #[must_use]
    pub fn new() -> Self {
        Self {
            spec: WidgetSpec::new("helloworld", "Hello World")
                .invocation("Preparing hello world...", "Hello world ready!")
                .csp(Vec::<String>::new(), Vec::<String>::new()),
        }
    }
}

impl Default for HelloWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Widget for HelloWorld {
    fn spec(&self) -> &WidgetSpec {
        &self.spec
    }

    async fn execute(&self, _args: Arguments) -> Result<Value, ToolError> {
        Ok(json!({
            "message": "Hello World!",
            "timestamp": chrono::Local::now().format("%Y-%m-%d").to_string(),
        }))
    }
}
