//! Pizzerias for a topping, rendered on a map.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ToolError;
use crate::pizzeria::PizzeriaSource;
use crate::widget::{Arguments, Widget, WidgetSpec};

use super::{places_for, topping_schema, OAI_STATIC};

/// The map tiles come from Mapbox.
const MAPBOX_API: &str = "https://api.mapbox.com";

/// The `pizza_map` widget.
pub struct PizzaMap {
    spec: WidgetSpec,
    source: Arc<dyn PizzeriaSource>,
}

impl PizzaMap {
    /// Creates the widget backed by `source`.
    #[must_use]
    pub fn new(source: Arc<dyn PizzeriaSource>) -> Self {
        Self {
            spec: WidgetSpec::new("pizza_map", "Show Pizza Map")
                .input_schema(topping_schema())
                .invocation("Hand-tossing a map...", "Served a fresh map!")
                .csp([MAPBOX_API], [OAI_STATIC])
                .prefers_border(),
            source,
        }
    }
}

#[async_trait]
impl Widget for PizzaMap {
    fn spec(&self) -> &WidgetSpec {
        &self.spec
    }

    async fn execute(&self, args: Arguments) -> Result<Value, ToolError> {
        places_for(self.source.as_ref(), args).await
    }
}
