//! Pizzerias for a topping, rendered as a list.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ToolError;
use crate::pizzeria::PizzeriaSource;
use crate::widget::{Arguments, Widget, WidgetSpec};

use super::{places_for, topping_schema, OAI_STATIC};

/// The `pizza_list` widget.
pub struct PizzaList {
    spec: WidgetSpec,
    source: Arc<dyn PizzeriaSource>,
}

impl PizzaList {
    /// Creates the widget backed by `source`.
    #[must_use]
    pub fn new(source: Arc<dyn PizzeriaSource>) -> Self {
        Self {
            spec: WidgetSpec::new("pizza_list", "Show Pizza List")
                .input_schema(topping_schema())
                .invocation("Preparing pizza list...", "Pizza list ready!")
                .csp(Vec::<String>::new(), [OAI_STATIC]),
            source,
        }
    }
}

#[async_trait]
impl Widget for PizzaList {
    fn spec(&self) -> &WidgetSpec {
        &self.spec
    }

    async fn execute(&self, args: Arguments) -> Result<Value, ToolError> {
        places_for(self.source.as_ref(), args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pizzeria::MockPizzerias;
    use serde_json::json;

    #[tokio::test]
    async fn lists_places_for_topping() {
        let widget = PizzaList::new(Arc::new(MockPizzerias));
        let args = widget
            .spec()
            .input_schema
            .validate(&json!({"pizzaTopping": "hawaiian"}))
            .unwrap();
        let result = widget.execute(args).await.unwrap();
        assert_eq!(result["pizzaTopping"], "hawaiian");
        assert_eq!(result["places"].as_array().unwrap().len(), 2);
        assert_eq!(result["places"][0]["name"], "Tropical Pizza");
    }

    #[test]
    fn hints() {
        let widget = PizzaList::new(Arc::new(MockPizzerias));
        let spec = widget.spec();
        assert_eq!(spec.title, "Show Pizza List");
        assert!(!spec.prefers_border);
        assert_eq!(
            spec.csp.as_ref().unwrap().resource_domains,
            vec![OAI_STATIC.to_string()]
        );
    }
}
