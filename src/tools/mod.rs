//! The widgets this server ships.
//!
//! Each tool is a [`Widget`] paired at startup with the artifact of the same
//! name. [`default_widgets`] is the explicit registration list used by the
//! binary; its order is the order of `tools/list`.

pub mod helloworld;
pub mod pizza_list;
pub mod pizza_map;

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

pub use helloworld::HelloWorld;
pub use pizza_list::PizzaList;
pub use pizza_map::PizzaMap;

use crate::error::ToolError;
use crate::pizzeria::PizzeriaSource;
use crate::widget::{Arguments, FieldKind, FieldSpec, InputSchema, Widget};

/// Origin of the static assets the pizza widgets load.
const OAI_STATIC: &str = "https://persistent.oaistatic.com";

/// Returns every widget this server registers, in listing order.
#[must_use]
pub fn default_widgets(source: Arc<dyn PizzeriaSource>) -> Vec<Arc<dyn Widget>> {
    let hello: Arc<dyn Widget> = Arc::new(HelloWorld::new());
    let list: Arc<dyn Widget> = Arc::new(PizzaList::new(Arc::clone(&source)));
    let map: Arc<dyn Widget> = Arc::new(PizzaMap::new(source));
    vec![hello, list, map]
}

/// Input shared by the pizza widgets.
#[derive(Debug, Deserialize)]
struct PizzaInput {
    pizza_topping: String,
}

/// `pizza_topping`, sent by clients as `pizzaTopping`.
fn topping_schema() -> InputSchema {
    InputSchema::empty().field(
        FieldSpec::required("pizza_topping", FieldKind::String)
            .alias("pizzaTopping")
            .describe("Topping to mention when rendering the widget."),
    )
}

/// Looks up places for the requested topping.
async fn places_for(source: &dyn PizzeriaSource, args: Arguments) -> Result<Value, ToolError> {
    let input: PizzaInput = args.into_typed()?;
    let places = source.pizzerias(&input.pizza_topping).await?;
    tracing::debug!(topping = %input.pizza_topping, places = places.len(), "Pizzeria lookup done");
    let places = serde_json::to_value(places)
        .map_err(|e| ToolError::Internal(format!("failed to encode places: {e}")))?;
    Ok(json!({
        "pizzaTopping": input.pizza_topping,
        "places": places,
    }))
}
