//! Pizzeria lookup.
//!
//! The pizza widgets fetch their places from a [`PizzeriaSource`]. The server
//! ships with [`MockPizzerias`], a fixed in-memory table; a real directory
//! client only needs to implement the trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// A pizzeria as rendered by the list and map widgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pizzeria {
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Average rating out of five.
    pub rating: f64,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Pizzeria {
    fn new(name: impl Into<String>, address: &str, rating: f64, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            address: address.to_string(),
            rating,
            lat,
            lng,
        }
    }
}

/// Upstream lookup of pizzerias serving a topping.
///
/// Called once per tool invocation and never retried; timeouts are the
/// implementation's concern.
#[async_trait]
pub trait PizzeriaSource: Send + Sync {
    /// Returns pizzerias known for `topping`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Upstream`] if the lookup fails.
    async fn pizzerias(&self, topping: &str) -> Result<Vec<Pizzeria>, ToolError>;
}

/// Fixed demonstration data.
///
/// Margherita, Pepperoni and Hawaiian have curated lists; any other topping
/// gets two generated places.
///
/// Toppings are trimmed and matched case-insensitively, so `pepperoni` and
/// ` Pepperoni ` hit the same list. The upstream Pizzaz demo data is keyed on
/// the capitalised names and matched exactly, which sends lowercase input to
/// the generated fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockPizzerias;

impl MockPizzerias {
    fn lookup(topping: &str) -> Vec<Pizzeria> {
        match topping.trim().to_ascii_lowercase().as_str() {
            "margherita" => vec![
                Pizzeria::new("Pizzeria Napoli", "123 Main St", 4.5, 40.7128, -74.0060),
                Pizzeria::new("Italian Corner", "456 Oak Ave", 4.8, 40.7580, -73.9855),
                Pizzeria::new("Roma Pizza House", "789 Elm Rd", 4.3, 40.7489, -73.9680),
            ],
            "pepperoni" => vec![
                Pizzeria::new("Pepperoni Paradise", "321 Pine St", 4.7, 40.7614, -73.9776),
                Pizzeria::new("Classic Pizza Co", "654 Maple Dr", 4.4, 40.7306, -73.9352),
            ],
            "hawaiian" => vec![
                Pizzeria::new("Tropical Pizza", "987 Beach Blvd", 4.2, 40.7282, -74.0776),
                Pizzeria::new("Island Slice", "147 Ocean Ave", 4.6, 40.7589, -73.9851),
            ],
            _ => vec![
                Pizzeria::new(format!("{topping} Pizzeria"), "100 Demo St", 4.5, 40.7128, -74.0060),
                Pizzeria::new(format!("Best {topping} Pizza"), "200 Test Ave", 4.7, 40.7580, -73.9855),
            ],
        }
    }
}

#[async_trait]
impl PizzeriaSource for MockPizzerias {
    async fn pizzerias(&self, topping: &str) -> Result<Vec<Pizzeria>, ToolError> {
        Ok(Self::lookup(topping))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn curated_topping_is_case_insensitive() {
        let places = MockPizzerias.pizzerias("pepperoni").await.unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name, "Pepperoni Paradise");

        let places = MockPizzerias.pizzerias("Margherita").await.unwrap();
        assert_eq!(places.len(), 3);
    }

    #[tokio::test]
    async fn curated_topping_ignores_surrounding_whitespace() {
        let places = MockPizzerias.pizzerias("  HAWAIIAN\t").await.unwrap();
        assert_eq!(places[0].name, "Tropical Pizza");
    }

    #[tokio::test]
    async fn unknown_topping_gets_generated_places() {
        let places = MockPizzerias.pizzerias("Anchovy").await.unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name, "Anchovy Pizzeria");
        assert_eq!(places[1].name, "Best Anchovy Pizza");
    }

    #[test]
    fn pizzeria_serialises_flat() {
        let value = serde_json::to_value(Pizzeria::new("A", "1 St", 4.0, 1.0, 2.0)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"name": "A", "address": "1 St", "rating": 4.0, "lat": 1.0, "lng": 2.0})
        );
    }
}
