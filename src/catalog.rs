//! The immutable widget registry.
//!
//! A [`Catalog`] is built once at startup from an explicit list of widgets and
//! the artifacts produced by the UI build. It maps each identifier and each
//! template URI to the same [`ExecutionUnit`], preserves registration order
//! for deterministic listings, and offers no mutation API.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::CatalogError;
use crate::widget::{Artifact, ExecutionUnit, Widget};

/// Registry of execution units keyed by identifier and by template URI.
#[derive(Debug)]
pub struct Catalog {
    /// Identifier → unit, in registration order.
    by_id: IndexMap<String, Arc<ExecutionUnit>>,
    /// Template URI → unit (same instances as `by_id`).
    by_uri: HashMap<String, Arc<ExecutionUnit>>,
}

impl Catalog {
    /// Binds every widget to its artifact.
    ///
    /// Artifacts that no widget claims are logged and dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if two widgets share an identifier or a widget has no
    /// artifact. Both are startup integrity failures.
    pub fn new(
        widgets: Vec<Arc<dyn Widget>>,
        mut artifacts: HashMap<String, Artifact>,
    ) -> Result<Self, CatalogError> {
        let mut by_id = IndexMap::with_capacity(widgets.len());
        let mut by_uri = HashMap::with_capacity(widgets.len());

        for widget in widgets {
            let identifier = widget.spec().identifier.clone();
            if by_id.contains_key(&identifier) {
                return Err(CatalogError::DuplicateIdentifier { identifier });
            }

            let artifact = artifacts
                .remove(&identifier)
                .ok_or_else(|| CatalogError::MissingArtifact {
                    identifier: identifier.clone(),
                })?;

            let unit = Arc::new(ExecutionUnit::new(widget, artifact));
            tracing::info!(
                tool = %identifier,
                hash = %unit.artifact().content_hash,
                uri = %unit.template_uri(),
                "Registered widget"
            );
            by_uri.insert(unit.template_uri().to_string(), Arc::clone(&unit));
            by_id.insert(identifier, unit);
        }

        let mut orphans: Vec<_> = artifacts.into_keys().collect();
        orphans.sort();
        for name in orphans {
            tracing::warn!(artifact = %name, "No widget registered for compiled artifact");
        }

        Ok(Self { by_id, by_uri })
    }

    /// Looks a unit up by tool identifier.
    #[must_use]
    pub fn by_id(&self, identifier: &str) -> Option<&ExecutionUnit> {
        self.by_id.get(identifier).map(AsRef::as_ref)
    }

    /// Looks a unit up by template URI.
    #[must_use]
    pub fn by_uri(&self, uri: &str) -> Option<&ExecutionUnit> {
        self.by_uri.get(uri).map(AsRef::as_ref)
    }

    /// All units in registration order.
    pub fn all(&self) -> impl Iterator<Item = &ExecutionUnit> {
        self.by_id.values().map(AsRef::as_ref)
    }

    /// Number of registered units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns `true` if no units are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
