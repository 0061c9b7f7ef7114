//! Model Library
//!
//! A registry of example model descriptors, keyed by id.
//!
//! # Example
//!
//! ```rust
//! use pkode::model::ModelLibrary;
//!
//! let library = ModelLibrary::builtin();
//!
//! // List available models
//! for id in library.list() {
//!     println!("Available: {}", id);
//! }
//!
//! let model = library.get("pk/1cmt-iv").unwrap();
//! assert_eq!(model.state_names(), vec!["C"]);
//! ```

use std::collections::HashMap;

use crate::model::descriptor::ModelDescriptor;
use crate::model::errors::ModelError;

/// A registry of model descriptors
#[derive(Debug, Clone, Default)]
pub struct ModelLibrary {
    models: HashMap<String, ModelDescriptor>,
}

// Embed built-in models at compile time
mod embedded {
    pub const PK_1CMT_IV: (&str, &str) = ("pk/1cmt-iv", include_str!("models/pk_1cmt_iv.json"));
    pub const PK_1CMT_ORAL: (&str, &str) =
        ("pk/1cmt-oral", include_str!("models/pk_1cmt_oral.json"));
}

impl ModelLibrary {
    /// Create a new empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a library with all built-in models
    pub fn builtin() -> Self {
        let mut library = Self::new();

        for (id, json) in [embedded::PK_1CMT_IV, embedded::PK_1CMT_ORAL] {
            match ModelDescriptor::from_str(json) {
                Ok(model) => library.insert(id, model),
                Err(e) => tracing::error!(id, error = %e, "failed to parse embedded model"),
            }
        }

        library
    }

    /// Get a model by id
    pub fn get(&self, id: &str) -> Option<&ModelDescriptor> {
        self.models.get(id)
    }

    /// Get a model by id, failing with [ModelError::ModelNotFound]
    pub fn require(&self, id: &str) -> Result<&ModelDescriptor, ModelError> {
        self.get(id)
            .ok_or_else(|| ModelError::ModelNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.models.contains_key(id)
    }

    /// Add or replace a model
    pub fn insert(&mut self, id: impl Into<String>, model: ModelDescriptor) {
        self.models.insert(id.into(), model);
    }

    pub fn remove(&mut self, id: &str) -> Option<ModelDescriptor> {
        self.models.remove(id)
    }

    /// List all model ids, sorted
    pub fn list(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.models.keys().map(|s| s.as_str()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Search models by partial id, or by a state or parameter name or
    /// description. Matching is case-insensitive; results are sorted by id.
    pub fn search(&self, query: &str) -> Vec<(&str, &ModelDescriptor)> {
        let query_lower = query.to_lowercase();
        let hit = |text: &str| text.to_lowercase().contains(&query_lower);
        let mut found: Vec<(&str, &ModelDescriptor)> = self
            .models
            .iter()
            .filter(|(id, model)| {
                hit(id.as_str())
                    || model
                        .states
                        .iter()
                        .any(|s| hit(&s.name) || hit(&s.description))
                    || model
                        .parameters
                        .iter()
                        .any(|p| hit(&p.name) || hit(&p.description))
            })
            .map(|(id, model)| (id.as_str(), model))
            .collect();
        found.sort_by(|a, b| a.0.cmp(b.0));
        found
    }
}
