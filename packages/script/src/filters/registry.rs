//! Filter registry
//!
//! Registration-time table mapping `(name, arity)` to a filter

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{DefaultFilters, Filter};

#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: HashMap<(String, usize), Arc<dyn Filter>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the default filters
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        DefaultFilters::register(&mut registry);
        registry
    }

    /// Register `filter` for calls with exactly `arity` arguments, replacing any previous one
    pub fn register<F>(&mut self, name: &str, arity: usize, filter: F) -> &mut Self
    where
        F: Filter + 'static,
    {
        self.filters.insert((name.to_string(), arity), Arc::new(filter));
        self
    }

    pub fn resolve(&self, name: &str, arity: usize) -> Option<Arc<dyn Filter>> {
        self.filters.get(&(name.to_string(), arity)).cloned()
    }

    pub fn contains(&self, name: &str, arity: usize) -> bool {
        self.filters.contains_key(&(name.to_string(), arity))
    }

    /// Registered signatures sharing `name`, as `name/arity`
    pub fn similar(&self, name: &str) -> Vec<String> {
        let mut arities: Vec<usize> = self
            .filters
            .keys()
            .filter(|(n, _)| n == name)
            .map(|(_, arity)| *arity)
            .collect();
        arities.sort_unstable();
        arities
            .into_iter()
            .map(|arity| format!("{}/{}", name, arity))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.filters.keys().collect();
        keys.sort();
        f.debug_struct("FilterRegistry")
            .field("filters", &keys)
            .finish()
    }
}
