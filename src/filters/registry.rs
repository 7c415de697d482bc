//! Named filter lookup.
//!
//! The registry is built once at startup and then shared read-only; there is
//! no process-wide instance.

use std::fmt;
use std::sync::Arc;

use super::{ColorBoost, EdgeDetection, Emboss, Filter, GaussianBlur, Grayscale, Sepia, Sharpen, Vintage};

/// Ordered mapping from display name to filter.
///
/// Iteration and [`names`](Self::names) follow registration order.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    entries: Vec<(String, Arc<dyn Filter>)>,
}

impl FilterRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The eight built-in filters with default parameters.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("Grayscale", Arc::new(Grayscale));
        registry.register("Sepia", Arc::new(Sepia));
        registry.register("Blur", Arc::new(GaussianBlur::default()));
        registry.register("Sharpen", Arc::new(Sharpen));
        registry.register("Edge Detection", Arc::new(EdgeDetection));
        registry.register("Emboss", Arc::new(Emboss));
        registry.register("Vintage", Arc::new(Vintage));
        registry.register("Color Boost", Arc::new(ColorBoost::default()));
        registry
    }

    /// Add a filter under `name`.
    ///
    /// Re-registering a name replaces the filter in place, keeping its
    /// position, and returns the previous one.
    pub fn register(&mut self, name: impl Into<String>, filter: Arc<dyn Filter>) -> Option<Arc<dyn Filter>> {
        let name = name.into();
        if let Some((_, slot)) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            return Some(std::mem::replace(slot, filter));
        }
        self.entries.push((name, filter));
        None
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Filter>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| Arc::clone(f))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Filter>)> {
        self.entries.iter().map(|(n, f)| (n.as_str(), f))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter().map(|(n, _)| n)).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names_in_registration_order() {
        let registry = FilterRegistry::builtin();
        assert_eq!(
            registry.names(),
            vec![
                "Grayscale",
                "Sepia",
                "Blur",
                "Sharpen",
                "Edge Detection",
                "Emboss",
                "Vintage",
                "Color Boost"
            ]
        );
    }

    #[test]
    fn test_builtin_filter_names_match_keys() {
        for (name, filter) in FilterRegistry::builtin().iter() {
            assert_eq!(filter.name(), name);
        }
    }

    #[test]
    fn test_lookup_missing() {
        let registry = FilterRegistry::builtin();
        assert!(registry.lookup("Posterize").is_none());
        assert!(!registry.contains("grayscale"));
        assert!(registry.contains("Grayscale"));
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = FilterRegistry::builtin();
        let previous = registry.register("Blur", Arc::new(GaussianBlur::new(7)));
        assert!(previous.is_some());
        assert_eq!(registry.len(), 8);
        assert_eq!(registry.names()[2], "Blur");
    }
}
