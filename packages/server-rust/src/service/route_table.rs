//! The table of compiled routes, keyed by `(verb, path)`.

use std::collections::HashSet;
use std::sync::Arc;

use dynapi_core::{OperationDescriptor, RegistrationError, Verb};

/// One compiled route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub verb: Verb,
    pub path: String,
    /// Declared name of the capability type.
    pub type_name: &'static str,
    /// Resource segment derived from `type_name`.
    pub resource: String,
    pub operation: OperationDescriptor,
}

/// All routes registered so far, in registration order.
///
/// Mutated only during registration; read-only once the router is built.
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: Vec<Arc<RouteEntry>>,
    keys: HashSet<(Verb, String)>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, verb: Verb, path: &str) -> bool {
        self.keys.contains(&(verb, path.to_string()))
    }

    #[must_use]
    pub fn entries(&self) -> &[Arc<RouteEntry>] {
        &self.entries
    }

    /// `(verb, path)` pairs in registration order.
    #[must_use]
    pub fn listing(&self) -> Vec<(Verb, String)> {
        self.entries
            .iter()
            .map(|entry| (entry.verb, entry.path.clone()))
            .collect()
    }

    /// Inserts a batch of routes. Either every route is inserted or none is.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateRoute`] if any `(verb, path)`
    /// is already registered or repeated within the batch.
    pub fn insert_all(
        &mut self,
        batch: Vec<RouteEntry>,
    ) -> Result<Vec<Arc<RouteEntry>>, RegistrationError> {
        let mut pending = HashSet::with_capacity(batch.len());
        for entry in &batch {
            let key = (entry.verb, entry.path.clone());
            if self.keys.contains(&key) || !pending.insert(key) {
                return Err(RegistrationError::DuplicateRoute {
                    verb: entry.verb,
                    path: entry.path.clone(),
                });
            }
        }

        self.keys.extend(pending);
        let inserted: Vec<_> = batch.into_iter().map(Arc::new).collect();
        self.entries.extend(inserted.iter().cloned());
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use dynapi_core::{describe, MethodDecl};

    use super::*;

    fn entry(verb: Verb, path: &str) -> RouteEntry {
        let method = match verb {
            Verb::Get => MethodDecl::get("Op"),
            Verb::Post => MethodDecl::post("Op"),
        };
        RouteEntry {
            verb,
            path: path.to_string(),
            type_name: "IThing",
            resource: "Thing".to_string(),
            operation: describe(&method).unwrap(),
        }
    }

    #[test]
    fn insert_and_list_in_order() {
        let mut table = RouteTable::new();
        table
            .insert_all(vec![entry(Verb::Get, "/a"), entry(Verb::Post, "/b")])
            .unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.contains(Verb::Get, "/a"));
        assert!(!table.contains(Verb::Post, "/a"));
        assert_eq!(
            table.listing(),
            vec![(Verb::Get, "/a".to_string()), (Verb::Post, "/b".to_string())]
        );
    }

    #[test]
    fn same_path_with_different_verbs_is_allowed() {
        let mut table = RouteTable::new();
        table.insert_all(vec![entry(Verb::Get, "/a")]).unwrap();
        table.insert_all(vec![entry(Verb::Post, "/a")]).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn duplicate_against_existing_route_fails() {
        let mut table = RouteTable::new();
        table.insert_all(vec![entry(Verb::Get, "/a")]).unwrap();
        let err = table.insert_all(vec![entry(Verb::Get, "/a")]).unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::DuplicateRoute { verb: Verb::Get, ref path } if path == "/a"
        ));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn duplicate_within_batch_inserts_nothing() {
        let mut table = RouteTable::new();
        let err = table
            .insert_all(vec![
                entry(Verb::Post, "/x"),
                entry(Verb::Get, "/y"),
                entry(Verb::Get, "/y"),
            ])
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateRoute { .. }));
        assert!(table.is_empty());
        assert!(!table.contains(Verb::Post, "/x"));
    }
}
