//! A collection of declared types, some of which are capabilities with a
//! registered implementation.

use std::fmt;
use std::sync::Arc;

use crate::schema::TypeDecl;
use crate::traits::Capability;

/// Resolves the target instance for a request.
pub type InstanceProvider = Arc<dyn Fn() -> Arc<dyn Capability> + Send + Sync>;

/// One declared type and, for capabilities, how to obtain an instance.
#[derive(Clone)]
pub struct CatalogEntry {
    pub decl: TypeDecl,
    pub provider: Option<InstanceProvider>,
}

impl CatalogEntry {
    /// Whether this entry can be compiled into routes.
    #[must_use]
    pub fn is_routable(&self) -> bool {
        self.decl.is_capability() && self.provider.is_some()
    }
}

impl fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("decl", &self.decl.name)
            .field("provider", &self.provider.is_some())
            .finish()
    }
}

/// Ordered collection of declared types.
#[derive(Debug, Clone, Default)]
pub struct CapabilityCatalog {
    entries: Vec<CatalogEntry>,
}

impl CapabilityCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers capability `T`, resolving its instance through `provider`
    /// on every request.
    pub fn register<T, F>(&mut self, provider: F) -> &mut Self
    where
        T: Capability,
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        let provider: InstanceProvider = Arc::new(move || -> Arc<dyn Capability> { provider() });
        self.entries.push(CatalogEntry {
            decl: T::declaration(),
            provider: Some(provider),
        });
        self
    }

    /// Registers a shared instance of capability `T`.
    pub fn register_instance<T: Capability>(&mut self, instance: Arc<T>) -> &mut Self {
        self.register::<T, _>(move || Arc::clone(&instance))
    }

    /// Adds a declaration without an implementation. Such entries are
    /// listed but never routed.
    pub fn declare(&mut self, decl: TypeDecl) -> &mut Self {
        self.entries.push(CatalogEntry {
            decl,
            provider: None,
        });
        self
    }

    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entries that carry the capability marker and an implementation.
    pub fn capabilities(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|entry| entry.is_routable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Args;
    use crate::error::OperationError;
    use crate::schema::MethodDecl;
    use crate::traits::Invocation;

    struct Ping;

    impl Capability for Ping {
        fn declaration() -> TypeDecl {
            TypeDecl::capability("IPingApi").method(MethodDecl::get("Ping"))
        }

        fn invoke(&self, _operation: &str, _args: Args) -> Result<Invocation<'_>, OperationError> {
            Ok(Invocation::Unit)
        }
    }

    #[test]
    fn capabilities_skip_plain_declarations() {
        let mut catalog = CapabilityCatalog::new();
        catalog
            .declare(TypeDecl::plain("Clock"))
            .register_instance(Arc::new(Ping));

        assert_eq!(catalog.entries().len(), 2);
        let names: Vec<_> = catalog.capabilities().map(|e| e.decl.name).collect();
        assert_eq!(names, vec!["IPingApi"]);
    }

    #[test]
    fn capability_declaration_without_implementation_is_not_routable() {
        let mut catalog = CapabilityCatalog::new();
        catalog.declare(Ping::declaration());
        assert_eq!(catalog.capabilities().count(), 0);
    }

    #[test]
    fn provider_is_called_per_resolution() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut catalog = CapabilityCatalog::new();
        catalog.register::<Ping, _>(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(Ping)
        });

        let provider = catalog.entries()[0].provider.clone().unwrap();
        let _ = provider();
        let _ = provider();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
