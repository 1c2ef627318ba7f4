//! Route compilation: turns capability declarations into axum routes.
//!
//! Every enabled, verb-annotated operation of a capability becomes one
//! route at `{base_route}/{resource}/{operation}`. Handlers bind
//! parameters from the request, dispatch to the target instance and map
//! the outcome to a response.

use std::sync::Arc;

use axum::extract::{Query, RawPathParams, Request};
use axum::response::Response;
use axum::routing::{on, MethodFilter, MethodRouter};
use axum::{Extension, Router};
use dynapi_core::{
    bind, dispatch, resource_name, scan, BindingConfig, CapabilityCatalog, Capability,
    InstanceProvider, RegistrationError, TypeDecl, Verb,
};
use tracing::{debug, info, warn};

use super::request::HttpRequest;
use super::response::{success, ApiError};
use super::route_table::{RouteEntry, RouteTable};

/// Query pairs in request order; repeated keys are kept.
type QueryPairs = Query<Vec<(String, String)>>;

/// Compiles capabilities into a route table and an axum [`Router`].
///
/// Registration happens once at startup. Afterwards the table and router
/// are read-only.
#[derive(Debug)]
pub struct RouteCompiler {
    base_route: String,
    binding: Arc<BindingConfig>,
    table: RouteTable,
    router: Router,
}

impl RouteCompiler {
    /// Creates a compiler for routes under `base_route`.
    ///
    /// Trailing slashes of `base_route` are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidBaseRoute`] if `base_route` is
    /// neither empty nor starts with `/`.
    pub fn new(base_route: &str, binding: BindingConfig) -> Result<Self, RegistrationError> {
        Ok(Self {
            base_route: normalize_base_route(base_route)?,
            binding: Arc::new(binding),
            table: RouteTable::new(),
            router: Router::new(),
        })
    }

    /// The normalized base route.
    #[must_use]
    pub fn base_route(&self) -> &str {
        &self.base_route
    }

    /// Maps capability `T`, calling `provider` on every request to obtain
    /// the target instance.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateRoute`] if any route of `T` is
    /// already registered; nothing of `T` is registered in that case.
    pub fn map_capability<T, F>(&mut self, provider: F) -> Result<&mut Self, RegistrationError>
    where
        T: Capability,
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        let provider = Arc::new(provider);
        let binding = Arc::clone(&self.binding);
        self.compile(&T::declaration(), |entry| {
            let provider = Arc::clone(&provider);
            let binding = Arc::clone(&binding);
            on(
                method_filter(entry.verb),
                move |params: RawPathParams, Query(query): QueryPairs, request: Request| {
                    handle(
                        provider(),
                        Arc::clone(&entry),
                        Arc::clone(&binding),
                        HttpRequest::new(query, &params, request),
                    )
                },
            )
        })
    }

    /// Maps capability `T`, taking the target instance from the request's
    /// `Extension<Arc<T>>`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateRoute`] if any route of `T` is
    /// already registered.
    pub fn map_extension<T: Capability>(&mut self) -> Result<&mut Self, RegistrationError> {
        let binding = Arc::clone(&self.binding);
        self.compile(&T::declaration(), |entry| {
            let binding = Arc::clone(&binding);
            on(
                method_filter(entry.verb),
                move |Extension(target): Extension<Arc<T>>,
                      params: RawPathParams,
                      Query(query): QueryPairs,
                      request: Request| {
                    handle(
                        target,
                        Arc::clone(&entry),
                        Arc::clone(&binding),
                        HttpRequest::new(query, &params, request),
                    )
                },
            )
        })
    }

    /// Maps a type-erased declaration whose instances come from `provider`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidCapabilityType`] if `decl` is not
    /// a capability, or [`RegistrationError::DuplicateRoute`].
    pub fn map_declared(
        &mut self,
        decl: &TypeDecl,
        provider: InstanceProvider,
    ) -> Result<&mut Self, RegistrationError> {
        let binding = Arc::clone(&self.binding);
        self.compile(decl, |entry| {
            let provider = Arc::clone(&provider);
            let binding = Arc::clone(&binding);
            on(
                method_filter(entry.verb),
                move |params: RawPathParams, Query(query): QueryPairs, request: Request| {
                    handle(
                        provider(),
                        Arc::clone(&entry),
                        Arc::clone(&binding),
                        HttpRequest::new(query, &params, request),
                    )
                },
            )
        })
    }

    /// Maps every capability of `catalog`. Plain declarations and
    /// declarations without an implementation are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::NoCapabilities`] when the catalog holds
    /// no routable capability, or the first error from [`Self::map_declared`].
    pub fn map_all(&mut self, catalog: &CapabilityCatalog) -> Result<&mut Self, RegistrationError> {
        for skipped in catalog.entries().iter().filter(|entry| !entry.is_routable()) {
            debug!(
                type_name = skipped.decl.name,
                implemented = skipped.provider.is_some(),
                "skipping unroutable type"
            );
        }

        let mut mapped = 0usize;
        for entry in catalog.capabilities() {
            if let Some(provider) = &entry.provider {
                self.map_declared(&entry.decl, Arc::clone(provider))?;
                mapped += 1;
            }
        }

        if mapped == 0 {
            return Err(RegistrationError::NoCapabilities);
        }
        Ok(self)
    }

    /// Routes registered so far.
    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Consumes the compiler, returning the router.
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Consumes the compiler, returning the route table and the router.
    #[must_use]
    pub fn into_parts(self) -> (RouteTable, Router) {
        (self.table, self.router)
    }

    /// Shared path for all mapping forms: scan, derive paths, reserve them
    /// in the table, then mount one method router per operation.
    fn compile<F>(&mut self, decl: &TypeDecl, mut make_route: F) -> Result<&mut Self, RegistrationError>
    where
        F: FnMut(Arc<RouteEntry>) -> MethodRouter,
    {
        let operations = scan(decl)?;
        let resource = resource_name(decl.name);

        let batch = operations
            .into_iter()
            .map(|operation| RouteEntry {
                verb: operation.verb,
                path: route_path(&self.base_route, &resource, operation.name),
                type_name: decl.name,
                resource: resource.clone(),
                operation,
            })
            .collect();
        let inserted = self.table.insert_all(batch)?;

        if inserted.is_empty() {
            warn!(type_name = decl.name, "capability has no routable operations");
        }

        for entry in inserted {
            info!(
                type_name = entry.type_name,
                verb = %entry.verb,
                path = %entry.path,
                "mapped operation"
            );
            let route = make_route(Arc::clone(&entry));
            let router = std::mem::replace(&mut self.router, Router::new());
            self.router = router.route(&entry.path, route);
        }

        Ok(self)
    }
}

/// Builds `{base_route}/{resource}/{operation}`.
#[must_use]
pub fn route_path(base_route: &str, resource: &str, operation: &str) -> String {
    format!("{base_route}/{resource}/{operation}")
}

/// Trims trailing slashes and checks that the route is empty or rooted.
///
/// # Errors
///
/// Returns [`RegistrationError::InvalidBaseRoute`] for relative routes.
pub fn normalize_base_route(base_route: &str) -> Result<String, RegistrationError> {
    let trimmed = base_route.trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') {
        Ok(trimmed.to_string())
    } else {
        Err(RegistrationError::InvalidBaseRoute {
            base_route: base_route.to_string(),
        })
    }
}

fn method_filter(verb: Verb) -> MethodFilter {
    match verb {
        Verb::Get => MethodFilter::GET,
        Verb::Post => MethodFilter::POST,
    }
}

/// Per-request pipeline: bind, dispatch, respond.
async fn handle<C>(
    target: Arc<C>,
    entry: Arc<RouteEntry>,
    binding: Arc<BindingConfig>,
    mut request: HttpRequest,
) -> Result<Response, ApiError>
where
    C: Capability + ?Sized,
{
    let args = match bind(&entry.operation, &mut request, &binding).await {
        Ok(args) => args,
        Err(err) => {
            record(&entry, "rejected");
            return Err(err.into());
        }
    };

    let result = dispatch(target.as_ref(), &entry.resource, &entry.operation, args).await;
    record(&entry, if result.is_ok() { "ok" } else { "error" });

    Ok(success(result?))
}

fn record(entry: &RouteEntry, outcome: &'static str) {
    metrics::counter!(
        "dynapi_operations_total",
        "resource" => entry.resource.clone(),
        "operation" => entry.operation.name,
        "outcome" => outcome
    )
    .increment(1);
}
