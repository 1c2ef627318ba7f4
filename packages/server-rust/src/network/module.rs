//! HTTP server with deferred startup.
//!
//! `new()` takes the compiled router, `start()` binds the TCP listener and
//! `serve()` accepts connections until the shutdown future resolves. The
//! bound port is known between `start()` and `serve()`, which lets callers
//! log or publish it (and lets tests bind port 0).

use std::future::Future;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use super::config::NetworkConfig;
use super::middleware::with_http_layers;

/// Serves a compiled router behind the HTTP middleware stack.
pub struct ApiServer {
    config: NetworkConfig,
    router: Router,
    listener: Option<TcpListener>,
}

impl ApiServer {
    /// Creates a server without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig, router: Router) -> Self {
        Self {
            config,
            router,
            listener: None,
        }
    }

    /// The compiled routes wrapped in the middleware stack.
    #[must_use]
    pub fn app(&self) -> Router {
        with_http_layers(self.router.clone(), &self.config)
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the bound port, which differs from the configured one when
    /// port 0 is used.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!("TCP listener bound to {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves requests until `shutdown` resolves, then lets in-flight
    /// requests finish.
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called first or the server
    /// hits a fatal I/O error.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let app = self.app();
        let Some(listener) = self.listener else {
            anyhow::bail!("start() must be called before serve()");
        };

        info!("Serving HTTP connections");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use axum::routing::get;

    use super::*;

    fn config() -> NetworkConfig {
        NetworkConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..NetworkConfig::default()
        }
    }

    #[test]
    fn new_creates_server_without_binding() {
        let server = ApiServer::new(config(), Router::new());
        assert!(server.listener.is_none());
    }

    #[tokio::test]
    async fn start_binds_to_os_assigned_port() {
        let mut server = ApiServer::new(config(), Router::new());
        let port = server.start().await.expect("start should succeed");
        assert!(port > 0, "OS-assigned port should be > 0");
        assert!(server.listener.is_some());
    }

    #[tokio::test]
    async fn serve_without_start_fails() {
        let server = ApiServer::new(config(), Router::new());
        let err = server.serve(std::future::ready(())).await.unwrap_err();
        assert!(err.to_string().contains("start()"));
    }

    #[tokio::test]
    async fn app_applies_middleware() {
        use axum::body::Body;
        use axum::extract::Request;
        use tower::ServiceExt;

        let router = Router::new().route("/ping", get(|| async { "pong" }));
        let server = ApiServer::new(config(), router);

        let request = Request::builder().uri("/ping").body(Body::empty()).unwrap();
        let response = server.app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn serves_until_shutdown() {
        let router = Router::new().route("/ping", get(|| async { "pong" }));
        let mut server = ApiServer::new(config(), router);
        let port = server.start().await.unwrap();

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(server.serve(async {
            let _ = rx.await;
        }));

        let stream = tokio::net::TcpStream::connect(("127.0.0.1", port)).await;
        assert!(stream.is_ok());
        drop(stream);

        tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
