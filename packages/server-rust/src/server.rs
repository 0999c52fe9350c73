//! Server lifecycle with deferred startup.
//!
//! `new()` holds configuration, `start()` binds the TCP listener and
//! reports the bound port, and `serve()` runs the router until the shutdown
//! future resolves.

use std::future::Future;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::NetworkConfig;
use crate::http::apply_http_layers;

/// Binds and serves an assembled router.
pub struct ApiServer {
    config: NetworkConfig,
    listener: Option<TcpListener>,
}

impl ApiServer {
    /// Creates a server without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            config,
            listener: None,
        }
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

    /// Serves `router`, wrapped in the transport layers, until `shutdown`
    /// resolves. In-flight requests are allowed to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called first or the server hits
    /// a fatal I/O error.
    pub async fn serve(
        self,
        router: Router,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let listener = self
            .listener
            .ok_or_else(|| anyhow::anyhow!("start() must be called before serve()"))?;

        let app = apply_http_layers(router, &self.config);

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
    use super::*;

    #[test]
    fn new_creates_server_without_binding() {
        let server = ApiServer::new(NetworkConfig::default());
        assert!(server.listener.is_none());
    }

    #[tokio::test]
    async fn start_binds_to_os_assigned_port() {
        let mut server = ApiServer::new(NetworkConfig {
            host: "127.0.0.1".to_string(),
            ..NetworkConfig::default()
        });
        let port = server.start().await.expect("start should succeed");
        assert!(port > 0, "OS-assigned port should be > 0");
        assert!(server.listener.is_some());
    }

    #[tokio::test]
    async fn serve_without_start_is_an_error() {
        let server = ApiServer::new(NetworkConfig::default());
        let err = server
            .serve(Router::new(), std::future::pending::<()>())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("start()"));
    }

    #[tokio::test]
    async fn serve_stops_on_shutdown_signal() {
        let mut server = ApiServer::new(NetworkConfig {
            host: "127.0.0.1".to_string(),
            ..NetworkConfig::default()
        });
        server.start().await.unwrap();
        server.serve(Router::new(), async {}).await.unwrap();
    }
}
