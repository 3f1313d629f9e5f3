mod auth;
mod health;

use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use murmur_config::Config;
use tower_http::trace::TraceLayer;

pub use health::HealthState;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// The speech engine is initialized here, so a broken engine stops startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the speech service cannot be built or the engine
    /// fails to initialize
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let listen_address = config.server.listen_address;

        let tts_state = tts::build_server(&config)?;
        tts_state
            .initialize()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize speech engine: {e}"))?;

        let mut app = Router::new();

        // Health check
        if config.server.health.enabled {
            let health_state = Arc::new(HealthState {
                engine: config.engine.engine_type.to_string(),
                device: config.engine.device.to_string(),
            });
            app = app.route(
                &config.server.health.path,
                axum::routing::get(health::health_handler).with_state(health_state),
            );
        }

        // Speech routes
        app = app.merge(tts::endpoint_router().with_state(tts_state));

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        // API key authentication
        if let Some(ref auth_config) = config.auth
            && let Some(ref api_key) = auth_config.api_key
        {
            let api_key = api_key.clone();
            let public_paths = auth_config.public_paths.clone();
            app = app.layer(axum::middleware::from_fn(move |req, next| {
                let api_key = api_key.clone();
                let public_paths = public_paths.clone();
                async move { auth::auth_middleware(api_key, public_paths, req, next).await }
            }));
        }

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
