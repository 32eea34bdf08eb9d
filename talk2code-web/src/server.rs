//! Talk2Code Web Server
//!
//! Binds the listener and runs the axum app until shutdown.

use crate::{create_app, AppState};
use axum::serve;
use std::net::SocketAddr;
use talk2code_core::{AppConfig, Talk2CodeResult};
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main Talk2Code web server
pub struct Talk2CodeServer {
    state: AppState,
}

impl Talk2CodeServer {
    /// Create a server talking to Azure OpenAI
    pub fn new(config: AppConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }

    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Bind to the configured address and serve until Ctrl-C or SIGTERM
    pub async fn start(self) -> Talk2CodeResult<()> {
        let address = self.config().server.address();
        let listener = TcpListener::bind(&address).await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` completes
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Talk2CodeResult<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let local_addr: SocketAddr = listener.local_addr()?;
        info!("Server listening on http://{}", local_addr);

        let app = create_app(self.state);

        if let Err(e) = serve(listener, app).with_graceful_shutdown(shutdown).await {
            error!("Server error: {}", e);
            return Err(e.into());
        }

        info!("Server shut down gracefully");
        Ok(())
    }
}

/// Builder for [`Talk2CodeServer`] that applies command line overrides
pub struct Talk2CodeServerBuilder {
    config: AppConfig,
}

impl Talk2CodeServerBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn build(self) -> Talk2CodeResult<Talk2CodeServer> {
        self.config.validate()?;
        Ok(Talk2CodeServer::new(self.config))
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
