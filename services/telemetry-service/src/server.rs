use std::{io, net::SocketAddr};

use asteria_common::{bind_listener, BindError};
use tokio::{sync::oneshot, task::JoinHandle};

use crate::app;

/// A running listener. Dropping it without [`ServiceHandle::stop`] leaves the
/// accept loop running for the life of the runtime.
pub struct ServiceHandle {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    serve: JoinHandle<io::Result<()>>,
}

/// Binds `port` and starts serving on a separate task. Returns once the
/// socket is bound.
pub async fn start(port: u16) -> Result<ServiceHandle, BindError> {
    let listener = bind_listener(port).await?;
    let local_addr = listener.local_addr().map_err(|source| BindError {
        addr: SocketAddr::from(([0, 0, 0, 0], port)),
        source,
    })?;

    let (shutdown, shutdown_rx) = oneshot::channel::<()>();
    let router = app::build_router();
    let serve = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tracing::info!(%local_addr, "telemetry service listening");
    Ok(ServiceHandle {
        local_addr,
        shutdown,
        serve,
    })
}

impl ServiceHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting, waits for in-flight requests, then releases the socket.
    pub async fn stop(self) -> io::Result<()> {
        let _ = self.shutdown.send(());
        let result = self.serve.await.map_err(io::Error::other)?;
        tracing::info!(local_addr = %self.local_addr, "telemetry service stopped");
        result
    }
}
