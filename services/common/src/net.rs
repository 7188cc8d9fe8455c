use std::{io, net::SocketAddr};

use thiserror::Error;
use tokio::net::TcpListener;

/// The listener could not acquire its address. Fatal at startup.
#[derive(Debug, Error)]
#[error("failed to bind listener on {addr}: {source}")]
pub struct BindError {
    pub addr: SocketAddr,
    #[source]
    pub source: io::Error,
}

/// Binds on all interfaces. Port `0` picks an ephemeral port.
pub async fn bind_listener(port: u16) -> Result<TcpListener, BindError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    TcpListener::bind(addr)
        .await
        .map_err(|source| BindError { addr, source })
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "sigterm handler unavailable");
                ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c.await;

    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::bind_listener;

    #[tokio::test]
    async fn binds_ephemeral_port() {
        let listener = bind_listener(0).await.expect("bind");
        assert_ne!(listener.local_addr().expect("addr").port(), 0);
    }

    #[tokio::test]
    async fn occupied_port_is_a_bind_error() {
        let first = bind_listener(0).await.expect("bind");
        let port = first.local_addr().expect("addr").port();

        let err = bind_listener(port).await.expect_err("port already taken");
        assert_eq!(err.addr.port(), port);
        assert_eq!(err.source.kind(), std::io::ErrorKind::AddrInUse);
        assert!(err.to_string().contains(&port.to_string()));
    }
}
