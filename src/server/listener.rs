use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{Instrument, error, info, info_span};

use crate::config::{Config, Limits};
use crate::http::connection::Connection;
use crate::http::handler::Handler;

pub async fn run(cfg: &Config, handler: Arc<dyn Handler>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.listen_addr))?;
    info!("Listening on {}", cfg.listen_addr);

    serve(listener, cfg.limits(), handler).await
}

/// Accepts connections forever, one task each. Accept errors are logged and
/// skipped so a transient failure (e.g. out of file descriptors) does not
/// stop the server.
pub async fn serve(
    listener: TcpListener,
    limits: Limits,
    handler: Arc<dyn Handler>,
) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!(error = %e, "Accept failed");
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let handler = handler.clone();
        tokio::spawn(
            async move {
                let mut conn = Connection::new(socket, limits, handler);
                if let Err(e) = conn.run().await {
                    error!("Connection error from {}: {:#}", peer, e);
                }
            }
            .instrument(info_span!("conn", %peer)),
        );
    }
}
