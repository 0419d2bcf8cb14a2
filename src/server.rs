//! DNS server setup and lifecycle management.

use hickory_server::ServerFuture;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::error::Error;
use crate::handler::{Registry, ToyHandler};
use crate::snapshot::Snapshotter;

/// DNS server that answers toy lookup queries over UDP.
pub struct ToyServer {
    config: ServerConfig,
    registry: Arc<Registry>,
    snapshotter: Arc<Snapshotter>,
}

impl ToyServer {
    /// Create a new server over a populated registry.
    pub fn new(config: ServerConfig, registry: Arc<Registry>, snapshotter: Arc<Snapshotter>) -> Self {
        Self {
            config,
            registry,
            snapshotter,
        }
    }

    /// Run the server until `shutdown` flips to true. Snapshots are
    /// flushed before returning.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<(), Error> {
        info!(
            listen_addr = %self.config.listen_addr,
            domain = %self.config.domain,
            "starting toydns server"
        );

        let mut server = ServerFuture::new(ToyHandler::new(self.registry));

        let udp_socket = UdpSocket::bind(self.config.listen_addr).await?;
        info!(addr = %self.config.listen_addr, "DNS UDP listening");
        server.register_socket(udp_socket);

        tokio::select! {
            _ = shutdown.changed() => {
                info!("shutdown requested");
            }
            result = server.block_until_done() => {
                if let Err(e) = result {
                    error!(error = %e, "DNS server error");
                }
            }
        }

        self.snapshotter.save_all();

        info!("toydns server stopped");
        Ok(())
    }
}
