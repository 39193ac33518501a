//! Explicitly constructed client context.
//!
//! A [`FileSystemContext`] owns the master client pool and the stream
//! factory. It is built once by the application and shared through an
//! `Arc`; there is no process-wide instance.

use std::sync::Arc;

use tracing::info;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::master::MasterConnector;
use crate::pool::{MasterClientPool, PoolStats, PooledMasterClient};
use crate::stream::{LocalTierStreamFactory, StreamFactory};
use crate::tcp::TcpMasterConnector;

/// Pool and stream factory shared by every [`crate::BaseFileSystem`] built on it.
pub struct FileSystemContext {
    pool: MasterClientPool,
    stream_factory: Arc<dyn StreamFactory>,
}

impl FileSystemContext {
    /// Context over an arbitrary connector and stream factory.
    pub fn new(
        config: &ClientConfig,
        connector: Arc<dyn MasterConnector>,
        stream_factory: Arc<dyn StreamFactory>,
    ) -> Self {
        let pool = MasterClientPool::new(config.pool.clone(), connector);
        info!(
            master = %pool.master_address(),
            max_clients = config.pool.max_clients,
            "file system context initialized"
        );
        Self {
            pool,
            stream_factory,
        }
    }

    /// Context talking to the configured master over TCP, with streams on
    /// the local tier directory.
    pub fn connect(config: &ClientConfig) -> Self {
        let connector = TcpMasterConnector::new(&config.master_address, config.connector_config());
        let streams = LocalTierStreamFactory::new(&config.local_tier_dir);
        Self::new(config, Arc::new(connector), Arc::new(streams))
    }

    /// Leases a master client, blocking while the pool is at capacity.
    pub fn acquire_master_client(&self) -> Result<PooledMasterClient<'_>, TransportError> {
        self.pool.acquire()
    }

    /// Factory for file byte streams.
    pub fn stream_factory(&self) -> &dyn StreamFactory {
        self.stream_factory.as_ref()
    }

    /// Snapshot of the pool counters.
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Closes the pool. Operations started afterwards fail with a transport error.
    pub fn shutdown(&self) {
        self.pool.close();
        info!(master = %self.pool.master_address(), "file system context shut down");
    }

    /// True after [`FileSystemContext::shutdown`].
    pub fn is_shutdown(&self) -> bool {
        self.pool.is_closed()
    }
}
