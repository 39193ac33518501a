//! Connection pool for master clients.
//!
//! The pool leases [`MasterClient`] channels to dispatch calls. Channels are
//! opened lazily through a [`MasterConnector`] up to `max_clients`; when all
//! of them are leased, [`MasterClientPool::acquire`] blocks until one is
//! returned. A lease is a [`PooledMasterClient`] guard that gives its channel
//! back exactly once, either explicitly or when dropped.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::master::{MasterClient, MasterConnector};

/// Configuration for the master client pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of open master channels.
    pub max_clients: usize,
    /// How long `acquire` waits for a free channel; `None` waits until one is released.
    pub acquire_timeout_ms: Option<u64>,
    /// Connection timeout for new channels.
    pub connect_timeout_ms: u64,
    /// Read/write timeout for a single master call.
    pub io_timeout_ms: u64,
    /// Extra connection attempts after the first failure. Zero fails immediately.
    pub connect_retries: u32,
    /// Fixed delay between connection attempts.
    pub retry_backoff_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_clients: 8,
            acquire_timeout_ms: None,
            connect_timeout_ms: 5000,
            io_timeout_ms: 30_000,
            connect_retries: 2,
            retry_backoff_ms: 200,
        }
    }
}

/// Statistics about the master client pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Open channels, leased or idle.
    pub total: usize,
    /// Channels waiting in the pool.
    pub idle: usize,
    /// Channels currently leased.
    pub active: usize,
    /// Successful `acquire` calls.
    pub acquired: u64,
    /// Leases returned, including discarded ones.
    pub released: u64,
    /// Leases returned whose channel was dropped instead of reused.
    pub discarded: u64,
    /// Failed attempts to open a channel.
    pub connect_failures: u64,
}

struct PoolState {
    idle: Vec<Box<dyn MasterClient>>,
    /// Open channels plus reserved slots for channels being opened.
    total: usize,
    closed: bool,
    stats: PoolStats,
}

/// A bounded, lazily filled pool of master channels. Safe to share across threads.
pub struct MasterClientPool {
    config: PoolConfig,
    connector: Arc<dyn MasterConnector>,
    state: Mutex<PoolState>,
    available: Condvar,
}

impl MasterClientPool {
    /// Creates an empty pool; no channel is opened until the first `acquire`.
    pub fn new(config: PoolConfig, connector: Arc<dyn MasterConnector>) -> Self {
        Self {
            config,
            connector,
            state: Mutex::new(PoolState {
                idle: Vec::new(),
                total: 0,
                closed: false,
                stats: PoolStats::default(),
            }),
            available: Condvar::new(),
        }
    }

    /// The configuration the pool was built with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Address of the master this pool connects to.
    pub fn master_address(&self) -> &str {
        self.connector.address()
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        // A panic while holding the lock cannot leave the counters half updated.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Leases a channel, reusing an idle one or opening a new one.
    ///
    /// Blocks while every channel is leased and the pool is at capacity.
    pub fn acquire(&self) -> Result<PooledMasterClient<'_>, TransportError> {
        let started = Instant::now();
        let deadline = self
            .config
            .acquire_timeout_ms
            .map(|ms| started + Duration::from_millis(ms));

        let mut state = self.lock();
        loop {
            if state.closed {
                return Err(TransportError::PoolClosed);
            }
            if let Some(client) = state.idle.pop() {
                state.stats.acquired += 1;
                return Ok(PooledMasterClient::new(self, client));
            }
            if state.total < self.config.max_clients.max(1) {
                state.total += 1;
                break;
            }
            state = match deadline {
                None => self
                    .available
                    .wait(state)
                    .unwrap_or_else(|poisoned| poisoned.into_inner()),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(TransportError::PoolExhausted {
                            waited_ms: started.elapsed().as_millis() as u64,
                        });
                    }
                    self.available
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .0
                }
            };
        }
        drop(state);

        // The slot is reserved; open the channel without holding the lock.
        match self.connect_with_retry() {
            Ok(client) => {
                let mut state = self.lock();
                if state.closed {
                    state.total -= 1;
                    return Err(TransportError::PoolClosed);
                }
                state.stats.acquired += 1;
                debug!(master = %self.connector.address(), total = state.total, "opened master client");
                Ok(PooledMasterClient::new(self, client))
            }
            Err(e) => {
                let mut state = self.lock();
                state.total -= 1;
                drop(state);
                self.available.notify_one();
                Err(e)
            }
        }
    }

    fn connect_with_retry(&self) -> Result<Box<dyn MasterClient>, TransportError> {
        let mut attempt = 0;
        loop {
            match self.connector.connect() {
                Ok(client) => return Ok(client),
                Err(e) => {
                    self.lock().stats.connect_failures += 1;
                    if attempt >= self.config.connect_retries {
                        warn!(
                            master = %self.connector.address(),
                            attempts = attempt + 1,
                            error = %e,
                            "unable to connect to master"
                        );
                        return Err(e);
                    }
                    attempt += 1;
                    debug!(master = %self.connector.address(), attempt, error = %e, "retrying master connection");
                    thread::sleep(Duration::from_millis(self.config.retry_backoff_ms));
                }
            }
        }
    }

    /// Gives a leased channel back. Broken channels are dropped and their
    /// capacity freed for a fresh connection.
    fn release(&self, client: Box<dyn MasterClient>, discard: bool) {
        let mut state = self.lock();
        state.stats.released += 1;
        if discard || state.closed || !client.is_connected() {
            state.total -= 1;
            state.stats.discarded += 1;
            drop(state);
            drop(client);
        } else {
            state.idle.push(client);
            drop(state);
        }
        self.available.notify_one();
    }

    /// Drops idle channels and fails every pending and future `acquire`.
    /// Leased channels are dropped when they come back.
    pub fn close(&self) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        let idle = std::mem::take(&mut state.idle);
        state.total -= idle.len();
        drop(state);
        drop(idle);
        self.available.notify_all();
        debug!(master = %self.connector.address(), "master client pool closed");
    }

    /// True after [`MasterClientPool::close`].
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Current counters; `total`, `idle` and `active` are read under one lock.
    pub fn stats(&self) -> PoolStats {
        let state = self.lock();
        PoolStats {
            total: state.total,
            idle: state.idle.len(),
            active: state.total - state.idle.len(),
            ..state.stats.clone()
        }
    }
}

/// A leased master channel. Returned to the pool exactly once.
pub struct PooledMasterClient<'a> {
    pool: &'a MasterClientPool,
    client: Option<Box<dyn MasterClient>>,
}

impl<'a> PooledMasterClient<'a> {
    fn new(pool: &'a MasterClientPool, client: Box<dyn MasterClient>) -> Self {
        Self {
            pool,
            client: Some(client),
        }
    }

    /// Returns the channel to the pool for reuse.
    pub fn release(mut self) {
        if let Some(client) = self.client.take() {
            self.pool.release(client, false);
        }
    }

    /// Returns the lease but drops the channel, e.g. after a transport failure.
    pub fn discard(mut self) {
        if let Some(client) = self.client.take() {
            self.pool.release(client, true);
        }
    }
}

impl Deref for PooledMasterClient<'_> {
    type Target = dyn MasterClient;

    fn deref(&self) -> &Self::Target {
        match &self.client {
            Some(client) => &**client,
            None => unreachable!("lease used after release"),
        }
    }
}

impl DerefMut for PooledMasterClient<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match &mut self.client {
            Some(client) => &mut **client,
            None => unreachable!("lease used after release"),
        }
    }
}

impl Drop for PooledMasterClient<'_> {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            self.pool.release(client, false);
        }
    }
}
