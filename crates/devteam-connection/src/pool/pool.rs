//! Connection pool implementation

use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use devteam_core::{Connection, DevteamError, Result};
use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::config::PoolConfig;
use super::stats::PoolStats;

/// Factory trait for opening new connections
#[async_trait]
pub trait ConnectionFactory: Send + Sync + 'static {
    /// Open a new connection
    async fn open(&self) -> Result<Arc<dyn Connection>>;

    /// Check that a connection is still usable.
    ///
    /// Default implementation only looks at the closed flag; factories may
    /// override this with a round-trip check.
    async fn validate(&self, conn: &dyn Connection) -> bool {
        !conn.is_closed()
    }
}

#[async_trait]
impl<T: ConnectionFactory> ConnectionFactory for Arc<T> {
    async fn open(&self) -> Result<Arc<dyn Connection>> {
        (**self).open().await
    }

    async fn validate(&self, conn: &dyn Connection) -> bool {
        (**self).validate(conn).await
    }
}

/// Idle-set entry carrying checkout bookkeeping
struct IdleConnection {
    connection: Arc<dyn Connection>,
    parked_at: Instant,
}

impl IdleConnection {
    fn new(connection: Arc<dyn Connection>) -> Self {
        Self {
            connection,
            parked_at: Instant::now(),
        }
    }
}

/// A bounded pool of reusable database connections.
///
/// The pool is an explicitly constructed instance shared via `Arc` — there
/// is no process-global state. `max_size` is enforced by a semaphore: a
/// checkout holds a permit for its whole lifetime, so
/// `idle + active <= max_size` at all times. Connections found dead at
/// checkout are closed and transparently replaced; callers never observe a
/// closed connection.
pub struct ConnectionPool {
    /// Pool configuration
    config: PoolConfig,
    /// Connection factory
    factory: Arc<dyn ConnectionFactory>,
    /// Available connections
    idle: Mutex<VecDeque<IdleConnection>>,
    /// Caps concurrent checkouts at `max_size`
    semaphore: Arc<Semaphore>,
    /// Connections currently checked out
    active_count: AtomicUsize,
    /// Callers blocked in `acquire`
    waiting_count: AtomicUsize,
}

impl ConnectionPool {
    /// Create a new pool with the given configuration and factory.
    ///
    /// The pool starts empty; call [`ConnectionPool::warm_up`] to open the
    /// configured minimum number of connections.
    pub fn new<F: ConnectionFactory>(config: PoolConfig, factory: F) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_size()));
        Self {
            config,
            factory: Arc::new(factory),
            idle: Mutex::new(VecDeque::new()),
            semaphore,
            active_count: AtomicUsize::new(0),
            waiting_count: AtomicUsize::new(0),
        }
    }

    /// Pre-populate the available set with `min_size` connections.
    ///
    /// Fails fast: the first connection that cannot be opened aborts the
    /// warm-up and the error propagates to the caller, rather than leaving
    /// a silently half-populated pool.
    #[tracing::instrument(skip(self))]
    pub async fn warm_up(&self) -> Result<()> {
        for _ in 0..self.config.min_size() {
            let connection = self.factory.open().await.map_err(|e| {
                tracing::error!(error = %e, "pool warm-up failed");
                e
            })?;
            self.idle.lock().push_back(IdleConnection::new(connection));
        }
        tracing::info!(
            min_size = self.config.min_size(),
            max_size = self.config.max_size(),
            "connection pool warmed up"
        );
        Ok(())
    }

    /// Check a connection out of the pool.
    ///
    /// Order of preference:
    /// 1. a validated connection from the available set;
    /// 2. a freshly opened connection, when under `max_size`;
    /// 3. wait until another checkout is returned.
    ///
    /// With no acquire timeout configured the wait in step 3 is unbounded.
    /// When a timeout is set, expiry surfaces as [`DevteamError::Timeout`].
    pub async fn acquire(self: &Arc<Self>) -> Result<PooledConnection> {
        // Decrements on every exit path, including cancellation of the
        // acquire future itself.
        let _waiting = CounterGuard::increment(&self.waiting_count);

        let result = match self.config.acquire_timeout() {
            Some(limit) => match tokio::time::timeout(limit, self.checkout()).await {
                Ok(result) => result,
                Err(_) => Err(DevteamError::Timeout(format!(
                    "no connection became available within {:?}",
                    limit
                ))),
            },
            None => self.checkout().await,
        };

        if let Err(ref error) = result {
            tracing::error!(error = %error, "failed to acquire connection");
        }
        result
    }

    async fn checkout(self: &Arc<Self>) -> Result<PooledConnection> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| DevteamError::Connection("pool semaphore closed".into()))?;

        let connection = match self.take_idle().await {
            Some(conn) => conn,
            None => self.factory.open().await?,
        };

        self.active_count.fetch_add(1, Ordering::SeqCst);

        Ok(PooledConnection {
            connection: Some(connection),
            pool: Arc::clone(self),
            _permit: permit,
        })
    }

    /// Pop idle connections until one passes validation.
    ///
    /// Expired or dead entries are closed and skipped; the caller opens a
    /// replacement when the set runs dry.
    async fn take_idle(&self) -> Option<Arc<dyn Connection>> {
        loop {
            let parked = { self.idle.lock().pop_front() };

            match parked {
                Some(entry) => {
                    if entry.parked_at.elapsed() > self.config.idle_timeout() {
                        let _ = entry.connection.close().await;
                        continue;
                    }

                    if !self.factory.validate(&*entry.connection).await {
                        tracing::debug!("replacing stale connection found at checkout");
                        let _ = entry.connection.close().await;
                        continue;
                    }

                    return Some(entry.connection);
                }
                None => return None,
            }
        }
    }

    /// Return a connection to the available set.
    ///
    /// Called from the checkout guard's `Drop`; runs exactly once per
    /// checkout. Closed connections are discarded instead of re-pooled —
    /// the permit held by the guard is released either way, so the
    /// capacity slot is never lost.
    fn return_connection(&self, connection: Arc<dyn Connection>) {
        self.active_count.fetch_sub(1, Ordering::SeqCst);

        if connection.is_closed() {
            tracing::debug!("discarding closed connection instead of re-pooling it");
            return;
        }

        self.idle.lock().push_back(IdleConnection::new(connection));
    }

    /// Get current pool statistics
    pub fn stats(&self) -> PoolStats {
        let idle = self.idle.lock().len();
        let active = self.active_count.load(Ordering::SeqCst);
        let waiting = self.waiting_count.load(Ordering::SeqCst);
        PoolStats {
            total: idle + active,
            idle,
            active,
            waiting,
        }
    }

    /// Get the pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Close and drain all idle connections
    #[tracing::instrument(skip(self))]
    pub async fn close_idle(&self) {
        let drained: Vec<_> = {
            let mut idle = self.idle.lock();
            idle.drain(..).collect()
        };

        for entry in drained {
            let _ = entry.connection.close().await;
        }
    }
}

/// Increments a counter for the guard's lifetime
struct CounterGuard<'a>(&'a AtomicUsize);

impl<'a> CounterGuard<'a> {
    fn increment(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for CounterGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A connection checked out of the pool.
///
/// Holds the capacity permit for its whole lifetime and returns the
/// connection to the pool on drop, which gives callers the
/// "released exactly once, even on error paths" guarantee for free.
pub struct PooledConnection {
    connection: Option<Arc<dyn Connection>>,
    pool: Arc<ConnectionPool>,
    _permit: OwnedSemaphorePermit,
}

impl Deref for PooledConnection {
    type Target = dyn Connection;

    fn deref(&self) -> &Self::Target {
        self.connection
            .as_ref()
            .expect("connection present until drop")
            .as_ref()
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.connection.take() {
            self.pool.return_connection(conn);
        }
    }
}

impl PooledConnection {
    /// Get the underlying connection as an Arc
    pub fn inner(&self) -> &Arc<dyn Connection> {
        self.connection
            .as_ref()
            .expect("connection present until drop")
    }
}
