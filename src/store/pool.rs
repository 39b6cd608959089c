//! Bounded connection pool

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::error::StoreError;

/// Opens and checks connections for a [`Pool`]
pub trait ManageConnection: Send + Sync + 'static {
    type Connection: Send + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Open a new connection
    fn connect(&self) -> Result<Self::Connection, Self::Error>;

    /// Liveness check run before a connection is handed out
    fn is_valid(&self, conn: &mut Self::Connection) -> Result<(), Self::Error>;

    /// Quick check on return; broken connections are discarded
    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

struct PoolState<C> {
    idle: Vec<C>,
    /// Connections alive, idle or checked out
    open: usize,
}

struct PoolInner<M: ManageConnection> {
    manager: M,
    max_size: usize,
    checkout_timeout: Duration,
    state: Mutex<PoolState<M::Connection>>,
    available: Condvar,
}

/// Counts reported by [`Pool::status`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub open: usize,
    pub idle: usize,
}

/// A pool of at most `max_size` independent connections.
///
/// A checked-out connection belongs to one caller until its
/// [`PooledConnection`] is dropped. Connections are opened lazily.
pub struct Pool<M: ManageConnection> {
    inner: Arc<PoolInner<M>>,
}

impl<M: ManageConnection> Clone for Pool<M> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<M: ManageConnection> Pool<M> {
    pub fn new(manager: M, max_size: usize, checkout_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                manager,
                max_size: max_size.max(1),
                checkout_timeout,
                state: Mutex::new(PoolState { idle: Vec::new(), open: 0 }),
                available: Condvar::new(),
            }),
        }
    }

    pub fn manager(&self) -> &M {
        &self.inner.manager
    }

    pub fn max_size(&self) -> usize {
        self.inner.max_size
    }

    pub fn status(&self) -> PoolStatus {
        let state = self.lock();
        PoolStatus { open: state.open, idle: state.idle.len() }
    }

    /// Check out a live connection, reusing an idle one when possible
    pub fn get(&self) -> Result<PooledConnection<M>, StoreError> {
        self.checkout(false)
    }

    /// Check out a newly opened connection, closing idle ones to make room
    pub fn get_fresh(&self) -> Result<PooledConnection<M>, StoreError> {
        self.checkout(true)
    }

    /// Run `f` on a connection, retrying once on a fresh connection when the
    /// first attempt reports [`StoreError::Stale`]
    pub fn run<T>(
        &self,
        mut f: impl FnMut(&mut M::Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut conn = self.get()?;
        match f(&mut *conn) {
            Err(StoreError::Stale(source)) => {
                warn!(error = %source, "stale connection, retrying on a fresh one");
                conn.mark_broken();
                drop(conn);
                let mut fresh = self.get_fresh()?;
                let result = f(&mut *fresh);
                if matches!(result, Err(StoreError::Stale(_))) {
                    fresh.mark_broken();
                }
                result
            }
            other => other,
        }
    }

    fn lock(&self) -> MutexGuard<'_, PoolState<M::Connection>> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn checkout(&self, fresh: bool) -> Result<PooledConnection<M>, StoreError> {
        let timeout = self.inner.checkout_timeout;
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        loop {
            if let Some(mut conn) = state.idle.pop() {
                if fresh {
                    state.open -= 1;
                    drop(conn);
                    continue;
                }
                drop(state);
                match self.inner.manager.is_valid(&mut conn) {
                    Ok(()) => return Ok(PooledConnection::new(self.clone(), conn)),
                    Err(e) => {
                        warn!(error = %e, "dropping connection that failed its liveness check");
                        drop(conn);
                        self.release_slot();
                        state = self.lock();
                        continue;
                    }
                }
            }

            if state.open < self.inner.max_size {
                state.open += 1;
                drop(state);
                return match self.inner.manager.connect() {
                    Ok(conn) => {
                        debug!("opened store connection");
                        Ok(PooledConnection::new(self.clone(), conn))
                    }
                    Err(e) => {
                        self.release_slot();
                        Err(StoreError::Connect(Box::new(e)))
                    }
                };
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(StoreError::PoolTimeout(timeout));
            }
            let (next, _) = self
                .inner
                .available
                .wait_timeout(state, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            state = next;
        }
    }

    fn release_slot(&self) {
        let mut state = self.lock();
        state.open = state.open.saturating_sub(1);
        drop(state);
        self.inner.available.notify_one();
    }

    fn put_back(&self, conn: M::Connection) {
        let mut state = self.lock();
        state.idle.push(conn);
        drop(state);
        self.inner.available.notify_one();
    }
}

/// A connection on loan from a [`Pool`]; returned when dropped
pub struct PooledConnection<M: ManageConnection> {
    pool: Pool<M>,
    conn: Option<M::Connection>,
    broken: bool,
}

impl<M: ManageConnection> PooledConnection<M> {
    fn new(pool: Pool<M>, conn: M::Connection) -> Self {
        Self { pool, conn: Some(conn), broken: false }
    }

    /// Discard the connection instead of returning it
    pub fn mark_broken(&mut self) {
        self.broken = true;
    }
}

impl<M: ManageConnection> Deref for PooledConnection<M> {
    type Target = M::Connection;

    fn deref(&self) -> &Self::Target {
        match &self.conn {
            Some(conn) => conn,
            None => unreachable!("connection released before drop"),
        }
    }
}

impl<M: ManageConnection> DerefMut for PooledConnection<M> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match &mut self.conn {
            Some(conn) => conn,
            None => unreachable!("connection released before drop"),
        }
    }
}

impl<M: ManageConnection> Drop for PooledConnection<M> {
    fn drop(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            if self.broken || self.pool.inner.manager.has_broken(&mut conn) {
                warn!("discarding broken connection");
                drop(conn);
                self.pool.release_slot();
            } else {
                self.pool.put_back(conn);
            }
        }
    }
}
