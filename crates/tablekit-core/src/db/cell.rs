use crate::{
    config,
    db::TableHandle,
    error::{ConnectionError, Error},
    registry,
    traits::{Model, Objects},
};
use std::sync::{Mutex, OnceLock, TryLockError};

///
/// ModelCell
///
/// Per-type slot for the registry-bound handle. Bound once, on the first
/// `objects()` call, with the config installed at that moment.
///

#[derive(Debug, Default)]
pub struct ModelCell {
    handle: OnceLock<Mutex<TableHandle>>,
}

impl ModelCell {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            handle: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.handle.get().is_some()
    }

    /// Lock the bound handle, registering `M` and opening its handle first
    /// if this is the first call.
    ///
    /// Fails with `ConnectionError::Busy` while another `Objects` guard for
    /// the same type is alive, rather than waiting on it.
    pub fn get_or_register<M: Model>(&'static self) -> Result<Objects, Error> {
        if let Some(handle) = self.handle.get() {
            return lock::<M>(handle);
        }

        let schema = registry::register::<M>()?;
        let handle = TableHandle::open(schema, &config::current()?)?;

        // a concurrent first call may have won; its handle is kept
        lock::<M>(self.handle.get_or_init(|| Mutex::new(handle)))
    }
}

// Every statement commits on its own, so a panic while the guard is held
// cannot leave a half-applied write behind; a poisoned lock is recovered.
fn lock<M: Model>(handle: &'static Mutex<TableHandle>) -> Result<Objects, Error> {
    match handle.try_lock() {
        Ok(guard) => Ok(guard),
        Err(TryLockError::Poisoned(poisoned)) => Ok(poisoned.into_inner()),
        Err(TryLockError::WouldBlock) => Err(ConnectionError::Busy {
            table: M::table_name(),
        }
        .into()),
    }
}
