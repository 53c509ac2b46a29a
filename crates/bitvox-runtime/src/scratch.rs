use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, bounded};

/// Recycles large transient buffers between pipeline stages.
pub struct ScratchPool<T> {
    available_tx: Sender<T>,
    available_rx: Receiver<T>,
}

impl<T: Send> ScratchPool<T> {
    pub fn new(capacity: usize) -> Arc<Self> {
        let (tx, rx) = bounded(capacity.max(1));
        Arc::new(Self {
            available_tx: tx,
            available_rx: rx,
        })
    }

    /// Reuses a parked buffer or builds a new one with `make`.
    pub fn acquire(self: &Arc<Self>, make: impl FnOnce() -> T) -> Pooled<T> {
        let item = self.available_rx.try_recv().unwrap_or_else(|_| make());
        Pooled {
            item: Some(item),
            pool: Arc::clone(self),
        }
    }

    /// Buffers currently parked.
    pub fn idle(&self) -> usize {
        self.available_rx.len()
    }

    fn release(&self, item: T) {
        // Full pool: let the buffer drop.
        let _ = self.available_tx.try_send(item);
    }
}

/// Owned buffer that goes back to its pool when dropped.
pub struct Pooled<T: Send> {
    item: Option<T>,
    pool: Arc<ScratchPool<T>>,
}

impl<T: Send> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.item.as_ref().expect("scratch buffer already released")
    }
}

impl<T: Send> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.item.as_mut().expect("scratch buffer already released")
    }
}

impl<T: Send> Drop for Pooled<T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.release(item);
        }
    }
}
