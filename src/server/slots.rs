//! Connection slot table
//!
//! A fixed number of slots, each tracking one connection's task through
//! Free → InUse → Finished → Free. The accept loop owns the table and is the
//! only one to claim or reclaim slots; a connection task only ever marks its
//! own slot finished, through the [`SlotLease`] it holds.

use log::{debug, error};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::sync::{Notify, oneshot};
use tokio::task::JoinHandle;

const FREE: u8 = 0;
const IN_USE: u8 = 1;
const FINISHED: u8 = 2;

/// Lifecycle state of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Free,
    InUse,
    Finished,
}

impl SlotState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            IN_USE => SlotState::InUse,
            FINISHED => SlotState::Finished,
            _ => SlotState::Free,
        }
    }
}

#[derive(Default)]
struct ConnectionSlot {
    state: Arc<AtomicU8>,
    task: Option<JoinHandle<()>>,
    closer: Option<oneshot::Sender<()>>,
    client_addr: Option<SocketAddr>,
}

impl ConnectionSlot {
    fn state(&self) -> SlotState {
        SlotState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Waits for the slot's task to exit and frees the slot.
    async fn reclaim(&mut self, index: usize) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Connection task in slot {} ended abnormally: {}", index, e);
            }
        }
        self.closer = None;
        self.client_addr = None;
        self.state.store(FREE, Ordering::Release);
    }
}

/// Exclusive right to a slot, held by the connection task.
///
/// Dropping the lease marks the slot finished and wakes the accept loop.
pub struct SlotLease {
    index: usize,
    state: Arc<AtomicU8>,
    closed: oneshot::Receiver<()>,
    released: Arc<Notify>,
}

impl SlotLease {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Resolves once the server asks for this connection to be closed.
    pub async fn closed(&mut self) {
        let _ = (&mut self.closed).await;
    }
}

impl Drop for SlotLease {
    fn drop(&mut self) {
        self.state.store(FINISHED, Ordering::Release);
        self.released.notify_one();
    }
}

/// Fixed-capacity table of connection slots
pub struct SlotTable {
    slots: Vec<ConnectionSlot>,
    released: Arc<Notify>,
}

impl SlotTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| ConnectionSlot::default()).collect(),
            released: Arc::new(Notify::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn state(&self, index: usize) -> Option<SlotState> {
        self.slots.get(index).map(ConnectionSlot::state)
    }

    /// Number of slots that are not free.
    pub fn occupied(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.state() != SlotState::Free)
            .count()
    }

    /// Notified every time a lease is dropped.
    pub fn release_notifier(&self) -> Arc<Notify> {
        Arc::clone(&self.released)
    }

    /// Index of the first free slot, if any.
    pub fn free_slot(&self) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.state() == SlotState::Free)
    }

    /// Claims a free slot for a new connection.
    ///
    /// Returns `None` if the slot is not free.
    pub fn claim(&mut self, index: usize, client_addr: SocketAddr) -> Option<SlotLease> {
        let slot = self.slots.get_mut(index)?;
        slot.state
            .compare_exchange(FREE, IN_USE, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;

        let (closer, closed) = oneshot::channel();
        slot.closer = Some(closer);
        slot.client_addr = Some(client_addr);

        Some(SlotLease {
            index,
            state: Arc::clone(&slot.state),
            closed,
            released: Arc::clone(&self.released),
        })
    }

    /// Records the task serving a claimed slot.
    pub fn attach(&mut self, index: usize, task: JoinHandle<()>) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.task = Some(task);
        }
    }

    /// Reclaims every finished slot, returning how many were freed.
    pub async fn reap_finished(&mut self) -> usize {
        let mut reaped = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.state() == SlotState::Finished {
                slot.reclaim(index).await;
                reaped += 1;
            }
        }
        reaped
    }

    /// Closes every occupied slot's connection and waits for its task to
    /// exit. Returns how many connections were still open; slots that had
    /// already finished are reclaimed but not counted.
    pub async fn close_all(&mut self) -> usize {
        let mut closed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            match slot.state() {
                SlotState::Free => continue,
                SlotState::Finished => {}
                SlotState::InUse => {
                    if let Some(closer) = slot.closer.take() {
                        debug!(
                            "Closing connection in slot {} ({:?})",
                            index, slot.client_addr
                        );
                        let _ = closer.send(());
                    }
                    closed += 1;
                }
            }
            slot.reclaim(index).await;
        }
        closed
    }
}
