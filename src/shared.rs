// Lottery Slots - Shared store
//
// Draw and record are a check-then-act pair. Every call here holds the lock
// for its whole duration, so two callers can never award the same value
// within one history.
use std::sync::{Arc, Mutex};

use crate::error::{StoreError, StoreResult};
use crate::instruction::StoreInstruction;
use crate::processor::{Outcome, Processor};
use crate::state::{Position, Ticket};
use crate::store::Store;

/// A store handle that can be cloned across threads and tasks
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<Store>>,
}

impl SharedStore {
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Run `f` with exclusive access to the store
    pub fn with<T>(&self, f: impl FnOnce(&mut Store) -> StoreResult<T>) -> StoreResult<T> {
        let mut store = self.inner.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&mut *store)
    }

    pub fn process(&self, instruction: StoreInstruction) -> StoreResult<Outcome> {
        self.with(|store| Processor::process_instruction(store, instruction))
    }

    pub fn draw_and_record(
        &self,
        slot_id: &str,
        history_id: &str,
        prize_id: &str,
        position: Position,
    ) -> StoreResult<Option<Ticket>> {
        self.with(|store| store.draw_and_record(slot_id, history_id, prize_id, position))
    }

    /// Take the store back once every other handle is gone
    pub fn into_inner(self) -> Option<Store> {
        Arc::try_unwrap(self.inner).ok()?.into_inner().ok()
    }
}
