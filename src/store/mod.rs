//! Cart store
//!
//! The sole reader and writer of the canonical cart. UI surfaces never touch
//! storage directly: they mutate through the store and observe it through
//! the change notifier, so every badge, drawer and summary re-renders from
//! the same durable source of truth.

use thiserror::Error;

use crate::{
    cart::{Cart, CartLine, ItemKind, LineId},
    notify::{Notifier, Subscription},
};

pub mod repository;

mod record;

pub use repository::{CartRepository, JsonFileRepository, MemoryRepository, RepositoryError};

/// Errors from cart store mutations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The mutation was applied in memory but the durable write failed.
    /// The in-memory cart is ahead of storage until the next successful
    /// write; no change notification was published.
    #[error(transparent)]
    Persist(#[from] RepositoryError),
}

/// Owner of the canonical cart, constructed once per process and injected
/// into observers.
///
/// Every mutating operation computes the new cart, replaces the durable
/// record in full, publishes the new total item count, and returns the new
/// state. Writes are synchronous and last-writer-wins; a second store over
/// the same storage will not see this store's writes until it next loads,
/// and a lost update between two concurrent writers is possible. That is
/// the accepted consistency model for a single-user local cart.
#[derive(Debug)]
pub struct CartStore<R> {
    cart: Cart,
    repository: R,
    notifier: Notifier,
}

impl<R: CartRepository> CartStore<R> {
    /// Open the store, loading the persisted cart.
    ///
    /// Absent or corrupt records start the store with an empty cart; opening
    /// never fails.
    pub fn open(repository: R) -> Self {
        let cart = repository.load();

        Self {
            cart,
            repository,
            notifier: Notifier::new(),
        }
    }

    /// The current cart state.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// A handle to the change channel, for wiring up observers.
    pub fn notifier(&self) -> Notifier {
        self.notifier.clone()
    }

    /// Register an observer for the total item count.
    pub fn subscribe(&self, handler: impl FnMut(u32) + 'static) -> Subscription {
        self.notifier.subscribe(handler)
    }

    /// Re-read the cart from durable storage, replacing in-memory state.
    ///
    /// This is the only way changes written by another store instance become
    /// visible here. Observers are notified with the freshly loaded count.
    pub fn reload(&mut self) -> &Cart {
        self.cart = self.repository.load();
        self.notifier.publish(self.cart.total_item_count());
        &self.cart
    }

    /// Add a line, merging on `(id, kind)`. A candidate with quantity 0 is
    /// ignored; the cart is left unchanged and nothing is persisted or
    /// published.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persist`] if the durable write fails.
    pub fn add(&mut self, candidate: CartLine) -> Result<&Cart, StoreError> {
        if !self.cart.add(candidate) {
            return Ok(&self.cart);
        }
        self.commit("add")
    }

    /// Increase the quantity of a line by 1. An absent key is ignored; the
    /// cart is left unchanged and nothing is persisted or published.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persist`] if the durable write fails.
    pub fn increment(&mut self, id: &LineId, kind: ItemKind) -> Result<&Cart, StoreError> {
        if !self.cart.increment(id, kind) {
            return Ok(&self.cart);
        }
        self.commit("increment")
    }

    /// Decrease the quantity of a line by 1, removing it at 0. An absent key
    /// is ignored; the cart is left unchanged and nothing is persisted or
    /// published.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persist`] if the durable write fails.
    pub fn decrement(&mut self, id: &LineId, kind: ItemKind) -> Result<&Cart, StoreError> {
        if !self.cart.decrement(id, kind) {
            return Ok(&self.cart);
        }
        self.commit("decrement")
    }

    /// Remove a line unconditionally. An absent key is ignored; the cart is
    /// left unchanged and nothing is persisted or published.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persist`] if the durable write fails.
    pub fn remove(&mut self, id: &LineId, kind: ItemKind) -> Result<&Cart, StoreError> {
        if !self.cart.remove(id, kind) {
            return Ok(&self.cart);
        }
        self.commit("remove")
    }

    /// Empty the cart. The cart persists as an empty aggregate. Clearing an
    /// already empty cart is ignored; nothing is persisted or published.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persist`] if the durable write fails.
    pub fn clear(&mut self) -> Result<&Cart, StoreError> {
        if !self.cart.clear() {
            return Ok(&self.cart);
        }
        self.commit("clear")
    }

    fn commit(&mut self, operation: &'static str) -> Result<&Cart, StoreError> {
        if let Err(source) = self.repository.save(&self.cart) {
            tracing::warn!(
                operation,
                error = %source,
                "cart write failed; in-memory state is ahead of storage"
            );
            return Err(source.into());
        }

        let count = self.cart.total_item_count();
        tracing::debug!(operation, total_item_count = count, "cart updated");
        self.notifier.publish(count);

        Ok(&self.cart)
    }
}
