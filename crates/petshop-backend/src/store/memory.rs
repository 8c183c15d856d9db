//! Mutex-guarded store with an all-or-nothing transaction boundary.

use std::sync::{Mutex, PoisonError};

use petshop_commerce::CommerceError;

use super::state::StoreState;

/// Thread-safe in-memory datastore.
///
/// All access goes through one mutex. [`transaction`](Self::transaction)
/// runs a closure against a working copy of the state and commits the
/// copy only on success, so a failing step leaves nothing half-applied.
/// Holding the lock across the whole closure also serializes concurrent
/// checkouts: two buyers racing for the last unit of stock observe it
/// one after the other.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` atomically. On `Ok` the mutations commit; on `Err` the
    /// state is untouched.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&mut StoreState) -> Result<T, CommerceError>,
    ) -> Result<T, CommerceError> {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let mut working = guard.clone();
        let value = f(&mut working)?;
        *guard = working;
        Ok(value)
    }

    /// Run a read-only closure against the current state.
    pub fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        let guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Apply infallible mutations directly, for seeding catalog and
    /// customer data.
    pub fn seed(&self, f: impl FnOnce(&mut StoreState)) {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ProductStore;
    use petshop_commerce::prelude::*;

    #[test]
    fn test_transaction_commits_on_ok() {
        let store = MemoryStore::new();
        let id = store
            .transaction(|state| {
                Ok(state.insert_product(Product::new(
                    "Dog Leash",
                    "DL-01",
                    Money::vnd(90_000),
                    5,
                )))
            })
            .unwrap();

        let stock = store.read(|state| state.find_product(&id).unwrap().stock);
        assert_eq!(stock, 5);
    }

    #[test]
    fn test_transaction_rolls_back_on_err() {
        let store = MemoryStore::new();
        let id = store
            .transaction(|state| {
                Ok(state.insert_product(Product::new(
                    "Dog Leash",
                    "DL-01",
                    Money::vnd(90_000),
                    5,
                )))
            })
            .unwrap();

        // mutate, then fail: the mutation must not survive
        let result: Result<(), CommerceError> = store.transaction(|state| {
            state.decrement_stock(&id, 3)?;
            Err(CommerceError::EmptyCart)
        });
        assert!(result.is_err());

        let product = store.read(|state| state.find_product(&id).unwrap().clone());
        assert_eq!(product.stock, 5);
        assert_eq!(product.sold_quantity, 0);
    }
}
