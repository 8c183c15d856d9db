//! In-memory persistence: the store contracts, the state they are
//! implemented on, and the mutex-guarded transaction boundary.

mod contracts;
mod memory;
mod state;

pub use contracts::{ProductStore, UserStore};
pub use memory::MemoryStore;
pub use state::StoreState;
