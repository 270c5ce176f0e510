// Lottery Slots
// Slot, prize and draw-history engine behind a lottery drawing tool

// Core modules
pub mod config;
pub mod error;
pub mod identity;
pub mod state;
pub mod storage;
pub mod utils;

// Tickets, draws and games
pub mod draw;
pub mod history;
pub mod ticket;

// Store and command surface
pub mod instruction;
pub mod processor;
pub mod shared;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use processor::{Outcome, Processor};
pub use shared::SharedStore;
pub use store::Store;
