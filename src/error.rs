// Lottery Slots - Errors
use solana_program::msg;
use thiserror::Error;

/// Errors that may be returned by the slot store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No slot with this id
    #[error("Slot {0} not found")]
    SlotNotFound(String),

    /// No prize with this id in the slot
    #[error("Prize {0} not found")]
    PrizeNotFound(String),

    /// No ticket with this id in the pool
    #[error("Ticket {0} not found")]
    TicketNotFound(String),

    /// No history with this id in the slot
    #[error("History {0} not found")]
    HistoryNotFound(String),

    /// Range bounds are reversed
    #[error("Invalid ticket range: from {from} is greater than to {to}")]
    InvalidRange { from: u64, to: u64 },

    /// Range would produce more tickets than the configured limit
    #[error("Ticket range of {requested} tickets exceeds the limit of {limit}")]
    PoolTooLarge { requested: u64, limit: u64 },

    /// Prize tickets need the slot's recorded pad width
    #[error("Slot {0} has no recorded pad width; generate the slot tickets first")]
    PadWidthUnset(String),

    /// A prize must award at least one winner
    #[error("Invalid slot count {0}")]
    InvalidSlotCount(u32),

    /// Position outside [0, slot_count)
    #[error("Position {position} is outside the prize slot count {slot_count}")]
    PositionOutOfRange { position: u32, slot_count: u32 },

    /// Filled positions are immutable within a history
    #[error("Position {0} is already filled")]
    PositionFilled(u32),

    /// Nothing recorded at this position
    #[error("Position {0} is empty")]
    PositionEmpty(u32),

    /// The ticket value was already awarded in this history
    #[error("Ticket value {0} was already drawn in this history")]
    DuplicateTicketValue(String),

    /// Instruction bytes could not be decoded
    #[error("Invalid instruction data")]
    InvalidInstructionData,

    /// The persistence collaborator failed
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// Another caller panicked while holding the store
    #[error("Store lock poisoned")]
    LockPoisoned,

    /// A snapshot or blob could not be encoded or decoded
    #[error("Codec failure: {0}")]
    Codec(String),
}

impl StoreError {
    /// Write the error to the program log
    pub fn print(&self) {
        msg!("Error: {}", self);
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Codec(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
