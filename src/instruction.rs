// Lottery Slots - Instructions
use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::{StoreError, StoreResult};
use crate::state::{Position, PrizePatch, Slot, SlotPatch, Ticket, TicketDraft};
use crate::ticket::TicketRange;

/// Everything the presentation layer can ask of the store
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub enum StoreInstruction {
    /// Insert a seeded slot ("Slot N" when unnamed)
    AddSlot { name: Option<String> },

    /// Insert a slot with no prizes or tickets
    CreateEmptySlot { name: String },

    /// Delete a slot and everything under it
    RemoveSlot { slot_id: String },

    /// Edit one slot field
    UpdateSlot { slot_id: String, patch: SlotPatch },

    /// Set or clear the slot password
    SetPassword {
        slot_id: String,
        password: Option<String>,
    },

    /// Check a plaintext password against the stored hash
    VerifyPassword { slot_id: String, password: String },

    /// Replace the master pool
    GenerateSlotTickets { slot_id: String, range: TicketRange },

    /// Add one ticket to the master pool
    AddTicket { slot_id: String, draft: TicketDraft },

    SetTicketOwner {
        slot_id: String,
        ticket_id: String,
        owner: Option<String>,
    },

    DeleteTicket { slot_id: String, ticket_id: String },

    ClearTickets { slot_id: String },

    /// Add a prize ("New Prize" when unnamed)
    AddPrize {
        slot_id: String,
        name: Option<String>,
    },

    /// Edit one prize field
    UpdatePrize {
        slot_id: String,
        prize_id: String,
        patch: PrizePatch,
    },

    /// Number of winners the prize awards per game
    SetPrizeSlotCount {
        slot_id: String,
        prize_id: String,
        count: u32,
    },

    MinimizePrize { slot_id: String, prize_id: String },

    MaximizePrize { slot_id: String, prize_id: String },

    DeletePrize { slot_id: String, prize_id: String },

    /// Replace the prize sub-pool, padded to the slot's width
    GeneratePrizeTickets {
        slot_id: String,
        prize_id: String,
        from: u64,
        to: u64,
    },

    AddPrizeTicket {
        slot_id: String,
        prize_id: String,
        draft: TicketDraft,
    },

    DeletePrizeTicket {
        slot_id: String,
        prize_id: String,
        ticket_id: String,
    },

    ClearPrizeTickets { slot_id: String, prize_id: String },

    /// Start a new game
    CreateHistory { slot_id: String },

    RenameHistory {
        slot_id: String,
        history_id: String,
        name: Option<String>,
    },

    DeleteHistory { slot_id: String, history_id: String },

    /// Pick a random eligible ticket without recording it
    DrawTicket {
        slot_id: String,
        prize_id: String,
        history_id: String,
    },

    /// Write a drawn ticket into an empty position
    RecordDraw {
        slot_id: String,
        history_id: String,
        prize_id: String,
        position: Position,
        ticket: Ticket,
    },

    /// Draw and record under one call
    DrawAndRecord {
        slot_id: String,
        history_id: String,
        prize_id: String,
        position: Position,
    },

    /// Empty a filled position
    ClearDraw {
        slot_id: String,
        history_id: String,
        prize_id: String,
        position: Position,
    },

    /// Restore a whole slot tree
    ImportSlot { slot: Slot },

    /// JSON blob of one slot
    ExportSlot { slot_id: String },
}

impl StoreInstruction {
    /// Unpacks a byte buffer into a StoreInstruction
    pub fn unpack(input: &[u8]) -> StoreResult<Self> {
        Self::try_from_slice(input).map_err(|_| StoreError::InvalidInstructionData)
    }

    /// Packs the instruction into its byte form
    pub fn pack(&self) -> StoreResult<Vec<u8>> {
        self.try_to_vec()
            .map_err(|e| StoreError::Codec(e.to_string()))
    }

    /// Short name for the program log
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddSlot { .. } => "Add Slot",
            Self::CreateEmptySlot { .. } => "Create Empty Slot",
            Self::RemoveSlot { .. } => "Remove Slot",
            Self::UpdateSlot { .. } => "Update Slot",
            Self::SetPassword { .. } => "Set Password",
            Self::VerifyPassword { .. } => "Verify Password",
            Self::GenerateSlotTickets { .. } => "Generate Slot Tickets",
            Self::AddTicket { .. } => "Add Ticket",
            Self::SetTicketOwner { .. } => "Set Ticket Owner",
            Self::DeleteTicket { .. } => "Delete Ticket",
            Self::ClearTickets { .. } => "Clear Tickets",
            Self::AddPrize { .. } => "Add Prize",
            Self::UpdatePrize { .. } => "Update Prize",
            Self::SetPrizeSlotCount { .. } => "Set Prize Slot Count",
            Self::MinimizePrize { .. } => "Minimize Prize",
            Self::MaximizePrize { .. } => "Maximize Prize",
            Self::DeletePrize { .. } => "Delete Prize",
            Self::GeneratePrizeTickets { .. } => "Generate Prize Tickets",
            Self::AddPrizeTicket { .. } => "Add Prize Ticket",
            Self::DeletePrizeTicket { .. } => "Delete Prize Ticket",
            Self::ClearPrizeTickets { .. } => "Clear Prize Tickets",
            Self::CreateHistory { .. } => "Create History",
            Self::RenameHistory { .. } => "Rename History",
            Self::DeleteHistory { .. } => "Delete History",
            Self::DrawTicket { .. } => "Draw Ticket",
            Self::RecordDraw { .. } => "Record Draw",
            Self::DrawAndRecord { .. } => "Draw And Record",
            Self::ClearDraw { .. } => "Clear Draw",
            Self::ImportSlot { .. } => "Import Slot",
            Self::ExportSlot { .. } => "Export Slot",
        }
    }
}
