// Lottery Slots - Processor
use solana_program::msg;

use crate::error::StoreResult;
use crate::instruction::StoreInstruction;
use crate::state::{Slot, Ticket};
use crate::store::Store;

/// What an instruction produced
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Done,
    /// Id of a newly created slot, prize, ticket or history
    Created(String),
    /// Number of tickets in a regenerated pool
    Generated(usize),
    /// A drawn ticket, or `None` when no ticket is available
    Drawn(Option<Ticket>),
    Verified(bool),
    Removed(Slot),
    Cleared(Ticket),
    Exported(String),
}

pub struct Processor;

impl Processor {
    /// Decode `instruction_data` and apply it to the store
    pub fn process(store: &mut Store, instruction_data: &[u8]) -> StoreResult<Outcome> {
        let instruction = StoreInstruction::unpack(instruction_data).map_err(|e| {
            e.print();
            e
        })?;
        Self::process_instruction(store, instruction)
    }

    pub fn process_instruction(
        store: &mut Store,
        instruction: StoreInstruction,
    ) -> StoreResult<Outcome> {
        msg!("Instruction: {}", instruction.name());
        Self::dispatch(store, instruction).map_err(|e| {
            e.print();
            e
        })
    }

    fn dispatch(store: &mut Store, instruction: StoreInstruction) -> StoreResult<Outcome> {
        use StoreInstruction::*;

        Ok(match instruction {
            AddSlot { name } => Outcome::Created(store.add_slot(name)?),
            CreateEmptySlot { name } => Outcome::Created(store.create_empty_slot(name)?),
            RemoveSlot { slot_id } => Outcome::Removed(store.remove_slot(&slot_id)?),
            UpdateSlot { slot_id, patch } => {
                store.update_slot(&slot_id, patch)?;
                Outcome::Done
            }
            SetPassword { slot_id, password } => {
                store.set_password(&slot_id, password.as_deref())?;
                Outcome::Done
            }
            VerifyPassword { slot_id, password } => {
                Outcome::Verified(store.verify_password(&slot_id, &password))
            }
            GenerateSlotTickets { slot_id, range } => {
                Outcome::Generated(store.generate_slot_tickets(&slot_id, range)?)
            }
            AddTicket { slot_id, draft } => Outcome::Created(store.add_ticket(&slot_id, draft)?),
            SetTicketOwner {
                slot_id,
                ticket_id,
                owner,
            } => {
                store.set_ticket_owner(&slot_id, &ticket_id, owner)?;
                Outcome::Done
            }
            DeleteTicket { slot_id, ticket_id } => {
                store.delete_ticket(&slot_id, &ticket_id)?;
                Outcome::Done
            }
            ClearTickets { slot_id } => {
                store.clear_tickets(&slot_id)?;
                Outcome::Done
            }
            AddPrize { slot_id, name } => Outcome::Created(store.add_prize(&slot_id, name)?),
            UpdatePrize {
                slot_id,
                prize_id,
                patch,
            } => {
                store.update_prize(&slot_id, &prize_id, patch)?;
                Outcome::Done
            }
            SetPrizeSlotCount {
                slot_id,
                prize_id,
                count,
            } => {
                store.set_prize_slot_count(&slot_id, &prize_id, count)?;
                Outcome::Done
            }
            MinimizePrize { slot_id, prize_id } => {
                store.minimize_prize(&slot_id, &prize_id)?;
                Outcome::Done
            }
            MaximizePrize { slot_id, prize_id } => {
                store.maximize_prize(&slot_id, &prize_id)?;
                Outcome::Done
            }
            DeletePrize { slot_id, prize_id } => {
                store.delete_prize(&slot_id, &prize_id)?;
                Outcome::Done
            }
            GeneratePrizeTickets {
                slot_id,
                prize_id,
                from,
                to,
            } => Outcome::Generated(store.generate_prize_tickets(&slot_id, &prize_id, from, to)?),
            AddPrizeTicket {
                slot_id,
                prize_id,
                draft,
            } => Outcome::Created(store.add_prize_ticket(&slot_id, &prize_id, draft)?),
            DeletePrizeTicket {
                slot_id,
                prize_id,
                ticket_id,
            } => {
                store.delete_prize_ticket(&slot_id, &prize_id, &ticket_id)?;
                Outcome::Done
            }
            ClearPrizeTickets { slot_id, prize_id } => {
                store.clear_prize_tickets(&slot_id, &prize_id)?;
                Outcome::Done
            }
            CreateHistory { slot_id } => Outcome::Created(store.create_history(&slot_id)?),
            RenameHistory {
                slot_id,
                history_id,
                name,
            } => {
                store.rename_history(&slot_id, &history_id, name)?;
                Outcome::Done
            }
            DeleteHistory {
                slot_id,
                history_id,
            } => {
                store.delete_history(&slot_id, &history_id)?;
                Outcome::Done
            }
            DrawTicket {
                slot_id,
                prize_id,
                history_id,
            } => Outcome::Drawn(store.draw_ticket(&slot_id, &prize_id, &history_id)?),
            RecordDraw {
                slot_id,
                history_id,
                prize_id,
                position,
                ticket,
            } => {
                store.record_draw(&slot_id, &history_id, &prize_id, position, ticket)?;
                Outcome::Done
            }
            DrawAndRecord {
                slot_id,
                history_id,
                prize_id,
                position,
            } => Outcome::Drawn(store.draw_and_record(&slot_id, &history_id, &prize_id, position)?),
            ClearDraw {
                slot_id,
                history_id,
                prize_id,
                position,
            } => Outcome::Cleared(store.clear_draw(&slot_id, &history_id, &prize_id, position)?),
            ImportSlot { slot } => {
                store.import_slot(slot)?;
                Outcome::Done
            }
            ExportSlot { slot_id } => Outcome::Exported(store.export_slot(&slot_id)?),
        })
    }
}
