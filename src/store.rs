// Lottery Slots - Entity store
//
// Owns the whole Slot tree. Every mutator validates its ids, applies the change
// and writes the tree through to storage before returning. A failed write
// restores the tree as it was before the call.
use rand::{rngs::StdRng, SeedableRng};
use solana_program::msg;

use crate::config::StoreConfig;
use crate::draw;
use crate::error::{StoreError, StoreResult};
use crate::history::{drawn_values, prize_progress, DrawProgress};
use crate::state::{
    History, HistoryId, Position, Prize, PrizeId, PrizePatch, PrizeValue, Slot, SlotId,
    SlotPatch, Ticket, TicketDraft, TicketId,
};
use crate::storage::{SlotTree, Storage};
use crate::ticket::{generate_range, materialize, TicketRange};
use crate::utils::hash_password;

pub struct Store {
    tree: SlotTree,
    storage: Box<dyn Storage>,
    config: StoreConfig,
    rng: StdRng,
}

impl Store {
    /// Restore the tree from `storage`; a store with nothing saved starts with one seeded slot
    pub fn open(storage: impl Storage + 'static, config: StoreConfig) -> StoreResult<Self> {
        let restored = storage.load()?;
        let mut store = Self {
            tree: SlotTree::default(),
            storage: Box::new(storage),
            config,
            rng: StdRng::from_entropy(),
        };
        match restored {
            Some(tree) => {
                msg!("Store restored: {} slots", tree.slots.len());
                store.tree = tree;
            }
            None => {
                store.add_slot(None)?;
            }
        }
        Ok(store)
    }

    /// Flush the tree one last time and release the storage
    pub fn close(self) -> StoreResult<()> {
        self.persist()
    }

    /// Replace the random source, for reproducible draws
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    fn persist(&self) -> StoreResult<()> {
        self.storage.save(&self.tree).map_err(|e| {
            msg!("Failed to persist slot tree");
            e.print();
            e
        })
    }

    /// Apply `change` and persist it; on any error the tree is left as it was
    fn transact<T>(&mut self, change: impl FnOnce(&mut Self) -> StoreResult<T>) -> StoreResult<T> {
        let previous = self.tree.clone();
        let result = change(self).and_then(|value| self.persist().map(|()| value));
        if result.is_err() {
            self.tree = previous;
        }
        result
    }

    fn slot(&self, slot_id: &str) -> StoreResult<&Slot> {
        self.tree
            .slots
            .get(slot_id)
            .ok_or_else(|| StoreError::SlotNotFound(slot_id.to_string()))
    }

    fn slot_mut(&mut self, slot_id: &str) -> StoreResult<&mut Slot> {
        self.tree
            .slots
            .get_mut(slot_id)
            .ok_or_else(|| StoreError::SlotNotFound(slot_id.to_string()))
    }

    fn prize_mut(&mut self, slot_id: &str, prize_id: &str) -> StoreResult<&mut Prize> {
        self.slot_mut(slot_id)?
            .prizes
            .get_mut(prize_id)
            .ok_or_else(|| StoreError::PrizeNotFound(prize_id.to_string()))
    }

    // --- slots ---

    /// Insert a seeded slot, named "Slot {n+1}" unless a name is given
    pub fn add_slot(&mut self, name: Option<String>) -> StoreResult<SlotId> {
        let name = name.unwrap_or_else(|| format!("Slot {}", self.tree.slots.len() + 1));
        let slot = Slot::seeded(name, &self.config);
        self.insert_slot(slot)
    }

    /// Insert a slot with no prizes or tickets
    pub fn create_empty_slot(&mut self, name: String) -> StoreResult<SlotId> {
        self.insert_slot(Slot::new(name))
    }

    fn insert_slot(&mut self, slot: Slot) -> StoreResult<SlotId> {
        self.transact(|store| {
            let id = slot.id.clone();
            msg!("Slot created: id={}, name={}", id, slot.name);
            store.tree.slots.insert(id.clone(), slot);
            Ok(id)
        })
    }

    pub fn get_slot(&self, slot_id: &str) -> Option<&Slot> {
        self.tree.slots.get(slot_id)
    }

    /// Slots in creation order
    pub fn list_slots(&self) -> Vec<&Slot> {
        let mut slots: Vec<&Slot> = self.tree.slots.values().collect();
        slots.sort_by(|a, b| (a.created_at, &a.name).cmp(&(b.created_at, &b.name)));
        slots
    }

    /// Remove a slot together with its prizes, tickets and histories
    pub fn remove_slot(&mut self, slot_id: &str) -> StoreResult<Slot> {
        self.transact(|store| {
            let slot = store
                .tree
                .slots
                .remove(slot_id)
                .ok_or_else(|| StoreError::SlotNotFound(slot_id.to_string()))?;
            msg!("Slot removed: id={}", slot_id);
            Ok(slot)
        })
    }

    pub fn update_slot(&mut self, slot_id: &str, patch: SlotPatch) -> StoreResult<()> {
        self.transact(|store| {
            store.slot_mut(slot_id)?.apply(patch);
            Ok(())
        })
    }

    /// Store the hash of `plaintext`, or clear the password with `None`
    pub fn set_password(&mut self, slot_id: &str, plaintext: Option<&str>) -> StoreResult<()> {
        self.transact(|store| {
            let slot = store.slot_mut(slot_id)?;
            slot.password_hash = plaintext.map(|p| hash_password(&slot.id, p));
            let action = if plaintext.is_some() { "set" } else { "cleared" };
            msg!("Slot password {}: id={}", action, slot_id);
            Ok(())
        })
    }

    /// False for a missing slot or a slot without a password
    pub fn verify_password(&self, slot_id: &str, plaintext: &str) -> bool {
        match self.tree.slots.get(slot_id) {
            Some(Slot {
                id,
                password_hash: Some(stored),
                ..
            }) => *stored == hash_password(id, plaintext),
            _ => false,
        }
    }

    /// Insert or overwrite a whole slot tree as given
    pub fn import_slot(&mut self, slot: Slot) -> StoreResult<()> {
        self.transact(|store| {
            msg!("Slot imported: id={}, name={}", slot.id, slot.name);
            store.tree.slots.insert(slot.id.clone(), slot);
            Ok(())
        })
    }

    /// JSON blob of one slot, for upload
    pub fn export_slot(&self, slot_id: &str) -> StoreResult<String> {
        Ok(self.slot(slot_id)?.to_json()?)
    }

    // --- master pool ---

    /// Replace the master pool with the tickets of `range` and record its bounds
    pub fn generate_slot_tickets(
        &mut self,
        slot_id: &str,
        range: TicketRange,
    ) -> StoreResult<usize> {
        let drafts = generate_range(&range, self.config.max_pool_size)?;
        self.transact(|store| {
            let slot = store.slot_mut(slot_id)?;
            slot.tickets = materialize(drafts);
            slot.pad_width = Some(range.pad_width);
            slot.from = Some(range.from);
            slot.to = Some(range.to);
            let count = slot.tickets.len();
            msg!(
                "Slot tickets generated: id={}, range={}..={}, count={}",
                slot_id,
                range.from,
                range.to,
                count
            );
            Ok(count)
        })
    }

    /// Add one ticket to the master pool. Text values made only of digits
    /// become numbers, so "003" excludes the generated ticket 3.
    pub fn add_ticket(&mut self, slot_id: &str, draft: TicketDraft) -> StoreResult<TicketId> {
        self.transact(|store| {
            let ticket = Ticket::new(draft);
            let id = ticket.id.clone();
            store.slot_mut(slot_id)?.tickets.insert(id.clone(), ticket);
            Ok(id)
        })
    }

    pub fn set_ticket_owner(
        &mut self,
        slot_id: &str,
        ticket_id: &str,
        owner: Option<String>,
    ) -> StoreResult<()> {
        self.transact(|store| {
            store
                .slot_mut(slot_id)?
                .tickets
                .get_mut(ticket_id)
                .ok_or_else(|| StoreError::TicketNotFound(ticket_id.to_string()))?
                .owner = owner;
            Ok(())
        })
    }

    pub fn delete_ticket(&mut self, slot_id: &str, ticket_id: &str) -> StoreResult<()> {
        self.transact(|store| {
            store
                .slot_mut(slot_id)?
                .tickets
                .remove(ticket_id)
                .ok_or_else(|| StoreError::TicketNotFound(ticket_id.to_string()))?;
            Ok(())
        })
    }

    pub fn clear_tickets(&mut self, slot_id: &str) -> StoreResult<()> {
        self.transact(|store| {
            store.slot_mut(slot_id)?.tickets.clear();
            Ok(())
        })
    }

    // --- prizes ---

    /// Add a prize with an empty sub-pool and a slot count of one
    pub fn add_prize(&mut self, slot_id: &str, name: Option<String>) -> StoreResult<PrizeId> {
        let name = name.unwrap_or_else(|| self.config.new_prize_name.clone());
        self.transact(|store| {
            let prize = Prize::new(name.clone(), PrizeValue::Text(name));
            let id = prize.id.clone();
            store.slot_mut(slot_id)?.prizes.insert(id.clone(), prize);
            msg!("Prize added: slot={}, prize={}", slot_id, id);
            Ok(id)
        })
    }

    pub fn update_prize(
        &mut self,
        slot_id: &str,
        prize_id: &str,
        patch: PrizePatch,
    ) -> StoreResult<()> {
        self.transact(|store| {
            store.prize_mut(slot_id, prize_id)?.apply(patch);
            Ok(())
        })
    }

    pub fn set_prize_slot_count(
        &mut self,
        slot_id: &str,
        prize_id: &str,
        count: u32,
    ) -> StoreResult<()> {
        if count == 0 {
            return Err(StoreError::InvalidSlotCount(count));
        }
        self.transact(|store| {
            store.prize_mut(slot_id, prize_id)?.slot_count = count;
            Ok(())
        })
    }

    pub fn minimize_prize(&mut self, slot_id: &str, prize_id: &str) -> StoreResult<()> {
        self.update_prize(slot_id, prize_id, PrizePatch::Minimized(true))
    }

    pub fn maximize_prize(&mut self, slot_id: &str, prize_id: &str) -> StoreResult<()> {
        self.update_prize(slot_id, prize_id, PrizePatch::Minimized(false))
    }

    /// History entries recorded for the prize stay behind and are read as deleted
    pub fn delete_prize(&mut self, slot_id: &str, prize_id: &str) -> StoreResult<()> {
        self.transact(|store| {
            store
                .slot_mut(slot_id)?
                .prizes
                .remove(prize_id)
                .ok_or_else(|| StoreError::PrizeNotFound(prize_id.to_string()))?;
            msg!("Prize deleted: slot={}, prize={}", slot_id, prize_id);
            Ok(())
        })
    }

    /// Replace the prize's sub-pool, padded to the slot's recorded width
    pub fn generate_prize_tickets(
        &mut self,
        slot_id: &str,
        prize_id: &str,
        from: u64,
        to: u64,
    ) -> StoreResult<usize> {
        let max_pool_size = self.config.max_pool_size;
        self.transact(|store| {
            let slot = store.slot_mut(slot_id)?;
            let pad_width = slot
                .pad_width
                .ok_or_else(|| StoreError::PadWidthUnset(slot_id.to_string()))?;
            let prize = slot
                .prizes
                .get_mut(prize_id)
                .ok_or_else(|| StoreError::PrizeNotFound(prize_id.to_string()))?;
            let drafts = generate_range(&TicketRange::new(from, to, pad_width), max_pool_size)?;
            prize.tickets = materialize(drafts);
            let count = prize.tickets.len();
            msg!(
                "Prize tickets generated: prize={}, range={}..={}, count={}",
                prize_id,
                from,
                to,
                count
            );
            Ok(count)
        })
    }

    /// Add one ticket to the prize's sub-pool; digit-only text values become numbers
    pub fn add_prize_ticket(
        &mut self,
        slot_id: &str,
        prize_id: &str,
        draft: TicketDraft,
    ) -> StoreResult<TicketId> {
        self.transact(|store| {
            let ticket = Ticket::new(draft);
            let id = ticket.id.clone();
            store
                .prize_mut(slot_id, prize_id)?
                .tickets
                .insert(id.clone(), ticket);
            Ok(id)
        })
    }

    pub fn delete_prize_ticket(
        &mut self,
        slot_id: &str,
        prize_id: &str,
        ticket_id: &str,
    ) -> StoreResult<()> {
        self.transact(|store| {
            store
                .prize_mut(slot_id, prize_id)?
                .tickets
                .remove(ticket_id)
                .ok_or_else(|| StoreError::TicketNotFound(ticket_id.to_string()))?;
            Ok(())
        })
    }

    pub fn clear_prize_tickets(&mut self, slot_id: &str, prize_id: &str) -> StoreResult<()> {
        self.transact(|store| {
            store.prize_mut(slot_id, prize_id)?.tickets.clear();
            Ok(())
        })
    }

    // --- histories ---

    /// Start a new game with one empty position map per existing prize
    pub fn create_history(&mut self, slot_id: &str) -> StoreResult<HistoryId> {
        self.transact(|store| {
            let slot = store.slot_mut(slot_id)?;
            let history = History::new(slot.prizes.keys());
            let id = history.id.clone();
            slot.history.insert(id.clone(), history);
            msg!("History created: slot={}, history={}", slot_id, id);
            Ok(id)
        })
    }

    pub fn rename_history(
        &mut self,
        slot_id: &str,
        history_id: &str,
        name: Option<String>,
    ) -> StoreResult<()> {
        self.transact(|store| {
            store
                .slot_mut(slot_id)?
                .history
                .get_mut(history_id)
                .ok_or_else(|| StoreError::HistoryNotFound(history_id.to_string()))?
                .name = name;
            Ok(())
        })
    }

    pub fn delete_history(&mut self, slot_id: &str, history_id: &str) -> StoreResult<()> {
        self.transact(|store| {
            store
                .slot_mut(slot_id)?
                .history
                .remove(history_id)
                .ok_or_else(|| StoreError::HistoryNotFound(history_id.to_string()))?;
            msg!("History deleted: slot={}, history={}", slot_id, history_id);
            Ok(())
        })
    }

    /// Write `ticket` into an empty position of `prize_id` in the history
    pub fn record_draw(
        &mut self,
        slot_id: &str,
        history_id: &str,
        prize_id: &str,
        position: Position,
        ticket: Ticket,
    ) -> StoreResult<()> {
        self.transact(|store| {
            let slot = store.slot_mut(slot_id)?;
            check_record(slot, history_id, prize_id, position, &ticket)?;
            if let Some(history) = slot.history.get_mut(history_id) {
                history
                    .prizes
                    .entry(prize_id.to_string())
                    .or_default()
                    .insert(position, ticket);
            }
            msg!(
                "Draw recorded: history={}, prize={}, position={}",
                history_id,
                prize_id,
                position
            );
            Ok(())
        })
    }

    /// Empty a filled position so it can be drawn again
    pub fn clear_draw(
        &mut self,
        slot_id: &str,
        history_id: &str,
        prize_id: &str,
        position: Position,
    ) -> StoreResult<Ticket> {
        self.transact(|store| {
            let ticket = store
                .slot_mut(slot_id)?
                .history
                .get_mut(history_id)
                .ok_or_else(|| StoreError::HistoryNotFound(history_id.to_string()))?
                .prizes
                .get_mut(prize_id)
                .and_then(|positions| positions.remove(&position))
                .ok_or(StoreError::PositionEmpty(position))?;
            msg!(
                "Draw cleared: history={}, prize={}, position={}",
                history_id,
                prize_id,
                position
            );
            Ok(ticket)
        })
    }

    // --- draws ---

    /// Random eligible ticket for the prize; `Ok(None)` when the pool is exhausted
    pub fn draw_ticket(
        &mut self,
        slot_id: &str,
        prize_id: &str,
        history_id: &str,
    ) -> StoreResult<Option<Ticket>> {
        let slot = self
            .tree
            .slots
            .get(slot_id)
            .ok_or_else(|| StoreError::SlotNotFound(slot_id.to_string()))?;
        let (prize, history) = lookup(slot, prize_id, history_id)?;
        Ok(draw::draw_ticket(slot, prize, history, &mut self.rng).cloned())
    }

    /// Draw and record in one step
    pub fn draw_and_record(
        &mut self,
        slot_id: &str,
        history_id: &str,
        prize_id: &str,
        position: Position,
    ) -> StoreResult<Option<Ticket>> {
        let ticket = match self.draw_ticket(slot_id, prize_id, history_id)? {
            Some(ticket) => ticket,
            None => {
                msg!("No tickets available: prize={}, history={}", prize_id, history_id);
                return Ok(None);
            }
        };
        self.record_draw(slot_id, history_id, prize_id, position, ticket.clone())?;
        Ok(Some(ticket))
    }

    pub fn prize_progress(
        &self,
        slot_id: &str,
        history_id: &str,
        prize_id: &str,
    ) -> StoreResult<DrawProgress> {
        let (prize, history) = lookup(self.slot(slot_id)?, prize_id, history_id)?;
        Ok(prize_progress(history, prize))
    }
}

fn lookup<'a>(
    slot: &'a Slot,
    prize_id: &str,
    history_id: &str,
) -> StoreResult<(&'a Prize, &'a History)> {
    let prize = slot
        .prizes
        .get(prize_id)
        .ok_or_else(|| StoreError::PrizeNotFound(prize_id.to_string()))?;
    let history = slot
        .history
        .get(history_id)
        .ok_or_else(|| StoreError::HistoryNotFound(history_id.to_string()))?;
    Ok((prize, history))
}

fn check_record(
    slot: &Slot,
    history_id: &str,
    prize_id: &str,
    position: Position,
    ticket: &Ticket,
) -> StoreResult<()> {
    let (prize, history) = lookup(slot, prize_id, history_id)?;
    if position >= prize.slot_count {
        return Err(StoreError::PositionOutOfRange {
            position,
            slot_count: prize.slot_count,
        });
    }
    let filled = history
        .prizes
        .get(prize_id)
        .map_or(false, |positions| positions.contains_key(&position));
    if filled {
        return Err(StoreError::PositionFilled(position));
    }
    if !slot.tickets.contains_key(&ticket.id) && !prize.tickets.contains_key(&ticket.id) {
        return Err(StoreError::TicketNotFound(ticket.id.clone()));
    }
    if drawn_values(history, &slot.prizes).contains(&ticket.value) {
        return Err(StoreError::DuplicateTicketValue(ticket.value.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::DrawState;
    use crate::state::TicketValue;
    use crate::storage::MemoryStorage;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn open() -> (Store, MemoryStorage) {
        let config = StoreConfig::default();
        let storage = MemoryStorage::new(&config);
        let mut store = Store::open(storage.clone(), config).unwrap();
        store.reseed(11);
        (store, storage)
    }

    fn empty_slot(store: &mut Store, from: u64, to: u64, width: u8) -> SlotId {
        let id = store.create_empty_slot("Gala".to_string()).unwrap();
        store.generate_slot_tickets(&id, TicketRange::new(from, to, width)).unwrap();
        id
    }

    #[test]
    fn fresh_store_is_seeded_and_persisted() {
        let (store, storage) = open();
        let slots = store.list_slots();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].name, "Slot 1");
        assert!(storage.load().unwrap().is_some());
    }

    #[test]
    fn add_slot_numbers_the_default_name() {
        let (mut store, _) = open();
        let id = store.add_slot(None).unwrap();
        assert_eq!(store.get_slot(&id).unwrap().name, "Slot 2");
        let named = store.add_slot(Some("Party".to_string())).unwrap();
        assert_eq!(store.get_slot(&named).unwrap().name, "Party");
    }

    #[test]
    fn reopening_restores_every_mutation() {
        let (mut store, storage) = open();
        let id = empty_slot(&mut store, 1, 3, 2);
        store.update_slot(&id, SlotPatch::Name("Renamed".to_string())).unwrap();
        drop(store);

        let reopened = Store::open(storage, StoreConfig::default()).unwrap();
        let slot = reopened.get_slot(&id).unwrap();
        assert_eq!(slot.name, "Renamed");
        assert_eq!(slot.tickets.len(), 3);
        assert_eq!(slot.pad_width, Some(2));
    }

    #[test]
    fn missing_ids_are_reported() {
        let (mut store, _) = open();
        assert_eq!(
            store.delete_ticket("nope", "t"),
            Err(StoreError::SlotNotFound("nope".to_string()))
        );
        let id = empty_slot(&mut store, 1, 2, 1);
        assert_eq!(
            store.delete_ticket(&id, "t"),
            Err(StoreError::TicketNotFound("t".to_string()))
        );
        assert_eq!(
            store.create_history("nope"),
            Err(StoreError::SlotNotFound("nope".to_string()))
        );
        assert!(matches!(store.add_prize("nope", None), Err(StoreError::SlotNotFound(_))));
    }

    #[test]
    fn regeneration_replaces_the_pool() {
        let (mut store, _) = open();
        let id = empty_slot(&mut store, 1, 5, 3);
        let first: Vec<TicketId> = store.get_slot(&id).unwrap().tickets.keys().cloned().collect();

        store.generate_slot_tickets(&id, TicketRange::new(10, 12, 3)).unwrap();
        let slot = store.get_slot(&id).unwrap();
        assert_eq!(slot.tickets.len(), 3);
        assert!(first.iter().all(|t| !slot.tickets.contains_key(t)));
        let labels: Vec<&str> = slot.tickets_sorted().iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["010", "011", "012"]);
        assert_eq!((slot.from, slot.to), (Some(10), Some(12)));
    }

    #[test]
    fn invalid_range_leaves_the_pool_alone() {
        let (mut store, _) = open();
        let id = empty_slot(&mut store, 1, 5, 3);
        assert_eq!(
            store.generate_slot_tickets(&id, TicketRange::new(9, 2, 3)),
            Err(StoreError::InvalidRange { from: 9, to: 2 })
        );
        assert_eq!(store.get_slot(&id).unwrap().tickets.len(), 5);
    }

    #[test]
    fn prize_tickets_reuse_the_slot_width() {
        let (mut store, _) = open();
        let bare = store.create_empty_slot("Bare".to_string()).unwrap();
        let prize = store.add_prize(&bare, None).unwrap();
        assert_eq!(
            store.generate_prize_tickets(&bare, &prize, 1, 3),
            Err(StoreError::PadWidthUnset(bare.clone()))
        );

        store.generate_slot_tickets(&bare, TicketRange::new(1, 50, 4)).unwrap();
        assert_eq!(store.generate_prize_tickets(&bare, &prize, 7, 8).unwrap(), 2);
        let labels: Vec<String> = store.get_slot(&bare).unwrap().prizes[&prize]
            .tickets_sorted()
            .iter()
            .map(|t| t.label.clone())
            .collect();
        assert_eq!(labels, vec!["0007", "0008"]);
    }

    #[test]
    fn new_prizes_default_to_one_winner() {
        let (mut store, _) = open();
        let id = empty_slot(&mut store, 1, 3, 1);
        let prize_id = store.add_prize(&id, None).unwrap();
        let prize = &store.get_slot(&id).unwrap().prizes[&prize_id];
        assert_eq!(prize.name, "New Prize");
        assert_eq!(prize.slot_count, 1);
        assert!(prize.tickets.is_empty());

        assert_eq!(
            store.set_prize_slot_count(&id, &prize_id, 0),
            Err(StoreError::InvalidSlotCount(0))
        );
        store.minimize_prize(&id, &prize_id).unwrap();
        assert!(store.get_slot(&id).unwrap().prizes[&prize_id].minimized);
        store.maximize_prize(&id, &prize_id).unwrap();
        assert!(!store.get_slot(&id).unwrap().prizes[&prize_id].minimized);
    }

    #[test]
    fn history_starts_with_a_map_per_prize() {
        let (mut store, _) = open();
        let id = empty_slot(&mut store, 1, 3, 1);
        let a = store.add_prize(&id, Some("A".to_string())).unwrap();
        let b = store.add_prize(&id, Some("B".to_string())).unwrap();
        let history_id = store.create_history(&id).unwrap();
        let history = &store.get_slot(&id).unwrap().history[&history_id];
        assert_eq!(history.prizes.len(), 2);
        assert!(history.prizes[&a].is_empty() && history.prizes[&b].is_empty());

        store.rename_history(&id, &history_id, Some("Round 1".to_string())).unwrap();
        assert_eq!(
            store.get_slot(&id).unwrap().history[&history_id].name.as_deref(),
            Some("Round 1")
        );
        store.delete_history(&id, &history_id).unwrap();
        assert!(store.get_slot(&id).unwrap().history.is_empty());
    }

    #[test]
    fn filled_positions_are_immutable() {
        let (mut store, _) = open();
        let id = empty_slot(&mut store, 1, 5, 1);
        let prize_id = store.add_prize(&id, None).unwrap();
        let history_id = store.create_history(&id).unwrap();

        let ticket = store.draw_ticket(&id, &prize_id, &history_id).unwrap().unwrap();
        store.record_draw(&id, &history_id, &prize_id, 0, ticket).unwrap();

        let another = store.draw_ticket(&id, &prize_id, &history_id).unwrap().unwrap();
        assert_eq!(
            store.record_draw(&id, &history_id, &prize_id, 0, another.clone()),
            Err(StoreError::PositionFilled(0))
        );
        assert_eq!(
            store.record_draw(&id, &history_id, &prize_id, 1, another),
            Err(StoreError::PositionOutOfRange {
                position: 1,
                slot_count: 1
            })
        );
    }

    #[test]
    fn recording_a_drawn_value_twice_is_rejected() {
        let (mut store, _) = open();
        let id = empty_slot(&mut store, 1, 5, 1);
        let prize_id = store.add_prize(&id, None).unwrap();
        store.set_prize_slot_count(&id, &prize_id, 2).unwrap();
        let history_id = store.create_history(&id).unwrap();

        let ticket = store.draw_ticket(&id, &prize_id, &history_id).unwrap().unwrap();
        store.record_draw(&id, &history_id, &prize_id, 0, ticket.clone()).unwrap();
        assert_eq!(
            store.record_draw(&id, &history_id, &prize_id, 1, ticket.clone()),
            Err(StoreError::DuplicateTicketValue(ticket.value.to_string()))
        );
    }

    #[test]
    fn foreign_tickets_cannot_be_recorded() {
        let (mut store, _) = open();
        let id = empty_slot(&mut store, 1, 5, 1);
        let prize_id = store.add_prize(&id, None).unwrap();
        let history_id = store.create_history(&id).unwrap();
        let stranger = Ticket::new(TicketDraft {
            label: "9".to_string(),
            value: TicketValue::Number(9),
        });
        assert!(matches!(
            store.record_draw(&id, &history_id, &prize_id, 0, stranger),
            Err(StoreError::TicketNotFound(_))
        ));
    }

    #[test]
    fn cleared_position_can_be_redrawn() {
        let (mut store, _) = open();
        let id = empty_slot(&mut store, 1, 1, 1);
        let prize_id = store.add_prize(&id, None).unwrap();
        let history_id = store.create_history(&id).unwrap();

        let first = store.draw_and_record(&id, &history_id, &prize_id, 0).unwrap().unwrap();
        assert_eq!(
            store.prize_progress(&id, &history_id, &prize_id).unwrap().state(),
            DrawState::Complete
        );
        assert_eq!(store.clear_draw(&id, &history_id, &prize_id, 0).unwrap(), first);
        let again = store.draw_and_record(&id, &history_id, &prize_id, 0).unwrap().unwrap();
        assert_eq!(again.value, first.value);
    }

    #[test]
    fn draws_into_a_prize_added_after_the_history() {
        let (mut store, _) = open();
        let id = empty_slot(&mut store, 1, 3, 1);
        let history_id = store.create_history(&id).unwrap();
        let late = store.add_prize(&id, None).unwrap();
        assert!(store.draw_and_record(&id, &history_id, &late, 0).unwrap().is_some());
        assert_eq!(store.get_slot(&id).unwrap().history[&history_id].prizes[&late].len(), 1);
    }

    #[test]
    fn master_pool_owner_and_manual_tickets() {
        let (mut store, _) = open();
        let id = empty_slot(&mut store, 1, 2, 1);
        let manual = store
            .add_ticket(
                &id,
                TicketDraft {
                    label: "VIP".to_string(),
                    value: TicketValue::Text("VIP".to_string()),
                },
            )
            .unwrap();
        store.set_ticket_owner(&id, &manual, Some("Ana".to_string())).unwrap();
        let slot = store.get_slot(&id).unwrap();
        assert_eq!(slot.tickets.len(), 3);
        assert_eq!(slot.tickets[&manual].owner.as_deref(), Some("Ana"));

        store.clear_tickets(&id).unwrap();
        assert!(store.get_slot(&id).unwrap().tickets.is_empty());
    }

    #[test]
    fn prize_ticket_deletion() {
        let (mut store, _) = open();
        let id = empty_slot(&mut store, 1, 9, 1);
        let prize_id = store.add_prize(&id, None).unwrap();
        store.generate_prize_tickets(&id, &prize_id, 1, 3).unwrap();
        let ticket_id = store.get_slot(&id).unwrap().prizes[&prize_id]
            .tickets
            .keys()
            .next()
            .cloned()
            .unwrap();
        store.delete_prize_ticket(&id, &prize_id, &ticket_id).unwrap();
        assert_eq!(store.get_slot(&id).unwrap().prizes[&prize_id].tickets.len(), 2);
        store.clear_prize_tickets(&id, &prize_id).unwrap();
        assert!(store.get_slot(&id).unwrap().prizes[&prize_id].tickets.is_empty());
    }

    #[test]
    fn prize_regeneration_replaces_the_sub_pool() {
        let (mut store, _) = open();
        let id = empty_slot(&mut store, 1, 50, 2);
        let prize_id = store.add_prize(&id, None).unwrap();
        store.generate_prize_tickets(&id, &prize_id, 1, 5).unwrap();
        let first: Vec<TicketId> = store.get_slot(&id).unwrap().prizes[&prize_id]
            .tickets
            .keys()
            .cloned()
            .collect();

        assert_eq!(store.generate_prize_tickets(&id, &prize_id, 20, 22), Ok(3));
        let prize = &store.get_slot(&id).unwrap().prizes[&prize_id];
        assert_eq!(prize.tickets.len(), 3);
        assert!(first.iter().all(|t| !prize.tickets.contains_key(t)));
        let labels: Vec<&str> = prize
            .tickets_sorted()
            .iter()
            .map(|t| t.label.as_str())
            .collect();
        assert_eq!(labels, vec!["20", "21", "22"]);
    }

    #[test]
    fn padded_text_ticket_matches_the_drawn_number() {
        let (mut store, _) = open();
        let id = empty_slot(&mut store, 3, 3, 3);
        let first = store.add_prize(&id, None).unwrap();
        let second = store.add_prize(&id, None).unwrap();
        let history_id = store.create_history(&id).unwrap();
        let drawn = store.draw_and_record(&id, &history_id, &first, 0).unwrap();
        assert_eq!(drawn.map(|t| t.value), Some(TicketValue::Number(3)));

        let draft = TicketDraft {
            label: "003".to_string(),
            value: TicketValue::Text("003".to_string()),
        };
        let ticket_id = store.add_prize_ticket(&id, &second, draft).unwrap();
        let ticket = store.get_slot(&id).unwrap().prizes[&second].tickets[&ticket_id].clone();
        assert_eq!(ticket.value, TicketValue::Number(3));
        assert_eq!(store.draw_ticket(&id, &second, &history_id).unwrap(), None);
        assert_eq!(
            store.record_draw(&id, &history_id, &second, 0, ticket),
            Err(StoreError::DuplicateTicketValue("3".to_string()))
        );
    }

    /// Memory storage whose saves can be switched to fail
    struct FailingStorage {
        inner: MemoryStorage,
        failing: Arc<AtomicBool>,
    }

    impl Storage for FailingStorage {
        fn load(&self) -> StoreResult<Option<SlotTree>> {
            self.inner.load()
        }

        fn save(&self, tree: &SlotTree) -> StoreResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::Persistence("disk full".to_string()));
            }
            self.inner.save(tree)
        }
    }

    #[test]
    fn failed_save_rolls_back_the_change() {
        let config = StoreConfig::default();
        let inner = MemoryStorage::new(&config);
        let failing = Arc::new(AtomicBool::new(false));
        let storage = FailingStorage {
            inner: inner.clone(),
            failing: failing.clone(),
        };
        let mut store = Store::open(storage, config).unwrap();
        store.reseed(11);
        let id = empty_slot(&mut store, 1, 4, 1);
        let prize_id = store.add_prize(&id, None).unwrap();
        let history_id = store.create_history(&id).unwrap();
        let before = store.get_slot(&id).unwrap().clone();

        failing.store(true, Ordering::SeqCst);
        assert!(matches!(
            store.draw_and_record(&id, &history_id, &prize_id, 0),
            Err(StoreError::Persistence(_))
        ));
        assert_eq!(store.get_slot(&id).unwrap(), &before);
        assert!(matches!(
            store.generate_slot_tickets(&id, TicketRange::new(1, 9, 1)),
            Err(StoreError::Persistence(_))
        ));
        assert_eq!(store.get_slot(&id).unwrap(), &before);
        assert!(store.add_slot(None).is_err());
        assert_eq!(store.list_slots().len(), 2);
        assert_eq!(inner.load().unwrap().unwrap().slots[&id], before);

        failing.store(false, Ordering::SeqCst);
        let ticket = store
            .draw_and_record(&id, &history_id, &prize_id, 0)
            .unwrap()
            .unwrap();
        let saved = inner.load().unwrap().unwrap();
        assert_eq!(saved.slots[&id].history[&history_id].prizes[&prize_id][&0], ticket);
    }
}
