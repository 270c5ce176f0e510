// Lottery Slots - History ledger reads
//
// Completion is derived from the populated positions; no status is stored.
// Entries for prizes that no longer exist in the slot are treated as deleted.
use std::collections::{BTreeMap, HashSet};

use crate::state::{History, Position, Prize, PrizeId, Ticket, TicketValue};

/// Draw state of one prize within one history
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawState {
    Empty,
    PartiallyFilled,
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawProgress {
    pub filled: u32,
    pub total: u32,
}

impl DrawProgress {
    pub fn state(&self) -> DrawState {
        if self.filled == 0 {
            DrawState::Empty
        } else if self.filled >= self.total {
            DrawState::Complete
        } else {
            DrawState::PartiallyFilled
        }
    }
}

/// Recorded positions whose prize still exists
pub fn live_entries<'a>(
    history: &'a History,
    prizes: &'a BTreeMap<PrizeId, Prize>,
) -> impl Iterator<Item = (&'a PrizeId, &'a BTreeMap<Position, Ticket>)> + 'a {
    history
        .prizes
        .iter()
        .filter(move |(prize_id, _)| prizes.contains_key(*prize_id))
}

/// Every ticket value already awarded in this history, across all prizes
pub fn drawn_values<'a>(
    history: &'a History,
    prizes: &'a BTreeMap<PrizeId, Prize>,
) -> HashSet<&'a TicketValue> {
    live_entries(history, prizes)
        .flat_map(|(_, positions)| positions.values())
        .map(|ticket| &ticket.value)
        .collect()
}

/// Populated positions of `prize` in `history` that fall inside its slot count
pub fn prize_progress(history: &History, prize: &Prize) -> DrawProgress {
    let filled = history
        .prizes
        .get(&prize.id)
        .map(|positions| positions.keys().filter(|&&p| p < prize.slot_count).count())
        .unwrap_or(0);
    DrawProgress {
        filled: filled as u32,
        total: prize.slot_count,
    }
}

impl History {
    /// Every prize of the slot has all of its positions filled
    pub fn is_complete(&self, prizes: &BTreeMap<PrizeId, Prize>) -> bool {
        prizes
            .values()
            .all(|prize| prize_progress(self, prize).state() == DrawState::Complete)
    }
}
