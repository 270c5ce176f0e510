// Lottery Slots - Draw engine
use rand::Rng;
use std::collections::BTreeMap;

use crate::history::drawn_values;
use crate::state::{History, Prize, Slot, Ticket, TicketId};
use crate::utils::random_index;

/// The prize's own sub-pool when it has one, otherwise the slot's master pool
pub fn candidate_pool<'a>(slot: &'a Slot, prize: &'a Prize) -> &'a BTreeMap<TicketId, Ticket> {
    if prize.tickets.is_empty() {
        &slot.tickets
    } else {
        &prize.tickets
    }
}

/// Tickets in the candidate pool whose value has not been awarded in `history`
pub fn eligible_tickets<'a>(
    slot: &'a Slot,
    prize: &'a Prize,
    history: &History,
) -> Vec<&'a Ticket> {
    let excluded = drawn_values(history, &slot.prizes);
    candidate_pool(slot, prize)
        .values()
        .filter(|ticket| !excluded.contains(&ticket.value))
        .collect()
}

/// Pick one eligible ticket uniformly at random; `None` once the pool is exhausted.
/// Read-only: recording the result is the caller's job.
pub fn draw_ticket<'a, R: Rng + ?Sized>(
    slot: &'a Slot,
    prize: &'a Prize,
    history: &History,
    rng: &mut R,
) -> Option<&'a Ticket> {
    let eligible = eligible_tickets(slot, prize, history);
    random_index(rng, eligible.len()).map(|i| eligible[i])
}
