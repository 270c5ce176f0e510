// Lottery Slots - Ticket pool generation
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{StoreError, StoreResult};
use crate::state::{Ticket, TicketDraft, TicketId, TicketValue};
use crate::utils::digits;

/// Inclusive numeric range of ticket numbers and the label width to pad them to
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct TicketRange {
    pub from: u64,
    pub to: u64,
    pub pad_width: u8,
}

impl TicketRange {
    pub fn new(from: u64, to: u64, pad_width: u8) -> Self {
        Self { from, to, pad_width }
    }

    /// Range padded to the number of digits in `to`
    pub fn natural(from: u64, to: u64) -> Self {
        Self::new(from, to, digits(to))
    }

    /// Number of tickets in the range, checked against `limit`
    pub fn checked_len(&self, limit: u64) -> StoreResult<u64> {
        if self.from > self.to {
            return Err(StoreError::InvalidRange {
                from: self.from,
                to: self.to,
            });
        }
        let len = (self.to - self.from)
            .checked_add(1)
            .ok_or(StoreError::PoolTooLarge {
                requested: u64::MAX,
                limit,
            })?;
        if len > limit {
            return Err(StoreError::PoolTooLarge {
                requested: len,
                limit,
            });
        }
        Ok(len)
    }
}

/// Left-pad the decimal form of `value` with '0' to `width` characters
pub fn pad_label(value: u64, width: u8) -> String {
    format!("{:0>width$}", value, width = width as usize)
}

/// Ticket drafts for every number in `range`, both bounds included
pub fn generate_range(range: &TicketRange, max_pool_size: u64) -> StoreResult<Vec<TicketDraft>> {
    range.checked_len(max_pool_size)?;
    Ok((range.from..=range.to)
        .map(|n| TicketDraft {
            label: pad_label(n, range.pad_width),
            value: TicketValue::Number(n),
        })
        .collect())
}

/// Give each draft a fresh id and creation time
pub fn materialize(drafts: impl IntoIterator<Item = TicketDraft>) -> BTreeMap<TicketId, Ticket> {
    drafts
        .into_iter()
        .map(Ticket::new)
        .map(|ticket| (ticket.id.clone(), ticket))
        .collect()
}
