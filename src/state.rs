// Lottery Slots - State
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::StoreConfig;
use crate::identity::{new_id, now, UnixTimestampMillis};

pub type SlotId = String;
pub type PrizeId = String;
pub type TicketId = String;
pub type HistoryId = String;

/// Position of a winner within a prize, in `[0, slot_count)`
pub type Position = u32;

/// Canonical identity of a ticket, used for exclusion comparisons
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, BorshSerialize,
    BorshDeserialize,
)]
#[serde(untagged)]
pub enum TicketValue {
    Number(u64),
    Text(String),
}

impl TicketValue {
    /// Digit-only text becomes a number, so "003" and 3 compare equal
    pub fn normalized(self) -> Self {
        match self {
            TicketValue::Text(text)
                if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) =>
            {
                match text.parse() {
                    Ok(n) => TicketValue::Number(n),
                    Err(_) => TicketValue::Text(text),
                }
            }
            other => other,
        }
    }
}

impl fmt::Display for TicketValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketValue::Number(n) => write!(f, "{}", n),
            TicketValue::Text(s) => f.write_str(s),
        }
    }
}

/// What a prize is worth: an amount or a free-text description
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(untagged)]
pub enum PrizeValue {
    Amount(u64),
    Text(String),
}

/// A ticket before it receives an id and creation time
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TicketDraft {
    pub label: String,
    pub value: TicketValue,
}

/// One lottery number in a slot's master pool or a prize's sub-pool
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub created_at: UnixTimestampMillis,
    /// Display string, usually zero-padded
    pub label: String,
    pub value: TicketValue,
    #[serde(default)]
    pub owner: Option<String>,
}

impl Ticket {
    pub fn new(draft: TicketDraft) -> Self {
        Self {
            id: new_id(),
            created_at: now(),
            label: draft.label,
            value: draft.value.normalized(),
            owner: None,
        }
    }
}

/// A prize awarded to `slot_count` winners per game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Prize {
    pub id: PrizeId,
    pub created_at: UnixTimestampMillis,
    pub name: String,
    pub value: PrizeValue,
    #[serde(default)]
    pub asset: Option<String>,
    /// Dedicated sub-pool; empty means the prize draws from the slot's master pool
    #[serde(default)]
    pub tickets: BTreeMap<TicketId, Ticket>,
    pub slot_count: u32,
    #[serde(default)]
    pub minimized: bool,
}

impl Prize {
    pub fn new(name: String, value: PrizeValue) -> Self {
        Self {
            id: new_id(),
            created_at: now(),
            name,
            value,
            asset: None,
            tickets: BTreeMap::new(),
            slot_count: 1,
            minimized: false,
        }
    }

    pub fn tickets_sorted(&self) -> Vec<&Ticket> {
        sort_tickets(&self.tickets)
    }
}

/// Display customization of a slot
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct SlotTheme {
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub background_image: Option<String>,
}

/// One draw session: prize id -> position -> awarded ticket
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct History {
    pub id: HistoryId,
    pub created_at: UnixTimestampMillis,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub prizes: BTreeMap<PrizeId, BTreeMap<Position, Ticket>>,
}

impl History {
    /// New game with one empty position map per prize
    pub fn new<'a>(prize_ids: impl IntoIterator<Item = &'a PrizeId>) -> Self {
        Self {
            id: new_id(),
            created_at: now(),
            name: None,
            prizes: prize_ids
                .into_iter()
                .map(|id| (id.clone(), BTreeMap::new()))
                .collect(),
        }
    }
}

/// A configured lottery event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Slot {
    pub id: SlotId,
    pub created_at: UnixTimestampMillis,
    pub name: String,
    /// Label width recorded by the last master pool generation
    #[serde(default)]
    pub pad_width: Option<u8>,
    #[serde(default)]
    pub from: Option<u64>,
    #[serde(default)]
    pub to: Option<u64>,
    #[serde(default)]
    pub prizes: BTreeMap<PrizeId, Prize>,
    /// Master pool
    #[serde(default)]
    pub tickets: BTreeMap<TicketId, Ticket>,
    #[serde(default)]
    pub history: BTreeMap<HistoryId, History>,
    #[serde(default)]
    pub theme: SlotTheme,
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub tickets_minimized: bool,
}

impl Slot {
    /// Empty slot with no prizes or tickets
    pub fn new(name: String) -> Self {
        Self {
            id: new_id(),
            created_at: now(),
            name,
            pad_width: None,
            from: None,
            to: None,
            prizes: BTreeMap::new(),
            tickets: BTreeMap::new(),
            history: BTreeMap::new(),
            theme: SlotTheme::default(),
            password_hash: None,
            tickets_minimized: false,
        }
    }

    /// Slot with one default prize and one default ticket shared by both pools
    pub fn seeded(name: String, config: &StoreConfig) -> Self {
        let mut slot = Self::new(name);
        let ticket = Ticket::new(TicketDraft {
            label: config.seed_ticket_label.clone(),
            value: TicketValue::Number(1),
        });
        let mut prize = Prize::new(
            config.seed_prize_name.clone(),
            PrizeValue::Amount(config.seed_prize_value),
        );
        prize.tickets.insert(ticket.id.clone(), ticket.clone());
        slot.tickets.insert(ticket.id.clone(), ticket);
        slot.prizes.insert(prize.id.clone(), prize);
        slot
    }

    pub fn from_json(blob: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(blob)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn apply(&mut self, patch: SlotPatch) {
        match patch {
            SlotPatch::Name(name) => self.name = name,
            SlotPatch::TicketsMinimized(flag) => self.tickets_minimized = flag,
            SlotPatch::PrimaryColor(color) => self.theme.primary_color = color,
            SlotPatch::SecondaryColor(color) => self.theme.secondary_color = color,
            SlotPatch::BackgroundImage(image) => self.theme.background_image = image,
        }
    }

    pub fn tickets_sorted(&self) -> Vec<&Ticket> {
        sort_tickets(&self.tickets)
    }

    pub fn prizes_sorted(&self) -> Vec<&Prize> {
        let mut prizes: Vec<&Prize> = self.prizes.values().collect();
        prizes.sort_by(|a, b| (a.created_at, &a.name).cmp(&(b.created_at, &b.name)));
        prizes
    }

    pub fn histories_sorted(&self) -> Vec<&History> {
        let mut histories: Vec<&History> = self.history.values().collect();
        histories.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        histories
    }
}

/// Legal single-field edits of a slot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum SlotPatch {
    Name(String),
    TicketsMinimized(bool),
    PrimaryColor(Option<String>),
    SecondaryColor(Option<String>),
    BackgroundImage(Option<String>),
}

/// Legal single-field edits of a prize
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PrizePatch {
    Name(String),
    Value(PrizeValue),
    Asset(Option<String>),
    Minimized(bool),
}

impl Prize {
    pub fn apply(&mut self, patch: PrizePatch) {
        match patch {
            PrizePatch::Name(name) => self.name = name,
            PrizePatch::Value(value) => self.value = value,
            PrizePatch::Asset(asset) => self.asset = asset,
            PrizePatch::Minimized(flag) => self.minimized = flag,
        }
    }
}

fn sort_tickets(tickets: &BTreeMap<TicketId, Ticket>) -> Vec<&Ticket> {
    let mut list: Vec<&Ticket> = tickets.values().collect();
    list.sort_by(|a, b| (a.created_at, &a.label).cmp(&(b.created_at, &b.label)));
    list
}
