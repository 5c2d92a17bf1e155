//! Event ticketing.
//!
//! Organizers create dated events with a fixed number of tickets. Tickets
//! are bought at the listed price and may be passed on until the event date.

use ledgerflow_core::Clock;
use ledgerflow_types::{Address, Amount, Timestamp};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TicketingError {
    #[error("can only organize event at a future date")]
    DateInPast,

    #[error("can only organize event with at least 1 ticket")]
    NoTickets,

    #[error("this event does not exist")]
    EventNotFound(u64),

    #[error("event has expired")]
    EventExpired,

    #[error("ether sent must be equal to total ticket cost")]
    WrongPayment { expected: Amount, got: Amount },

    #[error("not enough ticket left")]
    SoldOut { remaining: u64 },

    #[error("not enough ticket")]
    NotEnoughTickets { held: u64 },

    #[error("Quantity must be positive")]
    ZeroQuantity,

    #[error("Arithmetic overflow")]
    Overflow,
}

/// A ticketed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: u64,
    pub organizer: Address,
    pub name: String,
    pub date: Timestamp,
    pub price: Amount,
    pub ticket_count: u64,
    pub ticket_remaining: u64,
}

/// Ticketing contract state.
#[derive(Debug, Default)]
pub struct EventTicketing {
    events: Vec<Event>,
    tickets: HashMap<(Address, u64), u64>,
    balance: Amount,
}

impl EventTicketing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event(&self, id: u64) -> Option<&Event> {
        usize::try_from(id).ok().and_then(|i| self.events.get(i))
    }

    /// Tickets `owner` holds for event `id`.
    pub fn tickets(&self, owner: &Address, id: u64) -> u64 {
        self.tickets.get(&(*owner, id)).copied().unwrap_or(0)
    }

    /// Ticket revenue held by the contract.
    pub fn balance(&self) -> Amount {
        self.balance
    }

    fn active_event(&self, id: u64, now: Timestamp) -> Result<&Event, TicketingError> {
        let event = self.event(id).ok_or(TicketingError::EventNotFound(id))?;
        if now >= event.date {
            return Err(TicketingError::EventExpired);
        }
        Ok(event)
    }

    pub fn create_event(
        &mut self,
        caller: Address,
        name: impl Into<String>,
        date: Timestamp,
        price: Amount,
        ticket_count: u64,
        clock: &impl Clock,
    ) -> Result<u64, TicketingError> {
        if date <= clock.now() {
            return Err(TicketingError::DateInPast);
        }
        if ticket_count == 0 {
            return Err(TicketingError::NoTickets);
        }

        let id = self.events.len() as u64;
        self.events.push(Event {
            id,
            organizer: caller,
            name: name.into(),
            date,
            price,
            ticket_count,
            ticket_remaining: ticket_count,
        });
        tracing::debug!("Event #{} created with {} tickets", id, ticket_count);
        Ok(id)
    }

    pub fn buy_ticket(
        &mut self,
        caller: Address,
        id: u64,
        quantity: u64,
        value: Amount,
        clock: &impl Clock,
    ) -> Result<u64, TicketingError> {
        let event = self.active_event(id, clock.now())?;
        if quantity == 0 {
            return Err(TicketingError::ZeroQuantity);
        }

        let expected = event
            .price
            .checked_mul(u128::from(quantity))
            .ok_or(TicketingError::Overflow)?;
        if value != expected {
            return Err(TicketingError::WrongPayment { expected, got: value });
        }
        if event.ticket_remaining < quantity {
            return Err(TicketingError::SoldOut {
                remaining: event.ticket_remaining,
            });
        }
        let balance = self.balance.checked_add(value).ok_or(TicketingError::Overflow)?;
        let held = self
            .tickets(&caller, id)
            .checked_add(quantity)
            .ok_or(TicketingError::Overflow)?;

        if let Some(event) = usize::try_from(id).ok().and_then(|i| self.events.get_mut(i)) {
            event.ticket_remaining -= quantity;
        }
        self.tickets.insert((caller, id), held);
        self.balance = balance;
        Ok(held)
    }

    pub fn transfer_ticket(
        &mut self,
        caller: Address,
        id: u64,
        quantity: u64,
        to: Address,
        clock: &impl Clock,
    ) -> Result<(), TicketingError> {
        self.active_event(id, clock.now())?;

        let held = self.tickets(&caller, id);
        if held < quantity {
            return Err(TicketingError::NotEnoughTickets { held });
        }
        if caller == to || quantity == 0 {
            return Ok(());
        }
        let receiver_total = self
            .tickets(&to, id)
            .checked_add(quantity)
            .ok_or(TicketingError::Overflow)?;

        self.tickets.insert((caller, id), held - quantity);
        self.tickets.insert((to, id), receiver_total);
        Ok(())
    }
}
