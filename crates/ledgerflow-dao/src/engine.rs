//! The funding/voting/execution workflow.
//!
//! Every public operation validates all of its guards first and only then
//! mutates. The two operations that move value (`execute_proposal`,
//! `withdraw`) apply their bookkeeping, call the transfer collaborator, and
//! undo the bookkeeping if the collaborator refuses.

use crate::config::DaoConfig;
use crate::error::DaoError;
use crate::events::DaoEvent;
use crate::investor::Investor;
use crate::ledger::Ledger;
use crate::proposal::{Proposal, ProposalRegistry};
use ledgerflow_core::{Clock, FundsTransfer};
use ledgerflow_types::{Address, Amount, Timestamp};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Investor-funded DAO.
pub struct DaoEngine<C: Clock, T: FundsTransfer> {
    config: DaoConfig,
    admin: Address,
    clock: C,
    transfer: T,
    created_at: Timestamp,
    contribution_end: Timestamp,
    last_seen: Timestamp,
    investors: BTreeMap<Address, Investor>,
    proposals: ProposalRegistry,
    ledger: Ledger,
    events: Vec<DaoEvent>,
}

impl<C: Clock, T: FundsTransfer> DaoEngine<C, T> {
    /// Create a DAO. The contribution window opens now.
    pub fn new(config: DaoConfig, admin: Address, clock: C, transfer: T) -> Result<Self, DaoError> {
        config.validate()?;

        let created_at = clock.now();
        let contribution_end = created_at.saturating_add(config.contribution_period);

        info!(
            "DAO created by {} (contributions until {}, quorum {}%)",
            admin.short(),
            contribution_end,
            config.quorum_percent
        );

        Ok(Self {
            config,
            admin,
            clock,
            transfer,
            created_at,
            contribution_end,
            last_seen: created_at,
            investors: BTreeMap::new(),
            proposals: ProposalRegistry::new(),
            ledger: Ledger::new(),
            events: Vec::new(),
        })
    }

    /// Current time, never earlier than the time of the last committed call.
    fn now(&self) -> Timestamp {
        let reading = self.clock.now();
        if reading < self.last_seen {
            warn!("Clock went backwards ({} < {}), holding at last reading", reading, self.last_seen);
            return self.last_seen;
        }
        reading
    }

    /// Record a successful call. Rejected calls never reach here, so they
    /// leave the remembered time untouched.
    fn commit(&mut self, now: Timestamp, event: DaoEvent) -> DaoEvent {
        self.last_seen = now;
        self.events.push(event.clone());
        event
    }

    fn require_investor(&self, caller: &Address) -> Result<&Investor, DaoError> {
        self.investors
            .get(caller)
            .filter(|i| i.member)
            .ok_or_else(|| DaoError::Unauthorized("only investors".to_string()))
    }

    // ========================================================
    // Operations
    // ========================================================

    /// Add `amount` to `investor`'s contribution, registering them on first use.
    pub fn contribute(&mut self, investor: Address, amount: Amount) -> Result<DaoEvent, DaoError> {
        let now = self.now();

        if now >= self.contribution_end {
            debug!("Contribution from {} after deadline", investor.short());
            return Err(DaoError::WindowClosed {
                closed_at: self.contribution_end,
                now,
            });
        }

        if amount.is_zero() {
            return Err(DaoError::InvalidAmount("contribution must be positive".to_string()));
        }

        let total_contribution = match self.investors.get(&investor) {
            Some(existing) => existing.contribution_after(amount),
            None => Some(amount),
        }
        .ok_or(DaoError::Overflow)?;
        self.ledger.ensure_creditable(amount)?;

        // All guards passed
        self.ledger.record_contribution(amount)?;
        let record = self
            .investors
            .entry(investor)
            .or_insert_with(|| Investor::new(investor, now));
        record.contribution = total_contribution;

        info!("{} contributed {} (total {})", investor.short(), amount, total_contribution);

        Ok(self.commit(
            now,
            DaoEvent::Contributed {
                investor,
                amount,
                total_contribution,
                at: now,
            },
        ))
    }

    /// Open a proposal to pay `amount` to `recipient`.
    pub fn create_proposal(
        &mut self,
        caller: Address,
        name: impl Into<String>,
        amount: Amount,
        recipient: Address,
    ) -> Result<DaoEvent, DaoError> {
        let now = self.now();

        if let Err(e) = self.require_investor(&caller) {
            debug!("Proposal from non-investor {}", caller.short());
            return Err(e);
        }

        if amount.is_zero() {
            return Err(DaoError::InvalidAmount("proposal amount must be positive".to_string()));
        }

        let limit = self.proposal_cap()?;
        if amount > limit {
            debug!("Proposal amount {} over cap {}", amount, limit);
            return Err(DaoError::AmountExceedsLimit {
                requested: amount,
                limit,
            });
        }

        let name = name.into();
        let voting_period = self.config.voting_period;
        let proposal = self
            .proposals
            .create_proposal(name, caller, amount, recipient, now, voting_period);

        let event = DaoEvent::ProposalCreated {
            proposal_id: proposal.id,
            proposer: caller,
            name: proposal.name.clone(),
            amount,
            recipient,
            ends_at: proposal.ends_at,
        };

        info!(
            "Proposal #{} '{}' created: {} to {}",
            proposal.id,
            proposal.name,
            amount,
            recipient.short()
        );

        Ok(self.commit(now, event))
    }

    /// Vote for a proposal with the caller's full contribution.
    pub fn vote(&mut self, caller: Address, proposal_id: u64) -> Result<DaoEvent, DaoError> {
        let now = self.now();

        let weight = match self.require_investor(&caller) {
            Ok(investor) => investor.vote_weight(),
            Err(e) => {
                debug!("Vote from non-investor {}", caller.short());
                return Err(e);
            }
        };

        let proposal = self
            .proposals
            .get_mut(proposal_id)
            .ok_or(DaoError::NotFound(proposal_id))?;

        let total_votes = match proposal.cast_vote(caller, weight, now) {
            Ok(total) => total,
            Err(e) => {
                debug!("Vote on #{} by {} rejected: {}", proposal_id, caller.short(), e);
                return Err(e);
            }
        };

        info!(
            "{} voted on #{} with weight {} (total {})",
            caller.short(),
            proposal_id,
            weight,
            total_votes
        );

        Ok(self.commit(
            now,
            DaoEvent::VoteCast {
                proposal_id,
                voter: caller,
                weight,
                total_votes,
            },
        ))
    }

    /// Pay out a proposal whose votes reached quorum.
    pub fn execute_proposal(&mut self, caller: Address, proposal_id: u64) -> Result<DaoEvent, DaoError> {
        let now = self.now();

        let proposal = self
            .proposals
            .get(proposal_id)
            .ok_or(DaoError::NotFound(proposal_id))?;

        if proposal.executed {
            return Err(DaoError::AlreadyExecuted(proposal_id));
        }

        let required = self.quorum_threshold()?;

        if proposal.votes < required {
            debug!("Proposal #{} below quorum: {} < {}", proposal_id, proposal.votes, required);
            return Err(DaoError::QuorumNotMet {
                actual: proposal.votes,
                required,
            });
        }

        let amount = proposal.amount;
        let recipient = proposal.recipient;
        self.ledger.ensure_available(amount)?;

        // Tentative bookkeeping, undone below if the transfer is refused
        self.ledger.disburse(amount)?;
        if let Some(p) = self.proposals.get_mut(proposal_id) {
            p.mark_executed(now)?;
        }

        if let Err(e) = self.transfer.transfer(recipient, amount) {
            warn!("Transfer for proposal #{} failed, rolling back: {}", proposal_id, e);
            self.ledger.revert_disbursement(amount);
            if let Some(p) = self.proposals.get_mut(proposal_id) {
                p.revert_execution();
            }
            return Err(e.into());
        }

        info!(
            "Proposal #{} executed: {} to {} (available {})",
            proposal_id,
            amount,
            recipient.short(),
            self.ledger.available()
        );

        Ok(self.commit(
            now,
            DaoEvent::ProposalExecuted {
                proposal_id,
                executor: caller,
                recipient,
                amount,
                at: now,
            },
        ))
    }

    /// Admin withdrawal of undisbursed funds.
    pub fn withdraw(
        &mut self,
        caller: Address,
        amount: Amount,
        recipient: Address,
    ) -> Result<DaoEvent, DaoError> {
        let now = self.now();

        if caller != self.admin {
            debug!("Withdrawal by non-admin {}", caller.short());
            return Err(DaoError::Unauthorized("only admin".to_string()));
        }

        if amount.is_zero() {
            return Err(DaoError::InvalidAmount("withdrawal must be positive".to_string()));
        }

        self.ledger.ensure_available(amount)?;

        self.ledger.withdraw(amount)?;
        if let Err(e) = self.transfer.transfer(recipient, amount) {
            warn!("Withdrawal transfer to {} failed, rolling back: {}", recipient.short(), e);
            self.ledger.revert_withdrawal(amount);
            return Err(e.into());
        }

        info!(
            "Admin withdrew {} to {} (available {})",
            amount,
            recipient.short(),
            self.ledger.available()
        );

        Ok(self.commit(
            now,
            DaoEvent::Withdrawn {
                admin: caller,
                recipient,
                amount,
                at: now,
            },
        ))
    }

    // ========================================================
    // Queries
    // ========================================================

    /// Smallest vote total that reaches quorum: `ceil(total * quorum / 100)`.
    ///
    /// `votes >= ceil(total * q / 100)` is the same test as
    /// `votes * 100 >= total * q`, and the same as the floor-division form
    /// `votes * 100 / total >= q` for whole-number percentages. The product is
    /// never formed, so any total up to `u128::MAX` has a threshold.
    pub fn quorum_threshold(&self) -> Result<Amount, DaoError> {
        self.ledger
            .total_contributions()
            .percent_of_ceil(self.config.quorum_percent)
            .ok_or(DaoError::Overflow)
    }

    /// Largest amount a new proposal may request: `floor(available * max% / 100)`.
    pub fn proposal_cap(&self) -> Result<Amount, DaoError> {
        self.ledger
            .available()
            .percent_of(self.config.max_proposal_percent)
            .ok_or(DaoError::Overflow)
    }

    pub fn is_investor(&self, address: &Address) -> bool {
        self.require_investor(address).is_ok()
    }

    pub fn investor(&self, address: &Address) -> Option<&Investor> {
        self.investors.get(address)
    }

    /// Investors ordered by address.
    pub fn investors(&self) -> impl Iterator<Item = &Investor> {
        self.investors.values()
    }

    pub fn contribution_of(&self, address: &Address) -> Amount {
        self.investors
            .get(address)
            .map(|i| i.contribution)
            .unwrap_or(Amount::ZERO)
    }

    pub fn proposal(&self, id: u64) -> Option<&Proposal> {
        self.proposals.get(id)
    }

    pub fn proposals(&self) -> &[Proposal] {
        self.proposals.all()
    }

    pub fn proposal_count(&self) -> u64 {
        self.proposals.next_id()
    }

    pub fn has_voted(&self, voter: &Address, proposal_id: u64) -> bool {
        self.proposals
            .get(proposal_id)
            .map(|p| p.has_voted(voter))
            .unwrap_or(false)
    }

    pub fn available_funds(&self) -> Amount {
        self.ledger.available()
    }

    pub fn total_contributions(&self) -> Amount {
        self.ledger.total_contributions()
    }

    pub fn total_disbursed(&self) -> Amount {
        self.ledger.total_disbursed()
    }

    pub fn total_withdrawn(&self) -> Amount {
        self.ledger.total_withdrawn()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    pub fn config(&self) -> &DaoConfig {
        &self.config
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn contribution_end(&self) -> Timestamp {
        self.contribution_end
    }

    /// Committed events, oldest first.
    pub fn events(&self) -> &[DaoEvent] {
        &self.events
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn transfer_agent(&self) -> &T {
        &self.transfer
    }

    pub fn transfer_agent_mut(&mut self) -> &mut T {
        &mut self.transfer
    }
}
