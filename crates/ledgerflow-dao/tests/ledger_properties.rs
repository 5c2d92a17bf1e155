//! Randomized operation sequences must never break the ledger identities.

use ledgerflow_core::{Bank, ManualClock};
use ledgerflow_dao::{DaoConfig, DaoEngine, DaoError, DaoEvent};
use ledgerflow_types::{Address, Amount, Timestamp};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Op {
    Contribute { who: usize, amount: u64 },
    Propose { who: usize, amount: u64, to: usize },
    Vote { who: usize, proposal: u64 },
    Execute { proposal: u64 },
    Withdraw { who: usize, amount: u64, to: usize },
    Advance(u64),
    FailNextTransfer,
}

const PEOPLE: usize = 5;

fn person(i: usize) -> Address {
    // index 0 is the admin
    Address::from_label(&format!("person{}", i))
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..PEOPLE, 1u64..5_000).prop_map(|(who, amount)| Op::Contribute { who, amount }),
        2 => (0..PEOPLE, 1u64..4_000, 0..PEOPLE)
            .prop_map(|(who, amount, to)| Op::Propose { who, amount, to }),
        4 => (0..PEOPLE, 0u64..6).prop_map(|(who, proposal)| Op::Vote { who, proposal }),
        2 => (0u64..6).prop_map(|proposal| Op::Execute { proposal }),
        1 => (0..PEOPLE, 1u64..3_000, 0..PEOPLE)
            .prop_map(|(who, amount, to)| Op::Withdraw { who, amount, to }),
        1 => (0u64..8).prop_map(Op::Advance),
        1 => Just(Op::FailNextTransfer),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn ledger_invariants_hold(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let clock = Arc::new(ManualClock::new(Timestamp::from_secs(0)));
        let mut dao = DaoEngine::new(
            DaoConfig::new(20, 6, 50),
            person(0),
            Arc::clone(&clock),
            Bank::new(),
        ).unwrap();

        let mut contributed: BTreeMap<Address, Amount> = BTreeMap::new();
        let mut contributed_total = Amount::ZERO;

        for op in ops {
            let available_before = dao.available_funds();
            let ledger_before = dao.ledger().clone();

            let result: Result<DaoEvent, DaoError> = match op {
                Op::Contribute { who, amount } => {
                    let r = dao.contribute(person(who), Amount::from(amount));
                    if r.is_ok() {
                        let e = contributed.entry(person(who)).or_insert(Amount::ZERO);
                        *e = e.checked_add(Amount::from(amount)).unwrap();
                        contributed_total = contributed_total.checked_add(Amount::from(amount)).unwrap();
                    }
                    r
                }
                Op::Propose { who, amount, to } => {
                    dao.create_proposal(person(who), "p", Amount::from(amount), person(to))
                }
                Op::Vote { who, proposal } => dao.vote(person(who), proposal),
                Op::Execute { proposal } => {
                    let r = dao.execute_proposal(person(0), proposal);
                    if let Ok(DaoEvent::ProposalExecuted { amount, .. }) = &r {
                        prop_assert_eq!(
                            available_before.checked_sub(*amount),
                            Some(dao.available_funds())
                        );
                    }
                    r
                }
                Op::Withdraw { who, amount, to } => {
                    dao.withdraw(person(who), Amount::from(amount), person(to))
                }
                Op::Advance(secs) => {
                    clock.advance(secs);
                    continue;
                }
                Op::FailNextTransfer => {
                    dao.transfer_agent_mut().fail_next(1);
                    continue;
                }
            };

            // Failed calls leave the ledger untouched
            if result.is_err() {
                prop_assert_eq!(dao.ledger(), &ledger_before);
            }

            prop_assert!(dao.ledger().is_balanced());
            prop_assert_eq!(dao.total_contributions(), contributed_total);
        }

        // Contributions per investor add up to the total
        let sum = dao
            .investors()
            .fold(Amount::ZERO, |acc, i| acc.checked_add(i.contribution).unwrap());
        prop_assert_eq!(sum, dao.total_contributions());
        for (who, amount) in &contributed {
            prop_assert_eq!(dao.contribution_of(who), *amount);
        }

        // Vote weights are bounded by their voters' contributions
        for proposal in dao.proposals() {
            let voter_stake = proposal
                .voters
                .iter()
                .fold(Amount::ZERO, |acc, v| acc.checked_add(dao.contribution_of(v)).unwrap());
            prop_assert!(proposal.votes <= voter_stake);
            prop_assert!(proposal.amount <= dao.total_contributions());
        }

        // Everything paid out reached the bank exactly once
        let paid = dao.total_disbursed().checked_add(dao.total_withdrawn()).unwrap();
        prop_assert_eq!(dao.transfer_agent().total_transferred(), paid);
    }
}
