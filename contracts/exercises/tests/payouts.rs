//! Value conservation across the paying contracts.

use ledgerflow_core::{Bank, ManualClock};
use ledgerflow_exercises::{BetOutcome, EtherWallet, LoanStateMachine, LoanTerms, Lottery, SplitPayment};
use ledgerflow_types::{Address, Amount, Timestamp};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn lottery_pot_is_conserved(
        count in 1usize..8,
        size in 1u64..10_000,
        fee in 0u8..=100,
        seed in any::<u64>(),
    ) {
        let admin = Address::from_label("admin");
        let mut lottery = Lottery::new(admin, fee).unwrap();
        let mut bank = Bank::new();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        lottery.create_bet(admin, count, Amount::from(size)).unwrap();

        let mut outcome = None;
        for i in 0..count {
            let who = Address::from_label(&format!("player{}", i));
            outcome = Some(lottery.bet(who, Amount::from(size), &mut rng, &mut bank).unwrap());
        }

        let pot = Amount::from(size).checked_mul(count as u128).unwrap();
        match outcome {
            Some(BetOutcome::Drawn { payout, .. }) => {
                prop_assert_eq!(payout.checked_add(lottery.house_balance()), Some(pot));
                prop_assert_eq!(bank.total_transferred(), payout);
            }
            other => prop_assert!(false, "round did not draw: {:?}", other),
        }
    }

    #[test]
    fn split_payment_leftover_stays_in_contract(
        amounts in prop::collection::vec(0u64..1_000, 1..6),
        extra in 0u64..1_000,
    ) {
        let owner = Address::from_label("owner");
        let mut contract = SplitPayment::new(owner);
        let mut bank = Bank::new();

        let to: Vec<Address> = (0..amounts.len())
            .map(|i| Address::from_label(&format!("payee{}", i)))
            .collect();
        let amounts: Vec<Amount> = amounts.into_iter().map(Amount::from).collect();
        let sum = amounts.iter().fold(Amount::ZERO, |acc, a| acc.checked_add(*a).unwrap());
        let value = sum.checked_add(Amount::from(extra)).unwrap();

        let leftover = contract.send(owner, &to, &amounts, value, &mut bank).unwrap();
        prop_assert_eq!(leftover, Amount::from(extra));
        prop_assert_eq!(contract.balance(), Amount::from(extra));
        prop_assert_eq!(bank.total_transferred(), sum);
    }
}

#[test]
fn test_wallet_then_loan() {
    let owner = Address::from_label("owner");
    let lender = Address::from_label("lender");
    let borrower = Address::from_label("borrower");
    let clock = ManualClock::new(Timestamp::from_secs(0));
    let mut bank = Bank::new();

    let mut wallet = EtherWallet::new(owner);
    wallet.deposit(Amount::new(1_000)).unwrap();
    wallet.send(owner, lender, Amount::new(1_000), &mut bank).unwrap();
    assert_eq!(bank.balance_of(&lender), Amount::new(1_000));

    let mut loan = LoanStateMachine::new(LoanTerms {
        amount: Amount::new(1_000),
        interest: Amount::new(100),
        duration: 50,
        borrower,
        lender,
    })
    .unwrap();
    loan.fund(lender, Amount::new(1_000), &clock, &mut bank).unwrap();
    assert_eq!(bank.balance_of(&borrower), Amount::new(1_000));

    clock.advance(50);
    loan.reimburse(borrower, Amount::new(1_100), &clock, &mut bank).unwrap();
    assert_eq!(bank.balance_of(&lender), Amount::new(2_100));
}
