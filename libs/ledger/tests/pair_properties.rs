//! Property tests for pair accounting
//!
//! These hold for any reserves and amounts in range: quoted exchanges pass
//! the invariant and never shrink the reserve product, one unit more does
//! not pass, and a deposit never redeems for more than it put in.

mod common;

use common::*;
use pairswap_ledger::{PairError, ShareLedger, U256};
use proptest::prelude::*;

prop_compose! {
    fn reserves()(
        reserve_a in 10_000u64..1_000_000_000_000,
        reserve_b in 10_000u64..1_000_000_000_000,
    ) -> (u64, u64) {
        (reserve_a, reserve_b)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn quoted_exchange_keeps_product(
        (reserve_a, reserve_b) in reserves(),
        amount_in in 1u64..1_000_000_000,
    ) {
        let harness = Harness::new();
        harness.seed_reserves(reserve_a, reserve_b);

        let out = harness.pair.quote_exact_in(asset_a(), u(amount_in)).unwrap();
        prop_assume!(!out.is_zero());

        harness.fund(asset_a(), alice(), amount_in);
        harness.send(asset_a(), alice(), amount_in);

        // One unit above the quote is refused and changes nothing
        let greedy = harness.pair.exchange(alice(), U256::zero(), out + U256::one(), bob());
        prop_assert!(matches!(
            greedy,
            Err(PairError::InsufficientLiquidity) | Err(PairError::InsufficientReserves)
        ));
        prop_assert_eq!(harness.reserves(), (u(reserve_a), u(reserve_b)));

        harness.pair.exchange(alice(), U256::zero(), out, bob()).unwrap();
        let (after_a, after_b) = harness.reserves();
        prop_assert!(after_a * after_b >= u(reserve_a) * u(reserve_b));
        prop_assert_eq!(harness.balance(asset_b(), bob()), out);
    }

    #[test]
    fn exact_output_input_is_sufficient(
        (reserve_a, reserve_b) in reserves(),
        amount_out in 1u64..5_000,
    ) {
        let harness = Harness::new();
        harness.seed_reserves(reserve_a, reserve_b);

        let needed = harness.pair.quote_exact_out(asset_a(), u(amount_out)).unwrap();
        let needed = needed.as_u64();
        harness.fund(asset_a(), alice(), needed);
        harness.send(asset_a(), alice(), needed);

        prop_assert!(harness
            .pair
            .exchange(alice(), U256::zero(), u(amount_out), bob())
            .is_ok());
    }

    #[test]
    fn deposit_never_redeems_for_more(
        (reserve_a, reserve_b) in reserves(),
        deposit_a in 1u64..1_000_000_000,
        deposit_b in 1u64..1_000_000_000,
    ) {
        let harness = Harness::new();
        harness.provide(reserve_a, reserve_b).unwrap();

        harness.fund(asset_a(), bob(), deposit_a);
        harness.fund(asset_b(), bob(), deposit_b);
        harness.send(asset_a(), bob(), deposit_a);
        harness.send(asset_b(), bob(), deposit_b);
        let minted = match harness.pair.deposit(bob(), bob()) {
            Ok(minted) => minted,
            Err(PairError::InsufficientMintedLiquidity) => return Ok(()),
            Err(e) => return Err(TestCaseError::fail(e.to_string())),
        };

        harness.shares.transfer(bob(), pair_address(), minted).unwrap();
        match harness.pair.withdraw(bob(), bob()) {
            Ok((out_a, out_b)) => {
                prop_assert!(out_a <= u(deposit_a));
                prop_assert!(out_b <= u(deposit_b));
            }
            Err(PairError::InsufficientBurningLiquidity) => {}
            Err(e) => return Err(TestCaseError::fail(e.to_string())),
        }
    }

    #[test]
    fn withdraw_is_proportional_to_shares(
        (reserve_a, reserve_b) in reserves(),
        fraction in 1u64..=100,
    ) {
        let harness = Harness::new();
        harness.provide(reserve_a, reserve_b).unwrap();

        let total = harness.pair.total_shares();
        let held = harness.shares.balance_of(alice());
        let redeemed = held * u(fraction) / u(100);
        prop_assume!(!(redeemed * u(reserve_a) / total).is_zero());
        prop_assume!(!(redeemed * u(reserve_b) / total).is_zero());

        harness.shares.transfer(alice(), pair_address(), redeemed).unwrap();
        let (out_a, out_b) = harness.pair.withdraw(alice(), alice()).unwrap();

        prop_assert_eq!(out_a, redeemed * u(reserve_a) / total);
        prop_assert_eq!(out_b, redeemed * u(reserve_b) / total);
        prop_assert_eq!(harness.pair.total_shares(), total - redeemed);
    }
}
