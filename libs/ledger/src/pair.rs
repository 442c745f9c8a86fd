//! Pair Ledger
//!
//! Owns the committed reserves, price accumulators and protocol fee
//! checkpoint of one asset pair and implements the state-changing operations:
//! deposit, withdraw, exchange, sync and skim.
//!
//! Each operation follows the same discipline:
//!
//! 1. acquire the [`OperationGuard`] (a nested call fails with `Locked`),
//! 2. work on a copy of the committed state, buffering notifications and
//!    journaling every custody transfer and share mint or burn it makes,
//! 3. on success publish the copy and emit the buffered notifications,
//!    on failure undo the journal newest first and discard the copy.
//!
//! Only the pair's own writes are undone. Balances written meanwhile by other
//! callers, other pairs on the same custody, or a flash callback are kept.

use crate::error::{PairError, Result};
use crate::events::PairEvent;
use crate::guard::OperationGuard;
use crate::oracle::{max_reserve, time_elapsed, truncate_timestamp, PriceSample};
use crate::state::PairState;
use crate::traits::{
    Clock, Custody, EventSink, FeeRecipient, FlashCallback, FlashRequest, ShareLedger,
};
use crate::transfer::decode_reply;
use ethereum_types::{Address, U256};
use pairswap_amm::{AmmPool, ReservePair};
use pairswap_config::fees::{FEE_DENOMINATOR, FEE_NUMERATOR, PROTOCOL_FEE_DIVISOR};
use pairswap_config::{LIQUIDITY_SINK, MINIMUM_LIQUIDITY};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// External collaborators of a pair
#[derive(Clone)]
pub struct PairContext {
    pub custody: Arc<dyn Custody>,
    pub shares: Arc<dyn ShareLedger>,
    pub fee_recipient: Arc<dyn FeeRecipient>,
    pub clock: Arc<dyn Clock>,
    pub events: Arc<dyn EventSink>,
}

/// Collaborator write made by the pair during an operation
#[derive(Debug, Clone, Copy)]
enum Undo {
    Transfer {
        asset: Address,
        to: Address,
        amount: U256,
    },
    Mint {
        to: Address,
        amount: U256,
    },
    Burn {
        from: Address,
        amount: U256,
    },
}

/// Working copy of an operation in progress
struct Pending {
    state: PairState,
    events: Vec<PairEvent>,
    journal: Vec<Undo>,
}

/// Two-asset constant-product pair
pub struct Pair {
    address: Address,
    creator: Address,
    state: RwLock<PairState>,
    guard: OperationGuard,
    ctx: PairContext,
}

impl Pair {
    /// Create an uninitialized pair held at `address`, initializable only by `creator`
    pub fn new(address: Address, creator: Address, ctx: PairContext) -> Self {
        Self {
            address,
            creator,
            state: RwLock::new(PairState::default()),
            guard: OperationGuard::new(),
            ctx,
        }
    }

    /// One-shot assignment of the two assets by the creator
    ///
    /// Any call after the first fails with `NotOwner`, whoever makes it.
    pub fn initialize(&self, caller: Address, asset_a: Address, asset_b: Address) -> Result<()> {
        let mut state = self.state.write();
        if caller != self.creator || state.initialized {
            warn!(caller = ?caller, pair = ?self.address, "Rejected pair initialization");
            return Err(PairError::NotOwner);
        }
        if asset_a == asset_b {
            return Err(PairError::IdenticalAssets(asset_a));
        }

        state.asset_a = asset_a;
        state.asset_b = asset_b;
        state.initialized = true;

        info!(
            "Initialized pair 0x{}: asset_a=0x{} asset_b=0x{}",
            hex::encode(self.address),
            hex::encode(asset_a),
            hex::encode(asset_b)
        );
        Ok(())
    }

    /// Holder identity of the pair's custodial balances and redeemed shares
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn creator(&self) -> Address {
        self.creator
    }

    /// `(asset_a, asset_b)`, both zero until initialized
    pub fn assets(&self) -> (Address, Address) {
        let state = self.state.read();
        (state.asset_a, state.asset_b)
    }

    /// Committed reserves and the timestamp of the last commit
    pub fn get_reserves(&self) -> (U256, U256, u32) {
        let state = self.state.read();
        (state.reserve_a, state.reserve_b, state.last_update_timestamp)
    }

    /// Outstanding shares, including the permanently locked minimum
    pub fn total_shares(&self) -> U256 {
        self.ctx.shares.total_supply()
    }

    pub fn minimum_liquidity(&self) -> U256 {
        U256::from(MINIMUM_LIQUIDITY)
    }

    /// Protocol fee checkpoint (`kLast`)
    pub fn k_last(&self) -> U256 {
        self.state.read().k_last
    }

    /// Cumulative prices as of the last commit
    pub fn price_cumulative_last(&self) -> PriceSample {
        self.state.read().price_sample()
    }

    /// Cumulative prices advanced to the current time without committing
    pub fn observe(&self) -> PriceSample {
        let state = self.state.read();
        let now = truncate_timestamp(self.ctx.clock.now());
        let elapsed = time_elapsed(now, state.last_update_timestamp);

        let mut cumulative = state.cumulative;
        if elapsed > 0 && !state.reserve_a.is_zero() && !state.reserve_b.is_zero() {
            cumulative.accumulate(state.reserve_a, state.reserve_b, elapsed);
        }

        PriceSample {
            cumulative_price_a: cumulative.price_a,
            cumulative_price_b: cumulative.price_b,
            timestamp: now,
        }
    }

    /// Copy of the committed state
    pub fn state(&self) -> PairState {
        self.state.read().clone()
    }

    /// Output for an exact input of `asset_in` at the committed reserves
    pub fn quote_exact_in(&self, asset_in: Address, amount_in: U256) -> Result<U256> {
        Ok(self.oriented_reserves(asset_in)?.get_amount_out(amount_in)?)
    }

    /// Minimal input of `asset_in` buying `amount_out` of the other asset
    pub fn quote_exact_out(&self, asset_in: Address, amount_out: U256) -> Result<U256> {
        Ok(self.oriented_reserves(asset_in)?.get_amount_in(amount_out)?)
    }

    fn oriented_reserves(&self, asset_in: Address) -> Result<ReservePair> {
        let state = self.state.read();
        if !state.contains_asset(asset_in) {
            return Err(PairError::UnknownAsset(asset_in));
        }
        Ok(if asset_in == state.asset_a {
            ReservePair::new(state.reserve_a, state.reserve_b)
        } else {
            ReservePair::new(state.reserve_b, state.reserve_a)
        })
    }

    /// Mint shares to `recipient` for assets already moved into custody
    pub fn deposit(&self, sender: Address, recipient: Address) -> Result<U256> {
        self.execute("deposit", |pending| {
            let (reserve_a, reserve_b) = pending.state.reserves();
            let (balance_a, balance_b) = self.balances(&pending.state);
            let amount_a = balance_a
                .checked_sub(reserve_a)
                .ok_or(PairError::Underflow { asset: pending.state.asset_a })?;
            let amount_b = balance_b
                .checked_sub(reserve_b)
                .ok_or(PairError::Underflow { asset: pending.state.asset_b })?;

            let fee_on = self.mint_protocol_fee(pending, reserve_a, reserve_b)?;
            // Read after the fee mint, which may have grown the supply
            let total_supply = self.ctx.shares.total_supply();

            let shares = if total_supply.is_zero() {
                let root = checked_mul(amount_a, amount_b)?.integer_sqrt();
                let shares = root
                    .checked_sub(U256::from(MINIMUM_LIQUIDITY))
                    .ok_or(PairError::InsufficientMintedLiquidity)?;
                if !shares.is_zero() {
                    self.mint_shares(
                        pending,
                        Address::from(LIQUIDITY_SINK),
                        U256::from(MINIMUM_LIQUIDITY),
                    )?;
                }
                shares
            } else {
                let by_a = checked_mul(amount_a, total_supply)?
                    .checked_div(reserve_a)
                    .ok_or(PairError::InsufficientLiquidity)?;
                let by_b = checked_mul(amount_b, total_supply)?
                    .checked_div(reserve_b)
                    .ok_or(PairError::InsufficientLiquidity)?;
                by_a.min(by_b)
            };

            if shares.is_zero() {
                return Err(PairError::InsufficientMintedLiquidity);
            }
            self.mint_shares(pending, recipient, shares)?;

            self.commit_reserves(pending, balance_a, balance_b)?;
            if fee_on {
                pending.state.k_last = pending.state.reserve_a * pending.state.reserve_b;
            }
            pending.events.push(PairEvent::Mint {
                sender,
                amount_a,
                amount_b,
            });

            info!(
                sender = ?sender,
                recipient = ?recipient,
                %amount_a,
                %amount_b,
                %shares,
                "Deposit"
            );
            Ok(shares)
        })
    }

    /// Redeem the shares held by the pair itself, paying both assets to `recipient`
    pub fn withdraw(&self, sender: Address, recipient: Address) -> Result<(U256, U256)> {
        self.execute("withdraw", |pending| {
            let (reserve_a, reserve_b) = pending.state.reserves();
            let (asset_a, asset_b) = (pending.state.asset_a, pending.state.asset_b);
            let (balance_a, balance_b) = self.balances(&pending.state);
            let redeemed = self.ctx.shares.balance_of(self.address);

            let fee_on = self.mint_protocol_fee(pending, reserve_a, reserve_b)?;
            let total_supply = self.ctx.shares.total_supply();

            let amount_a = checked_mul(redeemed, balance_a)?
                .checked_div(total_supply)
                .unwrap_or_default();
            let amount_b = checked_mul(redeemed, balance_b)?
                .checked_div(total_supply)
                .unwrap_or_default();
            if amount_a.is_zero() || amount_b.is_zero() {
                return Err(PairError::InsufficientBurningLiquidity);
            }

            self.ctx.shares.burn(self.address, redeemed)?;
            pending.journal.push(Undo::Burn {
                from: self.address,
                amount: redeemed,
            });
            self.safe_transfer(pending, asset_a, recipient, amount_a)?;
            self.safe_transfer(pending, asset_b, recipient, amount_b)?;

            let (balance_a, balance_b) = self.balances(&pending.state);
            self.commit_reserves(pending, balance_a, balance_b)?;
            if fee_on {
                pending.state.k_last = pending.state.reserve_a * pending.state.reserve_b;
            }
            pending.events.push(PairEvent::Burn {
                sender,
                amount_a,
                amount_b,
                to: recipient,
            });

            info!(
                sender = ?sender,
                recipient = ?recipient,
                %redeemed,
                %amount_a,
                %amount_b,
                "Withdraw"
            );
            Ok((amount_a, amount_b))
        })
    }

    /// Exchange without a flash callback; input must already be in custody
    pub fn exchange(
        &self,
        sender: Address,
        amount_a_out: U256,
        amount_b_out: U256,
        recipient: Address,
    ) -> Result<()> {
        self.exchange_with_callback(sender, amount_a_out, amount_b_out, recipient, None)
    }

    /// Send the requested outputs optimistically, run the optional callback,
    /// then require the fee-adjusted invariant to hold on the new balances
    pub fn exchange_with_callback(
        &self,
        sender: Address,
        amount_a_out: U256,
        amount_b_out: U256,
        recipient: Address,
        callback: Option<&dyn FlashCallback>,
    ) -> Result<()> {
        self.execute("exchange", |pending| {
            if amount_a_out.is_zero() && amount_b_out.is_zero() {
                return Err(PairError::InvalidOutputAmount);
            }
            let (reserve_a, reserve_b) = pending.state.reserves();
            if amount_a_out >= reserve_a || amount_b_out >= reserve_b {
                return Err(PairError::InsufficientReserves);
            }
            let (asset_a, asset_b) = (pending.state.asset_a, pending.state.asset_b);
            if recipient == asset_a || recipient == asset_b {
                return Err(PairError::InvalidOutputAddress(recipient));
            }

            if !amount_a_out.is_zero() {
                self.safe_transfer(pending, asset_a, recipient, amount_a_out)?;
            }
            if !amount_b_out.is_zero() {
                self.safe_transfer(pending, asset_b, recipient, amount_b_out)?;
            }
            if let Some(callback) = callback {
                let request = FlashRequest {
                    sender,
                    amount_a_out,
                    amount_b_out,
                };
                callback.on_exchange(&request).map_err(PairError::Callback)?;
            }

            let (balance_a, balance_b) = self.balances(&pending.state);
            let amount_a_in = input_amount(balance_a, reserve_a, amount_a_out);
            let amount_b_in = input_amount(balance_b, reserve_b, amount_b_out);
            if amount_a_in.is_zero() && amount_b_in.is_zero() {
                return Err(PairError::InsufficientInputAmount);
            }

            let adjusted_a = fee_adjusted(balance_a, amount_a_in)?;
            let adjusted_b = fee_adjusted(balance_b, amount_b_in)?;
            let required = checked_mul(
                checked_mul(reserve_a, reserve_b)?,
                U256::from(FEE_DENOMINATOR * FEE_DENOMINATOR),
            )?;
            if checked_mul(adjusted_a, adjusted_b)? < required {
                debug!(%adjusted_a, %adjusted_b, %required, "Fee-adjusted invariant violated");
                return Err(PairError::InsufficientLiquidity);
            }

            self.commit_reserves(pending, balance_a, balance_b)?;
            pending.events.push(PairEvent::Swap {
                sender,
                amount_a_in,
                amount_b_in,
                amount_a_out,
                amount_b_out,
                to: recipient,
            });

            info!(
                sender = ?sender,
                recipient = ?recipient,
                %amount_a_in,
                %amount_b_in,
                %amount_a_out,
                %amount_b_out,
                "Exchange"
            );
            Ok(())
        })
    }

    /// Transfer any custodial surplus over the committed reserves to `recipient`
    pub fn skim(&self, recipient: Address) -> Result<(U256, U256)> {
        self.execute("skim", |pending| {
            let (reserve_a, reserve_b) = pending.state.reserves();
            let (asset_a, asset_b) = (pending.state.asset_a, pending.state.asset_b);
            let (balance_a, balance_b) = self.balances(&pending.state);

            let surplus_a = balance_a
                .checked_sub(reserve_a)
                .ok_or(PairError::Underflow { asset: asset_a })?;
            let surplus_b = balance_b
                .checked_sub(reserve_b)
                .ok_or(PairError::Underflow { asset: asset_b })?;

            if !surplus_a.is_zero() {
                self.safe_transfer(pending, asset_a, recipient, surplus_a)?;
            }
            if !surplus_b.is_zero() {
                self.safe_transfer(pending, asset_b, recipient, surplus_b)?;
            }

            info!(recipient = ?recipient, %surplus_a, %surplus_b, "Skim");
            Ok((surplus_a, surplus_b))
        })
    }

    /// Commit the current custodial balances as reserves
    pub fn sync(&self) -> Result<()> {
        self.execute("sync", |pending| {
            let (balance_a, balance_b) = self.balances(&pending.state);
            self.commit_reserves(pending, balance_a, balance_b)?;
            info!(%balance_a, %balance_b, "Sync");
            Ok(())
        })
    }

    /// Run `body` under the guard with all-or-nothing semantics
    fn execute<T>(
        &self,
        operation: &'static str,
        body: impl FnOnce(&mut Pending) -> Result<T>,
    ) -> Result<T> {
        let _entered = self.guard.enter()?;

        let state = self.state.read().clone();
        if !state.initialized {
            return Err(PairError::NotInitialized);
        }

        let mut pending = Pending {
            state,
            events: Vec::new(),
            journal: Vec::new(),
        };

        match body(&mut pending) {
            Ok(value) => {
                *self.state.write() = pending.state;
                for event in pending.events {
                    self.ctx.events.emit(event);
                }
                Ok(value)
            }
            Err(err) => {
                warn!(
                    operation,
                    error = %err,
                    writes = pending.journal.len(),
                    "Pair operation failed, rolling back"
                );
                if let Err(reason) = self.roll_back(pending.journal) {
                    error!(operation, error = %reason, "Rollback incomplete");
                    return Err(PairError::Rollback {
                        operation,
                        cause: err.to_string(),
                        reason,
                    });
                }
                Err(err)
            }
        }
    }

    /// Undo journaled writes newest first, reporting the first that failed
    fn roll_back(&self, journal: Vec<Undo>) -> Result<(), String> {
        let mut first_failure = None;
        for entry in journal.into_iter().rev() {
            let outcome = match entry {
                Undo::Transfer { asset, to, amount } => self
                    .ctx
                    .custody
                    .revert_transfer(asset, self.address, to, amount)
                    .map_err(|e| e.to_string()),
                Undo::Mint { to, amount } => {
                    self.ctx.shares.burn(to, amount).map_err(|e| e.to_string())
                }
                Undo::Burn { from, amount } => {
                    self.ctx.shares.mint(from, amount).map_err(|e| e.to_string())
                }
            };
            if let Err(reason) = outcome {
                warn!(entry = ?entry, %reason, "Could not undo pair write");
                first_failure.get_or_insert(reason);
            }
        }
        first_failure.map_or(Ok(()), Err)
    }

    fn balances(&self, state: &PairState) -> (U256, U256) {
        (
            self.ctx.custody.balance_of(state.asset_a, self.address),
            self.ctx.custody.balance_of(state.asset_b, self.address),
        )
    }

    fn safe_transfer(
        &self,
        pending: &mut Pending,
        asset: Address,
        to: Address,
        amount: U256,
    ) -> Result<()> {
        let failed = |reason: String| PairError::TransferFailed {
            asset,
            amount,
            reason,
        };
        let reply = self
            .ctx
            .custody
            .transfer(asset, self.address, to, amount)
            .map_err(|e| failed(e.to_string()))?;

        // A refusing asset moved nothing; any other reply means the funds left
        let decoded = decode_reply(reply.as_deref());
        if decoded != Ok(false) {
            pending.journal.push(Undo::Transfer { asset, to, amount });
        }
        match decoded {
            Ok(true) => Ok(()),
            Ok(false) => Err(failed("asset returned false".to_string())),
            Err(reason) => Err(failed(reason)),
        }
    }

    fn mint_shares(&self, pending: &mut Pending, to: Address, amount: U256) -> Result<()> {
        self.ctx.shares.mint(to, amount)?;
        pending.journal.push(Undo::Mint { to, amount });
        Ok(())
    }

    /// Commit new reserves, advancing the price accumulators first
    fn commit_reserves(
        &self,
        pending: &mut Pending,
        balance_a: U256,
        balance_b: U256,
    ) -> Result<()> {
        let bound = max_reserve();
        if balance_a > bound || balance_b > bound {
            return Err(PairError::Overflow);
        }

        let state = &mut pending.state;
        let now = truncate_timestamp(self.ctx.clock.now());
        let elapsed = time_elapsed(now, state.last_update_timestamp);
        if elapsed > 0 && !state.reserve_a.is_zero() && !state.reserve_b.is_zero() {
            state
                .cumulative
                .accumulate(state.reserve_a, state.reserve_b, elapsed);
        }

        state.reserve_a = balance_a;
        state.reserve_b = balance_b;
        state.last_update_timestamp = now;
        pending.events.push(PairEvent::Sync {
            reserve_a: balance_a,
            reserve_b: balance_b,
        });
        Ok(())
    }

    /// Mint the protocol's share of sqrt(k) growth since the last checkpoint
    ///
    /// Returns whether the protocol fee is on.
    fn mint_protocol_fee(
        &self,
        pending: &mut Pending,
        reserve_a: U256,
        reserve_b: U256,
    ) -> Result<bool> {
        let k_last = pending.state.k_last;
        let fee_to = match self.ctx.fee_recipient.fee_to() {
            Some(fee_to) => fee_to,
            None => {
                if !k_last.is_zero() {
                    pending.state.k_last = U256::zero();
                }
                return Ok(false);
            }
        };
        if k_last.is_zero() {
            return Ok(true);
        }

        let root_k = (reserve_a * reserve_b).integer_sqrt();
        let root_k_last = k_last.integer_sqrt();
        if root_k > root_k_last {
            let total_supply = self.ctx.shares.total_supply();
            let numerator = checked_mul(total_supply, root_k - root_k_last)?;
            let denominator = root_k * U256::from(PROTOCOL_FEE_DIVISOR) + root_k_last;
            let liquidity = numerator / denominator;
            if !liquidity.is_zero() {
                self.mint_shares(pending, fee_to, liquidity)?;
                debug!(fee_to = ?fee_to, %liquidity, "Minted protocol fee");
            }
        }
        Ok(true)
    }
}

fn checked_mul(a: U256, b: U256) -> Result<U256> {
    a.checked_mul(b).ok_or(PairError::Overflow)
}

/// Amount that arrived beyond what the reserve keeps after the output left
fn input_amount(balance: U256, reserve: U256, amount_out: U256) -> U256 {
    let kept = reserve - amount_out;
    if balance > kept {
        balance - kept
    } else {
        U256::zero()
    }
}

/// `balance * 1000 - amount_in * 2`
fn fee_adjusted(balance: U256, amount_in: U256) -> Result<U256> {
    checked_mul(balance, U256::from(FEE_DENOMINATOR))?
        .checked_sub(checked_mul(amount_in, U256::from(FEE_NUMERATOR))?)
        .ok_or(PairError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_amount() {
        let reserve = U256::from(1000);
        // 100 left, 112 arrived
        assert_eq!(input_amount(U256::from(1012), reserve, U256::from(100)), U256::from(112));
        // Nothing arrived
        assert_eq!(input_amount(U256::from(900), reserve, U256::from(100)), U256::zero());
        // Less than the output left (balance shrank further)
        assert_eq!(input_amount(U256::from(850), reserve, U256::from(100)), U256::zero());
    }

    #[test]
    fn test_fee_adjusted() {
        assert_eq!(
            fee_adjusted(U256::from(1112), U256::from(112)).unwrap(),
            U256::from(1_111_776)
        );
        assert!(matches!(
            fee_adjusted(U256::MAX, U256::one()),
            Err(PairError::Overflow)
        ));
    }
}
