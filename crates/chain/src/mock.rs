//! In-memory ledger used by workflow tests: applies the same state
//! transitions the real registry would (mint assigns ids, decrease accrues
//! owed tokens, collect drains them) without a node.

use std::collections::HashMap;
use std::sync::RwLock;

use alloy_primitives::{Address, B256, U256};
use rangekeeper_math::{amounts_for_liquidity, get_sqrt_ratio_at_tick, liquidity_for_amounts};
use rangekeeper_types::{AmountPair, KeeperError, PoolState, Position};

use crate::calls::{CallReceipt, Minted, PendingCall, WriteCall};
use crate::client::ChainClient;

#[derive(Default)]
struct Ledger {
    pool_state: PoolState,
    positions: HashMap<U256, Position>,
    owners: HashMap<U256, Address>,
    allowances: HashMap<(Address, Address, Address), U256>,
    token_approvals: HashMap<U256, Address>,
    operator_approvals: HashMap<(Address, Address), bool>,
    pending: HashMap<B256, WriteCall>,
    next_token_id: u64,
    tx_counter: u64,
}

pub struct MockChainClient {
    caller: Address,
    ledger: RwLock<Ledger>,
}

impl MockChainClient {
    pub fn new(caller: Address, pool_state: PoolState) -> MockChainClient {
        let ledger = Ledger { pool_state, next_token_id: 1, ..Ledger::default() };
        MockChainClient { caller, ledger: RwLock::new(ledger) }
    }

    pub fn set_pool_state(&self, state: PoolState) {
        self.ledger.write().expect("mock ledger lock").pool_state = state;
    }

    /// Seeds a pre-existing position, e.g. an interrupted rebalance leftover.
    pub fn seed_position(&self, position: Position, owner: Address) {
        let mut ledger = self.ledger.write().expect("mock ledger lock");
        ledger.owners.insert(position.token_id, owner);
        let id = position.token_id.to::<u64>();
        ledger.next_token_id = ledger.next_token_id.max(id + 1);
        ledger.positions.insert(position.token_id, position);
    }

    fn apply(&self, operation: &'static str, call: WriteCall, receipt: &mut CallReceipt) -> Result<(), KeeperError> {
        let mut ledger = self.ledger.write().expect("mock ledger lock");
        match call {
            WriteCall::Mint(c) => {
                let sqrt_lower = get_sqrt_ratio_at_tick(c.tick_lower)?;
                let sqrt_upper = get_sqrt_ratio_at_tick(c.tick_upper)?;
                let sqrt_price = ledger.pool_state.sqrt_price_x96;
                let liquidity = liquidity_for_amounts(sqrt_price, sqrt_lower, sqrt_upper, c.amount0_desired, c.amount1_desired);
                if liquidity == 0 {
                    return Err(KeeperError::Reverted { operation, reason: "minted liquidity would be zero".to_string() });
                }
                let used = amounts_for_liquidity(sqrt_price, sqrt_lower, sqrt_upper, liquidity);
                if used.amount0 < c.amount0_min || used.amount1 < c.amount1_min {
                    return Err(KeeperError::Reverted { operation, reason: "price slipped below the minimum amounts".to_string() });
                }
                let token_id = U256::from(ledger.next_token_id);
                ledger.next_token_id += 1;
                ledger.positions.insert(
                    token_id,
                    Position {
                        token_id,
                        token0: c.token0,
                        token1: c.token1,
                        fee: c.fee,
                        tick_lower: c.tick_lower,
                        tick_upper: c.tick_upper,
                        liquidity,
                        ..Position::default()
                    },
                );
                ledger.owners.insert(token_id, c.recipient);
                receipt.minted = Some(Minted { token_id, liquidity, amounts: used });
            }
            WriteCall::DecreaseLiquidity(c) => {
                let sqrt_price = ledger.pool_state.sqrt_price_x96;
                let position = ledger
                    .positions
                    .get_mut(&c.token_id)
                    .ok_or(KeeperError::NotFound { token_id: c.token_id })?;
                if c.liquidity > position.liquidity {
                    return Err(KeeperError::Reverted { operation, reason: "decrease exceeds position liquidity".to_string() });
                }
                let sqrt_lower = get_sqrt_ratio_at_tick(position.tick_lower)?;
                let sqrt_upper = get_sqrt_ratio_at_tick(position.tick_upper)?;
                let removed = amounts_for_liquidity(sqrt_price, sqrt_lower, sqrt_upper, c.liquidity);
                if removed.amount0 < c.amount0_min || removed.amount1 < c.amount1_min {
                    return Err(KeeperError::Reverted { operation, reason: "price slipped below the minimum amounts".to_string() });
                }
                position.liquidity -= c.liquidity;
                position.tokens_owed0 = position.tokens_owed0.saturating_add(removed.amount0.try_into().unwrap_or(u128::MAX));
                position.tokens_owed1 = position.tokens_owed1.saturating_add(removed.amount1.try_into().unwrap_or(u128::MAX));
                receipt.decreased = Some(removed);
            }
            WriteCall::Collect(c) => {
                let position = ledger
                    .positions
                    .get_mut(&c.token_id)
                    .ok_or(KeeperError::NotFound { token_id: c.token_id })?;
                let take0 = position.tokens_owed0.min(c.amount0_max);
                let take1 = position.tokens_owed1.min(c.amount1_max);
                position.tokens_owed0 -= take0;
                position.tokens_owed1 -= take1;
                receipt.collected = Some(AmountPair::new(U256::from(take0), U256::from(take1)));
            }
            WriteCall::ApproveErc20(c) => {
                ledger.allowances.insert((c.token, self.caller, c.spender), c.amount);
            }
            WriteCall::ApproveNft(c) => {
                let owner = *ledger.owners.get(&c.token_id).ok_or(KeeperError::NotFound { token_id: c.token_id })?;
                let operator_ok = *ledger.operator_approvals.get(&(owner, self.caller)).unwrap_or(&false);
                if owner != self.caller && !operator_ok {
                    return Err(KeeperError::Reverted { operation, reason: "caller is not authorized to approve".to_string() });
                }
                ledger.token_approvals.insert(c.token_id, c.to);
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ChainClient for MockChainClient {
    fn caller(&self) -> Address {
        self.caller
    }

    async fn pool_state(&self, _pool: Address) -> Result<PoolState, KeeperError> {
        Ok(self.ledger.read().expect("mock ledger lock").pool_state.clone())
    }

    async fn position(&self, token_id: U256) -> Result<Position, KeeperError> {
        self.ledger
            .read()
            .expect("mock ledger lock")
            .positions
            .get(&token_id)
            .cloned()
            .ok_or(KeeperError::NotFound { token_id })
    }

    async fn erc20_allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256, KeeperError> {
        Ok(*self.ledger.read().expect("mock ledger lock").allowances.get(&(token, owner, spender)).unwrap_or(&U256::ZERO))
    }

    async fn owner_of(&self, token_id: U256) -> Result<Address, KeeperError> {
        self.ledger
            .read()
            .expect("mock ledger lock")
            .owners
            .get(&token_id)
            .copied()
            .ok_or(KeeperError::NotFound { token_id })
    }

    async fn approved_for(&self, token_id: U256) -> Result<Address, KeeperError> {
        Ok(*self.ledger.read().expect("mock ledger lock").token_approvals.get(&token_id).unwrap_or(&Address::ZERO))
    }

    async fn is_approved_for_all(&self, owner: Address, operator: Address) -> Result<bool, KeeperError> {
        Ok(*self.ledger.read().expect("mock ledger lock").operator_approvals.get(&(owner, operator)).unwrap_or(&false))
    }

    async fn submit(&self, call: WriteCall) -> Result<PendingCall, KeeperError> {
        let mut ledger = self.ledger.write().expect("mock ledger lock");
        ledger.tx_counter += 1;
        let tx_hash = B256::from(U256::from(ledger.tx_counter));
        let operation = call.operation();
        ledger.pending.insert(tx_hash, call);
        Ok(PendingCall { operation, tx_hash })
    }

    async fn confirm(&self, pending: PendingCall) -> Result<CallReceipt, KeeperError> {
        let operation = pending.operation;
        let call = self
            .ledger
            .write()
            .expect("mock ledger lock")
            .pending
            .remove(&pending.tx_hash)
            .ok_or(KeeperError::Unknown { operation, reason: format!("unknown pending transaction {}", pending.tx_hash) })?;
        let mut receipt = CallReceipt { operation, tx_hash: pending.tx_hash, block_number: 1, ..CallReceipt::default() };
        self.apply(operation, call, &mut receipt)?;
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calls::MintCall;

    fn pool_at_tick_zero() -> PoolState {
        PoolState { sqrt_price_x96: get_sqrt_ratio_at_tick(0).unwrap(), tick: 0, ..PoolState::default() }
    }

    #[tokio::test]
    async fn mint_assigns_ids_and_records_liquidity() {
        let caller = Address::repeat_byte(0x11);
        let mock = MockChainClient::new(caller, pool_at_tick_zero());
        let call = WriteCall::Mint(MintCall {
            token0: Address::repeat_byte(0x01),
            token1: Address::repeat_byte(0x02),
            fee: 3000,
            tick_lower: -600,
            tick_upper: 600,
            amount0_desired: U256::from(10_000_000_000_000_000_u128),
            amount1_desired: U256::from(10_000_000_000_000_000_u128),
            amount0_min: U256::ZERO,
            amount1_min: U256::ZERO,
            recipient: caller,
            deadline: 2_000_000_000,
        });
        let pending = mock.submit(call).await.unwrap();
        let receipt = mock.confirm(pending).await.unwrap();
        let minted = receipt.minted.unwrap();
        assert_eq!(minted.token_id, U256::from(1u8));
        assert!(minted.liquidity > 0);
        let position = mock.position(minted.token_id).await.unwrap();
        assert_eq!(position.liquidity, minted.liquidity);
        assert_eq!(mock.owner_of(minted.token_id).await.unwrap(), caller);
    }
}
