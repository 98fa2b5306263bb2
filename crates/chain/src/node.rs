use std::marker::PhantomData;
use std::time::Duration;

use alloy::contract::Error as ContractError;
use alloy::network::Ethereum;
use alloy::providers::Provider;
use alloy::transports::Transport;
use alloy_primitives::aliases::{I24, U24};
use alloy_primitives::{Address, U256};
use rangekeeper_abi::{IERC20, INonfungiblePositionManager, IUniswapV3Pool};
use rangekeeper_types::{AmountPair, KeeperError, PoolState, Position};
use tokio::time::sleep;
use tracing::{debug, trace};

use crate::calls::{CallReceipt, Minted, PendingCall, WriteCall};
use crate::client::ChainClient;

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Provider-backed ledger client. Confirmation waits are unbounded: the
/// on-chain deadline carried by the write calls is the only timeout.
#[derive(Clone)]
pub struct NodeClient<P, T> {
    provider: P,
    position_manager: Address,
    caller: Address,
    _transport: PhantomData<T>,
}

fn classify(operation: &'static str, err: ContractError) -> KeeperError {
    match err {
        ContractError::TransportError(e) => {
            if e.as_error_resp().is_some() {
                KeeperError::Reverted { operation, reason: e.to_string() }
            } else {
                KeeperError::Network { operation, reason: e.to_string() }
            }
        }
        other => KeeperError::Unknown { operation, reason: other.to_string() },
    }
}

impl<P, T> NodeClient<P, T>
where
    T: Transport + Clone,
    P: Provider<T, Ethereum> + Send + Sync + Clone + 'static,
{
    pub fn new(provider: P, position_manager: Address, caller: Address) -> Self {
        NodeClient { provider, position_manager, caller, _transport: PhantomData }
    }

    fn manager(&self) -> INonfungiblePositionManager::INonfungiblePositionManagerInstance<T, P> {
        INonfungiblePositionManager::new(self.position_manager, self.provider.clone())
    }
}

#[async_trait::async_trait]
impl<P, T> ChainClient for NodeClient<P, T>
where
    T: Transport + Clone,
    P: Provider<T, Ethereum> + Send + Sync + Clone + 'static,
{
    fn caller(&self) -> Address {
        self.caller
    }

    async fn pool_state(&self, pool: Address) -> Result<PoolState, KeeperError> {
        let contract = IUniswapV3Pool::new(pool, self.provider.clone());
        let slot0 = contract.slot0().call().await.map_err(|e| classify("read_pool_state", e))?;
        Ok(PoolState {
            sqrt_price_x96: slot0.sqrtPriceX96.to(),
            tick: slot0.tick.try_into().unwrap_or_default(),
            observation_index: slot0.observationIndex,
            observation_cardinality: slot0.observationCardinality,
            fee_protocol: slot0.feeProtocol,
            unlocked: slot0.unlocked,
        })
    }

    async fn position(&self, token_id: U256) -> Result<Position, KeeperError> {
        let manager = self.manager();
        // the registry reverts on unknown ids rather than returning a blank
        let ret = manager.positions(token_id).call().await.map_err(|e| match e {
            ContractError::TransportError(te) if te.as_error_resp().is_some() => KeeperError::NotFound { token_id },
            other => classify("read_position", other),
        })?;
        Ok(Position {
            token_id,
            operator: ret.operator,
            token0: ret.token0,
            token1: ret.token1,
            fee: ret.fee.to::<u32>(),
            tick_lower: ret.tickLower.try_into().unwrap_or_default(),
            tick_upper: ret.tickUpper.try_into().unwrap_or_default(),
            liquidity: ret.liquidity,
            fee_growth_inside0_x128: ret.feeGrowthInside0LastX128,
            fee_growth_inside1_x128: ret.feeGrowthInside1LastX128,
            tokens_owed0: ret.tokensOwed0,
            tokens_owed1: ret.tokensOwed1,
        })
    }

    async fn erc20_allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256, KeeperError> {
        let contract = IERC20::new(token, self.provider.clone());
        let ret = contract.allowance(owner, spender).call().await.map_err(|e| classify("read_allowance", e))?;
        Ok(ret._0)
    }

    async fn owner_of(&self, token_id: U256) -> Result<Address, KeeperError> {
        let manager = self.manager();
        let ret = manager.ownerOf(token_id).call().await.map_err(|e| match e {
            ContractError::TransportError(te) if te.as_error_resp().is_some() => KeeperError::NotFound { token_id },
            other => classify("read_owner", other),
        })?;
        Ok(ret._0)
    }

    async fn approved_for(&self, token_id: U256) -> Result<Address, KeeperError> {
        let manager = self.manager();
        let ret = manager.getApproved(token_id).call().await.map_err(|e| classify("read_approved", e))?;
        Ok(ret._0)
    }

    async fn is_approved_for_all(&self, owner: Address, operator: Address) -> Result<bool, KeeperError> {
        let manager = self.manager();
        let ret = manager.isApprovedForAll(owner, operator).call().await.map_err(|e| classify("read_operator_approval", e))?;
        Ok(ret._0)
    }

    async fn submit(&self, call: WriteCall) -> Result<PendingCall, KeeperError> {
        let operation = call.operation();
        debug!(operation, "submitting transaction");
        let tx_hash = match call {
            WriteCall::Mint(c) => {
                let params = INonfungiblePositionManager::MintParams {
                    token0: c.token0,
                    token1: c.token1,
                    fee: U24::from(c.fee),
                    // ticks are bounds-checked before a call is ever built
                    tickLower: I24::unchecked_from(c.tick_lower),
                    tickUpper: I24::unchecked_from(c.tick_upper),
                    amount0Desired: c.amount0_desired,
                    amount1Desired: c.amount1_desired,
                    amount0Min: c.amount0_min,
                    amount1Min: c.amount1_min,
                    recipient: c.recipient,
                    deadline: U256::from(c.deadline),
                };
                let manager = self.manager();
                manager.mint(params).send().await.map(|p| *p.tx_hash())
            }
            WriteCall::DecreaseLiquidity(c) => {
                let params = INonfungiblePositionManager::DecreaseLiquidityParams {
                    tokenId: c.token_id,
                    liquidity: c.liquidity,
                    amount0Min: c.amount0_min,
                    amount1Min: c.amount1_min,
                    deadline: U256::from(c.deadline),
                };
                let manager = self.manager();
                manager.decreaseLiquidity(params).send().await.map(|p| *p.tx_hash())
            }
            WriteCall::Collect(c) => {
                let params = INonfungiblePositionManager::CollectParams {
                    tokenId: c.token_id,
                    recipient: c.recipient,
                    amount0Max: c.amount0_max,
                    amount1Max: c.amount1_max,
                };
                let manager = self.manager();
                manager.collect(params).send().await.map(|p| *p.tx_hash())
            }
            WriteCall::ApproveErc20(c) => {
                let token = IERC20::new(c.token, self.provider.clone());
                token.approve(c.spender, c.amount).send().await.map(|p| *p.tx_hash())
            }
            WriteCall::ApproveNft(c) => {
                let manager = self.manager();
                manager.approve(c.to, c.token_id).send().await.map(|p| *p.tx_hash())
            }
        }
        .map_err(|e| classify(operation, e))?;
        Ok(PendingCall { operation, tx_hash })
    }

    async fn confirm(&self, pending: PendingCall) -> Result<CallReceipt, KeeperError> {
        let operation = pending.operation;
        let receipt = loop {
            match self.provider.get_transaction_receipt(pending.tx_hash).await {
                Ok(Some(receipt)) => break receipt,
                Ok(None) => {
                    trace!(tx = %pending.tx_hash, "waiting for confirmation");
                    sleep(RECEIPT_POLL_INTERVAL).await;
                }
                Err(e) => return Err(KeeperError::Network { operation, reason: e.to_string() }),
            }
        };
        if !receipt.status() {
            return Err(KeeperError::Reverted { operation, reason: format!("transaction {} reverted on-chain", pending.tx_hash) });
        }

        let mut out = CallReceipt {
            operation,
            tx_hash: pending.tx_hash,
            block_number: receipt.block_number.unwrap_or_default(),
            ..CallReceipt::default()
        };
        for log in receipt.inner.logs() {
            if log.address() != self.position_manager {
                continue;
            }
            if let Ok(ev) = log.log_decode::<INonfungiblePositionManager::IncreaseLiquidity>() {
                let data = &ev.inner.data;
                out.minted =
                    Some(Minted { token_id: data.tokenId, liquidity: data.liquidity, amounts: AmountPair::new(data.amount0, data.amount1) });
            } else if let Ok(ev) = log.log_decode::<INonfungiblePositionManager::DecreaseLiquidity>() {
                let data = &ev.inner.data;
                out.decreased = Some(AmountPair::new(data.amount0, data.amount1));
            } else if let Ok(ev) = log.log_decode::<INonfungiblePositionManager::Collect>() {
                let data = &ev.inner.data;
                out.collected = Some(AmountPair::new(data.amount0, data.amount1));
            }
        }
        debug!(operation, tx = %out.tx_hash, block = out.block_number, "transaction confirmed");
        Ok(out)
    }
}
