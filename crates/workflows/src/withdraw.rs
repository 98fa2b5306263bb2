use alloy_primitives::U256;
use rangekeeper_chain::{ChainClient, CollectCall, DecreaseCall, NftApproveCall, WriteCall};
use rangekeeper_math::{amounts_for_liquidity, get_sqrt_ratio_at_tick, minimum_amounts, withdraw_share};
use rangekeeper_types::{AmountPair, KeeperError, KeeperSettings};
use tracing::{debug, info};

use crate::deadline;

#[derive(Clone, Debug)]
pub struct WithdrawParams {
    pub token_id: U256,
    /// Share of the liquidity to remove, 1..=100.
    pub percentage: u8,
    pub collect_fees: bool,
}

impl WithdrawParams {
    /// Default behavior: remove everything and collect all fees.
    pub fn full(token_id: U256) -> WithdrawParams {
        WithdrawParams { token_id, percentage: 100, collect_fees: true }
    }
}

#[derive(Clone, Debug)]
pub struct WithdrawOutcome {
    pub withdrawn: AmountPair,
    pub collected: AmountPair,
    pub success: bool,
}

/// Removes a liquidity share and optionally collects everything owed. The
/// share is truncated so the tool never withdraws more than entitled.
pub async fn withdraw_position<C: ChainClient>(
    settings: &KeeperSettings,
    client: &C,
    params: &WithdrawParams,
) -> Result<WithdrawOutcome, KeeperError> {
    if params.percentage == 0 || params.percentage > 100 {
        return Err(KeeperError::InvalidInput(format!("withdraw percentage {} outside (0, 100]", params.percentage)));
    }

    let position = client.position(params.token_id).await?;
    if position.liquidity == 0 {
        return Err(KeeperError::InvalidPosition(format!(
            "position {} has no liquidity for a {}% withdrawal",
            params.token_id, params.percentage
        )));
    }

    // the registry only accepts liquidity changes from the owner or an
    // approved operator; if neither holds the approval call is still issued
    // and the ledger is the one to reject an unauthorized signer
    let caller = client.caller();
    let owner = client.owner_of(params.token_id).await?;
    if caller != owner {
        let approved =
            client.is_approved_for_all(owner, caller).await? || client.approved_for(params.token_id).await? == caller;
        if !approved {
            debug!(%owner, %caller, "requesting operator approval");
            let pending =
                client.submit(WriteCall::ApproveNft(NftApproveCall { token_id: params.token_id, to: caller })).await?;
            client.confirm(pending).await?;
        }
    }

    let share = withdraw_share(position.liquidity, params.percentage);
    let mut withdrawn = AmountPair::default();
    if share > 0 {
        let state = client.pool_state(settings.pool.address).await?;
        let sqrt_lower = get_sqrt_ratio_at_tick(position.tick_lower)?;
        let sqrt_upper = get_sqrt_ratio_at_tick(position.tick_upper)?;
        let expected = amounts_for_liquidity(state.sqrt_price_x96, sqrt_lower, sqrt_upper, share);
        let minimums = minimum_amounts(&expected, settings.default_slippage)?;
        debug!(share, amount0 = %expected.amount0, amount1 = %expected.amount1, "decreasing liquidity");
        let pending = client
            .submit(WriteCall::DecreaseLiquidity(DecreaseCall {
                token_id: params.token_id,
                liquidity: share,
                amount0_min: minimums.amount0,
                amount1_min: minimums.amount1,
                deadline: deadline(settings),
            }))
            .await?;
        withdrawn = client.confirm(pending).await?.decreased.unwrap_or_default();
    }

    let mut collected = AmountPair::default();
    if params.collect_fees {
        let pending = client
            .submit(WriteCall::Collect(CollectCall {
                token_id: params.token_id,
                recipient: caller,
                amount0_max: u128::MAX,
                amount1_max: u128::MAX,
            }))
            .await?;
        collected = client.confirm(pending).await?.collected.unwrap_or_default();
    }

    info!(token_id = %params.token_id, percentage = params.percentage, amount0 = %collected.amount0, amount1 = %collected.amount1, "withdrawal complete");
    Ok(WithdrawOutcome { withdrawn, collected, success: true })
}
